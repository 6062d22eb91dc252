// tests/integration/concurrency.rs
use super::{create_test_app, json, post_json};
use axum::http::StatusCode;
use flashgpt_server::storage::ChatRepository;
use std::time::Duration;

#[tokio::test]
async fn test_last_credit_is_spent_once() {
    let app = create_test_app().await;
    let (user, token) = app.create_user("Ada", 1).await;
    let chat = app.create_chat(&user).await;
    // Keep both requests in flight past the balance pre-check
    *app.llm.delay.lock().unwrap() = Some(Duration::from_millis(50));

    let first = app.send(post_json(
        "/api/message/text",
        Some(&token),
        json!({ "chatId": chat.id, "prompt": "one" }),
    ));
    let second = app.send(post_json(
        "/api/message/text",
        Some(&token),
        json!({ "chatId": chat.id, "prompt": "two" }),
    ));
    let ((status_a, _), (status_b, _)) = tokio::join!(first, second);

    let mut statuses = vec![status_a, status_b];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::FORBIDDEN]);
    assert_eq!(app.credits(&user.id).await, 0);
    assert_eq!(app.chats.count_turns(&chat.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_requests_never_overdraw() {
    let app = create_test_app().await;
    let (user, token) = app.create_user("Ada", 3).await;
    let chat = app.create_chat(&user).await;
    *app.llm.delay.lock().unwrap() = Some(Duration::from_millis(20));

    let requests = (0..8).map(|i| {
        app.send(post_json(
            "/api/message/text",
            Some(&token),
            json!({ "chatId": chat.id, "prompt": format!("prompt {}", i) }),
        ))
    });
    let results = futures::future::join_all(requests).await;

    let ok = results.iter().filter(|(s, _)| *s == StatusCode::OK).count();
    let forbidden = results
        .iter()
        .filter(|(s, _)| *s == StatusCode::FORBIDDEN)
        .count();

    assert_eq!(ok, 3);
    assert_eq!(forbidden, 5);
    assert_eq!(app.credits(&user.id).await, 0);
    assert_eq!(app.chats.count_turns(&chat.id).await.unwrap(), 6);
}

#[tokio::test]
async fn test_concurrent_chats_for_many_users() {
    let app = create_test_app().await;

    let mut handles = vec![];
    for i in 0..10 {
        let (user, _) = app.create_user(&format!("User{}", i), 20).await;
        let chats = app.chats.clone();
        handles.push(tokio::spawn(async move {
            chats.create_chat(&user.id, &user.name, "New Chat").await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}
