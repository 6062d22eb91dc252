use flashgpt_server::auth::{issue_token, verify_token, AuthError};
use jsonwebtoken::{encode, EncodingKey, Header};

const SECRET: &str = "auth_test_secret_0123456789abcdef0123";

#[test]
fn test_token_carries_user_id() {
    let token = issue_token("6650c0ffee", SECRET, 7).unwrap();
    let claims = verify_token(&token, SECRET).unwrap();

    assert_eq!(claims.id, "6650c0ffee");
    let now = chrono::Utc::now().timestamp() as usize;
    assert!(claims.exp > now + 6 * 24 * 3600);
}

#[test]
fn test_expired_token_is_rejected() {
    let claims = flashgpt_server::auth::Claims {
        id: "user-1".to_string(),
        exp: (chrono::Utc::now().timestamp() - 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    assert!(matches!(
        verify_token(&token, SECRET),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn test_garbage_token_is_rejected() {
    assert!(matches!(
        verify_token("not-a-jwt", SECRET),
        Err(AuthError::InvalidToken(_))
    ));
}
