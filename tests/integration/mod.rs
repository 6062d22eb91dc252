// tests/integration/mod.rs

pub use serde_json::json;
pub use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use flashgpt_server::{
    api::routes::{create_router, AppState},
    auth,
    config::Config,
    models::internal::{Chat, User},
    services::{
        image_service::{ImageError, ImageGenerator, MediaStore},
        llm_client::{ChatCompletion, ChatMessage, LlmError},
        payment::{PaymentError, PaymentGateway, Plan},
        MessageService, WebhookVerifier,
    },
    storage::{init_db, ChatRepository, SeaOrmChatRepository, SeaOrmUserRepository, UserRepository},
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub mod concurrency;

pub const JWT_SECRET: &str = "integration_secret_0123456789abcdef0123";
pub const WEBHOOK_SECRET: &str = "whsec_integration_test";

// ============================================
// Upstream fakes
// ============================================

/// Echoes the user prompt back after an optional delay.
#[derive(Default)]
pub struct FakeLlm {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    pub delay: Mutex<Option<Duration>>,
}

#[async_trait]
impl ChatCompletion for FakeLlm {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(LlmError::ApiError {
                status: 503,
                message: "model overloaded".to_string(),
            });
        }
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(format!("echo: {}", prompt))
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub fail_upload: AtomicBool,
    pub generated: AtomicUsize,
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate(&self, _prompt: &str, _file_stem: &str) -> Result<Vec<u8>, ImageError> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        Ok(b"png".to_vec())
    }
}

#[async_trait]
impl MediaStore for FakeImages {
    async fn upload(
        &self,
        _data_uri: String,
        file_name: &str,
        folder: &str,
    ) -> Result<String, ImageError> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(ImageError::ApiError {
                status: 500,
                message: "upload failed".to_string(),
            });
        }
        Ok(format!("https://ik.imagekit.test/{}/{}", folder, file_name))
    }
}

/// Records the last checkout it was asked to open.
#[derive(Default)]
pub struct FakePayments {
    pub last: Mutex<Option<(String, String)>>,
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_checkout(
        &self,
        plan: &Plan,
        transaction_id: &str,
        origin: &str,
    ) -> Result<String, PaymentError> {
        *self.last.lock().unwrap() = Some((transaction_id.to_string(), origin.to_string()));
        Ok(format!(
            "https://checkout.stripe.test/{}/{}",
            plan.id, transaction_id
        ))
    }
}

// ============================================
// Shared Test Helpers
// ============================================

pub struct TestApp {
    pub router: Router,
    pub config: Arc<Config>,
    pub chats: Arc<SeaOrmChatRepository>,
    pub users: Arc<SeaOrmUserRepository>,
    pub llm: Arc<FakeLlm>,
    pub images: Arc<FakeImages>,
    pub payments: Arc<FakePayments>,
    _dir: TempDir,
}

pub fn create_test_config() -> Config {
    Config {
        jwt_secret: JWT_SECRET.to_string(),
        stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
        client_url: "http://client.flashgpt.test".to_string(),
        ..Config::default()
    }
}

pub async fn create_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("flashgpt.db").display());
    let db = init_db(&url, 5).await.unwrap();

    let config = Arc::new(create_test_config());
    let chats = Arc::new(SeaOrmChatRepository::new(db.clone()));
    let users = Arc::new(SeaOrmUserRepository::new(db));
    let llm = Arc::new(FakeLlm::default());
    let images = Arc::new(FakeImages::default());
    let payments = Arc::new(FakePayments::default());

    let messages = Arc::new(MessageService::new(
        chats.clone(),
        users.clone(),
        llm.clone(),
        images.clone(),
        images.clone(),
        config.imagekit_folder.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        chats: chats.clone(),
        users: users.clone(),
        messages,
        payments: payments.clone(),
        webhook: Arc::new(WebhookVerifier::new(WEBHOOK_SECRET)),
    };

    TestApp {
        router: create_router(state),
        config,
        chats,
        users,
        llm,
        images,
        payments,
        _dir: dir,
    }
}

impl TestApp {
    /// New account plus a bearer token for it.
    pub async fn create_user(&self, name: &str, credits: i64) -> (User, String) {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = self.users.create_user(name, &email, credits).await.unwrap();
        let token = auth::issue_token(&user.id, JWT_SECRET, 30).unwrap();
        (user, token)
    }

    pub async fn create_chat(&self, user: &User) -> Chat {
        self.chats
            .create_chat(&user.id, &user.name, "New Chat")
            .await
            .unwrap()
    }

    pub async fn credits(&self, user_id: &str) -> i64 {
        self.users.find_by_id(user_id).await.unwrap().unwrap().credits
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}
