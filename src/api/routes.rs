use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{chat, credit, docs, message, user};
use crate::config::Config;
use crate::services::{MessageService, PaymentGateway, WebhookVerifier};
use crate::storage::{ChatRepository, UserRepository};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chats: Arc<dyn ChatRepository>,
    pub users: Arc<dyn UserRepository>,
    pub messages: Arc<MessageService>,
    pub payments: Arc<dyn PaymentGateway>,
    pub webhook: Arc<WebhookVerifier>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/api/user/data", get(user::user_data))
        .route("/api/user/published-images", get(user::published_images))
        .route("/api/chat/create", post(chat::create_chat))
        .route("/api/chat/get", get(chat::list_chats))
        .route("/api/chat/delete", post(chat::delete_chat))
        .route("/api/message/text", post(message::text_message))
        .route("/api/message/image", post(message::image_message))
        .route("/api/credit/plan", get(credit::list_plans))
        .route("/api/credit/purchase", post(credit::purchase_plan))
        .route("/api/stripe", post(credit::stripe_webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` allows any origin without credentials; anything else is taken as a
/// comma-separated allow list.
fn cors_layer(origins: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.trim() == "*" {
        return base.allow_origin(AllowOrigin::any());
    }

    let list: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if list.is_empty() {
        base.allow_origin(AllowOrigin::any())
    } else {
        base.allow_origin(AllowOrigin::list(list))
            .allow_credentials(true)
    }
}

pub async fn root() -> &'static str {
    "Server is Live!"
}

pub async fn health() -> &'static str {
    "OK"
}
