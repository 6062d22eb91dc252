//! FlashGPT server - chat and image generation backend with metered credits

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;

// Re-export main types for convenience
pub use crate::api::error::AppError;
pub use crate::api::routes::{create_router, AppState};
pub use crate::config::Config;
pub use crate::models::internal::{Chat, Role, Turn, User};
pub use crate::services::MessageService;
pub use crate::storage::db::init_db;
pub use crate::storage::repository::{ChatRepository, SeaOrmChatRepository};
pub use crate::storage::user_repository::{SeaOrmUserRepository, UserRepository};
