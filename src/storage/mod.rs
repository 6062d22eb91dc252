pub mod db;
pub mod entities;
pub mod migrations;
pub mod repository;
pub mod user_repository;

pub use db::init_db;
pub use entities::{chats, messages, transactions, users};
pub use repository::{ChatRepository, PublishedImage, RepositoryError, SeaOrmChatRepository};
pub use user_repository::{SeaOrmUserRepository, TransactionRecord, UserRepository};
