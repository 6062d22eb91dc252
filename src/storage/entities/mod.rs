pub mod chats;
pub mod messages;
pub mod transactions;
pub mod users;
