pub mod chat;
pub mod credit;
pub mod docs;
pub mod dto;
pub mod error;
pub mod message;
pub mod routes;
pub mod user;
