pub mod internal;

pub use internal::{now_millis, Chat, Role, Turn, User};
