pub mod chat;
pub mod resume;
