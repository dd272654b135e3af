pub mod chat;

pub use chat::{ChatMessage, ConsultarRequest, ConsultarResponse, Role, UserId};
