pub mod client_ip;
pub mod error;

pub use client_ip::resolve_user_id;
pub use error::ApiError;
