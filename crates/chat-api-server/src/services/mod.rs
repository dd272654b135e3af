pub mod conversation;
pub mod llm_service;
pub mod query_service;

pub use llm_service::{CompletionClient, LlmService};
pub use query_service::{AnswerService, QueryService};
