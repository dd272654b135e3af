//! Conversation memory management module
//!
//! Provides in-memory per-user conversation state with:
//! - Thread-safe storage (DashMap) with one lock per user
//! - Inactivity expiry through a self-rescheduling sweeper

pub mod store;
pub mod sweeper;
pub mod types;

pub use store::{ConversationSlot, ConversationStore};
pub use sweeper::ExpirySweeper;
pub use types::ConversationState;
