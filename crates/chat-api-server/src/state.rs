use axum::extract::FromRef;
use std::sync::Arc;

use crate::services::conversation::{ConversationStore, ExpirySweeper};
use crate::services::AnswerService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<dyn AnswerService>,
    pub store: Arc<ConversationStore>,
    pub sweeper: Arc<ExpirySweeper>,
}

impl FromRef<AppState> for Arc<dyn AnswerService> {
    fn from_ref(state: &AppState) -> Self {
        state.query_service.clone()
    }
}
