use std::sync::Arc;
use tokio::time::Instant;
use tracing::{error, info};

use crate::logging::{ActivityLog, ActivityLogger, ActivityStatus, ActivityType};
use crate::models::chat::Role;
use crate::services::conversation::{ConversationStore, ExpirySweeper};
use crate::services::llm_service::CompletionClient;
use crate::utils::error::ApiError;

/// The only contract the HTTP layer sees
#[async_trait::async_trait]
pub trait AnswerService: Send + Sync {
    async fn answer(&self, user_id: &str, prompt: &str) -> Result<String, ApiError>;
}

pub struct QueryService {
    store: Arc<ConversationStore>,
    sweeper: Arc<ExpirySweeper>,
    completion: Arc<dyn CompletionClient>,
    logger: ActivityLogger,
    fallback_reply: String,
}

impl QueryService {
    pub fn new(
        store: Arc<ConversationStore>,
        sweeper: Arc<ExpirySweeper>,
        completion: Arc<dyn CompletionClient>,
        logger: ActivityLogger,
        fallback_reply: String,
    ) -> Self {
        Self {
            store,
            sweeper,
            completion,
            logger,
            fallback_reply,
        }
    }
}

#[async_trait::async_trait]
impl AnswerService for QueryService {
    async fn answer(&self, user_id: &str, prompt: &str) -> Result<String, ApiError> {
        if prompt.is_empty() {
            return Err(ApiError::InvalidInput("El prompt es obligatorio.".to_string()));
        }

        let start_time = std::time::Instant::now();

        // Hold the user's lock for the whole exchange so concurrent requests
        // from the same user cannot interleave their turns.
        let mut state = loop {
            let slot = self.store.get_or_create(user_id);
            let state = slot.lock_owned().await;
            if !state.evicted {
                break state;
            }
            // Swept between lookup and lock; the next lookup creates a fresh one
        };

        state.touch(Instant::now());
        ConversationStore::append_locked(user_id, &mut state, Role::User, prompt)?;
        info!("🟡 {}: {}", user_id, prompt);

        self.logger.log(
            ActivityLog::builder(user_id, ActivityType::RequestReceived)
                .message(prompt)
                .history_len(state.message_count())
                .status(ActivityStatus::Info)
                .build(),
        );

        let messages = state.history();
        match self.completion.complete(&messages).await {
            Ok(reply) => {
                ConversationStore::append_locked(user_id, &mut state, Role::Assistant, &reply)?;
                let history_len = state.message_count();
                drop(state);

                info!("🟣 {}: {} chars", user_id, reply.chars().count());
                self.logger.log(
                    ActivityLog::builder(user_id, ActivityType::MessageSent)
                        .response(&reply)
                        .history_len(history_len)
                        .processing_time_ms(start_time.elapsed().as_millis() as u64)
                        .build(),
                );

                self.sweeper.trigger();
                Ok(reply)
            }
            Err(e) => {
                drop(state);
                error!("Completion failed for user {}: {:#}", user_id, e);
                self.logger.log(
                    ActivityLog::builder(user_id, ActivityType::LlmError)
                        .error(&format!("{:#}", e))
                        .processing_time_ms(start_time.elapsed().as_millis() as u64)
                        .build(),
                );

                Ok(self.fallback_reply.clone())
            }
        }
    }
}
