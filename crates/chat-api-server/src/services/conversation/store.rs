use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::logging::{ActivityLog, ActivityLogger, ActivityStatus, ActivityType};
use crate::models::chat::{ChatMessage, Role, UserId};
use crate::utils::error::ApiError;

use super::types::ConversationState;

/// One user's conversation behind its own lock
pub type ConversationSlot = Arc<Mutex<ConversationState>>;

/// In-memory conversation store keyed by user id.
///
/// Map shards are locked only for lookups; all history mutation goes through
/// the per-user mutex, so different users never wait on each other.
pub struct ConversationStore {
    storage: DashMap<UserId, ConversationSlot>,
    system_prompt: Arc<str>,
    logger: ActivityLogger,
}

impl ConversationStore {
    pub fn new(system_prompt: impl Into<Arc<str>>, logger: ActivityLogger) -> Self {
        info!("Initializing conversation store with DashMap");
        Self {
            storage: DashMap::new(),
            system_prompt: system_prompt.into(),
            logger,
        }
    }

    /// Existing slot for `user_id`, or a new one seeded with the system prompt
    pub fn get_or_create(&self, user_id: &str) -> ConversationSlot {
        if let Some(entry) = self.storage.get(user_id) {
            return entry.value().clone();
        }

        let mut created = false;
        let slot = self
            .storage
            .entry(user_id.to_string())
            .or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(ConversationState::new(
                    self.system_prompt.clone(),
                    Instant::now(),
                )))
            })
            .value()
            .clone();

        if created {
            info!("🟢 New conversation for user: {}", user_id);
            self.logger.log(
                ActivityLog::builder(user_id, ActivityType::SessionCreated)
                    .status(ActivityStatus::Info)
                    .build(),
            );
        }

        slot
    }

    fn slot(&self, user_id: &str) -> Option<ConversationSlot> {
        self.storage.get(user_id).map(|entry| entry.value().clone())
    }

    /// Append to an existing history
    pub async fn append(&self, user_id: &str, role: Role, content: &str) -> Result<(), ApiError> {
        let slot = self
            .slot(user_id)
            .ok_or_else(|| ApiError::NotFound(format!("No conversation for user {}", user_id)))?;
        let mut state = slot.lock().await;
        Self::append_locked(user_id, &mut state, role, content)
    }

    /// Append through a guard the caller already holds. A state that was
    /// evicted before the lock was taken no longer belongs to the store.
    pub fn append_locked(
        user_id: &str,
        state: &mut ConversationState,
        role: Role,
        content: &str,
    ) -> Result<(), ApiError> {
        if state.evicted {
            return Err(ApiError::NotFound(format!(
                "No conversation for user {}",
                user_id
            )));
        }

        state.push(ChatMessage::new(role, content));
        Ok(())
    }

    /// Remove history and activity record. Returns false when there was nothing to remove.
    pub async fn evict(&self, user_id: &str) -> bool {
        let Some(slot) = self.slot(user_id) else {
            return false;
        };

        // Waits for an in-flight request on this user to finish first
        let mut state = slot.lock().await;
        if state.evicted {
            return false;
        }
        state.evicted = true;
        self.storage
            .remove_if(user_id, |_, current| Arc::ptr_eq(current, &slot));

        debug!("Evicted conversation for user {}", user_id);
        true
    }

    /// Evict every conversation idle for longer than `max_idle` as of `now`.
    ///
    /// Slots whose lock is held belong to an in-flight request and are skipped.
    pub fn evict_idle(&self, now: Instant, max_idle: Duration) -> Vec<UserId> {
        let candidates: Vec<(UserId, ConversationSlot)> = self
            .storage
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut evicted = Vec::new();

        for (user_id, slot) in candidates {
            let Ok(mut state) = slot.try_lock() else {
                debug!("Conversation for {} is busy, skipping", user_id);
                continue;
            };

            if state.evicted || !state.is_idle(now, max_idle) {
                continue;
            }

            state.evicted = true;
            self.storage
                .remove_if(&user_id, |_, current| Arc::ptr_eq(current, &slot));
            evicted.push(user_id);
        }

        evicted
    }

    /// Snapshot of a user's history, system message first
    pub async fn history(&self, user_id: &str) -> Option<Vec<ChatMessage>> {
        let slot = self.slot(user_id)?;
        let state = slot.lock().await;
        Some(state.history())
    }

    pub async fn last_activity(&self, user_id: &str) -> Option<Instant> {
        let slot = self.slot(user_id)?;
        let state = slot.lock().await;
        Some(state.last_activity)
    }

    /// Number of active conversations
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}
