use flume::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

use super::types::ActivityLog;

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Queue capacity (max logs in memory before records are dropped)
    pub queue_capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
        }
    }
}

/// Fire-and-forget activity log backed by a bounded queue.
///
/// A background worker drains the queue into structured `tracing` events
/// under the `activity` target.
#[derive(Clone)]
pub struct ActivityLogger {
    sender: Sender<ActivityLog>,
}

impl ActivityLogger {
    /// Initialize logger with its background worker. Must run inside a tokio runtime.
    pub fn new(config: LoggerConfig) -> Self {
        let (logger, receiver) = Self::channel(config.queue_capacity);

        info!("Initializing ActivityLogger: queue={}", config.queue_capacity);

        tokio::spawn(async move {
            Self::worker_loop(receiver).await;
        });

        logger
    }

    /// Logger plus the raw receiving end, for callers that consume records themselves
    pub fn channel(capacity: usize) -> (Self, Receiver<ActivityLog>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, receiver)
    }

    /// Log activity (non-blocking). Drops the record when the queue is full.
    pub fn log(&self, activity: ActivityLog) {
        if let Err(e) = self.sender.try_send(activity) {
            warn!("Failed to enqueue activity log: {}", e);
        }
    }

    async fn worker_loop(receiver: Receiver<ActivityLog>) {
        debug!("Activity logger worker started");

        while let Ok(log) = receiver.recv_async().await {
            info!(
                target: "activity",
                user_id = %log.user_id,
                activity_type = log.activity_type.as_str(),
                status = log.activity_status.as_str(),
                prompt = log.message_content.as_deref().unwrap_or(""),
                response = log.response_content.as_deref().unwrap_or(""),
                history_len = log.history_len,
                processing_time_ms = log.processing_time_ms,
                error = log.error_message.as_deref().unwrap_or(""),
                created_at = %log.created_at,
                "activity recorded"
            );
        }

        info!("Activity logger worker shutting down (channel closed)");
    }

    pub fn queue_len(&self) -> usize {
        self.sender.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::types::{ActivityStatus, ActivityType};

    #[test]
    fn test_records_reach_receiver() {
        let (logger, receiver) = ActivityLogger::channel(8);
        logger.log(ActivityLog::builder("10.0.0.1", ActivityType::SessionCreated).build());
        logger.log(
            ActivityLog::builder("10.0.0.1", ActivityType::LlmError)
                .error("timeout")
                .build(),
        );

        let created = receiver.try_recv().unwrap();
        assert_eq!(created.activity_type, ActivityType::SessionCreated);
        assert_eq!(created.activity_status, ActivityStatus::Success);

        let failed = receiver.try_recv().unwrap();
        assert_eq!(failed.activity_status, ActivityStatus::Error);
        assert_eq!(failed.error_message.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let (logger, receiver) = ActivityLogger::channel(1);
        logger.log(ActivityLog::builder("a", ActivityType::RequestReceived).build());
        logger.log(ActivityLog::builder("b", ActivityType::RequestReceived).build());

        assert_eq!(logger.queue_len(), 1);
        assert_eq!(receiver.try_recv().unwrap().user_id, "a");
        assert!(receiver.try_recv().is_err());
    }
}
