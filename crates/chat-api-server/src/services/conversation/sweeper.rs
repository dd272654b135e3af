use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::MemoryConfig;
use crate::logging::{ActivityLog, ActivityLogger, ActivityStatus, ActivityType};

use super::store::ConversationStore;

/// Evicts idle conversations, rescheduling itself only while any remain.
///
/// Nothing runs at idle. Each trigger sweeps immediately and replaces any
/// pending rescheduled run, so there is at most one chain of sweeps.
pub struct ExpirySweeper {
    store: Arc<ConversationStore>,
    expiration: Duration,
    interval: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    sweeps_run: AtomicU64,
    logger: ActivityLogger,
}

impl ExpirySweeper {
    pub fn new(store: Arc<ConversationStore>, config: &MemoryConfig, logger: ActivityLogger) -> Self {
        Self::with_timing(store, config.expiration(), config.sweep_interval(), logger)
    }

    pub fn with_timing(
        store: Arc<ConversationStore>,
        expiration: Duration,
        interval: Duration,
        logger: ActivityLogger,
    ) -> Self {
        Self {
            store,
            expiration,
            interval,
            pending: Mutex::new(None),
            sweeps_run: AtomicU64::new(0),
            logger,
        }
    }

    /// Fire-and-forget: sweep now on a background task
    pub fn trigger(self: &Arc<Self>) {
        let sweeper = Arc::clone(self);
        let mut pending = self.pending.lock();

        if let Some(previous) = pending.take() {
            previous.abort();
        }

        *pending = Some(tokio::spawn(async move {
            sweeper.run().await;
        }));
    }

    async fn run(self: Arc<Self>) {
        loop {
            let remaining = self.sweep_once(Instant::now());

            if remaining == 0 {
                info!("🔴 No conversations left, sweeper stopped");
                return;
            }

            debug!(
                "{} conversations active, next sweep in {:?}",
                remaining, self.interval
            );
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One scan-and-evict pass. Returns the number of conversations left.
    pub fn sweep_once(&self, now: Instant) -> usize {
        debug!("🔵 Checking for inactive conversations...");
        self.sweeps_run.fetch_add(1, Ordering::Relaxed);

        for user_id in self.store.evict_idle(now, self.expiration) {
            info!("🟠 Conversation expired for user: {}", user_id);
            self.logger.log(
                ActivityLog::builder(user_id, ActivityType::SessionExpired)
                    .status(ActivityStatus::Info)
                    .build(),
            );
        }

        self.store.size()
    }

    /// True while a sweep is running or waiting to run
    pub fn is_scheduled(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn sweeps_run(&self) -> u64 {
        self.sweeps_run.load(Ordering::Relaxed)
    }

    /// Cancel the pending run, if any
    pub fn shutdown(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
            info!("Sweeper cancelled");
        }
    }
}
