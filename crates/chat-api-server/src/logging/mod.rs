//! Activity logging with an async queue, plus tracing subscriber setup

mod logger;
mod subscriber;
pub mod types;

pub use logger::{ActivityLogger, LoggerConfig};
pub use subscriber::init_tracing;
pub use types::{ActivityLog, ActivityStatus, ActivityType};
