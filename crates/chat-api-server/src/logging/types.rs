use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    RequestReceived,
    MessageSent,
    LlmError,
    SessionCreated,
    SessionExpired,
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RequestReceived => "request_received",
            Self::MessageSent => "message_sent",
            Self::LlmError => "llm_error",
            Self::SessionCreated => "session_created",
            Self::SessionExpired => "session_expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Error,
    Info,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityLog {
    pub user_id: String,
    pub activity_type: ActivityType,
    pub activity_status: ActivityStatus,

    pub message_content: Option<String>,
    pub response_content: Option<String>,
    pub history_len: Option<usize>,
    pub processing_time_ms: Option<u64>,
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub fn builder(user_id: impl Into<String>, activity_type: ActivityType) -> ActivityLogBuilder {
        ActivityLogBuilder::new(user_id.into(), activity_type)
    }
}

pub struct ActivityLogBuilder {
    log: ActivityLog,
}

impl ActivityLogBuilder {
    pub fn new(user_id: String, activity_type: ActivityType) -> Self {
        Self {
            log: ActivityLog {
                user_id,
                activity_type,
                activity_status: ActivityStatus::Success,
                message_content: None,
                response_content: None,
                history_len: None,
                processing_time_ms: None,
                error_message: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn status(mut self, status: ActivityStatus) -> Self {
        self.log.activity_status = status;
        self
    }

    pub fn message(mut self, content: &str) -> Self {
        self.log.message_content = Some(content.to_string());
        self
    }

    pub fn response(mut self, content: &str) -> Self {
        self.log.response_content = Some(content.to_string());
        self
    }

    pub fn history_len(mut self, len: usize) -> Self {
        self.log.history_len = Some(len);
        self
    }

    pub fn processing_time_ms(mut self, ms: u64) -> Self {
        self.log.processing_time_ms = Some(ms);
        self
    }

    pub fn error(mut self, error: &str) -> Self {
        self.log.error_message = Some(error.to_string());
        self.log.activity_status = ActivityStatus::Error;
        self
    }

    pub fn build(self) -> ActivityLog {
        self.log
    }
}
