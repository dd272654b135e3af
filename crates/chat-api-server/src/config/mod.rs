pub mod settings;

pub use settings::{LlmConfig, LoggingConfig, MemoryConfig, PromptsConfig, ServerConfig, Settings};
