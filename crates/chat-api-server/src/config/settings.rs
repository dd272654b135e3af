use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::error::ApiError;

pub const DEFAULT_FALLBACK_REPLY: &str = "Lo siento, ha habido un error al procesar tu solicitud. Pongase en contacto con el desarrollador.";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub prompts: PromptsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_token: String,
    pub model: String,
    pub timeout_seconds: u64,
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MemoryConfig {
    /// Minutes of inactivity before a conversation is evicted
    pub expiration_minutes: u64,
    /// Delay between self-rescheduled sweeps
    pub sweep_interval_seconds: u64,
}

impl MemoryConfig {
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_minutes.saturating_mul(60))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    pub system_prompt_path: String,
    pub fallback_reply: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `pretty` or `json`
    pub format: String,
    /// Daily-rolling log files are written here when set
    #[serde(default)]
    pub directory: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();

        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Variable names used by existing deployments
            .set_override_option("llm.api_token", std::env::var("OPENROUTER_API_TOKEN").ok())?
            .set_override_option(
                "memory.expiration_minutes",
                std::env::var("TIEMPO_EXPIRACION").ok(),
            )?
            .set_override_option(
                "memory.sweep_interval_seconds",
                std::env::var("TIEMPO_REPETICION").ok(),
            )?;

        Self::from_config(builder.build()?)
    }

    pub fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ApiError> {
        Ok(builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000_i64)?
            .set_default("llm.base_url", "https://openrouter.ai/api/v1")?
            .set_default("llm.model", "openrouter/quasar-alpha")?
            .set_default("llm.timeout_seconds", 60_i64)?
            .set_default("prompts.system_prompt_path", "files/model_config.pdf")?
            .set_default("prompts.fallback_reply", DEFAULT_FALLBACK_REPLY)?
            .set_default("logging.format", "pretty")?)
    }

    pub fn from_config(config: Config) -> Result<Self, ApiError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.llm.api_token.trim().is_empty() {
            return Err(ApiError::Configuration(
                "llm.api_token must not be empty".to_string(),
            ));
        }
        if self.memory.expiration_minutes.checked_mul(60).is_none() {
            return Err(ApiError::Configuration(format!(
                "memory.expiration_minutes is too large: {}",
                self.memory.expiration_minutes
            )));
        }
        if self.memory.sweep_interval_seconds == 0 {
            return Err(ApiError::Configuration(
                "memory.sweep_interval_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn system_prompt_path(&self) -> PathBuf {
        PathBuf::from(&self.prompts.system_prompt_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: &[(&str, &str)]) -> Result<Settings, ApiError> {
        let mut builder = Settings::with_defaults(Config::builder())?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        Settings::from_config(builder.build()?)
    }

    #[test]
    fn test_defaults_with_required_values() {
        let settings = build(&[
            ("llm.api_token", "sk-test"),
            ("memory.expiration_minutes", "15"),
            ("memory.sweep_interval_seconds", "30"),
        ])
        .unwrap();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.llm.model, "openrouter/quasar-alpha");
        assert_eq!(settings.memory.expiration(), Duration::from_secs(15 * 60));
        assert_eq!(settings.memory.sweep_interval(), Duration::from_secs(30));
        assert_eq!(settings.prompts.fallback_reply, DEFAULT_FALLBACK_REPLY);
        assert!(settings.llm.max_tokens.is_none());
    }

    #[test]
    fn test_missing_expiration_is_configuration_error() {
        let err = build(&[
            ("llm.api_token", "sk-test"),
            ("memory.sweep_interval_seconds", "30"),
        ])
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn test_non_numeric_interval_is_configuration_error() {
        let err = build(&[
            ("llm.api_token", "sk-test"),
            ("memory.expiration_minutes", "15"),
            ("memory.sweep_interval_seconds", "often"),
        ])
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let err = build(&[
            ("memory.expiration_minutes", "15"),
            ("memory.sweep_interval_seconds", "30"),
        ])
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));

        let err = build(&[
            ("llm.api_token", "  "),
            ("memory.expiration_minutes", "15"),
            ("memory.sweep_interval_seconds", "30"),
        ])
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn test_oversized_expiration_rejected() {
        let huge = (u64::MAX / 10).to_string();
        let err = build(&[
            ("llm.api_token", "sk-test"),
            ("memory.expiration_minutes", huge.as_str()),
            ("memory.sweep_interval_seconds", "30"),
        ])
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));

        let memory = MemoryConfig {
            expiration_minutes: u64::MAX / 10,
            sweep_interval_seconds: 30,
        };
        assert_eq!(memory.expiration(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = build(&[
            ("llm.api_token", "sk-test"),
            ("memory.expiration_minutes", "15"),
            ("memory.sweep_interval_seconds", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }
}
