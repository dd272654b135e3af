use anyhow::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,chat_api_server=debug".to_string());
    let filter = EnvFilter::try_new(&log_level)?;

    // Optional daily-rolling file output (logs/chat.YYYY-MM-DD.log)
    let file_layer = match &config.directory {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("chat")
                .filename_suffix("log")
                .build(dir)?;
            let layer = if config.format == "json" {
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_target(true)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(appender)
                    .with_target(true)
                    .with_ansi(false)
                    .boxed()
            };
            Some(layer)
        }
        None => None,
    };

    let stdout_layer = match config.format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        _ => fmt::layer()
            .pretty()
            .with_writer(std::io::stdout)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
