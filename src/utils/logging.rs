//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the harness. Initialization is safe to repeat from every test.

use std::path::Path;

use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};
use crate::models::{CallKind, DiceEmoji};
use crate::utils::errors::{Result, TestkitError};

/// Initialize logging based on configuration
///
/// Only the first call in a process installs a subscriber; later calls return `Ok(())`.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TestkitError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let console = match config.format {
        LogFormat::Pretty => fmt::layer().with_test_writer().boxed(),
        LogFormat::Json => fmt::layer().json().with_test_writer().boxed(),
    };

    let file = config.file_path.as_ref().map(|file_path| {
        let path = Path::new(file_path);
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "testkit.log".to_string());
        let appender = tracing_appender::rolling::never(directory, file_name);
        fmt::layer().with_ansi(false).with_writer(appender)
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .is_ok();

    if installed {
        info!("Logging initialized with level: {}", config.level);
    }
    Ok(())
}

/// Log a request recorded by the mock transport
pub fn log_captured_request(kind: CallKind, chat_id: Option<i64>, sequence: u64) {
    debug!(
        method = kind.method_name(),
        chat_id = chat_id,
        sequence = sequence,
        "Bot API call captured"
    );
}

/// Log a Bot API call the transport refused to fabricate
pub fn log_rejected_call(method: &str) {
    warn!(method = method, "Bot API call is not supported by the mock transport");
}

/// Log an override value queued for a dice category
pub fn log_override_queued(category: DiceEmoji, value: u8, pending: usize) {
    debug!(
        category = %category,
        value = value,
        pending = pending,
        "Override value queued"
    );
}

/// Log the outcome of feeding one update through the dispatch pipeline
pub fn log_dispatch(update_kind: &str, chat_id: Option<i64>, produced: usize, success: bool) {
    if success {
        debug!(
            update_kind = update_kind,
            chat_id = chat_id,
            produced = produced,
            "Update dispatched"
        );
    } else {
        warn!(
            update_kind = update_kind,
            chat_id = chat_id,
            produced = produced,
            "Update dispatch failed"
        );
    }
}
