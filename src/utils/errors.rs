//! Error handling for teloxide-testkit
//!
//! This module defines the error type shared by the capture, mock transport,
//! factory and client layers. Every error is fatal for the call that raised it;
//! nothing in the crate retries.

use thiserror::Error;

use crate::models::DiceEmoji;

/// Boxed error produced by a dispatch pipeline under test
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for teloxide-testkit
#[derive(Error, Debug)]
pub enum TestkitError {
    #[error("Unsupported call kind: {method}")]
    UnsupportedCallKind { method: String },

    #[error("Invalid override value {value} for {category}: valid range is {min}-{max}")]
    InvalidOverrideValue {
        category: DiceEmoji,
        value: u8,
        min: u8,
        max: u8,
    },

    #[error("Dispatch failure: {0}")]
    DispatchFailure(#[source] BoxError),

    #[error("Fixture error: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Test context is not open")]
    ContextNotOpen,
}

/// Result type alias for teloxide-testkit operations
pub type Result<T> = std::result::Result<T, TestkitError>;

impl TestkitError {
    /// Get the Bot API method name for errors raised by the transport
    pub fn method(&self) -> Option<&str> {
        match self {
            TestkitError::UnsupportedCallKind { method } => Some(method),
            _ => None,
        }
    }

    /// Check if the error came from the bot code under test rather than the harness
    pub fn is_dispatch_failure(&self) -> bool {
        matches!(self, TestkitError::DispatchFailure(_))
    }
}
