//! Harness settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from an optional config file and environment variables.

use serde::{Deserialize, Serialize};

/// Main harness configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub capture: CaptureConfig,
    pub fabricator: FabricatorConfig,
    pub logging: LoggingConfig,
}

/// Identity of the mocked bot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub id: u64,
    pub username: String,
    pub first_name: String,
}

/// Capture store behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Whether `contains_text` style queries compare case-sensitively
    pub case_sensitive: bool,
}

/// Response fabrication
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FabricatorConfig {
    /// Seed for randomized outcomes; `None` seeds from entropy
    pub rng_seed: Option<u64>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from defaults, the `testkit` config file and `TESTKIT__*` variables
    pub fn new() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("testkit").required(false))
            .add_source(
                config::Environment::with_prefix("TESTKIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::TestkitError> {
        super::validation::validate_settings(self)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: "123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".to_string(),
            id: 123456,
            username: "test_bot".to_string(),
            first_name: "Test Bot".to_string(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { case_sensitive: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file_path: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            capture: CaptureConfig::default(),
            fabricator: FabricatorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
