//! Configuration validation module
//!
//! This module provides validation functions for harness configuration
//! so that a misconfigured bot identity fails before any test traffic.

use crate::utils::errors::{TestkitError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    let (prefix, secret) = config.token.split_once(':').ok_or_else(|| {
        TestkitError::Config("Bot token must look like <bot id>:<secret>".to_string())
    })?;

    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) || secret.is_empty() {
        return Err(TestkitError::Config(
            "Bot token must look like <bot id>:<secret>".to_string()
        ));
    }

    if config.id == 0 {
        return Err(TestkitError::Config(
            "Bot id must be greater than 0".to_string()
        ));
    }

    if prefix != config.id.to_string() {
        return Err(TestkitError::Config(format!(
            "Bot token prefix {} does not match bot id {}",
            prefix, config.id
        )));
    }

    if config.username.is_empty() || config.username.starts_with('@') {
        return Err(TestkitError::Config(
            "Bot username is required and must not start with '@'".to_string()
        ));
    }

    if config.first_name.is_empty() {
        return Err(TestkitError::Config(
            "Bot first name is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TestkitError::Config(
            "Log level is required".to_string()
        ));
    }

    tracing_subscriber::EnvFilter::try_new(&config.level).map_err(|e| {
        TestkitError::Config(format!("Invalid log filter '{}': {}", config.level, e))
    })?;

    if let Some(path) = &config.file_path {
        if path.is_empty() {
            return Err(TestkitError::Config(
                "Log file path must not be empty when set".to_string()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_token_without_separator_rejected() {
        let mut settings = Settings::default();
        settings.bot.token = "not-a-token".to_string();
        assert_matches!(validate_settings(&settings), Err(TestkitError::Config(_)));
    }

    #[test]
    fn test_token_prefix_must_match_id() {
        let mut settings = Settings::default();
        settings.bot.id = 42;
        let error = validate_settings(&settings).unwrap_err();
        assert!(error.to_string().contains("does not match"));
    }

    #[test]
    fn test_username_with_at_sign_rejected() {
        let mut settings = Settings::default();
        settings.bot.username = "@test_bot".to_string();
        assert_matches!(validate_settings(&settings), Err(TestkitError::Config(_)));
    }

    #[test]
    fn test_bad_log_filter_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = "teloxide_testkit=verbose".to_string();
        assert_matches!(validate_settings(&settings), Err(TestkitError::Config(_)));
    }
}
