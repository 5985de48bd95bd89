//! Test helpers module
//!
//! Shared settings and client construction for the integration tests.

#![allow(dead_code)]

pub mod demo_bot;

use teloxide_testkit::config::{LogFormat, Settings};
use teloxide_testkit::{HandlerPipeline, TestClient, TestContext};

pub use demo_bot::*;

/// Default settings with a fixed RNG seed and quiet logging
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.fabricator.rng_seed = Some(42);
    settings.logging.level = "teloxide_testkit=debug".to_string();
    settings.logging.format = LogFormat::Pretty;
    settings
}

pub fn demo_pipeline() -> HandlerPipeline<HandlerError> {
    HandlerPipeline::new(schema())
}

/// Client driving the demo bot
pub async fn demo_client() -> TestClient {
    TestClient::create(&test_settings(), demo_pipeline())
        .await
        .expect("Failed to create test client")
}

pub fn demo_context() -> TestContext {
    TestContext::new(test_settings(), demo_pipeline())
}
