//! teloxide-testkit
//!
//! Test doubles for teloxide bots. Outgoing Bot API calls are answered by an
//! in-process mock server that fabricates plausible responses and records
//! every call, while simulated users feed updates through the bot's own
//! dispatch pipeline. Dice outcomes can be queued per emoji for deterministic
//! game tests.

pub mod capture;
pub mod client;
pub mod config;
pub mod factories;
pub mod mock;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{Result, TestkitError};

// Re-export main components for easy access
pub use capture::CaptureStore;
pub use client::{DispatchPipeline, FnPipeline, HandlerPipeline, TestClient, TestContext, TestUser};
pub use factories::{FactoryContext, UserSpec};
pub use mock::MockTransport;
pub use models::{CallKind, DiceEmoji, RequestRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
