//! Request capture
//!
//! This module records every outgoing Bot API call for later assertions.

pub mod store;

pub use store::{CaptureStore, TextMatch};
