//! Test-facing surface
//!
//! This module contains the dispatch pipeline boundary, the [`TestClient`]
//! façade, simulated users and the per-test context.

pub mod context;
pub mod pipeline;
pub mod test_client;
pub mod user;

pub use context::TestContext;
pub use pipeline::{DispatchPipeline, FnPipeline, HandlerPipeline};
pub use test_client::TestClient;
pub use user::TestUser;
