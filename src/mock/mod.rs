//! Mock Bot API
//!
//! This module contains the response fabricator, the deterministic override
//! queues it consults, and the HTTP transport a `teloxide::Bot` talks to.

pub mod fabricator;
pub mod overrides;
pub mod transport;

pub use fabricator::ResponseFabricator;
pub use overrides::DiceOverrides;
pub use transport::MockTransport;
