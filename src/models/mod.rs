//! Data models
//!
//! This module contains the call kind enumeration, dice categories and the
//! captured request record.

pub mod call_kind;
pub mod dice;
pub mod request;

pub use call_kind::{CallKind, MessageContent, ResponseShape};
pub use dice::DiceEmoji;
pub use request::RequestRecord;
