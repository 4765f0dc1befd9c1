//! Domain types for the boost timeline.
//!
//! This module provides:
//! - Domain primitives: BoostIndex, FeedKind
//! - The wire-level BoostRecord and the Event it is normalized into
//! - TLV payload parsing with a non-fatal fallback

pub mod event;
pub mod primitives;

pub use event::{BoostRecord, Event, TlvPayload};
pub use primitives::{BoostIndex, FeedKind};
