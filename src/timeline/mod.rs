//! Timeline store: merges fetched boost batches into one ordered,
//! duplicate-free collection.

pub mod anchor;
pub mod store;

pub use anchor::{closest, Placement};
pub use store::{has_more, Insertion, MergeMode, MergeOutcome, TimelineEntry, TimelineStore};
