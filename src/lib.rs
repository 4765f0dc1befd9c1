pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod error;
pub mod numerology;
pub mod orchestration;
pub mod render;
pub mod timeline;

pub use config::Config;
pub use datasource::{BatchQuery, EventSource, HttpEventSource, MockEventSource, SourceError};
pub use domain::{BoostIndex, BoostRecord, Event, FeedKind, TlvPayload};
pub use error::AppError;
pub use numerology::{annotate, NumerologyResult, NumerologyRule};
pub use orchestration::{PollDriver, PollReport, PollSettings};
pub use timeline::{has_more, MergeMode, MergeOutcome, Placement, TimelineStore};
