//! Event source abstraction for fetching boost batches from the ledger API.

use crate::domain::{BoostIndex, Event};
use async_trait::async_trait;
use std::fmt;

pub mod http;
pub mod mock;

pub use http::HttpEventSource;
pub use mock::MockEventSource;

/// Parameters of one list request.
///
/// With `old` unset the ledger returns up to `count` boosts at or above
/// `index`; with `old` set, up to `count` boosts at or below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchQuery {
    pub index: BoostIndex,
    pub count: u64,
    pub old: bool,
}

impl BatchQuery {
    /// Boosts at or above `index`.
    pub fn newer(index: BoostIndex, count: u64) -> Self {
        Self {
            index,
            count,
            old: false,
        }
    }

    /// Boosts at or below `index`.
    pub fn older(index: BoostIndex, count: u64) -> Self {
        Self {
            index,
            count,
            old: true,
        }
    }

    /// Query string pairs in the order the ledger documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("index", self.index.to_string())];
        if self.count > 0 {
            pairs.push(("count", self.count.to_string()));
        }
        if self.old {
            pairs.push(("old", "true".to_string()));
        }
        pairs
    }
}

/// Source of boost batches.
///
/// Implementations own transport concerns: retry, backoff, rate limiting.
#[async_trait]
pub trait EventSource: Send + Sync + fmt::Debug {
    /// Fetch one batch of boosts.
    ///
    /// Records that cannot be parsed are dropped; the rest are returned in the
    /// order the ledger sent them.
    async fn fetch_events(&self, query: &BatchQuery) -> Result<Vec<Event>, SourceError>;

    /// Most recent index the ledger knows about.
    ///
    /// Returns `None` when the ledger answered with something other than a
    /// non-negative integer.
    async fn fetch_current_index(&self) -> Result<Option<u64>, SourceError>;
}

/// Error type for event source operations.
#[derive(Debug, Clone)]
pub enum SourceError {
    /// Network error (e.g., connection refused, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// No response within the poll's time budget
    Timeout,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            SourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            SourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SourceError::RateLimited => write!(f, "Rate limited"),
            SourceError::Timeout => write!(f, "Timed out"),
        }
    }
}

impl std::error::Error for SourceError {}
