//! Domain primitives: BoostIndex, FeedKind.

use serde::{Deserialize, Serialize};

/// Ledger-assigned index of a boost. Unique per feed and used as the sort and
/// dedup key of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoostIndex(pub u64);

impl BoostIndex {
    /// Lowest index the ledger ever hands out.
    pub const MIN: BoostIndex = BoostIndex(1);

    /// Create a BoostIndex from a raw value.
    pub fn new(index: u64) -> Self {
        BoostIndex(index)
    }

    /// Get the underlying value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Absolute distance between two indices.
    pub fn distance(&self, other: BoostIndex) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl std::fmt::Display for BoostIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which ledger feed the timeline follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Boosts received by the node.
    Boosts,
    /// Streamed sats received by the node.
    Streams,
    /// Boosts sent from the node.
    Sent,
}

impl FeedKind {
    /// Path of the list endpoint on the event source.
    pub fn list_path(&self) -> &'static str {
        match self {
            FeedKind::Boosts => "/api/v1/boosts",
            FeedKind::Streams => "/api/v1/streams",
            FeedKind::Sent => "/api/v1/sent",
        }
    }

    /// Path of the endpoint reporting the newest known index.
    pub fn index_path(&self) -> &'static str {
        match self {
            FeedKind::Boosts | FeedKind::Streams => "/api/v1/index",
            FeedKind::Sent => "/api/v1/sent_index",
        }
    }

    pub fn singular_name(&self) -> &'static str {
        match self {
            FeedKind::Boosts => "boost",
            FeedKind::Streams => "stream",
            FeedKind::Sent => "sent boost",
        }
    }

    pub fn plural_name(&self) -> &'static str {
        match self {
            FeedKind::Boosts => "boosts",
            FeedKind::Streams => "streams",
            FeedKind::Sent => "sent boosts",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedKind::Boosts => write!(f, "boosts"),
            FeedKind::Streams => write!(f, "streams"),
            FeedKind::Sent => write!(f, "sent"),
        }
    }
}

impl std::str::FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boosts" => Ok(FeedKind::Boosts),
            "streams" => Ok(FeedKind::Streams),
            "sent" => Ok(FeedKind::Sent),
            other => Err(format!("must be boosts, streams, or sent, got {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_index_ordering() {
        assert!(BoostIndex::new(5) < BoostIndex::new(6));
        assert_eq!(BoostIndex::MIN.as_u64(), 1);
    }

    #[test]
    fn test_boost_index_distance_is_symmetric() {
        let a = BoostIndex::new(100);
        let b = BoostIndex::new(98);
        assert_eq!(a.distance(b), 2);
        assert_eq!(b.distance(a), 2);
    }

    #[test]
    fn test_boost_index_serializes_as_number() {
        let json = serde_json::to_string(&BoostIndex::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_feed_kind_paths() {
        assert_eq!(FeedKind::Boosts.list_path(), "/api/v1/boosts");
        assert_eq!(FeedKind::Streams.index_path(), "/api/v1/index");
        assert_eq!(FeedKind::Sent.index_path(), "/api/v1/sent_index");
        assert_eq!(FeedKind::Sent.plural_name(), "sent boosts");
    }

    #[test]
    fn test_feed_kind_from_str() {
        assert_eq!("streams".parse::<FeedKind>(), Ok(FeedKind::Streams));
        assert!("invoices".parse::<FeedKind>().is_err());
    }
}
