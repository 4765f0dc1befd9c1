//! Boost events as received from the ledger's list endpoint.

use crate::domain::BoostIndex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Raw boost record exactly as the list endpoint serializes it.
///
/// Amounts are millisats. Every field except `index` may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoostRecord {
    pub index: u64,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub value_msat: Option<i64>,
    #[serde(default)]
    pub value_msat_total: Option<i64>,
    #[serde(default)]
    pub action: Option<u8>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub podcast: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
    #[serde(default)]
    pub tlv: Option<String>,
    #[serde(default)]
    pub remote_podcast: Option<String>,
    #[serde(default)]
    pub remote_episode: Option<String>,
}

/// Free-form TLV payload attached to a boost.
///
/// The ledger stores it as a serialized JSON object. When that string does not
/// parse into an object the payload is empty and flagged `malformed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TlvPayload {
    pub fields: Map<String, Value>,
    #[serde(skip)]
    pub malformed: bool,
}

impl TlvPayload {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => TlvPayload {
                fields,
                malformed: false,
            },
            Ok(_) => Self::malformed(),
            Err(e) => {
                debug!("Unparseable TLV payload: {}", e);
                Self::malformed()
            }
        }
    }

    pub fn malformed() -> Self {
        TlvPayload {
            fields: Map::new(),
            malformed: true,
        }
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Recipient name (populated on sent boosts).
    pub fn name(&self) -> Option<&str> {
        self.get_str("name").filter(|s| !s.is_empty())
    }

    pub fn reply_address(&self) -> Option<&str> {
        self.get_str("reply_address").filter(|s| !s.is_empty())
    }

    pub fn reply_custom_key(&self) -> &str {
        self.get_str("reply_custom_key").unwrap_or("")
    }

    pub fn reply_custom_value(&self) -> &str {
        self.get_str("reply_custom_value").unwrap_or("")
    }

    pub fn remote_feed_guid(&self) -> Option<&str> {
        self.get_str("remote_feed_guid").filter(|s| !s.is_empty())
    }
}

/// One boost in the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub index: BoostIndex,
    /// Amount the sender boosted, in sats.
    pub amount_total_sats: u64,
    /// Amount that reached this node after splits and fees, in sats.
    pub amount_actual_sats: u64,
    pub action: u8,
    pub app: String,
    pub podcast: String,
    pub episode: String,
    pub remote_podcast: String,
    pub remote_episode: String,
    pub sender: String,
    pub message: String,
    pub tlv: TlvPayload,
    /// Unix seconds.
    pub time: i64,
}

impl Event {
    /// Minimal event with the given index and total amount. Mostly useful in tests.
    pub fn new(index: u64, amount_total_sats: u64) -> Self {
        Event {
            index: BoostIndex::new(index),
            amount_total_sats,
            amount_actual_sats: amount_total_sats,
            action: 0,
            app: String::new(),
            podcast: String::new(),
            episode: String::new(),
            remote_podcast: String::new(),
            remote_episode: String::new(),
            sender: String::new(),
            message: String::new(),
            tlv: TlvPayload::default(),
            time: 0,
        }
    }
}

fn msat_to_sats(msat: Option<i64>) -> u64 {
    msat.map(|v| (v / 1000).max(0) as u64).unwrap_or(0)
}

impl From<BoostRecord> for Event {
    fn from(record: BoostRecord) -> Self {
        let amount_actual_sats = msat_to_sats(record.value_msat);
        let amount_total_sats = match msat_to_sats(record.value_msat_total) {
            0 => amount_actual_sats,
            total => total,
        };
        let tlv = TlvPayload::parse(record.tlv.as_deref().unwrap_or(""));

        Event {
            index: BoostIndex::new(record.index),
            amount_total_sats,
            amount_actual_sats,
            action: record.action.unwrap_or(0),
            app: record.app.unwrap_or_default(),
            podcast: record.podcast.unwrap_or_default(),
            episode: record.episode.unwrap_or_default(),
            remote_podcast: record.remote_podcast.unwrap_or_default(),
            remote_episode: record.remote_episode.unwrap_or_default(),
            sender: record.sender.unwrap_or_default(),
            message: record.message.unwrap_or_default(),
            tlv,
            time: record.time.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: serde_json::Value) -> BoostRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_event_from_full_record() {
        let rec = record(serde_json::json!({
            "index": 42,
            "time": 1700000000,
            "value_msat": 900000,
            "value_msat_total": 1000000,
            "action": 2,
            "sender": "alice",
            "app": "Fountain",
            "message": "great show",
            "podcast": "Podcasting 2.0",
            "episode": "Episode 150",
            "tlv": "{\"reply_address\":\"02abc\",\"name\":\"Adam\"}",
            "remote_podcast": null,
            "remote_episode": null
        }));

        let event = Event::from(rec);
        assert_eq!(event.index, BoostIndex::new(42));
        assert_eq!(event.amount_total_sats, 1000);
        assert_eq!(event.amount_actual_sats, 900);
        assert_eq!(event.action, 2);
        assert_eq!(event.sender, "alice");
        assert_eq!(event.remote_podcast, "");
        assert_eq!(event.tlv.reply_address(), Some("02abc"));
        assert_eq!(event.tlv.name(), Some("Adam"));
        assert!(!event.tlv.malformed);
    }

    #[test]
    fn test_total_falls_back_to_actual() {
        let rec = record(serde_json::json!({
            "index": 1,
            "value_msat": 21999,
            "value_msat_total": 0
        }));
        let event = Event::from(rec);
        assert_eq!(event.amount_total_sats, 21);
        assert_eq!(event.amount_actual_sats, 21);
    }

    #[test]
    fn test_malformed_tlv_yields_empty_payload() {
        let rec = record(serde_json::json!({
            "index": 7,
            "tlv": "{not json"
        }));
        let event = Event::from(rec);
        assert!(event.tlv.fields.is_empty());
        assert!(event.tlv.malformed);
        assert_eq!(event.tlv.reply_address(), None);
    }

    #[test]
    fn test_non_object_tlv_is_malformed() {
        assert!(TlvPayload::parse("[1,2,3]").malformed);
        assert!(TlvPayload::parse("").malformed);
    }

    #[test]
    fn test_reply_custom_defaults_to_empty() {
        let tlv = TlvPayload::parse("{\"reply_address\":\"02abc\"}");
        assert_eq!(tlv.reply_custom_key(), "");
        assert_eq!(tlv.reply_custom_value(), "");
    }
}
