//! Value formatting shared by the presentation record.

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

use crate::domain::{Event, FeedKind};

/// Group digits in thousands: `1234567` -> `"1,234,567"`.
pub fn number_format(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Amount line with an optional note about what actually arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayAmount {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_note: Option<String>,
}

pub fn display_amount(total_sats: u64, actual_sats: u64) -> DisplayAmount {
    let received_note = if total_sats != actual_sats && total_sats > 0 && actual_sats > 0 {
        Some(format!(
            "{} sats received after splits/fees.",
            number_format(actual_sats)
        ))
    } else {
        None
    };

    DisplayAmount {
        text: format!("{} sats", number_format(total_sats)),
        received_note,
    }
}

/// Who the boost came from, or who it went to on the sent feed.
pub fn person(feed: FeedKind, event: &Event) -> String {
    if feed == FeedKind::Sent {
        if let Some(name) = event.tlv.name() {
            return format!("sent to {}", name);
        }
    }
    let sender = event.sender.trim();
    if sender.is_empty() {
        String::new()
    } else {
        format!("from {}", event.sender)
    }
}

/// Remote item (value-for-value split target) referenced by a boost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

pub fn remote_item(event: &Event) -> Option<RemoteItem> {
    if event.remote_episode.is_empty() {
        return None;
    }
    Some(RemoteItem {
        label: format!("({} - {})", event.remote_podcast, event.remote_episode),
        link: event
            .tlv
            .remote_feed_guid()
            .map(|guid| format!("https://podcastindex.org/podcast/{}", guid)),
    })
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn iso_time(unix_secs: i64) -> String {
    DateTime::from_timestamp(unix_secs, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
