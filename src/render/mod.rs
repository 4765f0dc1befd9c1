//! Presentation side of the timeline.
//!
//! The store hands out [`Insertion`]s; this module turns entries into
//! [`BoostCard`]s and defines the sink the poll driver forwards insertions to.

pub mod apps;
pub mod format;

pub use apps::{AppInfo, AppLoadError, AppRegistry};
pub use format::{
    display_amount, iso_time, number_format, person, remote_item, DisplayAmount, RemoteItem,
};

use crate::domain::{BoostIndex, FeedKind};
use crate::timeline::{Insertion, TimelineEntry};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Where a reply boost would be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTarget {
    pub address: String,
    pub custom_key: String,
    pub custom_value: String,
}

/// Everything the rendering layer shows for one boost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostCard {
    pub index: BoostIndex,
    pub amount: DisplayAmount,
    pub person: String,
    pub numerology: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerology_hover: Option<String>,
    pub app: String,
    pub app_icon_url: String,
    pub app_href: String,
    pub podcast: String,
    pub episode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_item: Option<RemoteItem>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyTarget>,
    pub time_iso: String,
    pub tlv_available: bool,
}

impl BoostCard {
    pub fn from_entry(entry: &TimelineEntry, feed: FeedKind, apps: &AppRegistry) -> Self {
        let event = &entry.event;
        let reply = event.tlv.reply_address().map(|address| ReplyTarget {
            address: address.to_string(),
            custom_key: event.tlv.reply_custom_key().to_string(),
            custom_value: event.tlv.reply_custom_value().to_string(),
        });

        BoostCard {
            index: event.index,
            amount: display_amount(event.amount_total_sats, event.amount_actual_sats),
            person: person(feed, event),
            numerology: entry.numerology.decorated_text.clone(),
            numerology_hover: entry.numerology.hover_text(),
            app: event.app.clone(),
            app_icon_url: apps.icon_url(&event.app),
            app_href: apps.href(&event.app),
            podcast: event.podcast.clone(),
            episode: event.episode.clone(),
            remote_item: remote_item(event),
            message: event.message.trim().to_string(),
            reply,
            time_iso: iso_time(event.time),
            tlv_available: !event.tlv.malformed,
        }
    }
}

/// Receives positioned insertions and presentation-only refresh ticks.
pub trait RenderSink: Send + Sync {
    fn insert(&self, insertion: &Insertion);

    /// Relative timestamps are due for a refresh. Never touches the timeline.
    fn refresh_timestamps(&self) {}
}

/// Render sink that writes each new boost to the log.
#[derive(Debug, Clone)]
pub struct LogRenderSink {
    feed: FeedKind,
    apps: Arc<AppRegistry>,
}

impl LogRenderSink {
    pub fn new(feed: FeedKind, apps: Arc<AppRegistry>) -> Self {
        Self { feed, apps }
    }
}

impl RenderSink for LogRenderSink {
    fn insert(&self, insertion: &Insertion) {
        let card = BoostCard::from_entry(&insertion.entry, self.feed, &self.apps);
        info!(
            "New {} #{} at {:?}: {} {} {}",
            self.feed.singular_name(),
            card.index,
            insertion.placement,
            card.amount.text,
            card.person,
            card.numerology
        );
    }

    fn refresh_timestamps(&self) {
        tracing::debug!("Updating timestamps...");
    }
}
