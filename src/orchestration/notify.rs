//! Per-cycle notification signals.

use serde::Serialize;
use tracing::info;

/// Signals produced by one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSignals {
    /// New boosts arrived on a cycle that is allowed to alert.
    pub new_events: bool,
    /// A boost landed between two existing ones.
    pub mid_list_insertion: bool,
}

/// Receives the signals of every poll cycle.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, signals: PollSignals);
}

/// Notification sink that logs the signals.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, signals: PollSignals) {
        if signals.new_events {
            info!("Pew pew pew! New boosts arrived");
        }
        if signals.mid_list_insertion {
            info!("Boost landed mid-timeline");
        }
    }
}
