use crate::config::Config;
use crate::datasource::{BatchQuery, EventSource, SourceError};
use crate::domain::{BoostIndex, Event};
use crate::render::RenderSink;
use crate::timeline::{MergeMode, TimelineStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::notify::{NotificationSink, PollSignals};

/// Cadence and request sizing of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub poll_interval: Duration,
    pub timestamp_refresh_interval: Duration,
    pub request_timeout: Duration,
    pub forward_count: u64,
    pub backfill_count: u64,
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timestamp_refresh_interval: Duration::from_millis(config.timestamp_refresh_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            forward_count: config.forward_count,
            backfill_count: config.backfill_count,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(7000),
            timestamp_refresh_interval: Duration::from_millis(60000),
            request_timeout: Duration::from_millis(5000),
            forward_count: 20,
            backfill_count: 100,
        }
    }
}

/// Summary of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollReport {
    pub mode: MergeMode,
    pub fetched: usize,
    pub added: usize,
    pub mid_list_insertion: bool,
    pub has_more: bool,
}

impl PollReport {
    fn nothing(mode: MergeMode, has_more: bool) -> Self {
        Self {
            mode,
            fetched: 0,
            added: 0,
            mid_list_insertion: false,
            has_more,
        }
    }
}

/// Requests the HTTP surface can make of the poll loop.
#[derive(Debug)]
pub enum PollCommand {
    LoadOlder { reply: oneshot::Sender<PollReport> },
}

/// Drives the timeline: fetches batches, merges them, forwards the results.
///
/// Every cycle runs to completion before the next starts, so merges apply in
/// fetch order and forward and backfill merges never overlap.
pub struct PollDriver {
    source: Arc<dyn EventSource>,
    store: Arc<RwLock<TimelineStore>>,
    render: Arc<dyn RenderSink>,
    notify: Arc<dyn NotificationSink>,
    settings: PollSettings,
    current_index: Option<BoostIndex>,
    // A cycle ended with nothing to show, so the first boost always alerts.
    awaiting_first: bool,
}

impl PollDriver {
    pub fn new(
        source: Arc<dyn EventSource>,
        store: Arc<RwLock<TimelineStore>>,
        render: Arc<dyn RenderSink>,
        notify: Arc<dyn NotificationSink>,
        settings: PollSettings,
    ) -> Self {
        Self {
            source,
            store,
            render,
            notify,
            settings,
            current_index: None,
            awaiting_first: false,
        }
    }

    /// Newest index reported by the ledger at the last initialization.
    pub fn current_index(&self) -> Option<BoostIndex> {
        self.current_index
    }

    /// Look up the ledger's newest index and load the most recent page below it.
    pub async fn initialize(&mut self) -> PollReport {
        let fetched = match timeout(
            self.settings.request_timeout,
            self.source.fetch_current_index(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout),
        };

        let index = match fetched {
            Ok(Some(index)) if index >= BoostIndex::MIN.as_u64() => BoostIndex::new(index),
            Ok(_) => BoostIndex::MIN,
            Err(e) => {
                warn!("Failed to fetch current index: {}", e);
                self.notify.notify(PollSignals::default());
                let has_more = self.store.read().await.has_more();
                return PollReport::nothing(MergeMode::Backfill, has_more);
            }
        };

        info!("Ledger reports current index {}", index);
        self.current_index = Some(index);

        let query = BatchQuery::older(index, self.settings.backfill_count);
        self.run_cycle(query, MergeMode::Backfill, false).await
    }

    /// One scheduled data poll.
    ///
    /// An empty timeline is re-initialized; otherwise boosts newer than the
    /// head are requested.
    pub async fn tick(&mut self) -> PollReport {
        let head = self.store.read().await.head_index();
        let Some(head) = head else {
            return self.initialize().await;
        };

        let from = self.current_index.map_or(head, |current| current.max(head));
        let query = BatchQuery::newer(from, self.settings.forward_count);
        self.run_cycle(query, MergeMode::ForwardFresh, true).await
    }

    /// Load the page of boosts below the current tail.
    pub async fn load_older(&mut self) -> PollReport {
        let tail = self.store.read().await.tail_index();
        let Some(tail) = tail else {
            self.notify.notify(PollSignals::default());
            return PollReport::nothing(MergeMode::Backfill, true);
        };

        let query = if tail < BoostIndex::MIN {
            BatchQuery::newer(BoostIndex::MIN, self.settings.backfill_count)
        } else {
            BatchQuery::older(tail, self.settings.backfill_count)
        };
        self.run_cycle(query, MergeMode::Backfill, false).await
    }

    /// Presentation-only refresh; leaves the timeline alone.
    pub fn refresh_timestamps(&self) {
        self.render.refresh_timestamps();
    }

    async fn fetch(&self, query: &BatchQuery) -> Vec<Event> {
        match timeout(self.settings.request_timeout, self.source.fetch_events(query)).await {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => {
                warn!("Poll for index {} failed: {}", query.index, e);
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "Poll for index {} timed out after {:?}",
                    query.index, self.settings.request_timeout
                );
                Vec::new()
            }
        }
    }

    async fn run_cycle(&mut self, query: BatchQuery, mode: MergeMode, alert: bool) -> PollReport {
        let events = self.fetch(&query).await;
        let fetched = events.len();

        let (outcome, has_more, is_empty) = {
            let mut store = self.store.write().await;
            let outcome = store.merge_batch(events, mode);
            (outcome, store.has_more(), store.is_empty())
        };

        for insertion in &outcome.insertions {
            self.render.insert(insertion);
        }

        let signals = PollSignals {
            new_events: outcome.new_events() && (alert || self.awaiting_first),
            mid_list_insertion: outcome.mid_list_insertion,
        };
        self.notify.notify(signals);

        if is_empty {
            self.awaiting_first = true;
        } else if outcome.new_events() {
            self.awaiting_first = false;
        }

        debug!(
            "Poll cycle {:?}: fetched={}, added={}, has_more={}",
            mode,
            fetched,
            outcome.added(),
            has_more
        );

        PollReport {
            mode,
            fetched,
            added: outcome.added(),
            mid_list_insertion: outcome.mid_list_insertion,
            has_more,
        }
    }

    /// Run the poll loop until the command channel closes.
    ///
    /// The first data poll fires immediately and initializes the timeline.
    pub async fn run(mut self, mut commands: mpsc::Receiver<PollCommand>) {
        let mut poll = interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut refresh = interval(self.settings.timestamp_refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
        refresh.tick().await;

        info!(
            "Poll loop started: every {:?}, timestamps every {:?}",
            self.settings.poll_interval, self.settings.timestamp_refresh_interval
        );

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    self.tick().await;
                }
                _ = refresh.tick() => {
                    self.refresh_timestamps();
                }
                command = commands.recv() => match command {
                    Some(PollCommand::LoadOlder { reply }) => {
                        let report = self.load_older().await;
                        if reply.send(report).is_err() {
                            debug!("Load-older requester went away");
                        }
                    }
                    None => {
                        info!("Command channel closed, stopping poll loop");
                        break;
                    }
                },
            }
        }
    }
}
