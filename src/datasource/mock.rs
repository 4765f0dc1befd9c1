//! Mock event source for testing without network calls.

use super::{BatchQuery, EventSource, SourceError};
use crate::domain::Event;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Mock event source answering list queries from an in-memory ledger.
///
/// Mirrors the ledger's paging: newer queries return ascending indices at or
/// above the requested index, older queries descending indices at or below it.
#[derive(Debug, Default)]
pub struct MockEventSource {
    events: Mutex<Vec<Event>>,
    current_index: Mutex<Option<u64>>,
    failure: Mutex<Option<SourceError>>,
    delay: Option<Duration>,
    queries: Mutex<Vec<BatchQuery>>,
}

impl MockEventSource {
    /// Create a new mock event source with an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event to the ledger.
    pub fn with_event(self, event: Event) -> Self {
        self.push_event(event);
        self
    }

    /// Add multiple events to the ledger.
    pub fn with_events(self, events: Vec<Event>) -> Self {
        for event in events {
            self.push_event(event);
        }
        self
    }

    /// Set the value returned by fetch_current_index.
    pub fn with_current_index(self, index: Option<u64>) -> Self {
        self.set_current_index(index);
        self
    }

    /// Delay every response, for exercising poll timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append an event after construction, as the ledger advancing would.
    pub fn push_event(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn set_current_index(&self, index: Option<u64>) {
        if let Ok(mut current) = self.current_index.lock() {
            *current = index;
        }
    }

    /// Make every call fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<SourceError>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = error;
        }
    }

    /// List queries received so far, oldest first.
    pub fn queries(&self) -> Vec<BatchQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    async fn respond(&self) -> Result<(), SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.lock() {
            Ok(failure) => match failure.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_events(&self, query: &BatchQuery) -> Result<Vec<Event>, SourceError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(*query);
        }
        self.respond().await?;

        let mut matching: Vec<Event> = match self.events.lock() {
            Ok(events) => events
                .iter()
                .filter(|e| {
                    if query.old {
                        e.index <= query.index
                    } else {
                        e.index >= query.index
                    }
                })
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        };

        if query.old {
            matching.sort_by(|a, b| b.index.cmp(&a.index));
        } else {
            matching.sort_by(|a, b| a.index.cmp(&b.index));
        }
        if query.count > 0 {
            matching.truncate(query.count as usize);
        }

        Ok(matching)
    }

    async fn fetch_current_index(&self) -> Result<Option<u64>, SourceError> {
        self.respond().await?;
        Ok(self.current_index.lock().ok().and_then(|c| *c))
    }
}
