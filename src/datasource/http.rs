//! HTTP client for the ledger's boost list API.

use super::{BatchQuery, EventSource, SourceError};
use crate::domain::{BoostRecord, Event, FeedKind};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Event source backed by the ledger's JSON API.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
    base_url: String,
    feed: FeedKind,
    max_retry_elapsed: Duration,
}

impl HttpEventSource {
    /// Create a new source for `feed` served at `base_url`.
    pub fn new(base_url: String, feed: FeedKind) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            feed,
            max_retry_elapsed: Duration::from_secs(3),
        }
    }

    /// Cap the total time spent retrying one request.
    ///
    /// Keep this below the poll interval so a struggling ledger cannot stack
    /// retries across cycles.
    pub fn with_max_retry_elapsed(mut self, max: Duration) -> Self {
        self.max_retry_elapsed = max;
        self
    }

    fn list_url(&self) -> String {
        format!("{}{}", self.base_url, self.feed.list_path())
    }

    fn index_url(&self) -> String {
        format!("{}{}", self.base_url, self.feed.index_path())
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<serde_json::Value, SourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_retry_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(SourceError::NetworkError(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(SourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(SourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(SourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(SourceError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_events(&self, query: &BatchQuery) -> Result<Vec<Event>, SourceError> {
        debug!(
            "Fetching {} index={}, count={}, old={}",
            self.feed, query.index, query.count, query.old
        );

        let response = self
            .get_json(&self.list_url(), &query.to_query_pairs())
            .await?;
        parse_events(&response)
    }

    async fn fetch_current_index(&self) -> Result<Option<u64>, SourceError> {
        let response = self.get_json(&self.index_url(), &[]).await?;
        Ok(response.as_u64())
    }
}

fn parse_events(response: &serde_json::Value) -> Result<Vec<Event>, SourceError> {
    let records = response
        .as_array()
        .ok_or_else(|| SourceError::ParseError("Expected array response".to_string()))?;

    let mut events = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<BoostRecord>(record.clone()) {
            Ok(record) => events.push(Event::from(record)),
            Err(e) => {
                warn!("Failed to parse boost record: {}", e);
            }
        }
    }

    Ok(events)
}
