use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::AppState;
use crate::domain::{BoostIndex, FeedKind};
use crate::error::AppError;
use crate::orchestration::{PollCommand, PollReport};
use crate::render::BoostCard;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub feed: FeedKind,
    pub count: usize,
    pub has_more: bool,
    pub entries: Vec<BoostCard>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostDetailResponse {
    pub card: BoostCard,
    /// Raw TLV fields; null when the payload could not be parsed.
    pub tlv: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Materialized timeline, head first.
pub async fn get_timeline(
    Query(params): Query<TimelineQuery>,
    State(state): State<AppState>,
) -> Json<TimelineResponse> {
    let store = state.store.read().await;
    let limit = params.limit.unwrap_or(usize::MAX);

    let entries: Vec<BoostCard> = store
        .entries()
        .iter()
        .take(limit)
        .map(|entry| BoostCard::from_entry(entry, state.feed, &state.apps))
        .collect();

    Json(TimelineResponse {
        feed: state.feed,
        count: store.len(),
        has_more: store.has_more(),
        entries,
    })
}

/// One boost with its full TLV payload.
pub async fn get_boost(
    Path(index): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<BoostDetailResponse>, AppError> {
    let index = BoostIndex::new(index);
    let store = state.store.read().await;
    let entry = store.get(index).ok_or_else(|| {
        AppError::NotFound(format!("{} {} not found", state.feed.singular_name(), index))
    })?;

    let tlv = if entry.event.tlv.malformed {
        None
    } else {
        Some(entry.event.tlv.fields.clone())
    };

    Ok(Json(BoostDetailResponse {
        card: BoostCard::from_entry(entry, state.feed, &state.apps),
        tlv,
    }))
}

/// Ask the poll loop to backfill the page below the current tail.
pub async fn load_older(State(state): State<AppState>) -> Result<Json<PollReport>, AppError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .send(PollCommand::LoadOlder { reply })
        .await
        .map_err(|_| AppError::Unavailable("poll loop is not running".into()))?;

    let report = response
        .await
        .map_err(|_| AppError::Internal("poll loop dropped the request".into()))?;

    Ok(Json(report))
}
