use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready while the poll loop is still accepting commands.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if state.commands.is_closed() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "stopped"})),
        );
    }

    let entries = state.store.read().await.len();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ready",
            "feed": state.feed,
            "entries": entries,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedKind;
    use crate::render::AppRegistry;
    use crate::timeline::TimelineStore;
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};

    fn state(commands: mpsc::Sender<crate::orchestration::PollCommand>) -> AppState {
        AppState::new(
            Arc::new(RwLock::new(TimelineStore::new(Arc::from(Vec::new())))),
            Arc::new(AppRegistry::default()),
            FeedKind::Boosts,
            commands,
        )
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_returns_ready() {
        let (tx, _rx) = mpsc::channel(1);
        let (status, Json(body)) = ready(State(state(tx))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["feed"], "boosts");
        assert_eq!(body["entries"], 0);
    }

    #[tokio::test]
    async fn test_ready_when_poll_loop_stopped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let (status, Json(body)) = ready(State(state(tx))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "stopped");
    }
}
