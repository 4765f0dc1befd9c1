pub mod health;
pub mod timeline;

use crate::domain::FeedKind;
use crate::orchestration::PollCommand;
use crate::render::AppRegistry;
use crate::timeline::TimelineStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<TimelineStore>>,
    pub apps: Arc<AppRegistry>,
    pub feed: FeedKind,
    pub commands: mpsc::Sender<PollCommand>,
}

impl AppState {
    pub fn new(
        store: Arc<RwLock<TimelineStore>>,
        apps: Arc<AppRegistry>,
        feed: FeedKind,
        commands: mpsc::Sender<PollCommand>,
    ) -> Self {
        Self {
            store,
            apps,
            feed,
            commands,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/timeline", get(timeline::get_timeline))
        .route("/v1/timeline/older", post(timeline::load_older))
        .route("/v1/timeline/:index", get(timeline::get_boost))
        .layer(cors)
        .with_state(state)
}
