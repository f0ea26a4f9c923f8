//! songlib-api library - song library HTTP service
//!
//! CRUD over songs grouped by performing group, backed by Postgres. New songs
//! are enriched from a song-info provider before they are stored.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod error;
pub mod services;
pub mod song_patch;
pub mod verses;

use services::SongInfoClient;

/// Default upper bound on a single request, provider call included
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Song-info provider client
    pub song_info: Arc<SongInfoClient>,
    /// Server start time, reported by /health
    pub startup_time: DateTime<Utc>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Create new application state
    pub fn new(db: PgPool, song_info: SongInfoClient) -> Self {
        Self {
            db,
            song_info: Arc::new(song_info),
            startup_time: Utc::now(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    let request_timeout = state.request_timeout;

    let music = Router::new()
        .route("/music", post(api::create_music))
        .route("/music/:id", put(api::update_music).delete(api::delete_music))
        .route("/music/:id/text", get(api::get_song_text))
        .route("/songs", get(api::list_songs));

    Router::new()
        .merge(music)
        .route("/info", get(api::get_song_info))
        .merge(api::health_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
