//! Song endpoints under `/music`
//!
//! Request bodies are taken as raw bytes and decoded here so malformed JSON
//! gets the same error envelope as every other bad request.

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::db::songs;
use crate::error::{ApiError, ApiResult};
use crate::song_patch::SongPatch;
use crate::verses;
use crate::AppState;

/// POST /music body
#[derive(Debug, Deserialize)]
pub struct CreateMusicRequest {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub song: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// GET /music/:id/text response
#[derive(Debug, Serialize, Deserialize)]
pub struct SongTextResponse {
    pub song_id: i64,
    pub title: String,
    pub page: usize,
    pub verses: Vec<String>,
}

/// Parse a song id path segment; ids are positive integers
pub fn parse_song_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid song ID: '{}'", raw)))
}

/// Parse the `page` query parameter; pages are 1-indexed
pub fn parse_page(raw: Option<&str>) -> ApiResult<usize> {
    let raw = raw
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Page parameter is required".to_string()))?;

    raw.parse::<usize>()
        .ok()
        .filter(|page| *page >= 1)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid page parameter: '{}'", raw)))
}

/// POST /music
///
/// Looks the song up at the song-info provider, then stores it (creating the
/// group on first use).
pub async fn create_music(State(state): State<AppState>, body: Bytes) -> ApiResult<String> {
    let request: CreateMusicRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    let group = request.group.trim();
    let song = request.song.trim();
    if group.is_empty() || song.is_empty() {
        return Err(ApiError::BadRequest(
            "Both 'group' and 'song' are required".to_string(),
        ));
    }

    let detail = state.song_info.fetch(group, song).await?;
    let song_id = songs::create_song(&state.db, group, song, &detail).await?;

    Ok(format!("Song with ID {} added successfully", song_id))
}

/// GET /music/:id/text?page=N
pub async fn get_song_text(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<SongTextResponse>> {
    let Path(raw_id) = path?;
    let Query(query) = query?;
    let song_id = parse_song_id(&raw_id)?;
    let page = parse_page(query.page.as_deref())?;

    let song = songs::get_song(&state.db, song_id).await?;
    let verse_page = verses::paginate(&song.text, page)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(SongTextResponse {
        song_id: song.id,
        title: song.name.clone(),
        page: verse_page.page,
        verses: verse_page.verses.iter().map(|v| v.to_string()).collect(),
    }))
}

/// PUT /music/:id
pub async fn update_music(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult<String> {
    let Path(raw_id) = path?;
    let song_id = parse_song_id(&raw_id)?;

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;
    let patch = SongPatch::from_json(&value).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    songs::update_song(&state.db, song_id, &patch).await?;

    Ok(format!("Song with ID {} has been updated successfully", song_id))
}

/// DELETE /music/:id
///
/// Succeeds whether or not the song existed.
pub async fn delete_music(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<String> {
    let Path(raw_id) = path?;
    let song_id = parse_song_id(&raw_id)?;

    let deleted = songs::delete_song(&state.db, song_id).await?;
    if deleted == 0 {
        info!(song_id, "Delete requested for unknown song");
    } else {
        info!(song_id, "Song deleted");
    }

    Ok(format!("Song with ID {} has been deleted", song_id))
}
