//! Built-in song-info provider
//!
//! Answers the same contract as an external provider with a fixed sample
//! document, so a single deployment can create songs without any other
//! service. Point `SONG_INFO_URL` elsewhere to use a real provider.

use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use serde::Deserialize;
use songlib_common::models::SongDetail;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

const SAMPLE_RELEASE_DATE: &str = "16.07.2006";
const SAMPLE_LINK: &str = "https://www.youtube.com/watch?v=Xsp3_a-PMTw";
const SAMPLE_TEXT: &str = "\
Sample verse one, first line\n\
Sample verse one, second line\n\
Sample verse two, first line\n\
Sample verse two, second line\n\
Sample chorus, first line\n\
Sample chorus, second line";

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub group: Option<String>,
    pub song: Option<String>,
}

/// GET /info?group=&song=
pub async fn get_song_info(
    query: Result<Query<InfoQuery>, QueryRejection>,
) -> ApiResult<Json<SongDetail>> {
    let Query(query) = query?;
    let group = non_empty(query.group).ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'group' is required".to_string())
    })?;
    let song = non_empty(query.song)
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'song' is required".to_string()))?;

    debug!(group = %group, song = %song, "Serving sample song info");

    Ok(Json(SongDetail {
        release_date: SAMPLE_RELEASE_DATE.to_string(),
        text: SAMPLE_TEXT.to_string(),
        link: SAMPLE_LINK.to_string(),
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verses;

    #[test]
    fn test_sample_date_uses_provider_format() {
        assert!(crate::db::songs::parse_provider_date(SAMPLE_RELEASE_DATE).is_ok());
    }

    #[test]
    fn test_sample_text_spans_several_pages() {
        assert_eq!(verses::split_verses(SAMPLE_TEXT).len(), 6);
        assert!(verses::paginate(SAMPLE_TEXT, 3).is_ok());
        assert!(verses::paginate(SAMPLE_TEXT, 4).is_err());
    }
}
