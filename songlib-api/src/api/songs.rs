//! Filtered song listing

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use songlib_common::models::{Group, SongWithGroup};

use crate::db::songs::{self as store, SongFilter};
use crate::error::{ApiError, ApiResult};
use crate::song_patch::RELEASE_DATE_FORMAT;
use crate::AppState;

/// GET /songs query parameters; empty values are ignored
#[derive(Debug, Default, Deserialize)]
pub struct SongsQuery {
    pub name: Option<String>,
    pub group_name: Option<String>,
    pub text: Option<String>,
    pub release_date: Option<String>,
}

impl SongsQuery {
    /// Convert into a store filter, validating `release_date`
    pub fn into_filter(self) -> ApiResult<SongFilter> {
        let release_date = match non_empty(self.release_date) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, RELEASE_DATE_FORMAT).map_err(
                |_| ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()),
            )?),
            None => None,
        };

        Ok(SongFilter {
            name: non_empty(self.name),
            group_name: non_empty(self.group_name),
            text: non_empty(self.text),
            release_date,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// GET /songs response
#[derive(Debug, Serialize, Deserialize)]
pub struct SongsResponse {
    /// Group of the first matched song
    pub group: Group,
    pub songs: Vec<SongWithGroup>,
}

/// GET /songs?name=&group_name=&text=&release_date=
pub async fn list_songs(
    State(state): State<AppState>,
    query: Result<Query<SongsQuery>, QueryRejection>,
) -> ApiResult<Json<SongsResponse>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let songs = store::list_songs(&state.db, &filter).await?;

    let group = songs
        .first()
        .map(SongWithGroup::group)
        .ok_or_else(|| ApiError::NotFound("No songs found".to_string()))?;

    Ok(Json(SongsResponse { group, songs }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_parameters_are_absent() {
        let filter = SongsQuery {
            name: Some(String::new()),
            group_name: Some("muse".to_string()),
            text: None,
            release_date: Some(String::new()),
        }
        .into_filter()
        .unwrap();

        assert_eq!(
            filter,
            SongFilter {
                group_name: Some("muse".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_release_date_is_parsed() {
        let filter = SongsQuery {
            release_date: Some("2006-07-16".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.release_date, NaiveDate::from_ymd_opt(2006, 7, 16));
    }

    #[test]
    fn test_bad_release_date_rejected() {
        let err = SongsQuery {
            release_date: Some("16.07.2006".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
