//! Database models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Performing entity that owns songs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub name: String,
    pub release_date: NaiveDate,
    /// Lyrics, verses separated by `\n`
    pub text: String,
    pub group_id: i64,
}

/// Song row joined with its owning group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SongWithGroup {
    pub id: i64,
    pub name: String,
    pub release_date: NaiveDate,
    pub text: String,
    pub group_id: i64,
    pub group_name: String,
}

impl SongWithGroup {
    pub fn group(&self) -> Group {
        Group {
            id: self.group_id,
            name: self.group_name.clone(),
        }
    }
}

/// Song details as published by the song-info provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetail {
    /// Release date in `DD.MM.YYYY` form
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    /// Not stored; absent in some provider replies
    #[serde(default)]
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_detail_uses_provider_field_names() {
        let detail: SongDetail = serde_json::from_str(
            r#"{"releaseDate":"16.07.2006","text":"line1\nline2","link":"https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(detail.release_date, "16.07.2006");
        assert_eq!(detail.text, "line1\nline2");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["releaseDate"], "16.07.2006");
        assert!(json.get("release_date").is_none());
    }

    #[test]
    fn test_song_detail_link_is_optional() {
        let detail: SongDetail =
            serde_json::from_str(r#"{"releaseDate":"16.07.2006","text":"only verse"}"#).unwrap();
        assert_eq!(detail.link, "");
        assert_eq!(detail.text, "only verse");

        let missing_date = serde_json::from_str::<SongDetail>(r#"{"text":"x","link":"y"}"#);
        assert!(missing_date.is_err());
    }

    #[test]
    fn test_song_release_date_serializes_as_iso_date() {
        let song = SongWithGroup {
            id: 1,
            name: "Starlight".to_string(),
            release_date: NaiveDate::from_ymd_opt(2006, 7, 16).unwrap(),
            text: "a\nb".to_string(),
            group_id: 3,
            group_name: "Muse".to_string(),
        };
        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["release_date"], "2006-07-16");
        assert_eq!(song.group(), Group { id: 3, name: "Muse".to_string() });
    }
}
