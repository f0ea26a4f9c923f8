//! Song database operations

use chrono::NaiveDate;
use songlib_common::models::{Song, SongDetail, SongWithGroup};
use songlib_common::{Error, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::groups;
use crate::song_patch::SongPatch;

/// Date format used by the song-info provider
pub const PROVIDER_DATE_FORMAT: &str = "%d.%m.%Y";

/// Optional filters for [`list_songs`]; all present filters must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    /// Case-insensitive substring of the song name
    pub name: Option<String>,
    /// Case-insensitive substring of the group name
    pub group_name: Option<String>,
    /// Case-insensitive substring of the lyrics
    pub text: Option<String>,
    /// Exact release date
    pub release_date: Option<NaiveDate>,
}

fn song_not_found(id: i64) -> Error {
    Error::NotFound(format!("Song with ID {} not found", id))
}

/// Parse a provider release date (`DD.MM.YYYY`)
pub fn parse_provider_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), PROVIDER_DATE_FORMAT).map_err(|e| {
        Error::Upstream(format!("Invalid release date '{}' from song info provider: {}", raw, e))
    })
}

/// `%value%` for ILIKE, with LIKE wildcards in `value` matched literally
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Load song by id
pub async fn get_song(pool: &PgPool, id: i64) -> Result<Song> {
    sqlx::query_as::<_, Song>(
        "SELECT id, name, release_date, text, group_id FROM songs WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| song_not_found(id))
}

/// List songs joined with their group. An empty result is `NotFound`.
pub async fn list_songs(pool: &PgPool, filter: &SongFilter) -> Result<Vec<SongWithGroup>> {
    let mut query = QueryBuilder::<Postgres>::new(
        r#"
        SELECT s.id, s.name, s.release_date, s.text, g.id AS group_id, g.name AS group_name
        FROM songs s
        JOIN groups g ON g.id = s.group_id
        WHERE TRUE
        "#,
    );

    if let Some(name) = &filter.name {
        query.push(" AND s.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(group_name) = &filter.group_name {
        query.push(" AND g.name ILIKE ").push_bind(contains_pattern(group_name));
    }
    if let Some(text) = &filter.text {
        query.push(" AND s.text ILIKE ").push_bind(contains_pattern(text));
    }
    if let Some(release_date) = filter.release_date {
        query.push(" AND s.release_date = ").push_bind(release_date);
    }
    query.push(" ORDER BY s.id");

    let songs = query
        .build_query_as::<SongWithGroup>()
        .fetch_all(pool)
        .await?;

    if songs.is_empty() {
        return Err(Error::NotFound("No songs found".to_string()));
    }

    Ok(songs)
}

/// Create a song from provider details, creating its group if needed.
///
/// Runs in one transaction: a failure at any step (including an unparseable
/// release date) leaves neither a new group nor a new song behind.
pub async fn create_song(
    pool: &PgPool,
    group_name: &str,
    song_name: &str,
    detail: &SongDetail,
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let group_id = groups::find_or_create_group(&mut *tx, group_name).await?;

    let release_date = match parse_provider_date(&detail.release_date) {
        Ok(date) => date,
        Err(e) => {
            tx.rollback().await?;
            return Err(e);
        }
    };

    // Early returns below drop `tx`, which rolls it back
    let song_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO songs (name, release_date, text, group_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(song_name)
    .bind(release_date)
    .bind(&detail.text)
    .bind(group_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        song_id,
        group_id,
        song = %song_name,
        group = %group_name,
        "Song added"
    );
    Ok(song_id)
}

/// Apply a partial update. Only the fields present in `patch` are written.
pub async fn update_song(pool: &PgPool, id: i64, patch: &SongPatch) -> Result<()> {
    if patch.is_empty() {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM songs WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        return if exists { Ok(()) } else { Err(song_not_found(id)) };
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE songs SET ");
    let mut assignments = query.separated(", ");
    if let Some(name) = &patch.name {
        assignments.push("name = ").push_bind_unseparated(name.as_str());
    }
    if let Some(release_date) = patch.release_date {
        assignments.push("release_date = ").push_bind_unseparated(release_date);
    }
    if let Some(text) = &patch.text {
        assignments.push("text = ").push_bind_unseparated(text.as_str());
    }
    if let Some(group_id) = patch.group_id {
        assignments.push("group_id = ").push_bind_unseparated(group_id);
    }
    query.push(" WHERE id = ").push_bind(id);

    let result = query.build().execute(pool).await.map_err(|e| {
        let missing_group =
            matches!(&e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation());
        if missing_group {
            Error::InvalidInput(format!(
                "Group with ID {} does not exist",
                patch.group_id.unwrap_or_default()
            ))
        } else {
            Error::from(e)
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(song_not_found(id));
    }

    info!(song_id = id, "Song updated");
    Ok(())
}

/// Delete a song; returns the number of rows removed (0 or 1).
/// The owning group is left in place.
pub async fn delete_song(pool: &PgPool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM songs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_date_parses() {
        assert_eq!(
            parse_provider_date("16.07.2006").unwrap(),
            NaiveDate::from_ymd_opt(2006, 7, 16).unwrap()
        );
    }

    #[test]
    fn test_malformed_provider_date_is_upstream_error() {
        for raw in ["2006-07-16", "31.02.2006", "", "16/07/2006"] {
            assert!(
                matches!(parse_provider_date(raw), Err(Error::Upstream(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("love"), "%love%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\"), "%c:\\\\%");
    }
}
