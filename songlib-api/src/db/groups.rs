//! Group database operations
//!
//! Groups are never created directly: the first song that names an unknown
//! group creates it. Both functions take a connection so they can run inside
//! the song-creation transaction.

use songlib_common::Result;
use sqlx::PgConnection;
use tracing::{debug, info};

/// Look up a group id by exact name
pub async fn find_group_id(conn: &mut PgConnection, name: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar("SELECT id FROM groups WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(id)
}

/// Return the id of the group called `name`, creating it if absent.
///
/// The insert is an upsert on the unique name, so two creators racing on the
/// same new group both resolve to one row.
pub async fn find_or_create_group(conn: &mut PgConnection, name: &str) -> Result<i64> {
    if let Some(id) = find_group_id(&mut *conn, name).await? {
        debug!(group = %name, group_id = id, "Found existing group");
        return Ok(id);
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO groups (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    info!(group = %name, group_id = id, "Created group");
    Ok(id)
}
