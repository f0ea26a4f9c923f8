//! Table Schema Definitions
//!
//! Single source of truth for the `groups` and `songs` tables.

use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::Result;
use sqlx::PgPool;
use tracing::info;

/// Groups table schema
pub struct GroupsTableSchema;

impl TableSchema for GroupsTableSchema {
    fn table_name() -> &'static str {
        "groups"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "BIGSERIAL").primary_key(),
            // Looked up by exact name during song creation
            ColumnDefinition::new("name", "TEXT").not_null().unique(),
        ]
    }
}

/// Songs table schema
pub struct SongsTableSchema;

impl TableSchema for SongsTableSchema {
    fn table_name() -> &'static str {
        "songs"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "BIGSERIAL").primary_key(),
            ColumnDefinition::new("name", "TEXT").not_null(),
            ColumnDefinition::new("release_date", "DATE").not_null(),
            ColumnDefinition::new("text", "TEXT").not_null(),
            ColumnDefinition::new("group_id", "BIGINT")
                .not_null()
                .references("groups(id)"),
        ]
    }
}

/// Synchronize all table schemas
///
/// `groups` goes first: `songs.group_id` references it.
pub async fn sync_all_table_schemas(pool: &PgPool) -> Result<()> {
    info!("Synchronizing table schemas");

    SchemaSync::sync_table::<GroupsTableSchema>(pool).await?;
    SchemaSync::sync_table::<SongsTableSchema>(pool).await?;

    Ok(())
}
