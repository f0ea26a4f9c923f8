//! Automatic Schema Synchronization
//!
//! Schema definitions in code are the single source of truth. On startup each
//! table is created if missing, then compared against the live database and
//! any missing column is added.
//!
//! # Usage
//!
//! ```rust,ignore
//! pub struct GroupsTableSchema;
//!
//! impl TableSchema for GroupsTableSchema {
//!     fn table_name() -> &'static str { "groups" }
//!
//!     fn expected_columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("id", "BIGSERIAL").primary_key(),
//!             ColumnDefinition::new("name", "TEXT").not_null().unique(),
//!         ]
//!     }
//! }
//!
//! SchemaSync::sync_table::<GroupsTableSchema>(&pool).await?;
//! ```

use crate::Result;
use sqlx::{PgPool, Row};
use tracing::{info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type as written in DDL (e.g., "TEXT", "BIGINT", "BIGSERIAL", "DATE")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// REFERENCES target, e.g. `groups(id)`
    pub references: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }

    /// Column clause as used inside CREATE TABLE
    fn ddl(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(target) = &self.references {
            sql.push_str(&format!(" REFERENCES {}", target));
        }
        sql
    }
}

/// Actual column from `information_schema.columns`
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub name: String,
    /// `data_type` as reported by PostgreSQL (e.g. "bigint", "text", "date")
    pub data_type: String,
    pub not_null: bool,
}

/// Drift between expected and actual schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    /// Column missing from database
    MissingColumn {
        table: String,
        column: ColumnDefinition,
    },
    /// Column type mismatch (requires a manual migration)
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
    /// Column is nullable but expected NOT NULL (requires a manual migration)
    ConstraintMismatch {
        table: String,
        column: String,
        constraint: String,
    },
}

/// Defines expected schema for a database table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Expected column definitions (order matters for new table creation)
    fn expected_columns() -> Vec<ColumnDefinition>;
}

/// Schema introspection - read actual database schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read actual columns of a table in the current schema, in ordinal order
    pub async fn introspect_table(pool: &PgPool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let rows = sqlx::query(
            r#"
            SELECT column_name, data_type, is_nullable
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table_name)
        .fetch_all(pool)
        .await?;

        let columns = rows
            .iter()
            .map(|row| ActualColumn {
                name: row.get("column_name"),
                data_type: row.get("data_type"),
                not_null: row.get::<String, _>("is_nullable") == "NO",
            })
            .collect();

        Ok(columns)
    }

    pub async fn table_exists(pool: &PgPool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Schema comparison - detect drift between expected and actual
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare expected schema to actual database schema
    pub fn compare(
        table_name: &str,
        expected: &[ColumnDefinition],
        actual: &[ActualColumn],
    ) -> Vec<SchemaDrift> {
        let mut drift = Vec::new();

        for expected_col in expected {
            match actual.iter().find(|c| c.name == expected_col.name) {
                Some(actual_col) => {
                    if !Self::types_compatible(&expected_col.sql_type, &actual_col.data_type) {
                        drift.push(SchemaDrift::TypeMismatch {
                            table: table_name.to_string(),
                            column: expected_col.name.clone(),
                            expected: expected_col.sql_type.clone(),
                            actual: actual_col.data_type.clone(),
                        });
                    }

                    // Primary keys are implicitly NOT NULL
                    let expects_not_null = expected_col.not_null || expected_col.primary_key;
                    if expects_not_null && !actual_col.not_null {
                        drift.push(SchemaDrift::ConstraintMismatch {
                            table: table_name.to_string(),
                            column: expected_col.name.clone(),
                            constraint: "NOT NULL".to_string(),
                        });
                    }
                }
                None => drift.push(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: expected_col.clone(),
                }),
            }
        }

        drift
    }

    /// DDL type vs. `information_schema` data_type
    fn types_compatible(expected: &str, actual: &str) -> bool {
        let expected = match expected.to_lowercase().as_str() {
            "bigserial" | "serial8" | "int8" => "bigint".to_string(),
            "serial" | "serial4" | "int" | "int4" => "integer".to_string(),
            "varchar" => "character varying".to_string(),
            other => other.to_string(),
        };
        expected == actual.to_lowercase()
    }
}

/// Schema synchronization - apply schema changes to database
pub struct SchemaSync;

impl SchemaSync {
    /// CREATE TABLE IF NOT EXISTS statement built from the declared columns
    pub fn create_table_sql<T: TableSchema>() -> String {
        let columns: Vec<String> = T::expected_columns().iter().map(|c| c.ddl()).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            T::table_name(),
            columns.join(",\n    ")
        )
    }

    /// Create the table if missing, then add any missing column.
    ///
    /// Type and constraint drift is only reported; fixing it needs a manual
    /// migration.
    pub async fn sync_table<T: TableSchema>(pool: &PgPool) -> Result<()> {
        let table_name = T::table_name();
        let expected = T::expected_columns();

        if !SchemaIntrospector::table_exists(pool, table_name).await? {
            sqlx::query(&Self::create_table_sql::<T>()).execute(pool).await?;
            info!("Schema sync: created table '{}'", table_name);
            return Ok(());
        }

        let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;
        let drift = SchemaDiff::compare(table_name, &expected, &actual);

        if drift.is_empty() {
            info!("Schema sync: '{}' is up to date", table_name);
            return Ok(());
        }

        for change in drift {
            match change {
                SchemaDrift::MissingColumn { table, column } => {
                    Self::add_column(pool, &table, &column).await?;
                }
                SchemaDrift::TypeMismatch { table, column, expected, actual } => {
                    warn!(
                        "Type mismatch in {}.{}: expected '{}', found '{}'. Manual migration required.",
                        table, column, expected, actual
                    );
                }
                SchemaDrift::ConstraintMismatch { table, column, constraint } => {
                    warn!(
                        "Constraint mismatch in {}.{}: missing '{}'. Manual migration required.",
                        table, column, constraint
                    );
                }
            }
        }

        Ok(())
    }

    async fn add_column(pool: &PgPool, table: &str, column: &ColumnDefinition) -> Result<()> {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {}",
            table, column.name, column.sql_type
        );

        if column.primary_key {
            warn!(
                "Cannot add PRIMARY KEY column {}.{} to an existing table; adding it without the constraint",
                table, column.name
            );
        }

        // NOT NULL on a populated table needs a DEFAULT, which no column declares
        if column.not_null {
            warn!(
                "Cannot add NOT NULL column {}.{} to an existing table; column will be nullable",
                table, column.name
            );
        }

        if column.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(target) = &column.references {
            sql.push_str(&format!(" REFERENCES {}", target));
        }

        info!("Schema sync: adding column {}.{} ({})", table, column.name, column.sql_type);
        sqlx::query(&sql).execute(pool).await?;

        Ok(())
    }
}
