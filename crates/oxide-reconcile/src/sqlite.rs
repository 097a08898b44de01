//! SQLite adapter.
//!
//! Implements both collaborators over a `sqlx` pool. Catalog metadata comes
//! from `sqlite_master` and the `pragma_table_info`, `pragma_index_list` and
//! `pragma_index_info` table-valued functions.

use async_trait::async_trait;
use oxide_schema::{SqlValue, TableKind};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::catalog::{CatalogMetadata, CatalogResult, ColumnRow, Connection, IndexRow, ResultSet};

/// A SQLite database reached through a connection pool.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to `url`.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the database cannot be opened.
    pub async fn connect(url: &str) -> CatalogResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Connection for SqliteDatabase {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> CatalogResult<u64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlValue::Null => query.bind(None::<i64>),
                SqlValue::Bool(b) => query.bind(*b),
                SqlValue::Int(n) => query.bind(*n),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Blob(b) => query.bind(b.clone()),
            };
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    /// Column labels are taken from the first row, so an empty result has
    /// no labels.
    async fn query(&self, sql: &str) -> CatalogResult<ResultSet> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(|row| (0..row.len()).map(|i| decode(row, i)).collect::<CatalogResult<Vec<_>>>())
            .collect::<CatalogResult<Vec<Vec<SqlValue>>>>()?;
        Ok(ResultSet::new(columns, rows))
    }
}

fn decode(row: &SqliteRow, index: usize) -> CatalogResult<SqlValue> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_string();
    Ok(match storage.as_str() {
        "INTEGER" => SqlValue::Int(row.try_get(index)?),
        "REAL" => SqlValue::Float(row.try_get(index)?),
        "BLOB" => SqlValue::Blob(row.try_get(index)?),
        _ => SqlValue::Text(row.try_get(index)?),
    })
}

#[async_trait]
impl CatalogMetadata for SqliteDatabase {
    async fn table_kind(&self, table: &str) -> CatalogResult<Option<TableKind>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT type FROM sqlite_master WHERE name = ? AND type IN ('table', 'view')",
        )
        .bind(table)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(kind,)| {
            if kind == "view" {
                TableKind::View
            } else {
                TableKind::Table
            }
        }))
    }

    /// A column is reported as auto-increment when it is the table's only
    /// primary key column and is declared `INTEGER`, making it the rowid.
    async fn columns(&self, table: &str) -> CatalogResult<Vec<ColumnRow>> {
        let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(
            r#"SELECT name, type, "notnull", dflt_value, pk
               FROM pragma_table_info(?) ORDER BY cid"#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let key_columns = rows.iter().filter(|(.., pk)| *pk > 0).count();
        Ok(rows
            .into_iter()
            .map(|(name, type_name, not_null, default_expression, pk)| {
                let auto_increment =
                    pk > 0 && key_columns == 1 && type_name.eq_ignore_ascii_case("INTEGER");
                ColumnRow {
                    name,
                    type_name,
                    size: None,
                    scale: None,
                    nullable: not_null == 0,
                    default_expression,
                    auto_increment,
                }
            })
            .collect())
    }

    async fn primary_keys(&self, table: &str) -> CatalogResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info(?) WHERE pk > 0 ORDER BY pk")
                .bind(table)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn index_info(&self, table: &str) -> CatalogResult<Vec<IndexRow>> {
        let rows: Vec<(String, i64, i64, Option<String>)> = sqlx::query_as(
            r#"SELECT il.name, il."unique", ii.seqno, ii.name
               FROM pragma_index_list(?) AS il, pragma_index_info(il.name) AS ii
               ORDER BY il.name, ii.seqno"#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(index_name, unique, seqno, column)| {
                Some(IndexRow {
                    index_name,
                    column_name: column?,
                    non_unique: unique == 0,
                    ordinal: u32::try_from(seqno).ok()?,
                })
            })
            .collect())
    }
}
