//! Catalog introspection.
//!
//! Builds a [`TableDescriptor`] from catalog metadata. Each call reads the
//! catalog afresh; nothing is cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use oxide_schema::defaults::coerce;
use oxide_schema::{
    ColumnDescriptor, DefaultValue, DialectRules, IndexDescriptor, IndexKind, SchemaError,
    SqlValue, TableDescriptor, TableKind,
};
use tracing::{debug, warn};

use crate::catalog::{ColumnRow, Database, IndexRow};
use crate::error::Result;

/// What to read besides columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntrospectOptions {
    /// Read the primary key and indices.
    pub indices: bool,
    /// Count rows.
    pub row_count: bool,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            indices: true,
            row_count: false,
        }
    }
}

impl IntrospectOptions {
    /// Creates the default options: indices on, row count off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables index introspection.
    #[must_use]
    pub const fn indices(mut self, enabled: bool) -> Self {
        self.indices = enabled;
        self
    }

    /// Enables or disables the row count.
    #[must_use]
    pub const fn row_count(mut self, enabled: bool) -> Self {
        self.row_count = enabled;
        self
    }
}

/// Reads table descriptors from a database.
#[derive(Debug, Clone, Copy)]
pub struct Introspector {
    rules: DialectRules,
    options: IntrospectOptions,
}

impl Introspector {
    /// Creates an introspector for `rules` with default options.
    #[must_use]
    pub fn new(rules: DialectRules) -> Self {
        Self {
            rules,
            options: IntrospectOptions::default(),
        }
    }

    /// Sets the options.
    #[must_use]
    pub const fn options(mut self, options: IntrospectOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads `table`, returning `None` if it does not exist.
    ///
    /// Indices are only read for base tables. A primary key column is never
    /// reported as a member of another index, and indices left without
    /// members are dropped. Failures of the default probe and the row count
    /// are logged and leave the affected fields unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if a metadata read fails or a column type cannot be
    /// mapped to a family.
    pub async fn introspect<D>(&self, db: &D, table: &str) -> Result<Option<TableDescriptor>>
    where
        D: Database + ?Sized,
    {
        let Some(kind) = db.table_kind(table).await? else {
            debug!(table, "Table not found");
            return Ok(None);
        };

        let mut descriptor = TableDescriptor::new(table);
        descriptor.kind = kind;
        descriptor.columns = db
            .columns(table)
            .await?
            .into_iter()
            .map(|row| self.column(table, row))
            .collect::<std::result::Result<_, _>>()?;

        self.probe_defaults(db, &mut descriptor).await;

        if kind == TableKind::Table && self.options.indices {
            let primary_key = db.primary_keys(table).await?;
            let rows = db.index_info(table).await?;
            descriptor.indices = assemble_indices(primary_key, rows);
        }

        if kind == TableKind::Table && self.options.row_count {
            descriptor.row_count = self.count_rows(db, table).await;
        }

        debug!(
            table,
            columns = descriptor.columns.len(),
            indices = descriptor.indices.len(),
            "Introspected table"
        );
        Ok(Some(descriptor))
    }

    fn column(
        &self,
        table: &str,
        row: ColumnRow,
    ) -> std::result::Result<ColumnDescriptor, SchemaError> {
        let (family, length, scale) = self
            .rules
            .resolve_type(&row.type_name, row.size, row.scale)
            .ok_or_else(|| SchemaError::UnknownNativeType {
                table: table.to_string(),
                column: row.name.clone(),
                native: row.type_name.clone(),
            })?;

        Ok(ColumnDescriptor {
            name: row.name,
            family,
            length,
            scale,
            nullable: row.nullable,
            auto_increment: row.auto_increment,
            default: None,
            default_expression: row
                .default_expression
                .filter(|expr| !expr.trim().is_empty()),
        })
    }

    /// Evaluates every default expression in one `SELECT` and stores the
    /// results as typed defaults.
    async fn probe_defaults<D>(&self, db: &D, table: &mut TableDescriptor)
    where
        D: Database + ?Sized,
    {
        let probed: Vec<(usize, &str)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.auto_increment)
            .filter_map(|(i, c)| {
                let expr = c.default_expression.as_deref()?.trim();
                (!expr.starts_with('?')).then_some((i, expr))
            })
            .collect();
        if probed.is_empty() {
            return;
        }

        let select = probed
            .iter()
            .map(|(i, expr)| {
                format!(
                    "{expr} AS {}",
                    self.rules.quote_identifier(&table.columns[*i].name)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {select}");
        let indices: Vec<usize> = probed.into_iter().map(|(i, _)| i).collect();

        let result = match db.query(&sql).await {
            Ok(result) => result,
            Err(e) => {
                warn!(table = %table.name, error = %e, "Default probe failed, defaults unknown");
                return;
            }
        };
        let Some(row) = result.first() else {
            warn!(table = %table.name, "Default probe returned no row, defaults unknown");
            return;
        };

        for (position, index) in indices.into_iter().enumerate() {
            let column = &mut table.columns[index];
            column.default = match row.get(position) {
                None | Some(SqlValue::Null) => None,
                Some(value) => Some(coerce(DefaultValue::from(value.clone()), column.family)),
            };
        }
    }

    async fn count_rows<D>(&self, db: &D, table: &str) -> Option<u64>
    where
        D: Database + ?Sized,
    {
        let sql = format!("SELECT COUNT(*) FROM {}", self.rules.quote_identifier(table));
        match db.query(&sql).await {
            Ok(result) => result
                .first()
                .and_then(|row| row.get_i64(0))
                .and_then(|n| u64::try_from(n).ok()),
            Err(e) => {
                warn!(table, error = %e, "Row count failed, row count unknown");
                None
            }
        }
    }
}

/// Builds index descriptors: the primary key first, then the other indices
/// by name with primary key columns removed.
fn assemble_indices(primary_key: Vec<String>, rows: Vec<IndexRow>) -> Vec<IndexDescriptor> {
    let key_columns: BTreeSet<String> = primary_key.iter().cloned().collect();
    let mut indices = Vec::new();
    if !primary_key.is_empty() {
        indices.push(IndexDescriptor::primary_key(primary_key));
    }

    let mut grouped: BTreeMap<String, (bool, Vec<(u32, String)>)> = BTreeMap::new();
    for row in rows {
        let entry = grouped
            .entry(row.index_name)
            .or_insert_with(|| (row.non_unique, Vec::new()));
        if !key_columns.contains(&row.column_name) {
            entry.1.push((row.ordinal, row.column_name));
        }
    }

    for (name, (non_unique, mut members)) in grouped {
        if members.is_empty() {
            continue;
        }
        members.sort_by_key(|(ordinal, _)| *ordinal);
        let kind = if non_unique {
            IndexKind::Normal
        } else {
            IndexKind::Unique
        };
        let columns = members.into_iter().map(|(_, column)| column).collect();
        indices.push(IndexDescriptor::new(name, kind, columns));
    }
    indices
}
