//! Table, column and index descriptors.
//!
//! Descriptors describe both sides of a reconciliation: the desired schema
//! supplied by the caller and the actual schema read back from the catalog.
//! They are plain values, built fresh for every call.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::types::{Sizing, TypeFamily};

/// Name given to primary key indices that the caller does not name.
pub const PRIMARY_KEY_INDEX_NAME: &str = "PRIMARY_KEY";

/// Typed default value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// Explicit `DEFAULT NULL`.
    Null,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Approximate numeric default.
    Float(f64),
    /// Exact numeric default, kept as canonical text.
    Decimal(String),
    /// Character default.
    Text(String),
    /// Date default.
    Date(NaiveDate),
    /// Time-of-day default.
    Time(NaiveTime),
    /// Timestamp default.
    Timestamp(NaiveDateTime),
    /// Binary default.
    Bytes(Vec<u8>),
    /// SQL expression emitted verbatim (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

/// Schema definition for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Abstract type family.
    pub family: TypeFamily,
    /// Length (or precision) for sized families, 0 when unused.
    #[serde(default)]
    pub length: u32,
    /// Scale for NUMERIC/DECIMAL, 0 when unused.
    #[serde(default)]
    pub scale: u32,
    /// Whether the column allows NULL values.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Whether the column is an identity/auto-increment column.
    #[serde(default)]
    pub auto_increment: bool,
    /// Typed default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Raw default expression as reported by the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_expression: Option<String>,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnDescriptor {
    /// Creates a nullable column without default.
    #[must_use]
    pub fn new(name: impl Into<String>, family: TypeFamily) -> Self {
        Self {
            name: name.into(),
            family,
            length: 0,
            scale: 0,
            nullable: true,
            auto_increment: false,
            default: None,
            default_expression: None,
        }
    }

    /// Sets the length.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Sets length and scale.
    #[must_use]
    pub fn precision(mut self, length: u32, scale: u32) -> Self {
        self.length = length;
        self.scale = scale;
        self
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as auto-increment. Any default is discarded.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.default = None;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    fn validate(&self, table: &str) -> Result<()> {
        let invalid = |message: String| SchemaError::InvalidDescriptor {
            table: table.to_string(),
            message,
        };
        if self.name.is_empty() {
            return Err(invalid("column with empty name".to_string()));
        }
        if self.family.sizing() != Sizing::Fixed && self.length == 0 {
            return Err(invalid(format!(
                "column '{}' of type {} requires a length",
                self.name, self.family
            )));
        }
        if self.family.sizing() == Sizing::LengthScale && self.scale > self.length {
            return Err(invalid(format!(
                "column '{}' has scale {} above precision {}",
                self.name, self.scale, self.length
            )));
        }
        if self.auto_increment && self.default.is_some() {
            return Err(invalid(format!(
                "auto-increment column '{}' cannot carry a default",
                self.name
            )));
        }
        Ok(())
    }
}

/// Kind of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexKind {
    /// The table's primary key.
    PrimaryKey,
    /// A unique index or constraint.
    Unique,
    /// A plain, non-unique index.
    Normal,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PrimaryKey => "PRIMARY_KEY",
            Self::Unique => "UNIQUE",
            Self::Normal => "NORMAL",
        })
    }
}

/// Schema definition for an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,
    /// Index kind.
    pub kind: IndexKind,
    /// Indexed columns, in key order.
    pub columns: Vec<String>,
}

impl IndexDescriptor {
    /// Creates an index descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: IndexKind, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            columns,
        }
    }

    /// Creates a primary key over `columns`.
    #[must_use]
    pub fn primary_key<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            PRIMARY_KEY_INDEX_NAME,
            IndexKind::PrimaryKey,
            columns.into_iter().map(Into::into).collect(),
        )
    }

    /// Creates a unique index.
    #[must_use]
    pub fn unique<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(name, IndexKind::Unique, columns.into_iter().map(Into::into).collect())
    }

    /// Creates a plain index.
    #[must_use]
    pub fn normal<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(name, IndexKind::Normal, columns.into_iter().map(Into::into).collect())
    }

    /// Column membership, ignoring order.
    #[must_use]
    pub fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

/// Whether a catalog object is a base table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableKind {
    /// A base table.
    #[default]
    Table,
    /// A view; has no indices or row count.
    View,
}

/// Complete schema definition for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name.
    pub name: String,
    /// Table or view.
    #[serde(default)]
    pub kind: TableKind,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,
    /// Index definitions.
    #[serde(default)]
    pub indices: Vec<IndexDescriptor>,
    /// Advisory row count; `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

impl TableDescriptor {
    /// Creates an empty table descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::Table,
            columns: Vec::new(),
            indices: Vec::new(),
            row_count: None,
        }
    }

    /// Adds a column to the table.
    #[must_use]
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: IndexDescriptor) -> Self {
        self.indices.push(index);
        self
    }

    /// Declares the primary key, replacing any existing one.
    #[must_use]
    pub fn primary_key<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.indices.retain(|i| i.kind != IndexKind::PrimaryKey);
        self.indices.insert(0, IndexDescriptor::primary_key(columns));
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the primary key index, if any.
    #[must_use]
    pub fn primary_key_index(&self) -> Option<&IndexDescriptor> {
        self.indices.iter().find(|i| i.kind == IndexKind::PrimaryKey)
    }

    /// Returns the primary key column names (empty without a key).
    #[must_use]
    pub fn primary_key_columns(&self) -> BTreeSet<&str> {
        self.primary_key_index()
            .map(IndexDescriptor::column_set)
            .unwrap_or_default()
    }

    /// Checks the structural invariants of the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidDescriptor`] for a table without
    /// columns, duplicate columns, a second primary key, index members that
    /// are not columns, duplicate index members, missing lengths and
    /// defaulted auto-increment columns.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| SchemaError::InvalidDescriptor {
            table: self.name.clone(),
            message,
        };

        if self.name.is_empty() {
            return Err(invalid("table with empty name".to_string()));
        }
        if self.columns.is_empty() {
            return Err(invalid("table has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            column.validate(&self.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(invalid(format!("duplicate column '{}'", column.name)));
            }
        }

        let primary_keys = self
            .indices
            .iter()
            .filter(|i| i.kind == IndexKind::PrimaryKey)
            .count();
        if primary_keys > 1 {
            return Err(invalid(format!("{primary_keys} primary keys declared")));
        }

        for index in &self.indices {
            if index.columns.is_empty() {
                return Err(invalid(format!("index '{}' has no columns", index.name)));
            }
            let mut members = HashSet::new();
            for column in &index.columns {
                if !seen.contains(column.as_str()) {
                    return Err(invalid(format!(
                        "index '{}' references unknown column '{column}'",
                        index.name
                    )));
                }
                if !members.insert(column.as_str()) {
                    return Err(invalid(format!(
                        "index '{}' lists column '{column}' twice",
                        index.name
                    )));
                }
            }
        }

        Ok(())
    }
}
