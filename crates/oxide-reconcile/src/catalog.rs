//! Database collaborators.
//!
//! The reconciler never talks to a driver directly. It needs two things from
//! the database: a [`Connection`] that runs statements and queries, and a
//! [`CatalogMetadata`] view of tables, columns and indices. Anything that
//! provides both is a [`Database`].

use async_trait::async_trait;
use oxide_schema::{SqlValue, TableKind};

/// Result of a collaborator call.
pub type CatalogResult<T> = std::result::Result<T, sqlx::Error>;

/// Executes statements and queries.
///
/// Every call runs in auto-commit mode; DDL is never wrapped in an explicit
/// transaction.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Executes a statement and returns the number of affected rows.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> CatalogResult<u64>;

    /// Runs a query and returns its rows.
    async fn query(&self, sql: &str) -> CatalogResult<ResultSet>;
}

/// Catalog metadata for one table at a time.
#[async_trait]
pub trait CatalogMetadata: Send + Sync {
    /// Returns whether `table` is a table or a view, `None` if absent.
    async fn table_kind(&self, table: &str) -> CatalogResult<Option<TableKind>>;

    /// Returns the columns of `table` in ordinal order.
    async fn columns(&self, table: &str) -> CatalogResult<Vec<ColumnRow>>;

    /// Returns the primary key columns of `table` in key order.
    async fn primary_keys(&self, table: &str) -> CatalogResult<Vec<String>>;

    /// Returns one row per (index, column) pair of `table`.
    async fn index_info(&self, table: &str) -> CatalogResult<Vec<IndexRow>>;
}

/// A database the reconciler can work against.
pub trait Database: Connection + CatalogMetadata {}

impl<T: Connection + CatalogMetadata> Database for T {}

/// One column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    /// Column name.
    pub name: String,
    /// Native type name, possibly with arguments (`VARCHAR(50)`).
    pub type_name: String,
    /// Column size, when reported separately from the type name.
    pub size: Option<u32>,
    /// Decimal digits, when reported separately from the type name.
    pub scale: Option<u32>,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Raw default expression text.
    pub default_expression: Option<String>,
    /// Whether the column is an identity column.
    pub auto_increment: bool,
}

impl ColumnRow {
    /// Creates a nullable column row without default.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            size: None,
            scale: None,
            nullable: true,
            default_expression: None,
            auto_increment: false,
        }
    }

    /// Sets the reported size and scale.
    #[must_use]
    pub const fn size(mut self, size: u32, scale: u32) -> Self {
        self.size = Some(size);
        self.scale = Some(scale);
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the raw default expression.
    #[must_use]
    pub fn default_expression(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = Some(expression.into());
        self
    }

    /// Marks the column as an identity column.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// One (index, column) pair as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// Index name.
    pub index_name: String,
    /// Member column.
    pub column_name: String,
    /// Whether the index allows duplicates.
    pub non_unique: bool,
    /// Position of the column within the index.
    pub ordinal: u32,
}

/// Rows returned by [`Connection::query`].
///
/// The set owns its rows; nothing stays open on the database side once it
/// has been returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column labels in select order.
    pub columns: Vec<String>,
    /// Row values, each in `columns` order.
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    /// Creates a result set.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows in order.
    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Returns the first row, if any.
    #[must_use]
    pub fn first(&self) -> Option<Row<'_>> {
        self.iter().next()
    }
}

/// A borrowed row of a [`ResultSet`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [SqlValue],
}

impl<'a> Row<'a> {
    /// Value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a SqlValue> {
        self.values.get(index)
    }

    /// Value of the column labelled `name` (case-insensitive).
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&'a SqlValue> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|i| self.get(i))
    }

    /// Integer value at `index`.
    #[must_use]
    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(SqlValue::as_i64)
    }

    /// Text value at `index`.
    #[must_use]
    pub fn get_text(&self, index: usize) -> Option<String> {
        self.get(index).and_then(SqlValue::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ResultSet {
        ResultSet::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![SqlValue::Int(1), SqlValue::Text("a".into())],
                vec![SqlValue::Int(2), SqlValue::Null],
            ],
        )
    }

    #[test]
    fn test_typed_accessors() {
        let rs = result();
        let first = rs.first().unwrap();
        assert_eq!(first.get_i64(0), Some(1));
        assert_eq!(first.get_text(1), Some("a".to_string()));
        assert_eq!(first.get_named("NAME"), Some(&SqlValue::Text("a".into())));
        assert_eq!(first.get(5), None);
    }

    #[test]
    fn test_iteration_in_order() {
        let rs = result();
        let ids: Vec<_> = rs.iter().filter_map(|r| r.get_i64(0)).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(rs.len(), 2);
        assert!(ResultSet::default().is_empty());
    }

    #[test]
    fn test_column_row_builder() {
        let row = ColumnRow::new("price", "DECIMAL")
            .size(10, 2)
            .not_null()
            .default_expression("0.00");
        assert_eq!(row.size, Some(10));
        assert_eq!(row.scale, Some(2));
        assert!(!row.nullable);
        assert_eq!(row.default_expression.as_deref(), Some("0.00"));
    }
}
