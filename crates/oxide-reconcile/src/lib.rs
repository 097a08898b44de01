//! Live schema reconciliation.
//!
//! `oxide-reconcile` connects the pure planning core in `oxide-schema` to a
//! database:
//!
//! - **Catalog** - the [`Connection`] and [`CatalogMetadata`] collaborator
//!   traits and the rows they exchange
//! - **Introspector** - reads a [`TableDescriptor`](oxide_schema::TableDescriptor)
//!   back from the catalog
//! - **Reconciler** - plans, renders and executes the DDL for one table or a
//!   whole schema file
//! - **SQLite** - [`SqliteDatabase`], a `sqlx` implementation of both traits
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_reconcile::prelude::*;
//!
//! let db = SqliteDatabase::connect("sqlite::memory:").await?;
//! let reconciler = Reconciler::new(db, DialectRules::sqlite());
//!
//! let schema = SchemaFile::load("schema.json")?;
//! for report in reconciler.reconcile_all(&schema.tables).await? {
//!     println!("{}: {} statement(s)", report.table, report.statements.len());
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show the live descriptor of a table
//! oxide-reconcile inspect users --row-count
//!
//! # Print the DDL that would converge the database
//! oxide-reconcile plan --schema schema.json
//!
//! # Apply it
//! oxide-reconcile apply --schema schema.json
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod schema_file;
pub mod sqlite;

pub use catalog::{CatalogMetadata, ColumnRow, Connection, Database, IndexRow, ResultSet, Row};
pub use error::{ReconcileError, Result};
pub use executor::{ReconcileOptions, Reconciler, TableReport};
pub use introspect::{IntrospectOptions, Introspector};
pub use schema_file::SchemaFile;
pub use sqlite::SqliteDatabase;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{CatalogMetadata, Connection, Database, ResultSet};
    pub use crate::error::{ReconcileError, Result};
    pub use crate::executor::{ReconcileOptions, Reconciler, TableReport};
    pub use crate::introspect::{IntrospectOptions, Introspector};
    pub use crate::schema_file::SchemaFile;
    pub use crate::sqlite::SqliteDatabase;
    pub use oxide_schema::prelude::{
        ColumnDescriptor, DefaultValue, DialectRules, IndexDescriptor, IndexKind, Operation,
        ReconciliationPlan, TableDescriptor, TypeFamily,
    };
}
