//! Schema reconciliation core.
//!
//! `oxide-schema` describes tables as plain values and computes the DDL that
//! converges a live table toward a desired shape:
//!
//! - **Descriptors** - [`TableDescriptor`], [`ColumnDescriptor`] and
//!   [`IndexDescriptor`] describe both the desired and the observed schema
//! - **Compatibility** - [`types_equal`] decides when two column types are
//!   synonyms rather than drift
//! - **Defaults** - [`render_default`] and [`defaults_match`] normalize
//!   default values in both directions
//! - **Planner** - [`Planner`] diffs two descriptors into a
//!   [`ReconciliationPlan`]
//! - **DDL** - [`DdlSynthesizer`] renders each [`Operation`] for a dialect
//!
//! Dialect differences are data, not code: every component takes a
//! [`DialectRules`] value.
//!
//! # Example
//!
//! ```rust
//! use oxide_schema::prelude::*;
//!
//! let desired = TableDescriptor::new("T")
//!     .column(
//!         ColumnDescriptor::new("id", TypeFamily::Integer)
//!             .not_null()
//!             .auto_increment(),
//!     )
//!     .column(ColumnDescriptor::new("name", TypeFamily::Varchar).length(50))
//!     .primary_key(["id"]);
//!
//! let rules = DialectRules::h2();
//! let plan = Planner::new(rules).plan(&desired, None);
//! let ddl = DdlSynthesizer::new(rules).render_all(&plan).unwrap();
//!
//! assert_eq!(
//!     ddl[0].sql,
//!     "CREATE TABLE IF NOT EXISTS \"T\" (\"id\" INTEGER NOT NULL AUTO_INCREMENT, \
//!      \"name\" VARCHAR(50) NULL, PRIMARY KEY (\"id\"))"
//! );
//! ```

pub mod compat;
pub mod ddl;
pub mod defaults;
pub mod dialect;
pub mod error;
pub mod operation;
pub mod planner;
pub mod schema;
pub mod types;
pub mod value;

pub use compat::types_equal;
pub use ddl::{DdlSynthesizer, RenderedDdl};
pub use defaults::{DefaultClause, defaults_match, render_default};
pub use dialect::{DialectRules, IndexGrammar};
pub use error::{Result, SchemaError};
pub use operation::{Operation, ReconciliationPlan};
pub use planner::{Planner, columns_match};
pub use schema::{
    ColumnDescriptor, DefaultValue, IndexDescriptor, IndexKind, TableDescriptor, TableKind,
    PRIMARY_KEY_INDEX_NAME,
};
pub use types::{Sizing, TypeFamily};
pub use value::SqlValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::ddl::{DdlSynthesizer, RenderedDdl};
    pub use crate::dialect::DialectRules;
    pub use crate::error::{Result, SchemaError};
    pub use crate::operation::{Operation, ReconciliationPlan};
    pub use crate::planner::Planner;
    pub use crate::schema::{
        ColumnDescriptor, DefaultValue, IndexDescriptor, IndexKind, TableDescriptor, TableKind,
    };
    pub use crate::types::TypeFamily;
    pub use crate::value::SqlValue;
}
