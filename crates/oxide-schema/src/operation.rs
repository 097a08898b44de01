//! Reconciliation operations.
//!
//! An [`Operation`] is one structural change against a single table. A
//! [`ReconciliationPlan`] is the ordered list the planner produces; it is a
//! plain value and is never modified once built.

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnDescriptor, IndexDescriptor, TableDescriptor};

/// A single structural change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Create the whole table.
    CreateTable(TableDescriptor),

    /// Add a column to an existing table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column definition.
        column: ColumnDescriptor,
        /// Desired column that precedes this one, `None` for the first.
        predecessor: Option<String>,
    },

    /// Redefine an existing column.
    AlterColumn {
        /// Table name.
        table: String,
        /// The column as it should be.
        desired: ColumnDescriptor,
        /// The column as the catalog reported it.
        observed: ColumnDescriptor,
    },

    /// Drop a column.
    DropColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Create an index on an existing table.
    CreateIndex {
        /// Table name.
        table: String,
        /// Index definition.
        index: IndexDescriptor,
    },

    /// Drop an index.
    DropIndex {
        /// Table name.
        table: String,
        /// Index definition as observed.
        index: IndexDescriptor,
    },
}

impl Operation {
    /// Creates an `AddColumn` operation.
    #[must_use]
    pub fn add_column(
        table: impl Into<String>,
        column: ColumnDescriptor,
        predecessor: Option<String>,
    ) -> Self {
        Self::AddColumn {
            table: table.into(),
            column,
            predecessor,
        }
    }

    /// Creates an `AlterColumn` operation.
    #[must_use]
    pub fn alter_column(
        table: impl Into<String>,
        desired: ColumnDescriptor,
        observed: ColumnDescriptor,
    ) -> Self {
        Self::AlterColumn {
            table: table.into(),
            desired,
            observed,
        }
    }

    /// Creates a `DropColumn` operation.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DropColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a `CreateIndex` operation.
    #[must_use]
    pub fn create_index(table: impl Into<String>, index: IndexDescriptor) -> Self {
        Self::CreateIndex {
            table: table.into(),
            index,
        }
    }

    /// Creates a `DropIndex` operation.
    #[must_use]
    pub fn drop_index(table: impl Into<String>, index: IndexDescriptor) -> Self {
        Self::DropIndex {
            table: table.into(),
            index,
        }
    }

    /// Name of the table the operation applies to.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable(table) => &table.name,
            Self::AddColumn { table, .. }
            | Self::AlterColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::CreateIndex { table, .. }
            | Self::DropIndex { table, .. } => table,
        }
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable(table) => format!("Create table '{}'", table.name),
            Self::AddColumn { table, column, .. } => {
                format!("Add column '{}' to table '{table}'", column.name)
            }
            Self::AlterColumn { table, desired, .. } => {
                format!("Alter column '{}' on table '{table}'", desired.name)
            }
            Self::DropColumn { table, column } => {
                format!("Drop column '{column}' from table '{table}'")
            }
            Self::CreateIndex { table, index } => {
                format!("Create {} index '{}' on table '{table}'", index.kind, index.name)
            }
            Self::DropIndex { table, index } => {
                format!("Drop {} index '{}' on table '{table}'", index.kind, index.name)
            }
        }
    }
}

/// Ordered operations converging one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Operations in execution order.
    pub operations: Vec<Operation>,
}

impl ReconciliationPlan {
    /// Creates a plan from operations.
    #[must_use]
    pub const fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// True when the table is already converged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Iterates over the operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl<'a> IntoIterator for &'a ReconciliationPlan {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
