//! Reconciliation executor.
//!
//! Runs one table at a time through introspection, planning, rendering and
//! execution against a [`Database`].

use oxide_schema::{
    DdlSynthesizer, DialectRules, Planner, ReconciliationPlan, RenderedDdl, TableDescriptor,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Database;
use crate::error::{ReconcileError, Result};
use crate::introspect::{IntrospectOptions, Introspector};

/// Options for a [`Reconciler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Render statements without executing them.
    pub dry_run: bool,
    /// Count rows when inspecting a table.
    pub row_count: bool,
}

impl ReconcileOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enables row counting on inspection.
    #[must_use]
    pub const fn row_count(mut self, enabled: bool) -> Self {
        self.row_count = enabled;
        self
    }
}

/// Outcome of reconciling one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    /// Table name.
    pub table: String,
    /// The plan that was computed.
    pub plan: ReconciliationPlan,
    /// Rendered statements, in execution order.
    pub statements: Vec<String>,
    /// Whether the statements were executed (false in dry-run mode).
    pub executed: bool,
}

impl TableReport {
    /// True when the table was already converged.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.plan.is_empty()
    }
}

/// Converges tables toward desired descriptors.
pub struct Reconciler<D: Database> {
    db: D,
    rules: DialectRules,
    options: ReconcileOptions,
}

impl<D: Database> Reconciler<D> {
    /// Creates a reconciler for `db` speaking `rules`.
    pub fn new(db: D, rules: DialectRules) -> Self {
        Self {
            db,
            rules,
            options: ReconcileOptions::default(),
        }
    }

    /// Sets the options.
    #[must_use]
    pub fn options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables dry-run mode (statements are rendered but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.options.dry_run = enabled;
        self
    }

    /// Returns the database.
    #[must_use]
    pub fn database(&self) -> &D {
        &self.db
    }

    /// Returns the dialect rules.
    #[must_use]
    pub fn rules(&self) -> &DialectRules {
        &self.rules
    }

    /// Reads the current descriptor of `table`, including the row count if
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    pub async fn inspect(&self, table: &str) -> Result<Option<TableDescriptor>> {
        Introspector::new(self.rules)
            .options(IntrospectOptions::new().row_count(self.options.row_count))
            .introspect(&self.db, table)
            .await
    }

    /// Computes the plan for `desired` against the live table.
    ///
    /// # Errors
    ///
    /// Returns an error if `desired` is invalid for the dialect or the
    /// metadata cannot be read.
    pub async fn plan(&self, desired: &TableDescriptor) -> Result<ReconciliationPlan> {
        desired.validate()?;
        self.rules.check_table(desired)?;

        let actual = Introspector::new(self.rules)
            .introspect(&self.db, &desired.name)
            .await?;
        Ok(Planner::new(self.rules).plan(desired, actual.as_ref()))
    }

    /// Reconciles one table.
    ///
    /// The whole plan is rendered before anything runs, so an operation
    /// the dialect cannot express fails without touching the database.
    /// Statements then run in plan order; the first failure stops the run
    /// and earlier statements stay applied.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Schema`] for invalid descriptors and
    /// unsupported operations, [`ReconcileError::Database`] for metadata
    /// failures and [`ReconcileError::Execution`] when a statement fails.
    pub async fn reconcile(&self, desired: &TableDescriptor) -> Result<TableReport> {
        info!(table = %desired.name, "Reconciling table");

        let plan = self.plan(desired).await?;
        let rendered = DdlSynthesizer::new(self.rules).render_all(&plan)?;

        if plan.is_empty() {
            info!(table = %desired.name, "Table already converged");
        } else if self.options.dry_run {
            for ddl in &rendered {
                info!(sql = %ddl.sql, "Dry run, not executing");
            }
        } else {
            self.execute(&rendered).await?;
            info!(
                table = %desired.name,
                statements = rendered.len(),
                "Table reconciled"
            );
        }

        Ok(TableReport {
            table: desired.name.clone(),
            executed: !self.options.dry_run && !plan.is_empty(),
            statements: rendered.into_iter().map(|ddl| ddl.sql).collect(),
            plan,
        })
    }

    /// Reconciles tables in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Reconciler::reconcile`].
    pub async fn reconcile_all(&self, tables: &[TableDescriptor]) -> Result<Vec<TableReport>> {
        let mut reports = Vec::with_capacity(tables.len());
        for table in tables {
            reports.push(self.reconcile(table).await?);
        }
        Ok(reports)
    }

    async fn execute(&self, rendered: &[RenderedDdl]) -> Result<()> {
        for (executed, ddl) in rendered.iter().enumerate() {
            debug!(sql = %ddl.sql, "Executing DDL");
            self.db
                .execute(&ddl.sql, &ddl.params)
                .await
                .map_err(|source| ReconcileError::Execution {
                    statement: ddl.sql.clone(),
                    executed,
                    source,
                })?;
        }
        Ok(())
    }
}
