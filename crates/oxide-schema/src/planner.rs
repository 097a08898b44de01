//! Diff planner.
//!
//! Compares a desired table with what the catalog reported and produces the
//! operations that converge one into the other. Planning performs no I/O.

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::compat::types_equal;
use crate::defaults::defaults_match;
use crate::dialect::DialectRules;
use crate::operation::{Operation, ReconciliationPlan};
use crate::schema::{ColumnDescriptor, IndexDescriptor, IndexKind, TableDescriptor};

/// Computes reconciliation plans for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Planner {
    rules: DialectRules,
}

impl Planner {
    /// Creates a planner for `rules`.
    #[must_use]
    pub const fn new(rules: DialectRules) -> Self {
        Self { rules }
    }

    /// Returns the dialect rules in use.
    #[must_use]
    pub const fn rules(&self) -> &DialectRules {
        &self.rules
    }

    /// Plans the operations that turn `actual` into `desired`.
    ///
    /// A missing table yields a single `CreateTable`, followed by
    /// `CreateIndex` for kinds the dialect cannot declare inline but can
    /// add afterwards. Otherwise the plan lists column drops, then column
    /// additions and alterations in declaration order, then index changes
    /// with the primary key first.
    ///
    /// Primary key members are planned NOT NULL whatever `desired` says,
    /// since every catalog reports them that way.
    #[must_use]
    pub fn plan(
        &self,
        desired: &TableDescriptor,
        actual: Option<&TableDescriptor>,
    ) -> ReconciliationPlan {
        let desired = required_keys(desired);
        let desired = &*desired;
        let operations = match actual {
            None => self.plan_create(desired),
            Some(actual) => {
                let mut operations = self.diff_columns(desired, actual);
                operations.extend(self.diff_indices(desired, actual));
                operations
            }
        };
        tracing::debug!(
            table = %desired.name,
            operations = operations.len(),
            "Planned reconciliation"
        );
        ReconciliationPlan::new(operations)
    }

    fn plan_create(&self, desired: &TableDescriptor) -> Vec<Operation> {
        let mut operations = vec![Operation::CreateTable(desired.clone())];
        for index in &desired.indices {
            if self.rules.supports_inline_index(index.kind) {
                continue;
            }
            if self.rules.supports_index_creation(index.kind) {
                operations.push(Operation::create_index(&desired.name, index.clone()));
            } else {
                self.skip(&desired.name, index);
            }
        }
        operations
    }

    fn diff_columns(&self, desired: &TableDescriptor, actual: &TableDescriptor) -> Vec<Operation> {
        let table = &desired.name;
        let mut operations: Vec<Operation> = actual
            .columns
            .iter()
            .filter(|c| desired.get_column(&c.name).is_none())
            .map(|c| Operation::drop_column(table, &c.name))
            .collect();

        let mut predecessor: Option<&str> = None;
        for column in &desired.columns {
            match actual.get_column(&column.name) {
                None => operations.push(Operation::add_column(
                    table,
                    column.clone(),
                    predecessor.map(str::to_string),
                )),
                Some(observed) if !self.column_converged(desired, column, observed) => {
                    operations.push(Operation::alter_column(
                        table,
                        column.clone(),
                        observed.clone(),
                    ));
                }
                Some(_) => {}
            }
            predecessor = Some(column.name.as_str());
        }
        operations
    }

    /// Compares with an implicit identity key counted as auto-increment.
    fn column_converged(
        &self,
        table: &TableDescriptor,
        column: &ColumnDescriptor,
        observed: &ColumnDescriptor,
    ) -> bool {
        if !column.auto_increment && self.rules.implicit_identity(table, column) {
            let mut identity = column.clone();
            identity.auto_increment = true;
            return columns_match(&identity, observed, &self.rules);
        }
        columns_match(column, observed, &self.rules)
    }

    fn diff_indices(&self, desired: &TableDescriptor, actual: &TableDescriptor) -> Vec<Operation> {
        let table = &desired.name;
        let mut operations = Vec::new();

        let desired_pk = desired.primary_key_index();
        let actual_pk = actual.primary_key_index();
        let same_pk = match (desired_pk, actual_pk) {
            (Some(d), Some(a)) => d.column_set() == a.column_set(),
            (None, None) => true,
            _ => false,
        };
        if !same_pk {
            if let Some(pk) = actual_pk {
                operations.push(Operation::drop_index(table, pk.clone()));
            }
            if let Some(pk) = desired_pk {
                self.push_create(&mut operations, table, pk);
            }
        }

        let desired_keys = secondary_indices(desired);
        let actual_keys = secondary_indices(actual);

        for (index, key) in &actual_keys {
            if !desired_keys.iter().any(|(_, k)| k == key) {
                operations.push(Operation::drop_index(table, (*index).clone()));
            }
        }
        for (index, key) in &desired_keys {
            if !actual_keys.iter().any(|(_, k)| k == key) {
                self.push_create(&mut operations, table, index);
            }
        }
        operations
    }

    fn push_create(&self, operations: &mut Vec<Operation>, table: &str, index: &IndexDescriptor) {
        if self.rules.supports_index_creation(index.kind) {
            operations.push(Operation::create_index(table, index.clone()));
        } else {
            self.skip(table, index);
        }
    }

    fn skip(&self, table: &str, index: &IndexDescriptor) {
        tracing::debug!(
            table,
            index = %index.name,
            kind = %index.kind,
            dialect = self.rules.name,
            "Skipping index the dialect cannot create"
        );
    }
}

/// Identity of a non-primary index: its kind and its column set with
/// primary key members removed.
type IndexKey<'a> = (IndexKind, BTreeSet<&'a str>);

/// Non-primary indices keyed for matching. Indices fully covered by the
/// primary key have no key and are left out.
fn secondary_indices(table: &TableDescriptor) -> Vec<(&IndexDescriptor, IndexKey<'_>)> {
    let pk = table.primary_key_columns();
    table
        .indices
        .iter()
        .filter(|i| i.kind != IndexKind::PrimaryKey)
        .filter_map(|i| {
            let columns: BTreeSet<&str> = i.column_set().difference(&pk).copied().collect();
            (!columns.is_empty()).then_some((i, (i.kind, columns)))
        })
        .collect()
}

/// Returns `table` with every primary key member marked NOT NULL.
fn required_keys(table: &TableDescriptor) -> Cow<'_, TableDescriptor> {
    let key = table.primary_key_columns();
    if !table
        .columns
        .iter()
        .any(|c| c.nullable && key.contains(c.name.as_str()))
    {
        return Cow::Borrowed(table);
    }
    let mut table = table.clone();
    for column in &mut table.columns {
        if key.contains(column.name.as_str()) {
            column.nullable = false;
        }
    }
    Cow::Owned(table)
}

/// Whether an observed column already satisfies the desired definition.
#[must_use]
pub fn columns_match(
    desired: &ColumnDescriptor,
    observed: &ColumnDescriptor,
    rules: &DialectRules,
) -> bool {
    types_equal(desired, observed)
        && desired.nullable == observed.nullable
        && desired.auto_increment == observed.auto_increment
        && defaults_match(desired, observed, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DefaultValue;
    use crate::types::TypeFamily;

    fn planner() -> Planner {
        Planner::new(DialectRules::h2())
    }

    fn t() -> TableDescriptor {
        TableDescriptor::new("T")
            .column(
                ColumnDescriptor::new("id", TypeFamily::Integer)
                    .not_null()
                    .auto_increment(),
            )
            .column(ColumnDescriptor::new("name", TypeFamily::Varchar).length(50))
            .primary_key(["id"])
    }

    #[test]
    fn test_missing_table_is_created() {
        let plan = planner().plan(&t(), None);
        assert_eq!(plan.operations, vec![Operation::CreateTable(t())]);
    }

    #[test]
    fn test_converged_table_yields_empty_plan() {
        assert!(planner().plan(&t(), Some(&t())).is_empty());
    }

    #[test]
    fn test_extra_column_is_dropped() {
        let actual =
            t().column(ColumnDescriptor::new("legacy_flag", TypeFamily::Tinyint).length(1));
        let plan = planner().plan(&t(), Some(&actual));
        assert_eq!(plan.operations, vec![Operation::drop_column("T", "legacy_flag")]);
    }

    #[test]
    fn test_boolean_matches_tinyint_one() {
        let desired = t().column(ColumnDescriptor::new("active", TypeFamily::Boolean));
        let actual = t().column(ColumnDescriptor::new("active", TypeFamily::Tinyint).length(1));
        assert!(planner().plan(&desired, Some(&actual)).is_empty());
    }

    #[test]
    fn test_numeric_scale_change_alters_column() {
        let wanted = ColumnDescriptor::new("price", TypeFamily::Numeric).precision(10, 2);
        let found = ColumnDescriptor::new("price", TypeFamily::Numeric).precision(10, 4);
        let plan = planner().plan(
            &t().column(wanted.clone()),
            Some(&t().column(found.clone())),
        );
        assert_eq!(plan.operations, vec![Operation::alter_column("T", wanted, found)]);
    }

    #[test]
    fn test_added_columns_carry_predecessor() {
        let desired = TableDescriptor::new("T")
            .column(ColumnDescriptor::new("first", TypeFamily::Integer))
            .column(ColumnDescriptor::new("id", TypeFamily::Integer))
            .column(ColumnDescriptor::new("email", TypeFamily::Varchar).length(80));
        let actual =
            TableDescriptor::new("T").column(ColumnDescriptor::new("id", TypeFamily::Integer));

        let plan = planner().plan(&desired, Some(&actual));
        assert_eq!(
            plan.operations,
            vec![
                Operation::add_column("T", desired.columns[0].clone(), None),
                Operation::add_column("T", desired.columns[2].clone(), Some("id".into())),
            ]
        );
    }

    #[test]
    fn test_default_and_nullability_drift_alters_column() {
        let desired = t().column(
            ColumnDescriptor::new("score", TypeFamily::Integer)
                .not_null()
                .default(DefaultValue::Integer(0)),
        );
        let actual = t().column(ColumnDescriptor::new("score", TypeFamily::Integer).not_null());
        let plan = planner().plan(&desired, Some(&actual));
        assert!(matches!(plan.operations[..], [Operation::AlterColumn { .. }]));

        let actual = t().column(
            ColumnDescriptor::new("score", TypeFamily::Integer).default(DefaultValue::Integer(0)),
        );
        assert_eq!(planner().plan(&desired, Some(&actual)).len(), 1);
    }

    #[test]
    fn test_drops_precede_adds_and_alters() {
        let desired = t()
            .column(ColumnDescriptor::new("a", TypeFamily::Integer))
            .column(ColumnDescriptor::new("b", TypeFamily::Integer).not_null());
        let actual = t()
            .column(ColumnDescriptor::new("b", TypeFamily::Integer))
            .column(ColumnDescriptor::new("old", TypeFamily::Integer));

        let plan = planner().plan(&desired, Some(&actual));
        assert!(matches!(
            plan.operations[..],
            [
                Operation::DropColumn { .. },
                Operation::AddColumn { .. },
                Operation::AlterColumn { .. }
            ]
        ));
    }

    #[test]
    fn test_indices_match_by_columns_not_name() {
        let desired = t().index(IndexDescriptor::unique("uq_name", ["name"]));
        let actual = t().index(IndexDescriptor::unique("CONSTRAINT_8A", ["name"]));
        assert!(planner().plan(&desired, Some(&actual)).is_empty());
    }

    #[test]
    fn test_primary_key_change_comes_first() {
        let desired = t()
            .primary_key(["name"])
            .index(IndexDescriptor::unique("uq_id", ["id"]));
        let actual = t().index(IndexDescriptor::unique("uq_old", ["name"]));

        let plan = planner().plan(&desired, Some(&actual));
        assert_eq!(
            plan.operations,
            vec![
                Operation::alter_column(
                    "T",
                    desired.columns[1].clone().not_null(),
                    actual.columns[1].clone(),
                ),
                Operation::drop_index("T", IndexDescriptor::primary_key(["id"])),
                Operation::create_index("T", IndexDescriptor::primary_key(["name"])),
                Operation::drop_index("T", IndexDescriptor::unique("uq_old", ["name"])),
                Operation::create_index("T", IndexDescriptor::unique("uq_id", ["id"])),
            ]
        );
    }

    #[test]
    fn test_primary_key_members_are_ignored_in_secondary_indices() {
        let desired = t().index(IndexDescriptor::unique("uq", ["id", "name"]));
        let actual = t().index(IndexDescriptor::unique("uq", ["name"]));
        assert!(planner().plan(&desired, Some(&actual)).is_empty());

        let covered = t().index(IndexDescriptor::unique("uq_id", ["id"]));
        assert!(planner().plan(&covered, Some(&t())).is_empty());
    }

    #[test]
    fn test_unsupported_index_kinds_are_skipped() {
        let desired = t().index(IndexDescriptor::normal("idx_name", ["name"]));
        assert!(planner().plan(&desired, Some(&t())).is_empty());
        assert_eq!(planner().plan(&desired, None).len(), 1);
    }

    #[test]
    fn test_sqlite_creates_normal_index_after_table() {
        let desired = t().index(IndexDescriptor::normal("idx_name", ["name"]));
        let plan = Planner::new(DialectRules::sqlite()).plan(&desired, None);
        assert_eq!(
            plan.operations,
            vec![
                Operation::CreateTable(desired.clone()),
                Operation::create_index("T", IndexDescriptor::normal("idx_name", ["name"])),
            ]
        );
    }

    #[test]
    fn test_unique_and_normal_on_same_columns_differ() {
        let desired = t().index(IndexDescriptor::unique("ix", ["name"]));
        let actual = t().index(IndexDescriptor::normal("ix", ["name"]));
        let plan = Planner::new(DialectRules::sqlite()).plan(&desired, Some(&actual));
        assert_eq!(plan.len(), 2);
        assert!(matches!(plan.operations[0], Operation::DropIndex { .. }));
        assert!(matches!(plan.operations[1], Operation::CreateIndex { .. }));
    }

    #[test]
    fn test_nullable_key_member_is_planned_not_null() {
        let desired = TableDescriptor::new("T")
            .column(ColumnDescriptor::new("code", TypeFamily::Varchar).length(10))
            .primary_key(["code"]);
        let reported = TableDescriptor::new("T")
            .column(
                ColumnDescriptor::new("code", TypeFamily::Varchar)
                    .length(10)
                    .not_null(),
            )
            .primary_key(["code"]);

        assert!(planner().plan(&desired, Some(&reported)).is_empty());
        assert_eq!(
            planner().plan(&desired, None).operations,
            vec![Operation::CreateTable(reported)]
        );
    }

    #[test]
    fn test_sqlite_integer_key_is_an_identity() {
        let desired = TableDescriptor::new("T")
            .column(ColumnDescriptor::new("id", TypeFamily::Integer).not_null())
            .primary_key(["id"]);
        let reported = TableDescriptor::new("T")
            .column(
                ColumnDescriptor::new("id", TypeFamily::Integer)
                    .not_null()
                    .auto_increment(),
            )
            .primary_key(["id"]);

        let sqlite = Planner::new(DialectRules::sqlite());
        assert!(sqlite.plan(&desired, Some(&reported)).is_empty());
        assert_eq!(planner().plan(&desired, Some(&reported)).len(), 1);
    }
}
