//! DDL synthesis.
//!
//! Renders planned operations into DDL text for one dialect. Rendering is
//! pure; executing the text is the caller's business.

use crate::defaults::render_default;
use crate::dialect::{DialectRules, IndexGrammar};
use crate::error::{Result, SchemaError};
use crate::operation::Operation;
use crate::schema::{ColumnDescriptor, IndexDescriptor, IndexKind, TableDescriptor};
use crate::types::Sizing;
use crate::value::SqlValue;

/// A rendered statement and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDdl {
    /// Statement text.
    pub sql: String,
    /// Positional parameters. DDL is rendered with inline literals, so this
    /// is empty for every operation the synthesizer produces.
    pub params: Vec<SqlValue>,
}

impl RenderedDdl {
    fn new(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }
}

/// Renders operations for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct DdlSynthesizer {
    rules: DialectRules,
}

impl DdlSynthesizer {
    /// Creates a synthesizer for `rules`.
    #[must_use]
    pub const fn new(rules: DialectRules) -> Self {
        Self { rules }
    }

    /// Returns the dialect rules in use.
    #[must_use]
    pub const fn rules(&self) -> &DialectRules {
        &self.rules
    }

    /// Renders one operation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedIndexKind`] when the dialect cannot
    /// create the requested index, and [`SchemaError::UnsupportedOperation`]
    /// for operations the dialect has no syntax for.
    pub fn render(&self, operation: &Operation) -> Result<RenderedDdl> {
        let sql = match operation {
            Operation::CreateTable(table) => self.create_table(table)?,
            Operation::AddColumn {
                table,
                column,
                predecessor,
            } => self.add_column(table, column, predecessor.as_deref())?,
            Operation::AlterColumn { table, desired, .. } => self.alter_column(table, desired)?,
            Operation::DropColumn { table, column } => format!(
                "ALTER TABLE {} DROP COLUMN {}",
                self.rules.quote_identifier(table),
                self.rules.quote_identifier(column)
            ),
            Operation::CreateIndex { table, index } => self.create_index(table, index)?,
            Operation::DropIndex { table, index } => self.drop_index(table, index)?,
        };
        Ok(RenderedDdl::new(sql))
    }

    /// Renders all operations in order, failing on the first unsupported one.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`DdlSynthesizer::render`].
    pub fn render_all<'a>(
        &self,
        operations: impl IntoIterator<Item = &'a Operation>,
    ) -> Result<Vec<RenderedDdl>> {
        operations.into_iter().map(|op| self.render(op)).collect()
    }

    /// Renders a column definition: quoted name followed by its type,
    /// default, nullability and identity clauses.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedOperation`] for auto-increment
    /// columns the dialect cannot express in this position.
    pub fn column_definition(&self, column: &ColumnDescriptor) -> Result<String> {
        self.column_definition_in(column, false)
    }

    fn column_definition_in(&self, column: &ColumnDescriptor, rowid_key: bool) -> Result<String> {
        let mut parts = vec![
            self.rules.quote_identifier(&column.name),
            self.type_clause(column),
        ];
        if let Some(default) = render_default(column, &self.rules).to_sql() {
            parts.push(default);
        }
        parts.push(if column.nullable { "NULL" } else { "NOT NULL" }.to_string());
        if column.auto_increment {
            match self.rules.auto_increment_keyword {
                Some(keyword) => parts.push(keyword.to_string()),
                None if rowid_key => {}
                None => {
                    return Err(self.unsupported(format!(
                        "auto-increment column '{}'",
                        column.name
                    )));
                }
            }
        }
        Ok(parts.join(" "))
    }

    fn type_clause(&self, column: &ColumnDescriptor) -> String {
        let keyword = self.rules.type_keyword(column.family);
        match column.family.sizing() {
            Sizing::Fixed => keyword.to_string(),
            Sizing::Length => format!("{keyword}({})", column.length),
            Sizing::LengthScale => format!("{keyword}({},{})", column.length, column.scale),
        }
    }

    fn create_table(&self, table: &TableDescriptor) -> Result<String> {
        let key = table.primary_key_columns();
        let mut definitions = table
            .columns
            .iter()
            .map(|column| {
                let rowid_key = self.rules.implicit_identity(table, column);
                if column.nullable && key.contains(column.name.as_str()) {
                    let mut column = column.clone();
                    column.nullable = false;
                    self.column_definition_in(&column, rowid_key)
                } else {
                    self.column_definition_in(column, rowid_key)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        for index in &table.indices {
            if !self.rules.supports_inline_index(index.kind) {
                continue;
            }
            let columns = self.rules.quote_list(&index.columns);
            definitions.push(match index.kind {
                IndexKind::PrimaryKey => format!("PRIMARY KEY ({columns})"),
                _ => format!("UNIQUE ({columns})"),
            });
        }

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.rules.quote_identifier(&table.name),
            definitions.join(", ")
        ))
    }

    fn add_column(
        &self,
        table: &str,
        column: &ColumnDescriptor,
        predecessor: Option<&str>,
    ) -> Result<String> {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.rules.quote_identifier(table),
            self.column_definition(column)?
        );
        if let (Some(keyword), Some(predecessor)) =
            (self.rules.column_placement_keyword, predecessor)
        {
            sql.push_str(&format!(
                " {keyword} {}",
                self.rules.quote_identifier(predecessor)
            ));
        }
        Ok(sql)
    }

    fn alter_column(&self, table: &str, desired: &ColumnDescriptor) -> Result<String> {
        if !self.rules.supports_alter_column {
            return Err(self.unsupported(format!("altering column '{table}.{}'", desired.name)));
        }
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.rules.quote_identifier(table),
            self.column_definition(desired)?
        ))
    }

    fn create_index(&self, table: &str, index: &IndexDescriptor) -> Result<String> {
        if !self.rules.supports_index_creation(index.kind) {
            return Err(SchemaError::UnsupportedIndexKind {
                dialect: self.rules.name,
                table: table.to_string(),
                index: index.name.clone(),
                kind: index.kind,
            });
        }
        let table = self.rules.quote_identifier(table);
        let columns = self.rules.quote_list(&index.columns);
        Ok(match (self.rules.index_grammar, index.kind) {
            (_, IndexKind::PrimaryKey) => {
                format!("ALTER TABLE {table} ADD PRIMARY KEY ({columns})")
            }
            (IndexGrammar::Constraint, _) => format!("ALTER TABLE {table} ADD UNIQUE ({columns})"),
            (IndexGrammar::Statement, kind) => format!(
                "CREATE {}INDEX IF NOT EXISTS {} ON {table} ({columns})",
                if kind == IndexKind::Unique { "UNIQUE " } else { "" },
                self.rules.quote_identifier(&index.name)
            ),
        })
    }

    fn drop_index(&self, table: &str, index: &IndexDescriptor) -> Result<String> {
        if index.kind == IndexKind::PrimaryKey {
            if !self.rules.supports_drop_primary_key {
                return Err(self.unsupported(format!("dropping the primary key of '{table}'")));
            }
            return Ok(format!(
                "ALTER TABLE {} DROP PRIMARY KEY",
                self.rules.quote_identifier(table)
            ));
        }
        let name = self.rules.quote_identifier(&index.name);
        Ok(match self.rules.index_grammar {
            IndexGrammar::Constraint => format!(
                "ALTER TABLE {} DROP CONSTRAINT {name}",
                self.rules.quote_identifier(table)
            ),
            IndexGrammar::Statement => format!("DROP INDEX {name}"),
        })
    }

    fn unsupported(&self, operation: String) -> SchemaError {
        SchemaError::UnsupportedOperation {
            dialect: self.rules.name,
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DefaultValue;
    use crate::types::TypeFamily;

    fn h2() -> DdlSynthesizer {
        DdlSynthesizer::new(DialectRules::h2())
    }

    fn sqlite() -> DdlSynthesizer {
        DdlSynthesizer::new(DialectRules::sqlite())
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
    fn test_create_table() {
        let ddl = h2().render(&Operation::CreateTable(t())).unwrap();
        assert_eq!(
            ddl.sql,
            "CREATE TABLE IF NOT EXISTS \"T\" (\"id\" INTEGER NOT NULL AUTO_INCREMENT, \
             \"name\" VARCHAR(50) NULL, PRIMARY KEY (\"id\"))"
        );
        assert!(ddl.params.is_empty());
    }

    #[test]
    fn test_create_table_keeps_declaration_order() {
        let table = TableDescriptor::new("t")
            .column(ColumnDescriptor::new("z", TypeFamily::Integer))
            .column(ColumnDescriptor::new("a", TypeFamily::Integer))
            .column(ColumnDescriptor::new("m", TypeFamily::Integer));
        let sql = h2().render(&Operation::CreateTable(table)).unwrap().sql;
        let z = sql.find("\"z\"").unwrap();
        let a = sql.find("\"a\"").unwrap();
        let m = sql.find("\"m\"").unwrap();
        assert!(z < a && a < m);
    }

    #[test]
    fn test_create_table_skips_normal_indices() {
        let table = t()
            .index(IndexDescriptor::unique("uq_name", ["name"]))
            .index(IndexDescriptor::normal("idx_name", ["name"]));
        let sql = h2().render(&Operation::CreateTable(table)).unwrap().sql;
        assert!(sql.ends_with("PRIMARY KEY (\"id\"), UNIQUE (\"name\"))"));
        assert!(!sql.contains("idx_name"));
    }

    #[test]
    fn test_column_definition_clause_order() {
        let col = ColumnDescriptor::new("price", TypeFamily::Decimal)
            .precision(10, 2)
            .not_null()
            .default(DefaultValue::Decimal("9.99".into()));
        assert_eq!(
            h2().column_definition(&col).unwrap(),
            "\"price\" DECIMAL(10,2) DEFAULT 9.99 NOT NULL"
        );
    }

    #[test]
    fn test_add_column_after_predecessor() {
        let op = Operation::add_column(
            "T",
            ColumnDescriptor::new("email", TypeFamily::Varchar).length(100),
            Some("name".into()),
        );
        assert_eq!(
            h2().render(&op).unwrap().sql,
            "ALTER TABLE \"T\" ADD COLUMN \"email\" VARCHAR(100) NULL AFTER \"name\""
        );
        assert_eq!(
            sqlite().render(&op).unwrap().sql,
            "ALTER TABLE \"T\" ADD COLUMN \"email\" VARCHAR(100) NULL"
        );

        let first = Operation::add_column("T", ColumnDescriptor::new("x", TypeFamily::Date), None);
        assert_eq!(
            h2().render(&first).unwrap().sql,
            "ALTER TABLE \"T\" ADD COLUMN \"x\" DATE NULL"
        );
    }

    #[test]
    fn test_alter_and_drop_column() {
        let desired = ColumnDescriptor::new("price", TypeFamily::Numeric).precision(10, 2);
        let observed = ColumnDescriptor::new("price", TypeFamily::Numeric).precision(10, 4);
        let alter = Operation::alter_column("T", desired, observed);
        assert_eq!(
            h2().render(&alter).unwrap().sql,
            "ALTER TABLE \"T\" ALTER COLUMN \"price\" NUMERIC(10,2) NULL"
        );
        assert!(matches!(
            sqlite().render(&alter),
            Err(SchemaError::UnsupportedOperation { .. })
        ));

        assert_eq!(
            h2().render(&Operation::drop_column("T", "legacy_flag")).unwrap().sql,
            "ALTER TABLE \"T\" DROP COLUMN \"legacy_flag\""
        );
    }

    #[test]
    fn test_normal_index_is_rejected_by_h2() {
        let op = Operation::create_index("T", IndexDescriptor::normal("idx_name", ["name"]));
        assert!(matches!(
            h2().render(&op),
            Err(SchemaError::UnsupportedIndexKind {
                kind: IndexKind::Normal,
                ..
            })
        ));
    }

    #[test]
    fn test_constraint_grammar() {
        let synth = h2();
        let pk = IndexDescriptor::primary_key(["id"]);
        let uq = IndexDescriptor::unique("uq_name", ["name", "id"]);
        assert_eq!(
            synth.render(&Operation::create_index("T", pk.clone())).unwrap().sql,
            "ALTER TABLE \"T\" ADD PRIMARY KEY (\"id\")"
        );
        assert_eq!(
            synth.render(&Operation::create_index("T", uq.clone())).unwrap().sql,
            "ALTER TABLE \"T\" ADD UNIQUE (\"name\", \"id\")"
        );
        assert_eq!(
            synth.render(&Operation::drop_index("T", pk)).unwrap().sql,
            "ALTER TABLE \"T\" DROP PRIMARY KEY"
        );
        assert_eq!(
            synth.render(&Operation::drop_index("T", uq)).unwrap().sql,
            "ALTER TABLE \"T\" DROP CONSTRAINT \"uq_name\""
        );
    }

    #[test]
    fn test_statement_grammar() {
        let synth = sqlite();
        assert_eq!(
            synth
                .render(&Operation::create_index("T", IndexDescriptor::unique("uq", ["name"])))
                .unwrap()
                .sql,
            "CREATE UNIQUE INDEX IF NOT EXISTS \"uq\" ON \"T\" (\"name\")"
        );
        assert_eq!(
            synth
                .render(&Operation::create_index("T", IndexDescriptor::normal("ix", ["name"])))
                .unwrap()
                .sql,
            "CREATE INDEX IF NOT EXISTS \"ix\" ON \"T\" (\"name\")"
        );
        assert_eq!(
            synth
                .render(&Operation::drop_index("T", IndexDescriptor::normal("ix", ["name"])))
                .unwrap()
                .sql,
            "DROP INDEX \"ix\""
        );
        assert!(synth
            .render(&Operation::drop_index("T", IndexDescriptor::primary_key(["id"])))
            .is_err());
    }

    #[test]
    fn test_primary_key_members_render_not_null() {
        let table = TableDescriptor::new("T")
            .column(ColumnDescriptor::new("code", TypeFamily::Varchar).length(10))
            .column(ColumnDescriptor::new("label", TypeFamily::Varchar).length(40))
            .primary_key(["code"]);
        assert_eq!(
            h2().render(&Operation::CreateTable(table)).unwrap().sql,
            "CREATE TABLE IF NOT EXISTS \"T\" (\"code\" VARCHAR(10) NOT NULL, \
             \"label\" VARCHAR(40) NULL, PRIMARY KEY (\"code\"))"
        );
    }

    #[test]
    fn test_sqlite_integer_key_identity() {
        let sql = sqlite().render(&Operation::CreateTable(t())).unwrap().sql;
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"T\" (\"id\" INTEGER NOT NULL, \
             \"name\" VARCHAR(50) NULL, PRIMARY KEY (\"id\"))"
        );

        let bigint = TableDescriptor::new("T")
            .column(
                ColumnDescriptor::new("id", TypeFamily::Bigint)
                    .not_null()
                    .auto_increment(),
            )
            .primary_key(["id"]);
        assert!(matches!(
            sqlite().render(&Operation::CreateTable(bigint)),
            Err(SchemaError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_render_all_stops_at_first_unsupported() {
        let ops = [
            Operation::drop_column("T", "a"),
            Operation::create_index("T", IndexDescriptor::normal("ix", ["b"])),
        ];
        assert!(h2().render_all(&ops).is_err());
        assert_eq!(sqlite().render_all(&ops).unwrap().len(), 2);
    }

    #[test]
    fn test_identifiers_are_always_quoted() {
        let table = TableDescriptor::new("order").column(
            ColumnDescriptor::new("select", TypeFamily::Boolean).default(DefaultValue::Bool(false)),
        );
        assert_eq!(
            h2().render(&Operation::CreateTable(table)).unwrap().sql,
            "CREATE TABLE IF NOT EXISTS \"order\" (\"select\" BOOLEAN DEFAULT FALSE NULL)"
        );
    }
}
