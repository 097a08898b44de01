//! Dialect rules.
//!
//! A [`DialectRules`] value is the complete set of syntax choices and
//! support limits for one database product. The planner and the DDL
//! synthesizer take it as configuration; adding a dialect means adding a
//! preset, not a new implementation.

mod h2;
mod sqlite;

use crate::error::{Result, SchemaError};
use crate::schema::{ColumnDescriptor, IndexKind, TableDescriptor};
use crate::types::{Sizing, TypeFamily};

/// How indices are created and dropped after table creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexGrammar {
    /// `ALTER TABLE t ADD UNIQUE (..)` / `ALTER TABLE t DROP CONSTRAINT name`.
    Constraint,
    /// `CREATE [UNIQUE] INDEX name ON t (..)` / `DROP INDEX name`.
    Statement,
}

/// Syntax and capability set of one database product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectRules {
    /// Dialect name.
    pub name: &'static str,
    /// Character used to delimit identifiers.
    pub identifier_delimiter: char,
    /// Type keywords that differ from the family's canonical name.
    pub type_keywords: &'static [(TypeFamily, &'static str)],
    /// Native type names (upper case, without arguments) that map to a
    /// family under a different name.
    pub type_aliases: &'static [(&'static str, TypeFamily)],
    /// Index kinds that may be declared inside `CREATE TABLE`.
    pub inline_index_kinds: &'static [IndexKind],
    /// Index kinds that may be created on an existing table.
    pub alter_index_kinds: &'static [IndexKind],
    /// Grammar used for indices on existing tables.
    pub index_grammar: IndexGrammar,
    /// Whether `ALTER TABLE .. ALTER COLUMN` is available.
    pub supports_alter_column: bool,
    /// Whether a primary key can be dropped from an existing table.
    pub supports_drop_primary_key: bool,
    /// Keyword appended to auto-increment columns, `None` if unsupported.
    pub auto_increment_keyword: Option<&'static str>,
    /// Whether a single-column INTEGER primary key is implicitly
    /// auto-increment.
    pub integer_key_identity: bool,
    /// Keyword placing an added column after its predecessor, `None` if
    /// columns can only be appended.
    pub column_placement_keyword: Option<&'static str>,
    /// Literals for boolean `true` and `false` defaults.
    pub boolean_literals: (&'static str, &'static str),
    /// Largest accepted VARCHAR length.
    pub max_varchar_length: u32,
}

impl DialectRules {
    /// Rules for H2.
    #[must_use]
    pub const fn h2() -> Self {
        h2::H2
    }

    /// Rules for SQLite.
    #[must_use]
    pub const fn sqlite() -> Self {
        sqlite::SQLITE
    }

    /// Looks up a preset by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        [Self::h2(), Self::sqlite()]
            .into_iter()
            .find(|rules| rules.name.eq_ignore_ascii_case(name))
    }

    /// Quotes an identifier, doubling embedded delimiters.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let q = self.identifier_delimiter;
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Quotes and joins a column list.
    #[must_use]
    pub fn quote_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|n| self.quote_identifier(n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the type keyword for a family.
    #[must_use]
    pub fn type_keyword(&self, family: TypeFamily) -> &'static str {
        self.type_keywords
            .iter()
            .find(|(f, _)| *f == family)
            .map_or_else(|| family.name(), |(_, keyword)| *keyword)
    }

    /// Whether `kind` may be declared inline in `CREATE TABLE`.
    #[must_use]
    pub fn supports_inline_index(&self, kind: IndexKind) -> bool {
        self.inline_index_kinds.contains(&kind)
    }

    /// Whether `kind` may be created on an existing table.
    #[must_use]
    pub fn supports_index_creation(&self, kind: IndexKind) -> bool {
        self.alter_index_kinds.contains(&kind)
    }

    /// Resolves a native type declaration into a family, length and scale.
    ///
    /// `native` may carry its own arguments (`NUMERIC(10,2)`); those win
    /// over `size` and `scale` reported separately by the catalog.
    #[must_use]
    pub fn resolve_type(
        &self,
        native: &str,
        size: Option<u32>,
        scale: Option<u32>,
    ) -> Option<(TypeFamily, u32, u32)> {
        let (base, args) = split_declaration(native);
        let family = self
            .type_aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(&base))
            .map(|(_, family)| *family)
            .or_else(|| TypeFamily::from_name(&base))?;

        let length = args.first().copied().or(size).unwrap_or(0);
        let scale = match family.sizing() {
            Sizing::LengthScale => args.get(1).copied().or(scale).unwrap_or(0),
            _ => 0,
        };
        Some((family, length, scale))
    }

    /// Whether `column` is an identity column without declaring one: the
    /// sole INTEGER primary key member when `integer_key_identity` holds.
    #[must_use]
    pub fn implicit_identity(&self, table: &TableDescriptor, column: &ColumnDescriptor) -> bool {
        if !self.integer_key_identity || column.family != TypeFamily::Integer {
            return false;
        }
        let key = table.primary_key_columns();
        key.len() == 1 && key.contains(column.name.as_str())
    }

    /// Checks a desired table against the dialect's limits.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidDescriptor`] for VARCHAR lengths above
    /// [`DialectRules::max_varchar_length`].
    pub fn check_table(&self, table: &TableDescriptor) -> Result<()> {
        for column in &table.columns {
            if column.family == TypeFamily::Varchar && column.length > self.max_varchar_length {
                return Err(SchemaError::InvalidDescriptor {
                    table: table.name.clone(),
                    message: format!(
                        "column '{}' exceeds the {} VARCHAR limit of {}",
                        column.name, self.name, self.max_varchar_length
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Splits `NAME(a, b)` into an upper-cased, whitespace-normalized name and
/// its numeric arguments. Non-numeric arguments are dropped.
fn split_declaration(native: &str) -> (String, Vec<u32>) {
    let (name, args) = match native.find('(') {
        Some(open) => {
            let close = native.rfind(')').unwrap_or(native.len());
            let inner = native.get(open + 1..close).unwrap_or("");
            let args: Vec<u32> = inner
                .split(',')
                .filter_map(|a| a.trim().parse().ok())
                .collect();
            (&native[..open], args)
        }
        None => (native, Vec::new()),
    };
    let name = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    (name, args)
}
