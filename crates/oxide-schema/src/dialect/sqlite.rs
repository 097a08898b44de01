//! SQLite rules.
//!
//! SQLite stores the declared type text verbatim, so canonical family names
//! round-trip through `pragma_table_info`. It lacks `ALTER COLUMN` and cannot
//! add or drop keys on an existing table. There is no identity keyword: a
//! single-column `INTEGER` primary key aliases the rowid and numbers itself.
//! Unique indices are created as named indices after the table so they can
//! be dropped again.

use crate::schema::IndexKind;
use crate::types::TypeFamily;

use super::{DialectRules, IndexGrammar};

const TYPE_ALIASES: &[(&str, TypeFamily)] = &[
    ("", TypeFamily::Blob),
    ("INT", TypeFamily::Integer),
    ("MEDIUMINT", TypeFamily::Integer),
    ("INT2", TypeFamily::Smallint),
    ("INT8", TypeFamily::Bigint),
    ("UNSIGNED BIG INT", TypeFamily::Bigint),
    ("BOOL", TypeFamily::Boolean),
    ("DOUBLE PRECISION", TypeFamily::Double),
    ("CHARACTER", TypeFamily::Char),
    ("NCHAR", TypeFamily::Char),
    ("CHARACTER VARYING", TypeFamily::Varchar),
    ("NVARCHAR", TypeFamily::Varchar),
    ("TEXT", TypeFamily::Longvarchar),
    ("DATETIME", TypeFamily::Timestamp),
];

pub(super) const SQLITE: DialectRules = DialectRules {
    name: "sqlite",
    identifier_delimiter: '"',
    type_keywords: &[],
    type_aliases: TYPE_ALIASES,
    inline_index_kinds: &[IndexKind::PrimaryKey],
    alter_index_kinds: &[IndexKind::Unique, IndexKind::Normal],
    index_grammar: IndexGrammar::Statement,
    supports_alter_column: false,
    supports_drop_primary_key: false,
    auto_increment_keyword: None,
    integer_key_identity: true,
    column_placement_keyword: None,
    boolean_literals: ("1", "0"),
    max_varchar_length: 1_000_000_000,
};
