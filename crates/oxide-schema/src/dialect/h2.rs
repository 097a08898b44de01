//! H2 rules.
//!
//! H2 speaks the canonical family names directly, declares keys as table
//! constraints and supports positional `ADD COLUMN`.

use crate::schema::IndexKind;
use crate::types::TypeFamily;

use super::{DialectRules, IndexGrammar};

const TYPE_ALIASES: &[(&str, TypeFamily)] = &[
    ("INT", TypeFamily::Integer),
    ("INT4", TypeFamily::Integer),
    ("MEDIUMINT", TypeFamily::Integer),
    ("SIGNED", TypeFamily::Integer),
    ("INT8", TypeFamily::Bigint),
    ("INT2", TypeFamily::Smallint),
    ("YEAR", TypeFamily::Smallint),
    ("BOOL", TypeFamily::Boolean),
    ("BIT", TypeFamily::Boolean),
    ("FLOAT4", TypeFamily::Real),
    ("FLOAT8", TypeFamily::Double),
    ("DOUBLE PRECISION", TypeFamily::Double),
    ("DEC", TypeFamily::Decimal),
    ("NUMBER", TypeFamily::Numeric),
    ("CHARACTER", TypeFamily::Char),
    ("NCHAR", TypeFamily::Char),
    ("CHARACTER VARYING", TypeFamily::Varchar),
    ("VARCHAR2", TypeFamily::Varchar),
    ("NVARCHAR", TypeFamily::Varchar),
    ("VARCHAR_CASESENSITIVE", TypeFamily::Varchar),
    ("VARCHAR_IGNORECASE", TypeFamily::Varchar),
    ("CHARACTER LARGE OBJECT", TypeFamily::Clob),
    ("TEXT", TypeFamily::Clob),
    ("NCLOB", TypeFamily::Clob),
    ("BINARY VARYING", TypeFamily::Varbinary),
    ("BINARY LARGE OBJECT", TypeFamily::Blob),
    ("BYTEA", TypeFamily::Blob),
    ("DATETIME", TypeFamily::Timestamp),
    ("SMALLDATETIME", TypeFamily::Timestamp),
];

pub(super) const H2: DialectRules = DialectRules {
    name: "h2",
    identifier_delimiter: '"',
    type_keywords: &[],
    type_aliases: TYPE_ALIASES,
    inline_index_kinds: &[IndexKind::PrimaryKey, IndexKind::Unique],
    alter_index_kinds: &[IndexKind::PrimaryKey, IndexKind::Unique],
    index_grammar: IndexGrammar::Constraint,
    supports_alter_column: true,
    supports_drop_primary_key: true,
    auto_increment_keyword: Some("AUTO_INCREMENT"),
    integer_key_identity: false,
    // Added columns are placed after their predecessor in declaration order.
    column_placement_keyword: Some("AFTER"),
    boolean_literals: ("TRUE", "FALSE"),
    max_varchar_length: i32::MAX.unsigned_abs(),
};
