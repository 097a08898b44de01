//! Abstract column type families.
//!
//! A [`TypeFamily`] names a column type independently of any database's
//! native spelling. Dialects map families to keywords on output and native
//! type names back to families during introspection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a family is parameterized in a column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Fixed width, rendered without parentheses.
    Fixed,
    /// Rendered as `TYPE(length)`.
    Length,
    /// Rendered as `TYPE(length,scale)`.
    LengthScale,
}

/// Enumerated abstract column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeFamily {
    Tinyint,
    Smallint,
    Integer,
    Bigint,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    Longvarchar,
    Date,
    Time,
    Timestamp,
    Boolean,
    Binary,
    Varbinary,
    Longvarbinary,
    Clob,
    Blob,
}

impl TypeFamily {
    /// Every family, in declaration order.
    pub const ALL: [Self; 21] = [
        Self::Tinyint,
        Self::Smallint,
        Self::Integer,
        Self::Bigint,
        Self::Real,
        Self::Float,
        Self::Double,
        Self::Numeric,
        Self::Decimal,
        Self::Char,
        Self::Varchar,
        Self::Longvarchar,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Boolean,
        Self::Binary,
        Self::Varbinary,
        Self::Longvarbinary,
        Self::Clob,
        Self::Blob,
    ];

    /// Canonical upper-case name, also the default type keyword.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tinyint => "TINYINT",
            Self::Smallint => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::Bigint => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Longvarchar => "LONGVARCHAR",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Boolean => "BOOLEAN",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::Longvarbinary => "LONGVARBINARY",
            Self::Clob => "CLOB",
            Self::Blob => "BLOB",
        }
    }

    /// Looks up a family by its canonical name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns how the family is parameterized.
    #[must_use]
    pub const fn sizing(self) -> Sizing {
        match self {
            Self::Char
            | Self::Varchar
            | Self::Longvarchar
            | Self::Binary
            | Self::Varbinary
            | Self::Longvarbinary => Sizing::Length,
            Self::Numeric | Self::Decimal => Sizing::LengthScale,
            _ => Sizing::Fixed,
        }
    }

    /// Integer families.
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Tinyint | Self::Smallint | Self::Integer | Self::Bigint
        )
    }

    /// Approximate numeric families.
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Real | Self::Float | Self::Double)
    }

    /// Character families, including CLOB.
    #[must_use]
    pub const fn is_character(self) -> bool {
        matches!(
            self,
            Self::Char | Self::Varchar | Self::Longvarchar | Self::Clob
        )
    }

    /// Binary families, including BLOB.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::Varbinary | Self::Longvarbinary | Self::Blob
        )
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
