//! SQL values exchanged with the execution collaborator.
//!
//! The same type carries bound DDL parameters on the way out and result
//! cursor cells on the way back in.

use serde::{Deserialize, Serialize};

/// A single SQL value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Reads the value as an integer, accepting integral floats and
    /// numeric text.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Reads the value as text. Numbers are formatted, blobs are not
    /// converted.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::Blob(_) => None,
        }
    }
}

/// Wraps text in single quotes, doubling embedded quotes.
#[must_use]
pub fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Renders bytes as an `X'..'` hex literal.
#[must_use]
pub fn hex_literal(bytes: &[u8]) -> String {
    let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
    format!("X'{hex}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_text_doubles_quotes() {
        assert_eq!(quote_text("it's"), "'it''s'");
        assert_eq!(quote_text(""), "''");
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(hex_literal(&[0x48, 0x45, 0x4C, 0x4C, 0x4F]), "X'48454C4C4F'");
        assert_eq!(hex_literal(&[]), "X''");
    }

    #[test]
    fn test_as_i64_accepts_integral_values() {
        assert_eq!(SqlValue::Int(7).as_i64(), Some(7));
        assert_eq!(SqlValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(SqlValue::Float(3.5).as_i64(), None);
        assert_eq!(SqlValue::Text(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(SqlValue::Null.as_i64(), None);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(SqlValue::Int(5).as_text(), Some("5".to_string()));
        assert_eq!(SqlValue::Blob(vec![1]).as_text(), None);
        assert!(SqlValue::Null.is_null());
    }
}
