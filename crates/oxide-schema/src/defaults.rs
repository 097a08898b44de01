//! Default-value normalization.
//!
//! Defaults travel in two directions. Outbound, a column's typed default is
//! rendered into a `DEFAULT` clause. Inbound, whatever the catalog probe
//! returned is coerced into the column's family so it can be compared with
//! the desired default through the same rendering.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::dialect::DialectRules;
use crate::schema::{ColumnDescriptor, DefaultValue};
use crate::types::TypeFamily;
use crate::value::{SqlValue, hex_literal, quote_text};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The outcome of rendering a column's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultClause {
    /// No `DEFAULT` clause at all.
    Omitted,
    /// `DEFAULT NULL`.
    Null,
    /// `DEFAULT <literal>`.
    Literal(String),
}

impl DefaultClause {
    /// Returns the clause text including the `DEFAULT` keyword, if any.
    #[must_use]
    pub fn to_sql(&self) -> Option<String> {
        match self {
            Self::Omitted => None,
            Self::Null => Some("DEFAULT NULL".to_string()),
            Self::Literal(literal) => Some(format!("DEFAULT {literal}")),
        }
    }
}

/// Renders the default clause of `column`.
#[must_use]
pub fn render_default(column: &ColumnDescriptor, rules: &DialectRules) -> DefaultClause {
    if column.auto_increment {
        return DefaultClause::Omitted;
    }
    match &column.default {
        None => DefaultClause::Omitted,
        Some(DefaultValue::Null) if !column.nullable => DefaultClause::Omitted,
        Some(DefaultValue::Null) => DefaultClause::Null,
        Some(value) => DefaultClause::Literal(render_value(value, column.family, rules)),
    }
}

/// Renders a default value as a SQL literal for a column of `family`.
#[must_use]
pub fn render_value(value: &DefaultValue, family: TypeFamily, rules: &DialectRules) -> String {
    match value {
        DefaultValue::Null => "NULL".to_string(),
        DefaultValue::Bool(b) => {
            let (t, f) = rules.boolean_literals;
            if *b { t } else { f }.to_string()
        }
        DefaultValue::Integer(n) => n.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Decimal(d) => d.clone(),
        DefaultValue::Text(s) => quote_text(s),
        DefaultValue::Date(d) => match family {
            TypeFamily::Timestamp => quoted(&d.and_time(NaiveTime::MIN), TIMESTAMP_FORMAT),
            _ => quoted(d, DATE_FORMAT),
        },
        DefaultValue::Time(t) => quoted(t, TIME_FORMAT),
        DefaultValue::Timestamp(ts) => match family {
            TypeFamily::Date => quoted(&ts.date(), DATE_FORMAT),
            TypeFamily::Time => quoted(&ts.time(), TIME_FORMAT),
            _ => quoted(ts, TIMESTAMP_FORMAT),
        },
        DefaultValue::Bytes(bytes) => hex_literal(bytes),
        DefaultValue::Expression(expr) => expr.clone(),
    }
}

trait Temporal {
    fn format_with(&self, fmt: &str) -> String;
}

impl Temporal for NaiveDate {
    fn format_with(&self, fmt: &str) -> String {
        self.format(fmt).to_string()
    }
}

impl Temporal for NaiveTime {
    fn format_with(&self, fmt: &str) -> String {
        self.format(fmt).to_string()
    }
}

impl Temporal for NaiveDateTime {
    fn format_with(&self, fmt: &str) -> String {
        self.format(fmt).to_string()
    }
}

fn quoted(value: &impl Temporal, fmt: &str) -> String {
    format!("'{}'", value.format_with(fmt))
}

impl From<SqlValue> for DefaultValue {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::Null,
            SqlValue::Bool(b) => Self::Bool(b),
            SqlValue::Int(n) => Self::Integer(n),
            SqlValue::Float(f) => Self::Float(f),
            SqlValue::Text(s) => Self::Text(s),
            SqlValue::Blob(b) => Self::Bytes(b),
        }
    }
}

/// Converts a probed default into `family`.
///
/// Values that cannot be interpreted in the family are returned unchanged,
/// which makes them compare unequal to any well-typed desired default.
#[must_use]
pub fn coerce(value: DefaultValue, family: TypeFamily) -> DefaultValue {
    use DefaultValue as V;

    match (value, family) {
        (value @ (V::Null | V::Expression(_)), _) => value,

        (V::Integer(n), TypeFamily::Boolean) if n == 0 || n == 1 => V::Bool(n == 1),
        (V::Text(s), TypeFamily::Boolean) => match parse_bool(&s) {
            Some(b) => V::Bool(b),
            None => V::Text(s),
        },

        (V::Bool(b), f) if f.is_integral() => V::Integer(i64::from(b)),
        #[allow(clippy::cast_possible_truncation)]
        (V::Float(x), f) if f.is_integral() && x.fract() == 0.0 => V::Integer(x as i64),
        (V::Text(s) | V::Decimal(s), f) if f.is_integral() => match s.trim().parse() {
            Ok(n) => V::Integer(n),
            Err(_) => V::Text(s),
        },

        #[allow(clippy::cast_precision_loss)]
        (V::Integer(n), f) if f.is_floating() => V::Float(n as f64),
        (V::Text(s) | V::Decimal(s), f) if f.is_floating() => match s.trim().parse() {
            Ok(x) => V::Float(x),
            Err(_) => V::Text(s),
        },

        (V::Integer(n), TypeFamily::Numeric | TypeFamily::Decimal) => V::Decimal(n.to_string()),
        (V::Float(x), TypeFamily::Numeric | TypeFamily::Decimal) => {
            V::Decimal(canonical_decimal(&x.to_string()).unwrap_or_else(|| x.to_string()))
        }
        (V::Text(s) | V::Decimal(s), TypeFamily::Numeric | TypeFamily::Decimal) => {
            match canonical_decimal(&s) {
                Some(d) => V::Decimal(d),
                None => V::Text(s),
            }
        }

        (V::Text(s), TypeFamily::Date) => parse_date(&s).map_or(V::Text(s), V::Date),
        (V::Timestamp(ts), TypeFamily::Date) => V::Date(ts.date()),
        (V::Text(s), TypeFamily::Time) => parse_time(&s).map_or(V::Text(s), V::Time),
        (V::Timestamp(ts), TypeFamily::Time) => V::Time(ts.time()),
        (V::Text(s), TypeFamily::Timestamp) => parse_timestamp(&s).map_or(V::Text(s), V::Timestamp),
        (V::Date(d), TypeFamily::Timestamp) => V::Timestamp(d.and_time(NaiveTime::MIN)),

        (V::Integer(n), f) if f.is_character() => V::Text(n.to_string()),
        (V::Float(x), f) if f.is_character() => V::Text(x.to_string()),
        (V::Decimal(d), f) if f.is_character() => V::Text(d),
        (V::Bool(b), f) if f.is_character() => V::Text(b.to_string()),

        (V::Text(s), f) if f.is_binary() => V::Bytes(s.into_bytes()),

        (value, _) => value,
    }
}

/// Whether the observed column's default is equivalent to the desired one.
///
/// Auto-increment columns never compare defaults. An absent default and an
/// explicit `NULL` are the same thing. Expression defaults are matched
/// against the raw expression text the catalog reported.
#[must_use]
pub fn defaults_match(
    desired: &ColumnDescriptor,
    observed: &ColumnDescriptor,
    rules: &DialectRules,
) -> bool {
    if desired.auto_increment {
        return true;
    }
    if let Some(DefaultValue::Expression(expr)) = &desired.default {
        return observed
            .default_expression
            .as_deref()
            .is_some_and(|raw| normalize_expression(raw) == normalize_expression(expr));
    }
    effective_literal(desired.default.clone(), desired.family, rules)
        == effective_literal(observed.default.clone(), desired.family, rules)
}

fn effective_literal(
    value: Option<DefaultValue>,
    family: TypeFamily,
    rules: &DialectRules,
) -> Option<String> {
    match value.map(|v| coerce(v, family)) {
        None | Some(DefaultValue::Null) => None,
        Some(v) => Some(render_value(&v, family, rules)),
    }
}

/// Strips wrapping parentheses and whitespace and upper-cases.
fn normalize_expression(expr: &str) -> String {
    let mut s = expr.trim();
    while s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        s = s[1..s.len() - 1].trim();
    }
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_uppercase().as_str() {
        "TRUE" | "T" | "1" | "YES" => Some(true),
        "FALSE" | "F" | "0" | "NO" => Some(false),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(s).map(|ts| ts.date()))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f").ok()
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Canonical text of an exact numeric: no leading `+`, no trailing
/// fractional zeros. Returns `None` for non-numeric text.
fn canonical_decimal(s: &str) -> Option<String> {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let valid = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !valid(int_part) || !valid(frac_part) {
        return None;
    }

    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if negative && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    Some(out)
}
