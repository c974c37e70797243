use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Timestamp layout used for literal rendering and the seeder header.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single column value, borrowed from an item record.
///
/// Every variant carries its own absent state, so rendering is exhaustive over
/// both the field kind and nullability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlValue<'a> {
    Text(Option<&'a str>),
    Integer(Option<i64>),
    Decimal(Option<Decimal>),
    Boolean(Option<bool>),
    Timestamp(Option<NaiveDateTime>),
}

impl SqlValue<'_> {
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Integer(v) => v.is_none(),
            SqlValue::Decimal(v) => v.is_none(),
            SqlValue::Boolean(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
        }
    }

    /// Renders the value as an inline SQL literal.
    ///
    /// Text is single-quoted with embedded quotes doubled; nothing else is
    /// escaped. Decimals use the same `Decimal` text the parameter path binds.
    pub fn to_literal(&self) -> String {
        match *self {
            SqlValue::Text(Some(s)) => quote(s),
            SqlValue::Integer(Some(i)) => i.to_string(),
            SqlValue::Decimal(Some(d)) => d.to_string(),
            SqlValue::Boolean(Some(b)) => b.to_string(),
            SqlValue::Timestamp(Some(ts)) => quote(&ts.format(TIMESTAMP_FORMAT).to_string()),
            SqlValue::Text(None)
            | SqlValue::Integer(None)
            | SqlValue::Decimal(None)
            | SqlValue::Boolean(None)
            | SqlValue::Timestamp(None) => "NULL".to_string(),
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
