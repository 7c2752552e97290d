//! Cell values for heterogeneous table rows.
//!
//! A row maps column slugs to dynamically-typed values. Absence is modeled
//! by the slug simply not being present in the row map, so there is no
//! `Missing` variant here.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single dynamically-typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl CellValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True for the empty string; numbers and booleans are never empty.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Truthiness for filter/selection columns: boolean value, non-zero
    /// number, or non-empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Boolean(b) => *b,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(s) => !s.is_empty(),
        }
    }

    /// Render the raw value without any column-kind formatting.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Number(n) => format_f64_plain(*n),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Total order used for row sorting: numbers first (by value), then
    /// booleans, then text (lexicographic).
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Number(_), _) => Ordering::Less,
            (_, CellValue::Number(_)) => Ordering::Greater,
            (CellValue::Boolean(_), _) => Ordering::Less,
            (_, CellValue::Boolean(_)) => Ordering::Greater,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Format a float with no trailing `.0` for whole numbers.
pub fn format_f64_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
