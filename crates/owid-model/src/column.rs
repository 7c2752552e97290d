//! Column kinds and per-kind formatting.
//!
//! The source of truth for how each semantic column type renders in the
//! UI (`format_value`), in compact contexts (`format_value_short`) and in
//! CSV exports (`format_for_csv`). Formatting is dispatched by matching on
//! `ColumnKind`, so the kind/decimals/shortening table is exhaustively
//! checked at compile time.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::spec::ColumnSpec;
use crate::value::CellValue;

/// The date that day offset `0` refers to. Daily variables using a custom
/// `zeroDay` are shifted onto this epoch at load time.
pub const EPOCH_DATE: &str = "2020-01-21";

/// The reference epoch as a date. `EPOCH_DATE` is a valid literal, so this
/// cannot fail.
pub fn epoch() -> NaiveDate {
    NaiveDate::parse_from_str(EPOCH_DATE, "%Y-%m-%d").unwrap_or_default()
}

/// Semantic column type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    /// Free text. The default for inferred columns.
    #[default]
    String,
    Categorical,
    Boolean,
    /// Calendar year; negative values are BCE.
    Year,
    /// Integer day offset from `EPOCH_DATE`.
    Day,
    /// Generic numeric with no further semantics.
    Numeric,
    Integer,
    Currency,
    Percentage,
    /// Value expressed 0-1, shown multiplied by 100.
    DecimalPercentage,
    Population,
    PopulationDensity,
    Age,
    Ratio,
}

impl ColumnKind {
    /// Whether this kind is a time axis.
    pub fn is_temporal(self) -> bool {
        matches!(self, ColumnKind::Year | ColumnKind::Day)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnKind::Numeric
                | ColumnKind::Integer
                | ColumnKind::Currency
                | ColumnKind::Percentage
                | ColumnKind::DecimalPercentage
                | ColumnKind::Population
                | ColumnKind::PopulationDensity
                | ColumnKind::Age
                | ColumnKind::Ratio
        )
    }

    /// Default decimal places for numeric kinds.
    fn decimal_places(self) -> usize {
        match self {
            ColumnKind::Age | ColumnKind::Ratio => 1,
            ColumnKind::Numeric => 2,
            _ => 0,
        }
    }

    /// Whether large values shorten with a number prefix (1.2k, 3.4M).
    fn shortens_with_prefix(self) -> bool {
        matches!(
            self,
            ColumnKind::Numeric | ColumnKind::Integer | ColumnKind::Population | ColumnKind::Ratio
        )
    }
}

/// Format a value for UI display: unit-aware rounding and prefixing.
///
/// Absent values render as the empty string in every kind; the check comes
/// before any numeric coercion so `NaN` never reaches the output.
pub fn format_value(kind: ColumnKind, value: Option<&CellValue>, spec: &ColumnSpec) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match kind {
        ColumnKind::String | ColumnKind::Categorical | ColumnKind::Boolean => {
            value.to_display_string()
        }
        ColumnKind::Year => format_year(value, true),
        ColumnKind::Day => format_day(value, DayStyle::Full),
        _ => {
            let Some(num) = numeric_or_warn(kind, value) else {
                return value.to_display_string();
            };
            format_numeric(kind, num, spec)
        }
    }
}

/// Compact form: `display.numDecimalPlaces` honoured, no unit text, no
/// prefix shortening.
pub fn format_value_short(kind: ColumnKind, value: Option<&CellValue>, spec: &ColumnSpec) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match kind {
        ColumnKind::String | ColumnKind::Categorical | ColumnKind::Boolean => {
            value.to_display_string()
        }
        ColumnKind::Year => format_year(value, true),
        ColumnKind::Day => format_day(value, DayStyle::Short),
        _ => {
            let Some(num) = numeric_or_warn(kind, value) else {
                return value.to_display_string();
            };
            let num = apply_conversion(kind, num, spec);
            let places = spec
                .display
                .as_ref()
                .and_then(|d| d.num_decimal_places)
                .map_or(kind.decimal_places(), |p| p.max(0) as usize);
            format!("{num:.places$}")
        }
    }
}

/// Export-safe form. Years drop the BCE suffix, days render as strict
/// `YYYY-MM-DD`, numerics stay raw so a re-import sees the same values.
pub fn format_for_csv(kind: ColumnKind, value: Option<&CellValue>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match kind {
        ColumnKind::Year => match value.as_f64() {
            Some(n) => format!("{}", n as i64),
            None => value.to_display_string(),
        },
        ColumnKind::Day => format_day(value, DayStyle::Csv),
        _ => value.to_display_string(),
    }
}

fn numeric_or_warn(kind: ColumnKind, value: &CellValue) -> Option<f64> {
    let num = value.as_f64();
    if num.is_none() {
        // Pre-existing data-quality gap: non-numeric values do reach
        // numeric formatter paths; the value passes through unformatted.
        tracing::warn!(?kind, ?value, "non-numeric value on numeric formatter path");
    }
    num
}

fn apply_conversion(kind: ColumnKind, num: f64, spec: &ColumnSpec) -> f64 {
    let factor = spec
        .display
        .as_ref()
        .and_then(|d| d.conversion_factor)
        .unwrap_or(1.0);
    let num = num * factor;
    if kind == ColumnKind::DecimalPercentage {
        num * 100.0
    } else {
        num
    }
}

fn format_numeric(kind: ColumnKind, num: f64, spec: &ColumnSpec) -> String {
    let num = apply_conversion(kind, num, spec);
    let places = kind.decimal_places();
    let body = if kind.shortens_with_prefix() && num.abs() >= 1000.0 {
        shorten_with_prefix(num)
    } else {
        format!("{num:.places$}")
    };
    match kind {
        ColumnKind::Currency => format!("${body}"),
        ColumnKind::Percentage | ColumnKind::DecimalPercentage => format!("{body}%"),
        ColumnKind::Numeric => match spec.effective_short_unit() {
            Some(unit) => format!("{body}{unit}"),
            None => body,
        },
        _ => body,
    }
}

/// Shorten a large number with an SI-style prefix: 1234 becomes `1.2k`,
/// 4.5e9 becomes `4.5B`.
fn shorten_with_prefix(num: f64) -> String {
    let (scale, suffix) = if num.abs() >= 1e12 {
        (1e12, "T")
    } else if num.abs() >= 1e9 {
        (1e9, "B")
    } else if num.abs() >= 1e6 {
        (1e6, "M")
    } else {
        (1e3, "k")
    };
    let scaled = num / scale;
    if scaled.abs() < 10.0 {
        let text = format!("{scaled:.1}");
        let text = text.strip_suffix(".0").unwrap_or(&text).to_string();
        format!("{text}{suffix}")
    } else {
        format!("{scaled:.0}{suffix}")
    }
}

fn format_year(value: &CellValue, bce_suffix: bool) -> String {
    let Some(num) = value.as_f64() else {
        return value.to_display_string();
    };
    let year = num as i64;
    if bce_suffix && year < 0 {
        format!("{} BCE", -year)
    } else {
        format!("{year}")
    }
}

#[derive(Clone, Copy)]
enum DayStyle {
    /// `Jan 21, 2020`
    Full,
    /// `Jan 21, '20`
    Short,
    /// `2020-01-21`
    Csv,
}

fn format_day(value: &CellValue, style: DayStyle) -> String {
    let Some(num) = value.as_f64() else {
        return value.to_display_string();
    };
    let date = epoch() + Duration::days(num as i64);
    match style {
        DayStyle::Full => date.format("%b %-d, %Y").to_string(),
        DayStyle::Short => date.format("%b %-d, '%y").to_string(),
        DayStyle::Csv => date.format("%Y-%m-%d").to_string(),
    }
}
