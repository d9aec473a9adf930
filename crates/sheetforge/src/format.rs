//! Cell formatting
//!
//! Two independent paths: number-format codes attached to cells (the
//! spreadsheet application renders them), and pre-rendered strings for
//! callers that want text. A cell gets one or the other, never both.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::schema::ColumnType;
use sheetforge_core::CellValue;

pub const GENERAL_FORMAT: &str = "General";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₫";

/// Default number format for a column type
pub fn default_format(column_type: Option<ColumnType>) -> &'static str {
    match column_type {
        Some(ColumnType::Text) => "@",
        Some(ColumnType::Number) => "#,##0",
        Some(ColumnType::Currency) => "#,##0₫",
        Some(ColumnType::Percentage) => "0.00%",
        Some(ColumnType::Date) => "dd/mm/yyyy",
        Some(ColumnType::Datetime) => "dd/mm/yyyy hh:mm:ss",
        Some(ColumnType::Boolean) | Some(ColumnType::Formula) | None => GENERAL_FORMAT,
    }
}

/// [`default_format`] keyed by the wire name; unknown names get `General`
pub fn default_format_for_name(name: &str) -> &'static str {
    let column_type = serde_json::from_value::<ColumnType>(Value::String(name.to_string())).ok();
    default_format(column_type)
}

/// Render an amount with `.` thousands separators, `,` decimals and a trailing symbol
///
/// At most three fraction digits are kept; trailing zeros are dropped.
pub fn format_currency(value: f64, symbol: &str) -> String {
    format!("{}{}", group_vi(value), symbol)
}

/// `0.1234` renders as `12.34%`
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// [`format_date`] for an ISO-8601 date or date-time string
pub fn format_date_str(text: &str) -> Option<String> {
    parse_iso(text).map(|dt| format_date(dt.date()))
}

fn group_vi(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (int_part.chars().any(|c| c != '0') || !frac.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` or RFC 3339
pub fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Days since 1899-12-30 with the time of day as the fraction
pub fn to_serial(dt: NaiveDateTime) -> f64 {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return 0.0;
    };
    let delta = dt - epoch.and_time(NaiveTime::MIN);
    delta.num_milliseconds() as f64 / 86_400_000.0
}

/// Turn a raw row value into a cell value for a column of `column_type`
///
/// Missing and `null` values are blank. Date columns turn ISO strings into
/// serial numbers so the date format applies; formula columns turn strings
/// into formulas. Arrays and objects are stored as their JSON text.
pub fn to_cell_value(value: Option<&Value>, column_type: Option<ColumnType>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Empty,
        Some(Value::Bool(b)) => CellValue::Boolean(*b),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::String(n.to_string())),
        Some(Value::String(s)) => match column_type {
            Some(ColumnType::Date) | Some(ColumnType::Datetime) => parse_iso(s)
                .map(|dt| CellValue::Number(to_serial(dt)))
                .unwrap_or_else(|| CellValue::String(s.clone())),
            Some(ColumnType::Formula) if !s.trim().is_empty() => CellValue::formula(s),
            _ => CellValue::String(s.clone()),
        },
        Some(other) => CellValue::String(other.to_string()),
    }
}
