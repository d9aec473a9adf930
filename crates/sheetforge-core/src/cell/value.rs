//! Cell value types

use std::fmt;

/// The value held by a cell
///
/// Formulas are opaque text: they are stored without the leading `=` and are
/// never parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank cell
    #[default]
    Empty,
    /// Boolean value
    Boolean(bool),
    /// Numeric value (dates are stored as serial numbers)
    Number(f64),
    /// Text value
    String(String),
    /// Formula text, without the leading `=`
    Formula(String),
}

impl CellValue {
    /// Create a formula value, stripping one leading `=` if present
    pub fn formula<S: AsRef<str>>(text: S) -> Self {
        let text = text.as_ref().trim();
        CellValue::Formula(text.strip_prefix('=').unwrap_or(text).to_string())
    }

    /// True for `Empty`
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True for formula cells
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula(_))
    }

    /// Numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Formula text without the leading `=`
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula(f) => Some(f),
            _ => None,
        }
    }

    /// Short type label used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Boolean(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
            CellValue::Formula(_) => "formula",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Formula(text) => write!(f, "={}", text),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_strips_equals() {
        assert_eq!(
            CellValue::formula("=SUM(A2:A2)"),
            CellValue::Formula("SUM(A2:A2)".into())
        );
        assert_eq!(
            CellValue::formula("SUM(A2:A2)").formula_text(),
            Some("SUM(A2:A2)")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Boolean(true).to_string(), "TRUE");
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::formula("A1+1").to_string(), "=A1+1");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
