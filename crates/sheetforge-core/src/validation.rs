//! Data validation rules

use crate::cell::CellRange;

/// What kind of input a validated cell accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationType {
    /// Value from a list (`formula1` holds the items or a range)
    #[default]
    List,
    /// Whole numbers
    Whole,
    /// Decimal numbers
    Decimal,
    /// Dates
    Date,
    /// Text length
    TextLength,
    /// Formula evaluating to TRUE
    Custom,
}

impl ValidationType {
    /// Value of the `type` attribute
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            ValidationType::List => "list",
            ValidationType::Whole => "whole",
            ValidationType::Decimal => "decimal",
            ValidationType::Date => "date",
            ValidationType::TextLength => "textLength",
            ValidationType::Custom => "custom",
        }
    }
}

/// Comparison applied to the entered value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationOperator {
    /// Between two values (inclusive)
    #[default]
    Between,
    /// Outside two values
    NotBetween,
    /// Equal to
    Equal,
    /// Not equal to
    NotEqual,
    /// Greater than
    GreaterThan,
    /// Less than
    LessThan,
    /// Greater than or equal to
    GreaterThanOrEqual,
    /// Less than or equal to
    LessThanOrEqual,
}

const OPERATOR_NAMES: &[(ValidationOperator, &str)] = &[
    (ValidationOperator::Between, "between"),
    (ValidationOperator::NotBetween, "notBetween"),
    (ValidationOperator::Equal, "equal"),
    (ValidationOperator::NotEqual, "notEqual"),
    (ValidationOperator::GreaterThan, "greaterThan"),
    (ValidationOperator::LessThan, "lessThan"),
    (ValidationOperator::GreaterThanOrEqual, "greaterThanOrEqual"),
    (ValidationOperator::LessThanOrEqual, "lessThanOrEqual"),
];

impl ValidationOperator {
    /// Look up an operator by its SpreadsheetML name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATOR_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(op, _)| *op)
    }

    /// Value of the `operator` attribute
    pub fn xlsx_name(&self) -> &'static str {
        OPERATOR_NAMES
            .iter()
            .find(|(op, _)| op == self)
            .map(|(_, n)| *n)
            .unwrap_or("between")
    }
}

/// A validation rule applied to one or more ranges
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValidation {
    /// Kind of value allowed
    pub validation_type: ValidationType,
    /// Ignored for list and custom rules
    pub operator: ValidationOperator,
    /// First formula or list source
    pub formula1: Option<String>,
    /// Second formula, for between operators
    pub formula2: Option<String>,
    /// Cells the validation applies to
    pub ranges: Vec<CellRange>,
    /// Accept empty cells
    pub allow_blank: bool,
    /// Show the prompt when the cell is selected
    pub show_input_message: bool,
    /// Prompt title
    pub prompt_title: Option<String>,
    /// Prompt text
    pub prompt: Option<String>,
    /// Show the error box on invalid input
    pub show_error_message: bool,
    /// Error title
    pub error_title: Option<String>,
    /// Error text
    pub error: Option<String>,
}

impl DataValidation {
    /// Create a validation with no ranges
    pub fn new(validation_type: ValidationType) -> Self {
        Self {
            validation_type,
            ..Default::default()
        }
    }

    /// Add a range
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Whether the `operator` attribute is meaningful for this rule
    pub fn uses_operator(&self) -> bool {
        !matches!(
            self.validation_type,
            ValidationType::List | ValidationType::Custom
        )
    }

    /// Move ranges down when rows are inserted above them
    pub fn shift_rows(&mut self, at: u32, count: u32) {
        for range in &mut self.ranges {
            *range = range.shift_rows(at, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_names() {
        assert_eq!(
            ValidationOperator::from_name("GreaterThanOrEqual"),
            Some(ValidationOperator::GreaterThanOrEqual)
        );
        assert_eq!(ValidationOperator::from_name("approximately"), None);
        assert_eq!(ValidationOperator::NotBetween.xlsx_name(), "notBetween");
    }

    #[test]
    fn test_list_rules_skip_operator() {
        let list = DataValidation::new(ValidationType::List);
        assert!(!list.uses_operator());
        assert!(DataValidation::new(ValidationType::Whole).uses_operator());
    }
}
