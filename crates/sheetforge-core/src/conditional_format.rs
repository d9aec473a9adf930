//! Conditional formatting rules
//!
//! ```rust
//! use sheetforge_core::{CellRange, CfOperator, ConditionalFormatRule};
//! use sheetforge_core::style::{Color, Style};
//!
//! let rule = ConditionalFormatRule::cell_is(CfOperator::GreaterThan, "100", None)
//!     .with_range(CellRange::parse("B2:B10").unwrap())
//!     .with_format(Style::new().fill_color(Color::rgb(255, 199, 206)));
//! assert_eq!(rule.rule_type.xlsx_type(), "cellIs");
//! ```

use crate::cell::CellRange;
use crate::style::{Color, Style};

/// A conditional formatting rule attached to one or more ranges
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormatRule {
    /// What the rule tests
    pub rule_type: CfRuleType,
    /// Cells the rule applies to
    pub ranges: Vec<CellRange>,
    /// Lower numbers are evaluated first
    pub priority: u32,
    /// Stop evaluating lower-priority rules when this one matches
    pub stop_if_true: bool,
    /// Differential format applied when the rule matches
    pub format: Option<Style>,
}

impl ConditionalFormatRule {
    /// Create a rule with priority 1 and no ranges
    pub fn new(rule_type: CfRuleType) -> Self {
        Self {
            rule_type,
            ranges: Vec::new(),
            priority: 1,
            stop_if_true: false,
            format: None,
        }
    }

    /// Compare cell values against one or two formulas
    pub fn cell_is(
        operator: CfOperator,
        formula1: impl Into<String>,
        formula2: Option<String>,
    ) -> Self {
        Self::new(CfRuleType::CellIs {
            operator,
            formula1: formula1.into(),
            formula2,
        })
    }

    /// Add a range
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Set the differential format
    pub fn with_format(mut self, style: Style) -> Self {
        self.format = Some(style);
        self
    }

    /// Set the priority (1 is evaluated first)
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Shift the target ranges for rows inserted at `at`
    pub fn shift_rows(&mut self, at: u32, count: u32) {
        for range in &mut self.ranges {
            *range = range.shift_rows(at, count);
        }
    }
}

/// Rule kinds
#[derive(Debug, Clone, PartialEq)]
pub enum CfRuleType {
    /// Compare the cell value against one or two formulas
    CellIs {
        operator: CfOperator,
        formula1: String,
        formula2: Option<String>,
    },
    /// Formula evaluating to TRUE
    Expression { formula: String },
    /// Cell text contains a substring
    ContainsText { text: String },
    /// Two- or three-stop gradient
    ColorScale { colors: Vec<CfColorValue> },
    /// In-cell bar
    DataBar(DataBarOptions),
    /// Icon per value bucket
    IconSet {
        style: IconSetStyle,
        values: Vec<CfValue>,
        reverse: bool,
        show_value: bool,
    },
}

impl CfRuleType {
    /// Value of the `type` attribute
    pub fn xlsx_type(&self) -> &'static str {
        match self {
            CfRuleType::CellIs { .. } => "cellIs",
            CfRuleType::Expression { .. } => "expression",
            CfRuleType::ContainsText { .. } => "containsText",
            CfRuleType::ColorScale { .. } => "colorScale",
            CfRuleType::DataBar(_) => "dataBar",
            CfRuleType::IconSet { .. } => "iconSet",
        }
    }

    /// Whether the rule carries a differential format
    pub fn uses_format(&self) -> bool {
        matches!(
            self,
            CfRuleType::CellIs { .. } | CfRuleType::Expression { .. } | CfRuleType::ContainsText { .. }
        )
    }
}

/// Comparison operators for `cellIs` rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfOperator {
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

impl CfOperator {
    /// Value of the `operator` attribute
    pub fn xlsx_operator(&self) -> &'static str {
        match self {
            CfOperator::Between => "between",
            CfOperator::NotBetween => "notBetween",
            CfOperator::Equal => "equal",
            CfOperator::NotEqual => "notEqual",
            CfOperator::GreaterThan => "greaterThan",
            CfOperator::LessThan => "lessThan",
            CfOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            CfOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }
}

/// Threshold used by color scales, data bars and icon sets
#[derive(Debug, Clone, PartialEq)]
pub struct CfValue {
    /// How `value` is interpreted
    pub value_type: CfValueType,
    /// Threshold, when the type needs one
    pub value: Option<String>,
}

impl CfValue {
    /// Create a threshold
    pub fn new(value_type: CfValueType, value: Option<String>) -> Self {
        Self { value_type, value }
    }

    /// Lowest value in the range
    pub fn min() -> Self {
        Self::new(CfValueType::Min, None)
    }

    /// Highest value in the range
    pub fn max() -> Self {
        Self::new(CfValueType::Max, None)
    }

    /// Percentage of the range
    pub fn percent(p: impl Into<String>) -> Self {
        Self::new(CfValueType::Percent, Some(p.into()))
    }
}

/// A color scale stop
#[derive(Debug, Clone, PartialEq)]
pub struct CfColorValue {
    /// How `value` is interpreted
    pub value_type: CfValueType,
    /// Threshold, when the type needs one
    pub value: Option<String>,
    /// Color at this stop
    pub color: Color,
}

impl CfColorValue {
    /// Create a color scale stop
    pub fn new(value_type: CfValueType, value: Option<String>, color: Color) -> Self {
        Self {
            value_type,
            value,
            color,
        }
    }
}

/// Threshold kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfValueType {
    /// Lowest value
    #[default]
    Min,
    /// Highest value
    Max,
    /// Literal number
    Num,
    /// Percentage
    Percent,
    /// Percentile
    Percentile,
}

impl CfValueType {
    /// Value of the `type` attribute on `cfvo`
    pub fn xlsx_type(&self) -> &'static str {
        match self {
            CfValueType::Min => "min",
            CfValueType::Max => "max",
            CfValueType::Num => "num",
            CfValueType::Percent => "percent",
            CfValueType::Percentile => "percentile",
        }
    }
}

/// Data bar settings
#[derive(Debug, Clone, PartialEq)]
pub struct DataBarOptions {
    /// Shortest bar threshold
    pub min: CfValue,
    /// Longest bar threshold
    pub max: CfValue,
    /// Bar fill color
    pub color: Color,
    /// Show the cell value next to the bar
    pub show_value: bool,
    /// Gradient fill
    pub gradient: bool,
    /// Draw a border around the bar
    pub border: bool,
    /// Shortest bar as a percentage of the cell width
    pub min_length: Option<u32>,
    /// Longest bar as a percentage of the cell width
    pub max_length: Option<u32>,
    pub negative_bar_color_same_as_positive: bool,
}

impl Default for DataBarOptions {
    fn default() -> Self {
        Self {
            min: CfValue::min(),
            max: CfValue::max(),
            color: Color::rgb(0x63, 0x8E, 0xC6),
            show_value: true,
            gradient: true,
            border: false,
            min_length: None,
            max_length: None,
            negative_bar_color_same_as_positive: false,
        }
    }
}

/// Built-in icon sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconSetStyle {
    Arrows3,
    Flags3,
    #[default]
    TrafficLights3,
    Symbols3,
    Arrows4,
    Arrows5,
}

impl IconSetStyle {
    /// Value of the `iconSet` attribute
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            IconSetStyle::Arrows3 => "3Arrows",
            IconSetStyle::Flags3 => "3Flags",
            IconSetStyle::TrafficLights3 => "3TrafficLights1",
            IconSetStyle::Symbols3 => "3Symbols",
            IconSetStyle::Arrows4 => "4Arrows",
            IconSetStyle::Arrows5 => "5Arrows",
        }
    }

    /// Number of icons in the set
    pub fn icon_count(&self) -> usize {
        match self {
            IconSetStyle::Arrows4 => 4,
            IconSetStyle::Arrows5 => 5,
            _ => 3,
        }
    }

    /// Evenly spaced percent thresholds, starting at 0
    pub fn default_thresholds(&self) -> Vec<CfValue> {
        let n = self.icon_count();
        (0..n)
            .map(|i| CfValue::percent((i * 100 / n).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_rows_moves_ranges() {
        let mut rule = ConditionalFormatRule::new(CfRuleType::Expression {
            formula: "$B2>10".into(),
        })
        .with_range(CellRange::parse("A2:C9").unwrap());
        rule.shift_rows(0, 3);
        assert_eq!(rule.ranges[0].to_string(), "A5:C12");
    }

    #[test]
    fn test_icon_thresholds() {
        let values = IconSetStyle::TrafficLights3.default_thresholds();
        let raw: Vec<_> = values.iter().filter_map(|v| v.value.as_deref()).collect();
        assert_eq!(raw, vec!["0", "33", "66"]);
    }
}
