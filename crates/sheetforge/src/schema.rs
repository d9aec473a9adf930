//! Workbook request grammar
//!
//! These types mirror the JSON a caller sends. Field names follow the wire
//! format: top-level and formatting keys are snake_case, nested style and
//! option objects are camelCase. Defaults declared here (column width,
//! sheet layout, author) are applied during deserialization.
//!
//! Deserializing straight into these types stops at the first mismatch; use
//! [`validate`](crate::validate::validate) to get every problem at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_COLUMN_WIDTH: f64 = 15.0;
pub const DEFAULT_AUTHOR: &str = "AI Assistant";

fn default_column_width() -> f64 {
    DEFAULT_COLUMN_WIDTH
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

/// A complete generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookConfig {
    pub file_name: String,
    pub sheets: Vec<SheetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<WorkbookMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OutputOptions>,
}

impl WorkbookConfig {
    pub fn output_options(&self) -> OutputOptions {
        self.options.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl Default for WorkbookMetadata {
    fn default() -> Self {
        Self {
            title: None,
            subject: None,
            author: default_author(),
            description: None,
            company: None,
            category: None,
            keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageHint {
    S3,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
    /// Open password; accepted but not applied by the XLSX serializer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetLayout {
    #[default]
    Table,
    Form,
    Dashboard,
    Report,
    Calendar,
}

impl SheetLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetLayout::Table => "table",
            SheetLayout::Form => "form",
            SheetLayout::Dashboard => "dashboard",
            SheetLayout::Report => "report",
            SheetLayout::Calendar => "calendar",
        }
    }
}

/// One data row: column key to raw JSON value
pub type RowData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    pub name: String,
    #[serde(default)]
    pub layout: SheetLayout,
    pub columns: Vec<ColumnConfig>,
    pub data: Vec<RowData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<FormattingConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<ChartConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl SheetConfig {
    /// The `title` entry of the sheet metadata, if it is a non-empty string
    pub fn title(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get("title")?
            .as_str()
            .filter(|t| !t.is_empty())
    }

    pub fn column_position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }
}

/// Semantic type of a column's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Currency,
    Percentage,
    Date,
    Datetime,
    Boolean,
    Formula,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub header: String,
    pub key: String,
    #[serde(default = "default_column_width")]
    pub width: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Explicit number format, wins over the type default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationConfig>,
}

impl ColumnConfig {
    pub fn new<H: Into<String>, K: Into<String>>(header: H, key: K) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
            width: DEFAULT_COLUMN_WIDTH,
            column_type: None,
            format: None,
            style: None,
            validation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgbColor {
    pub argb: String,
}

impl ArgbColor {
    pub fn new<S: Into<String>>(argb: S) -> Self {
        Self { argb: argb.into() }
    }
}

/// Partial cell style; absent parts leave the target untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ArgbColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
}

/// Pattern fill; `fill_type` is always `"pattern"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillConfig {
    #[serde(rename = "type")]
    pub fill_type: String,
    pub pattern: String,
    pub fg_color: ArgbColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<ArgbColor>,
}

impl FillConfig {
    pub fn solid<S: Into<String>>(argb: S) -> Self {
        Self {
            fill_type: "pattern".to_string(),
            pattern: "solid".to_string(),
            fg_color: ArgbColor::new(argb),
            bg_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderEdgeConfig {
    pub style: String,
    pub color: ArgbColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BorderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderEdgeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderEdgeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderEdgeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderEdgeConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    List,
    Whole,
    Decimal,
    Date,
    TextLength,
    Custom,
}

/// Data validation attached to a column's data cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_blank: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_input_message: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_error_message: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormattingConfig {
    /// First unfrozen cell, e.g. `"A2"` freezes the header row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeze_panes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_setup: Option<PageSetupConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_footer: Option<HeaderFooterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection: Option<ProtectionConfig>,
    /// Column key to formula text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals_row: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_formatting: Vec<ConditionalFormatConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_cells: Vec<String>,
    /// 1-based row number (as a string key) to height in points
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub row_heights: BTreeMap<String, f64>,
    /// 1-based row numbers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_rows: Vec<u32>,
    /// Column letters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouped_rows: Vec<RowGroupConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouped_columns: Vec<ColumnGroupConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_to_page: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_to_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_to_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margins: Option<MarginsConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odd_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odd_footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub even_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub even_footer: Option<String>,
}

/// Sheet lock; the granular flags name actions users may still perform
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_cells: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_columns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_rows: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_columns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_rows: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_columns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_rows: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowGroupConfig {
    pub start: u32,
    pub end: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGroupConfig {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    CellIs,
    Expression,
    ColorScale,
    DataBar,
    IconSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOperator {
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Between,
    NotBetween,
    Equal,
    NotEqual,
    ContainsText,
}

/// A formula operand: text is used verbatim, numbers are printed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormulaTerm {
    Text(String),
    Number(f64),
}

impl FormulaTerm {
    pub fn to_formula(&self) -> String {
        match self {
            FormulaTerm::Text(text) => text.clone(),
            FormulaTerm::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalFormatConfig {
    /// One or more space-separated ranges
    pub range: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<RuleOperator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formulae: Vec<FormulaTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<RuleStyleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<ColorScaleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_bar: Option<DataBarConfig>,
}

/// Differential style applied when a rule matches
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleStyleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<RuleFillConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderConfig>,
}

/// Rule fills usually carry only `bgColor`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFillConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub fill_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_color: Option<ArgbColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<ArgbColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    Min,
    Max,
    Num,
    Percent,
    Percentile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(rename = "type")]
    pub kind: ThresholdKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScaleConfig {
    pub cfvo: Vec<ThresholdConfig>,
    pub color: Vec<ArgbColor>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBarConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_bar_color_same_as_positive: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Column,
    Line,
    Pie,
    Scatter,
    Area,
    Doughnut,
}

/// Two-cell anchor shared by charts and images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorConfig {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDataConfig {
    pub categories: String,
    pub values: Vec<SeriesConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPlacement {
    Top,
    Bottom,
    Left,
    Right,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<LegendPlacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<AxisConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<AxisConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartOptionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<AxesConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub position: AnchorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub data: ChartDataConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ChartOptionsConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl ImageExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Png => "png",
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Gif => "gif",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub position: AnchorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Raw base64 or a `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<ImageExtension>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied() {
        let config: WorkbookConfig = serde_json::from_value(json!({
            "file_name": "t.xlsx",
            "sheets": [{
                "name": "S",
                "columns": [{ "header": "Qty", "key": "qty", "type": "number" }],
                "data": [{ "qty": 5 }]
            }],
            "metadata": { "title": "Sales" }
        }))
        .unwrap();

        let sheet = &config.sheets[0];
        assert_eq!(sheet.layout, SheetLayout::Table);
        assert_eq!(sheet.columns[0].width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(sheet.columns[0].column_type, Some(ColumnType::Number));
        assert_eq!(config.metadata.unwrap().author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_camel_case_nested_keys() {
        let column: ColumnConfig = serde_json::from_value(json!({
            "header": "Status",
            "key": "status",
            "style": {
                "alignment": { "horizontal": "center", "vertical": "middle", "wrapText": true },
                "fill": { "type": "pattern", "pattern": "solid", "fgColor": { "argb": "FFFFFF00" } }
            },
            "validation": { "type": "textLength", "operator": "lessThan", "formula1": "10", "allowBlank": true }
        }))
        .unwrap();

        let style = column.style.unwrap();
        assert_eq!(style.alignment.unwrap().wrap_text, Some(true));
        assert_eq!(style.fill.unwrap().fg_color.argb, "FFFFFF00");
        let validation = column.validation.unwrap();
        assert_eq!(validation.kind, ValidationKind::TextLength);
        assert_eq!(validation.allow_blank, Some(true));
    }

    #[test]
    fn test_formula_terms() {
        let rule: ConditionalFormatConfig = serde_json::from_value(json!({
            "range": "B2:B10",
            "type": "cellIs",
            "operator": "between",
            "formulae": [10, "$C$1"]
        }))
        .unwrap();
        let terms: Vec<String> = rule.formulae.iter().map(FormulaTerm::to_formula).collect();
        assert_eq!(terms, vec!["10", "$C$1"]);
    }

    #[test]
    fn test_sheet_title() {
        let mut sheet: SheetConfig = serde_json::from_value(json!({
            "name": "R", "layout": "report", "columns": [], "data": [],
            "metadata": { "title": "Monthly" }
        }))
        .unwrap();
        assert_eq!(sheet.title(), Some("Monthly"));

        sheet.metadata = Some(serde_json::Map::new());
        assert_eq!(sheet.title(), None);
    }
}
