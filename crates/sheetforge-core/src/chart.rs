//! Chart definitions attached to a worksheet
//!
//! Charts are held in the model so a capable serializer can render them;
//! series references are kept as written (e.g. `"B2:B10"` or `"Data!$B$2:$B$10"`).

use crate::cell::CellAddress;

/// Chart kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    /// Horizontal bars
    Bar,
    /// Vertical bars
    Column,
    /// Line chart
    Line,
    /// Pie chart
    Pie,
    /// XY scatter
    Scatter,
    /// Area chart
    Area,
    /// Doughnut chart
    Doughnut,
}

impl ChartType {
    /// Whether the chart draws category/value axes
    pub fn has_axes(&self) -> bool {
        !matches!(self, ChartType::Pie | ChartType::Doughnut)
    }
}

/// Where the legend sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    /// Right of the plot area
    #[default]
    Right,
    /// Above the plot area
    Top,
    /// Below the plot area
    Bottom,
    /// Left of the plot area
    Left,
    /// Legend suppressed
    None,
}

/// One named value series
#[derive(Debug, Clone, PartialEq)]
pub struct DataSeries {
    /// Series name shown in the legend
    pub name: String,
    /// Range reference holding the values
    pub values: String,
}

impl DataSeries {
    /// Create a series
    pub fn new<N: Into<String>, V: Into<String>>(name: N, values: V) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
        }
    }
}

/// Two-cell anchor: the chart spans from the top-left of `from` to the top-left of `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartAnchor {
    /// Top-left cell
    pub from: CellAddress,
    /// Bottom-right cell
    pub to: CellAddress,
}

/// A chart placed on a worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Chart kind
    pub chart_type: ChartType,
    /// Title above the plot area
    pub title: Option<String>,
    /// Category (label) reference shared by all series
    pub categories: String,
    /// Data series
    pub series: Vec<DataSeries>,
    /// Legend position
    pub legend: LegendPosition,
    /// Category axis title
    pub x_axis_title: Option<String>,
    /// Value axis title
    pub y_axis_title: Option<String>,
    /// Cells the chart covers
    pub anchor: ChartAnchor,
}

impl Chart {
    /// Create a chart with no series
    pub fn new<S: Into<String>>(chart_type: ChartType, categories: S, anchor: ChartAnchor) -> Self {
        Self {
            chart_type,
            title: None,
            categories: categories.into(),
            series: Vec::new(),
            legend: LegendPosition::default(),
            x_axis_title: None,
            y_axis_title: None,
            anchor,
        }
    }

    /// Set the title
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a data series
    pub fn add_series(&mut self, series: DataSeries) {
        self.series.push(series);
    }

    /// Move the anchor down when rows are inserted above it
    pub fn shift_rows(&mut self, at: u32, count: u32) {
        for addr in [&mut self.anchor.from, &mut self.anchor.to] {
            if addr.row >= at {
                addr.row += count;
            }
        }
    }
}
