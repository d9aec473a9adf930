//! # sheetforge-core
//!
//! The in-memory document model that sheetforge assembles before handing it
//! to a serializer.
//!
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing with multi-letter columns
//! - [`CellValue`] - what a cell holds (numbers, text, booleans, opaque formulas)
//! - [`Style`] and [`StylePool`] - deduplicated cell formatting
//! - [`Worksheet`] - cells plus sheet-level layout (merges, panes, outlines, rules)
//! - [`Workbook`] - ordered sheets and [`DocumentProperties`]
//!
//! ## Example
//!
//! ```rust
//! use sheetforge_core::{CellValue, Style, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_worksheet("Sales").unwrap();
//! sheet.set_cell_value_at(0, 0, "Qty").unwrap();
//! sheet.set_cell_style_at(0, 0, &Style::new().bold(true)).unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::Number(5.0)).unwrap();
//! assert_eq!(sheet.value_at(1, 0), CellValue::Number(5.0));
//! ```

pub mod cell;
pub mod chart;
pub mod conditional_format;
pub mod error;
pub mod image;
pub mod layout;
pub mod style;
pub mod validation;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellRange, CellValue};
pub use chart::{Chart, ChartAnchor, ChartType, DataSeries, LegendPosition};
pub use conditional_format::{
    CfColorValue, CfOperator, CfRuleType, CfValue, CfValueType, ConditionalFormatRule,
    DataBarOptions, IconSetStyle,
};
pub use error::{Error, Result};
pub use image::{ImageFormat, SheetImage};
pub use layout::{
    FreezePanes, HeaderFooter, OutlineGroup, PageMargins, PageOrientation, PageSetup,
    SheetProtection,
};
pub use validation::{DataValidation, ValidationOperator, ValidationType};
pub use workbook::{DocumentProperties, Workbook};
pub use worksheet::{ColumnInfo, RowInfo, Worksheet};

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, StylePool, VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Maximum outline (grouping) depth
pub const MAX_OUTLINE_LEVEL: u8 = 7;
