//! # sheetforge
//!
//! Turns declarative workbook descriptions into XLSX files.
//!
//! A request is a JSON document naming sheets, their columns and rows, and
//! optional formatting, charts and images. It is validated against the
//! workbook grammar, assembled into a [`Workbook`], serialized and handed to
//! a [`Storage`] backend.
//!
//! ## Pipeline
//!
//! - [`validate`] - checks the raw request and produces a [`WorkbookConfig`]
//! - [`select_generator`] - picks the standard or report builder
//! - [`build_workbook`] - runs a [`SheetBuilder`] over every sheet
//! - [`DocumentSerializer`] - turns the model into bytes ([`XlsxSerializer`])
//! - [`WorkbookService`] - all of the above plus storage and the result envelope
//!
//! ## Example
//!
//! ```rust
//! use sheetforge::prelude::*;
//! use serde_json::json;
//!
//! let config = validate(&json!({
//!     "file_name": "sales.xlsx",
//!     "sheets": [{
//!         "name": "Sales",
//!         "columns": [{ "header": "Qty", "key": "qty", "type": "number" }],
//!         "data": [{ "qty": 5 }]
//!     }]
//! }))
//! .unwrap();
//!
//! let generated = generate(&config, &XlsxSerializer::new()).unwrap();
//! assert_eq!(generated.sheets_count, 1);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod format;
pub mod formula;
pub mod prelude;
pub mod schema;
pub mod select;
pub mod serializer;
pub mod service;
pub mod storage;
pub mod style_map;
pub mod validate;

pub use builder::{apply_metadata, build_workbook, ReportBuilder, SheetBuilder, StandardBuilder};
pub use config::{GeneratorConfig, StorageKind};
pub use error::{
    handle_error, ErrorReport, GenerateError, Result, ValidationErrors, ValidationIssue,
};
pub use schema::{ColumnConfig, ColumnType, SheetConfig, SheetLayout, WorkbookConfig};
pub use select::{select_generator, GeneratorKind};
pub use serializer::{Capabilities, DocumentSerializer, XlsxSerializer};
pub use service::{generate, GeneratedWorkbook, GenerationResult, WorkbookService};
pub use storage::{LocalStorage, Locator, Storage};
pub use validate::{validate, validate_partial, PartialValidation};

pub use sheetforge_core::{CellValue, Workbook, Worksheet};
pub use sheetforge_xlsx::{XlsxReader, XlsxWriter};
