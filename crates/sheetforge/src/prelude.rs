//! Common imports
//!
//! ```rust
//! use sheetforge::prelude::*;
//! ```

pub use crate::{
    build_workbook, generate, handle_error, select_generator, validate, validate_partial,
    CellValue, DocumentSerializer, GenerateError, GeneratedWorkbook, GenerationResult,
    GeneratorConfig, LocalStorage, Result, SheetBuilder, Storage, Workbook, WorkbookConfig,
    WorkbookService, XlsxReader, XlsxSerializer,
};
