//! # sheetforge-xlsx
//!
//! Serializes a [`sheetforge_core::Workbook`] into an XLSX package, and reads
//! enough of one back to check what was written.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
