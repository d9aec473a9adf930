//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The package is structurally wrong
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// An attribute or text value could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Core error: {0}")]
    Core(#[from] sheetforge_core::Error),
}

impl From<quick_xml::events::attributes::AttrError> for XlsxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XlsxError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}
