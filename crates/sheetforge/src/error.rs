//! Error taxonomy for workbook generation
//!
//! Every failure surfaced to a caller is one of three kinds: the request did
//! not match the grammar, the document could not be assembled or serialized,
//! or something outside the domain went wrong. [`handle_error`] flattens any
//! of them into the `{ message, code }` pair returned over the wire.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const GENERATION_ERROR: &str = "GENERATION_ERROR";
pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerateError>;

/// One offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted field path, e.g. `sheets.0.columns.2.width`
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every issue found in one request, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self {
            issues: vec![ValidationIssue::new(path, message)],
        }
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// `path: message` strings
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema validation failed: {}", self.messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors raised while turning a request into a workbook file
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The request does not match the workbook grammar
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The document could not be assembled, serialized or stored
    #[error("{message}")]
    Generation { code: &'static str, message: String },

    /// Environment or flag values that cannot be interpreted
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{message}")]
    Unknown { message: String },
}

impl GenerateError {
    pub fn generation<S: Into<String>>(message: S) -> Self {
        GenerateError::Generation {
            code: GENERATION_ERROR,
            message: message.into(),
        }
    }

    pub fn storage_unavailable<S: Into<String>>(message: S) -> Self {
        GenerateError::Generation {
            code: STORAGE_UNAVAILABLE,
            message: message.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::Validation(_) => VALIDATION_ERROR,
            GenerateError::Generation { code, .. } => *code,
            GenerateError::Config(_) => CONFIG_ERROR,
            GenerateError::Unknown { .. } => UNKNOWN_ERROR,
        }
    }
}

impl From<sheetforge_core::Error> for GenerateError {
    fn from(err: sheetforge_core::Error) -> Self {
        GenerateError::generation(err.to_string())
    }
}

impl From<sheetforge_xlsx::XlsxError> for GenerateError {
    fn from(err: sheetforge_xlsx::XlsxError) -> Self {
        GenerateError::generation(format!("Failed to serialize workbook: {}", err))
    }
}

impl From<std::io::Error> for GenerateError {
    fn from(err: std::io::Error) -> Self {
        GenerateError::Unknown {
            message: err.to_string(),
        }
    }
}

/// Flattened error returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub message: String,
    pub code: String,
}

/// Reduce any error to a message and a code
///
/// Domain errors keep their own code; anything else is `UNKNOWN_ERROR`.
pub fn handle_error(err: &(dyn std::error::Error + 'static)) -> ErrorReport {
    if let Some(generate) = err.downcast_ref::<GenerateError>() {
        return ErrorReport {
            message: generate.to_string(),
            code: generate.code().to_string(),
        };
    }
    if let Some(validation) = err.downcast_ref::<ValidationErrors>() {
        return ErrorReport {
            message: validation.to_string(),
            code: VALIDATION_ERROR.to_string(),
        };
    }
    let message = err.to_string();
    ErrorReport {
        message: if message.is_empty() {
            "An unknown error occurred".to_string()
        } else {
            message
        },
        code: UNKNOWN_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationIssue::new("file_name", "required"));
        errors.push(ValidationIssue::new("sheets.0.name", "expected string, got number"));

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "Schema validation failed: file_name: required, sheets.0.name: expected string, got number"
        );
    }

    #[test]
    fn test_codes() {
        let validation: GenerateError = ValidationErrors::single("", "bad").into();
        assert_eq!(validation.code(), VALIDATION_ERROR);
        assert_eq!(GenerateError::generation("x").code(), GENERATION_ERROR);
        assert_eq!(GenerateError::storage_unavailable("x").code(), STORAGE_UNAVAILABLE);

        let core: GenerateError = sheetforge_core::Error::InvalidAddress("ZZ".into()).into();
        assert_eq!(core.code(), GENERATION_ERROR);
    }

    #[test]
    fn test_handle_error() {
        let err = GenerateError::generation("chart type not supported");
        let report = handle_error(&err);
        assert_eq!(report.code, GENERATION_ERROR);
        assert_eq!(report.message, "chart type not supported");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let report = handle_error(&io);
        assert_eq!(report.code, UNKNOWN_ERROR);
        assert_eq!(report.message, "disk full");
    }
}
