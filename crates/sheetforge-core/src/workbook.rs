//! Workbook type - ordered sheets plus document properties

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Document properties written to the package metadata parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentProperties {
    /// Document title
    pub title: Option<String>,
    /// Subject
    pub subject: Option<String>,
    /// Author
    pub creator: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Company name
    pub company: Option<String>,
    /// Category
    pub category: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// A spreadsheet document
///
/// Starts without sheets; every sheet is added by name.
#[derive(Debug, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    properties: DocumentProperties,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// True when there are no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Worksheet by position
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Mutable worksheet by position
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Worksheets in tab order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Append a sheet and return it for population
    pub fn add_worksheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.validate_sheet_name(name)?;
        self.worksheets.push(Worksheet::new(name));
        let last = self.worksheets.len() - 1;
        Ok(&mut self.worksheets[last])
    }

    /// Document properties
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    /// Mutable document properties
    pub fn properties_mut(&mut self) -> &mut DocumentProperties {
        &mut self.properties
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "'{}' is longer than {} characters",
                name, MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "'{}' cannot contain '{}'",
                name, c
            )));
        }

        let lower = name.to_lowercase();
        if self
            .worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == lower)
        {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }
}
