//! Document assembly
//!
//! A [`SheetBuilder`] turns one [`SheetConfig`] into a worksheet and, once
//! every sheet is done, finishes workbook-level state. [`StandardBuilder`]
//! runs the full pipeline; [`ReportBuilder`] wraps any builder and
//! post-processes each sheet after the wrapped builder has finished it.

mod report;
mod standard;

pub use report::{ReportBuilder, STRIPE_COLOR};
pub use standard::{StandardBuilder, HEADER_FILL, HEADER_FONT_SIZE, HEADER_ROW_HEIGHT};

use chrono::{DateTime, Utc};
use log::debug;

use sheetforge_core::{Workbook, Worksheet};

use crate::error::{GenerateError, Result};
use crate::schema::{SheetConfig, WorkbookConfig, WorkbookMetadata};

pub trait SheetBuilder {
    /// Append the sheet described by `config` to `workbook`
    fn build_sheet(&self, workbook: &mut Workbook, config: &SheetConfig) -> Result<()>;

    /// Workbook-level work once every sheet exists
    fn finalize(&self, workbook: &mut Workbook, config: &WorkbookConfig) -> Result<()>;
}

impl<B: SheetBuilder + ?Sized> SheetBuilder for Box<B> {
    fn build_sheet(&self, workbook: &mut Workbook, config: &SheetConfig) -> Result<()> {
        (**self).build_sheet(workbook, config)
    }

    fn finalize(&self, workbook: &mut Workbook, config: &WorkbookConfig) -> Result<()> {
        (**self).finalize(workbook, config)
    }
}

/// Build every sheet in declaration order, then finalize
pub fn build_workbook(builder: &dyn SheetBuilder, config: &WorkbookConfig) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    for sheet in &config.sheets {
        debug!(
            "Building sheet '{}' ({} columns, {} rows, layout {})",
            sheet.name,
            sheet.columns.len(),
            sheet.data.len(),
            sheet.layout.as_str()
        );
        builder.build_sheet(&mut workbook, sheet)?;
    }
    builder.finalize(&mut workbook, config)?;
    Ok(workbook)
}

/// Copy request metadata onto the document properties
///
/// The creator falls back to the default author when no metadata is given.
pub fn apply_metadata(
    workbook: &mut Workbook,
    metadata: Option<&WorkbookMetadata>,
    now: DateTime<Utc>,
) {
    let fallback = WorkbookMetadata::default();
    let metadata = metadata.unwrap_or(&fallback);
    let props = workbook.properties_mut();

    props.creator = Some(metadata.author.clone());
    if let Some(title) = &metadata.title {
        props.title = Some(title.clone());
    }
    if let Some(subject) = &metadata.subject {
        props.subject = Some(subject.clone());
    }
    if let Some(description) = &metadata.description {
        props.description = Some(description.clone());
    }
    if let Some(company) = &metadata.company {
        props.company = Some(company.clone());
    }
    if let Some(category) = &metadata.category {
        props.category = Some(category.clone());
    }
    if !metadata.keywords.is_empty() {
        props.keywords = metadata.keywords.clone();
    }
    props.created = Some(now);
    props.modified = Some(now);
}

/// The sheet most recently added by `build_sheet`
pub(crate) fn last_sheet_mut(workbook: &mut Workbook) -> Result<&mut Worksheet> {
    let index = workbook
        .sheet_count()
        .checked_sub(1)
        .ok_or_else(|| GenerateError::generation("No worksheet was built"))?;
    workbook
        .worksheet_mut(index)
        .ok_or_else(|| GenerateError::generation("No worksheet was built"))
}

/// 0-based column index for the `i`-th declared column
pub(crate) fn column_at(i: usize) -> Result<u16> {
    u16::try_from(i)
        .ok()
        .filter(|c| *c < sheetforge_core::MAX_COLS)
        .ok_or_else(|| GenerateError::generation(format!("Too many columns ({})", i + 1)))
}

/// 0-based row index for the `i`-th data row, below the header
pub(crate) fn data_row_at(i: usize) -> Result<u32> {
    u32::try_from(i + 1)
        .ok()
        .filter(|r| *r < sheetforge_core::MAX_ROWS)
        .ok_or_else(|| GenerateError::generation(format!("Too many data rows ({})", i + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_apply_metadata() {
        let mut workbook = Workbook::new();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let metadata = WorkbookMetadata {
            title: Some("Q2".into()),
            company: Some("Acme".into()),
            keywords: vec!["sales".into()],
            ..Default::default()
        };
        apply_metadata(&mut workbook, Some(&metadata), now);

        let props = workbook.properties();
        assert_eq!(props.creator.as_deref(), Some("AI Assistant"));
        assert_eq!(props.title.as_deref(), Some("Q2"));
        assert_eq!(props.company.as_deref(), Some("Acme"));
        assert_eq!(props.subject, None);
        assert_eq!(props.keywords, vec!["sales".to_string()]);
        assert_eq!(props.created, Some(now));
        assert_eq!(props.modified, Some(now));
    }

    #[test]
    fn test_default_creator_without_metadata() {
        let mut workbook = Workbook::new();
        apply_metadata(&mut workbook, None, Utc::now());
        assert_eq!(workbook.properties().creator.as_deref(), Some("AI Assistant"));
    }

    #[test]
    fn test_last_sheet_requires_a_sheet() {
        let mut workbook = Workbook::new();
        assert!(last_sheet_mut(&mut workbook).is_err());
        workbook.add_worksheet("A").unwrap();
        workbook.add_worksheet("B").unwrap();
        assert_eq!(last_sheet_mut(&mut workbook).unwrap().name(), "B");
    }
}
