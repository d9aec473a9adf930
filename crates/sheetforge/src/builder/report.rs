//! Report decoration
//!
//! Runs after the wrapped builder: zebra-stripes the data rows, then, when
//! the sheet carries a `title` in its metadata, pushes the table down three
//! rows and writes a centered title plus a generation date above it.

use chrono::{Local, NaiveDate};
use log::debug;

use sheetforge_core::{CellRange, Color, FillStyle, HorizontalAlignment, Style, Workbook, Worksheet};

use super::{column_at, data_row_at, last_sheet_mut, SheetBuilder};
use crate::error::Result;
use crate::format::format_date;
use crate::schema::{SheetConfig, WorkbookConfig};

pub const STRIPE_COLOR: Color = Color::argb(0xFF, 0xF5, 0xF5, 0xF5);

/// Rows inserted above the table for the title block
const TITLE_ROWS: u32 = 3;
const TITLE_FONT_SIZE: f64 = 16.0;

/// Wraps another builder and decorates every sheet it produces
#[derive(Debug, Clone)]
pub struct ReportBuilder<B> {
    inner: B,
    generated_on: NaiveDate,
}

impl<B: SheetBuilder> ReportBuilder<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            generated_on: Local::now().date_naive(),
        }
    }

    /// Date printed in the "Generated:" line
    pub fn generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = date;
        self
    }
}

impl<B: SheetBuilder> SheetBuilder for ReportBuilder<B> {
    fn build_sheet(&self, workbook: &mut Workbook, config: &SheetConfig) -> Result<()> {
        self.inner.build_sheet(workbook, config)?;

        let sheet = last_sheet_mut(workbook)?;
        stripe_rows(sheet, config)?;
        if let Some(title) = config.title() {
            self.write_title(sheet, config, title)?;
        }
        Ok(())
    }

    fn finalize(&self, workbook: &mut Workbook, config: &WorkbookConfig) -> Result<()> {
        self.inner.finalize(workbook, config)
    }
}

/// Shade every other data row, leaving cells that already have a fill
fn stripe_rows(sheet: &mut Worksheet, config: &SheetConfig) -> Result<()> {
    for offset in (0..config.data.len()).step_by(2) {
        let row = data_row_at(offset)?;
        for i in 0..config.columns.len() {
            let col = column_at(i)?;
            if sheet.cell_style_at(row, col).has_fill() {
                continue;
            }
            sheet.update_cell_style_at(row, col, |style| {
                style.fill = FillStyle::solid(STRIPE_COLOR)
            })?;
        }
    }
    Ok(())
}

impl<B> ReportBuilder<B> {
    fn write_title(&self, sheet: &mut Worksheet, config: &SheetConfig, title: &str) -> Result<()> {
        debug!("Sheet '{}': adding report title block", config.name);
        sheet.insert_rows(0, TITLE_ROWS)?;

        sheet.set_cell_value_at(0, 0, title)?;
        sheet.set_cell_style_at(
            0,
            0,
            &Style::new()
                .bold(true)
                .font_size(TITLE_FONT_SIZE)
                .horizontal_alignment(HorizontalAlignment::Center),
        )?;

        let stamp = format!("Generated: {}", format_date(self.generated_on));
        sheet.set_cell_value_at(1, 0, stamp)?;

        if config.columns.len() >= 2 {
            let last = column_at(config.columns.len() - 1)?;
            sheet.merge_cells(&CellRange::from_indices(0, 0, 0, last))?;
            sheet.merge_cells(&CellRange::from_indices(1, 0, 1, last))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_workbook, StandardBuilder, HEADER_FILL};
    use crate::validate::validate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sheetforge_core::CellValue;

    fn report() -> ReportBuilder<StandardBuilder> {
        ReportBuilder::new(StandardBuilder::default())
            .generated_on(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap())
    }

    fn config(metadata: serde_json::Value) -> WorkbookConfig {
        validate(&json!({
            "file_name": "r.xlsx",
            "sheets": [{
                "name": "Report",
                "layout": "report",
                "columns": [
                    { "header": "Region", "key": "region" },
                    { "header": "Sales", "key": "sales", "type": "number",
                      "style": { "fill": { "type": "pattern", "pattern": "solid", "fgColor": { "argb": "FFFFFF00" } } } }
                ],
                "data": [
                    { "region": "North", "sales": 10 },
                    { "region": "South", "sales": 20 },
                    { "region": "East", "sales": 30 }
                ],
                "formatting": { "freeze_panes": "A2" },
                "metadata": metadata
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_title_block_shifts_table() {
        let workbook = build_workbook(&report(), &config(json!({ "title": "Quarterly" }))).unwrap();
        let sheet = workbook.worksheet(0).unwrap();

        assert_eq!(sheet.value_at(0, 0), CellValue::String("Quarterly".into()));
        assert_eq!(sheet.cell_style_at(0, 0).font.size, 16.0);
        assert!(sheet.cell_style_at(0, 0).font.bold);
        assert_eq!(sheet.value_at(1, 0), CellValue::String("Generated: 07/03/2024".into()));
        assert_eq!(sheet.value_at(3, 0), CellValue::String("Region".into()));
        assert_eq!(sheet.cell_style_at(3, 0).fill, FillStyle::solid(HEADER_FILL));
        assert_eq!(sheet.value_at(4, 1), CellValue::Number(10.0));

        let merges: Vec<String> = sheet.merged_regions().iter().map(|r| r.to_a1_string()).collect();
        assert_eq!(merges, vec!["A1:B1".to_string(), "A2:B2".to_string()]);
        assert_eq!(sheet.freeze_panes().unwrap().row, 4);
    }

    #[test]
    fn test_no_title_keeps_layout() {
        let workbook = build_workbook(&report(), &config(json!({ "title": "" }))).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.value_at(0, 0), CellValue::String("Region".into()));
        assert!(sheet.merged_regions().is_empty());
    }

    #[test]
    fn test_zebra_stripes_skip_filled_cells() {
        let workbook = build_workbook(&report(), &config(json!({}))).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        let stripe = FillStyle::solid(STRIPE_COLOR);
        let yellow = FillStyle::solid(Color::rgb(0xFF, 0xFF, 0x00));

        assert_eq!(sheet.cell_style_at(1, 0).fill, stripe);
        assert_eq!(sheet.cell_style_at(2, 0).fill, FillStyle::None);
        assert_eq!(sheet.cell_style_at(3, 0).fill, stripe);
        assert_eq!(sheet.cell_style_at(1, 1).fill, yellow);
        assert_eq!(sheet.cell_style_at(1, 1).number_format.format_code(), "#,##0");
        assert_eq!(sheet.cell_style_at(0, 0).fill, FillStyle::solid(HEADER_FILL));
    }
}
