//! Generator selection

use log::warn;

use crate::builder::{ReportBuilder, SheetBuilder, StandardBuilder};
use crate::schema::{SheetLayout, WorkbookConfig};
use crate::serializer::Capabilities;

/// Which builder handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Standard,
    /// Applies to every sheet of the workbook once any sheet asks for it
    Report,
}

impl GeneratorKind {
    pub fn builder(self, capabilities: Capabilities) -> Box<dyn SheetBuilder> {
        let base = StandardBuilder::new(capabilities);
        match self {
            GeneratorKind::Standard => Box::new(base),
            GeneratorKind::Report => Box::new(ReportBuilder::new(base)),
        }
    }
}

/// Report when any sheet declares the report layout, otherwise standard
pub fn select_generator(config: &WorkbookConfig) -> GeneratorKind {
    for sheet in &config.sheets {
        if matches!(
            sheet.layout,
            SheetLayout::Form | SheetLayout::Dashboard | SheetLayout::Calendar
        ) {
            warn!(
                "Sheet '{}': layout '{}' has no dedicated generator, using table layout",
                sheet.name,
                sheet.layout.as_str()
            );
        }
    }

    if config.sheets.iter().any(|s| s.layout == SheetLayout::Report) {
        GeneratorKind::Report
    } else {
        GeneratorKind::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    fn with_layouts(layouts: &[&str]) -> WorkbookConfig {
        let sheets: Vec<_> = layouts
            .iter()
            .enumerate()
            .map(|(i, layout)| json!({ "name": format!("S{}", i), "layout": layout, "columns": [], "data": [] }))
            .collect();
        validate(&json!({ "file_name": "x.xlsx", "sheets": sheets })).unwrap()
    }

    #[test]
    fn test_select_generator() {
        assert_eq!(select_generator(&with_layouts(&["table"])), GeneratorKind::Standard);
        assert_eq!(
            select_generator(&with_layouts(&["form", "dashboard", "calendar"])),
            GeneratorKind::Standard
        );
        assert_eq!(select_generator(&with_layouts(&["table", "report"])), GeneratorKind::Report);
    }

    #[test]
    fn test_report_applies_to_every_sheet() {
        let config = validate(&json!({
            "file_name": "x.xlsx",
            "sheets": [
                { "name": "Plain", "columns": [{ "header": "A", "key": "a" }], "data": [{ "a": 1 }] },
                { "name": "Rep", "layout": "report", "columns": [], "data": [] }
            ]
        }))
        .unwrap();
        let builder = select_generator(&config).builder(Capabilities::default());
        let workbook = crate::builder::build_workbook(&builder, &config).unwrap();
        let plain = workbook.worksheet(0).unwrap();
        assert!(plain.cell_style_at(1, 0).has_fill());
    }
}
