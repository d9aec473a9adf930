//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::chart::Chart;
use crate::conditional_format::ConditionalFormatRule;
use crate::error::{Error, Result};
use crate::image::SheetImage;
use crate::layout::{FreezePanes, HeaderFooter, OutlineGroup, PageSetup, SheetProtection};
use crate::style::{Style, StylePool};
use crate::validation::DataValidation;
use crate::{MAX_COLS, MAX_OUTLINE_LEVEL, MAX_ROWS};

/// Per-column display settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    /// Width in characters; `None` keeps the default width
    pub width: Option<f64>,
    /// Hidden from view
    pub hidden: bool,
    /// Outline (grouping) level, 0 for none
    pub outline_level: u8,
    /// Marks the summary column of a collapsed group
    pub collapsed: bool,
}

impl ColumnInfo {
    /// True when nothing differs from the default
    pub fn is_default(&self) -> bool {
        *self == ColumnInfo::default()
    }
}

/// Per-row display settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowInfo {
    /// Height in points; `None` keeps the default height
    pub height: Option<f64>,
    /// Hidden from view
    pub hidden: bool,
    /// Outline (grouping) level, 0 for none
    pub outline_level: u8,
    /// Marks the summary row of a collapsed group
    pub collapsed: bool,
}

impl RowInfo {
    /// True when nothing differs from the default
    pub fn is_default(&self) -> bool {
        *self == RowInfo::default()
    }
}

/// A single sheet: cells plus everything laid over them
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    columns: BTreeMap<u16, ColumnInfo>,
    rows: BTreeMap<u32, RowInfo>,
    merged: Vec<CellRange>,
    freeze_panes: Option<FreezePanes>,
    auto_filter: Option<CellRange>,
    page_setup: Option<PageSetup>,
    header_footer: Option<HeaderFooter>,
    protection: Option<SheetProtection>,
    conditional_formats: Vec<ConditionalFormatRule>,
    data_validations: Vec<DataValidation>,
    charts: Vec<Chart>,
    images: Vec<SheetImage>,
}

impl Worksheet {
    /// Create an empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            columns: BTreeMap::new(),
            rows: BTreeMap::new(),
            merged: Vec::new(),
            freeze_panes: None,
            auto_filter: None,
            page_setup: None,
            header_footer: None,
            protection: None,
            conditional_formats: Vec::new(),
            data_validations: Vec::new(),
            charts: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cells ===

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(u32::from(col), MAX_COLS - 1));
        }
        Ok(())
    }

    /// Get a cell by zero-based position
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Cell value, `Empty` for untouched cells
    pub fn value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Set a cell value by zero-based position
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Store formula text; a leading `=` is optional
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, CellValue::formula(formula));
        Ok(())
    }

    /// Replace the cell's style
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Edit the cell's current style in place
    pub fn update_cell_style_at<F>(&mut self, row: u32, col: u16, f: F) -> Result<()>
    where
        F: FnOnce(&mut Style),
    {
        let mut style = self.cell_style_at(row, col).clone();
        f(&mut style);
        self.set_cell_style_at(row, col, &style)
    }

    /// Effective style (the default style for unstyled cells)
    pub fn cell_style_at(&self, row: u32, col: u16) -> &Style {
        let index = self.cells.get(row, col).map_or(0, |c| c.style_index);
        self.cells
            .style_pool()
            .get(index)
            .unwrap_or_else(|| self.cells.style_pool().default_style())
    }

    /// Styles referenced by this sheet's cells
    pub fn style_pool(&self) -> &StylePool {
        self.cells.style_pool()
    }

    /// Cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Cells of one row, in column order
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.row(row)
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell is stored
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `A1` through the bottom-right stored cell
    pub fn dimension(&self) -> Option<CellRange> {
        let max_row = self.cells.max_row()?;
        let max_col = self.cells.max_col()?;
        Some(CellRange::from_indices(0, 0, max_row, max_col))
    }

    // === Rows and columns ===

    /// Settings for a row, if any were set
    pub fn row_info(&self, row: u32) -> Option<&RowInfo> {
        self.rows.get(&row)
    }

    /// Rows carrying non-default settings
    pub fn rows(&self) -> impl Iterator<Item = (u32, &RowInfo)> {
        self.rows.iter().map(|(r, info)| (*r, info))
    }

    fn row_entry(&mut self, row: u32) -> Result<&mut RowInfo> {
        self.validate_cell_position(row, 0)?;
        Ok(self.rows.entry(row).or_default())
    }

    /// Set a row height in points
    pub fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        self.row_entry(row)?.height = Some(height);
        Ok(())
    }

    /// Hide or show a row
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) -> Result<()> {
        self.row_entry(row)?.hidden = hidden;
        Ok(())
    }

    /// Set a row outline level
    pub fn set_row_outline_level(&mut self, row: u32, level: u8) -> Result<()> {
        if level > MAX_OUTLINE_LEVEL {
            return Err(Error::OutlineTooDeep(level));
        }
        self.row_entry(row)?.outline_level = level;
        Ok(())
    }

    /// Settings for a column, if any were set
    pub fn column_info(&self, col: u16) -> Option<&ColumnInfo> {
        self.columns.get(&col)
    }

    /// Column settings in column order
    pub fn columns(&self) -> impl Iterator<Item = (u16, &ColumnInfo)> {
        self.columns.iter().map(|(c, info)| (*c, info))
    }

    fn column_entry(&mut self, col: u16) -> Result<&mut ColumnInfo> {
        self.validate_cell_position(0, col)?;
        Ok(self.columns.entry(col).or_default())
    }

    /// Set a column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        self.column_entry(col)?.width = Some(width);
        Ok(())
    }

    /// Hide or show a column
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) -> Result<()> {
        self.column_entry(col)?.hidden = hidden;
        Ok(())
    }

    /// Set a column outline level
    pub fn set_column_outline_level(&mut self, col: u16, level: u8) -> Result<()> {
        if level > MAX_OUTLINE_LEVEL {
            return Err(Error::OutlineTooDeep(level));
        }
        self.column_entry(col)?.outline_level = level;
        Ok(())
    }

    /// Nest rows `start..=end` one outline level deeper
    ///
    /// A collapsed group hides its rows and flags the row just below it as
    /// the collapsed summary row.
    pub fn group_rows(&mut self, group: OutlineGroup) -> Result<()> {
        for row in group.start..=group.end {
            let level = self.rows.get(&row).map_or(0, |r| r.outline_level) + 1;
            self.set_row_outline_level(row, level)?;
            if group.collapsed {
                self.set_row_hidden(row, true)?;
            }
        }
        if group.collapsed && group.end + 1 < MAX_ROWS {
            self.row_entry(group.end + 1)?.collapsed = true;
        }
        Ok(())
    }

    /// Nest columns `start..=end` one outline level deeper
    pub fn group_columns(&mut self, group: OutlineGroup) -> Result<()> {
        let end = u16::try_from(group.end)
            .map_err(|_| Error::ColumnOutOfBounds(group.end, MAX_COLS - 1))?;
        let start = group.start as u16;
        for col in start..=end {
            let level = self.columns.get(&col).map_or(0, |c| c.outline_level) + 1;
            self.set_column_outline_level(col, level)?;
            if group.collapsed {
                self.set_column_hidden(col, true)?;
            }
        }
        if group.collapsed && end + 1 < MAX_COLS {
            self.column_entry(end + 1)?.collapsed = true;
        }
        Ok(())
    }

    /// Deepest row outline level
    pub fn max_row_outline_level(&self) -> u8 {
        self.rows.values().map(|r| r.outline_level).max().unwrap_or(0)
    }

    /// Deepest column outline level
    pub fn max_column_outline_level(&self) -> u8 {
        self.columns
            .values()
            .map(|c| c.outline_level)
            .max()
            .unwrap_or(0)
    }

    // === Merged cells ===

    /// Merged ranges
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged
    }

    /// Merge a range; overlapping an existing merge is an error
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self.merged.iter().any(|existing| range.overlaps(existing)) {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.merged.push(*range);
        Ok(())
    }

    // === View, print and protection ===

    /// Frozen panes, if any
    pub fn freeze_panes(&self) -> Option<&FreezePanes> {
        self.freeze_panes.as_ref()
    }

    /// Freeze everything above `row` and left of `col`; `(0, 0)` unfreezes
    pub fn set_freeze_panes(&mut self, row: u32, col: u16) {
        self.freeze_panes = if row == 0 && col == 0 {
            None
        } else {
            Some(FreezePanes { row, col })
        };
    }

    /// Auto filter range, if any
    pub fn auto_filter(&self) -> Option<&CellRange> {
        self.auto_filter.as_ref()
    }

    /// Set the auto filter range
    pub fn set_auto_filter(&mut self, range: CellRange) {
        self.auto_filter = Some(range);
    }

    /// Page setup, if any
    pub fn page_setup(&self) -> Option<&PageSetup> {
        self.page_setup.as_ref()
    }

    /// Set page setup
    pub fn set_page_setup(&mut self, setup: PageSetup) {
        self.page_setup = Some(setup);
    }

    /// Header and footer, if any
    pub fn header_footer(&self) -> Option<&HeaderFooter> {
        self.header_footer.as_ref()
    }

    /// Set header and footer
    pub fn set_header_footer(&mut self, header_footer: HeaderFooter) {
        self.header_footer = Some(header_footer);
    }

    /// Sheet protection, if any
    pub fn protection(&self) -> Option<&SheetProtection> {
        self.protection.as_ref()
    }

    /// Protect the sheet
    pub fn protect(&mut self, protection: SheetProtection) {
        self.protection = Some(protection);
    }

    // === Rules and drawings ===

    /// Add a conditional formatting rule
    pub fn add_conditional_format(&mut self, rule: ConditionalFormatRule) {
        self.conditional_formats.push(rule);
    }

    /// Conditional formatting rules
    pub fn conditional_formats(&self) -> &[ConditionalFormatRule] {
        &self.conditional_formats
    }

    /// Add a data validation
    pub fn add_data_validation(&mut self, validation: DataValidation) {
        self.data_validations.push(validation);
    }

    /// Data validations
    pub fn data_validations(&self) -> &[DataValidation] {
        &self.data_validations
    }

    /// Add a chart
    pub fn add_chart(&mut self, chart: Chart) {
        self.charts.push(chart);
    }

    /// Charts
    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    /// Add an image
    pub fn add_image(&mut self, image: SheetImage) {
        self.images.push(image);
    }

    /// Images
    pub fn images(&self) -> &[SheetImage] {
        &self.images
    }

    // === Structural edits ===

    /// Insert `count` blank rows before row `at`
    ///
    /// Cells, row settings, merges, the auto-filter, frozen panes, rule and
    /// validation ranges and drawing anchors at or below `at` move down.
    /// Formula text is left as written. Fails without changing anything if a
    /// cell, row setting or merge would be pushed past the last row.
    pub fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let last_row = self
            .cells
            .max_row()
            .into_iter()
            .chain(self.rows.keys().next_back().copied())
            .chain(self.merged.iter().map(|range| range.end.row))
            .filter(|&row| row >= at)
            .max();
        if let Some(max_row) = last_row {
            if max_row + count >= MAX_ROWS {
                return Err(Error::RowOutOfBounds(max_row + count, MAX_ROWS - 1));
            }
        }

        self.cells.insert_rows(at, count);

        let moved = self.rows.split_off(&at);
        for (row, info) in moved {
            self.rows.insert(row + count, info);
        }

        for range in &mut self.merged {
            *range = range.shift_rows(at, count);
        }
        if let Some(filter) = &mut self.auto_filter {
            *filter = filter.shift_rows(at, count);
        }
        if let Some(panes) = &mut self.freeze_panes {
            if panes.row > at {
                panes.row += count;
            }
        }
        for rule in &mut self.conditional_formats {
            rule.shift_rows(at, count);
        }
        for validation in &mut self.data_validations {
            validation.shift_rows(at, count);
        }
        for chart in &mut self.charts {
            chart.shift_rows(at, count);
        }
        for image in &mut self.images {
            image.shift_rows(at, count);
        }
        Ok(())
    }
}

/// Address-string conveniences
impl Worksheet {
    /// Value at an A1 address
    pub fn value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.value_at(addr.row, addr.col))
    }

    /// Set a value at an A1 address
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }
}
