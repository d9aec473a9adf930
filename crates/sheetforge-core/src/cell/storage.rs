//! Sparse cell storage
//!
//! Only cells that carry a value or a non-default style are kept, in a
//! row-major `BTreeMap<row, BTreeMap<col, CellData>>` so serializers can
//! stream rows in order.

use std::collections::BTreeMap;

use super::CellValue;
use crate::style::StylePool;

/// Value plus style slot for one cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    /// Cell value
    pub value: CellValue,
    /// Index into the owning sheet's style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create cell data with the default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// No value and the default style
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Sparse cell storage for one worksheet
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    style_pool: StylePool,
}

impl CellStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell at a position
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|cols| cols.get(&col))
    }

    fn entry(&mut self, row: u32, col: u16) -> &mut CellData {
        self.rows.entry(row).or_default().entry(col).or_default()
    }

    /// Set a value, keeping any existing style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        self.entry(row, col).value = value;
        self.prune(row, col);
    }

    /// Set the style pool index of a cell
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        self.entry(row, col).style_index = style_index;
        self.prune(row, col);
    }

    fn prune(&mut self, row: u32, col: u16) {
        if let Some(cols) = self.rows.get_mut(&row) {
            if cols.get(&col).map_or(false, CellData::is_blank) {
                cols.remove(&col);
            }
            if cols.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// The style pool backing the stored style indices
    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    /// Mutable access to the style pool
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }

    /// Cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(row, cols)| cols.iter().map(move |(col, data)| (*row, *col, data)))
    }

    /// Cells of a single row in column order
    pub fn row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(col, data)| (*col, data)))
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// True when no cell is stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest row index holding a cell
    pub fn max_row(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Highest column index holding a cell
    pub fn max_col(&self) -> Option<u16> {
        self.rows
            .values()
            .filter_map(|cols| cols.keys().next_back().copied())
            .max()
    }

    /// Shift every row at or below `at` down by `count`
    pub fn insert_rows(&mut self, at: u32, count: u32) {
        if count == 0 {
            return;
        }
        let moved = self.rows.split_off(&at);
        for (row, cols) in moved {
            self.rows.insert(row + count, cols);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cells_are_pruned() {
        let mut storage = CellStorage::new();
        storage.set_value(0, 0, CellValue::Number(1.0));
        storage.set_value(0, 0, CellValue::Empty);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_styled_empty_cell_is_kept() {
        let mut storage = CellStorage::new();
        storage.set_style(2, 3, 4);
        assert_eq!(storage.get(2, 3).map(|c| c.style_index), Some(4));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_insert_rows() {
        let mut storage = CellStorage::new();
        storage.set_value(0, 0, "header".into());
        storage.set_value(1, 0, CellValue::Number(5.0));
        storage.insert_rows(0, 3);

        assert!(storage.get(0, 0).is_none());
        assert_eq!(storage.get(3, 0).map(|c| &c.value), Some(&CellValue::String("header".into())));
        assert_eq!(
            storage.get(4, 0).map(|c| &c.value),
            Some(&CellValue::Number(5.0))
        );
        assert_eq!(storage.max_row(), Some(4));
    }
}
