//! Style pool for deduplication

use super::Style;
use ahash::AHashMap;

/// Interned styles for one worksheet
///
/// Index 0 is always the default style; cells reference styles by index.
#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    index: AHashMap<Style, u32>,
}

impl StylePool {
    /// Create a pool holding only the default style
    pub fn new() -> Self {
        let default = Style::default();
        let mut index = AHashMap::with_capacity(16);
        index.insert(default.clone(), 0);
        Self {
            styles: vec![default],
            index,
        }
    }

    /// Index of an identical style, inserting it if unseen
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index.get(&style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        self.index.insert(style.clone(), idx);
        self.styles.push(style);
        idx
    }

    /// Style at index 0
    pub fn default_style(&self) -> &Style {
        &self.styles[0]
    }

    /// Style at an index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of distinct styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Styles in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        self.styles.iter().enumerate().map(|(i, s)| (i as u32, s))
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}
