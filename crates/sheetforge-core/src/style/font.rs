//! Font style types

use super::Color;

/// Font settings
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    /// Font family name (e.g., "Calibri", "Arial")
    pub name: String,
    /// Font size in points
    pub size: f64,
    /// Bold weight
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Single underline
    pub underline: bool,
    /// Font color
    pub color: Color,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
            bold: false,
            italic: false,
            underline: false,
            color: Color::Auto,
        }
    }
}

impl FontStyle {
    /// Calibri 11
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl std::hash::Hash for FontStyle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.color.hash(state);
    }
}

impl Eq for FontStyle {}
