//! Cell styling types
//!
//! - [`Style`] - complete cell style
//! - [`FontStyle`], [`FillStyle`], [`BorderStyle`], [`Alignment`] - its slots
//! - [`StylePool`] - per-sheet deduplication

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
mod pool;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle};
pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use font::FontStyle;
pub use number_format::NumberFormat;
pub use pool::StylePool;

/// Complete cell style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Font settings
    pub font: FontStyle,
    /// Fill
    pub fill: FillStyle,
    /// Borders
    pub border: BorderStyle,
    /// Alignment
    pub alignment: Alignment,
    /// Number format
    pub number_format: NumberFormat,
}

impl Style {
    /// Default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Set italic
    pub fn italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    /// Set the font size
    pub fn font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    /// Set the font color
    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Solid background fill
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = FillStyle::Solid { color };
        self
    }

    /// Set the number format code
    pub fn number_format<S: Into<String>>(mut self, code: S) -> Self {
        self.number_format = NumberFormat::from_code(code);
        self
    }

    /// Set horizontal alignment
    pub fn horizontal_alignment(mut self, align: HorizontalAlignment) -> Self {
        self.alignment.horizontal = align;
        self
    }

    /// Set vertical alignment
    pub fn vertical_alignment(mut self, align: VerticalAlignment) -> Self {
        self.alignment.vertical = align;
        self
    }

    /// Set text wrapping
    pub fn wrap_text(mut self, wrap: bool) -> Self {
        self.alignment.wrap_text = wrap;
        self
    }

    /// Whether any fill other than "none" is set
    pub fn has_fill(&self) -> bool {
        !self.fill.is_none()
    }
}
