//! Text alignment types

/// Cell alignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: HorizontalAlignment,
    /// Vertical alignment
    pub vertical: VerticalAlignment,
    /// Wrap long text onto several lines
    pub wrap_text: bool,
}

impl Alignment {
    /// True when nothing differs from the default
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Text left, numbers right
    #[default]
    General,
    /// Left aligned
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
    /// Justified
    Justify,
}

impl HorizontalAlignment {
    /// Value of the `horizontal` attribute
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
            HorizontalAlignment::Justify => "justify",
        }
    }
}

/// Vertical alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    /// Top aligned
    Top,
    /// Centered
    Center,
    /// Bottom aligned
    #[default]
    Bottom,
}

impl VerticalAlignment {
    /// Value of the `vertical` attribute
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
        }
    }
}
