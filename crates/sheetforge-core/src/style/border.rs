//! Border style types

use super::Color;

/// Four-sided cell border
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    /// Left edge
    pub left: Option<BorderEdge>,
    /// Right edge
    pub right: Option<BorderEdge>,
    /// Top edge
    pub top: Option<BorderEdge>,
    /// Bottom edge
    pub bottom: Option<BorderEdge>,
}

impl BorderStyle {
    /// No borders
    pub fn new() -> Self {
        Self::default()
    }

    /// Same line style and color on all four sides
    pub fn all(style: BorderLineStyle, color: Color) -> Self {
        let edge = Some(BorderEdge { style, color });
        Self {
            left: edge.clone(),
            right: edge.clone(),
            top: edge.clone(),
            bottom: edge,
        }
    }

    /// True when no edge is set
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

/// One side of a border
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    /// Line style
    pub style: BorderLineStyle,
    /// Line color
    pub color: Color,
}

impl BorderEdge {
    /// Create an edge
    pub fn new(style: BorderLineStyle, color: Color) -> Self {
        Self { style, color }
    }
}

/// Border line styles, named as in SpreadsheetML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderLineStyle {
    /// Thin line
    #[default]
    Thin,
    /// Medium line
    Medium,
    /// Thick line
    Thick,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Double line
    Double,
    /// Hair line (very thin)
    Hair,
    /// Medium dashed
    MediumDashed,
    /// Dash-dot
    DashDot,
    /// Medium dash-dot
    MediumDashDot,
    /// Dash-dot-dot
    DashDotDot,
    /// Medium dash-dot-dot
    MediumDashDotDot,
    /// Slanted dash-dot
    SlantDashDot,
}

const LINE_NAMES: [(BorderLineStyle, &str); 13] = [
    (BorderLineStyle::Thin, "thin"),
    (BorderLineStyle::Medium, "medium"),
    (BorderLineStyle::Thick, "thick"),
    (BorderLineStyle::Dashed, "dashed"),
    (BorderLineStyle::Dotted, "dotted"),
    (BorderLineStyle::Double, "double"),
    (BorderLineStyle::Hair, "hair"),
    (BorderLineStyle::MediumDashed, "mediumDashed"),
    (BorderLineStyle::DashDot, "dashDot"),
    (BorderLineStyle::MediumDashDot, "mediumDashDot"),
    (BorderLineStyle::DashDotDot, "dashDotDot"),
    (BorderLineStyle::MediumDashDotDot, "mediumDashDotDot"),
    (BorderLineStyle::SlantDashDot, "slantDashDot"),
];

impl BorderLineStyle {
    /// Parse a SpreadsheetML name such as `mediumDashed`
    pub fn from_name(name: &str) -> Option<Self> {
        LINE_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(s, _)| *s)
    }

    /// Value of the `style` attribute
    pub fn xlsx_name(&self) -> &'static str {
        LINE_NAMES
            .iter()
            .find(|(s, _)| s == self)
            .map_or("thin", |(_, n)| n)
    }
}
