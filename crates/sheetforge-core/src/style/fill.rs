//! Background fill types

use super::Color;

/// Cell background
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    /// Transparent
    #[default]
    None,
    /// Solid color fill
    Solid { color: Color },
    /// Patterned fill
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl FillStyle {
    /// Solid fill of one color
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    /// True when there is no fill
    pub fn is_none(&self) -> bool {
        matches!(self, FillStyle::None)
    }
}

/// Pattern fill kinds, named as in SpreadsheetML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternType {
    /// No pattern
    None,
    /// Solid foreground color
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

const PATTERN_NAMES: [(PatternType, &str); 19] = [
    (PatternType::None, "none"),
    (PatternType::Solid, "solid"),
    (PatternType::MediumGray, "mediumGray"),
    (PatternType::DarkGray, "darkGray"),
    (PatternType::LightGray, "lightGray"),
    (PatternType::DarkHorizontal, "darkHorizontal"),
    (PatternType::DarkVertical, "darkVertical"),
    (PatternType::DarkDown, "darkDown"),
    (PatternType::DarkUp, "darkUp"),
    (PatternType::DarkGrid, "darkGrid"),
    (PatternType::DarkTrellis, "darkTrellis"),
    (PatternType::LightHorizontal, "lightHorizontal"),
    (PatternType::LightVertical, "lightVertical"),
    (PatternType::LightDown, "lightDown"),
    (PatternType::LightUp, "lightUp"),
    (PatternType::LightGrid, "lightGrid"),
    (PatternType::LightTrellis, "lightTrellis"),
    (PatternType::Gray125, "gray125"),
    (PatternType::Gray0625, "gray0625"),
];

impl PatternType {
    /// Look up a SpreadsheetML pattern name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        PATTERN_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(p, _)| *p)
    }

    /// Value of the `patternType` attribute
    pub fn xlsx_name(&self) -> &'static str {
        PATTERN_NAMES
            .iter()
            .find(|(p, _)| p == self)
            .map_or("none", |(_, n)| n)
    }
}
