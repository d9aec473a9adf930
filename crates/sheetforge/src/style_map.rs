//! Declarative style descriptors to concrete cell styles
//!
//! A part present in a descriptor (font, alignment, fill or border) replaces
//! that slot of the cell style outright. Absent parts keep whatever the cell
//! already carries.

use sheetforge_core::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle, HorizontalAlignment,
    PatternType, Style, VerticalAlignment,
};

use crate::error::{GenerateError, Result};
use crate::schema::{
    AlignmentConfig, ArgbColor, BorderConfig, BorderEdgeConfig, FillConfig, FontConfig,
    HorizontalAlign, RuleFillConfig, RuleStyleConfig, StyleConfig, VerticalAlign,
};

pub const DEFAULT_BORDER_STYLE: &str = "thin";
pub const DEFAULT_BORDER_COLOR: &str = "FF000000";

/// Layer `descriptor` onto `style`
pub fn apply_style(style: &mut Style, descriptor: &StyleConfig) -> Result<()> {
    if let Some(font) = &descriptor.font {
        style.font = to_font(font)?;
    }
    if let Some(alignment) = &descriptor.alignment {
        style.alignment = to_alignment(alignment);
    }
    if let Some(fill) = &descriptor.fill {
        style.fill = to_fill(fill)?;
    }
    if let Some(border) = &descriptor.border {
        style.border = to_border(border)?;
    }
    Ok(())
}

/// Four identical sides
pub fn border_preset(line_style: &str, color: &str) -> BorderConfig {
    let edge = BorderEdgeConfig {
        style: line_style.to_string(),
        color: ArgbColor::new(color),
    };
    BorderConfig {
        top: Some(edge.clone()),
        bottom: Some(edge.clone()),
        left: Some(edge.clone()),
        right: Some(edge),
    }
}

/// Thin black border on all sides
pub fn default_border() -> BorderConfig {
    border_preset(DEFAULT_BORDER_STYLE, DEFAULT_BORDER_COLOR)
}

/// Differential format used by a conditional formatting rule
pub fn rule_style(descriptor: &RuleStyleConfig) -> Result<Style> {
    let mut style = Style::new();
    if let Some(font) = &descriptor.font {
        style.font = to_font(font)?;
    }
    if let Some(fill) = &descriptor.fill {
        style.fill = rule_fill(fill)?;
    }
    if let Some(border) = &descriptor.border {
        style.border = to_border(border)?;
    }
    Ok(style)
}

pub fn parse_color(color: &ArgbColor) -> Result<Color> {
    Color::from_hex(&color.argb).ok_or_else(|| {
        GenerateError::generation(format!("Invalid ARGB color '{}'", color.argb))
    })
}

fn to_font(cfg: &FontConfig) -> Result<FontStyle> {
    let mut font = FontStyle::default();
    if let Some(name) = &cfg.name {
        font.name = name.clone();
    }
    if let Some(size) = cfg.size {
        font.size = size;
    }
    if let Some(bold) = cfg.bold {
        font.bold = bold;
    }
    if let Some(italic) = cfg.italic {
        font.italic = italic;
    }
    if let Some(underline) = cfg.underline {
        font.underline = underline;
    }
    if let Some(color) = &cfg.color {
        font.color = parse_color(color)?;
    }
    Ok(font)
}

fn to_alignment(cfg: &AlignmentConfig) -> Alignment {
    let mut alignment = Alignment::default();
    if let Some(horizontal) = cfg.horizontal {
        alignment.horizontal = match horizontal {
            HorizontalAlign::Left => HorizontalAlignment::Left,
            HorizontalAlign::Center => HorizontalAlignment::Center,
            HorizontalAlign::Right => HorizontalAlignment::Right,
            HorizontalAlign::Justify => HorizontalAlignment::Justify,
        };
    }
    if let Some(vertical) = cfg.vertical {
        alignment.vertical = match vertical {
            VerticalAlign::Top => VerticalAlignment::Top,
            VerticalAlign::Middle => VerticalAlignment::Center,
            VerticalAlign::Bottom => VerticalAlignment::Bottom,
        };
    }
    if let Some(wrap) = cfg.wrap_text {
        alignment.wrap_text = wrap;
    }
    alignment
}

fn to_fill(cfg: &FillConfig) -> Result<FillStyle> {
    let pattern = PatternType::from_name(&cfg.pattern).ok_or_else(|| {
        GenerateError::generation(format!("Unknown fill pattern '{}'", cfg.pattern))
    })?;
    let foreground = parse_color(&cfg.fg_color)?;
    Ok(match pattern {
        PatternType::None => FillStyle::None,
        PatternType::Solid => FillStyle::solid(foreground),
        pattern => FillStyle::Pattern {
            pattern,
            foreground,
            background: cfg.bg_color.as_ref().map(parse_color).transpose()?.unwrap_or(Color::Auto),
        },
    })
}

fn rule_fill(cfg: &RuleFillConfig) -> Result<FillStyle> {
    if cfg.pattern.as_deref().map_or(false, |p| p.eq_ignore_ascii_case("none")) {
        return Ok(FillStyle::None);
    }
    match cfg.bg_color.as_ref().or(cfg.fg_color.as_ref()) {
        Some(color) => Ok(FillStyle::solid(parse_color(color)?)),
        None => Ok(FillStyle::None),
    }
}

fn to_edge(cfg: &BorderEdgeConfig) -> Result<BorderEdge> {
    let style = BorderLineStyle::from_name(&cfg.style).ok_or_else(|| {
        GenerateError::generation(format!("Unknown border style '{}'", cfg.style))
    })?;
    Ok(BorderEdge::new(style, parse_color(&cfg.color)?))
}

fn to_border(cfg: &BorderConfig) -> Result<BorderStyle> {
    let mut border = BorderStyle::default();
    if let Some(edge) = &cfg.top {
        border.top = Some(to_edge(edge)?);
    }
    if let Some(edge) = &cfg.bottom {
        border.bottom = Some(to_edge(edge)?);
    }
    if let Some(edge) = &cfg.left {
        border.left = Some(to_edge(edge)?);
    }
    if let Some(edge) = &cfg.right {
        border.right = Some(to_edge(edge)?);
    }
    Ok(border)
}
