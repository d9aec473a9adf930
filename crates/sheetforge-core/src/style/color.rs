//! Color representation

use std::fmt;

/// A cell, font or border color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,
    /// Explicit ARGB color
    Argb { a: u8, r: u8, g: u8, b: u8 },
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a: 0xFF, r, g, b }
    }

    /// Color from alpha, red, green and blue
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Parse `"FFE0E0E0"`, `"E0E0E0"` or `"#E0E0E0"`; six digits imply full opacity
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// 8-digit uppercase ARGB hex, as written to XLSX
    pub fn to_argb_hex(&self) -> String {
        match self {
            Color::Auto => "FF000000".to_string(),
            Color::Argb { a, r, g, b } => format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
        }
    }

    /// True for the automatic color
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_argb_hex())
    }
}
