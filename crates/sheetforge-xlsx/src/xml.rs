//! Small helpers shared by the part writers

use sheetforge_core::Color;

/// Escape text for element content and attribute values
///
/// Characters XML 1.0 cannot carry at all (C0 controls other than tab, LF
/// and CR, plus U+FFFE and U+FFFF) are dropped.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !is_xml_char(c) => {}
            _ => out.push(c),
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// `<tag rgb="AARRGGBB"/>`, or the system color for `Auto`
pub(crate) fn color_element(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} indexed=\"64\"/>"),
        Color::Argb { .. } => format!("<{tag} rgb=\"{}\"/>", color.to_argb_hex()),
    }
}

/// ` name="1"` when set, nothing otherwise
pub(crate) fn flag(name: &str, on: bool) -> String {
    if on {
        format!(" {name}=\"1\"")
    } else {
        String::new()
    }
}
