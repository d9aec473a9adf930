//! styles.xml generation
//!
//! Every worksheet interns its own styles; this table folds them into one
//! workbook-wide `cellXfs` list and remembers how local indices map onto it.

use std::collections::HashMap;

use crate::xml::{color_element, escape};
use sheetforge_core::{
    Alignment, BorderEdge, BorderStyle, FillStyle, FontStyle, NumberFormat, Style, Workbook,
};

const FIRST_CUSTOM_NUMFMT_ID: u32 = 164;

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global styles; position is the xf id
    styles: Vec<Style>,
    /// Per sheet: local style index -> xf id
    sheet_maps: Vec<HashMap<u32, u32>>,
    /// Differential formats used by conditional formatting
    dxf_styles: Vec<Style>,
    /// (sheet index, rule index) -> dxf id
    dxf_map: HashMap<(usize, usize), u32>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

/// Find-or-append into a deduplicated list
fn intern<T: Clone + Eq + std::hash::Hash>(
    item: &T,
    list: &mut Vec<T>,
    ids: &mut HashMap<T, u32>,
) -> u32 {
    if let Some(&id) = ids.get(item) {
        return id;
    }
    let id = list.len() as u32;
    list.push(item.clone());
    ids.insert(item.clone(), id);
    id
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles = vec![Style::default()];
        let mut style_ids: HashMap<Style, u32> = HashMap::new();
        style_ids.insert(Style::default(), 0);

        let mut sheet_maps = Vec::with_capacity(workbook.sheet_count());
        let mut dxf_styles = Vec::new();
        let mut dxf_ids: HashMap<Style, u32> = HashMap::new();
        let mut dxf_map = HashMap::new();

        for (sheet_idx, sheet) in workbook.worksheets().enumerate() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_, _, cell) in sheet.iter_cells() {
                let local = cell.style_index;
                if map.contains_key(&local) {
                    continue;
                }
                let style = sheet.style_pool().get(local).cloned().unwrap_or_default();
                map.insert(local, intern(&style, &mut styles, &mut style_ids));
            }
            sheet_maps.push(map);

            for (rule_idx, rule) in sheet.conditional_formats().iter().enumerate() {
                if !rule.rule_type.uses_format() {
                    continue;
                }
                if let Some(format) = &rule.format {
                    let id = intern(format, &mut dxf_styles, &mut dxf_ids);
                    dxf_map.insert((sheet_idx, rule_idx), id);
                }
            }
        }

        Self {
            styles,
            sheet_maps,
            dxf_styles,
            dxf_map,
        }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn dxf_id_for(&self, sheet_index: usize, rule_index: usize) -> Option<u32> {
        self.dxf_map.get(&(sheet_index, rule_index)).copied()
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts = vec![FontStyle::default()];
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        font_ids.insert(FontStyle::default(), 0);

        // The first two fills are reserved: none and gray125
        let mut fills = vec![FillStyle::None, FillStyle::None];
        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
        fill_ids.insert(FillStyle::None, 0);

        let mut borders = vec![BorderStyle::default()];
        let mut border_ids: HashMap<BorderStyle, u32> = HashMap::new();
        border_ids.insert(BorderStyle::default(), 0);

        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();

        let resolved: Vec<ResolvedXfIds> = self
            .styles
            .iter()
            .map(|style| {
                let num_fmt_id = match style.number_format.builtin_id() {
                    Some(id) => id,
                    None => {
                        let code = style.number_format.format_code().to_string();
                        match numfmt_ids.get(&code) {
                            Some(&id) => id,
                            None => {
                                let id = FIRST_CUSTOM_NUMFMT_ID + numfmts.len() as u32;
                                numfmt_ids.insert(code.clone(), id);
                                numfmts.push((id, code));
                                id
                            }
                        }
                    }
                };
                ResolvedXfIds {
                    font_id: intern(&style.font, &mut fonts, &mut font_ids),
                    fill_id: intern(&style.fill, &mut fills, &mut fill_ids),
                    border_id: intern(&style.border, &mut borders, &mut border_ids),
                    num_fmt_id,
                }
            })
            .collect();

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len()));
        for (i, fill) in fills.iter().enumerate() {
            xml.push_str("\n    ");
            if i == 1 {
                xml.push_str("<fill><patternFill patternType=\"gray125\"/></fill>");
            } else {
                xml.push_str(&write_fill(fill));
            }
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len()));
        for border in &borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>"#,
        );

        if self.dxf_styles.is_empty() {
            xml.push_str("\n  <dxfs count=\"0\"/>");
        } else {
            xml.push_str(&format!("\n  <dxfs count=\"{}\">", self.dxf_styles.len()));
            for dxf in &self.dxf_styles {
                xml.push_str("\n    ");
                xml.push_str(&write_dxf(dxf));
            }
            xml.push_str("\n  </dxfs>");
        }

        xml.push_str(
            r#"
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&color_element("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            color_element("fgColor", color)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => format!(
            "<fill><patternFill patternType=\"{}\">{}{}</patternFill></fill>",
            pattern.xlsx_name(),
            color_element("fgColor", foreground),
            color_element("bgColor", background)
        ),
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        None => format!("<{tag}/>"),
        Some(e) => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            e.style.xlsx_name(),
            color_element("color", &e.color)
        ),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/></border>");
    s
}

fn write_alignment(al: &Alignment) -> String {
    if al.is_default() {
        return String::new();
    }
    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.xlsx_name()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.xlsx_name()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if !style.border.is_empty() {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if !style.alignment.is_default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let head = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );
    let alignment = write_alignment(&style.alignment);
    if alignment.is_empty() {
        format!("{head}/>")
    } else {
        format!("{head}>{alignment}</xf>")
    }
}

/// Differential format: only the slots that differ from the default
fn write_dxf(style: &Style) -> String {
    let mut s = String::from("<dxf>");
    if style.font != FontStyle::default() {
        s.push_str(&write_font(&style.font));
    }
    if !matches!(style.number_format, NumberFormat::General) {
        s.push_str(&format!(
            "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
            style.number_format.builtin_id().unwrap_or(FIRST_CUSTOM_NUMFMT_ID),
            escape(style.number_format.format_code())
        ));
    }
    if !style.fill.is_none() {
        // In a dxf the solid color lives in bgColor
        match &style.fill {
            FillStyle::Solid { color } => s.push_str(&format!(
                "<fill><patternFill patternType=\"solid\">{}{}</patternFill></fill>",
                color_element("fgColor", color),
                color_element("bgColor", color)
            )),
            other => s.push_str(&write_fill(other)),
        }
    }
    if !style.border.is_empty() {
        s.push_str(&write_border(&style.border));
    }
    s.push_str("</dxf>");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetforge_core::{Color, Workbook};

    #[test]
    fn test_styles_are_shared_across_sheets() {
        let mut wb = Workbook::new();
        let bold = Style::new().bold(true);
        wb.add_worksheet("A").unwrap().set_cell_style_at(0, 0, &bold).unwrap();
        let sheet = wb.add_worksheet("B").unwrap();
        sheet.set_cell_style_at(0, 0, &Style::new().italic(true)).unwrap();
        sheet.set_cell_style_at(0, 1, &bold).unwrap();

        let table = XlsxStyleTable::build(&wb);
        assert_eq!(table.xf_id_for(0, 1), 1);
        assert_eq!(table.xf_id_for(1, 2), 1);
        assert_eq!(table.xf_id_for(1, 1), 2);
    }

    #[test]
    fn test_custom_number_formats_start_at_164() {
        let mut wb = Workbook::new();
        let sheet = wb.add_worksheet("S").unwrap();
        sheet
            .set_cell_style_at(0, 0, &Style::new().number_format("#,##0₫"))
            .unwrap();
        sheet
            .set_cell_style_at(0, 1, &Style::new().number_format("#,##0"))
            .unwrap();

        let xml = XlsxStyleTable::build(&wb).to_styles_xml();
        assert!(xml.contains("<numFmt numFmtId=\"164\" formatCode=\"#,##0₫\"/>"));
        assert!(xml.contains("numFmtId=\"3\""));
        assert!(!xml.contains("formatCode=\"#,##0\""));
    }

    #[test]
    fn test_solid_fill_xml() {
        let fill = FillStyle::solid(Color::rgb(0xF5, 0xF5, 0xF5));
        assert_eq!(
            write_fill(&fill),
            "<fill><patternFill patternType=\"solid\"><fgColor rgb=\"FFF5F5F5\"/><bgColor indexed=\"64\"/></patternFill></fill>"
        );
    }
}
