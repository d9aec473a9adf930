//! Worksheet part (`xl/worksheets/sheetN.xml`)
//!
//! Elements are emitted in the order the SpreadsheetML schema requires:
//! sheetPr, dimension, sheetViews, sheetFormatPr, cols, sheetData,
//! sheetProtection, autoFilter, mergeCells, conditionalFormatting,
//! dataValidations, pageMargins, pageSetup, headerFooter, drawing.

use std::collections::BTreeSet;

use crate::styles::XlsxStyleTable;
use crate::xml::{color_element, escape, flag};
use sheetforge_core::{
    CellAddress, CellRange, CellValue, CfRuleType, ConditionalFormatRule, Worksheet,
};

pub(super) fn worksheet_xml(
    sheet: &Worksheet,
    index: usize,
    style_table: &XlsxStyleTable,
    has_drawing: bool,
) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    write_sheet_properties(&mut content, sheet);
    if let Some(dimension) = sheet.dimension() {
        content.push_str(&format!("\n    <dimension ref=\"{}\"/>", dimension));
    }
    write_sheet_views(&mut content, sheet, index);
    content.push_str(&format!(
        "\n    <sheetFormatPr defaultRowHeight=\"15\"{}{}/>",
        outline_attr("outlineLevelRow", sheet.max_row_outline_level()),
        outline_attr("outlineLevelCol", sheet.max_column_outline_level()),
    ));
    write_columns(&mut content, sheet);
    write_sheet_data(&mut content, sheet, index, style_table);
    write_protection(&mut content, sheet);
    if let Some(filter) = sheet.auto_filter() {
        content.push_str(&format!("\n    <autoFilter ref=\"{}\"/>", filter));
    }
    write_merged_cells(&mut content, sheet);
    write_conditional_formatting(&mut content, sheet, index, style_table);
    write_data_validations(&mut content, sheet);
    write_page_layout(&mut content, sheet);
    if has_drawing {
        content.push_str("\n    <drawing r:id=\"rId1\"/>");
    }

    content.push_str("\n</worksheet>");
    content
}

fn outline_attr(name: &str, level: u8) -> String {
    if level > 0 {
        format!(" {name}=\"{level}\"")
    } else {
        String::new()
    }
}

fn write_sheet_properties(content: &mut String, sheet: &Worksheet) {
    let fit_to_page = sheet.page_setup().map_or(false, |p| p.fit_to_page);
    if fit_to_page {
        content.push_str("\n    <sheetPr><pageSetUpPr fitToPage=\"1\"/></sheetPr>");
    }
}

fn write_sheet_views(content: &mut String, sheet: &Worksheet, index: usize) {
    let selected = flag("tabSelected", index == 0);
    let Some(panes) = sheet.freeze_panes() else {
        content.push_str(&format!(
            "\n    <sheetViews><sheetView{} workbookViewId=\"0\"/></sheetViews>",
            selected
        ));
        return;
    };

    let active_pane = match (panes.row > 0, panes.col > 0) {
        (true, true) => "bottomRight",
        (true, false) => "bottomLeft",
        _ => "topRight",
    };
    let mut pane = String::from("<pane");
    if panes.col > 0 {
        pane.push_str(&format!(" xSplit=\"{}\"", panes.col));
    }
    if panes.row > 0 {
        pane.push_str(&format!(" ySplit=\"{}\"", panes.row));
    }
    let top_left = panes.top_left_cell();
    pane.push_str(&format!(
        " topLeftCell=\"{}\" activePane=\"{}\" state=\"frozen\"/>",
        top_left, active_pane
    ));

    content.push_str(&format!(
        "\n    <sheetViews><sheetView{} workbookViewId=\"0\">{}<selection pane=\"{}\" activeCell=\"{}\" sqref=\"{}\"/></sheetView></sheetViews>",
        selected, pane, active_pane, top_left, top_left
    ));
}

fn write_columns(content: &mut String, sheet: &Worksheet) {
    let columns: Vec<_> = sheet.columns().filter(|(_, c)| !c.is_default()).collect();
    if columns.is_empty() {
        return;
    }
    content.push_str("\n    <cols>");
    for (col, info) in columns {
        let n = u32::from(col) + 1;
        let width = info
            .width
            .map_or(String::new(), |w| format!(" width=\"{}\" customWidth=\"1\"", w));
        content.push_str(&format!(
            "\n        <col min=\"{}\" max=\"{}\"{}{}{}{}/>",
            n,
            n,
            width,
            flag("hidden", info.hidden),
            outline_attr("outlineLevel", info.outline_level),
            flag("collapsed", info.collapsed),
        ));
    }
    content.push_str("\n    </cols>");
}

fn write_sheet_data(
    content: &mut String,
    sheet: &Worksheet,
    index: usize,
    style_table: &XlsxStyleTable,
) {
    let mut rows: BTreeSet<u32> = sheet.iter_cells().map(|(row, _, _)| row).collect();
    rows.extend(sheet.rows().filter(|(_, info)| !info.is_default()).map(|(r, _)| r));

    if rows.is_empty() {
        content.push_str("\n    <sheetData/>");
        return;
    }

    content.push_str("\n    <sheetData>");
    for row in rows {
        let mut attrs = String::new();
        if let Some(info) = sheet.row_info(row) {
            if let Some(height) = info.height {
                attrs.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
            }
            attrs.push_str(&flag("hidden", info.hidden));
            attrs.push_str(&outline_attr("outlineLevel", info.outline_level));
            attrs.push_str(&flag("collapsed", info.collapsed));
        }

        let mut cells = String::new();
        for (col, cell) in sheet.row_cells(row) {
            let cell_ref = CellAddress::new(row, col).to_a1_string();
            let xf_id = style_table.xf_id_for(index, cell.style_index);
            let style_attr = if xf_id != 0 {
                format!(" s=\"{}\"", xf_id)
            } else {
                String::new()
            };

            match &cell.value {
                CellValue::Number(n) => cells.push_str(&format!(
                    "\n            <c r=\"{}\"{}><v>{}</v></c>",
                    cell_ref, style_attr, n
                )),
                CellValue::String(s) => cells.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                    cell_ref,
                    style_attr,
                    escape(s)
                )),
                CellValue::Boolean(b) => cells.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    u8::from(*b)
                )),
                CellValue::Formula(text) => cells.push_str(&format!(
                    "\n            <c r=\"{}\"{}><f>{}</f></c>",
                    cell_ref,
                    style_attr,
                    escape(text)
                )),
                CellValue::Empty => {
                    if xf_id != 0 {
                        cells.push_str(&format!("\n            <c r=\"{}\"{}/>", cell_ref, style_attr));
                    }
                }
            }
        }

        if cells.is_empty() {
            content.push_str(&format!("\n        <row r=\"{}\"{}/>", row + 1, attrs));
        } else {
            content.push_str(&format!(
                "\n        <row r=\"{}\"{}>{}\n        </row>",
                row + 1,
                attrs,
                cells
            ));
        }
    }
    content.push_str("\n    </sheetData>");
}

fn write_protection(content: &mut String, sheet: &Worksheet) {
    let Some(protection) = sheet.protection() else {
        return;
    };
    // Attributes name what stays locked, so an allowed action is written as "0"
    let allow = |name: &str, allowed: bool| {
        if allowed {
            format!(" {name}=\"0\"")
        } else {
            String::new()
        }
    };
    let password = protection
        .password_hash()
        .map_or(String::new(), |h| format!(" password=\"{:04X}\"", h));
    content.push_str(&format!(
        "\n    <sheetProtection{} sheet=\"1\" objects=\"1\" scenarios=\"1\"{}{}{}{}{}{}{}/>",
        password,
        allow("formatCells", protection.format_cells),
        allow("formatColumns", protection.format_columns),
        allow("formatRows", protection.format_rows),
        allow("insertColumns", protection.insert_columns),
        allow("insertRows", protection.insert_rows),
        allow("deleteColumns", protection.delete_columns),
        allow("deleteRows", protection.delete_rows),
    ));
}

fn write_merged_cells(content: &mut String, sheet: &Worksheet) {
    let merged = sheet.merged_regions();
    if merged.is_empty() {
        return;
    }
    content.push_str(&format!("\n    <mergeCells count=\"{}\">", merged.len()));
    for range in merged {
        content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
    }
    content.push_str("\n    </mergeCells>");
}

fn sqref(ranges: &[CellRange]) -> String {
    ranges
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn cfvo(value_type: &str, value: &Option<String>) -> String {
    let val = value
        .as_ref()
        .map_or(String::new(), |v| format!(" val=\"{}\"", escape(v)));
    format!("<cfvo type=\"{}\"{}/>", value_type, val)
}

fn write_conditional_formatting(
    content: &mut String,
    sheet: &Worksheet,
    sheet_index: usize,
    style_table: &XlsxStyleTable,
) {
    for (rule_idx, rule) in sheet.conditional_formats().iter().enumerate() {
        if rule.ranges.is_empty() {
            continue;
        }
        let dxf_id = style_table.dxf_id_for(sheet_index, rule_idx);
        content.push_str(&format!(
            "\n    <conditionalFormatting sqref=\"{}\">\n        {}\n    </conditionalFormatting>",
            sqref(&rule.ranges),
            cf_rule_xml(rule, dxf_id)
        ));
    }
}

fn cf_rule_xml(rule: &ConditionalFormatRule, dxf_id: Option<u32>) -> String {
    let rule_type = rule.rule_type.xlsx_type();
    let dxf_attr = dxf_id.map_or(String::new(), |id| format!(" dxfId=\"{}\"", id));
    let head = format!(
        "<cfRule type=\"{}\" priority=\"{}\"{}",
        rule_type,
        rule.priority.max(1),
        flag("stopIfTrue", rule.stop_if_true)
    );

    match &rule.rule_type {
        CfRuleType::CellIs {
            operator,
            formula1,
            formula2,
        } => {
            let mut s = format!(
                "{}{} operator=\"{}\"><formula>{}</formula>",
                head,
                dxf_attr,
                operator.xlsx_operator(),
                escape(formula1)
            );
            if let Some(f2) = formula2 {
                s.push_str(&format!("<formula>{}</formula>", escape(f2)));
            }
            s.push_str("</cfRule>");
            s
        }
        CfRuleType::Expression { formula } => format!(
            "{}{}><formula>{}</formula></cfRule>",
            head,
            dxf_attr,
            escape(formula)
        ),
        CfRuleType::ContainsText { text } => {
            let first_cell = rule.ranges.first().map_or("A1".to_string(), |r| r.start.to_string());
            format!(
                "{}{} operator=\"containsText\" text=\"{}\"><formula>NOT(ISERROR(SEARCH(\"{}\",{})))</formula></cfRule>",
                head,
                dxf_attr,
                escape(text),
                escape(&text.replace('"', "\"\"")),
                first_cell
            )
        }
        CfRuleType::ColorScale { colors } => {
            let mut s = format!("{}><colorScale>", head);
            for stop in colors {
                s.push_str(&cfvo(stop.value_type.xlsx_type(), &stop.value));
            }
            for stop in colors {
                s.push_str(&color_element("color", &stop.color));
            }
            s.push_str("</colorScale></cfRule>");
            s
        }
        CfRuleType::DataBar(bar) => {
            let mut attrs = String::new();
            if let Some(min) = bar.min_length {
                attrs.push_str(&format!(" minLength=\"{}\"", min));
            }
            if let Some(max) = bar.max_length {
                attrs.push_str(&format!(" maxLength=\"{}\"", max));
            }
            if !bar.show_value {
                attrs.push_str(" showValue=\"0\"");
            }
            format!(
                "{}><dataBar{}>{}{}{}</dataBar></cfRule>",
                head,
                attrs,
                cfvo(bar.min.value_type.xlsx_type(), &bar.min.value),
                cfvo(bar.max.value_type.xlsx_type(), &bar.max.value),
                color_element("color", &bar.color)
            )
        }
        CfRuleType::IconSet {
            style,
            values,
            reverse,
            show_value,
        } => {
            let show = if *show_value { "" } else { " showValue=\"0\"" };
            let mut s = format!(
                "{}><iconSet iconSet=\"{}\"{}{}>",
                head,
                style.xlsx_name(),
                flag("reverse", *reverse),
                show
            );
            for v in values {
                s.push_str(&cfvo(v.value_type.xlsx_type(), &v.value));
            }
            s.push_str("</iconSet></cfRule>");
            s
        }
    }
}

fn write_data_validations(content: &mut String, sheet: &Worksheet) {
    let validations: Vec<_> = sheet
        .data_validations()
        .iter()
        .filter(|v| !v.ranges.is_empty())
        .collect();
    if validations.is_empty() {
        return;
    }

    content.push_str(&format!(
        "\n    <dataValidations count=\"{}\">",
        validations.len()
    ));
    for validation in validations {
        let operator = if validation.uses_operator() {
            format!(" operator=\"{}\"", validation.operator.xlsx_name())
        } else {
            String::new()
        };
        let text_attr = |name: &str, value: &Option<String>| {
            value
                .as_ref()
                .map_or(String::new(), |v| format!(" {}=\"{}\"", name, escape(v)))
        };

        content.push_str(&format!(
            "\n        <dataValidation type=\"{}\"{}{}{}{}{}{}{}{} sqref=\"{}\">",
            validation.validation_type.xlsx_name(),
            operator,
            flag("allowBlank", validation.allow_blank),
            flag("showInputMessage", validation.show_input_message),
            flag("showErrorMessage", validation.show_error_message),
            text_attr("errorTitle", &validation.error_title),
            text_attr("error", &validation.error),
            text_attr("promptTitle", &validation.prompt_title),
            text_attr("prompt", &validation.prompt),
            sqref(&validation.ranges)
        ));
        if let Some(f1) = &validation.formula1 {
            content.push_str(&format!("<formula1>{}</formula1>", escape(f1)));
        }
        if let Some(f2) = &validation.formula2 {
            content.push_str(&format!("<formula2>{}</formula2>", escape(f2)));
        }
        content.push_str("</dataValidation>");
    }
    content.push_str("\n    </dataValidations>");
}

fn write_page_layout(content: &mut String, sheet: &Worksheet) {
    let setup = sheet.page_setup();
    let margins = setup.map(|p| p.margins).unwrap_or_default();
    content.push_str(&format!(
        "\n    <pageMargins left=\"{}\" right=\"{}\" top=\"{}\" bottom=\"{}\" header=\"{}\" footer=\"{}\"/>",
        margins.left, margins.right, margins.top, margins.bottom, margins.header, margins.footer
    ));

    if let Some(setup) = setup {
        let mut attrs = String::new();
        if let Some(paper) = setup.paper_size {
            attrs.push_str(&format!(" paperSize=\"{}\"", paper));
        }
        if let Some(w) = setup.fit_to_width {
            attrs.push_str(&format!(" fitToWidth=\"{}\"", w));
        }
        if let Some(h) = setup.fit_to_height {
            attrs.push_str(&format!(" fitToHeight=\"{}\"", h));
        }
        attrs.push_str(&format!(" orientation=\"{}\"", setup.orientation.xlsx_name()));
        content.push_str(&format!("\n    <pageSetup{}/>", attrs));
    }

    if let Some(hf) = sheet.header_footer().filter(|hf| !hf.is_empty()) {
        content.push_str(&format!(
            "\n    <headerFooter{}>",
            flag("differentOddEven", hf.different_odd_even())
        ));
        let parts = [
            ("oddHeader", &hf.odd_header),
            ("oddFooter", &hf.odd_footer),
            ("evenHeader", &hf.even_header),
            ("evenFooter", &hf.even_footer),
        ];
        for (tag, text) in parts {
            if let Some(text) = text {
                content.push_str(&format!("<{tag}>{}</{tag}>", escape(text)));
            }
        }
        content.push_str("</headerFooter>");
    }
}
