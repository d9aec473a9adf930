//! Requests in, XLSX bytes out, read back with the reader.

use std::io::{Cursor, Read};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sheetforge::prelude::*;
use sheetforge::{validate_partial, GeneratorKind};
use sheetforge_core::{Color, FillStyle};

fn generate_and_read(raw: Value) -> (GeneratedWorkbook, Workbook) {
    let config = validate(&raw).unwrap();
    let generated = generate(&config, &XlsxSerializer::new()).unwrap();
    let read = XlsxReader::read(Cursor::new(generated.bytes.clone())).unwrap();
    (generated, read)
}

#[test]
fn test_totals_row_scenario() {
    let (generated, read) = generate_and_read(json!({
        "file_name": "t.xlsx",
        "sheets": [{
            "name": "S",
            "columns": [{ "header": "Qty", "key": "qty", "type": "number" }],
            "data": [{ "qty": 5 }],
            "formatting": { "totals_row": { "qty": "SUM(A2:A2)" } }
        }]
    }));

    assert_eq!(generated.file_name, "t.xlsx");
    assert_eq!(generated.sheets_count, 1);
    assert_eq!(generated.file_size, generated.bytes.len());

    assert_eq!(read.sheet_count(), 1);
    let sheet = read.worksheet(0).unwrap();
    assert_eq!(sheet.name(), "S");
    assert_eq!(sheet.value_at(0, 0), CellValue::String("Qty".into()));
    assert_eq!(sheet.value_at(1, 0), CellValue::Number(5.0));
    assert_eq!(sheet.cell_style_at(1, 0).number_format.format_code(), "#,##0");
    assert_eq!(sheet.value_at(2, 0), CellValue::Formula("SUM(A2:A2)".into()));
    assert!(sheet.cell_style_at(2, 0).font.bold);
}

#[test]
fn test_currency_default_and_explicit_override() {
    let (_, read) = generate_and_read(json!({
        "file_name": "money.xlsx",
        "sheets": [{
            "name": "Money",
            "columns": [
                { "header": "Price", "key": "price", "type": "currency" },
                { "header": "Cost", "key": "cost", "type": "currency", "format": "$#,##0.00" }
            ],
            "data": [{ "price": 150000, "cost": 12.5 }]
        }]
    }));
    let sheet = read.worksheet(0).unwrap();
    assert_eq!(sheet.cell_style_at(1, 0).number_format.format_code(), "#,##0₫");
    assert_eq!(sheet.cell_style_at(1, 1).number_format.format_code(), "$#,##0.00");
}

#[test]
fn test_header_style_survives_serialization() {
    let (_, read) = generate_and_read(json!({
        "file_name": "h.xlsx",
        "sheets": [
            { "name": "One", "columns": [{ "header": "A", "key": "a" }], "data": [] },
            { "name": "Two", "layout": "dashboard", "columns": [{ "header": "B", "key": "b" }], "data": [] }
        ]
    }));
    for sheet in read.worksheets() {
        let style = sheet.cell_style_at(0, 0);
        assert!(style.font.bold);
        assert_eq!(style.fill, FillStyle::solid(Color::rgb(0xE0, 0xE0, 0xE0)));
        assert_eq!(sheet.row_info(0).and_then(|r| r.height), Some(20.0));
    }
}

#[test]
fn test_report_layout_offsets_table() {
    let raw = json!({
        "file_name": "report.xlsx",
        "sheets": [{
            "name": "Summary",
            "layout": "report",
            "metadata": { "title": "Monthly Summary" },
            "columns": [
                { "header": "Region", "key": "region" },
                { "header": "Revenue", "key": "revenue", "type": "number" }
            ],
            "data": [
                { "region": "North", "revenue": 100 },
                { "region": "South", "revenue": 200 },
                { "region": "West", "revenue": 300 }
            ]
        }]
    });
    assert_eq!(select_generator(&validate(&raw).unwrap()), GeneratorKind::Report);

    let (_, read) = generate_and_read(raw);
    let sheet = read.worksheet(0).unwrap();

    assert_eq!(sheet.value_at(0, 0), CellValue::String("Monthly Summary".into()));
    assert!(matches!(sheet.value_at(1, 0), CellValue::String(s) if s.starts_with("Generated: ")));
    assert_eq!(sheet.value_at(2, 0), CellValue::Empty);
    assert_eq!(sheet.value_at(3, 0), CellValue::String("Region".into()));
    assert_eq!(sheet.value_at(4, 0), CellValue::String("North".into()));

    let stripe = FillStyle::solid(Color::rgb(0xF5, 0xF5, 0xF5));
    assert_eq!(sheet.cell_style_at(4, 0).fill, stripe);
    assert_eq!(sheet.cell_style_at(5, 0).fill, FillStyle::None);
    assert_eq!(sheet.cell_style_at(6, 1).fill, stripe);

    let merges: Vec<String> = sheet.merged_regions().iter().map(|r| r.to_a1_string()).collect();
    assert_eq!(merges, vec!["A1:B1".to_string(), "A2:B2".to_string()]);
}

fn sheet_part(bytes: &[u8], index: usize) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive
        .by_name(&format!("xl/worksheets/sheet{}.xml", index + 1))
        .unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn test_report_title_shifts_every_row_anchor() {
    let (generated, read) = generate_and_read(json!({
        "file_name": "shifted.xlsx",
        "sheets": [{
            "name": "Ledger",
            "layout": "report",
            "metadata": { "title": "Ledger" },
            "columns": [
                { "header": "Item", "key": "item" },
                { "header": "Amount", "key": "amount", "type": "number" }
            ],
            "data": [
                { "item": "Rent", "amount": 900 },
                { "item": "Power", "amount": 120 }
            ],
            "formatting": {
                "totals_row": { "amount": "SUM(B2:B3)" },
                "merged_cells": ["A5:B5"],
                "conditional_formatting": [
                    { "range": "B2:B3", "type": "cellIs", "operator": "greaterThan", "formulae": [500] }
                ]
            }
        }]
    }));
    let sheet = read.worksheet_by_name("Ledger").unwrap();

    assert_eq!(sheet.value_at(3, 0), CellValue::String("Item".into()));
    assert_eq!(sheet.value_at(4, 0), CellValue::String("Rent".into()));
    assert_eq!(sheet.value_at(5, 1), CellValue::Number(120.0));
    assert!(sheet.value_at(6, 1).formula_text().is_some());
    assert!(sheet.cell_style_at(6, 1).font.bold);
    assert_eq!(sheet.value_at(3, 1), CellValue::String("Amount".into()));

    let merges: Vec<String> = sheet.merged_regions().iter().map(|r| r.to_a1_string()).collect();
    assert!(merges.contains(&"A8:B8".to_string()));
    assert!(!merges.contains(&"A5:B5".to_string()));

    let xml = sheet_part(&generated.bytes, 0);
    assert!(xml.contains("<conditionalFormatting sqref=\"B5:B6\">"));
}

#[test]
fn test_text_outside_the_xml_charset_is_dropped() {
    let (generated, read) = generate_and_read(json!({
        "file_name": "text.xlsx",
        "sheets": [{
            "name": "Notes",
            "columns": [{ "header": "Note", "key": "note" }],
            "data": [{ "note": "x\u{1}y" }, { "note": "Thu chi \u{1F4B0}" }]
        }]
    }));

    let xml = sheet_part(&generated.bytes, 0);
    assert!(!xml.contains('\u{1}'));

    let sheet = read.worksheet(0).unwrap();
    assert_eq!(sheet.value_at(1, 0), CellValue::String("xy".into()));
    assert_eq!(sheet.value_at(2, 0), CellValue::String("Thu chi \u{1F4B0}".into()));
}

#[test]
fn test_roundtrip_recovers_headers_and_values() {
    let (_, read) = generate_and_read(json!({
        "file_name": "rt.xlsx",
        "sheets": [
            {
                "name": "People",
                "columns": [
                    { "header": "Name", "key": "name" },
                    { "header": "Age", "key": "age", "type": "number" },
                    { "header": "Active", "key": "active", "type": "boolean" },
                    { "header": "Joined", "key": "joined", "type": "date" }
                ],
                "data": [
                    { "name": "Ann", "age": 31, "active": true, "joined": "2024-01-15" },
                    { "name": "Bo", "age": 45, "active": false }
                ]
            },
            { "name": "Empty", "columns": [], "data": [] }
        ]
    }));

    let names: Vec<&str> = read.worksheets().map(|s| s.name()).collect();
    assert_eq!(names, vec!["People", "Empty"]);

    let sheet = read.worksheet(0).unwrap();
    let headers: Vec<CellValue> = (0..4).map(|c| sheet.value_at(0, c)).collect();
    assert_eq!(
        headers,
        vec![
            CellValue::String("Name".into()),
            CellValue::String("Age".into()),
            CellValue::String("Active".into()),
            CellValue::String("Joined".into()),
        ]
    );
    assert_eq!(sheet.value_at(1, 0), CellValue::String("Ann".into()));
    assert_eq!(sheet.value_at(1, 1), CellValue::Number(31.0));
    assert_eq!(sheet.value_at(1, 2), CellValue::Boolean(true));
    assert_eq!(sheet.value_at(1, 3), CellValue::Number(45306.0));
    assert_eq!(sheet.value_at(2, 2), CellValue::Boolean(false));
    assert_eq!(sheet.value_at(2, 3), CellValue::Empty);
    assert!(read.worksheet(1).unwrap().is_empty());
}

#[test]
fn test_layout_features_roundtrip() {
    let (_, read) = generate_and_read(json!({
        "file_name": "layout.xlsx",
        "metadata": { "title": "Layout", "author": "Ops", "company": "Acme", "keywords": ["a", "b"] },
        "sheets": [{
            "name": "Grid",
            "columns": [{ "header": "A", "key": "a", "width": 22 }, { "header": "B", "key": "b" }],
            "data": [{ "a": 1 }, { "a": 2 }, { "a": 3 }],
            "formatting": {
                "freeze_panes": "A2",
                "merged_cells": ["A6:B6"],
                "row_heights": { "2": 28 },
                "hidden_rows": [3],
                "hidden_columns": ["B"]
            }
        }]
    }));

    let props = read.properties();
    assert_eq!(props.title.as_deref(), Some("Layout"));
    assert_eq!(props.creator.as_deref(), Some("Ops"));
    assert_eq!(props.company.as_deref(), Some("Acme"));
    assert_eq!(props.keywords, vec!["a".to_string(), "b".to_string()]);
    assert!(props.created.is_some());

    let sheet = read.worksheet(0).unwrap();
    let panes = sheet.freeze_panes().unwrap();
    assert_eq!((panes.row, panes.col), (1, 0));
    assert_eq!(sheet.merged_regions()[0].to_a1_string(), "A6:B6");
    assert_eq!(sheet.row_info(1).and_then(|r| r.height), Some(28.0));
    assert!(sheet.row_info(2).unwrap().hidden);
    assert!(sheet.column_info(1).unwrap().hidden);
    assert_eq!(sheet.column_info(0).and_then(|c| c.width), Some(22.0));
}

#[test]
fn test_validation_reports_every_issue() {
    let raw = json!({
        "sheets": [{
            "name": 7,
            "layout": "poster",
            "columns": [{ "header": "A" }],
            "data": []
        }]
    });
    let errors = validate(&raw).unwrap_err();
    let messages = errors.messages();
    assert!(messages.contains(&"file_name: required".to_string()));
    assert!(messages.contains(&"sheets.0.name: expected string, got number".to_string()));
    assert!(messages.iter().any(|m| m.starts_with("sheets.0.layout: expected one of")));
    assert!(messages.contains(&"sheets.0.columns.0.key: required".to_string()));

    let partial = validate_partial(&json!({ "options": { "compress": true } }));
    assert!(partial.valid);
    assert!(partial.errors.is_empty());

    let report = handle_error(&GenerateError::from(errors));
    assert_eq!(report.code, "VALIDATION_ERROR");
    assert!(report.message.starts_with("Schema validation failed: "));
}

#[test]
fn test_service_writes_to_local_storage() {
    let dir = tempfile::tempdir().unwrap();
    let service = WorkbookService::new(GeneratorConfig {
        local_storage_path: dir.path().join("files"),
        ..Default::default()
    });

    let raw = r#"{
        "file_name": "stored.xlsx",
        "sheets": [{ "name": "S", "columns": [{ "header": "X", "key": "x" }], "data": [{ "x": "y" }] }],
        "options": { "compress": false }
    }"#;
    let result = service.handle_json(raw).unwrap();

    assert!(result.success);
    assert_eq!(result.sheets_count, 1);
    let path = result.download_url.trim_start_matches("file://");
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(bytes.len(), result.file_size);

    let read = XlsxReader::read(Cursor::new(bytes)).unwrap();
    assert_eq!(read.worksheet(0).unwrap().value_at(1, 0), CellValue::String("y".into()));
}
