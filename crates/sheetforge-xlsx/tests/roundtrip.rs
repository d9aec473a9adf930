//! Write a workbook, read it back, compare.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetforge_core::{CellRange, CellValue, Color, FillStyle, Style, Workbook};
use sheetforge_xlsx::{XlsxReader, XlsxWriter};

fn sample_workbook() -> Workbook {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet("Sales").unwrap();
        sheet.set_cell_value_at(0, 0, "Product").unwrap();
        sheet.set_cell_value_at(0, 1, "Amount").unwrap();
        sheet.set_cell_value_at(1, 0, "Widget & Co").unwrap();
        sheet.set_cell_value_at(1, 1, 1250.5).unwrap();
        sheet.set_cell_value_at(2, 0, "  padded ").unwrap();
        sheet.set_cell_value_at(2, 1, 3.0).unwrap();
        sheet.set_cell_value_at(3, 1, true).unwrap();
        sheet.set_cell_formula_at(4, 1, "=SUM(B2:B3)").unwrap();

        let header = Style::new().bold(true).fill_color(Color::rgb(0xE0, 0xE0, 0xE0));
        sheet.set_cell_style_at(0, 0, &header).unwrap();
        sheet.set_cell_style_at(0, 1, &header).unwrap();
        let money = Style::new().number_format("#,##0₫");
        sheet.set_cell_style_at(1, 1, &money).unwrap();

        sheet.merge_cells(&CellRange::parse("C1:D1").unwrap()).unwrap();
        sheet.set_row_height(0, 20.0).unwrap();
        sheet.set_row_hidden(3, true).unwrap();
        sheet.set_column_width(0, 24.0).unwrap();
        sheet.set_column_hidden(3, true).unwrap();
        sheet.set_freeze_panes(1, 0);
    }
    workbook.add_worksheet("Notes").unwrap();

    let props = workbook.properties_mut();
    props.title = Some("Quarterly".to_string());
    props.creator = Some("Finance".to_string());
    props.company = Some("Acme".to_string());
    props.keywords = vec!["sales".to_string(), "q3".to_string()];
    workbook
}

fn roundtrip(workbook: &Workbook, compress: bool) -> Workbook {
    let bytes = XlsxWriter::new()
        .with_compression(compress)
        .to_bytes(workbook)
        .unwrap();
    XlsxReader::read(Cursor::new(bytes)).unwrap()
}

#[test]
fn test_sheet_order_and_values() {
    let read = roundtrip(&sample_workbook(), true);

    let names: Vec<&str> = read.worksheets().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Sales", "Notes"]);

    let sheet = read.worksheet(0).unwrap();
    assert_eq!(sheet.value_at(0, 0), CellValue::String("Product".into()));
    assert_eq!(sheet.value_at(1, 0), CellValue::String("Widget & Co".into()));
    assert_eq!(sheet.value_at(2, 0), CellValue::String("  padded ".into()));
    assert_eq!(sheet.value_at(1, 1), CellValue::Number(1250.5));
    assert_eq!(sheet.value_at(3, 1), CellValue::Boolean(true));
    assert_eq!(sheet.value_at(4, 1), CellValue::Formula("SUM(B2:B3)".into()));
    assert!(read.worksheet(1).unwrap().is_empty());
}

#[test]
fn test_styles_survive() {
    let read = roundtrip(&sample_workbook(), true);
    let sheet = read.worksheet(0).unwrap();

    let header = sheet.cell_style_at(0, 0);
    assert!(header.font.bold);
    assert_eq!(header.fill, FillStyle::solid(Color::rgb(0xE0, 0xE0, 0xE0)));

    let money = sheet.cell_style_at(1, 1);
    assert_eq!(money.number_format.format_code(), "#,##0₫");
    assert!(!money.font.bold);
}

#[test]
fn test_layout_survives() {
    let read = roundtrip(&sample_workbook(), true);
    let sheet = read.worksheet(0).unwrap();

    assert_eq!(
        sheet.merged_regions(),
        &[CellRange::parse("C1:D1").unwrap()][..]
    );
    assert_eq!(sheet.row_info(0).and_then(|r| r.height), Some(20.0));
    assert!(sheet.row_info(3).map_or(false, |r| r.hidden));
    assert_eq!(sheet.column_info(0).and_then(|c| c.width), Some(24.0));
    assert!(sheet.column_info(3).map_or(false, |c| c.hidden));

    let panes = sheet.freeze_panes().unwrap();
    assert_eq!((panes.row, panes.col), (1, 0));
}

#[test]
fn test_document_properties() {
    let read = roundtrip(&sample_workbook(), true);
    let props = read.properties();

    assert_eq!(props.title.as_deref(), Some("Quarterly"));
    assert_eq!(props.creator.as_deref(), Some("Finance"));
    assert_eq!(props.company.as_deref(), Some("Acme"));
    assert_eq!(props.keywords, vec!["sales".to_string(), "q3".to_string()]);
    assert!(props.created.is_some());
}

#[test]
fn test_stored_and_deflated_read_the_same() {
    let workbook = sample_workbook();
    let stored = XlsxWriter::new().with_compression(false).to_bytes(&workbook).unwrap();
    let deflated = XlsxWriter::new().with_compression(true).to_bytes(&workbook).unwrap();
    assert!(deflated.len() < stored.len());

    let a = roundtrip(&workbook, false);
    let b = roundtrip(&workbook, true);
    let cells_a: Vec<_> = a.worksheet(0).unwrap().iter_cells().map(|(r, c, d)| (r, c, d.value.clone())).collect();
    let cells_b: Vec<_> = b.worksheet(0).unwrap().iter_cells().map(|(r, c, d)| (r, c, d.value.clone())).collect();
    assert_eq!(cells_a, cells_b);
}

#[test]
fn test_write_file_and_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    XlsxWriter::new().write_file(&sample_workbook(), &path).unwrap();

    let read = XlsxReader::read_file(&path).unwrap();
    assert_eq!(read.sheet_count(), 2);
}

#[test]
fn test_rejects_non_zip_input() {
    let result = XlsxReader::read(Cursor::new(b"not a spreadsheet".to_vec()));
    assert!(result.is_err());
}

#[test]
fn test_control_characters_never_reach_the_package() {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet("Text").unwrap();
        sheet.set_cell_value_at(0, 0, "x\u{1}y").unwrap();
        sheet.set_cell_value_at(1, 0, "bell\u{7} tab\tend").unwrap();
        sheet.set_cell_value_at(2, 0, "Thu chi \u{1F4B0}").unwrap();
    }
    workbook.properties_mut().title = Some("Q\u{1B}3".to_string());

    let bytes = XlsxWriter::new().to_bytes(&workbook).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
    for i in 0..archive.len() {
        let mut part = archive.by_index(i).unwrap();
        let name = part.name().to_string();
        if !name.ends_with(".xml") && !name.ends_with(".rels") {
            continue;
        }
        let mut xml = String::new();
        std::io::Read::read_to_string(&mut part, &mut xml).unwrap();
        assert!(
            !xml.chars().any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')),
            "{name} carries a control character"
        );
    }

    let read = XlsxReader::read(Cursor::new(bytes)).unwrap();
    let sheet = read.worksheet(0).unwrap();
    assert_eq!(sheet.value_at(0, 0), CellValue::String("xy".into()));
    assert_eq!(sheet.value_at(1, 0), CellValue::String("bell tab\tend".into()));
    assert_eq!(sheet.value_at(2, 0), CellValue::String("Thu chi \u{1F4B0}".into()));
    assert_eq!(read.properties().title.as_deref(), Some("Q3"));
}
