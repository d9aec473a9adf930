//! XLSX reader
//!
//! Recovers what the writer puts in a package: sheet order and names, cell
//! values (shared or inline strings, numbers, booleans, formulas), the number
//! format, boldness and solid fill of each cell, merged ranges, row and column
//! settings, frozen panes and document properties. Anything else is skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use sheetforge_core::{
    CellAddress, CellRange, CellValue, Color, DocumentProperties, FillStyle, NumberFormat, Style,
    Workbook, Worksheet,
};

/// XLSX file reader
pub struct XlsxReader;

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_flag(e: &BytesStart<'_>, name: &[u8]) -> bool {
    attr(e, name).map_or(false, |v| v == "1" || v == "true")
}

fn attr_num<T: std::str::FromStr>(e: &BytesStart<'_>, name: &[u8]) -> Option<T> {
    attr(e, name).and_then(|v| v.parse().ok())
}

fn xml_reader<R: Read>(part: R) -> Reader<BufReader<R>> {
    let mut reader = Reader::from_reader(BufReader::new(part));
    reader.trim_text(false);
    reader
}

/// Collected `<xf>` entries resolved to styles
#[derive(Debug, Default)]
struct StyleSheet {
    cell_styles: Vec<Style>,
}

impl XlsxReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;
        let sheets = Self::read_workbook_xml(&mut archive)?;
        let paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();
        for (name, r_id) in sheets {
            let path = paths
                .get(&r_id)
                .ok_or_else(|| XlsxError::MissingPart(format!("worksheet for {}", r_id)))?
                .clone();
            debug!("Reading sheet '{}' from {}", name, path);
            let sheet = workbook.add_worksheet(&name)?;
            Self::read_worksheet(&mut archive, &path, sheet, &shared_strings, &styles)?;
        }

        *workbook.properties_mut() = Self::read_properties(&mut archive)?;
        Ok(workbook)
    }

    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();
        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut reader = xml_reader(file);
        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_t = false;
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => current.clear(),
                    b"t" => in_t = true,
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"si" => strings.push(std::mem::take(&mut current)),
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(t) if in_t => current.push_str(&t.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<StyleSheet> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(StyleSheet::default()),
        };

        let mut reader = xml_reader(file);
        let mut buf = Vec::new();
        let mut custom_formats: HashMap<u32, String> = HashMap::new();
        let mut fonts: Vec<(bool, f64)> = Vec::new();
        let mut fills: Vec<FillStyle> = Vec::new();
        let mut xfs: Vec<(u32, usize, usize)> = Vec::new();
        let mut section: Vec<u8> = Vec::new();
        let mut solid = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = e.name().as_ref().to_vec();
                    match name.as_slice() {
                        b"fonts" | b"fills" | b"cellXfs" | b"dxfs" | b"cellStyleXfs" => {
                            section = name.clone()
                        }
                        b"font" if section == b"fonts" => fonts.push((false, 11.0)),
                        b"fill" if section == b"fills" => fills.push(FillStyle::None),
                        b"patternFill" if section == b"fills" => {
                            solid = attr(&e, b"patternType").as_deref() == Some("solid");
                        }
                        b"xf" if section == b"cellXfs" => xfs.push(Self::xf_ids(&e)),
                        _ => {}
                    }
                }
                Event::Empty(e) => match e.name().as_ref() {
                    b"numFmt" if section != b"dxfs" => {
                        if let (Some(id), Some(code)) =
                            (attr_num::<u32>(&e, b"numFmtId"), attr(&e, b"formatCode"))
                        {
                            custom_formats.insert(id, code);
                        }
                    }
                    b"b" if section == b"fonts" => {
                        if let Some(font) = fonts.last_mut() {
                            font.0 = true;
                        }
                    }
                    b"sz" if section == b"fonts" => {
                        if let (Some(font), Some(size)) = (fonts.last_mut(), attr_num(&e, b"val")) {
                            font.1 = size;
                        }
                    }
                    b"fgColor" if section == b"fills" && solid => {
                        if let (Some(fill), Some(color)) = (
                            fills.last_mut(),
                            attr(&e, b"rgb").and_then(|c| Color::from_hex(&c)),
                        ) {
                            *fill = FillStyle::solid(color);
                        }
                    }
                    b"patternFill" if section == b"fills" => solid = false,
                    b"xf" if section == b"cellXfs" => xfs.push(Self::xf_ids(&e)),
                    _ => {}
                },
                Event::End(e) => {
                    if e.name().as_ref() == section.as_slice() {
                        section.clear();
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let cell_styles = xfs
            .into_iter()
            .map(|(num_fmt_id, font_id, fill_id)| {
                let mut style = Style::new();
                style.number_format = custom_formats
                    .get(&num_fmt_id)
                    .map(|code| NumberFormat::from_code(code.as_str()))
                    .or_else(|| NumberFormat::from_builtin_id(num_fmt_id))
                    .unwrap_or_default();
                if let Some((bold, size)) = fonts.get(font_id) {
                    style.font.bold = *bold;
                    style.font.size = *size;
                }
                if let Some(fill) = fills.get(fill_id) {
                    style.fill = fill.clone();
                }
                style
            })
            .collect();
        Ok(StyleSheet { cell_styles })
    }

    fn xf_ids(e: &BytesStart<'_>) -> (u32, usize, usize) {
        (
            attr_num(e, b"numFmtId").unwrap_or(0),
            attr_num(e, b"fontId").unwrap_or(0),
            attr_num(e, b"fillId").unwrap_or(0),
        )
    }

    /// Sheet names and relationship ids in workbook order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut reader = xml_reader(file);
        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                    if let (Some(name), Some(r_id)) = (attr(&e, b"name"), attr(&e, b"r:id")) {
                        sheets.push((name, r_id));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(sheets)
    }

    /// Worksheet relationship id -> part path
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut reader = xml_reader(file);
        let mut buf = Vec::new();
        let mut rels = HashMap::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let is_sheet = attr(&e, b"Type").map_or(false, |t| t.ends_with("/worksheet"));
                    if let (true, Some(id), Some(target)) =
                        (is_sheet, attr(&e, b"Id"), attr(&e, b"Target"))
                    {
                        let path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        };
                        rels.insert(id, path);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(rels)
    }

    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        sheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &StyleSheet,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut reader = xml_reader(file);
        let mut buf = Vec::new();

        let mut cell: Option<(CellAddress, Option<String>, u32)> = None;
        let mut value: Option<String> = None;
        let mut formula: Option<String> = None;
        let mut text_target: Option<&'static str> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => Self::apply_row_attrs(sheet, &e)?,
                    b"c" => {
                        cell = Some(Self::cell_attrs(&e)?);
                        value = None;
                        formula = None;
                    }
                    b"v" => text_target = Some("v"),
                    b"f" => text_target = Some("f"),
                    b"t" if cell.is_some() => text_target = Some("v"),
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => Self::apply_row_attrs(sheet, &e)?,
                    b"c" => {
                        let (addr, _, xf) = Self::cell_attrs(&e)?;
                        Self::apply_style(sheet, addr, xf, styles)?;
                    }
                    b"col" => Self::apply_col_attrs(sheet, &e)?,
                    b"pane" => {
                        if attr(&e, b"state").as_deref() == Some("frozen") {
                            let rows = attr_num::<f64>(&e, b"ySplit").unwrap_or(0.0) as u32;
                            let cols = attr_num::<f64>(&e, b"xSplit").unwrap_or(0.0) as u16;
                            sheet.set_freeze_panes(rows, cols);
                        }
                    }
                    b"mergeCell" => {
                        if let Some(r) = attr(&e, b"ref") {
                            sheet.merge_cells(&CellRange::parse(&r)?)?;
                        }
                    }
                    b"autoFilter" => {
                        if let Some(r) = attr(&e, b"ref") {
                            sheet.set_auto_filter(CellRange::parse(&r)?);
                        }
                    }
                    _ => {}
                },
                Event::Text(t) => match text_target {
                    Some("v") => value.get_or_insert_with(String::new).push_str(&t.unescape()?),
                    Some("f") => formula
                        .get_or_insert_with(String::new)
                        .push_str(&t.unescape()?),
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"v" | b"f" | b"t" => text_target = None,
                    b"c" => {
                        if let Some((addr, cell_type, xf)) = cell.take() {
                            let parsed = Self::cell_value(
                                cell_type.as_deref(),
                                value.take(),
                                formula.take(),
                                shared_strings,
                            )?;
                            sheet.set_cell_value_at(addr.row, addr.col, parsed)?;
                            Self::apply_style(sheet, addr, xf, styles)?;
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    fn cell_attrs(e: &BytesStart<'_>) -> XlsxResult<(CellAddress, Option<String>, u32)> {
        let reference =
            attr(e, b"r").ok_or_else(|| XlsxError::Parse("cell without a reference".into()))?;
        Ok((
            CellAddress::parse(&reference)?,
            attr(e, b"t"),
            attr_num(e, b"s").unwrap_or(0),
        ))
    }

    fn cell_value(
        cell_type: Option<&str>,
        value: Option<String>,
        formula: Option<String>,
        shared_strings: &[String],
    ) -> XlsxResult<CellValue> {
        if let Some(f) = formula {
            return Ok(CellValue::formula(f));
        }
        let Some(raw) = value else {
            return Ok(CellValue::Empty);
        };
        let parsed = match cell_type {
            Some("s") => {
                let idx: usize = raw
                    .trim()
                    .parse()
                    .map_err(|_| XlsxError::Parse(format!("bad shared string index '{}'", raw)))?;
                let text = shared_strings
                    .get(idx)
                    .ok_or_else(|| XlsxError::Parse(format!("shared string {} missing", idx)))?;
                CellValue::String(text.clone())
            }
            Some("inlineStr") | Some("str") => CellValue::String(raw),
            Some("b") => CellValue::Boolean(raw.trim() == "1"),
            _ => CellValue::Number(
                raw.trim()
                    .parse()
                    .map_err(|_| XlsxError::Parse(format!("bad number '{}'", raw)))?,
            ),
        };
        Ok(parsed)
    }

    fn apply_style(
        sheet: &mut Worksheet,
        addr: CellAddress,
        xf: u32,
        styles: &StyleSheet,
    ) -> XlsxResult<()> {
        if xf == 0 {
            return Ok(());
        }
        if let Some(style) = styles.cell_styles.get(xf as usize) {
            sheet.set_cell_style_at(addr.row, addr.col, style)?;
        }
        Ok(())
    }

    fn apply_row_attrs(sheet: &mut Worksheet, e: &BytesStart<'_>) -> XlsxResult<()> {
        let Some(row) = attr_num::<u32>(e, b"r").and_then(|r| r.checked_sub(1)) else {
            return Ok(());
        };
        if attr_flag(e, b"customHeight") {
            if let Some(height) = attr_num(e, b"ht") {
                sheet.set_row_height(row, height)?;
            }
        }
        if attr_flag(e, b"hidden") {
            sheet.set_row_hidden(row, true)?;
        }
        if let Some(level) = attr_num::<u8>(e, b"outlineLevel").filter(|l| *l > 0) {
            sheet.set_row_outline_level(row, level)?;
        }
        Ok(())
    }

    fn apply_col_attrs(sheet: &mut Worksheet, e: &BytesStart<'_>) -> XlsxResult<()> {
        let (Some(min), Some(max)) = (attr_num::<u16>(e, b"min"), attr_num::<u16>(e, b"max"))
        else {
            return Ok(());
        };
        for col in min.saturating_sub(1)..max {
            if let Some(width) = attr_num(e, b"width") {
                sheet.set_column_width(col, width)?;
            }
            if attr_flag(e, b"hidden") {
                sheet.set_column_hidden(col, true)?;
            }
            if let Some(level) = attr_num::<u8>(e, b"outlineLevel").filter(|l| *l > 0) {
                sheet.set_column_outline_level(col, level)?;
            }
        }
        Ok(())
    }

    fn read_properties<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<DocumentProperties> {
        let mut props = DocumentProperties::default();

        if let Ok(file) = archive.by_name("docProps/core.xml") {
            let mut reader = xml_reader(file);
            let mut buf = Vec::new();
            let mut current: Option<Vec<u8>> = None;
            loop {
                match reader.read_event_into(&mut buf)? {
                    Event::Start(e) => current = Some(e.name().as_ref().to_vec()),
                    Event::End(_) => current = None,
                    Event::Text(t) => {
                        let text = t.unescape()?.into_owned();
                        match current.as_deref() {
                            Some(b"dc:title") => props.title = Some(text),
                            Some(b"dc:subject") => props.subject = Some(text),
                            Some(b"dc:creator") => props.creator = Some(text),
                            Some(b"dc:description") => props.description = Some(text),
                            Some(b"cp:category") => props.category = Some(text),
                            Some(b"cp:keywords") => {
                                props.keywords = text
                                    .split(',')
                                    .map(|k| k.trim().to_string())
                                    .filter(|k| !k.is_empty())
                                    .collect()
                            }
                            Some(b"dcterms:created") => props.created = parse_timestamp(&text),
                            Some(b"dcterms:modified") => props.modified = parse_timestamp(&text),
                            _ => {}
                        }
                    }
                    Event::Eof => break,
                    _ => {}
                }
                buf.clear();
            }
        }

        if let Ok(file) = archive.by_name("docProps/app.xml") {
            let mut reader = xml_reader(file);
            let mut buf = Vec::new();
            let mut in_company = false;
            loop {
                match reader.read_event_into(&mut buf)? {
                    Event::Start(e) => in_company = e.name().as_ref() == b"Company",
                    Event::End(_) => in_company = false,
                    Event::Text(t) if in_company => {
                        props.company = Some(t.unescape()?.into_owned())
                    }
                    Event::Eof => break,
                    _ => {}
                }
                buf.clear();
            }
        }

        Ok(props)
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
