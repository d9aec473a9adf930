//! XLSX writer

mod drawing;
mod sheet;

use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::XlsxResult;
use crate::styles::XlsxStyleTable;
use crate::xml::escape;
use sheetforge_core::{DocumentProperties, ImageFormat, Workbook};

/// Writes a [`Workbook`] as an XLSX package
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    compress: bool,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Part numbering for one sheet's drawing, decided before any part is written
#[derive(Debug, Clone)]
struct SheetParts {
    /// 1-based drawing part number when the sheet has images
    drawing: Option<usize>,
    /// Global 1-based media numbers of the sheet's images
    media: Vec<usize>,
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflate entries (the default) or store them uncompressed
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn write_file<P: AsRef<Path>>(&self, workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        self.write(workbook, file)
    }

    /// Serialize into an in-memory buffer
    pub fn to_bytes(&self, workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(workbook, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    pub fn write<W: Write + Seek>(&self, workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = self.file_options();

        let style_table = XlsxStyleTable::build(workbook);
        let parts = Self::plan_parts(workbook);

        Self::put(&mut zip, options, "[Content_Types].xml", &Self::content_types(workbook, &parts))?;
        Self::put(&mut zip, options, "_rels/.rels", ROOT_RELS)?;
        Self::put(
            &mut zip,
            options,
            "docProps/core.xml",
            &Self::core_properties(workbook.properties(), Utc::now()),
        )?;
        Self::put(
            &mut zip,
            options,
            "docProps/app.xml",
            &Self::app_properties(workbook),
        )?;
        Self::put(&mut zip, options, "xl/workbook.xml", &Self::workbook_xml(workbook))?;
        Self::put(
            &mut zip,
            options,
            "xl/_rels/workbook.xml.rels",
            &Self::workbook_rels(workbook),
        )?;
        Self::put(&mut zip, options, "xl/styles.xml", &style_table.to_styles_xml())?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            let sheet_parts = &parts[i];
            debug!(
                "Writing sheet{}.xml '{}' ({} cells, {} images)",
                i + 1,
                sheet.name(),
                sheet.cell_count(),
                sheet.images().len()
            );
            if !sheet.charts().is_empty() {
                warn!("Sheet '{}': charts are not written to XLSX", sheet.name());
            }
            let xml = sheet::worksheet_xml(sheet, i, &style_table, sheet_parts.drawing.is_some());
            Self::put(
                &mut zip,
                options,
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                &xml,
            )?;

            if let Some(drawing_no) = sheet_parts.drawing {
                Self::put(
                    &mut zip,
                    options,
                    &format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1),
                    &drawing::sheet_rels(drawing_no),
                )?;
                Self::put(
                    &mut zip,
                    options,
                    &format!("xl/drawings/drawing{}.xml", drawing_no),
                    &drawing::drawing_xml(sheet.images()),
                )?;
                let media: Vec<(usize, ImageFormat)> = sheet_parts
                    .media
                    .iter()
                    .zip(sheet.images())
                    .map(|(no, img)| (*no, img.format))
                    .collect();
                Self::put(
                    &mut zip,
                    options,
                    &format!("xl/drawings/_rels/drawing{}.xml.rels", drawing_no),
                    &drawing::drawing_rels(&media),
                )?;
                for (no, image) in sheet_parts.media.iter().zip(sheet.images()) {
                    zip.start_file(
                        format!("xl/media/image{}.{}", no, image.format.extension()),
                        options,
                    )?;
                    zip.write_all(&image.data)?;
                }
            }
        }

        zip.finish()?;
        Ok(())
    }

    fn file_options(&self) -> SimpleFileOptions {
        let method = if self.compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        SimpleFileOptions::default().compression_method(method)
    }

    fn put<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        options: SimpleFileOptions,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn plan_parts(workbook: &Workbook) -> Vec<SheetParts> {
        let mut next_drawing = 1;
        let mut next_media = 1;
        workbook
            .worksheets()
            .map(|sheet| {
                if sheet.images().is_empty() {
                    return SheetParts {
                        drawing: None,
                        media: Vec::new(),
                    };
                }
                let drawing = next_drawing;
                next_drawing += 1;
                let media = (0..sheet.images().len())
                    .map(|_| {
                        let no = next_media;
                        next_media += 1;
                        no
                    })
                    .collect();
                SheetParts {
                    drawing: Some(drawing),
                    media,
                }
            })
            .collect()
    }

    fn content_types(workbook: &Workbook, parts: &[SheetParts]) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>"#,
        );

        let mut formats: Vec<ImageFormat> = workbook
            .worksheets()
            .flat_map(|s| s.images().iter().map(|img| img.format))
            .collect();
        formats.sort_by_key(|f| f.extension());
        formats.dedup();
        for format in formats {
            content.push_str(&format!(
                "\n    <Default Extension=\"{}\" ContentType=\"{}\"/>",
                format.extension(),
                format.content_type()
            ));
        }

        content.push_str(
            r#"
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                "\n    <Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
                i + 1
            ));
        }
        for drawing_no in parts.iter().filter_map(|p| p.drawing) {
            content.push_str(&format!(
                "\n    <Override PartName=\"/xl/drawings/drawing{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.drawing+xml\"/>",
                drawing_no
            ));
        }

        content.push_str("\n</Types>");
        content
    }

    fn core_properties(props: &DocumentProperties, now: DateTime<Utc>) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        );
        let text_elements = [
            ("dc:title", &props.title),
            ("dc:subject", &props.subject),
            ("dc:creator", &props.creator),
            ("dc:description", &props.description),
            ("cp:category", &props.category),
        ];
        for (tag, value) in text_elements {
            if let Some(value) = value {
                xml.push_str(&format!("\n    <{tag}>{}</{tag}>", escape(value)));
            }
        }
        if !props.keywords.is_empty() {
            xml.push_str(&format!(
                "\n    <cp:keywords>{}</cp:keywords>",
                escape(&props.keywords.join(", "))
            ));
        }
        if let Some(creator) = &props.creator {
            xml.push_str(&format!(
                "\n    <cp:lastModifiedBy>{}</cp:lastModifiedBy>",
                escape(creator)
            ));
        }
        let stamp = |t: Option<DateTime<Utc>>| t.unwrap_or(now).format("%Y-%m-%dT%H:%M:%SZ").to_string();
        xml.push_str(&format!(
            "\n    <dcterms:created xsi:type=\"dcterms:W3CDTF\">{}</dcterms:created>",
            stamp(props.created)
        ));
        xml.push_str(&format!(
            "\n    <dcterms:modified xsi:type=\"dcterms:W3CDTF\">{}</dcterms:modified>",
            stamp(props.modified)
        ));
        xml.push_str("\n</cp:coreProperties>");
        xml
    }

    fn app_properties(workbook: &Workbook) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>sheetforge</Application>"#,
        );
        if let Some(company) = &workbook.properties().company {
            xml.push_str(&format!("\n    <Company>{}</Company>", escape(company)));
        }
        xml.push_str(&format!(
            "\n    <TitlesOfParts><vt:vector size=\"{}\" baseType=\"lpstr\">",
            workbook.sheet_count()
        ));
        for sheet in workbook.worksheets() {
            xml.push_str(&format!("<vt:lpstr>{}</vt:lpstr>", escape(sheet.name())));
        }
        xml.push_str("</vt:vector></TitlesOfParts>\n</Properties>");
        xml
    }

    fn workbook_xml(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews><workbookView activeTab="0"/></bookViews>
    <sheets>"#,
        );
        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                "\n        <sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
                escape(sheet.name()),
                i + 1,
                i + 1
            ));
        }
        content.push_str("\n    </sheets>");

        // Filtered sheets need the hidden _FilterDatabase name
        let filters: Vec<String> = workbook
            .worksheets()
            .enumerate()
            .filter_map(|(i, sheet)| {
                let range = sheet.auto_filter()?;
                Some(format!(
                    "\n        <definedName name=\"_xlnm._FilterDatabase\" localSheetId=\"{}\" hidden=\"1\">'{}'!{}</definedName>",
                    i,
                    escape(&sheet.name().replace('\'', "''")),
                    absolute_range(&range.to_string())
                ))
            })
            .collect();
        if !filters.is_empty() {
            content.push_str("\n    <definedNames>");
            for name in filters {
                content.push_str(&name);
            }
            content.push_str("\n    </definedNames>");
        }

        content.push_str("\n</workbook>");
        content
    }

    fn workbook_rels(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                "\n    <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
                i + 1,
                i + 1
            ));
        }
        content.push_str(&format!(
            "\n    <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>",
            workbook.sheet_count() + 1
        ));
        content.push_str("\n</Relationships>");
        content
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

/// `A1:C1` -> `$A$1:$C$1`
fn absolute_range(range: &str) -> String {
    range
        .split(':')
        .map(|part| {
            let split = part
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(part.len());
            let (letters, digits) = part.split_at(split);
            format!("${}${}", letters, digits)
        })
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_absolute_range() {
        assert_eq!(absolute_range("A1:AB1"), "$A$1:$AB$1");
        assert_eq!(absolute_range("C3"), "$C$3");
    }

    #[test]
    fn test_core_properties() {
        let props = DocumentProperties {
            title: Some("Q1 <Sales>".into()),
            creator: Some("AI Assistant".into()),
            keywords: vec!["sales".into(), "q1".into()],
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let xml = XlsxWriter::core_properties(&props, now);

        assert!(xml.contains("<dc:title>Q1 &lt;Sales&gt;</dc:title>"));
        assert!(xml.contains("<dc:creator>AI Assistant</dc:creator>"));
        assert!(xml.contains("<cp:keywords>sales, q1</cp:keywords>"));
        assert!(xml.contains(">2024-03-01T08:30:00Z</dcterms:created>"));
        assert!(!xml.contains("dc:subject"));
    }
}
