//! Drawing parts for embedded pictures
//!
//! Each picture is a two-cell anchor spanning its `from`/`to` cells, with the
//! image bytes stored under `xl/media/`.

use sheetforge_core::{ImageFormat, SheetImage};

/// `xl/worksheets/_rels/sheetN.xml.rels`: the sheet's single drawing
pub(super) fn sheet_rels(drawing_no: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing{}.xml"/>
</Relationships>"#,
        drawing_no
    )
}

/// `xl/drawings/_rels/drawingN.xml.rels`: picture `i` is `rId{i+1}`
pub(super) fn drawing_rels(media: &[(usize, ImageFormat)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, (no, format)) in media.iter().enumerate() {
        xml.push_str(&format!(
            "\n    <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"../media/image{}.{}\"/>",
            i + 1,
            no,
            format.extension()
        ));
    }
    xml.push_str("\n</Relationships>");
    xml
}

fn marker(tag: &str, row: u32, col: u16) -> String {
    format!(
        "<xdr:{tag}><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:{tag}>",
        col, row
    )
}

pub(super) fn drawing_xml(images: &[SheetImage]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    for (idx, image) in images.iter().enumerate() {
        let id = idx + 1;
        xml.push_str("<xdr:twoCellAnchor editAs=\"oneCell\">");
        xml.push_str(&marker("from", image.from.row, image.from.col));
        xml.push_str(&marker("to", image.to.row, image.to.col));
        xml.push_str(&format!(
            "<xdr:pic><xdr:nvPicPr><xdr:cNvPr id=\"{}\" name=\"Picture {}\"/><xdr:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></xdr:cNvPicPr></xdr:nvPicPr>",
            id + 1,
            id
        ));
        xml.push_str(&format!(
            "<xdr:blipFill><a:blip r:embed=\"rId{}\"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>",
            id
        ));
        xml.push_str(
            "<xdr:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/></a:xfrm><a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></xdr:spPr></xdr:pic>",
        );
        xml.push_str("<xdr:clientData/></xdr:twoCellAnchor>");
    }

    xml.push_str("</xdr:wsDr>");
    xml
}
