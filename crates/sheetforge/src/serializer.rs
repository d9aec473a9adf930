//! Document serializers
//!
//! The builder produces a [`Workbook`]; a serializer turns it into bytes and
//! declares which optional features it can render.

use sheetforge_core::Workbook;
use sheetforge_xlsx::XlsxWriter;

use crate::error::Result;

pub trait DocumentSerializer {
    fn serialize(&self, workbook: &Workbook) -> Result<Vec<u8>>;

    /// Whether charts attached to a worksheet are rendered
    fn charts_supported(&self) -> bool {
        false
    }

    /// Whether embedded pictures are rendered
    fn images_supported(&self) -> bool {
        false
    }
}

/// Features a builder may rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub charts: bool,
    pub images: bool,
}

impl Capabilities {
    pub fn of(serializer: &dyn DocumentSerializer) -> Self {
        Self {
            charts: serializer.charts_supported(),
            images: serializer.images_supported(),
        }
    }
}

/// Office Open XML output
#[derive(Debug, Clone, Default)]
pub struct XlsxSerializer {
    writer: XlsxWriter,
}

impl XlsxSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflate (the default) or store package entries
    pub fn with_compression(compress: bool) -> Self {
        Self {
            writer: XlsxWriter::new().with_compression(compress),
        }
    }
}

impl DocumentSerializer for XlsxSerializer {
    fn serialize(&self, workbook: &Workbook) -> Result<Vec<u8>> {
        Ok(self.writer.to_bytes(workbook)?)
    }

    fn images_supported(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let caps = Capabilities::of(&XlsxSerializer::new());
        assert!(!caps.charts);
        assert!(caps.images);
    }

    #[test]
    fn test_serialize_produces_zip() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet("Data").unwrap();
        let bytes = XlsxSerializer::new().serialize(&workbook).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
