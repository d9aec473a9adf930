//! Embedded pictures

use crate::cell::CellAddress;

/// Supported picture formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF
    Gif,
}

impl ImageFormat {
    /// Map a file extension (`png`, `jpg`, `jpeg`, `gif`) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Sniff the format from the leading magic bytes
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF8") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    /// MIME type for the content types part
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

/// A picture anchored between two cells
#[derive(Debug, Clone, PartialEq)]
pub struct SheetImage {
    /// Top-left cell
    pub from: CellAddress,
    /// Bottom-right cell
    pub to: CellAddress,
    /// Picture format
    pub format: ImageFormat,
    /// Raw image bytes
    pub data: Vec<u8>,
}

impl SheetImage {
    /// Create an image spanning `from` to `to`
    pub fn new(from: CellAddress, to: CellAddress, format: ImageFormat, data: Vec<u8>) -> Self {
        Self {
            from,
            to,
            format,
            data,
        }
    }

    /// Move the anchor down when rows are inserted above it
    pub fn shift_rows(&mut self, at: u32, count: u32) {
        for addr in [&mut self.from, &mut self.to] {
            if addr.row >= at {
                addr.row += count;
            }
        }
    }
}
