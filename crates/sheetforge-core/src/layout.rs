//! Sheet-level view, print and protection settings

/// Frozen panes, expressed as the first unfrozen cell
///
/// `row = 1, col = 0` keeps the first row visible while scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePanes {
    /// First unfrozen row (number of frozen rows)
    pub row: u32,
    /// First unfrozen column (number of frozen columns)
    pub col: u16,
}

impl FreezePanes {
    /// The first scrollable cell as an A1 reference
    pub fn top_left_cell(&self) -> String {
        crate::CellAddress::new(self.row, self.col).to_a1_string()
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrientation {
    /// Taller than wide
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

impl PageOrientation {
    /// Value of the `orientation` attribute
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            PageOrientation::Portrait => "portrait",
            PageOrientation::Landscape => "landscape",
        }
    }
}

/// Print margins in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMargins {
    /// Top margin
    pub top: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left margin
    pub left: f64,
    /// Right margin
    pub right: f64,
    /// Distance from the top edge to the header
    pub header: f64,
    /// Distance from the bottom edge to the footer
    pub footer: f64,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: 0.75,
            bottom: 0.75,
            left: 0.7,
            right: 0.7,
            header: 0.3,
            footer: 0.3,
        }
    }
}

/// Print settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageSetup {
    /// Portrait or landscape
    pub orientation: PageOrientation,
    /// Paper size code (1 = Letter, 9 = A4); `None` leaves the application default
    pub paper_size: Option<u32>,
    /// Scale to fit `fit_to_width` x `fit_to_height` pages
    pub fit_to_page: bool,
    /// Pages across, when fitting to page
    pub fit_to_width: Option<u32>,
    /// Pages down, when fitting to page
    pub fit_to_height: Option<u32>,
    /// Margins in inches
    pub margins: PageMargins,
}

/// Print header and footer texts using the `&L`/`&C`/`&R` codes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderFooter {
    /// Header on odd (or all) pages
    pub odd_header: Option<String>,
    /// Footer on odd (or all) pages
    pub odd_footer: Option<String>,
    /// Header on even pages
    pub even_header: Option<String>,
    /// Footer on even pages
    pub even_footer: Option<String>,
}

impl HeaderFooter {
    /// Distinct even-page texts were given
    pub fn different_odd_even(&self) -> bool {
        self.even_header.is_some() || self.even_footer.is_some()
    }

    /// True when no header or footer is set
    pub fn is_empty(&self) -> bool {
        self.odd_header.is_none()
            && self.odd_footer.is_none()
            && self.even_header.is_none()
            && self.even_footer.is_none()
    }
}

/// Sheet lock plus the actions users may still perform
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetProtection {
    /// Plain password; empty means locked without a password
    pub password: String,
    /// Allow formatting cells
    pub format_cells: bool,
    /// Allow formatting columns
    pub format_columns: bool,
    /// Allow formatting rows
    pub format_rows: bool,
    /// Allow inserting columns
    pub insert_columns: bool,
    /// Allow inserting rows
    pub insert_rows: bool,
    /// Allow deleting columns
    pub delete_columns: bool,
    /// Allow deleting rows
    pub delete_rows: bool,
}

impl SheetProtection {
    /// Protection with a password and every permission denied
    pub fn with_password<S: Into<String>>(password: S) -> Self {
        Self {
            password: password.into(),
            ..Default::default()
        }
    }

    /// Legacy 16-bit sheet password verifier, or `None` for an empty password
    pub fn password_hash(&self) -> Option<u16> {
        if self.password.is_empty() {
            return None;
        }
        let bytes = self.password.as_bytes();
        let mut hash: u16 = 0;
        for &b in bytes.iter().rev() {
            hash = ((hash >> 14) & 0x01) | ((hash << 1) & 0x7FFF);
            hash ^= u16::from(b);
        }
        hash = ((hash >> 14) & 0x01) | ((hash << 1) & 0x7FFF);
        hash ^= bytes.len() as u16;
        hash ^= 0xCE4B;
        Some(hash)
    }
}

/// A contiguous band of rows or columns sharing one outline level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineGroup {
    /// First index (0-based, inclusive)
    pub start: u32,
    /// Last index (0-based, inclusive)
    pub end: u32,
    /// Hide the grouped rows or columns
    pub collapsed: bool,
}

impl OutlineGroup {
    /// Create a group over an inclusive span
    pub fn new(start: u32, end: u32, collapsed: bool) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            collapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash() {
        assert_eq!(SheetProtection::with_password("test").password_hash(), Some(0xCBEB));
        assert_eq!(SheetProtection::default().password_hash(), None);
    }

    #[test]
    fn test_freeze_top_left() {
        let panes = FreezePanes { row: 1, col: 27 };
        assert_eq!(panes.top_left_cell(), "AB2");
    }
}
