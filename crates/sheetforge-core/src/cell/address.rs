//! A1-style cell addresses and rectangular ranges

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A single cell location (e.g. "B12")
///
/// Stored 0-based; rendered 1-based with column letters. Columns use the
/// full bijective base-26 alphabet, so "AA1" and "XFD1" parse as expected.
/// `$` markers are accepted on input and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based, A=0)
    pub col: u16,
}

impl CellAddress {
    /// Create an address from zero-based row and column
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an address such as `"C7"` or `"$AB$12"`
    ///
    /// # Examples
    /// ```
    /// use sheetforge_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("AA3").unwrap();
    /// assert_eq!((addr.row, addr.col), (2, 26));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let cleaned: String = text.chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(|| Error::InvalidAddress(format!("no row number in '{}'", text)))?;
        let (letters, digits) = cleaned.split_at(split);

        if letters.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                text
            )));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                text
            )));
        }

        let col = column_index(letters)?;
        let row_number: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", text)))?;
        let row = row_index(row_number)?;

        Ok(Self { row, col })
    }

    /// Render as `"B12"`
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row + 1)
    }

    /// 1-based row number as shown in a spreadsheet UI
    pub fn row_number(&self) -> u32 {
        self.row + 1
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Convert a 0-based column index to letters (0 = A, 25 = Z, 26 = AA)
pub fn column_letters(col: u16) -> String {
    let mut n = u32::from(col) + 1;
    let mut letters = Vec::with_capacity(3);
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a 0-based index (A = 0, AA = 26), case-insensitive
pub fn column_index(letters: &str) -> Result<u16> {
    let letters = letters.trim();
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut acc: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}'",
                ch
            )));
        }
        acc = acc * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        if acc > u32::from(MAX_COLS) {
            return Err(Error::ColumnOutOfBounds(acc - 1, MAX_COLS - 1));
        }
    }

    Ok((acc - 1) as u16)
}

/// Convert a 1-based row number to a 0-based index with bounds checking
pub fn row_index(row_number: u32) -> Result<u32> {
    if row_number == 0 {
        return Err(Error::InvalidAddress("row numbers start at 1".into()));
    }
    let row = row_number - 1;
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    Ok(row)
}

/// A rectangular span of cells (e.g. "A2:D100")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Build a range from two corners in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Range from zero-based corner indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Range covering one cell
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse `"A1:B10"` or a lone `"C3"`
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let mut parts = text.split(':');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(Error::InvalidRange(text.to_string()));
        }

        let start = CellAddress::parse(first)
            .map_err(|e| Error::InvalidRange(format!("{}: {}", text, e)))?;
        match second {
            Some(end) => {
                let end = CellAddress::parse(end)
                    .map_err(|e| Error::InvalidRange(format!("{}: {}", text, e)))?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(start)),
        }
    }

    /// True when start and end are the same cell
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Whether `addr` falls inside the range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    /// Whether the two ranges share at least one cell
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    /// Move every row at or below `at` down by `count`
    ///
    /// A range straddling `at` grows; one entirely above it is unchanged.
    pub fn shift_rows(&self, at: u32, count: u32) -> Self {
        let shift = |row: u32| if row >= at { row + count } else { row };
        Self {
            start: CellAddress::new(shift(self.start.row), self.start.col),
            end: CellAddress::new(shift(self.end.row), self.end.col),
        }
    }

    /// Iterate all addresses row by row
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> {
        let (cols_from, cols_to) = (self.start.col, self.end.col);
        (self.start.row..=self.end.row)
            .flat_map(move |row| (cols_from..=cols_to).map(move |col| CellAddress::new(row, col)))
    }

    /// Always `A1:B2` form, even for a single cell
    pub fn to_a1_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
        assert_eq!(column_letters(16383), "XFD");
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A").unwrap(), 0);
        assert_eq!(column_index("z").unwrap(), 25);
        assert_eq!(column_index("AA").unwrap(), 26);
        assert_eq!(column_index("ZZ").unwrap(), 701);
        assert_eq!(column_index("XFD").unwrap(), 16383);
        assert!(column_index("XFE").is_err());
        assert!(column_index("A1").is_err());
        assert!(column_index("").is_err());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse("B12").unwrap(), CellAddress::new(11, 1));
        assert_eq!(CellAddress::parse("AA2").unwrap(), CellAddress::new(1, 26));
        assert_eq!(CellAddress::parse("$C$3").unwrap(), CellAddress::new(2, 2));
        assert_eq!(
            CellAddress::parse("XFD1048576").unwrap(),
            CellAddress::new(1_048_575, 16_383)
        );
    }

    #[test]
    fn test_parse_address_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("12").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse("A1048577").is_err());
    }

    #[test]
    fn test_address_display() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(99, 27).to_string(), "AB100");
    }

    #[test]
    fn test_range_parse_normalizes() {
        let range = CellRange::parse("D4:B2").unwrap();
        assert_eq!(range.start, CellAddress::new(1, 1));
        assert_eq!(range.end, CellAddress::new(3, 3));
        assert_eq!(range.to_string(), "B2:D4");

        let single = CellRange::parse("C3").unwrap();
        assert!(single.is_single_cell());
        assert_eq!(single.to_string(), "C3");

        assert!(CellRange::parse("A1:B2:C3").is_err());
        assert!(CellRange::parse("A1:").is_err());
    }

    #[test]
    fn test_range_contains_and_overlaps() {
        let range = CellRange::parse("B2:D4").unwrap();
        assert!(range.contains(&CellAddress::new(2, 2)));
        assert!(!range.contains(&CellAddress::new(0, 0)));
        assert!(range.overlaps(&CellRange::parse("D4:E5").unwrap()));
        assert!(!range.overlaps(&CellRange::parse("E1:F9").unwrap()));
    }

    #[test]
    fn test_range_shift_rows() {
        let range = CellRange::parse("A2:C5").unwrap();
        assert_eq!(range.shift_rows(0, 3).to_string(), "A5:C8");
        assert_eq!(range.shift_rows(3, 2).to_string(), "A2:C7");
        assert_eq!(range.shift_rows(9, 2).to_string(), "A2:C5");
    }

    #[test]
    fn test_range_cells() {
        let cells: Vec<_> = CellRange::parse("A1:B2").unwrap().cells().collect();
        assert_eq!(
            cells,
            vec![
                CellAddress::new(0, 0),
                CellAddress::new(0, 1),
                CellAddress::new(1, 0),
                CellAddress::new(1, 1),
            ]
        );
    }
}
