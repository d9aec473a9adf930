//! Number format codes

/// Display format applied to a cell's value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// The `General` format
    #[default]
    General,
    /// Format code such as `#,##0` or `dd/mm/yyyy`
    Custom(String),
}

impl NumberFormat {
    /// Built-in ids that SpreadsheetML defines without a `numFmt` entry
    const BUILT_INS: [(u32, &'static str); 8] = [
        (1, "0"),
        (2, "0.00"),
        (3, "#,##0"),
        (4, "#,##0.00"),
        (9, "0%"),
        (10, "0.00%"),
        (14, "mm-dd-yy"),
        (49, "@"),
    ];

    /// Build from a code; `"General"` (any case) maps to [`NumberFormat::General`]
    pub fn from_code<S: Into<String>>(code: S) -> Self {
        let code = code.into();
        if code.eq_ignore_ascii_case("general") || code.is_empty() {
            NumberFormat::General
        } else {
            NumberFormat::Custom(code)
        }
    }

    /// The format behind a built-in id, for the ids this table knows
    pub fn from_builtin_id(id: u32) -> Option<Self> {
        if id == 0 {
            return Some(NumberFormat::General);
        }
        Self::BUILT_INS
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, code)| NumberFormat::Custom((*code).to_string()))
    }

    /// Format code as written to the styles part
    pub fn format_code(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::Custom(code) => code,
        }
    }

    /// Built-in numFmtId for this code, if one exists
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(0),
            NumberFormat::Custom(code) => Self::BUILT_INS
                .iter()
                .find(|(_, c)| c == code)
                .map(|(id, _)| *id),
        }
    }

    /// True for `General`
    pub fn is_general(&self) -> bool {
        matches!(self, NumberFormat::General)
    }
}
