//! Request validation
//!
//! [`validate`] walks an untyped JSON request against the workbook grammar
//! and reports every offending field as `path: message`, then hands back
//! the typed [`WorkbookConfig`] with defaults applied. Nothing is generated
//! unless validation passes.

use serde_json::{Map, Value};

use crate::error::{ValidationErrors, ValidationIssue};
use crate::schema::WorkbookConfig;

const LAYOUTS: &[&str] = &["table", "form", "dashboard", "report", "calendar"];
const COLUMN_TYPES: &[&str] = &[
    "text",
    "number",
    "currency",
    "percentage",
    "date",
    "datetime",
    "boolean",
    "formula",
];
const VALIDATION_TYPES: &[&str] = &["list", "whole", "decimal", "date", "textLength", "custom"];
const RULE_TYPES: &[&str] = &["cellIs", "expression", "colorScale", "dataBar", "iconSet"];
const RULE_OPERATORS: &[&str] = &[
    "greaterThan",
    "lessThan",
    "greaterThanOrEqual",
    "lessThanOrEqual",
    "between",
    "notBetween",
    "equal",
    "notEqual",
    "containsText",
];
const THRESHOLD_TYPES: &[&str] = &["min", "max", "num", "percent", "percentile"];
const CHART_TYPES: &[&str] = &["bar", "column", "line", "pie", "scatter", "area", "doughnut"];
const LEGEND_POSITIONS: &[&str] = &["top", "bottom", "left", "right", "none"];
const HORIZONTAL: &[&str] = &["left", "center", "right", "justify"];
const VERTICAL: &[&str] = &["top", "middle", "bottom"];
const ORIENTATIONS: &[&str] = &["portrait", "landscape"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const STORAGE_HINTS: &[&str] = &["s3", "local"];

/// Outcome of [`validate_partial`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check `raw` against the full grammar and return the typed request
pub fn validate(raw: &Value) -> Result<WorkbookConfig, ValidationErrors> {
    let mut checker = Checker::new(false);
    checker.workbook(raw);
    if !checker.errors.is_empty() {
        return Err(checker.errors);
    }
    serde_json::from_value(raw.clone()).map_err(|e| ValidationErrors::single("", e.to_string()))
}

/// Same checks as [`validate`] without requiring the top-level fields
///
/// Used to inspect drafts; the result carries messages only.
pub fn validate_partial(raw: &Value) -> PartialValidation {
    let mut checker = Checker::new(true);
    checker.workbook(raw);
    PartialValidation {
        valid: checker.errors.is_empty(),
        errors: checker
            .errors
            .issues()
            .iter()
            .map(|issue| issue.message.clone())
            .collect(),
    }
}

fn join(path: &str, key: impl std::fmt::Display) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

struct Checker {
    partial: bool,
    errors: ValidationErrors,
}

impl Checker {
    fn new(partial: bool) -> Self {
        Self {
            partial,
            errors: ValidationErrors::new(),
        }
    }

    fn fail<M: Into<String>>(&mut self, path: &str, message: M) {
        self.errors.push(ValidationIssue::new(path, message));
    }

    fn mismatch(&mut self, path: &str, expected: &str, got: &Value) {
        self.fail(path, format!("expected {}, got {}", expected, type_name(got)));
    }

    fn object<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.mismatch(path, "object", other);
                None
            }
        }
    }

    /// Look up `key`, reporting it when required and absent
    fn field<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() && required {
            self.fail(&join(path, key), "required");
        }
        value
    }

    fn string<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Option<&'v str> {
        match self.field(obj, path, key, required)? {
            Value::String(s) => Some(s),
            other => {
                self.mismatch(&join(path, key), "string", other);
                None
            }
        }
    }

    fn number(&mut self, obj: &Map<String, Value>, path: &str, key: &str, required: bool) {
        if let Some(value) = self.field(obj, path, key, required) {
            if !value.is_number() {
                self.mismatch(&join(path, key), "number", value);
            }
        }
    }

    fn boolean(&mut self, obj: &Map<String, Value>, path: &str, key: &str) {
        if let Some(value) = self.field(obj, path, key, false) {
            if !value.is_boolean() {
                self.mismatch(&join(path, key), "boolean", value);
            }
        }
    }

    /// Whole number no smaller than `min`
    fn integer_value(&mut self, path: &str, value: &Value, min: u64) {
        match value.as_u64() {
            Some(n) if n >= min && n <= u64::from(u32::MAX) => {}
            _ if value.is_number() => {
                self.fail(path, format!("expected an integer >= {}", min));
            }
            _ => self.mismatch(path, "number", value),
        }
    }

    fn integer(&mut self, obj: &Map<String, Value>, path: &str, key: &str, required: bool, min: u64) {
        if let Some(value) = self.field(obj, path, key, required) {
            self.integer_value(&join(path, key), value, min);
        }
    }

    fn one_of(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
        allowed: &[&str],
    ) {
        let Some(value) = self.string(obj, path, key, required) else {
            return;
        };
        if !allowed.contains(&value) {
            let expected = allowed
                .iter()
                .map(|a| format!("'{}'", a))
                .collect::<Vec<_>>()
                .join(" | ");
            self.fail(
                &join(path, key),
                format!("expected one of {}, got '{}'", expected, value),
            );
        }
    }

    fn array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Option<&'v Vec<Value>> {
        match self.field(obj, path, key, required)? {
            Value::Array(items) => Some(items),
            other => {
                self.mismatch(&join(path, key), "array", other);
                None
            }
        }
    }

    fn nested<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Option<(String, &'v Map<String, Value>)> {
        let value = self.field(obj, path, key, required)?;
        let child = join(path, key);
        let map = self.object(&child, value)?;
        Some((child, map))
    }

    fn string_list(&mut self, obj: &Map<String, Value>, path: &str, key: &str) {
        let Some(items) = self.array(obj, path, key, false) else {
            return;
        };
        let base = join(path, key);
        for (i, item) in items.iter().enumerate() {
            if !item.is_string() {
                self.mismatch(&join(&base, i), "string", item);
            }
        }
    }

    fn workbook(&mut self, raw: &Value) {
        let Some(root) = self.object("", raw) else {
            return;
        };
        let required = !self.partial;

        self.string(root, "", "file_name", required);

        if let Some(sheets) = self.array(root, "", "sheets", required) {
            if sheets.is_empty() {
                self.fail("sheets", "must contain at least 1 sheet");
            }
            for (i, sheet) in sheets.iter().enumerate() {
                self.sheet(&join("sheets", i), sheet);
            }
        }

        if let Some((path, meta)) = self.nested(root, "", "metadata", false) {
            for key in ["title", "subject", "author", "description", "company", "category"] {
                self.string(meta, &path, key, false);
            }
            self.string_list(meta, &path, "keywords");
        }

        if let Some((path, options)) = self.nested(root, "", "options", false) {
            self.one_of(options, &path, "storage", false, STORAGE_HINTS);
            self.boolean(options, &path, "compress");
            self.string(options, &path, "password", false);
        }
    }

    fn sheet(&mut self, path: &str, value: &Value) {
        let Some(sheet) = self.object(path, value) else {
            return;
        };
        self.string(sheet, path, "name", true);
        self.one_of(sheet, path, "layout", false, LAYOUTS);

        if let Some(columns) = self.array(sheet, path, "columns", true) {
            let base = join(path, "columns");
            for (i, column) in columns.iter().enumerate() {
                self.column(&join(&base, i), column);
            }
        }

        if let Some(rows) = self.array(sheet, path, "data", true) {
            let base = join(path, "data");
            for (i, row) in rows.iter().enumerate() {
                self.object(&join(&base, i), row);
            }
        }

        if let Some((fmt_path, formatting)) = self.nested(sheet, path, "formatting", false) {
            self.formatting(&fmt_path, formatting);
        }

        if let Some(charts) = self.array(sheet, path, "charts", false) {
            let base = join(path, "charts");
            for (i, chart) in charts.iter().enumerate() {
                self.chart(&join(&base, i), chart);
            }
        }

        if let Some(images) = self.array(sheet, path, "images", false) {
            let base = join(path, "images");
            for (i, image) in images.iter().enumerate() {
                self.image(&join(&base, i), image);
            }
        }

        self.nested(sheet, path, "metadata", false);
    }

    fn column(&mut self, path: &str, value: &Value) {
        let Some(column) = self.object(path, value) else {
            return;
        };
        self.string(column, path, "header", true);
        self.string(column, path, "key", true);
        self.number(column, path, "width", false);
        self.one_of(column, path, "type", false, COLUMN_TYPES);
        self.string(column, path, "format", false);

        if let Some((style_path, style)) = self.nested(column, path, "style", false) {
            self.style(&style_path, style);
        }

        if let Some((v_path, validation)) = self.nested(column, path, "validation", false) {
            self.one_of(validation, &v_path, "type", true, VALIDATION_TYPES);
            for key in [
                "operator",
                "formula1",
                "formula2",
                "promptTitle",
                "prompt",
                "errorTitle",
                "error",
            ] {
                self.string(validation, &v_path, key, false);
            }
            for key in ["allowBlank", "showInputMessage", "showErrorMessage"] {
                self.boolean(validation, &v_path, key);
            }
        }
    }

    fn color(&mut self, obj: &Map<String, Value>, path: &str, key: &str, required: bool) {
        if let Some((color_path, color)) = self.nested(obj, path, key, required) {
            self.string(color, &color_path, "argb", true);
        }
    }

    fn style(&mut self, path: &str, style: &Map<String, Value>) {
        if let Some((font_path, font)) = self.nested(style, path, "font", false) {
            self.font(&font_path, font);
        }

        if let Some((align_path, alignment)) = self.nested(style, path, "alignment", false) {
            self.one_of(alignment, &align_path, "horizontal", false, HORIZONTAL);
            self.one_of(alignment, &align_path, "vertical", false, VERTICAL);
            self.boolean(alignment, &align_path, "wrapText");
        }

        if let Some((fill_path, fill)) = self.nested(style, path, "fill", false) {
            self.one_of(fill, &fill_path, "type", true, &["pattern"]);
            self.string(fill, &fill_path, "pattern", true);
            self.color(fill, &fill_path, "fgColor", true);
            self.color(fill, &fill_path, "bgColor", false);
        }

        if let Some((border_path, border)) = self.nested(style, path, "border", false) {
            self.border(&border_path, border);
        }
    }

    fn font(&mut self, path: &str, font: &Map<String, Value>) {
        self.string(font, path, "name", false);
        self.number(font, path, "size", false);
        for key in ["bold", "italic", "underline"] {
            self.boolean(font, path, key);
        }
        self.color(font, path, "color", false);
    }

    fn border(&mut self, path: &str, border: &Map<String, Value>) {
        for side in ["top", "bottom", "left", "right"] {
            if let Some((edge_path, edge)) = self.nested(border, path, side, false) {
                self.string(edge, &edge_path, "style", true);
                self.color(edge, &edge_path, "color", true);
            }
        }
    }

    fn formatting(&mut self, path: &str, fmt: &Map<String, Value>) {
        self.string(fmt, path, "freeze_panes", false);
        self.boolean(fmt, path, "auto_filter");

        if let Some((ps_path, setup)) = self.nested(fmt, path, "page_setup", false) {
            self.one_of(setup, &ps_path, "orientation", false, ORIENTATIONS);
            self.boolean(setup, &ps_path, "fitToPage");
            for key in ["fitToWidth", "fitToHeight", "paperSize"] {
                self.integer(setup, &ps_path, key, false, 0);
            }
            if let Some((m_path, margins)) = self.nested(setup, &ps_path, "margins", false) {
                for key in ["top", "bottom", "left", "right", "header", "footer"] {
                    self.number(margins, &m_path, key, false);
                }
            }
        }

        if let Some((hf_path, hf)) = self.nested(fmt, path, "header_footer", false) {
            for key in ["oddHeader", "oddFooter", "evenHeader", "evenFooter"] {
                self.string(hf, &hf_path, key, false);
            }
        }

        if let Some((p_path, protection)) = self.nested(fmt, path, "protection", false) {
            self.string(protection, &p_path, "password", false);
            for key in [
                "sheet",
                "formatCells",
                "formatColumns",
                "formatRows",
                "insertColumns",
                "insertRows",
                "deleteColumns",
                "deleteRows",
            ] {
                self.boolean(protection, &p_path, key);
            }
        }

        if let Some((t_path, totals)) = self.nested(fmt, path, "totals_row", false) {
            for (key, formula) in totals {
                if !formula.is_string() {
                    self.mismatch(&join(&t_path, key), "string", formula);
                }
            }
        }

        if let Some(rules) = self.array(fmt, path, "conditional_formatting", false) {
            let base = join(path, "conditional_formatting");
            for (i, rule) in rules.iter().enumerate() {
                self.rule(&join(&base, i), rule);
            }
        }

        self.string_list(fmt, path, "merged_cells");

        if let Some((h_path, heights)) = self.nested(fmt, path, "row_heights", false) {
            for (row, height) in heights {
                if !height.is_number() {
                    self.mismatch(&join(&h_path, row), "number", height);
                }
            }
        }

        if let Some(rows) = self.array(fmt, path, "hidden_rows", false) {
            let base = join(path, "hidden_rows");
            for (i, row) in rows.iter().enumerate() {
                self.integer_value(&join(&base, i), row, 1);
            }
        }

        self.string_list(fmt, path, "hidden_columns");

        if let Some(groups) = self.array(fmt, path, "grouped_rows", false) {
            let base = join(path, "grouped_rows");
            for (i, group) in groups.iter().enumerate() {
                let g_path = join(&base, i);
                if let Some(g) = self.object(&g_path, group) {
                    self.integer(g, &g_path, "start", true, 1);
                    self.integer(g, &g_path, "end", true, 1);
                    self.boolean(g, &g_path, "collapsed");
                }
            }
        }

        if let Some(groups) = self.array(fmt, path, "grouped_columns", false) {
            let base = join(path, "grouped_columns");
            for (i, group) in groups.iter().enumerate() {
                let g_path = join(&base, i);
                if let Some(g) = self.object(&g_path, group) {
                    self.string(g, &g_path, "start", true);
                    self.string(g, &g_path, "end", true);
                    self.boolean(g, &g_path, "collapsed");
                }
            }
        }
    }

    fn rule(&mut self, path: &str, value: &Value) {
        let Some(rule) = self.object(path, value) else {
            return;
        };
        self.string(rule, path, "range", true);
        self.one_of(rule, path, "type", true, RULE_TYPES);
        self.one_of(rule, path, "operator", false, RULE_OPERATORS);

        if let Some(formulae) = self.array(rule, path, "formulae", false) {
            let base = join(path, "formulae");
            for (i, term) in formulae.iter().enumerate() {
                if !(term.is_string() || term.is_number()) {
                    self.mismatch(&join(&base, i), "string or number", term);
                }
            }
        }

        if let Some((s_path, style)) = self.nested(rule, path, "style", false) {
            if let Some((font_path, font)) = self.nested(style, &s_path, "font", false) {
                self.font(&font_path, font);
            }
            if let Some((fill_path, fill)) = self.nested(style, &s_path, "fill", false) {
                self.string(fill, &fill_path, "type", false);
                self.string(fill, &fill_path, "pattern", false);
                self.color(fill, &fill_path, "fgColor", false);
                self.color(fill, &fill_path, "bgColor", false);
            }
            if let Some((border_path, border)) = self.nested(style, &s_path, "border", false) {
                self.border(&border_path, border);
            }
        }

        if let Some((cs_path, scale)) = self.nested(rule, path, "colorScale", false) {
            if let Some(stops) = self.array(scale, &cs_path, "cfvo", true) {
                let base = join(&cs_path, "cfvo");
                for (i, stop) in stops.iter().enumerate() {
                    let stop_path = join(&base, i);
                    if let Some(s) = self.object(&stop_path, stop) {
                        self.one_of(s, &stop_path, "type", true, THRESHOLD_TYPES);
                        self.number(s, &stop_path, "value", false);
                    }
                }
            }
            if let Some(colors) = self.array(scale, &cs_path, "color", true) {
                let base = join(&cs_path, "color");
                for (i, color) in colors.iter().enumerate() {
                    let color_path = join(&base, i);
                    if let Some(c) = self.object(&color_path, color) {
                        self.string(c, &color_path, "argb", true);
                    }
                }
            }
        }

        if let Some((db_path, bar)) = self.nested(rule, path, "dataBar", false) {
            self.integer(bar, &db_path, "minLength", false, 0);
            self.integer(bar, &db_path, "maxLength", false, 0);
            for key in ["showValue", "gradient", "border", "negativeBarColorSameAsPositive"] {
                self.boolean(bar, &db_path, key);
            }
        }
    }

    fn anchor(&mut self, obj: &Map<String, Value>, path: &str) {
        if let Some((a_path, anchor)) = self.nested(obj, path, "position", true) {
            self.string(anchor, &a_path, "from", true);
            self.string(anchor, &a_path, "to", true);
        }
    }

    fn chart(&mut self, path: &str, value: &Value) {
        let Some(chart) = self.object(path, value) else {
            return;
        };
        self.one_of(chart, path, "type", true, CHART_TYPES);
        self.anchor(chart, path);
        self.string(chart, path, "title", false);

        if let Some((d_path, data)) = self.nested(chart, path, "data", true) {
            self.string(data, &d_path, "categories", true);
            if let Some(series) = self.array(data, &d_path, "values", true) {
                let base = join(&d_path, "values");
                for (i, s) in series.iter().enumerate() {
                    let s_path = join(&base, i);
                    if let Some(s) = self.object(&s_path, s) {
                        self.string(s, &s_path, "name", true);
                        self.string(s, &s_path, "range", true);
                    }
                }
            }
        }

        if let Some((o_path, options)) = self.nested(chart, path, "options", false) {
            if let Some((l_path, legend)) = self.nested(options, &o_path, "legend", false) {
                self.one_of(legend, &l_path, "position", false, LEGEND_POSITIONS);
            }
            if let Some((ax_path, axes)) = self.nested(options, &o_path, "axes", false) {
                for axis in ["x", "y"] {
                    if let Some((a_path, a)) = self.nested(axes, &ax_path, axis, false) {
                        self.string(a, &a_path, "title", false);
                    }
                }
            }
        }
    }

    fn image(&mut self, path: &str, value: &Value) {
        let Some(image) = self.object(path, value) else {
            return;
        };
        self.anchor(image, path);
        self.string(image, path, "url", false);
        self.string(image, path, "base64", false);
        self.one_of(image, path, "extension", false, IMAGE_EXTENSIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SheetLayout;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "file_name": "t.xlsx",
            "sheets": [{
                "name": "S",
                "columns": [{ "header": "Qty", "key": "qty", "type": "number" }],
                "data": [{ "qty": 5 }]
            }]
        })
    }

    #[test]
    fn test_valid_request() {
        let config = validate(&minimal()).unwrap();
        assert_eq!(config.file_name, "t.xlsx");
        assert_eq!(config.sheets[0].layout, SheetLayout::Table);
        assert_eq!(config.sheets[0].columns[0].width, 15.0);
    }

    #[test]
    fn test_errors_are_accumulated_with_paths() {
        let raw = json!({
            "sheets": [{
                "name": 3,
                "layout": "grid",
                "columns": [{ "header": "A", "width": "wide" }],
                "data": [1]
            }]
        });
        let errors = validate(&raw).unwrap_err();
        let messages = errors.messages();

        assert_eq!(
            messages,
            vec![
                "file_name: required".to_string(),
                "sheets.0.name: expected string, got number".to_string(),
                "sheets.0.layout: expected one of 'table' | 'form' | 'dashboard' | 'report' | 'calendar', got 'grid'".to_string(),
                "sheets.0.columns.0.key: required".to_string(),
                "sheets.0.columns.0.width: expected number, got string".to_string(),
                "sheets.0.data.0: expected object, got number".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_sheet_list() {
        let errors = validate(&json!({ "file_name": "x.xlsx", "sheets": [] })).unwrap_err();
        assert_eq!(errors.messages(), vec!["sheets: must contain at least 1 sheet"]);
    }

    #[test]
    fn test_nested_formatting_errors() {
        let mut raw = minimal();
        raw["sheets"][0]["formatting"] = json!({
            "hidden_rows": [2, 0, 1.5],
            "totals_row": { "qty": 7 },
            "conditional_formatting": [{ "range": "A2:A3", "type": "glow" }],
            "grouped_rows": [{ "start": 2 }]
        });
        let messages = validate(&raw).unwrap_err().messages();

        assert!(messages.contains(&"sheets.0.formatting.totals_row.qty: expected string, got number".to_string()));
        assert!(messages.contains(&"sheets.0.formatting.hidden_rows.1: expected an integer >= 1".to_string()));
        assert!(messages.contains(&"sheets.0.formatting.hidden_rows.2: expected an integer >= 1".to_string()));
        assert!(messages.iter().any(|m| m.starts_with("sheets.0.formatting.conditional_formatting.0.type")));
        assert!(messages.contains(&"sheets.0.formatting.grouped_rows.0.end: required".to_string()));
    }

    #[test]
    fn test_style_errors() {
        let mut raw = minimal();
        raw["sheets"][0]["columns"][0]["style"] = json!({
            "alignment": { "vertical": "center" },
            "fill": { "type": "gradient", "pattern": "solid" }
        });
        let messages = validate(&raw).unwrap_err().messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("sheets.0.columns.0.style.alignment.vertical"));
        assert!(messages[1].starts_with("sheets.0.columns.0.style.fill.type"));
        assert_eq!(messages[2], "sheets.0.columns.0.style.fill.fgColor: required");
    }

    #[test]
    fn test_partial_skips_top_level_requirements() {
        let result = validate_partial(&json!({ "metadata": { "title": "Draft" } }));
        assert!(result.valid);
        assert!(result.errors.is_empty());

        let result = validate_partial(&json!({ "sheets": [{ "name": "S" }] }));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["required", "required"]);
    }

    #[test]
    fn test_non_object_root() {
        let errors = validate(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.messages(), vec!["expected object, got array"]);
    }
}
