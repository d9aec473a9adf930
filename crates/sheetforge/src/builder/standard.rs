//! The base sheet pipeline
//!
//! Per sheet: columns and header row, data rows with per-column number
//! format, style and validation, then sheet formatting in a fixed order,
//! then charts and images. Row indices computed here are final for the
//! plain table layout; decorators that insert rows shift everything with
//! [`Worksheet::insert_rows`].

use base64::Engine;
use chrono::Utc;
use log::{debug, warn};

use sheetforge_core::cell::{column_index, row_index};
use sheetforge_core::{
    CellAddress, CellRange, CfColorValue, CfOperator, CfRuleType, CfValueType, Chart,
    ChartAnchor, ChartType, Color, ConditionalFormatRule, DataBarOptions, DataSeries,
    DataValidation, FillStyle, HeaderFooter, HorizontalAlignment, IconSetStyle, ImageFormat,
    LegendPosition, NumberFormat, OutlineGroup, PageMargins, PageOrientation, PageSetup,
    SheetImage, SheetProtection, Style, ValidationOperator, ValidationType, VerticalAlignment,
    Workbook, Worksheet,
};

use super::{apply_metadata, column_at, data_row_at, SheetBuilder};
use crate::error::{GenerateError, Result};
use crate::format::{default_format, to_cell_value};
use crate::schema::{
    AnchorConfig, ChartConfig, ChartKind, ConditionalFormatConfig, FormattingConfig, FormulaTerm,
    ImageConfig, LegendPlacement, Orientation, RuleKind, RuleOperator,
    SheetConfig, ThresholdKind, ValidationConfig, ValidationKind, WorkbookConfig,
};
use crate::serializer::Capabilities;
use crate::style_map::{apply_style, parse_color, rule_style};

pub const HEADER_FILL: Color = Color::argb(0xFF, 0xE0, 0xE0, 0xE0);
pub const HEADER_FONT_SIZE: f64 = 11.0;
pub const HEADER_ROW_HEIGHT: f64 = 20.0;

/// Builds table-layout sheets
#[derive(Debug, Clone, Default)]
pub struct StandardBuilder {
    capabilities: Capabilities,
}

impl StandardBuilder {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }
}

impl SheetBuilder for StandardBuilder {
    fn build_sheet(&self, workbook: &mut Workbook, config: &SheetConfig) -> Result<()> {
        let sheet = workbook.add_worksheet(&config.name)?;

        write_header(sheet, config)?;
        write_rows(sheet, config)?;
        attach_validations(sheet, config)?;

        if let Some(formatting) = &config.formatting {
            apply_formatting(sheet, config, formatting)?;
        }
        if !config.charts.is_empty() {
            self.add_charts(sheet, &config.charts)?;
        }
        if !config.images.is_empty() {
            self.add_images(sheet, &config.images)?;
        }
        Ok(())
    }

    fn finalize(&self, workbook: &mut Workbook, config: &WorkbookConfig) -> Result<()> {
        apply_metadata(workbook, config.metadata.as_ref(), Utc::now());
        Ok(())
    }
}

/// Bold, centered, gray header cells; a column's own style is layered on top
fn header_style() -> Style {
    Style::new()
        .bold(true)
        .font_size(HEADER_FONT_SIZE)
        .fill_color(HEADER_FILL)
        .horizontal_alignment(HorizontalAlignment::Center)
        .vertical_alignment(VerticalAlignment::Center)
}

fn write_header(sheet: &mut Worksheet, config: &SheetConfig) -> Result<()> {
    for (i, column) in config.columns.iter().enumerate() {
        let col = column_at(i)?;
        sheet.set_column_width(col, column.width)?;
        sheet.set_cell_value_at(0, col, column.header.as_str())?;

        let mut style = header_style();
        if let Some(overlay) = &column.style {
            apply_style(&mut style, overlay)?;
        }
        sheet.set_cell_style_at(0, col, &style)?;
    }
    sheet.set_row_height(0, HEADER_ROW_HEIGHT)?;
    Ok(())
}

/// Number format plus column style shared by every data cell of a column
fn column_style(config: &SheetConfig, i: usize) -> Result<Style> {
    let column = &config.columns[i];
    let mut style = Style::new();
    if let Some(code) = column.format.as_deref().filter(|f| !f.is_empty()) {
        style.number_format = NumberFormat::from_code(code);
    } else if column.column_type.is_some() {
        style.number_format = NumberFormat::from_code(default_format(column.column_type));
    }
    if let Some(overlay) = &column.style {
        apply_style(&mut style, overlay)?;
    }
    Ok(style)
}

fn write_rows(sheet: &mut Worksheet, config: &SheetConfig) -> Result<()> {
    let styles = (0..config.columns.len())
        .map(|i| column_style(config, i))
        .collect::<Result<Vec<_>>>()?;
    let plain = Style::new();

    for (r, data) in config.data.iter().enumerate() {
        let row = data_row_at(r)?;
        for (i, column) in config.columns.iter().enumerate() {
            let col = column_at(i)?;
            let value = to_cell_value(data.get(&column.key), column.column_type);
            if !value.is_empty() {
                sheet.set_cell_value_at(row, col, value)?;
            }
            if styles[i] != plain {
                sheet.set_cell_style_at(row, col, &styles[i])?;
            }
        }
    }
    Ok(())
}

fn attach_validations(sheet: &mut Worksheet, config: &SheetConfig) -> Result<()> {
    if config.data.is_empty() {
        return Ok(());
    }
    let last_row = data_row_at(config.data.len() - 1)?;
    for (i, column) in config.columns.iter().enumerate() {
        if let Some(rule) = &column.validation {
            let col = column_at(i)?;
            let range = CellRange::from_indices(1, col, last_row, col);
            sheet.add_data_validation(to_validation(rule)?.with_range(range));
        }
    }
    Ok(())
}

fn to_validation(cfg: &ValidationConfig) -> Result<DataValidation> {
    let mut validation = DataValidation::new(match cfg.kind {
        ValidationKind::List => ValidationType::List,
        ValidationKind::Whole => ValidationType::Whole,
        ValidationKind::Decimal => ValidationType::Decimal,
        ValidationKind::Date => ValidationType::Date,
        ValidationKind::TextLength => ValidationType::TextLength,
        ValidationKind::Custom => ValidationType::Custom,
    });
    if let Some(op) = &cfg.operator {
        validation.operator = ValidationOperator::from_name(op).ok_or_else(|| {
            GenerateError::generation(format!("Unknown validation operator '{}'", op))
        })?;
    }
    validation.formula1 = cfg.formula1.clone();
    validation.formula2 = cfg.formula2.clone();
    validation.allow_blank = cfg.allow_blank.unwrap_or(false);
    validation.show_input_message = cfg.show_input_message.unwrap_or(false);
    validation.prompt_title = cfg.prompt_title.clone();
    validation.prompt = cfg.prompt.clone();
    validation.show_error_message = cfg.show_error_message.unwrap_or(false);
    validation.error_title = cfg.error_title.clone();
    validation.error = cfg.error.clone();
    Ok(validation)
}

/// Sheet-level formatting, applied in a fixed order
fn apply_formatting(sheet: &mut Worksheet, config: &SheetConfig, fmt: &FormattingConfig) -> Result<()> {
    let column_count = config.columns.len();

    if let Some(cell) = &fmt.freeze_panes {
        let split = CellAddress::parse(cell)?;
        sheet.set_freeze_panes(split.row, split.col);
    }

    if fmt.auto_filter == Some(true) && column_count > 0 {
        let last = column_at(column_count - 1)?;
        sheet.set_auto_filter(CellRange::from_indices(0, 0, 0, last));
    }

    if let Some(setup) = &fmt.page_setup {
        let mut margins = PageMargins::default();
        if let Some(m) = &setup.margins {
            margins.top = m.top.unwrap_or(margins.top);
            margins.bottom = m.bottom.unwrap_or(margins.bottom);
            margins.left = m.left.unwrap_or(margins.left);
            margins.right = m.right.unwrap_or(margins.right);
            margins.header = m.header.unwrap_or(margins.header);
            margins.footer = m.footer.unwrap_or(margins.footer);
        }
        sheet.set_page_setup(PageSetup {
            orientation: match setup.orientation {
                Some(Orientation::Landscape) => PageOrientation::Landscape,
                _ => PageOrientation::Portrait,
            },
            paper_size: setup.paper_size,
            fit_to_page: setup.fit_to_page.unwrap_or(false),
            fit_to_width: setup.fit_to_width,
            fit_to_height: setup.fit_to_height,
            margins,
        });
    }

    if let Some(hf) = &fmt.header_footer {
        sheet.set_header_footer(HeaderFooter {
            odd_header: hf.odd_header.clone(),
            odd_footer: hf.odd_footer.clone(),
            even_header: hf.even_header.clone(),
            even_footer: hf.even_footer.clone(),
        });
    }

    if let Some(p) = fmt.protection.as_ref().filter(|p| p.sheet == Some(true)) {
        sheet.protect(SheetProtection {
            password: p.password.clone().unwrap_or_default(),
            format_cells: p.format_cells.unwrap_or(false),
            format_columns: p.format_columns.unwrap_or(false),
            format_rows: p.format_rows.unwrap_or(false),
            insert_columns: p.insert_columns.unwrap_or(false),
            insert_rows: p.insert_rows.unwrap_or(false),
            delete_columns: p.delete_columns.unwrap_or(false),
            delete_rows: p.delete_rows.unwrap_or(false),
        });
    }

    if let Some(totals) = &fmt.totals_row {
        let row = data_row_at(config.data.len())?;
        for (key, formula) in totals {
            let Some(i) = config.column_position(key) else {
                debug!("Sheet '{}': totals key '{}' matches no column", config.name, key);
                continue;
            };
            let col = column_at(i)?;
            sheet.set_cell_formula_at(row, col, formula)?;
            sheet.update_cell_style_at(row, col, |style| style.font.bold = true)?;
        }
    }

    for (i, rule) in fmt.conditional_formatting.iter().enumerate() {
        let priority = u32::try_from(i + 1).unwrap_or(u32::MAX);
        sheet.add_conditional_format(to_rule(rule, priority)?);
    }

    for range in &fmt.merged_cells {
        sheet.merge_cells(&CellRange::parse(range)?)?;
    }

    for (row, height) in &fmt.row_heights {
        let number: u32 = row.trim().parse().map_err(|_| {
            GenerateError::generation(format!("Invalid row number '{}' in row_heights", row))
        })?;
        sheet.set_row_height(row_index(number)?, *height)?;
    }

    for row in &fmt.hidden_rows {
        sheet.set_row_hidden(row_index(*row)?, true)?;
    }

    for letters in &fmt.hidden_columns {
        sheet.set_column_hidden(column_index(letters)?, true)?;
    }

    for group in &fmt.grouped_rows {
        sheet.group_rows(OutlineGroup::new(
            row_index(group.start)?,
            row_index(group.end)?,
            group.collapsed.unwrap_or(false),
        ))?;
    }

    for group in &fmt.grouped_columns {
        sheet.group_columns(OutlineGroup::new(
            u32::from(column_index(&group.start)?),
            u32::from(column_index(&group.end)?),
            group.collapsed.unwrap_or(false),
        ))?;
    }

    Ok(())
}

fn to_rule(cfg: &ConditionalFormatConfig, priority: u32) -> Result<ConditionalFormatRule> {
    let formulae: Vec<String> = cfg.formulae.iter().map(FormulaTerm::to_formula).collect();
    let first = || {
        formulae.first().cloned().ok_or_else(|| {
            GenerateError::generation(format!("Rule on {} needs at least one formula", cfg.range))
        })
    };

    let rule_type = match cfg.kind {
        RuleKind::CellIs => match cfg.operator {
            Some(RuleOperator::ContainsText) => CfRuleType::ContainsText { text: first()? },
            Some(op) => {
                let operator = cf_operator(op);
                let formula2 = formulae.get(1).cloned();
                if matches!(operator, CfOperator::Between | CfOperator::NotBetween)
                    && formula2.is_none()
                {
                    return Err(GenerateError::generation(format!(
                        "Rule on {} needs two formulae for {}",
                        cfg.range,
                        operator.xlsx_operator()
                    )));
                }
                CfRuleType::CellIs {
                    operator,
                    formula1: first()?,
                    formula2,
                }
            }
            None => {
                return Err(GenerateError::generation(format!(
                    "cellIs rule on {} needs an operator",
                    cfg.range
                )))
            }
        },
        RuleKind::Expression => CfRuleType::Expression { formula: first()? },
        RuleKind::ColorScale => {
            let scale = cfg.color_scale.as_ref().ok_or_else(|| {
                GenerateError::generation(format!("colorScale rule on {} has no colorScale", cfg.range))
            })?;
            if scale.cfvo.len() != scale.color.len() || !(2..=3).contains(&scale.cfvo.len()) {
                return Err(GenerateError::generation(format!(
                    "colorScale on {} needs 2 or 3 matching cfvo/color entries",
                    cfg.range
                )));
            }
            let colors = scale
                .cfvo
                .iter()
                .zip(&scale.color)
                .map(|(stop, color)| {
                    Ok(CfColorValue::new(
                        threshold_type(stop.kind),
                        stop.value.map(|v| v.to_string()),
                        parse_color(color)?,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            CfRuleType::ColorScale { colors }
        }
        RuleKind::DataBar => {
            let mut options = DataBarOptions::default();
            if let Some(bar) = &cfg.data_bar {
                options.min_length = bar.min_length;
                options.max_length = bar.max_length;
                options.show_value = bar.show_value.unwrap_or(options.show_value);
                options.gradient = bar.gradient.unwrap_or(options.gradient);
                options.border = bar.border.unwrap_or(options.border);
                options.negative_bar_color_same_as_positive = bar
                    .negative_bar_color_same_as_positive
                    .unwrap_or(options.negative_bar_color_same_as_positive);
            }
            if let Some(style) = &cfg.style {
                if let FillStyle::Solid { color } = rule_style(style)?.fill {
                    options.color = color;
                }
            }
            CfRuleType::DataBar(options)
        }
        RuleKind::IconSet => {
            let style = IconSetStyle::default();
            CfRuleType::IconSet {
                style,
                values: style.default_thresholds(),
                reverse: false,
                show_value: true,
            }
        }
    };

    let mut rule = ConditionalFormatRule::new(rule_type).with_priority(priority);
    for part in cfg.range.split_whitespace() {
        rule = rule.with_range(CellRange::parse(part)?);
    }
    if rule.ranges.is_empty() {
        return Err(GenerateError::generation("Conditional formatting rule has an empty range"));
    }
    if rule.rule_type.uses_format() {
        if let Some(style) = &cfg.style {
            rule = rule.with_format(rule_style(style)?);
        }
    }
    Ok(rule)
}

fn cf_operator(op: RuleOperator) -> CfOperator {
    match op {
        RuleOperator::GreaterThan => CfOperator::GreaterThan,
        RuleOperator::LessThan => CfOperator::LessThan,
        RuleOperator::GreaterThanOrEqual => CfOperator::GreaterThanOrEqual,
        RuleOperator::LessThanOrEqual => CfOperator::LessThanOrEqual,
        RuleOperator::Between => CfOperator::Between,
        RuleOperator::NotBetween => CfOperator::NotBetween,
        RuleOperator::Equal | RuleOperator::ContainsText => CfOperator::Equal,
        RuleOperator::NotEqual => CfOperator::NotEqual,
    }
}

fn threshold_type(kind: ThresholdKind) -> CfValueType {
    match kind {
        ThresholdKind::Min => CfValueType::Min,
        ThresholdKind::Max => CfValueType::Max,
        ThresholdKind::Num => CfValueType::Num,
        ThresholdKind::Percent => CfValueType::Percent,
        ThresholdKind::Percentile => CfValueType::Percentile,
    }
}

fn to_anchor(position: &AnchorConfig) -> Result<ChartAnchor> {
    Ok(ChartAnchor {
        from: CellAddress::parse(&position.from)?,
        to: CellAddress::parse(&position.to)?,
    })
}

fn to_chart(cfg: &ChartConfig) -> Result<Chart> {
    let chart_type = match cfg.kind {
        ChartKind::Bar => ChartType::Bar,
        ChartKind::Column => ChartType::Column,
        ChartKind::Line => ChartType::Line,
        ChartKind::Pie => ChartType::Pie,
        ChartKind::Scatter => ChartType::Scatter,
        ChartKind::Area => ChartType::Area,
        ChartKind::Doughnut => ChartType::Doughnut,
    };
    let mut chart = Chart::new(chart_type, cfg.data.categories.as_str(), to_anchor(&cfg.position)?);
    chart.title = cfg.title.clone();
    for series in &cfg.data.values {
        chart.add_series(DataSeries::new(series.name.as_str(), series.range.as_str()));
    }
    if let Some(options) = &cfg.options {
        if let Some(position) = options.legend.as_ref().and_then(|l| l.position) {
            chart.legend = match position {
                LegendPlacement::Top => LegendPosition::Top,
                LegendPlacement::Bottom => LegendPosition::Bottom,
                LegendPlacement::Left => LegendPosition::Left,
                LegendPlacement::Right => LegendPosition::Right,
                LegendPlacement::None => LegendPosition::None,
            };
        }
        if let Some(axes) = &options.axes {
            chart.x_axis_title = axes.x.as_ref().and_then(|a| a.title.clone());
            chart.y_axis_title = axes.y.as_ref().and_then(|a| a.title.clone());
        }
    }
    Ok(chart)
}

/// Decode a raw or `data:` URL base64 payload
fn decode_image(payload: &str) -> Result<Vec<u8>> {
    let encoded = match payload.trim().strip_prefix("data:") {
        Some(url) => url.split_once(',').map_or("", |(_, data)| data),
        None => payload.trim(),
    };
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| GenerateError::generation(format!("Invalid base64 image data: {}", e)))
}

impl StandardBuilder {
    fn add_charts(&self, sheet: &mut Worksheet, charts: &[ChartConfig]) -> Result<()> {
        let built = charts.iter().map(to_chart).collect::<Result<Vec<_>>>()?;
        if !self.capabilities.charts {
            warn!(
                "Sheet '{}': {} chart(s) requested but the serializer cannot render charts, skipping",
                sheet.name(),
                built.len()
            );
            return Ok(());
        }
        for chart in built {
            sheet.add_chart(chart);
        }
        Ok(())
    }

    fn add_images(&self, sheet: &mut Worksheet, images: &[ImageConfig]) -> Result<()> {
        for (i, image) in images.iter().enumerate() {
            let Some(payload) = &image.base64 else {
                if image.url.is_some() {
                    warn!("Sheet '{}': image {} is url-only, remote images are not fetched", sheet.name(), i);
                } else {
                    warn!("Sheet '{}': image {} has no data, skipping", sheet.name(), i);
                }
                continue;
            };

            let data = decode_image(payload)?;
            let format = image
                .extension
                .and_then(|ext| ImageFormat::from_extension(ext.as_str()))
                .or_else(|| ImageFormat::detect(&data))
                .ok_or_else(|| {
                    GenerateError::generation(format!(
                        "Sheet '{}': image {} is not PNG, JPEG or GIF",
                        sheet.name(),
                        i
                    ))
                })?;
            let anchor = to_anchor(&image.position)?;

            if !self.capabilities.images {
                warn!("Sheet '{}': serializer cannot embed images, skipping image {}", sheet.name(), i);
                continue;
            }
            sheet.add_image(SheetImage::new(anchor.from, anchor.to, format, data));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_workbook;
    use crate::validate::validate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sheetforge_core::CellValue;

    fn build(raw: serde_json::Value) -> Workbook {
        let config = validate(&raw).unwrap();
        let builder = StandardBuilder::new(Capabilities {
            charts: false,
            images: true,
        });
        build_workbook(&builder, &config).unwrap()
    }

    fn build_err(raw: serde_json::Value) -> GenerateError {
        let config = validate(&raw).unwrap();
        build_workbook(&StandardBuilder::default(), &config).unwrap_err()
    }

    fn sheet_with(columns: serde_json::Value, data: serde_json::Value, formatting: serde_json::Value) -> serde_json::Value {
        json!({
            "file_name": "t.xlsx",
            "sheets": [{ "name": "S", "columns": columns, "data": data, "formatting": formatting }]
        })
    }

    #[test]
    fn test_header_row() {
        let workbook = build(sheet_with(
            json!([
                { "header": "Name", "key": "name", "width": 30 },
                { "header": "Total", "key": "total",
                  "style": {
                      "font": { "color": { "argb": "FFFF0000" } },
                      "alignment": { "horizontal": "left" }
                  } }
            ]),
            json!([]),
            json!({}),
        ));
        let sheet = workbook.worksheet(0).unwrap();

        assert_eq!(sheet.value_at(0, 0), CellValue::String("Name".into()));
        assert_eq!(sheet.column_info(0).and_then(|c| c.width), Some(30.0));
        assert_eq!(sheet.column_info(1).and_then(|c| c.width), Some(15.0));
        assert_eq!(sheet.row_info(0).and_then(|r| r.height), Some(HEADER_ROW_HEIGHT));

        let plain = sheet.cell_style_at(0, 0);
        assert!(plain.font.bold);
        assert_eq!(plain.font.size, HEADER_FONT_SIZE);
        assert_eq!(plain.fill, FillStyle::solid(HEADER_FILL));
        assert_eq!(plain.alignment.horizontal, HorizontalAlignment::Center);
        assert_eq!(plain.alignment.vertical, VerticalAlignment::Center);

        let overlaid = sheet.cell_style_at(0, 1);
        assert!(!overlaid.font.bold);
        assert_eq!(overlaid.font.color, Color::rgb(0xFF, 0, 0));
        assert_eq!(overlaid.alignment.horizontal, HorizontalAlignment::Left);
        assert_eq!(overlaid.alignment.vertical, VerticalAlignment::Bottom);
        assert_eq!(overlaid.fill, FillStyle::solid(HEADER_FILL));
    }

    #[test]
    fn test_data_rows_and_formats() {
        let workbook = build(sheet_with(
            json!([
                { "header": "Item", "key": "item" },
                { "header": "Price", "key": "price", "type": "currency" },
                { "header": "Share", "key": "share", "type": "percentage", "format": "0.0%" },
                { "header": "Fee", "key": "fee", "type": "currency", "format": "" }
            ]),
            json!([
                { "item": "Pen", "price": 12000, "share": 0.25, "fee": 500, "extra": "ignored" },
                { "price": 5 }
            ]),
            json!({}),
        ));
        let sheet = workbook.worksheet(0).unwrap();

        assert_eq!(sheet.value_at(1, 0), CellValue::String("Pen".into()));
        assert_eq!(sheet.value_at(1, 1), CellValue::Number(12000.0));
        assert_eq!(sheet.value_at(2, 0), CellValue::Empty);
        assert_eq!(sheet.cell_style_at(1, 1).number_format.format_code(), "#,##0₫");
        assert_eq!(sheet.cell_style_at(2, 2).number_format.format_code(), "0.0%");
        assert_eq!(sheet.cell_style_at(1, 3).number_format.format_code(), "#,##0₫");
        assert!(sheet.cell_style_at(1, 0).number_format.is_general());
        assert_eq!(sheet.dimension().unwrap().end.col, 3);
    }

    #[test]
    fn test_totals_row_skips_unknown_keys() {
        let workbook = build(sheet_with(
            json!([{ "header": "Qty", "key": "qty", "type": "number" }]),
            json!([{ "qty": 5 }, { "qty": 7 }]),
            json!({ "totals_row": { "qty": "SUM(A2:A3)", "missing": "SUM(Z2:Z3)" } }),
        ));
        let sheet = workbook.worksheet(0).unwrap();

        assert_eq!(sheet.value_at(3, 0), CellValue::Formula("SUM(A2:A3)".into()));
        assert!(sheet.cell_style_at(3, 0).font.bold);
        let formulas = sheet.iter_cells().filter(|(_, _, c)| c.value.is_formula()).count();
        assert_eq!(formulas, 1);
    }

    #[test]
    fn test_formatting_operations() {
        let workbook = build(sheet_with(
            json!([
                { "header": "A", "key": "a" }, { "header": "B", "key": "b" }, { "header": "C", "key": "c" }
            ]),
            json!([{ "a": 1 }, { "a": 2 }, { "a": 3 }, { "a": 4 }]),
            json!({
                "freeze_panes": "B2",
                "auto_filter": true,
                "page_setup": { "orientation": "landscape", "fitToPage": true, "margins": { "top": 1.0 } },
                "header_footer": { "oddFooter": "Page &P" },
                "protection": { "sheet": true, "password": "secret", "formatCells": true },
                "merged_cells": ["B6:C6"],
                "row_heights": { "3": 30 },
                "hidden_rows": [4],
                "hidden_columns": ["C"],
                "grouped_rows": [{ "start": 2, "end": 3, "collapsed": true }],
                "grouped_columns": [{ "start": "A", "end": "B" }]
            }),
        ));
        let sheet = workbook.worksheet(0).unwrap();

        let panes = sheet.freeze_panes().unwrap();
        assert_eq!((panes.row, panes.col), (1, 1));
        assert_eq!(sheet.auto_filter().unwrap().to_a1_string(), "A1:C1");

        let setup = sheet.page_setup().unwrap();
        assert_eq!(setup.orientation, PageOrientation::Landscape);
        assert!(setup.fit_to_page);
        assert_eq!(setup.margins.top, 1.0);
        assert_eq!(setup.margins.bottom, PageMargins::default().bottom);

        assert_eq!(sheet.header_footer().unwrap().odd_footer.as_deref(), Some("Page &P"));
        let protection = sheet.protection().unwrap();
        assert_eq!(protection.password, "secret");
        assert!(protection.format_cells);
        assert!(!protection.insert_rows);

        assert_eq!(sheet.merged_regions()[0].to_a1_string(), "B6:C6");
        assert_eq!(sheet.row_info(2).and_then(|r| r.height), Some(30.0));
        assert!(sheet.row_info(3).unwrap().hidden);
        assert!(sheet.column_info(2).unwrap().hidden);

        assert_eq!(sheet.row_info(1).unwrap().outline_level, 1);
        assert!(sheet.row_info(1).unwrap().hidden);
        assert!(sheet.row_info(3).unwrap().collapsed);
        assert_eq!(sheet.column_info(0).unwrap().outline_level, 1);
        assert_eq!(sheet.column_info(1).unwrap().outline_level, 1);
    }

    #[test]
    fn test_freeze_panes_past_column_z() {
        let workbook = build(sheet_with(json!([]), json!([]), json!({ "freeze_panes": "AB3" })));
        let panes = workbook.worksheet(0).unwrap().freeze_panes().unwrap();
        assert_eq!((panes.row, panes.col), (2, 27));
    }

    #[test]
    fn test_conditional_formatting_rules() {
        let workbook = build(sheet_with(
            json!([{ "header": "V", "key": "v" }]),
            json!([{ "v": 1 }]),
            json!({ "conditional_formatting": [
                { "range": "A2:A10", "type": "cellIs", "operator": "greaterThan", "formulae": [100],
                  "style": { "fill": { "type": "pattern", "pattern": "solid", "bgColor": { "argb": "FFFFC7CE" } } } },
                { "range": "A2:A10", "type": "cellIs", "operator": "containsText", "formulae": ["late"] },
                { "range": "A2:A10", "type": "colorScale",
                  "colorScale": { "cfvo": [{ "type": "min" }, { "type": "max" }],
                                  "color": [{ "argb": "FFF8696B" }, { "argb": "FF63BE7B" }] } },
                { "range": "A2:A10 C2:C10", "type": "dataBar", "dataBar": { "showValue": false } },
                { "range": "A2:A10", "type": "iconSet" }
            ]}),
        ));
        let rules = workbook.worksheet(0).unwrap().conditional_formats();
        assert_eq!(rules.len(), 5);

        assert_eq!(
            rules[0].rule_type,
            CfRuleType::CellIs { operator: CfOperator::GreaterThan, formula1: "100".into(), formula2: None }
        );
        assert_eq!(rules[0].priority, 1);
        assert_eq!(
            rules[0].format.as_ref().unwrap().fill,
            FillStyle::solid(Color::rgb(0xFF, 0xC7, 0xCE))
        );
        assert_eq!(rules[1].rule_type, CfRuleType::ContainsText { text: "late".into() });
        match &rules[2].rule_type {
            CfRuleType::ColorScale { colors } => assert_eq!(colors.len(), 2),
            other => panic!("unexpected rule {:?}", other),
        }
        assert_eq!(rules[3].ranges.len(), 2);
        match &rules[3].rule_type {
            CfRuleType::DataBar(options) => assert!(!options.show_value),
            other => panic!("unexpected rule {:?}", other),
        }
        assert_eq!(rules[4].priority, 5);
    }

    #[test]
    fn test_validation_attached_to_data_cells() {
        let workbook = build(sheet_with(
            json!([
                { "header": "Status", "key": "status",
                  "validation": { "type": "list", "formula1": "\"Open,Closed\"", "showErrorMessage": true } },
                { "header": "Qty", "key": "qty",
                  "validation": { "type": "whole", "operator": "greaterThan", "formula1": "0" } }
            ]),
            json!([{ "status": "Open" }, { "status": "Closed" }, {}]),
            json!({}),
        ));
        let validations = workbook.worksheet(0).unwrap().data_validations();

        assert_eq!(validations.len(), 2);
        assert_eq!(validations[0].ranges[0].to_a1_string(), "A2:A4");
        assert!(validations[0].show_error_message);
        assert_eq!(validations[1].operator, ValidationOperator::GreaterThan);
        assert_eq!(validations[1].ranges[0].to_a1_string(), "B2:B4");
    }

    #[test]
    fn test_generation_errors() {
        let bad_operator = build_err(sheet_with(
            json!([{ "header": "Q", "key": "q", "validation": { "type": "whole", "operator": "around" } }]),
            json!([{ "q": 1 }]),
            json!({}),
        ));
        assert_eq!(bad_operator.to_string(), "Unknown validation operator 'around'");

        let bad_merge = build_err(sheet_with(json!([]), json!([]), json!({ "merged_cells": ["A1:??"] })));
        assert_eq!(bad_merge.code(), crate::error::GENERATION_ERROR);

        let missing_operator = build_err(sheet_with(
            json!([]),
            json!([]),
            json!({ "conditional_formatting": [{ "range": "A1:A2", "type": "cellIs", "formulae": [1] }] }),
        ));
        assert!(missing_operator.to_string().contains("needs an operator"));
    }

    #[test]
    fn test_charts_degrade_when_unsupported() {
        let mut raw = sheet_with(json!([]), json!([]), json!({}));
        raw["sheets"][0]["charts"] = json!([{
            "type": "column",
            "position": { "from": "E2", "to": "L18" },
            "data": { "categories": "A2:A5", "values": [{ "name": "Sales", "range": "B2:B5" }] }
        }]);
        let workbook = build(raw.clone());
        assert!(workbook.worksheet(0).unwrap().charts().is_empty());

        let config = validate(&raw).unwrap();
        let builder = StandardBuilder::new(Capabilities { charts: true, images: true });
        let workbook = build_workbook(&builder, &config).unwrap();
        let charts = workbook.worksheet(0).unwrap().charts();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].series[0].values, "B2:B5");
    }

    #[test]
    fn test_images() {
        // 1x1 transparent PNG
        let png = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";
        let mut raw = sheet_with(json!([]), json!([]), json!({}));
        raw["sheets"][0]["images"] = json!([
            { "position": { "from": "B2", "to": "D6" }, "base64": format!("data:image/png;base64,{}", png) },
            { "position": { "from": "B8", "to": "D12" }, "url": "https://example.com/logo.png" }
        ]);
        let workbook = build(raw);
        let images = workbook.worksheet(0).unwrap().images();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].format, ImageFormat::Png);
        assert_eq!(images[0].from, CellAddress::new(1, 1));

        let mut broken = sheet_with(json!([]), json!([]), json!({}));
        broken["sheets"][0]["images"] = json!([
            { "position": { "from": "A1", "to": "B2" }, "base64": "!!not base64!!" }
        ]);
        assert!(build_err(broken).to_string().starts_with("Invalid base64 image data"));
    }
}
