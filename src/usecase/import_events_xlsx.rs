//! Consumption xlsx → EventRecord batch.
//!
//! - Reads one sheet (default `VERİ`; loose mode falls back to the first
//!   sheet when the requested one is absent).
//! - Loose mode resolves headers against the candidate lists in `layout_v1`
//!   and degrades row problems to warnings; strict mode hard-fails on
//!   missing sheet/columns and empty barcode cells.
//! - Quantity cells always coerce (missing/dirty → 0.0); strictness covers
//!   structure, not manual-entry dirtiness.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::layout_v1 as layout;
use crate::core::model::{EventRecord, TraceWarning};
use crate::error::{TraceReportError, TraceReportErrorDetails, TraceReportErrorKind};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportEventsOptions {
    /// strict=true hard-fails on sheet/column/barcode problems; default
    /// false keeps the tolerant import.
    #[serde(default)]
    pub strict: Option<bool>,
    /// Sheet to read; strict=true fails when it is absent.
    #[serde(default)]
    pub sheet_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportEventsDiagnostics {
    pub detected_sheets: Vec<String>,
    pub detected_columns: Vec<String>,
    pub used_sheet: String,
    pub strict: bool,
    pub rows_scanned: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_columns: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ImportEventsXlsxError {
    #[error("failed to open workbook: {0}")]
    OpenWorkbook(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("worksheet has no header row")]
    NoHeaderRow,

    #[error("strict: sheet not found: {sheet_name}")]
    MissingSheet {
        sheet_name: String,
        detected_sheets: Vec<String>,
        diagnostics: ImportEventsDiagnostics,
    },

    #[error("missing required columns: {missing_columns:?}")]
    MissingRequiredColumns {
        missing_columns: Vec<String>,
        detected_columns: Vec<String>,
        diagnostics: ImportEventsDiagnostics,
    },

    #[error("strict: invalid value at row {row_index} column {column_name}: {raw_value}")]
    InvalidRequiredValue {
        row_index: u32,
        column_name: String,
        raw_value: String,
        diagnostics: ImportEventsDiagnostics,
    },
}

impl ImportEventsXlsxError {
    pub fn diagnostics(&self) -> Option<&ImportEventsDiagnostics> {
        match self {
            ImportEventsXlsxError::MissingSheet { diagnostics, .. } => Some(diagnostics),
            ImportEventsXlsxError::MissingRequiredColumns { diagnostics, .. } => Some(diagnostics),
            ImportEventsXlsxError::InvalidRequiredValue { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }

    pub fn to_report_error(&self) -> TraceReportError {
        match self {
            ImportEventsXlsxError::OpenWorkbook(message) => TraceReportError {
                kind: TraceReportErrorKind::EventsXlsxReadError,
                message: format!("failed to open workbook: {message}"),
                details: None,
            },
            ImportEventsXlsxError::NoWorksheet => TraceReportError {
                kind: TraceReportErrorKind::EventsXlsxReadError,
                message: "workbook has no worksheet".to_string(),
                details: None,
            },
            ImportEventsXlsxError::NoHeaderRow => TraceReportError {
                kind: TraceReportErrorKind::EventsXlsxReadError,
                message: "worksheet has no header row".to_string(),
                details: None,
            },
            ImportEventsXlsxError::MissingSheet {
                sheet_name,
                detected_sheets,
                ..
            } => TraceReportError {
                kind: TraceReportErrorKind::EventsXlsxInvalidSheet,
                message: format!(
                    "sheet not found: '{sheet_name}', available: {detected_sheets:?}"
                ),
                details: Some(TraceReportErrorDetails {
                    sheet_name: Some(sheet_name.clone()),
                    detected_sheets: Some(detected_sheets.clone()),
                    ..Default::default()
                }),
            },
            ImportEventsXlsxError::MissingRequiredColumns {
                missing_columns,
                detected_columns,
                ..
            } => TraceReportError {
                kind: TraceReportErrorKind::EventsXlsxMissingColumns,
                message: format!(
                    "missing required columns: {missing_columns:?}, detected: {detected_columns:?}"
                ),
                details: Some(TraceReportErrorDetails {
                    missing_columns: Some(missing_columns.clone()),
                    detected_columns: Some(detected_columns.clone()),
                    ..Default::default()
                }),
            },
            ImportEventsXlsxError::InvalidRequiredValue {
                row_index,
                column_name,
                raw_value,
                ..
            } => TraceReportError {
                kind: TraceReportErrorKind::EventsXlsxInvalidRow,
                message: format!(
                    "invalid value at row {row_index} column '{column_name}': '{raw_value}'"
                ),
                details: Some(TraceReportErrorDetails {
                    row_index: Some(*row_index),
                    column_name: Some(column_name.clone()),
                    raw_value: Some(raw_value.clone()),
                    ..Default::default()
                }),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportEventsOutcome {
    pub events: Vec<EventRecord>,
    pub warnings: Vec<TraceWarning>,
    pub diagnostics: ImportEventsDiagnostics,
}

fn cell_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Float(v) => Some(format!("{v}")),
        Data::Int(v) => Some(format!("{v}")),
        Data::Bool(v) => Some(if *v { "1".to_string() } else { "0".to_string() }),
        other => Some(format!("{other:?}")),
    }
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(v) => v.as_datetime(),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok(),
        Data::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

fn parse_timestamp_str(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in layout::ACCEPTED_TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn header_index(headers: &[String], candidates: &[&str]) -> Option<usize> {
    for cand in candidates {
        let cand_norm = layout::normalize_header_loose(cand);
        if let Some(idx) = headers
            .iter()
            .position(|h| layout::normalize_header_loose(h) == cand_norm)
        {
            return Some(idx);
        }
    }
    None
}

pub fn import_events_xlsx(path: &Path) -> Result<ImportEventsOutcome, ImportEventsXlsxError> {
    import_events_xlsx_with_options(path, None)
}

pub fn import_events_xlsx_with_options(
    path: &Path,
    options: Option<ImportEventsOptions>,
) -> Result<ImportEventsOutcome, ImportEventsXlsxError> {
    let options = options.unwrap_or_default();
    let strict = options.strict.unwrap_or(false);
    let requested_sheet = options
        .sheet_name
        .clone()
        .unwrap_or_else(|| layout::DEFAULT_SHEET_V1.to_string());

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportEventsXlsxError::OpenWorkbook(e.to_string()))?;

    let detected_sheets = workbook.sheet_names().to_owned();
    if detected_sheets.is_empty() {
        return Err(ImportEventsXlsxError::NoWorksheet);
    }

    let mut warnings: Vec<TraceWarning> = Vec::new();

    let used_sheet = if detected_sheets.iter().any(|s| s == &requested_sheet) {
        requested_sheet.clone()
    } else if strict {
        return Err(ImportEventsXlsxError::MissingSheet {
            sheet_name: requested_sheet.clone(),
            detected_sheets: detected_sheets.clone(),
            diagnostics: ImportEventsDiagnostics {
                detected_sheets,
                detected_columns: Vec::new(),
                used_sheet: requested_sheet,
                strict,
                rows_scanned: 0,
                spec_version: Some(layout::SPEC_VERSION_V1.to_string()),
                required_columns: Some(
                    layout::REQUIRED_COLUMNS_V1
                        .iter()
                        .map(|v| v.to_string())
                        .collect(),
                ),
            },
        });
    } else {
        let fallback = detected_sheets[0].clone();
        warnings.push(TraceWarning {
            code: "SHEET_NOT_FOUND_FALLBACK_FIRST".to_string(),
            message: format!(
                "requested sheet '{}' not found; fallback to first sheet '{}'",
                requested_sheet, fallback
            ),
            item_code: None,
            row_index: None,
        });
        fallback
    };

    let range = workbook
        .worksheet_range(&used_sheet)
        .map_err(|e| ImportEventsXlsxError::OpenWorkbook(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(ImportEventsXlsxError::NoHeaderRow)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| cell_string(c).unwrap_or_default())
        .collect();

    let col_input = layout::REQUIRED_COLUMNS_V1[0];
    let col_output = layout::REQUIRED_COLUMNS_V1[1];

    // strict=true: required barcode columns matched verbatim (frozen v1);
    // strict=false: candidate lists cover the historical header spellings.
    let (idx_input, idx_output) = if strict {
        let mut map: HashMap<&str, usize> = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            if !h.is_empty() {
                map.insert(h.as_str(), i);
            }
        }

        let mut missing: Vec<String> = Vec::new();
        for required in layout::REQUIRED_COLUMNS_V1 {
            if !map.contains_key(required) {
                missing.push(required.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(ImportEventsXlsxError::MissingRequiredColumns {
                missing_columns: missing,
                detected_columns: headers.clone(),
                diagnostics: ImportEventsDiagnostics {
                    detected_sheets: detected_sheets.clone(),
                    detected_columns: headers.clone(),
                    used_sheet: used_sheet.clone(),
                    strict,
                    rows_scanned: 0,
                    spec_version: Some(layout::SPEC_VERSION_V1.to_string()),
                    required_columns: Some(
                        layout::REQUIRED_COLUMNS_V1
                            .iter()
                            .map(|v| v.to_string())
                            .collect(),
                    ),
                },
            });
        }

        (map[col_input], map[col_output])
    } else {
        let idx_input = header_index(&headers, &layout::INPUT_CODE_CANDIDATES);
        let idx_output = header_index(&headers, &layout::OUTPUT_CODE_CANDIDATES);

        // Even the tolerant import cannot build edges without the two
        // barcode columns.
        let mut missing: Vec<String> = Vec::new();
        if idx_input.is_none() {
            missing.push(col_input.to_string());
        }
        if idx_output.is_none() {
            missing.push(col_output.to_string());
        }
        if !missing.is_empty() {
            return Err(ImportEventsXlsxError::MissingRequiredColumns {
                missing_columns: missing,
                detected_columns: headers.clone(),
                diagnostics: ImportEventsDiagnostics {
                    detected_sheets: detected_sheets.clone(),
                    detected_columns: headers.clone(),
                    used_sheet: used_sheet.clone(),
                    strict,
                    rows_scanned: 0,
                    spec_version: Some(layout::SPEC_VERSION_V1.to_string()),
                    required_columns: Some(
                        layout::REQUIRED_COLUMNS_V1
                            .iter()
                            .map(|v| v.to_string())
                            .collect(),
                    ),
                },
            });
        }

        (idx_input.unwrap(), idx_output.unwrap())
    };

    let idx_process = header_index(&headers, &layout::PROCESS_CANDIDATES);
    let idx_machine = header_index(&headers, &layout::MACHINE_CANDIDATES);
    let idx_created = header_index(&headers, &layout::CREATED_AT_CANDIDATES);
    let idx_input_desc = header_index(&headers, &layout::INPUT_DESC_CANDIDATES);
    let idx_output_desc = header_index(&headers, &layout::OUTPUT_DESC_CANDIDATES);
    let idx_quantity = header_index(&headers, &layout::QUANTITY_CANDIDATES);

    for (column, idx) in [
        (layout::OPTIONAL_COLUMNS_V1[0], idx_process),
        (layout::OPTIONAL_COLUMNS_V1[1], idx_machine),
        (layout::OPTIONAL_COLUMNS_V1[2], idx_created),
        (layout::OPTIONAL_COLUMNS_V1[3], idx_input_desc),
        (layout::OPTIONAL_COLUMNS_V1[4], idx_output_desc),
        (layout::OPTIONAL_COLUMNS_V1[5], idx_quantity),
    ] {
        if idx.is_none() {
            warnings.push(TraceWarning {
                code: "OPTIONAL_COLUMN_MISSING".to_string(),
                message: format!("column '{column}' not found; values default"),
                item_code: None,
                row_index: None,
            });
        }
    }

    let mut rows_scanned: u32 = 0;
    let make_diagnostics = |rows_scanned: u32| ImportEventsDiagnostics {
        detected_sheets: detected_sheets.clone(),
        detected_columns: headers.clone(),
        used_sheet: used_sheet.clone(),
        strict,
        rows_scanned,
        spec_version: Some(layout::SPEC_VERSION_V1.to_string()),
        required_columns: Some(
            layout::REQUIRED_COLUMNS_V1
                .iter()
                .map(|v| v.to_string())
                .collect(),
        ),
    };

    let mut events: Vec<EventRecord> = Vec::new();

    for (row_idx, row) in rows.enumerate() {
        let row_index = (row_idx + 2) as u32; // 1-based excel row (header is row 1)
        rows_scanned = rows_scanned.saturating_add(1);

        let output_code = row
            .get(idx_output)
            .and_then(cell_string)
            .unwrap_or_default();
        if output_code.is_empty() {
            if strict {
                return Err(ImportEventsXlsxError::InvalidRequiredValue {
                    row_index,
                    column_name: col_output.to_string(),
                    raw_value: output_code,
                    diagnostics: make_diagnostics(rows_scanned),
                });
            }
            warnings.push(TraceWarning {
                code: "ROW_MISSING_OUTPUT_CODE".to_string(),
                message: format!("row {row_index}: output barcode missing; skipped"),
                item_code: None,
                row_index: Some(row_index),
            });
            continue;
        }

        let input_code = row.get(idx_input).and_then(cell_string).unwrap_or_default();
        if input_code.is_empty() {
            if strict {
                return Err(ImportEventsXlsxError::InvalidRequiredValue {
                    row_index,
                    column_name: col_input.to_string(),
                    raw_value: input_code,
                    diagnostics: make_diagnostics(rows_scanned),
                });
            }
            warnings.push(TraceWarning {
                code: "ROW_MISSING_INPUT_CODE".to_string(),
                message: format!("row {row_index}: input barcode missing; skipped"),
                item_code: Some(output_code),
                row_index: Some(row_index),
            });
            continue;
        }

        let quantity_cell = idx_quantity.and_then(|i| row.get(i));
        let consumed_quantity = match quantity_cell {
            None | Some(Data::Empty) => 0.0,
            Some(cell) => match cell_f64(cell) {
                Some(v) if v.is_finite() => v,
                _ => {
                    warnings.push(TraceWarning {
                        code: "ROW_QUANTITY_NOT_NUMERIC_ZEROED".to_string(),
                        message: format!(
                            "row {row_index}: consumption quantity '{}' not numeric; zeroed",
                            cell_string(cell).unwrap_or_default()
                        ),
                        item_code: Some(output_code.clone()),
                        row_index: Some(row_index),
                    });
                    0.0
                }
            },
        };

        events.push(EventRecord {
            input_item_code: input_code,
            output_item_code: output_code,
            process_name: idx_process
                .and_then(|i| row.get(i))
                .and_then(cell_string)
                .unwrap_or_default(),
            machine_id: idx_machine
                .and_then(|i| row.get(i))
                .and_then(cell_string)
                .unwrap_or_default(),
            created_at: idx_created.and_then(|i| row.get(i)).and_then(cell_datetime),
            input_description: idx_input_desc
                .and_then(|i| row.get(i))
                .and_then(cell_string)
                .unwrap_or_default(),
            output_description: idx_output_desc
                .and_then(|i| row.get(i))
                .and_then(cell_string)
                .unwrap_or_default(),
            consumed_quantity,
        });
    }

    Ok(ImportEventsOutcome {
        events,
        warnings,
        diagnostics: make_diagnostics(rows_scanned),
    })
}
