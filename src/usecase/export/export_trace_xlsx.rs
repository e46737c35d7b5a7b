//! Trace report export: İzleme Sonuçları.xlsx (one frozen sheet).
//!
//! Hard constraint: the sheet name, header text/order and column widths are
//! frozen v1; additions go to new sheets, never to these columns.

use std::path::Path;
use std::time::Instant;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::core::layout_v1::{
    REPORT_COLUMN_WIDTHS_V1, REPORT_HEADERS_V1, REPORT_SHEET_NAME_V1,
};
use crate::core::model::ReportRow;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTraceDiagnostics {
    pub exported_rows: u32,
    pub duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTraceOutcome {
    pub headers: Vec<String>,
    pub diagnostics: ExportTraceDiagnostics,
}

pub fn export_trace_xlsx(
    out_path: &Path,
    rows: &[ReportRow],
) -> Result<ExportTraceOutcome, XlsxError> {
    let started = Instant::now();

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_SHEET_NAME_V1)?;

    for (col, header) in REPORT_HEADERS_V1.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    for (col, width) in REPORT_COLUMN_WIDTHS_V1.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    let mut excel_row: u32 = 1;
    for row in rows {
        sheet.write_string(excel_row, 0, &row.item_code)?;
        sheet.write_string(excel_row, 1, &row.description)?;
        sheet.write_string(excel_row, 2, &row.machine_id)?;
        let quantity = if row.consumed_quantity.is_finite() {
            row.consumed_quantity
        } else {
            0.0
        };
        sheet.write_number(excel_row, 3, quantity)?;
        sheet.write_string(excel_row, 4, &row.created_at)?;
        sheet.write_string(excel_row, 5, &row.process_name)?;
        sheet.write_string(excel_row, 6, &row.path)?;
        excel_row += 1;
    }

    workbook.save(out_path)?;

    let duration_ms = started.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    Ok(ExportTraceOutcome {
        headers: REPORT_HEADERS_V1.iter().map(|s| s.to_string()).collect(),
        diagnostics: ExportTraceDiagnostics {
            exported_rows: rows.len().min(u32::MAX as usize) as u32,
            duration_ms,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_xlsx_path(prefix: &str) -> PathBuf {
        std::env::temp_dir().join(format!("izleme_{prefix}_{}.xlsx", Uuid::new_v4()))
    }

    fn row(item_code: &str, path: &str, quantity: f64) -> ReportRow {
        ReportRow {
            item_code: item_code.to_string(),
            description: "TEL 2.0MM".to_string(),
            machine_id: "M-04".to_string(),
            consumed_quantity: quantity,
            created_at: "2025-03-14 08:30:00".to_string(),
            process_name: "TEL ÇEKME".to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn exported_sheet_carries_frozen_headers_and_rows() {
        let path = temp_xlsx_path("export_ok");
        let rows = vec![
            row("79528600-33", "TEL ÇEKME (79528600-33)", 1250.5),
            row("77359201-1", "TEL ÇEKME (79528600-33) -> Bilinmiyor (77359201-1)", 0.0),
        ];

        let outcome = export_trace_xlsx(&path, &rows).unwrap();
        assert_eq!(outcome.diagnostics.exported_rows, 2);
        assert_eq!(outcome.headers.len(), REPORT_HEADERS_V1.len());

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range(REPORT_SHEET_NAME_V1).unwrap();
        let mut read_rows = range.rows();

        let header: Vec<String> = read_rows
            .next()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(header, REPORT_HEADERS_V1);

        let first = read_rows.next().unwrap();
        assert_eq!(first[0], Data::String("79528600-33".to_string()));
        assert_eq!(first[3], Data::Float(1250.5));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn non_finite_quantity_is_written_as_zero() {
        let path = temp_xlsx_path("export_nan");
        let rows = vec![row("B1", "TAV (B1)", f64::NAN)];

        export_trace_xlsx(&path, &rows).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range(REPORT_SHEET_NAME_V1).unwrap();
        let data_row = range.rows().nth(1).unwrap();
        assert_eq!(data_row[3], Data::Float(0.0));

        let _ = std::fs::remove_file(&path);
    }
}
