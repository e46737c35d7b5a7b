//! End-to-end: consumption xlsx -> graph -> ancestors walk -> raw-material
//! first report -> xlsx, re-read with calamine.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use uuid::Uuid;

use izleme_core::core::layout_v1::{
    DEFAULT_SHEET_V1, REPORT_HEADERS_V1, REPORT_SHEET_NAME_V1, UNKNOWN_LABEL,
};
use izleme_core::core::model::{ReportOrder, TraceDirection};
use izleme_core::usecase::export::export_trace_xlsx::export_trace_xlsx;
use izleme_core::usecase::import_events_xlsx::import_events_xlsx;
use izleme_core::usecase::project::project;
use izleme_core::usecase::trace::{parse_search_term, resolve_seed_codes, trace};
use izleme_core::ProductionGraph;

fn temp_xlsx_path(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("izleme_it_{prefix}_{}.xlsx", Uuid::new_v4()))
}

const HEADERS: [&str; 8] = [
    "GİRİŞ ÜRÜN SAP BARKODU",
    "SAP ETİKET BARKODU",
    "PROSES",
    "MAKİNE NO",
    "OLUŞTURMA ZAMANI",
    "GİRİŞ ÜRÜN ACIKLAMA",
    "ÇIKIŞ ÜRÜN ACIKLAMA",
    "GİRİŞ ÜRÜN TÜKETİM MİKTARI Kg",
];

fn write_events_xlsx(path: &Path, rows: &[[&str; 8]]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(DEFAULT_SHEET_V1).unwrap();

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .write_string((row_idx + 1) as u32, col as u16, *value)
                .unwrap();
        }
    }
    workbook.save(path).unwrap();
}

#[test]
fn base_code_search_produces_a_raw_material_first_report() {
    let events_path = temp_xlsx_path("events");
    let report_path = temp_xlsx_path("report");

    // Two-level chain into two finished coils of the same base code, plus a
    // dirty quantity cell on the second coil.
    write_events_xlsx(
        &events_path,
        &[
            [
                "77359201-1",
                "40001234-5",
                "TAV",
                "M-02",
                "2025-03-13 21:10:00",
                "FİLMAŞİN 5.5MM",
                "TAVLI TEL 3.0MM",
                "1980",
            ],
            [
                "40001234-5",
                "79528600-1",
                "TEL ÇEKME",
                "M-04",
                "2025-03-14 08:30:00",
                "TAVLI TEL 3.0MM",
                "TEL 2.0MM",
                "940,5",
            ],
            [
                "40001234-5",
                "79528600-2",
                "TEL ÇEKME",
                "M-05",
                "2025-03-14 09:05:00",
                "TAVLI TEL 3.0MM",
                "TEL 2.0MM",
                "—",
            ],
        ],
    );

    let outcome = import_events_xlsx(&events_path).unwrap();
    assert_eq!(outcome.events.len(), 3);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.code == "ROW_QUANTITY_NOT_NUMERIC_ZEROED"));

    let graph = ProductionGraph::build(outcome.events);
    let query = parse_search_term("79528600");
    let seeds = resolve_seed_codes(&graph, &query, TraceDirection::Ancestors);
    assert_eq!(seeds, ["79528600-1", "79528600-2"]);

    let steps = trace(&graph, &seeds, TraceDirection::Ancestors);
    // Seed 1 walks its whole chain; seed 2 stops at the shared intermediate.
    let visited: Vec<&str> = steps.iter().map(|s| s.item_code.as_str()).collect();
    assert_eq!(
        visited,
        ["79528600-1", "40001234-5", "77359201-1", "79528600-2"]
    );
    assert!(steps[2].terminal);
    assert_eq!(steps[2].description, "FİLMAŞİN 5.5MM");
    assert_eq!(steps[2].process_name, UNKNOWN_LABEL);

    let rows = project(&steps, ReportOrder::RawMaterialFirst);
    assert_eq!(rows[0].item_code, "79528600-2");
    assert_eq!(rows[1].item_code, "77359201-1");
    assert_eq!(
        rows[1].path,
        format!("{UNKNOWN_LABEL} (77359201-1) -> TAV (40001234-5) -> TEL ÇEKME (79528600-1)")
    );

    let export = export_trace_xlsx(&report_path, &rows).unwrap();
    assert_eq!(export.diagnostics.exported_rows, rows.len() as u32);

    let mut workbook = open_workbook_auto(&report_path).unwrap();
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
    assert_eq!(first[0], Data::String("79528600-2".to_string()));
    // Dirty "—" cell surfaced as a zero quantity, not an abort.
    assert_eq!(first[3], Data::Float(0.0));

    let last = read_rows.last().unwrap();
    assert_eq!(last[0], Data::String("79528600-1".to_string()));

    let _ = std::fs::remove_file(&events_path);
    let _ = std::fs::remove_file(&report_path);
}

#[test]
fn forward_trace_from_a_raw_material_reaches_every_finished_item() {
    let events_path = temp_xlsx_path("forward_events");

    write_events_xlsx(
        &events_path,
        &[
            [
                "77359201-1",
                "40001234-5",
                "TAV",
                "M-02",
                "",
                "FİLMAŞİN 5.5MM",
                "TAVLI TEL 3.0MM",
                "1980",
            ],
            [
                "40001234-5",
                "79528600-1",
                "TEL ÇEKME",
                "M-04",
                "",
                "TAVLI TEL 3.0MM",
                "TEL 2.0MM",
                "940,5",
            ],
        ],
    );

    let outcome = import_events_xlsx(&events_path).unwrap();
    let graph = ProductionGraph::build(outcome.events);

    let seeds = resolve_seed_codes(
        &graph,
        &parse_search_term("77359201-1"),
        TraceDirection::Descendants,
    );
    assert_eq!(seeds, ["77359201-1"]);

    let steps = trace(&graph, &seeds, TraceDirection::Descendants);
    let visited: Vec<&str> = steps.iter().map(|s| s.item_code.as_str()).collect();
    assert_eq!(visited, ["77359201-1", "40001234-5", "79528600-1"]);

    let rows = project(&steps, ReportOrder::Natural);
    assert_eq!(
        rows[2].path,
        format!("{UNKNOWN_LABEL} (77359201-1) -> TAV (40001234-5) -> TEL ÇEKME (79528600-1)")
    );

    let _ = std::fs::remove_file(&events_path);
}
