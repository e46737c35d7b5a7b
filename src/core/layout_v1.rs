//! Consumption-report spreadsheet layout (frozen v1): single source of sheet
//! and column names on the code side.
//!
//! The plant's consumption exports went through several header revisions;
//! loose import matches against the candidate lists below instead of
//! scattering header strings through the importer.

pub const SPEC_VERSION_V1: &str = "v1";

/// Default input sheet name in the consumption export.
pub const DEFAULT_SHEET_V1: &str = "VERİ";

/// Frozen v1: required columns (the two barcode columns; strict=true fails
/// the import when either is absent after trim()).
pub const REQUIRED_COLUMNS_V1: [&str; 2] = ["GİRİŞ ÜRÜN SAP BARKODU", "SAP ETİKET BARKODU"];

/// Frozen v1: optional columns (parsed when present; absence only warns).
pub const OPTIONAL_COLUMNS_V1: [&str; 6] = [
    "PROSES",
    "MAKİNE NO",
    "OLUŞTURMA ZAMANI",
    "GİRİŞ ÜRÜN ACIKLAMA",
    "ÇIKIŞ ÜRÜN ACIKLAMA",
    "GİRİŞ ÜRÜN TÜKETİM MİKTARI Kg",
];

/// Loose-mode header candidates, priority order. The output barcode column
/// was renamed across export revisions; both spellings stay accepted.
pub const INPUT_CODE_CANDIDATES: [&str; 2] = ["GİRİŞ ÜRÜN SAP BARKODU", "GİRİŞ BARKOD"];
pub const OUTPUT_CODE_CANDIDATES: [&str; 3] =
    ["SAP ETİKET BARKODU", "TEYİT VERİLEN BARKOD", "ÇIKIŞ BARKOD"];
pub const PROCESS_CANDIDATES: [&str; 2] = ["PROSES", "PROSES ADI"];
pub const MACHINE_CANDIDATES: [&str; 2] = ["MAKİNE NO", "MAKİNE"];
pub const CREATED_AT_CANDIDATES: [&str; 2] = ["OLUŞTURMA ZAMANI", "TARİH"];
pub const INPUT_DESC_CANDIDATES: [&str; 2] = ["GİRİŞ ÜRÜN ACIKLAMA", "GİRİŞ ÜRÜN AÇIKLAMA"];
pub const OUTPUT_DESC_CANDIDATES: [&str; 2] = ["ÇIKIŞ ÜRÜN ACIKLAMA", "ÇIKIŞ ÜRÜN AÇIKLAMA"];
pub const QUANTITY_CANDIDATES: [&str; 2] =
    ["GİRİŞ ÜRÜN TÜKETİM MİKTARI Kg", "TÜKETİM MİKTARI Kg"];

/// Placeholder written wherever the source data carries no value.
pub const UNKNOWN_LABEL: &str = "Bilinmiyor";

/// Hop separator in the rendered process path.
pub const PATH_SEPARATOR: &str = " -> ";

/// Output report sheet (frozen v1): name, headers and column widths.
pub const REPORT_SHEET_NAME_V1: &str = "İzleme Sonuçları";
pub const REPORT_HEADERS_V1: [&str; 7] = [
    "Barkod",
    "Ürün Açıklaması",
    "Makine",
    "Tüketim",
    "Oluşturma Zamanı",
    "Proses",
    "İşlem Döngüsü",
];
pub const REPORT_COLUMN_WIDTHS_V1: [f64; 7] = [18.0, 40.0, 12.0, 15.0, 20.0, 12.0, 100.0];

/// Timestamp rendering in the output report.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// String timestamp spellings accepted on import (native Excel datetime
/// cells are handled separately).
pub const ACCEPTED_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d",
];

pub fn normalize_header_loose(s: &str) -> String {
    s.trim().replace(' ', "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_v1_required_columns_snapshot() {
        assert_eq!(
            REQUIRED_COLUMNS_V1,
            ["GİRİŞ ÜRÜN SAP BARKODU", "SAP ETİKET BARKODU"]
        );
        assert_eq!(REQUIRED_COLUMNS_V1.len(), 2);
    }

    #[test]
    fn layout_v1_report_headers_snapshot() {
        assert_eq!(
            REPORT_HEADERS_V1,
            [
                "Barkod",
                "Ürün Açıklaması",
                "Makine",
                "Tüketim",
                "Oluşturma Zamanı",
                "Proses",
                "İşlem Döngüsü",
            ]
        );
        assert_eq!(REPORT_HEADERS_V1.len(), REPORT_COLUMN_WIDTHS_V1.len());
    }

    #[test]
    fn normalize_header_loose_ignores_spacing_and_case() {
        assert_eq!(
            normalize_header_loose("  MAKİNE NO "),
            normalize_header_loose("MAKİNENO")
        );
        assert_ne!(
            normalize_header_loose("PROSES"),
            normalize_header_loose("MAKİNE NO")
        );
    }
}
