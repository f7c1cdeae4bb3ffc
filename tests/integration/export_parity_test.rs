//! Integration tests for export format parity
//!
//! CSV, XLSX and PDF are rendered from one export document, so the same report must
//! carry the same sections, rows and figures in every format. PDF output is checked
//! through its text layout; XLSX through the numeric cells of each worksheet.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::io::{Cursor, Read};

use helpers::*;
use rust_decimal_macros::dec;
use tillreports::modules::exports::models::{Cell, ExportDocument};
use tillreports::modules::exports::services::pdf_renderer::{layout, LineKind};
use tillreports::modules::exports::services::{
    render_csv, render_xlsx, report_document, PDF_DETAIL_LIMIT,
};
use tillreports::modules::reports::models::{ExportFormat, ReportRequest, ReportType};
use tillreports::modules::reports::services::ReportOptions;

fn january() -> ReportRequest {
    ReportRequest::new(TENANT, jan(1, 0), jan(31, 0))
}

async fn document(services: &TestServices, report_type: ReportType) -> ExportDocument {
    let payload = services
        .reports
        .generate(report_type, &january(), &ReportOptions::default())
        .await
        .unwrap();
    let metadata = serde_json::from_value(payload.clone()).unwrap();
    let details = services
        .exports
        .load_details(report_type, &metadata)
        .await
        .unwrap();
    report_document(report_type, &payload, &details).unwrap()
}

fn csv_records(bytes: &[u8]) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

/// Numeric `<v>` values of a worksheet, in cell order; shared strings are skipped
fn xlsx_numbers(bytes: &[u8], sheet: usize) -> Vec<f64> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut xml = String::new();
    archive
        .by_name(&format!("xl/worksheets/sheet{}.xml", sheet))
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();

    xml.split("<c ")
        .skip(1)
        .filter_map(|chunk| {
            let attrs = &chunk[..chunk.find('>')?];
            if attrs.contains("t=\"") {
                return None;
            }
            let start = chunk.find("<v>")? + 3;
            let end = start + chunk[start..].find("</v>")?;
            chunk[start..end].parse().ok()
        })
        .collect()
}

fn numeric_cells(row: &[Cell]) -> Vec<f64> {
    row.iter()
        .filter_map(|cell| match cell {
            Cell::Currency(v) | Cell::Percent(v) => Some(*v),
            Cell::Integer(v) => Some(*v as f64),
            Cell::Text(_) | Cell::Empty => None,
        })
        .collect()
}

/// Walk the CSV section by section and compare with the document
fn assert_csv_matches(doc: &ExportDocument, records: &[Vec<String>]) {
    assert_eq!(records[0], vec![doc.title.clone()]);
    let mut at = 1 + doc.metadata.len();

    for section in &doc.sections {
        assert_eq!(records[at], vec![String::new()], "separator before {}", section.title);
        assert_eq!(records[at + 1], vec![section.title.clone()]);
        assert_eq!(records[at + 2], section.headers);
        at += 3;
        for row in &section.rows {
            let expected: Vec<String> = row.iter().map(Cell::display).collect();
            assert_eq!(records[at], expected, "row in {}", section.title);
            at += 1;
        }
    }
    assert_eq!(at, records.len());
}

fn assert_xlsx_matches(doc: &ExportDocument, bytes: &[u8]) {
    // sheet1 is the overview, sections follow in order
    for (i, section) in doc.sections.iter().enumerate() {
        let expected: Vec<f64> = section.rows.iter().flat_map(|r| numeric_cells(r)).collect();
        let actual = xlsx_numbers(bytes, i + 2);
        assert_eq!(actual.len(), expected.len(), "cells in {}", section.title);
        for (a, e) in actual.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-9, "{}: {} != {}", section.title, a, e);
        }
    }
}

fn assert_pdf_matches(doc: &ExportDocument) {
    let lines = layout(doc);
    for section in &doc.sections {
        let heading = lines
            .iter()
            .position(|l| l.kind == LineKind::Heading && l.cells == vec![section.title.clone()])
            .unwrap_or_else(|| panic!("PDF heading for {}", section.title));
        assert_eq!(lines[heading + 1].cells, section.headers);

        let (rows, _) = section.pdf_rows();
        for (offset, row) in rows.iter().enumerate() {
            let expected: Vec<String> = row.iter().map(Cell::display).collect();
            assert_eq!(lines[heading + 2 + offset].cells, expected);
        }
    }
}

async fn seeded() -> TestServices {
    let services = TestServices::new();
    services
        .seed_orders(&[dec!(10), dec!(20.5), dec!(30.25)], 2)
        .await;
    services
}

/// Test: Every report type renders the same content in CSV, XLSX and PDF
#[tokio::test]
async fn test_all_formats_carry_identical_content() {
    let services = seeded().await;

    for report_type in ReportType::ALL {
        let doc = document(&services, report_type).await;
        assert!(!doc.sections.is_empty(), "{} has sections", report_type);

        assert_csv_matches(&doc, &csv_records(&render_csv(&doc).unwrap()));
        assert_xlsx_matches(&doc, &render_xlsx(&doc).unwrap());
        assert_pdf_matches(&doc);
    }
}

/// Test: Summary key metrics agree across formats
#[tokio::test]
async fn test_summary_key_metrics_parity() {
    let services = seeded().await;
    let doc = document(&services, ReportType::Summary).await;

    let records = csv_records(&render_csv(&doc).unwrap());
    let total_sales = records
        .iter()
        .find(|r| r.first().map(String::as_str) == Some("Total Sales"))
        .unwrap();
    assert_eq!(total_sales[1], "60.75");

    let key_metrics = xlsx_numbers(&render_xlsx(&doc).unwrap(), 2);
    assert_eq!(key_metrics[0], 60.75);
    assert_eq!(key_metrics[1], 3.0);
    assert_eq!(key_metrics[2], 20.25);

    let lines = layout(&doc);
    assert!(lines
        .iter()
        .any(|l| l.kind == LineKind::Row && l.cells == vec!["Total Sales", "60.75"]));
}

/// Test: PDF truncates long detail sections with a note; CSV keeps every row
#[tokio::test]
async fn test_pdf_truncates_long_detail_lists() {
    let services = TestServices::new();
    let amounts = vec![dec!(4.5); PDF_DETAIL_LIMIT + 10];
    services.seed_orders(&amounts, 1).await;

    let doc = document(&services, ReportType::Sales).await;
    let details = doc
        .sections
        .iter()
        .find(|s| s.title == "Order Details")
        .unwrap();
    assert_eq!(details.rows.len(), PDF_DETAIL_LIMIT + 10);

    let lines = layout(&doc);
    let note = format!(
        "Showing first {} of {} rows; see the CSV or XLSX export for the full list.",
        PDF_DETAIL_LIMIT,
        PDF_DETAIL_LIMIT + 10
    );
    assert!(lines
        .iter()
        .any(|l| l.kind == LineKind::Note && l.cells == vec![note.clone()]));

    let records = csv_records(&render_csv(&doc).unwrap());
    let order_rows = records
        .iter()
        .filter(|r| r.first().map_or(false, |c| c.starts_with("ORD-")))
        .count();
    assert_eq!(order_rows, PDF_DETAIL_LIMIT + 10);
}

/// Test: Empty sections print a placeholder in the PDF
#[tokio::test]
async fn test_empty_period_pdf_placeholder() {
    let services = TestServices::new();
    let doc = document(&services, ReportType::Payments).await;

    let lines = layout(&doc);
    assert!(lines
        .iter()
        .any(|l| l.kind == LineKind::Note && l.cells == vec!["No data for this period."]));
}

/// Test: Export service names files by type, range and format
#[tokio::test]
async fn test_export_files_have_expected_names_and_types() {
    let services = seeded().await;

    for (format, content_type, magic) in [
        (ExportFormat::Csv, "text/csv; charset=utf-8", &b"Sales Report"[..]),
        (
            ExportFormat::Xlsx,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            &b"PK"[..],
        ),
        (ExportFormat::Pdf, "application/pdf", &b"%PDF"[..]),
    ] {
        let file = services
            .exports
            .export(ReportType::Sales, &january(), &ReportOptions::default(), format)
            .await
            .unwrap();

        assert_eq!(
            file.filename,
            format!("sales-report-2024-01-01-2024-01-30.{}", format.extension())
        );
        assert_eq!(file.content_type, content_type);
        assert!(file.bytes.starts_with(magic), "{} magic bytes", format);
    }
}
