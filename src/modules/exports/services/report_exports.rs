//! `export_<type>_to_<format>` entry points and the payload-driven dispatcher.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::Result;
use crate::modules::exports::models::ExportDocument;
use crate::modules::reports::models::{
    ExportFormat, OperationsReport, PaymentsReport, ProductsReport, ReportType, SalesReport,
    SummaryReport,
};

use super::csv_renderer::render_csv;
use super::pdf_renderer::render_pdf;
use super::report_documents::{
    operations_document, payments_document, products_document, sales_document, summary_document,
    ReportDetails,
};
use super::xlsx_renderer::render_xlsx;

pub fn render_document(doc: &ExportDocument, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => render_csv(doc),
        ExportFormat::Xlsx => render_xlsx(doc),
        ExportFormat::Pdf => render_pdf(doc),
    }
}

pub fn export_summary_to_csv(report: &SummaryReport) -> Result<Vec<u8>> {
    render_csv(&summary_document(report))
}

pub fn export_summary_to_xlsx(report: &SummaryReport) -> Result<Vec<u8>> {
    render_xlsx(&summary_document(report))
}

pub fn export_summary_to_pdf(report: &SummaryReport) -> Result<Vec<u8>> {
    render_pdf(&summary_document(report))
}

pub fn export_sales_to_csv(report: &SalesReport, details: &ReportDetails) -> Result<Vec<u8>> {
    render_csv(&sales_document(report, &details.orders))
}

pub fn export_sales_to_xlsx(report: &SalesReport, details: &ReportDetails) -> Result<Vec<u8>> {
    render_xlsx(&sales_document(report, &details.orders))
}

pub fn export_sales_to_pdf(report: &SalesReport, details: &ReportDetails) -> Result<Vec<u8>> {
    render_pdf(&sales_document(report, &details.orders))
}

pub fn export_products_to_csv(report: &ProductsReport) -> Result<Vec<u8>> {
    render_csv(&products_document(report))
}

pub fn export_products_to_xlsx(report: &ProductsReport) -> Result<Vec<u8>> {
    render_xlsx(&products_document(report))
}

pub fn export_products_to_pdf(report: &ProductsReport) -> Result<Vec<u8>> {
    render_pdf(&products_document(report))
}

pub fn export_payments_to_csv(report: &PaymentsReport, details: &ReportDetails) -> Result<Vec<u8>> {
    render_csv(&payments_document(report, &details.transactions))
}

pub fn export_payments_to_xlsx(report: &PaymentsReport, details: &ReportDetails) -> Result<Vec<u8>> {
    render_xlsx(&payments_document(report, &details.transactions))
}

pub fn export_payments_to_pdf(report: &PaymentsReport, details: &ReportDetails) -> Result<Vec<u8>> {
    render_pdf(&payments_document(report, &details.transactions))
}

pub fn export_operations_to_csv(report: &OperationsReport) -> Result<Vec<u8>> {
    render_csv(&operations_document(report))
}

pub fn export_operations_to_xlsx(report: &OperationsReport) -> Result<Vec<u8>> {
    render_xlsx(&operations_document(report))
}

pub fn export_operations_to_pdf(report: &OperationsReport) -> Result<Vec<u8>> {
    render_pdf(&operations_document(report))
}

/// Missing fields default, so older cached payloads still render
fn parse<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    Ok(serde_json::from_value(payload.clone())?)
}

/// Lower a generated report payload into its export document
pub fn report_document(
    report_type: ReportType,
    payload: &Value,
    details: &ReportDetails,
) -> Result<ExportDocument> {
    let doc = match report_type {
        ReportType::Summary => summary_document(&parse(payload)?),
        ReportType::Sales => sales_document(&parse(payload)?, &details.orders),
        ReportType::Products => products_document(&parse(payload)?),
        ReportType::Payments => payments_document(&parse(payload)?, &details.transactions),
        ReportType::Operations => operations_document(&parse(payload)?),
    };
    Ok(doc)
}

pub fn render_report(
    report_type: ReportType,
    format: ExportFormat,
    payload: &Value,
    details: &ReportDetails,
) -> Result<Vec<u8>> {
    render_document(&report_document(report_type, payload, details)?, format)
}
