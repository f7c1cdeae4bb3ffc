use csv::WriterBuilder;

use crate::core::{AppError, Result};
use crate::modules::exports::models::{Cell, ExportDocument};

/// Render a document as UTF-8 CSV.
///
/// Layout: title line, one `label,value` line per metadata entry, then each section as a
/// blank separator line, the section title, the header row and its rows.
pub fn render_csv(doc: &ExportDocument) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(vec![]);

    writer.write_record([doc.title.as_str()])?;
    for (label, value) in &doc.metadata {
        writer.write_record([label.as_str(), value.as_str()])?;
    }

    for section in &doc.sections {
        writer.write_record([""])?;
        writer.write_record([section.title.as_str()])?;
        writer.write_record(&section.headers)?;
        for row in &section.rows {
            writer.write_record(row.iter().map(Cell::display))?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| AppError::export(format!("CSV error: {}", e)))
}
