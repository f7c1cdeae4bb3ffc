use std::collections::HashSet;

use rust_xlsxwriter::{Color, Format, Workbook};

use crate::core::Result;
use crate::modules::exports::models::{Cell, ExportDocument};

const SHEET_NAME_MAX: usize = 31;
const OVERVIEW_SHEET: &str = "Overview";

/// Excel sheet name: no `[]:*?/\`, at most 31 characters, unique within the workbook
fn sheet_name(title: &str, used: &mut HashSet<String>) -> String {
    let base: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(SHEET_NAME_MAX)
        .collect();
    let base = base.trim().trim_matches('\'').to_string();
    let base = if base.is_empty() { "Sheet".to_string() } else { base };

    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" {}", n);
        let keep = SHEET_NAME_MAX.saturating_sub(suffix.len());
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

/// Render a document as an XLSX workbook: an overview sheet with the title and
/// metadata, then one sheet per section in document order.
pub fn render_xlsx(doc: &ExportDocument) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(14);
    let bold = Format::new().set_bold();
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2));
    let currency = Format::new().set_num_format("#,##0.00");
    let percent = Format::new().set_num_format("0.00\"%\"");

    let overview = workbook.add_worksheet();
    overview.set_name(OVERVIEW_SHEET)?;
    overview.write_string_with_format(0, 0, &doc.title, &title_format)?;
    for (i, (label, value)) in doc.metadata.iter().enumerate() {
        let row = i as u32 + 2;
        overview.write_string_with_format(row, 0, label, &bold)?;
        overview.write_string(row, 1, value)?;
    }
    overview.set_column_width(0, 20.0)?;
    overview.set_column_width(1, 36.0)?;

    let mut used = HashSet::from([OVERVIEW_SHEET.to_lowercase()]);
    for section in &doc.sections {
        let name = sheet_name(&section.title, &mut used);
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        sheet.write_string_with_format(0, 0, &section.title, &bold)?;

        for (col, title) in section.headers.iter().enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(1, col, title, &header)?;
            sheet.set_column_width(col, 18.0)?;
        }

        for (r, row) in section.rows.iter().enumerate() {
            let r = r as u32 + 2;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(value) => {
                        sheet.write_string(r, c, value)?;
                    }
                    Cell::Currency(value) => {
                        sheet.write_number_with_format(r, c, *value, &currency)?;
                    }
                    Cell::Percent(value) => {
                        sheet.write_number_with_format(r, c, *value, &percent)?;
                    }
                    Cell::Integer(value) => {
                        sheet.write_number(r, c, *value as f64)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
        sheet.set_freeze_panes(2, 0)?;
    }

    Ok(workbook.save_to_buffer()?)
}
