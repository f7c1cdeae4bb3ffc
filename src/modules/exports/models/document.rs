//! Format-neutral export document.
//!
//! Reports are lowered into an `ExportDocument` once; the CSV, XLSX and PDF renderers
//! all walk the same sections in the same order.

use crate::core::currency::{format_amount, format_percentage};
use crate::modules::reports::models::ReportMetadata;

/// One typed value in a section row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Currency(f64),
    Percent(f64),
    Integer(i64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Text form shared by every renderer: 2 dp amounts, 2 dp percentages with `%`
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Currency(v) => format_amount(*v),
            Cell::Percent(v) => format_percentage(*v),
            Cell::Integer(v) => v.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Maximum rows printed in the PDF; CSV and XLSX always carry every row
    pub pdf_limit: Option<usize>,
}

impl Section {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            pdf_limit: None,
        }
    }

    /// Two-column "Metric / Value" section
    pub fn key_values(title: impl Into<String>, pairs: Vec<(&str, Cell)>) -> Self {
        let mut section = Section::new(title, &["Metric", "Value"]);
        for (label, value) in pairs {
            section.push(vec![Cell::text(label), value]);
        }
        section
    }

    pub fn with_pdf_limit(mut self, limit: usize) -> Self {
        self.pdf_limit = Some(limit);
        self
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Rows printed in the PDF plus the truncation note, if any
    pub fn pdf_rows(&self) -> (&[Vec<Cell>], Option<String>) {
        match self.pdf_limit {
            Some(limit) if self.rows.len() > limit => (
                &self.rows[..limit],
                Some(format!(
                    "Showing first {} of {} rows; see the CSV or XLSX export for the full list.",
                    limit,
                    self.rows.len()
                )),
            ),
            _ => (&self.rows, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub title: String,
    /// Label/value lines printed above the first section
    pub metadata: Vec<(String, String)>,
    pub sections: Vec<Section>,
}

impl ExportDocument {
    pub fn new(title: impl Into<String>, metadata: &ReportMetadata) -> Self {
        let mut lines = vec![
            ("Generated At".to_string(), metadata.generated_at.clone()),
            ("Period Start".to_string(), metadata.date_range.start.clone()),
            ("Period End".to_string(), metadata.date_range.end.clone()),
        ];
        let location = &metadata.location_info;
        let scope = if location.is_multi_location {
            "All locations (consolidated)".to_string()
        } else {
            location
                .location_name
                .clone()
                .or_else(|| location.location_id.clone())
                .unwrap_or_else(|| "All locations".to_string())
        };
        lines.push(("Location".to_string(), scope));

        Self {
            title: title.into(),
            metadata: lines,
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }
}
