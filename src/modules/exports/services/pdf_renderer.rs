//! PDF rendering with printpdf's built-in Helvetica.
//!
//! The document is first laid out into plain text lines (`layout`), then drawn onto A4
//! pages. Long sections are cut at their `pdf_limit` with an explicit note.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::core::{AppError, Result};
use crate::modules::exports::models::{Cell, ExportDocument};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const USABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Average Helvetica glyph width at 8pt, in mm
const CHAR_WIDTH_MM: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Meta,
    Heading,
    Header,
    Row,
    Note,
}

impl LineKind {
    fn font_size(&self) -> f32 {
        match self {
            LineKind::Title => 16.0,
            LineKind::Heading => 11.0,
            LineKind::Meta | LineKind::Note => 8.5,
            LineKind::Header | LineKind::Row => 8.0,
        }
    }

    fn height(&self) -> f32 {
        match self {
            LineKind::Title => 10.0,
            LineKind::Heading => 8.0,
            _ => 4.8,
        }
    }

    fn bold(&self) -> bool {
        matches!(self, LineKind::Title | LineKind::Heading | LineKind::Header)
    }
}

/// One printed line; `cells` are laid out in equal-width columns
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub kind: LineKind,
    pub cells: Vec<String>,
}

impl PdfLine {
    fn single(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            cells: vec![text.into()],
        }
    }
}

/// Flatten a document into the lines that will be printed
pub fn layout(doc: &ExportDocument) -> Vec<PdfLine> {
    let mut lines = vec![PdfLine::single(LineKind::Title, &doc.title)];
    for (label, value) in &doc.metadata {
        lines.push(PdfLine::single(LineKind::Meta, format!("{}: {}", label, value)));
    }

    for section in &doc.sections {
        lines.push(PdfLine::single(LineKind::Heading, &section.title));
        lines.push(PdfLine {
            kind: LineKind::Header,
            cells: section.headers.clone(),
        });

        let (rows, note) = section.pdf_rows();
        if rows.is_empty() {
            lines.push(PdfLine::single(LineKind::Note, "No data for this period."));
        }
        for row in rows {
            lines.push(PdfLine {
                kind: LineKind::Row,
                cells: row.iter().map(Cell::display).collect(),
            });
        }
        if let Some(note) = note {
            lines.push(PdfLine::single(LineKind::Note, note));
        }
    }

    lines
}

fn fit(text: &str, width_mm: f32) -> String {
    let max_chars = ((width_mm / CHAR_WIDTH_MM) as usize).max(4);
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars - 3).collect();
        cut.push_str("...");
        cut
    }
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::export(format!("PDF error: {}", e))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render a document as an A4 PDF
pub fn render_pdf(doc: &ExportDocument) -> Result<Vec<u8>> {
    let (pdf, page, layer) = PdfDocument::new(
        doc.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    let mut current = pdf.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in layout(doc) {
        let height = line.kind.height();
        if y - height < MARGIN {
            current = new_page(&pdf);
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= height;

        let font = if line.kind.bold() {
            &fonts.bold
        } else {
            &fonts.regular
        };
        let columns = line.cells.len().max(1) as f32;
        let column_width = USABLE_WIDTH / columns;
        for (i, cell) in line.cells.iter().enumerate() {
            let text = if line.cells.len() == 1 {
                fit(cell, USABLE_WIDTH)
            } else {
                fit(cell, column_width - 1.0)
            };
            current.use_text(
                text,
                line.kind.font_size(),
                Mm(MARGIN + column_width * i as f32),
                Mm(y),
                font,
            );
        }
    }

    pdf.save_to_bytes().map_err(pdf_error)
}

fn new_page(pdf: &PdfDocumentReference) -> printpdf::PdfLayerReference {
    let (page, layer) = pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    pdf.get_page(page).get_layer(layer)
}
