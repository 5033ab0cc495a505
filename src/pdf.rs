use std::io::BufWriter;

use printpdf::*;

use crate::error::{CostscanError, Result};
use crate::reports::{Report, HEURISTICS_NOTE, REPORT_TITLE};

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 25.0;
const MARGIN_BOTTOM: f32 = 25.0;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_RIGHT: f32 = 20.0;
const ROW_H: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;
const NOTE_SIZE: f32 = 8.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

fn pdf_err(e: impl std::fmt::Debug) -> CostscanError {
    CostscanError::Pdf(format!("{e:?}"))
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
            self.current_page = page;
            self.current_layer = layer;
            self.y = MARGIN_TOP;
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, title: &str, subtitle: &str) {
        self.text(title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 8.0;
        self.text(subtitle, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 5.0;
        let ts = chrono::Local::now()
            .format("Generated %Y-%m-%d %H:%M")
            .to_string();
        self.text(&ts, MARGIN_LEFT, NOTE_SIZE, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 7.0;
    }

    fn cells(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x + 1.5, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - tw - 1.5, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
        self.y += 2.0;
        self.hline(MARGIN_LEFT, MARGIN_LEFT + cols.iter().map(|c| c.width).sum::<f32>());
        self.y += ROW_H - 2.0;
    }

    fn note(&mut self, s: &str) {
        self.ensure_space(ROW_H);
        self.text(s, MARGIN_LEFT, NOTE_SIZE, false);
        self.y += 4.5;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf).map_err(pdf_err)?;
        buf.into_inner().map_err(|e| CostscanError::Pdf(e.to_string()))
    }
}

/// Characters per note line at `NOTE_SIZE` across the printable width.
fn note_width() -> usize {
    ((PAGE_W - MARGIN_LEFT - MARGIN_RIGHT) / (NOTE_SIZE * 0.18)) as usize
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Short summary document: title, key figures, footer notes.
pub fn render_summary(report: &Report) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(REPORT_TITLE)?;
    pdf.header(REPORT_TITLE, "Automatically generated short report.");

    let cols = &[
        Col { width: 95.0, align: Align::Left },
        Col { width: 75.0, align: Align::Right },
    ];
    pdf.cells(cols, &["Metric", "Value"], true);
    for (key, value) in report.summary_rows() {
        pdf.cells(cols, &[&key, &value], false);
    }

    pdf.y += ROW_H;
    for line in textwrap::wrap(HEURISTICS_NOTE, note_width()) {
        pdf.note(&line);
    }
    pdf.note(&report.fuzzy.footer());

    pdf.to_bytes()
}
