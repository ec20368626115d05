use std::f64::consts::PI;

use printpdf::{
    path::{PaintMode, WindingOrder},
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use crate::{
    error::{Result, TrackerError},
    store::{entities::TimeEntry, totals::ProjectTotals},
    utils::{
        percentage::{duration_percentage, Percentage},
        time::format_hours_minutes,
    },
};

pub const REPORT_TITLE: &str = "Project Time Entries";

const PAGE_WIDTH: f32 = 210.;
const PAGE_HEIGHT: f32 = 297.;
const MARGIN: f32 = 15.;
const LINE_HEIGHT: f32 = 6.;
const TEXT_SIZE: f32 = 10.;
const HEADING_SIZE: f32 = 13.;
const TITLE_SIZE: f32 = 18.;

const CHART_RADIUS: f64 = 35.;
const CHART_CENTER: (f64, f64) = (MARGIN as f64 + CHART_RADIUS, 215.);
const LEGEND_X: f32 = 100.;
/// Arc resolution of a pie slice, in segments per full circle.
const ARC_SEGMENTS: f64 = 120.;

const PALETTE: [(f32, f32, f32); 8] = [
    (0.29, 0.43, 0.54),
    (0.86, 0.42, 0.24),
    (0.36, 0.62, 0.38),
    (0.80, 0.70, 0.25),
    (0.55, 0.36, 0.62),
    (0.27, 0.65, 0.72),
    (0.78, 0.33, 0.45),
    (0.50, 0.50, 0.50),
];

/// Writes lines top to bottom and opens a new page when the current one is full.
struct PageWriter {
    document: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (document, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(export_error)?;
        let bold = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(export_error)?;
        let layer = document.get_page(page).get_layer(layer);
        Ok(Self {
            document,
            layer,
            font,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn ensure_space(&mut self, height: f32) {
        if self.cursor - height >= MARGIN {
            return;
        }
        let (page, layer) = self
            .document
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.document.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        self.ensure_space(LINE_HEIGHT);
        self.cursor -= LINE_HEIGHT.max(size * 0.5);
        self.layer.set_fill_color(black());
        let font = if bold { &self.bold } else { &self.font };
        // The builtin fonts can't render line breaks, notes are flattened onto one line.
        self.layer
            .use_text(text.replace(['\n', '\r'], " "), size, Mm(MARGIN), Mm(self.cursor), font);
    }

    fn gap(&mut self) {
        self.cursor -= LINE_HEIGHT / 2.;
    }

    /// Draws the chart in the top left of the current page and lists the legend to its right.
    /// A legend too long for the page continues on the next ones.
    fn pie_chart(&mut self, totals: &ProjectTotals) {
        let whole = totals.total();
        let ranked = totals
            .ranked()
            .into_iter()
            .map(|(project, duration)| (project, duration, duration_percentage(duration, whole)))
            .collect::<Vec<_>>();

        let mut start = 0.;
        for (index, (_, _, share)) in ranked.iter().enumerate() {
            let end = start + share.as_fraction();
            if *share > Percentage::zero() {
                self.layer.set_fill_color(slice_color(index));
                self.layer.add_polygon(slice(start, end));
            }
            start = end;
        }

        let chart_page = self.pages;
        self.cursor = CHART_CENTER.1 as f32 + CHART_RADIUS as f32;
        for (index, (project, duration, share)) in ranked.into_iter().enumerate() {
            self.ensure_space(LINE_HEIGHT);
            self.cursor -= LINE_HEIGHT;
            self.layer.set_fill_color(slice_color(index));
            self.layer.add_polygon(square(LEGEND_X, self.cursor, 4.));
            self.layer.set_fill_color(black());
            self.layer.use_text(
                format!("{project}: {} ({share})", format_hours_minutes(duration)),
                TEXT_SIZE,
                Mm(LEGEND_X + 6.),
                Mm(self.cursor),
                &self.font,
            );
        }

        if self.pages == chart_page {
            self.cursor = self.cursor.min((CHART_CENTER.1 - CHART_RADIUS) as f32);
        }
        self.cursor -= LINE_HEIGHT;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.document.save_to_bytes().map_err(export_error)
    }
}

/// Lays out the report: title, pie chart of the totals with a percentage legend, every entry and
/// finally the totals.
pub fn render_pdf(entries: &[TimeEntry], totals: &ProjectTotals) -> Result<Vec<u8>> {
    let mut writer = PageWriter::new(REPORT_TITLE)?;

    writer.line(REPORT_TITLE, TITLE_SIZE, true);
    writer.gap();

    if !totals.is_empty() {
        writer.pie_chart(totals);
    }

    writer.line("Entries:", HEADING_SIZE, true);
    if entries.is_empty() {
        writer.line("No entries", TEXT_SIZE, false);
    }
    for entry in entries {
        writer.line(&entry.to_string(), TEXT_SIZE, false);
    }

    writer.gap();
    writer.line("Total Time Spent on Projects:", HEADING_SIZE, true);
    for (project, duration) in totals {
        writer.line(
            &format!("{project}: {}", format_hours_minutes(*duration)),
            TEXT_SIZE,
            false,
        );
    }
    writer.line(
        &format!("All projects: {}", format_hours_minutes(totals.total())),
        TEXT_SIZE,
        true,
    );

    writer.finish()
}

fn export_error(e: printpdf::Error) -> TrackerError {
    TrackerError::Export(e.to_string())
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0., 0., 0., None))
}

fn slice_color(index: usize) -> Color {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn point(x: f64, y: f64) -> (Point, bool) {
    (Point::new(Mm(x as f32), Mm(y as f32)), false)
}

/// Pie slice between two fractions of the circle, starting at twelve o'clock going clockwise.
fn slice(start: f64, end: f64) -> Polygon {
    let (cx, cy) = CHART_CENTER;
    let steps = ((end - start) * ARC_SEGMENTS).ceil().max(1.) as usize;
    let mut ring = vec![point(cx, cy)];
    for step in 0..=steps {
        let fraction = start + (end - start) * step as f64 / steps as f64;
        let angle = PI / 2. - fraction * 2. * PI;
        ring.push(point(
            cx + CHART_RADIUS * angle.cos(),
            cy + CHART_RADIUS * angle.sin(),
        ));
    }
    Polygon {
        rings: vec![ring],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

fn square(x: f32, y: f32, size: f32) -> Polygon {
    let (x, y, size) = (x as f64, y as f64, size as f64);
    Polygon {
        rings: vec![vec![
            point(x, y),
            point(x + size, y),
            point(x + size, y + size),
            point(x, y + size),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::store::{entities::TimeEntry, totals::ProjectTotals};

    use super::{render_pdf, PageWriter, LINE_HEIGHT, MARGIN, REPORT_TITLE};

    fn entries(count: u32) -> Vec<TimeEntry> {
        (0..count)
            .map(|i| {
                TimeEntry::new(
                    ["Alpha", "Beta", "Gamma"][i as usize % 3],
                    NaiveDate::from_ymd_opt(2024, 1, 1 + i % 28).unwrap(),
                    NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(9 + i % 10, 0, 0).unwrap(),
                    "note, with\nline break",
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_render_empty_report() {
        let document = render_pdf(&[], &ProjectTotals::default()).unwrap();
        assert!(document.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_listing_renders() {
        let short = entries(3);
        let long = entries(200);
        let short_document = render_pdf(&short, &ProjectTotals::from_entries(&short)).unwrap();
        let long_document = render_pdf(&long, &ProjectTotals::from_entries(&long)).unwrap();

        assert!(long_document.starts_with(b"%PDF"));
        assert!(long_document.len() > short_document.len());
    }

    #[test]
    fn test_long_legend_continues_on_next_page() {
        let entries = (0..60)
            .map(|i| {
                TimeEntry::new(
                    format!("Project {i:02}"),
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(9, i % 60, 0).unwrap(),
                    "",
                )
                .unwrap()
            })
            .collect::<Vec<_>>();
        let totals = ProjectTotals::from_entries(&entries);

        let mut writer = PageWriter::new(REPORT_TITLE).unwrap();
        writer.pie_chart(&totals);

        assert_eq!(writer.pages, 2);
        assert!(writer.cursor >= MARGIN - LINE_HEIGHT);
        assert!(writer.finish().unwrap().starts_with(b"%PDF"));
    }
}
