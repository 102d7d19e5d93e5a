//! Shape inventory and overlap report for an existing deck.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{Presentation, Shape, ShapeContent, ShapeKind};
use crate::overlap::{Overlap, deck_overlaps};
use crate::units::to_inches;

/// Characters of shape text shown before the preview is cut off.
pub const PREVIEW_CHARS: usize = 50;

/// One reported shape: a text box with text, a chart, a picture or a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReport {
    pub kind: ShapeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub left_in: f64,
    pub top_in: f64,
    pub width_in: f64,
    pub height_in: f64,
    /// Rows and columns, for tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideReport {
    /// 1-based slide number.
    pub index: usize,
    pub shape_count: usize,
    /// Shapes with a text frame, empty or not.
    pub text_boxes: usize,
    pub charts: usize,
    pub pictures: usize,
    pub tables: usize,
    pub items: Vec<ItemReport>,
    pub overlaps: Vec<Overlap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckReport {
    pub width_in: f64,
    pub height_in: f64,
    pub slides: Vec<SlideReport>,
}

/// Cuts `text` to [`PREVIEW_CHARS`] characters, appending `...` when cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let mut s: String = text.chars().take(PREVIEW_CHARS).collect();
        s.push_str("...");
        s
    } else {
        text.to_string()
    }
}

fn item(shape: &Shape, text: Option<String>, table: Option<(usize, usize)>) -> ItemReport {
    ItemReport {
        kind: shape.kind(),
        name: shape.name.clone(),
        text,
        left_in: to_inches(shape.rect.x),
        top_in: to_inches(shape.rect.y),
        width_in: to_inches(shape.rect.w),
        height_in: to_inches(shape.rect.h),
        table,
    }
}

pub fn analyze(pres: &Presentation) -> DeckReport {
    let overlaps = deck_overlaps(pres);
    let slides = pres
        .slides
        .iter()
        .zip(overlaps)
        .enumerate()
        .map(|(i, (slide, overlaps))| {
            let mut report = SlideReport {
                index: i + 1,
                shape_count: slide.shapes.len(),
                text_boxes: 0,
                charts: 0,
                pictures: 0,
                tables: 0,
                items: Vec::new(),
                overlaps,
            };
            for shape in &slide.shapes {
                if shape.has_text_frame() {
                    report.text_boxes += 1;
                    let text = shape.text();
                    if !text.is_empty() {
                        report.items.push(item(shape, Some(preview(&text)), None));
                    }
                }
                match &shape.content {
                    ShapeContent::Chart(_) => {
                        report.charts += 1;
                        report.items.push(item(shape, None, None));
                    }
                    ShapeContent::Picture(_) => {
                        report.pictures += 1;
                        report.items.push(item(shape, None, None));
                    }
                    ShapeContent::Table(t) => {
                        report.tables += 1;
                        let dims = (t.row_count(), t.column_count());
                        report.items.push(item(shape, None, Some(dims)));
                    }
                    _ => {}
                }
            }
            report
        })
        .collect();

    DeckReport {
        width_in: to_inches(pres.width),
        height_in: to_inches(pres.height),
        slides,
    }
}

impl DeckReport {
    pub fn total_overlaps(&self) -> usize {
        self.slides.iter().map(|s| s.overlaps.len()).sum()
    }

    pub fn total_shapes(&self) -> usize {
        self.slides.iter().map(|s| s.shape_count).sum()
    }

    /// Human-readable report headed by `name`.
    pub fn render_text(&self, name: &str) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "{rule}\nAnalyzing: {name}\n{rule}");
        let _ = writeln!(out, "Total slides: {}", self.slides.len());
        let _ = writeln!(
            out,
            "Slide dimensions: {:.2}\" x {:.2}\"",
            self.width_in, self.height_in
        );

        for s in &self.slides {
            let _ = writeln!(out, "\nSlide {}:", s.index);
            let _ = writeln!(out, "  Total shapes: {}", s.shape_count);
            for it in &s.items {
                let pos = format!("({:.2}\", {:.2}\")", it.left_in, it.top_in);
                let size = format!("({:.2}\" x {:.2}\")", it.width_in, it.height_in);
                match (it.kind, &it.text, it.table) {
                    (_, Some(text), _) => {
                        let _ = writeln!(out, "  - Text box: {text}");
                        let _ = writeln!(out, "    Position: {pos}");
                        let _ = writeln!(out, "    Size: {size}");
                    }
                    (ShapeKind::Chart, ..) => {
                        let _ = writeln!(out, "  - Chart found at position {pos}");
                    }
                    (ShapeKind::Picture, ..) => {
                        let _ = writeln!(out, "  - Picture/Image at position {pos}");
                        let _ = writeln!(out, "    Size: {size}");
                    }
                    (_, None, Some((rows, cols))) => {
                        let _ = writeln!(out, "  - Table with {rows} rows and {cols} columns");
                    }
                    _ => {}
                }
            }
            let _ = writeln!(
                out,
                "  Summary: {} text boxes, {} charts, {} images, {} tables",
                s.text_boxes, s.charts, s.pictures, s.tables
            );
            if !s.overlaps.is_empty() {
                let _ = writeln!(
                    out,
                    "  Warning: Detected {} potential overlapping elements",
                    s.overlaps.len()
                );
            }
        }
        out
    }
}
