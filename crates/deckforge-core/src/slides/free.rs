use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::SlideContext;
use super::data::{ChartSpec, load_picture};
use crate::builder::SlideBuilder;
use crate::error::{DeckError, Result};
use crate::model::{
    Align, Anchor, Color, Fill, Font, Line, Paragraph, Preset, Rect, Slide, Table, TextFrame,
};

/// Shape kinds accepted by free-form slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeKind {
    Rectangle,
    RoundedRectangle,
    Oval,
    Diamond,
    Chevron,
    RightArrow,
    Pentagon,
    Text,
    Image,
    Chart,
    Table,
    /// Straight connector from the top-left to the bottom-right of `at`.
    Line,
}

impl FreeKind {
    pub fn preset(&self) -> Option<Preset> {
        Some(match self {
            FreeKind::Rectangle => Preset::Rectangle,
            FreeKind::RoundedRectangle => Preset::RoundedRectangle,
            FreeKind::Oval => Preset::Oval,
            FreeKind::Diamond => Preset::Diamond,
            FreeKind::Chevron => Preset::Chevron,
            FreeKind::RightArrow => Preset::RightArrow,
            FreeKind::Pentagon => Preset::Pentagon,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineSpec {
    pub color: Color,
    #[serde(default = "default_line_width")]
    pub width_pt: f64,
}

fn default_line_width() -> f64 {
    1.0
}

/// A single string or one string per paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextContent {
    One(String),
    Many(Vec<String>),
}

impl TextContent {
    pub fn lines(&self) -> Vec<&str> {
        match self {
            TextContent::One(s) => s.lines().collect(),
            TextContent::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// One literally positioned shape. `at` is `[x, y, w, h]` in inches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub shape: FreeKind,
    pub at: [f64; 4],
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default)]
    pub transparency: Option<f32>,
    #[serde(default)]
    pub line: Option<LineSpec>,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub font: Option<Font>,
    #[serde(default)]
    pub align: Option<Align>,
    #[serde(default)]
    pub anchor: Option<Anchor>,
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub chart: Option<ChartSpec>,
    #[serde(default)]
    pub table: Option<Vec<Vec<String>>>,
    /// Style the first table row as a header.
    #[serde(default = "default_table_header")]
    pub header: bool,
}

fn default_table_header() -> bool {
    true
}

impl ShapeSpec {
    fn rect(&self) -> Result<Rect> {
        let [x, y, w, h] = self.at;
        if self.at.iter().any(|v| !v.is_finite()) || w < 0.0 || h < 0.0 {
            return Err(DeckError::InvalidInput(format!(
                "{:?} shape has invalid position {:?}",
                self.shape, self.at
            )));
        }
        Ok(Rect::from_inches(x, y, w, h))
    }

    fn text_frame(&self, ctx: &SlideContext) -> Option<TextFrame> {
        let content = self.text.as_ref()?;
        let paras = content
            .lines()
            .into_iter()
            .map(|line| self.styled(ctx, line))
            .collect();
        let anchor = self.anchor.unwrap_or(if self.shape == FreeKind::Text {
            Anchor::Top
        } else {
            Anchor::Middle
        });
        Some(TextFrame::new(paras).anchor(anchor))
    }

    fn styled(&self, ctx: &SlideContext, line: &str) -> Paragraph {
        let mut p = ctx.para(line).size(14.0);
        if self.shape != FreeKind::Text {
            p = p.align(Align::Center);
        }
        if let Some(font) = &self.font {
            if let Some(family) = &font.family {
                p = p.family(family);
            }
            if let Some(size) = font.size {
                p = p.size(size);
            }
            if let Some(color) = font.color {
                p = p.color(color);
            }
            p.font.bold = font.bold;
            p.font.italic = font.italic;
        }
        if let Some(align) = self.align {
            p = p.align(align);
        }
        p
    }

    fn missing(&self, what: &str) -> DeckError {
        DeckError::InvalidInput(format!("{:?} shape needs `{what}`", self.shape))
    }
}

/// Slide whose shapes are placed at literal coordinates. Nothing stops
/// these shapes from overlapping; the overlap check reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSlide {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub shapes: Vec<ShapeSpec>,
}

impl FreeSlide {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        if let Some(bg) = self.background {
            b.background(bg);
        }
        if let Some(title) = &self.title {
            ctx.add_title(&mut b, title);
        }

        for spec in &self.shapes {
            let rect = spec.rect()?;
            let fill = spec
                .fill
                .map(|c| Fill::solid(c).with_transparency(spec.transparency.unwrap_or(0.0)));
            let line = spec.line.map(|l| Line::new(l.color, l.width_pt));

            let shape = match spec.shape {
                FreeKind::Text => {
                    let text = spec
                        .text_frame(ctx)
                        .ok_or_else(|| spec.missing("text"))?;
                    b.text_box(rect, text)
                }
                FreeKind::Image => {
                    let path = spec.image.as_ref().ok_or_else(|| spec.missing("image"))?;
                    b.picture(rect, load_picture(ctx, path)?)
                }
                FreeKind::Chart => {
                    let chart = spec.chart.as_ref().ok_or_else(|| spec.missing("chart"))?;
                    b.chart(rect, chart.to_chart(pal))?
                }
                FreeKind::Table => {
                    let rows = spec.table.clone().ok_or_else(|| spec.missing("table"))?;
                    let table = Table {
                        rows,
                        header: spec.header,
                        header_fill: Some(pal.primary),
                        header_color: Some(pal.white),
                        band_fill: Some(pal.background),
                        font_size: spec.font.as_ref().and_then(|f| f.size),
                    };
                    b.table(rect, table)?
                }
                FreeKind::Line => {
                    let line = line.unwrap_or_else(|| Line::new(pal.primary, 1.0));
                    b.connector(rect.x, rect.y, rect.right(), rect.bottom(), line);
                    continue;
                }
                kind => {
                    // every remaining kind maps to a preset
                    let Some(preset) = kind.preset() else {
                        continue;
                    };
                    let shape = b.auto_shape(preset, rect);
                    if let Some(text) = spec.text_frame(ctx) {
                        shape.set_text(text);
                    }
                    shape
                }
            };
            if let Some(fill) = fill {
                shape.set_fill(fill);
            }
            if let Some(line) = line {
                shape.set_line(line);
            }
        }
        Ok(ctx.finish(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ShapeContent, ShapeKind};
    use crate::slides::test_support::*;

    const YAML: &str = r##"
title: Architecture
background: "#F5F5F5"
shapes:
  - shape: rounded_rectangle
    at: [1.0, 2.0, 3.0, 1.0]
    fill: "#0066CC"
    text: Ledger
    font: { size: 16, bold: true, color: "#FFFFFF" }
  - shape: right_arrow
    at: [4.2, 2.3, 1.0, 0.4]
    fill: "#FF6B35"
  - shape: text
    at: [5.4, 2.0, 3.0, 1.0]
    text: ["Hospital A", "Hospital B"]
  - shape: line
    at: [1.0, 3.5, 7.0, 0.0]
    line: { color: "#333333", width_pt: 2 }
"##;

    #[test]
    fn parses_and_renders_literal_shapes() {
        let free: FreeSlide = serde_yaml::from_str(YAML).unwrap();
        let pal = palette();
        let ctx = ctx(&pal);
        let slide = free.render(&ctx).unwrap();
        assert_eq!(slide.background, Some(Color::rgb(0xF5, 0xF5, 0xF5)));
        // title + 4 shapes + number
        assert_eq!(slide.shapes.len(), 6);

        let ledger = &slide.shapes[1];
        assert_eq!(
            ledger.content,
            ShapeContent::AutoShape(Preset::RoundedRectangle)
        );
        let para = &ledger.text.as_ref().unwrap().paragraphs[0];
        assert_eq!(para.font.size, Some(16.0));
        assert!(para.font.bold);
        assert_eq!(para.font.color, Some(Color::WHITE));
        assert_eq!(slide.shapes[3].text(), "Hospital A\nHospital B");
        assert_eq!(slide.shapes[4].kind(), ShapeKind::Connector);
        assert_eq!(slide.shapes[4].line.unwrap().width, 25_400);
        assert_disjoint(&slide);
    }

    #[test]
    fn literal_overlaps_are_kept() {
        let free: FreeSlide = serde_yaml::from_str(
            r#"
shapes:
  - { shape: rectangle, at: [1, 1, 2, 2] }
  - { shape: oval, at: [2, 2, 2, 2] }
"#,
        )
        .unwrap();
        let pal = palette();
        let slide = free.render(&ctx(&pal)).unwrap();
        let found = crate::overlap::slide_overlaps(&slide);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].first, found[0].second), (0, 1));
    }

    #[test]
    fn missing_payloads_are_errors() {
        let pal = palette();
        for yaml in [
            "shapes: [{ shape: text, at: [0, 0, 1, 1] }]",
            "shapes: [{ shape: chart, at: [0, 0, 1, 1] }]",
            "shapes: [{ shape: rectangle, at: [0, 0, -1, 1] }]",
        ] {
            let free: FreeSlide = serde_yaml::from_str(yaml).unwrap();
            assert!(free.render(&ctx(&pal)).is_err(), "{yaml}");
        }
    }
}
