//! Fluent construction of slides and presentations.
//!
//! ```
//! use deckforge_core::prelude::*;
//!
//! let mut slide = SlideBuilder::new();
//! slide
//!     .rect(Rect::from_inches(1.0, 1.0, 4.0, 2.0))
//!     .set_fill(Fill::solid(Color::rgb(0, 32, 96)));
//! slide.text_box(
//!     Rect::from_inches(1.0, 3.5, 4.0, 0.5),
//!     TextFrame::single(Paragraph::new("Hello").size(18.0)),
//! );
//! let pres = PresentationBuilder::new(12_192_000, 6_858_000)
//!     .push(slide.build())
//!     .build();
//! assert_eq!(pres.slides[0].shapes.len(), 2);
//! ```

use crate::config::BuildConfig;
use crate::error::{DeckError, Result};
use crate::model::{
    Chart, Color, Fill, Line, Picture, Presentation, Preset, Rect, Shape, ShapeContent, Slide,
    Table, TextFrame,
};

impl Shape {
    pub fn set_fill(&mut self, fill: Fill) -> &mut Self {
        self.fill = Some(fill);
        self
    }

    pub fn set_line(&mut self, line: Line) -> &mut Self {
        self.line = Some(line);
        self
    }

    pub fn set_text(&mut self, text: TextFrame) -> &mut Self {
        self.text = Some(text);
        self
    }
}

/// Collects shapes for one slide and hands out drawing ids.
#[derive(Debug)]
pub struct SlideBuilder {
    shapes: Vec<Shape>,
    background: Option<Color>,
    next_id: u32,
}

impl Default for SlideBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideBuilder {
    pub fn new() -> Self {
        // id 1 belongs to the slide's shape tree
        Self {
            shapes: Vec::new(),
            background: None,
            next_id: 2,
        }
    }

    fn push(&mut self, label: &str, rect: Rect, content: ShapeContent) -> &mut Shape {
        let id = self.next_id;
        self.next_id += 1;
        self.shapes.push(Shape {
            id,
            name: format!("{} {}", label, id - 1),
            rect,
            content,
            fill: None,
            line: None,
            text: None,
        });
        let idx = self.shapes.len() - 1;
        &mut self.shapes[idx]
    }

    pub fn auto_shape(&mut self, preset: Preset, rect: Rect) -> &mut Shape {
        self.push(preset.label(), rect, ShapeContent::AutoShape(preset))
    }

    pub fn rect(&mut self, rect: Rect) -> &mut Shape {
        self.auto_shape(Preset::Rectangle, rect)
    }

    pub fn text_box(&mut self, rect: Rect, text: TextFrame) -> &mut Shape {
        self.push("TextBox", rect, ShapeContent::TextBox)
            .set_text(text)
    }

    pub fn picture(&mut self, rect: Rect, picture: Picture) -> &mut Shape {
        self.push("Picture", rect, ShapeContent::Picture(picture))
    }

    pub fn chart(&mut self, rect: Rect, chart: Chart) -> Result<&mut Shape> {
        chart.validate()?;
        Ok(self.push("Chart", rect, ShapeContent::Chart(chart)))
    }

    pub fn table(&mut self, rect: Rect, table: Table) -> Result<&mut Shape> {
        if table.row_count() == 0 || table.column_count() == 0 {
            return Err(DeckError::InvalidInput("table has no cells".into()));
        }
        Ok(self.push("Table", rect, ShapeContent::Table(table)))
    }

    /// Straight line between two points. The stored rect spans the points,
    /// so a horizontal line has zero height.
    pub fn connector(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, line: Line) -> &mut Shape {
        let rect = Rect::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs());
        self.push("Straight Connector", rect, ShapeContent::Connector)
            .set_line(line)
    }

    pub fn background(&mut self, color: Color) -> &mut Self {
        self.background = Some(color);
        self
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn build(self) -> Slide {
        Slide {
            shapes: self.shapes,
            background: self.background,
        }
    }
}

/// Builder for `Presentation`.
#[derive(Debug, Clone)]
pub struct PresentationBuilder {
    pres: Presentation,
}

impl PresentationBuilder {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            pres: Presentation::new(width, height),
        }
    }

    pub fn from_config(cfg: &BuildConfig) -> Self {
        let (w, h) = cfg.dimensions();
        Self::new(w, h)
    }

    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.pres.title = Some(v.into());
        self
    }

    pub fn author(mut self, v: impl Into<String>) -> Self {
        self.pres.author = Some(v.into());
        self
    }

    pub fn push(mut self, slide: Slide) -> Self {
        self.pres.slides.push(slide);
        self
    }

    pub fn build(self) -> Presentation {
        self.pres
    }
}
