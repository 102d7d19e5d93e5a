use serde::{Deserialize, Serialize};

use super::SlideContext;
use crate::builder::SlideBuilder;
use crate::error::{DeckError, Result};
use crate::layout;
use crate::model::{Align, Anchor, Fill, Line, Margins, Preset, Rect, Slide, TextFrame};
use crate::units::inches;

const QUADRANT_ITEMS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quadrant {
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// 2x2 matrix with axis labels. Quadrants are given in reading order
/// (top-left, top-right, bottom-left, bottom-right).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matrix {
    pub title: String,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    pub quadrants: Vec<Quadrant>,
}

impl Matrix {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        if self.quadrants.len() != 4 {
            return Err(DeckError::InvalidInput(format!(
                "matrix needs exactly 4 quadrants, got {}",
                self.quadrants.len()
            )));
        }
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let body = ctx.body();
        let grid_x = body.x + inches(1.4);
        let grid = Rect::new(
            grid_x,
            body.y,
            body.right() - grid_x,
            (body.h - inches(0.6)).max(0),
        );

        if let Some(label) = &self.y_label {
            b.text_box(
                Rect::new(body.x, grid.y, inches(1.2), grid.h),
                ctx.label(label, 12.0, pal.subtext),
            );
        }
        if let Some(label) = &self.x_label {
            b.text_box(
                Rect::new(grid.x, grid.bottom() + inches(0.2), grid.w, inches(0.4)),
                ctx.label(label, 12.0, pal.subtext),
            );
        }

        let colors = [pal.accent, pal.success, pal.warning, pal.secondary];
        let cells = layout::grid(grid, 2, 2, inches(0.3), inches(0.3))?;
        for ((cell, quad), color) in cells.into_iter().zip(&self.quadrants).zip(colors) {
            let mut paras = vec![
                ctx.para(quad.title.as_str())
                    .size(16.0)
                    .bold()
                    .color(pal.primary),
            ];
            paras.extend(
                quad.items
                    .iter()
                    .take(QUADRANT_ITEMS)
                    .map(|item| ctx.bullet(item, 12.0)),
            );
            b.rect(cell)
                .set_fill(Fill::solid(color).with_transparency(0.8))
                .set_line(Line::new(color, 1.0))
                .set_text(TextFrame::new(paras).margins(Margins::uniform(inches(0.2))));
        }
        Ok(ctx.finish(b))
    }
}

/// Strengths / weaknesses / opportunities / threats grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swot {
    #[serde(default = "default_swot_title")]
    pub title: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
}

fn default_swot_title() -> String {
    "SWOT Analysis".into()
}

impl Swot {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let sections = [
            ("STRENGTHS", &self.strengths, pal.success),
            ("WEAKNESSES", &self.weaknesses, pal.danger),
            ("OPPORTUNITIES", &self.opportunities, pal.secondary),
            ("THREATS", &self.threats, pal.warning),
        ];
        let cells = layout::grid(ctx.body(), 2, 2, inches(0.3), inches(0.3))?;
        for (cell, (heading, items, color)) in cells.into_iter().zip(sections) {
            let mut paras = vec![
                ctx.para(heading)
                    .size(18.0)
                    .bold()
                    .color(pal.white)
                    .align(Align::Center),
            ];
            paras.extend(items.iter().map(|i| ctx.bullet(i, 12.0).color(pal.white)));
            b.auto_shape(Preset::RoundedRectangle, cell)
                .set_fill(Fill::solid(color))
                .set_text(
                    TextFrame::new(paras)
                        .anchor(Anchor::Top)
                        .margins(Margins::uniform(inches(0.2))),
                );
        }
        Ok(ctx.finish(b))
    }
}
