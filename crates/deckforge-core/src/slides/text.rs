use serde::{Deserialize, Serialize};

use super::{SlideContext, cap_height};
use crate::builder::SlideBuilder;
use crate::error::{DeckError, Result};
use crate::layout;
use crate::model::{Align, Anchor, Fill, Line, Margins, Preset, Rect, Slide, TextFrame};
use crate::units::inches;

fn require(what: &str, n: usize) -> Result<()> {
    if n == 0 {
        return Err(DeckError::InvalidInput(format!("{what} needs at least one entry")));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Numbered list of sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agenda {
    #[serde(default = "default_agenda_title")]
    pub title: String,
    pub sections: Vec<AgendaItem>,
}

fn default_agenda_title() -> String {
    "Agenda".into()
}

impl Agenda {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        require("agenda", self.sections.len())?;
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let n = self.sections.len();
        let area = cap_height(ctx.body(), n, inches(1.2));
        for (i, (row, section)) in layout::rows(area, n, inches(0.15))?
            .into_iter()
            .zip(&self.sections)
            .enumerate()
        {
            let d = inches(0.5).min(row.h);
            b.auto_shape(Preset::Oval, Rect::new(row.x, row.y, d, d))
                .set_fill(Fill::solid(pal.accent))
                .set_text(ctx.label(&(i + 1).to_string(), 14.0, pal.white));

            let text_x = row.x + d + inches(0.3);
            let text_w = row.right() - text_x;
            match &section.description {
                Some(desc) => {
                    let title_h = inches(0.45).min(row.h / 2 - inches(0.03));
                    b.text_box(
                        Rect::new(text_x, row.y, text_w, title_h),
                        TextFrame::single(ctx.para(section.title.as_str()).size(18.0)),
                    );
                    let desc_y = row.y + title_h + inches(0.05);
                    b.text_box(
                        Rect::new(text_x, desc_y, text_w, row.bottom() - desc_y),
                        TextFrame::single(
                            ctx.para(desc.as_str()).size(12.0).color(pal.subtext),
                        ),
                    );
                }
                None => {
                    b.text_box(
                        Rect::new(text_x, row.y, text_w, inches(0.5).min(row.h)),
                        TextFrame::single(ctx.para(section.title.as_str()).size(18.0)),
                    );
                }
            }
        }
        Ok(ctx.finish(b))
    }
}

/// Headline message in a framed box followed by supporting points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMessage {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub points: Vec<String>,
}

impl KeyMessage {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let (banner, rest) = ctx.body().split_top(inches(1.2), inches(0.4));
        let text = TextFrame::single(
            ctx.para(self.message.as_str())
                .size(20.0)
                .bold()
                .color(pal.primary)
                .align(Align::Center),
        )
        .anchor(Anchor::Middle)
        .margins(Margins {
            left: inches(0.5),
            right: inches(0.5),
            top: inches(0.25),
            bottom: inches(0.25),
        });
        b.rect(banner)
            .set_fill(Fill::solid(pal.background))
            .set_line(Line::new(pal.accent, 2.0))
            .set_text(text);

        if !self.points.is_empty() {
            let n = self.points.len();
            let area = cap_height(rest, n, inches(0.8));
            for (row, point) in layout::rows(area, n, inches(0.1))?.into_iter().zip(&self.points) {
                let size = inches(0.15).min(row.h / 2);
                b.auto_shape(
                    Preset::Diamond,
                    Rect::new(row.x + inches(0.4), row.y + (row.h - size) / 2, size, size),
                )
                .set_fill(Fill::solid(pal.accent));
                let text_x = row.x + inches(0.8);
                b.text_box(
                    Rect::new(text_x, row.y, row.right() - text_x, row.h),
                    TextFrame::single(ctx.para(point.as_str()).size(14.0).spacing(1.2))
                        .anchor(Anchor::Middle),
                );
            }
        }
        Ok(ctx.finish(b))
    }
}

/// Closing list of numbered takeaways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default = "default_summary_title")]
    pub title: String,
    pub takeaways: Vec<String>,
}

fn default_summary_title() -> String {
    "Key Takeaways".into()
}

impl Summary {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        require("summary", self.takeaways.len())?;
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let n = self.takeaways.len();
        let area = cap_height(ctx.body(), n, inches(1.3));
        for (i, (row, takeaway)) in layout::rows(area, n, inches(0.2))?
            .into_iter()
            .zip(&self.takeaways)
            .enumerate()
        {
            let sq = inches(0.6).min(row.h);
            b.rect(Rect::new(row.x, row.y + (row.h - sq) / 2, sq, sq))
                .set_fill(Fill::solid(pal.primary))
                .set_text(ctx.label(&(i + 1).to_string(), 18.0, pal.white));
            let box_x = row.x + sq + inches(0.2);
            b.rect(Rect::new(box_x, row.y, row.right() - box_x, row.h))
                .set_fill(Fill::solid(pal.background))
                .set_line(Line::new(pal.accent, 1.0))
                .set_text(
                    TextFrame::single(ctx.para(takeaway.as_str()).size(16.0))
                        .anchor(Anchor::Middle)
                        .margins(Margins::uniform(inches(0.2))),
                );
        }
        Ok(ctx.finish(b))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Numbered action items with an optional implementation banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub title: String,
    pub items: Vec<Recommendation>,
    #[serde(default)]
    pub timeline: Option<String>,
}

impl Recommendations {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        require("recommendations", self.items.len())?;
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let body = ctx.body();
        let banner_h = inches(1.2);
        let gap = inches(0.3);
        let main = match &self.timeline {
            Some(_) => Rect::new(body.x, body.y, body.w, (body.h - banner_h - gap).max(0)),
            None => body,
        };

        let n = self.items.len();
        let area = cap_height(main, n, inches(1.3));
        for (i, (row, item)) in layout::rows(area, n, inches(0.2))?
            .into_iter()
            .zip(&self.items)
            .enumerate()
        {
            let sq = inches(0.6).min(row.h);
            b.rect(Rect::new(row.x, row.y, sq, sq))
                .set_fill(Fill::solid(pal.primary))
                .set_text(ctx.label(&(i + 1).to_string(), 18.0, pal.white));
            let text_x = row.x + sq + inches(0.3);
            let mut paras = vec![
                ctx.para(item.title.as_str())
                    .size(16.0)
                    .bold()
                    .color(pal.primary),
            ];
            if let Some(detail) = &item.detail {
                paras.push(ctx.para(detail.as_str()).size(12.0));
            }
            b.text_box(
                Rect::new(text_x, row.y, row.right() - text_x, row.h),
                TextFrame::new(paras),
            );
        }

        if let Some(timeline) = &self.timeline {
            let banner = Rect::new(body.x, main.bottom() + gap, body.w, banner_h);
            let paras = vec![
                ctx.para("IMPLEMENTATION")
                    .size(12.0)
                    .bold()
                    .color(pal.primary),
                ctx.para(timeline.as_str()).size(14.0),
            ];
            b.rect(banner)
                .set_fill(Fill::solid(pal.background))
                .set_line(Line::new(pal.accent, 1.0))
                .set_text(
                    TextFrame::new(paras)
                        .anchor(Anchor::Middle)
                        .margins(Margins::uniform(inches(0.3))),
                );
        }
        Ok(ctx.finish(b))
    }
}
