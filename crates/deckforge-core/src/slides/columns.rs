use serde::{Deserialize, Serialize};

use super::{SlideContext, cap_height};
use crate::builder::SlideBuilder;
use crate::error::{DeckError, Result};
use crate::layout;
use crate::model::{Align, Anchor, Fill, Line, Margins, Preset, Rect, Slide, TextFrame};
use crate::units::inches;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonItem {
    pub title: String,
    #[serde(default)]
    pub points: Vec<String>,
}

/// Side-by-side columns, each with a filled header and a bullet list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub title: String,
    pub columns: Vec<ComparisonItem>,
}

impl Comparison {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        if self.columns.is_empty() {
            return Err(DeckError::InvalidInput("comparison needs at least one column".into()));
        }
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let cols = layout::columns(ctx.body(), self.columns.len(), inches(0.3))?;
        for (col, item) in cols.into_iter().zip(&self.columns) {
            let (header, _) = col.split_top(inches(0.8), 0);
            b.rect(header)
                .set_fill(Fill::solid(pal.primary))
                .set_text(ctx.label(&item.title, 16.0, pal.white));

            let top = col.y + inches(0.9);
            let content = Rect::new(col.x, top, col.w, (col.bottom() - top).max(0));
            let paras = item.points.iter().map(|p| ctx.bullet(p, 12.0)).collect();
            b.rect(content)
                .set_fill(Fill::solid(pal.background))
                .set_line(Line::new(pal.subtext, 0.5))
                .set_text(TextFrame::new(paras).margins(Margins::uniform(inches(0.2))));
        }
        Ok(ctx.finish(b))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessStep {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Left-to-right chevron chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessFlow {
    pub title: String,
    pub steps: Vec<ProcessStep>,
}

impl ProcessFlow {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        if self.steps.is_empty() {
            return Err(DeckError::InvalidInput("process flow needs at least one step".into()));
        }
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let body = ctx.body();
        let cols = layout::columns(body, self.steps.len(), inches(0.1))?;
        for (i, (col, step)) in cols.into_iter().zip(&self.steps).enumerate() {
            let preset = if i == 0 {
                Preset::Pentagon
            } else {
                Preset::Chevron
            };
            b.auto_shape(preset, Rect::new(col.x, col.y, col.w, inches(1.0)))
                .set_fill(Fill::solid(pal.series_color(i)))
                .set_text(ctx.label(&step.title, 14.0, pal.white));

            if let Some(desc) = &step.description {
                let top = col.y + inches(1.2);
                let h = inches(2.5).min(body.bottom() - top);
                if h > 0 {
                    b.text_box(
                        Rect::new(col.x, top, col.w, h),
                        TextFrame::single(
                            ctx.para(desc.as_str())
                                .size(12.0)
                                .align(Align::Center)
                                .spacing(1.1),
                        ),
                    );
                }
            }
        }
        Ok(ctx.finish(b))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiCard {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Grid of headline metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiCards {
    pub title: String,
    pub cards: Vec<KpiCard>,
    /// Cards per row; defaults to up to four.
    #[serde(default)]
    pub columns: Option<usize>,
}

impl KpiCards {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let n = self.cards.len();
        if n == 0 {
            return Err(DeckError::InvalidInput("kpi cards need at least one card".into()));
        }
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let ncols = self.columns.unwrap_or(n.min(4)).clamp(1, n);
        let nrows = n.div_ceil(ncols);
        let area = cap_height(ctx.body(), nrows, inches(2.2));
        let cells = layout::grid(area, nrows, ncols, inches(0.3), inches(0.3))?;
        for (i, (cell, card)) in cells.into_iter().zip(&self.cards).enumerate() {
            let mut paras = vec![
                ctx.para(card.value.as_str())
                    .size(32.0)
                    .bold()
                    .color(pal.white)
                    .align(Align::Center),
                ctx.para(card.label.as_str())
                    .size(14.0)
                    .color(pal.white)
                    .align(Align::Center),
            ];
            if let Some(detail) = &card.detail {
                paras.push(
                    ctx.para(detail.as_str())
                        .size(11.0)
                        .color(pal.white)
                        .align(Align::Center),
                );
            }
            b.auto_shape(Preset::RoundedRectangle, cell)
                .set_fill(Fill::solid(pal.series_color(i)))
                .set_text(TextFrame::new(paras).anchor(Anchor::Middle));
        }
        Ok(ctx.finish(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::test_support::*;

    #[test]
    fn comparison_columns_are_disjoint() {
        let pal = palette();
        let ctx = ctx(&pal);
        let cmp = Comparison {
            title: "Build vs buy".into(),
            columns: vec![
                ComparisonItem {
                    title: "Build".into(),
                    points: vec!["Full control".into(), "18 month timeline".into()],
                },
                ComparisonItem {
                    title: "Buy".into(),
                    points: vec!["Faster launch".into()],
                },
                ComparisonItem {
                    title: "Partner".into(),
                    points: vec![],
                },
            ],
        };
        let slide = cmp.render(&ctx).unwrap();
        assert_eq!(slide.shapes.len(), 1 + 3 * 2 + 1);
        assert_eq!(slide.shapes[1].text(), "Build");
        assert!(slide.shapes[2].text().starts_with('\u{2022}'));
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);
    }

    #[test]
    fn process_flow_starts_with_pentagon() {
        let pal = palette();
        let ctx = ctx(&pal);
        let flow = ProcessFlow {
            title: "Rollout".into(),
            steps: ["Assess", "Design", "Pilot", "Scale", "Sustain"]
                .iter()
                .map(|t| ProcessStep {
                    title: t.to_string(),
                    description: Some("Four weeks".into()),
                })
                .collect(),
        };
        let slide = flow.render(&ctx).unwrap();
        assert_eq!(
            slide.shapes[1].content,
            crate::model::ShapeContent::AutoShape(Preset::Pentagon)
        );
        assert_eq!(
            slide.shapes[3].content,
            crate::model::ShapeContent::AutoShape(Preset::Chevron)
        );
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);
    }

    #[test]
    fn kpi_cards_wrap_into_rows() {
        let pal = palette();
        let ctx = ctx(&pal);
        let kpis = KpiCards {
            title: "Impact".into(),
            cards: (0..6)
                .map(|i| KpiCard {
                    value: format!("{}%", 10 * i),
                    label: "Reduction".into(),
                    detail: None,
                })
                .collect(),
            columns: Some(3),
        };
        let slide = kpis.render(&ctx).unwrap();
        assert_eq!(slide.shapes.len(), 1 + 6 + 1);
        // second row starts below the first
        assert!(slide.shapes[4].rect.y > slide.shapes[1].rect.bottom());
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);
    }
}
