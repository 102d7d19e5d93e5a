use serde::{Deserialize, Serialize};

use super::SlideContext;
use crate::builder::SlideBuilder;
use crate::error::{DeckError, Result};
use crate::layout;
use crate::model::{Align, Fill, Line, Preset, Rect, Slide, TextFrame};
use crate::units::inches;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    /// Label above the marker, e.g. "Q1 2025".
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Horizontal timeline: evenly spread markers joined by line segments,
/// dates above and descriptions below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub title: String,
    pub milestones: Vec<Milestone>,
}

impl Timeline {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let n = self.milestones.len();
        if n == 0 {
            return Err(DeckError::InvalidInput("timeline needs at least one milestone".into()));
        }
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let body = ctx.body();
        let xs = layout::spread(body, n)?;
        let spacing = layout::spread_spacing(body, n);
        let d = inches(0.5).min(spacing - inches(0.2));
        if d <= 0 {
            return Err(DeckError::InvalidLayout(format!(
                "timeline: {n} milestones do not fit in {} EMU",
                body.w
            )));
        }
        let line_y = body.y + body.h * 4 / 10;
        let gap = inches(0.1);
        let bw = (spacing - inches(0.15)).min(inches(2.5));
        let line = Line::new(pal.primary, 2.0);

        for (i, (&x, ms)) in xs.iter().zip(&self.milestones).enumerate() {
            b.auto_shape(Preset::Oval, Rect::new(x - d / 2, line_y - d / 2, d, d))
                .set_fill(Fill::solid(pal.secondary));

            if let Some(&next) = xs.get(i + 1) {
                let x1 = x + d / 2 + gap;
                let x2 = next - d / 2 - gap;
                if x2 > x1 {
                    b.connector(x1, line_y, x2, line_y, line);
                }
            }

            let date_y = line_y - d / 2 - inches(0.15) - inches(0.5);
            b.text_box(
                Rect::new(x - bw / 2, date_y, bw, inches(0.5)),
                TextFrame::single(
                    ctx.para(ms.date.as_str())
                        .size(14.0)
                        .bold()
                        .color(pal.primary)
                        .align(Align::Center),
                ),
            );

            let text_y = line_y + d / 2 + inches(0.15);
            let text_h = inches(1.5).min(body.bottom() - text_y);
            if text_h > 0 {
                let mut paras = vec![
                    ctx.para(ms.title.as_str())
                        .size(14.0)
                        .bold()
                        .align(Align::Center),
                ];
                if let Some(desc) = &ms.description {
                    paras.push(
                        ctx.para(desc.as_str())
                            .size(11.0)
                            .color(pal.subtext)
                            .align(Align::Center),
                    );
                }
                b.text_box(Rect::new(x - bw / 2, text_y, bw, text_h), TextFrame::new(paras));
            }
        }
        Ok(ctx.finish(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;
    use crate::slides::test_support::*;

    fn milestones(n: usize) -> Vec<Milestone> {
        (0..n)
            .map(|i| Milestone {
                date: format!("Q{}", i % 4 + 1),
                title: format!("Phase {i}"),
                description: Some("Details".into()),
            })
            .collect()
    }

    #[test]
    fn segments_join_neighbouring_markers() {
        let pal = palette();
        let ctx = ctx(&pal);
        let slide = Timeline {
            title: "Roadmap".into(),
            milestones: milestones(4),
        }
        .render(&ctx)
        .unwrap();
        let connectors = slide
            .shapes
            .iter()
            .filter(|s| s.kind() == ShapeKind::Connector)
            .count();
        assert_eq!(connectors, 3);
        // title + 4 * (circle, date, text) + 3 segments + number
        assert_eq!(slide.shapes.len(), 1 + 12 + 3 + 1);
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);
    }

    #[test]
    fn dense_timelines_stay_disjoint() {
        let pal = palette();
        let ctx = ctx(&pal);
        let slide = Timeline {
            title: "Roadmap".into(),
            milestones: milestones(8),
        }
        .render(&ctx)
        .unwrap();
        assert_disjoint(&slide);
    }

    #[test]
    fn empty_timeline_is_rejected() {
        let pal = palette();
        let t = Timeline {
            title: "Roadmap".into(),
            milestones: vec![],
        };
        assert!(t.render(&ctx(&pal)).is_err());
    }
}
