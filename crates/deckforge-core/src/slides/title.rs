use serde::{Deserialize, Serialize};

use super::SlideContext;
use crate::builder::SlideBuilder;
use crate::error::Result;
use crate::model::{Align, Anchor, Line, Rect, Slide, TextFrame};
use crate::units::inches;

/// Opening slide: title, subtitle, presenters and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleSlide {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub presenters: Vec<String>,
    /// Free text such as "March 2025". Omitted when absent.
    #[serde(default)]
    pub date: Option<String>,
    /// Primary-coloured background with light text.
    #[serde(default)]
    pub dark: bool,
}

impl TitleSlide {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let (title_color, body_color, muted) = if self.dark {
            (pal.white, pal.white, pal.background)
        } else {
            (pal.primary, pal.text, pal.subtext)
        };

        let mut b = SlideBuilder::new();
        if self.dark {
            b.background(pal.primary);
        }

        let x = inches(1.0);
        let w = ctx.width - 2 * x;
        let title = Rect::new(x, ctx.height * 3 / 10, w, inches(1.4));
        b.text_box(
            title,
            TextFrame::single(
                ctx.para(self.title.to_uppercase())
                    .size(40.0)
                    .bold()
                    .color(title_color),
            )
            .anchor(Anchor::Bottom),
        );

        let mut y = title.bottom() + inches(0.15);
        if let Some(sub) = &self.subtitle {
            let r = Rect::new(x, y, w, inches(0.8));
            b.text_box(
                r,
                TextFrame::single(ctx.para(sub.as_str()).size(24.0).color(body_color)),
            );
            y = r.bottom();
        }

        y += inches(0.2);
        b.connector(x, y, x + w.min(inches(6.0)), y, Line::new(pal.accent, 2.0));

        if !self.presenters.is_empty() {
            let r = Rect::new(x, y + inches(0.2), w, inches(0.5));
            b.text_box(
                r,
                TextFrame::single(
                    ctx.para(self.presenters.join(" | "))
                        .size(14.0)
                        .color(muted),
                ),
            );
        }

        if let Some(date) = &self.date {
            let r = Rect::new(x, ctx.height - inches(1.0), inches(4.0).min(w), inches(0.5));
            b.text_box(
                r,
                TextFrame::single(ctx.para(date.as_str()).size(14.0).color(muted)),
            );
        }

        // title slides are never numbered
        Ok(b.build())
    }
}

/// Full-bleed section break, e.g. "Appendix".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Divider {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl Divider {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        b.background(pal.primary);

        let x = inches(1.0);
        let w = ctx.width - 2 * x;
        let title = Rect::new(x, ctx.height / 2 - inches(0.75), w, inches(1.5));
        b.text_box(title, ctx.label(&self.title.to_uppercase(), 40.0, pal.white));

        if let Some(sub) = &self.subtitle {
            let r = Rect::new(x, title.bottom() + inches(0.2), w, inches(0.6));
            b.text_box(
                r,
                TextFrame::single(
                    ctx.para(sub.as_str())
                        .size(20.0)
                        .color(pal.background)
                        .align(Align::Center),
                ),
            );
        }
        Ok(b.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;
    use crate::slides::test_support::*;

    #[test]
    fn title_slide_has_no_number_and_no_overlaps() {
        let pal = palette();
        let ctx = ctx(&pal);
        let slide = TitleSlide {
            title: "MediChain".into(),
            subtitle: Some("Blockchain records for tier-2 hospitals".into()),
            presenters: vec!["A. Rao".into(), "K. Mehta".into()],
            date: Some("March 2025".into()),
            dark: false,
        }
        .render(&ctx)
        .unwrap();
        assert_eq!(slide.shapes.len(), 5);
        assert_eq!(slide.shapes[0].text(), "MEDICHAIN");
        assert!(slide.shapes.iter().all(|s| s.text() != "2"));
        assert_eq!(slide.shapes[2].kind(), ShapeKind::Connector);
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);
    }

    #[test]
    fn divider_uses_background_instead_of_a_shape() {
        let pal = palette();
        let ctx = ctx(&pal);
        let slide = Divider {
            title: "Appendix".into(),
            subtitle: Some("Supporting analysis".into()),
        }
        .render(&ctx)
        .unwrap();
        assert_eq!(slide.background, Some(pal.primary));
        assert_eq!(slide.shapes.len(), 2);
        assert_disjoint(&slide);
    }
}
