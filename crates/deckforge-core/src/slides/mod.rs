//! Slide templates.
//!
//! Every template takes typed content plus a [`SlideContext`] (page size,
//! palette, typeface, slide number) and lays its shapes out with the helpers
//! in [`crate::layout`]. Templates keep a gap between neighbouring shapes, so
//! their output reports no overlaps.
//!
//! Slides with a header band can also carry deck chrome: a logo area to the
//! right of the title and a chevron navigation bar between header and body.

use std::path::Path;

use crate::builder::SlideBuilder;
use crate::layout;
use crate::model::{
    Align, Anchor, Color, Fill, Margins, Paragraph, Preset, Rect, Slide, TextFrame,
};
use crate::theme::Palette;
use crate::units::inches;

pub mod columns;
pub mod data;
pub mod free;
pub mod matrix;
pub mod text;
pub mod timeline;
pub mod title;

pub use columns::{Comparison, ComparisonItem, KpiCard, KpiCards, ProcessFlow, ProcessStep};
pub use data::{ChartSlide, ChartSpec, ImageSlide, TableSlide};
pub use free::{FreeKind, FreeSlide, LineSpec, ShapeSpec, TextContent};
pub use matrix::{Matrix, Quadrant, Swot};
pub use text::{Agenda, AgendaItem, KeyMessage, Recommendation, Recommendations, Summary};
pub use timeline::{Milestone, Timeline};
pub use title::{Divider, TitleSlide};

/// Everything a template needs to know about the slide it renders.
#[derive(Debug, Clone, Copy)]
pub struct SlideContext<'a> {
    /// Slide width in EMU.
    pub width: i64,
    /// Slide height in EMU.
    pub height: i64,
    pub palette: &'a Palette,
    pub font: &'a str,
    /// 1-based position in the deck.
    pub number: usize,
    pub slide_numbers: bool,
    /// Directory that relative image paths resolve against.
    pub base_dir: &'a Path,
    pub navigation: Option<Navigation<'a>>,
    /// Text of the logo area, if the deck has one.
    pub logo: Option<&'a str>,
}

/// Section bar shown under the header; `current` indexes `sections`.
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
    pub sections: &'a [String],
    pub current: usize,
}

impl SlideContext<'_> {
    pub fn margin(&self) -> i64 {
        inches(0.6)
    }

    /// Title band. Leaves room for the logo area when there is one.
    pub fn header(&self) -> Rect {
        let m = self.margin();
        let mut w = self.width - 2 * m;
        if self.logo.is_some() {
            w -= LOGO_WIDTH + CHROME_GAP;
        }
        Rect::new(m, inches(0.4), w.max(0), inches(0.7))
    }

    fn logo_rect(&self) -> Rect {
        let h = self.header();
        Rect::new(self.width - self.margin() - LOGO_WIDTH, h.y, LOGO_WIDTH, h.h)
    }

    /// Strip between the header and the body.
    fn navigation_rect(&self) -> Rect {
        let m = self.margin();
        Rect::new(m, inches(1.15), self.width - 2 * m, inches(0.3))
    }

    /// Content area between the header and the slide-number strip.
    pub fn body(&self) -> Rect {
        let m = self.margin();
        let top = inches(1.5);
        let bottom = self.height - inches(0.75);
        Rect::new(m, top, self.width - 2 * m, (bottom - top).max(0))
    }

    /// A paragraph in the deck typeface and body colour.
    pub fn para(&self, text: impl Into<String>) -> Paragraph {
        Paragraph::new(text)
            .family(self.font)
            .color(self.palette.text)
    }

    pub fn bullet(&self, text: &str, size: f32) -> Paragraph {
        self.para(format!("\u{2022} {text}")).size(size).spacing(1.2)
    }

    /// Upper-cased bold slide title in the header band.
    pub fn add_title(&self, b: &mut SlideBuilder, title: &str) {
        let p = self
            .para(title.to_uppercase())
            .size(24.0)
            .bold()
            .color(self.palette.primary);
        b.text_box(self.header(), TextFrame::single(p).anchor(Anchor::Middle));
        self.add_chrome(b);
    }

    fn add_chrome(&self, b: &mut SlideBuilder) {
        if let Some(logo) = self.logo {
            let p = self
                .para(logo)
                .size(8.0)
                .color(self.palette.subtext)
                .align(Align::Center);
            b.text_box(self.logo_rect(), TextFrame::single(p).anchor(Anchor::Middle));
        }
        let Some(nav) = self.navigation else {
            return;
        };
        let Ok(cells) = layout::columns(self.navigation_rect(), nav.sections.len(), CHROME_GAP / 2)
        else {
            return;
        };
        for (i, (section, cell)) in nav.sections.iter().zip(cells).enumerate() {
            let color = if i == nav.current {
                self.palette.secondary
            } else {
                self.palette.subtext
            };
            b.auto_shape(Preset::Chevron, cell)
                .set_fill(Fill::solid(color))
                .set_text(
                    self.label(&section.to_uppercase(), 9.0, self.palette.white)
                        .margins(Margins {
                            left: 0,
                            right: 0,
                            top: 0,
                            bottom: 0,
                        }),
                );
        }
    }

    /// Centred single-paragraph label in white, for text on filled shapes.
    pub fn label(&self, text: &str, size: f32, color: Color) -> TextFrame {
        TextFrame::single(
            self.para(text)
                .size(size)
                .bold()
                .color(color)
                .align(Align::Center),
        )
        .anchor(Anchor::Middle)
    }

    fn number_rect(&self) -> Rect {
        let w = inches(0.6);
        Rect::new(
            self.width - self.margin() - w,
            self.height - inches(0.55),
            w,
            inches(0.35),
        )
    }

    /// Adds the slide number (when enabled) and builds the slide.
    pub fn finish(&self, mut b: SlideBuilder) -> Slide {
        if self.slide_numbers {
            let p = self
                .para(self.number.to_string())
                .size(10.0)
                .color(self.palette.subtext)
                .align(Align::Right);
            b.text_box(self.number_rect(), TextFrame::single(p));
        }
        b.build()
    }
}

const LOGO_WIDTH: i64 = 1_371_600;
const CHROME_GAP: i64 = 91_440;

/// Caps a stack of `n` items at `per_item` height each so short lists do not
/// stretch over the whole body.
pub(crate) fn cap_height(area: Rect, n: usize, per_item: i64) -> Rect {
    Rect::new(area.x, area.y, area.w, area.h.min(per_item * n as i64))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::theme::{Palette, ThemeName};

    pub fn palette() -> Palette {
        Palette::named(ThemeName::Mckinsey)
    }

    pub fn ctx(palette: &Palette) -> SlideContext<'_> {
        SlideContext {
            width: 12_192_000,
            height: 6_858_000,
            palette,
            font: "Arial",
            number: 2,
            slide_numbers: true,
            base_dir: Path::new("."),
            navigation: None,
            logo: None,
        }
    }

    pub fn assert_disjoint(slide: &Slide) {
        let found = crate::overlap::slide_overlaps(slide);
        assert!(
            found.is_empty(),
            "overlapping shapes: {:?}",
            found
                .iter()
                .map(|o| (&slide.shapes[o.first].name, &slide.shapes[o.second].name))
                .collect::<Vec<_>>()
        );
    }

    pub fn assert_on_page(slide: &Slide, ctx: &SlideContext) {
        let page = Rect::new(0, 0, ctx.width, ctx.height);
        for s in &slide.shapes {
            assert!(page.contains(&s.rect), "{} leaves the page: {:?}", s.name, s.rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::model::{ShapeContent, ShapeKind};

    #[test]
    fn chrome_sits_between_header_and_body() {
        let pal = palette();
        let sections: Vec<String> = ["Problem", "Solution", "Impact"].map(String::from).to_vec();
        let ctx = SlideContext {
            navigation: Some(Navigation {
                sections: &sections,
                current: 1,
            }),
            logo: Some("[Logo]"),
            ..ctx(&pal)
        };
        let km = KeyMessage {
            title: "Why now".into(),
            message: "70% of tier-2 patients carry paper records".into(),
            points: vec!["Fragmented data".into()],
        };
        let slide = km.render(&ctx).unwrap();
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);

        assert!(slide.shapes[0].rect.right() < ctx.logo_rect().x);
        let logo = &slide.shapes[1];
        assert_eq!(logo.kind(), ShapeKind::TextBox);
        assert_eq!(logo.text(), "[Logo]");

        let chevrons: Vec<_> = slide
            .shapes
            .iter()
            .filter(|s| s.content == ShapeContent::AutoShape(Preset::Chevron))
            .collect();
        assert_eq!(chevrons.len(), 3);
        assert_eq!(chevrons[1].text(), "SOLUTION");
        assert_eq!(chevrons[1].fill.map(|f| f.color), Some(pal.secondary));
        assert_eq!(chevrons[0].fill.map(|f| f.color), Some(pal.subtext));
        for c in &chevrons {
            assert!(c.rect.y > ctx.header().bottom());
            assert!(c.rect.bottom() < ctx.body().y);
        }
    }

    #[test]
    fn no_chrome_by_default() {
        let pal = palette();
        let ctx = ctx(&pal);
        assert_eq!(ctx.header().w, ctx.width - 2 * ctx.margin());
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, "Plain");
        assert_eq!(b.build().shapes.len(), 1);
    }
}
