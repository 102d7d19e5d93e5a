use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SlideContext;
use crate::builder::SlideBuilder;
use crate::error::{DeckError, Result};
use crate::layout;
use crate::model::{
    Align, Chart, ChartKind, Fill, Margins, Picture, Rect, Series, Slide, Table, TextFrame,
};
use crate::theme::Palette;
use crate::units::inches;

/// Chart content as written in a deck file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    /// Defaults to on for multi-series and pie/doughnut charts.
    #[serde(default)]
    pub legend: Option<bool>,
    #[serde(default)]
    pub data_labels: bool,
}

impl ChartSpec {
    /// Resolves defaults: uncoloured series take palette colours in order.
    pub fn to_chart(&self, palette: &Palette) -> Chart {
        let series = self
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| Series {
                color: s.color.or(Some(palette.series_color(i))),
                ..s.clone()
            })
            .collect::<Vec<_>>();
        let round = matches!(self.kind, ChartKind::Pie | ChartKind::Doughnut);
        Chart {
            kind: self.kind,
            categories: self.categories.clone(),
            legend: self.legend.unwrap_or(series.len() > 1 || round),
            series,
            data_labels: self.data_labels,
        }
    }
}

/// Native chart, optionally with an insights panel on the right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSlide {
    pub title: String,
    pub chart: ChartSpec,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl ChartSlide {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let body = ctx.body();
        let chart = self.chart.to_chart(pal);
        if self.insights.is_empty() {
            b.chart(body, chart)?;
        } else {
            let cols = layout::split_columns(body, &[0.64, 0.36], inches(0.4))?;
            b.chart(cols[0], chart)?;
            let mut paras = vec![
                ctx.para("KEY INSIGHTS")
                    .size(14.0)
                    .bold()
                    .color(pal.primary),
            ];
            paras.extend(self.insights.iter().map(|i| ctx.bullet(i, 12.0)));
            b.rect(cols[1])
                .set_fill(Fill::solid(pal.background))
                .set_text(TextFrame::new(paras).margins(Margins::uniform(inches(0.2))));
        }
        Ok(ctx.finish(b))
    }
}

/// Data table with a styled header row and banded body rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSlide {
    pub title: String,
    #[serde(default)]
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableSlide {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        ctx.add_title(&mut b, &self.title);

        let header = !self.headers.is_empty();
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        if header {
            rows.push(self.headers.clone());
        }
        rows.extend(self.rows.iter().cloned());

        let body = ctx.body();
        let h = body.h.min(inches(0.45) * rows.len() as i64);
        let table = Table {
            rows,
            header,
            header_fill: Some(pal.primary),
            header_color: Some(pal.white),
            band_fill: Some(pal.background),
            font_size: Some(12.0),
        };
        b.table(Rect::new(body.x, body.y, body.w, h), table)?;
        Ok(ctx.finish(b))
    }
}

/// Picture scaled into the body, with an optional caption underneath.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSlide {
    #[serde(default)]
    pub title: Option<String>,
    /// Relative paths resolve against the deck's directory.
    pub path: PathBuf,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Reads and sniffs an image file referenced by a deck.
pub(crate) fn load_picture(ctx: &SlideContext, path: &std::path::Path) -> Result<Picture> {
    let full = ctx.base_dir.join(path);
    debug!(path = %full.display(), "loading picture");
    let data = std::fs::read(&full).map_err(|e| {
        DeckError::InvalidInput(format!("cannot read image {}: {e}", full.display()))
    })?;
    Picture::from_bytes(data)
}

impl ImageSlide {
    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        let pal = ctx.palette;
        let mut b = SlideBuilder::new();
        if let Some(title) = &self.title {
            ctx.add_title(&mut b, title);
        }
        let picture = load_picture(ctx, &self.path)?;

        let body = ctx.body();
        let (frame, caption) = match &self.caption {
            Some(text) => {
                let (frame, rest) = body.split_top(body.h - inches(0.7), inches(0.2));
                (frame, Some((text, Rect::new(rest.x, rest.y, rest.w, inches(0.5)))))
            }
            None => (body, None),
        };
        let rect = match picture.pixel_size {
            Some((w, h)) => layout::fit_aspect(frame, w, h),
            None => frame,
        };
        b.picture(rect, picture);

        if let Some((text, r)) = caption {
            b.text_box(
                r,
                TextFrame::single(
                    ctx.para(text.as_str())
                        .size(12.0)
                        .color(pal.subtext)
                        .align(Align::Center),
                ),
            );
        }
        Ok(ctx.finish(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageFormat, ShapeContent, ShapeKind};
    use crate::slides::test_support::*;

    fn revenue() -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Column,
            categories: vec!["2022".into(), "2023".into(), "2024".into()],
            series: vec![Series {
                name: "Revenue".into(),
                values: vec![1.2, 1.8, 2.6],
                color: None,
            }],
            legend: None,
            data_labels: true,
        }
    }

    #[test]
    fn chart_spec_fills_in_palette_colours() {
        let pal = palette();
        let chart = revenue().to_chart(&pal);
        assert_eq!(chart.series[0].color, Some(pal.primary));
        assert!(!chart.legend);
        let mut pie = revenue();
        pie.kind = ChartKind::Pie;
        assert!(pie.to_chart(&pal).legend);
    }

    #[test]
    fn chart_with_insights_splits_body() {
        let pal = palette();
        let ctx = ctx(&pal);
        let slide = ChartSlide {
            title: "Growth".into(),
            chart: revenue(),
            insights: vec!["Revenue doubled".into(), "Margins held".into()],
        }
        .render(&ctx)
        .unwrap();
        assert_eq!(slide.shapes[1].kind(), ShapeKind::Chart);
        assert!(slide.shapes[2].text().starts_with("KEY INSIGHTS"));
        assert!(slide.shapes[1].rect.w > slide.shapes[2].rect.w);
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);
    }

    #[test]
    fn mismatched_series_fail() {
        let pal = palette();
        let mut spec = revenue();
        spec.series[0].values.pop();
        let slide = ChartSlide {
            title: "Growth".into(),
            chart: spec,
            insights: vec![],
        };
        assert!(slide.render(&ctx(&pal)).is_err());
    }

    #[test]
    fn table_height_follows_rows() {
        let pal = palette();
        let ctx = ctx(&pal);
        let slide = TableSlide {
            title: "Options".into(),
            headers: vec!["Option".into(), "Cost".into()],
            rows: vec![
                vec!["A".into(), "$1M".into()],
                vec!["B".into(), "$2M".into()],
            ],
        }
        .render(&ctx)
        .unwrap();
        let table = &slide.shapes[1];
        assert_eq!(table.rect.h, inches(0.45) * 3);
        match &table.content {
            ShapeContent::Table(t) => {
                assert!(t.header);
                assert_eq!(t.row_count(), 3);
            }
            other => panic!("expected table, got {other:?}"),
        }
        assert_disjoint(&slide);
    }

    #[test]
    fn image_is_letterboxed_above_caption() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbImage::from_pixel(40, 20, image::Rgb([200, 10, 10]));
        img.save(dir.path().join("chart.png")).unwrap();

        let pal = palette();
        let mut ctx = ctx(&pal);
        ctx.base_dir = dir.path();
        let slide = ImageSlide {
            title: Some("Evidence".into()),
            path: "chart.png".into(),
            caption: Some("Source: survey".into()),
        }
        .render(&ctx)
        .unwrap();
        let pic = &slide.shapes[1];
        match &pic.content {
            ShapeContent::Picture(p) => {
                assert_eq!(p.format, ImageFormat::Png);
                assert_eq!(p.pixel_size, Some((40, 20)));
            }
            other => panic!("expected picture, got {other:?}"),
        }
        // 2:1 aspect kept within rounding
        assert!((pic.rect.w - 2 * pic.rect.h).abs() <= 2);
        assert_disjoint(&slide);
        assert_on_page(&slide, &ctx);
    }

    #[test]
    fn missing_image_is_an_error() {
        let pal = palette();
        let slide = ImageSlide {
            title: None,
            path: "does-not-exist.png".into(),
            caption: None,
        };
        assert!(matches!(
            slide.render(&ctx(&pal)),
            Err(DeckError::InvalidInput(_))
        ));
    }
}
