//! Declarative deck descriptions.
//!
//! A deck file is YAML or JSON: a title, optional settings and a list of
//! slides, each tagged with `kind:` and carrying the fields of one template.
//!
//! ```yaml
//! title: Market Entry
//! settings: { theme: bcg, size: widescreen }
//! slides:
//!   - kind: title
//!     title: Market Entry Strategy
//!   - kind: summary
//!     takeaways: [Enter via partnership, Break even in year 3]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BuildConfig, SlideSize};
use crate::error::{DeckError, Result};
use crate::model::{Presentation, Slide};
use crate::slides::{
    Agenda, ChartSlide, Comparison, Divider, FreeSlide, ImageSlide, KeyMessage, KpiCards, Matrix,
    Navigation, ProcessFlow, Recommendations, SlideContext, Summary, Swot, TableSlide, Timeline,
    TitleSlide,
};
use crate::theme::ThemeName;

/// Deck-level overrides of the build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeckSettings {
    #[serde(default)]
    pub theme: Option<ThemeName>,
    /// `widescreen`, `standard`, `large`, `16:9`, `4:3` or `<w>x<h>` in inches.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub slide_numbers: Option<bool>,
    #[serde(default)]
    pub navigation: Option<bool>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideSpec {
    Title(TitleSlide),
    Divider(Divider),
    Agenda(Agenda),
    KeyMessage(KeyMessage),
    Summary(Summary),
    Recommendations(Recommendations),
    Comparison(Comparison),
    ProcessFlow(ProcessFlow),
    KpiCards(KpiCards),
    Matrix(Matrix),
    Swot(Swot),
    Timeline(Timeline),
    Chart(ChartSlide),
    Table(TableSlide),
    Image(ImageSlide),
    Free(FreeSlide),
}

impl SlideSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SlideSpec::Title(_) => "title",
            SlideSpec::Divider(_) => "divider",
            SlideSpec::Agenda(_) => "agenda",
            SlideSpec::KeyMessage(_) => "key_message",
            SlideSpec::Summary(_) => "summary",
            SlideSpec::Recommendations(_) => "recommendations",
            SlideSpec::Comparison(_) => "comparison",
            SlideSpec::ProcessFlow(_) => "process_flow",
            SlideSpec::KpiCards(_) => "kpi_cards",
            SlideSpec::Matrix(_) => "matrix",
            SlideSpec::Swot(_) => "swot",
            SlideSpec::Timeline(_) => "timeline",
            SlideSpec::Chart(_) => "chart",
            SlideSpec::Table(_) => "table",
            SlideSpec::Image(_) => "image",
            SlideSpec::Free(_) => "free",
        }
    }

    pub fn render(&self, ctx: &SlideContext) -> Result<Slide> {
        match self {
            SlideSpec::Title(s) => s.render(ctx),
            SlideSpec::Divider(s) => s.render(ctx),
            SlideSpec::Agenda(s) => s.render(ctx),
            SlideSpec::KeyMessage(s) => s.render(ctx),
            SlideSpec::Summary(s) => s.render(ctx),
            SlideSpec::Recommendations(s) => s.render(ctx),
            SlideSpec::Comparison(s) => s.render(ctx),
            SlideSpec::ProcessFlow(s) => s.render(ctx),
            SlideSpec::KpiCards(s) => s.render(ctx),
            SlideSpec::Matrix(s) => s.render(ctx),
            SlideSpec::Swot(s) => s.render(ctx),
            SlideSpec::Timeline(s) => s.render(ctx),
            SlideSpec::Chart(s) => s.render(ctx),
            SlideSpec::Table(s) => s.render(ctx),
            SlideSpec::Image(s) => s.render(ctx),
            SlideSpec::Free(s) => s.render(ctx),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub settings: DeckSettings,
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
}

impl DeckSpec {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| DeckError::Parse(e.to_string()))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| DeckError::Parse(e.to_string()))
    }

    /// Loads a deck file; `.json` is read as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        parsed.map_err(|e| match e {
            DeckError::Parse(msg) => DeckError::Parse(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// `base` with this deck's settings applied on top.
    pub fn effective_config(&self, base: &BuildConfig) -> Result<BuildConfig> {
        let mut cfg = base.clone();
        let s = &self.settings;
        if let Some(theme) = s.theme {
            cfg.theme = theme;
        }
        if let Some(size) = &s.size {
            cfg.size = size
                .parse::<SlideSize>()
                .map_err(|_| DeckError::InvalidConfig(format!("unknown slide size `{size}`")))?;
        }
        if let Some(font) = &s.font_family {
            cfg.font_family = font.clone();
        }
        if let Some(numbers) = s.slide_numbers {
            cfg.slide_numbers = numbers;
        }
        if let Some(nav) = s.navigation {
            cfg.navigation = nav;
        }
        if let Some(logo) = &s.logo {
            cfg.logo = Some(logo.clone());
        }
        Ok(cfg)
    }
}

fn at_slide(number: usize, kind: &str, e: DeckError) -> DeckError {
    match e {
        DeckError::InvalidInput(msg) => {
            DeckError::InvalidInput(format!("slide {number} ({kind}): {msg}"))
        }
        DeckError::InvalidLayout(msg) => {
            DeckError::InvalidLayout(format!("slide {number} ({kind}): {msg}"))
        }
        other => other,
    }
}

/// Renders every slide of `spec` in order. Relative image paths resolve
/// against `base_dir`.
pub fn render_deck(spec: &DeckSpec, config: &BuildConfig, base_dir: &Path) -> Result<Presentation> {
    if spec.slides.is_empty() {
        return Err(DeckError::Empty);
    }
    let cfg = spec.effective_config(config)?;
    cfg.validate()?;

    let palette = cfg.palette();
    let (width, height) = cfg.dimensions();
    let mut pres = Presentation::new(width, height);
    pres.title = spec.title.clone();
    pres.author = spec.author.clone();

    // section dividers name the navigation entries
    let sections: Vec<String> = if cfg.navigation {
        spec.slides
            .iter()
            .filter_map(|s| match s {
                SlideSpec::Divider(d) => Some(d.title.clone()),
                _ => None,
            })
            .collect()
    } else {
        Vec::new()
    };
    let mut section: Option<usize> = None;

    for (i, slide) in spec.slides.iter().enumerate() {
        if !sections.is_empty() && matches!(slide, SlideSpec::Divider(_)) {
            section = Some(section.map_or(0, |s| s + 1));
        }
        let ctx = SlideContext {
            width,
            height,
            palette: &palette,
            font: &cfg.font_family,
            number: i + 1,
            slide_numbers: cfg.slide_numbers,
            base_dir,
            navigation: section.map(|current| Navigation {
                sections: &sections,
                current,
            }),
            logo: cfg.logo.as_deref(),
        };
        let rendered = slide
            .render(&ctx)
            .map_err(|e| at_slide(i + 1, slide.kind_name(), e))?;
        debug!(
            slide = i + 1,
            kind = slide.kind_name(),
            shapes = rendered.shapes.len(),
            "rendered slide"
        );
        pres.slides.push(rendered);
    }
    Ok(pres)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Preset, ShapeContent, ShapeKind};
    use crate::theme::Palette;

    const DECK: &str = r#"
title: Pilot Review
author: Strategy Team
settings:
  theme: bain
  size: "4:3"
  slide_numbers: false
slides:
  - kind: title
    title: Pilot Review
    subtitle: Six months in
  - kind: agenda
    sections:
      - title: Results
      - title: Next steps
        description: What we ask for
  - kind: chart
    title: Throughput
    chart:
      type: line
      categories: [Q1, Q2]
      series:
        - { name: Claims, values: [120, 180] }
"#;

    #[test]
    fn yaml_deck_renders_with_settings() {
        let spec = DeckSpec::from_yaml_str(DECK).unwrap();
        assert_eq!(spec.slides.len(), 3);
        assert_eq!(spec.slides[1].kind_name(), "agenda");

        let pres = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap();
        assert_eq!((pres.width, pres.height), (9_144_000, 6_858_000));
        assert_eq!(pres.title.as_deref(), Some("Pilot Review"));
        assert_eq!(pres.author.as_deref(), Some("Strategy Team"));
        assert_eq!(pres.slides.len(), 3);

        let chart = &pres.slides[2].shapes[1];
        assert_eq!(chart.kind(), ShapeKind::Chart);
        // slide numbers switched off: title + chart only
        assert_eq!(pres.slides[2].shapes.len(), 2);

        let bain = Palette::named(ThemeName::Bain);
        let fills: Vec<_> = pres.slides[1]
            .shapes
            .iter()
            .filter_map(|s| s.fill.map(|f| f.color))
            .collect();
        assert!(fills.contains(&bain.accent));
    }

    #[test]
    fn json_decks_parse_the_same() {
        let json = r#"{
            "slides": [
                { "kind": "key_message", "title": "Ask", "message": "Fund phase two" },
                { "kind": "divider", "title": "Appendix" }
            ]
        }"#;
        let spec = DeckSpec::from_json_str(json).unwrap();
        assert_eq!(spec.slides[0].kind_name(), "key_message");
        let pres = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap();
        assert_eq!(pres.slides.len(), 2);
    }

    #[test]
    fn unknown_kinds_are_parse_errors() {
        let err = DeckSpec::from_yaml_str("slides: [{ kind: hologram, title: x }]").unwrap_err();
        assert!(matches!(err, DeckError::Parse(_)));
    }

    #[test]
    fn empty_decks_are_rejected() {
        let spec = DeckSpec::from_yaml_str("title: Nothing").unwrap();
        assert!(matches!(
            render_deck(&spec, &BuildConfig::default(), Path::new(".")),
            Err(DeckError::Empty)
        ));
    }

    #[test]
    fn template_errors_name_the_slide() {
        let spec = DeckSpec::from_yaml_str(
            r#"
slides:
  - { kind: title, title: Start }
  - { kind: matrix, title: Broken, quadrants: [{ title: Only one }] }
"#,
        )
        .unwrap();
        let err = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("slide 2 (matrix)"), "{err}");
    }

    #[test]
    fn dividers_drive_the_navigation_bar() {
        let spec = DeckSpec::from_yaml_str(
            r#"
settings: { navigation: true, logo: ACME }
slides:
  - { kind: title, title: Start }
  - { kind: key_message, title: Before, message: No section yet }
  - { kind: divider, title: Problem }
  - { kind: key_message, title: Pain, message: Paper records }
  - { kind: divider, title: Solution }
  - { kind: summary, takeaways: [Kiosks] }
"#,
        )
        .unwrap();
        let pres = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap();
        let current = BuildConfig::default().palette().secondary;
        let chevrons = |n: usize| -> Vec<(String, bool)> {
            pres.slides[n]
                .shapes
                .iter()
                .filter(|s| s.content == ShapeContent::AutoShape(Preset::Chevron))
                .map(|s| (s.text(), s.fill.map(|f| f.color) == Some(current)))
                .collect()
        };
        assert!(chevrons(1).is_empty());
        assert_eq!(
            chevrons(3),
            vec![("PROBLEM".to_string(), true), ("SOLUTION".to_string(), false)]
        );
        assert_eq!(
            chevrons(5),
            vec![("PROBLEM".to_string(), false), ("SOLUTION".to_string(), true)]
        );
        // the logo rides along with every header
        assert!(pres.slides[1].shapes.iter().any(|s| s.text() == "ACME"));
        assert!(crate::overlap::deck_overlaps(&pres).iter().all(Vec::is_empty));
    }

    #[test]
    fn bad_sizes_are_config_errors() {
        let spec = DeckSpec::from_yaml_str(
            "settings: { size: enormous }\nslides: [{ kind: divider, title: x }]",
        )
        .unwrap();
        assert!(matches!(
            render_deck(&spec, &BuildConfig::default(), Path::new(".")),
            Err(DeckError::InvalidConfig(_))
        ));
    }
}
