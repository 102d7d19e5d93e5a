use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::theme::{Palette, ThemeName};
use crate::units;

/// Page sizes the generators use.
///   - `widescreen` is PowerPoint's 16:9 default (13.333 x 7.5 in)
///   - `standard` is the legacy 4:3 page (10 x 7.5 in)
///   - `large` is the 16 x 9 in canvas some decks are laid out on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SlideSize {
    Widescreen,
    Standard,
    Large,
    Custom { width_in: f64, height_in: f64 },
}

impl SlideSize {
    /// Width and height in EMU.
    pub fn dimensions(&self) -> (i64, i64) {
        match *self {
            SlideSize::Widescreen => (12_192_000, 6_858_000),
            SlideSize::Standard => (9_144_000, 6_858_000),
            SlideSize::Large => (units::inches(16.0), units::inches(9.0)),
            SlideSize::Custom {
                width_in,
                height_in,
            } => (units::inches(width_in), units::inches(height_in)),
        }
    }
}

impl FromStr for SlideSize {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "widescreen" | "16:9" => Ok(Self::Widescreen),
            "standard" | "4:3" => Ok(Self::Standard),
            "large" => Ok(Self::Large),
            other => {
                let (w, h) = other.split_once('x').ok_or(())?;
                let width_in: f64 = w.trim().parse().map_err(|_| ())?;
                let height_in: f64 = h.trim().parse().map_err(|_| ())?;
                Ok(Self::Custom {
                    width_in,
                    height_in,
                })
            }
        }
    }
}

/// What `build` does when rendered slides contain overlapping shapes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    Ignore,
    #[default]
    Warn,
    Deny,
}

impl FromStr for OverlapPolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "deny" => Ok(Self::Deny),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Page size for every slide.
    #[serde(default = "default_size")]
    pub size: SlideSize,
    /// Colour palette used by the templates.
    #[serde(default)]
    pub theme: ThemeName,
    /// Typeface applied to template text.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Bottom-right slide numbers on content slides.
    #[serde(default = "default_slide_numbers")]
    pub slide_numbers: bool,
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    /// Chevron bar of the deck's section dividers under each slide header.
    #[serde(default)]
    pub navigation: bool,
    /// Text of a logo area to the right of each slide header.
    #[serde(default)]
    pub logo: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            theme: ThemeName::default(),
            font_family: default_font_family(),
            slide_numbers: default_slide_numbers(),
            overlap_policy: OverlapPolicy::default(),
            navigation: false,
            logo: None,
        }
    }
}

/// Largest slide edge PowerPoint accepts (56 in).
pub const MAX_SLIDE_EDGE: i64 = 51_206_400;
/// Smallest slide edge PowerPoint accepts (1 in).
pub const MIN_SLIDE_EDGE: i64 = 914_400;

impl BuildConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Slide dimensions fall outside 1..=56 inches
    /// - The font family is empty
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::DeckError;

        let (width, height) = self.size.dimensions();
        let in_range = |v: i64| (MIN_SLIDE_EDGE..=MAX_SLIDE_EDGE).contains(&v);
        if !in_range(width) || !in_range(height) {
            return Err(DeckError::InvalidDimensions { width, height });
        }
        if self.font_family.trim().is_empty() {
            return Err(DeckError::InvalidConfig("font_family is empty".into()));
        }
        Ok(())
    }

    pub fn palette(&self) -> Palette {
        Palette::named(self.theme)
    }

    pub fn dimensions(&self) -> (i64, i64) {
        self.size.dimensions()
    }
}

fn default_size() -> SlideSize {
    SlideSize::Widescreen
}
fn default_font_family() -> String {
    "Arial".to_string()
}
fn default_slide_numbers() -> bool {
    true
}

/// Builder for `BuildConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct BuildConfigBuilder {
    cfg: BuildConfig,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: BuildConfig::default(),
        }
    }
    pub fn size(mut self, v: SlideSize) -> Self {
        self.cfg.size = v;
        self
    }
    pub fn theme(mut self, v: ThemeName) -> Self {
        self.cfg.theme = v;
        self
    }
    pub fn font_family(mut self, v: impl Into<String>) -> Self {
        self.cfg.font_family = v.into();
        self
    }
    pub fn slide_numbers(mut self, v: bool) -> Self {
        self.cfg.slide_numbers = v;
        self
    }
    pub fn overlap_policy(mut self, v: OverlapPolicy) -> Self {
        self.cfg.overlap_policy = v;
        self
    }
    pub fn navigation(mut self, v: bool) -> Self {
        self.cfg.navigation = v;
        self
    }
    pub fn logo(mut self, v: impl Into<String>) -> Self {
        self.cfg.logo = Some(v.into());
        self
    }
    pub fn build(self) -> BuildConfig {
        self.cfg
    }
}

impl BuildConfig {
    /// Create a fluent builder for `BuildConfig`.
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::new()
    }
}
