use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};
use crate::units;

/// Axis-aligned rectangle in EMU. `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_inches(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(
            units::inches(x),
            units::inches(y),
            units::inches(w),
            units::inches(h),
        )
    }

    /// Right edge (`x + w`), saturating at `i64::MAX`.
    pub fn right(&self) -> i64 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (`y + h`), saturating at `i64::MAX`.
    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(self.h)
    }

    pub fn center_x(&self) -> i64 {
        self.x.saturating_add(self.w / 2)
    }

    pub fn center_y(&self) -> i64 {
        self.y.saturating_add(self.h / 2)
    }

    pub fn area(&self) -> i64 {
        self.w.max(0).saturating_mul(self.h.max(0))
    }

    /// Returns true if `r` lies fully inside `self` (edges inclusive).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }

    /// Bounding-box intersection. Touching edges count as intersecting.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.right() < r.x || self.x > r.right() || self.bottom() < r.y || self.y > r.bottom())
    }

    /// Shrinks the rectangle by `dx` on the left/right and `dy` on the top/bottom.
    /// Sizes never go below zero.
    pub fn inset(&self, dx: i64, dy: i64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            w: (self.w - 2 * dx).max(0),
            h: (self.h - 2 * dy).max(0),
        }
    }

    /// Splits off the top `h` of the rectangle, returning `(top, rest)`.
    /// `gap` is left empty between the two parts.
    pub fn split_top(&self, h: i64, gap: i64) -> (Rect, Rect) {
        let h = h.clamp(0, self.h);
        let top = Rect::new(self.x, self.y, self.w, h);
        let rest_y = self.y + h + gap;
        let rest = Rect::new(self.x, rest_y, self.w, (self.bottom() - rest_y).max(0));
        (top, rest)
    }
}

/// 24-bit RGB colour. Serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case hex without the leading `#`, as DrawingML expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = DeckError;
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(DeckError::InvalidInput(format!("invalid colour: {s:?}")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| DeckError::InvalidInput(format!("invalid colour: {s:?}")))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = DeckError;
    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        format!("#{}", c.hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

/// Solid fill. `transparency` runs from 0.0 (opaque) to 1.0 (invisible).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub color: Color,
    #[serde(default)]
    pub transparency: f32,
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            transparency: 0.0,
        }
    }

    pub fn with_transparency(mut self, t: f32) -> Self {
        self.transparency = t.clamp(0.0, 1.0);
        self
    }
}

/// Outline. `width` is in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub color: Color,
    pub width: i64,
}

impl Line {
    pub fn new(color: Color, width_pt: f64) -> Self {
        Self {
            color,
            width: units::points(width_pt),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl FromStr for Align {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Self::Left),
            "ctr" | "center" | "centre" => Ok(Self::Center),
            "r" | "right" => Ok(Self::Right),
            "just" | "justify" => Ok(Self::Justify),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default)]
    pub family: Option<String>,
    /// Size in points.
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub font: Font,
    pub align: Align,
    /// Line spacing as a multiple of single spacing.
    pub line_spacing: Option<f32>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
    pub fn size(mut self, pt: f32) -> Self {
        self.font.size = Some(pt);
        self
    }
    pub fn bold(mut self) -> Self {
        self.font.bold = true;
        self
    }
    pub fn color(mut self, c: Color) -> Self {
        self.font.color = Some(c);
        self
    }
    pub fn family(mut self, family: &str) -> Self {
        self.font.family = Some(family.to_string());
        self
    }
    pub fn align(mut self, a: Align) -> Self {
        self.align = a;
        self
    }
    pub fn spacing(mut self, multiple: f32) -> Self {
        self.line_spacing = Some(multiple);
        self
    }
}

/// Inner text margins in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

impl Margins {
    pub fn uniform(v: i64) -> Self {
        Self {
            left: v,
            right: v,
            top: v,
            bottom: v,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 91_440,
            right: 91_440,
            top: 45_720,
            bottom: 45_720,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
    pub anchor: Anchor,
    pub margins: Option<Margins>,
    pub wrap: bool,
}

impl TextFrame {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            anchor: Anchor::Top,
            margins: None,
            wrap: true,
        }
    }

    pub fn single(p: Paragraph) -> Self {
        Self::new(vec![p])
    }

    pub fn anchor(mut self, a: Anchor) -> Self {
        self.anchor = a;
        self
    }

    pub fn margins(mut self, m: Margins) -> Self {
        self.margins = Some(m);
        self
    }

    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Preset auto-shape geometries used by the slide templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Rectangle,
    RoundedRectangle,
    Oval,
    Diamond,
    Chevron,
    RightArrow,
    Pentagon,
}

impl Preset {
    /// DrawingML `prst` attribute value.
    pub fn ooxml_name(&self) -> &'static str {
        match self {
            Preset::Rectangle => "rect",
            Preset::RoundedRectangle => "roundRect",
            Preset::Oval => "ellipse",
            Preset::Diamond => "diamond",
            Preset::Chevron => "chevron",
            Preset::RightArrow => "rightArrow",
            Preset::Pentagon => "homePlate",
        }
    }

    pub fn from_ooxml(s: &str) -> Option<Self> {
        Some(match s {
            "rect" => Preset::Rectangle,
            "roundRect" => Preset::RoundedRectangle,
            "ellipse" => Preset::Oval,
            "diamond" => Preset::Diamond,
            "chevron" => Preset::Chevron,
            "rightArrow" => Preset::RightArrow,
            "homePlate" | "pentagon" => Preset::Pentagon,
            _ => return None,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Rectangle => "Rectangle",
            Preset::RoundedRectangle => "Rounded Rectangle",
            Preset::Oval => "Oval",
            Preset::Diamond => "Diamond",
            Preset::Chevron => "Chevron",
            Preset::RightArrow => "Right Arrow",
            Preset::Pentagon => "Pentagon",
        }
    }
}

impl FromStr for Preset {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "rect" | "rectangle" => Ok(Self::Rectangle),
            "rounded" | "rounded_rectangle" | "roundrect" => Ok(Self::RoundedRectangle),
            "oval" | "ellipse" | "circle" => Ok(Self::Oval),
            "diamond" => Ok(Self::Diamond),
            "chevron" => Ok(Self::Chevron),
            "arrow" | "right_arrow" => Ok(Self::RightArrow),
            "pentagon" | "homeplate" => Ok(Self::Pentagon),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Embedded raster image.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub format: ImageFormat,
    pub data: Vec<u8>,
    /// Pixel dimensions, when the image header could be read.
    pub pixel_size: Option<(u32, u32)>,
}

impl Picture {
    /// Sniffs the format and pixel size. Only PNG and JPEG are accepted.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let format = match image::guess_format(&data)? {
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            other => {
                return Err(DeckError::InvalidInput(format!(
                    "unsupported picture format: {other:?}"
                )));
            }
        };
        let dims = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(Self {
            format,
            data,
            pixel_size: Some(dims),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Vertical bars.
    Column,
    /// Horizontal bars.
    Bar,
    Line,
    Pie,
    Doughnut,
}

impl FromStr for ChartKind {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "column" => Ok(Self::Column),
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "pie" => Ok(Self::Pie),
            "doughnut" | "donut" => Ok(Self::Doughnut),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    #[serde(default)]
    pub color: Option<Color>,
}

/// Native chart with literal data caches.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub legend: bool,
    pub data_labels: bool,
}

impl Chart {
    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(DeckError::InvalidInput("chart has no series".into()));
        }
        for s in &self.series {
            if s.values.iter().any(|v| !v.is_finite()) {
                return Err(DeckError::InvalidInput(format!(
                    "series {:?} has a non-finite value",
                    s.name
                )));
            }
            if s.values.len() != self.categories.len() {
                return Err(DeckError::InvalidInput(format!(
                    "series {:?} has {} values for {} categories",
                    s.name,
                    s.values.len(),
                    self.categories.len()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
    /// First row is styled as a header.
    pub header: bool,
    pub header_fill: Option<Color>,
    pub header_color: Option<Color>,
    pub band_fill: Option<Color>,
    pub font_size: Option<f32>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeContent {
    AutoShape(Preset),
    TextBox,
    Picture(Picture),
    Chart(Chart),
    Table(Table),
    /// Straight line from the top-left to the bottom-right of the shape rect.
    Connector,
    /// Group read back from an existing file; children are not tracked.
    Group,
}

/// Coarse shape classification used by reports and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    TextBox,
    AutoShape,
    Picture,
    Chart,
    Table,
    Connector,
    Group,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Drawing id, unique within a slide.
    pub id: u32,
    pub name: String,
    pub rect: Rect,
    pub content: ShapeContent,
    pub fill: Option<Fill>,
    pub line: Option<Line>,
    pub text: Option<TextFrame>,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self.content {
            ShapeContent::AutoShape(_) => ShapeKind::AutoShape,
            ShapeContent::TextBox => ShapeKind::TextBox,
            ShapeContent::Picture(_) => ShapeKind::Picture,
            ShapeContent::Chart(_) => ShapeKind::Chart,
            ShapeContent::Table(_) => ShapeKind::Table,
            ShapeContent::Connector => ShapeKind::Connector,
            ShapeContent::Group => ShapeKind::Group,
        }
    }

    /// Auto shapes and text boxes always carry a text body, even when empty.
    pub fn has_text_frame(&self) -> bool {
        matches!(
            self.content,
            ShapeContent::AutoShape(_) | ShapeContent::TextBox
        )
    }

    pub fn text(&self) -> String {
        self.text.as_ref().map(|t| t.text()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub shapes: Vec<Shape>,
    pub background: Option<Color>,
}

impl Slide {
    pub fn rects(&self) -> Vec<Rect> {
        self.shapes.iter().map(|s| s.rect).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// Slide width in EMU.
    pub width: i64,
    /// Slide height in EMU.
    pub height: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub slides: Vec<Slide>,
}

/// Shape inventory for a whole deck.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeckStats {
    pub num_slides: usize,
    pub num_shapes: usize,
    pub text_boxes: usize,
    pub auto_shapes: usize,
    pub pictures: usize,
    pub charts: usize,
    pub tables: usize,
    pub connectors: usize,
    pub groups: usize,
    /// Sum of shape areas divided by total slide area. Overlaps are counted twice,
    /// so values above 1.0 are possible.
    pub coverage: f64,
}

impl Presentation {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            title: None,
            author: None,
            slides: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn stats(&self) -> DeckStats {
        let mut st = DeckStats {
            num_slides: self.slides.len(),
            ..Default::default()
        };
        let mut used: i128 = 0;
        for slide in &self.slides {
            for shape in &slide.shapes {
                st.num_shapes += 1;
                used += shape.rect.area() as i128;
                match shape.kind() {
                    ShapeKind::TextBox => st.text_boxes += 1,
                    ShapeKind::AutoShape => st.auto_shapes += 1,
                    ShapeKind::Picture => st.pictures += 1,
                    ShapeKind::Chart => st.charts += 1,
                    ShapeKind::Table => st.tables += 1,
                    ShapeKind::Connector => st.connectors += 1,
                    ShapeKind::Group => st.groups += 1,
                }
            }
        }
        let total = self.bounds().area() as i128 * self.slides.len() as i128;
        st.coverage = if total > 0 {
            used as f64 / total as f64
        } else {
            0.0
        };
        st
    }
}

impl DeckStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Slides: {}, Shapes: {}, Text boxes: {}, Auto shapes: {}, Pictures: {}, Charts: {}, Tables: {}, Connectors: {}, Coverage: {:.1}%",
            self.num_slides,
            self.num_shapes,
            self.text_boxes,
            self.auto_shapes,
            self.pictures,
            self.charts,
            self.tables,
            self.connectors,
            self.coverage * 100.0,
        )
    }

    pub fn avg_shapes_per_slide(&self) -> f64 {
        if self.num_slides > 0 {
            self.num_shapes as f64 / self.num_slides as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_with_and_without_hash() {
        assert_eq!("#003F5C".parse::<Color>().unwrap(), Color::rgb(0, 63, 92));
        assert_eq!("ff0000".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
        assert_eq!(String::from(Color::rgb(0, 102, 204)), "#0066CC");
    }

    #[test]
    fn rect_edges_and_split() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        let (top, rest) = r.split_top(20, 5);
        assert_eq!(top, Rect::new(10, 20, 100, 20));
        assert_eq!(rest, Rect::new(10, 45, 100, 25));
        assert_eq!(r.inset(60, 0).w, 0);
    }

    #[test]
    fn edges_saturate_instead_of_overflowing() {
        let far = Rect::new(i64::MAX - 10, i64::MAX - 10, i64::MAX, i64::MAX);
        assert_eq!(far.right(), i64::MAX);
        assert_eq!(far.bottom(), i64::MAX);
        assert_eq!(far.area(), i64::MAX);
        assert!(far.intersects(&Rect::new(i64::MAX - 5, i64::MAX - 5, 1, 1)));
        assert!(!far.intersects(&Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn preset_names_round_trip() {
        for p in [
            Preset::Rectangle,
            Preset::RoundedRectangle,
            Preset::Oval,
            Preset::Diamond,
            Preset::Chevron,
            Preset::RightArrow,
            Preset::Pentagon,
        ] {
            assert_eq!(Preset::from_ooxml(p.ooxml_name()), Some(p));
        }
    }

    #[test]
    fn chart_validation_checks_series_length() {
        let mut chart = Chart {
            kind: ChartKind::Column,
            categories: vec!["a".into(), "b".into()],
            series: vec![Series {
                name: "s".into(),
                values: vec![1.0, 2.0],
                color: None,
            }],
            legend: false,
            data_labels: false,
        };
        assert!(chart.validate().is_ok());
        chart.series[0].values.pop();
        assert!(chart.validate().is_err());
        chart.series.clear();
        assert!(chart.validate().is_err());
    }
}
