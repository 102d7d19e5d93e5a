//! PPTX parsing.
//!
//! Only the top-level children of each slide's shape tree are read. Group
//! members are not descended into. Placeholders without their own `a:xfrm`
//! take the position of the matching layout placeholder (by `idx`), and layout
//! placeholders in turn fall back to the master placeholder of the same base
//! type.
//!
//! Numbers in the package are not trusted: coordinates are clamped to the
//! DrawingML range and chart point indices are capped.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use super::rel;
use crate::error::{DeckError, Result};
use crate::model::{
    Anchor, Chart, ChartKind, Color, Fill, ImageFormat, Line, Margins, Paragraph, Picture,
    Presentation, Preset, Rect, Series, Shape, ShapeContent, Slide, Table, TextFrame,
};

/// Slide size assumed when `p:sldSz` is absent (10 x 7.5 in).
const DEFAULT_SIZE: (i64, i64) = (9_144_000, 6_858_000);

/// Largest magnitude of an `ST_Coordinate`.
const MAX_COORD: i64 = 27_273_042_316_900;

/// Points read per category axis or series, whatever `c:ptCount` says.
const MAX_POINTS: usize = 32_000;

/// Up-front buffer for a part. The size in the zip header is only a hint.
const MAX_PREALLOC: u64 = 1 << 20;

/// Reads a `.pptx` file from disk.
pub fn open(path: impl AsRef<Path>) -> Result<Presentation> {
    let bytes = std::fs::read(path.as_ref())?;
    read_pptx(&bytes)
}

/// Parses the bytes of a `.pptx` file.
pub fn read_pptx(bytes: &[u8]) -> Result<Presentation> {
    let mut pkg = PackageReader::new(bytes)?;

    let root = pkg.rels_for("")?;
    let main = root
        .values()
        .find(|r| r.kind == rel::OFFICE_DOCUMENT)
        .map(|r| resolve("", &r.target))
        .ok_or_else(|| DeckError::MissingPart("officeDocument relationship".into()))?;

    let info = parse_presentation(&pkg.part(&main)?)?;
    let (width, height) = info.size.unwrap_or(DEFAULT_SIZE);
    let mut pres = Presentation::new(width, height);

    if let Some(core) = root.values().find(|r| r.kind == rel::CORE_PROPS) {
        let name = resolve("", &core.target);
        if pkg.has(&name) {
            let (title, author) = parse_core(&pkg.part(&name)?)?;
            pres.title = title;
            pres.author = author;
        }
    }

    let pres_rels = pkg.rels_for(&main)?;
    let mut layouts: HashMap<String, Vec<(Placeholder, Geometry)>> = HashMap::new();
    for (i, rid) in info.slide_rids.iter().enumerate() {
        let target = pres_rels
            .get(rid)
            .ok_or_else(|| DeckError::MissingPart(format!("{main}: relationship {rid}")))?;
        let slide_path = resolve(dir_of(&main), &target.target);
        let raw = parse_slide(&pkg.part(&slide_path)?)?;
        let rels = pkg.rels_for(&slide_path)?;

        let layout = related(&rels, rel::SLIDE_LAYOUT, dir_of(&slide_path));
        if let Some(path) = layout.as_ref().filter(|p| !layouts.contains_key(*p)) {
            let placeholders = layout_placeholders(&mut pkg, path)?;
            layouts.insert(path.clone(), placeholders);
        }
        let inherited = layout
            .as_ref()
            .and_then(|p| layouts.get(p))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let slide = raw.resolve(&mut pkg, dir_of(&slide_path), &rels, inherited)?;
        debug!(slide = i + 1, shapes = slide.shapes.len(), part = %slide_path, "read slide");
        pres.slides.push(slide);
    }
    Ok(pres)
}

struct PackageReader<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> PackageReader<'a> {
    fn new(bytes: &'a [u8]) -> Result<Self> {
        Ok(Self {
            zip: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    fn has(&self, name: &str) -> bool {
        self.zip.index_for_name(name).is_some()
    }

    fn part(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = match self.zip.by_name(name) {
            Ok(f) => f,
            Err(ZipError::FileNotFound) => return Err(DeckError::MissingPart(name.to_string())),
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Relationships of `part`; a part without a `.rels` file has none.
    fn rels_for(&mut self, part: &str) -> Result<HashMap<String, Relation>> {
        let name = rels_path(part);
        if !self.has(&name) {
            return Ok(HashMap::new());
        }
        parse_rels(&self.part(&name)?)
    }
}

#[derive(Debug, Clone)]
struct Relation {
    kind: String,
    target: String,
    external: bool,
}

/// First internal target of the given relationship type.
fn related(rels: &HashMap<String, Relation>, kind: &str, base_dir: &str) -> Option<String> {
    rels.values()
        .find(|r| r.kind == kind && !r.external)
        .map(|r| resolve(base_dir, &r.target))
}

fn dir_of(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolves a relationship target against the directory of its source part.
fn resolve(base_dir: &str, target: &str) -> String {
    if let Some(abs) = target.strip_prefix('/') {
        return abs.to_string();
    }
    let mut segs: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segs.pop();
            }
            s => segs.push(s),
        }
    }
    segs.join("/")
}

fn attr(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a?;
        if a.key.prefix().is_none() && a.key.local_name().as_ref() == name {
            return Ok(Some(a.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Namespaced attribute such as `r:id` or `r:embed`.
fn rel_attr(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a?;
        if a.key.prefix().is_some() && a.key.local_name().as_ref() == name {
            return Ok(Some(a.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn attr_i64(e: &BytesStart, name: &[u8]) -> Result<Option<i64>> {
    Ok(attr(e, name)?.and_then(|v| v.trim().parse().ok()))
}

fn coord(v: i64) -> i64 {
    v.clamp(-MAX_COORD, MAX_COORD)
}

fn extent(v: i64) -> i64 {
    v.clamp(0, MAX_COORD)
}

fn attr_flag(e: &BytesStart, name: &[u8]) -> Result<bool> {
    Ok(matches!(attr(e, name)?.as_deref(), Some("1" | "true")))
}

fn ends_with(stack: &[Vec<u8>], tail: &[&[u8]]) -> bool {
    stack.len() >= tail.len()
        && stack[stack.len() - tail.len()..]
            .iter()
            .zip(tail)
            .all(|(a, b)| a.as_slice() == *b)
}

fn parse_rels(xml: &[u8]) -> Result<HashMap<String, Relation>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = HashMap::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(kind), Some(target)) =
                    (attr(&e, b"Id")?, attr(&e, b"Type")?, attr(&e, b"Target")?)
                {
                    let external = attr(&e, b"TargetMode")?.as_deref() == Some("External");
                    out.insert(
                        id,
                        Relation {
                            kind,
                            target,
                            external,
                        },
                    );
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

struct PresInfo {
    size: Option<(i64, i64)>,
    slide_rids: Vec<String>,
}

fn parse_presentation(xml: &[u8]) -> Result<PresInfo> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut info = PresInfo {
        size: None,
        slide_rids: Vec::new(),
    };
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sldSz" => {
                    if let (Some(cx), Some(cy)) = (attr_i64(&e, b"cx")?, attr_i64(&e, b"cy")?) {
                        info.size = Some((extent(cx), extent(cy)));
                    }
                }
                b"sldId" => {
                    if let Some(rid) = rel_attr(&e, b"id")? {
                        info.slide_rids.push(rid);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(info)
}

fn parse_core(xml: &[u8]) -> Result<(Option<String>, Option<String>)> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let (mut title, mut creator) = (None, None);
    let mut current: Option<Vec<u8>> = None;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => current = Some(e.local_name().as_ref().to_vec()),
            Event::End(_) => current = None,
            Event::Text(t) => {
                let text = t.unescape()?.trim().to_string();
                match current.as_deref() {
                    Some(b"title") if !text.is_empty() => title = Some(text),
                    Some(b"creator") if !text.is_empty() => creator = Some(text),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok((title, creator))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Sp,
    Pic,
    Frame,
    Cxn,
    Grp,
}

impl Tag {
    fn from_local(name: &[u8]) -> Option<Self> {
        Some(match name {
            b"sp" => Tag::Sp,
            b"pic" => Tag::Pic,
            b"graphicFrame" => Tag::Frame,
            b"cxnSp" => Tag::Cxn,
            b"grpSp" => Tag::Grp,
            _ => return None,
        })
    }
}

/// `p:ph` of a placeholder shape.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    kind: String,
    idx: u32,
}

impl Placeholder {
    /// Type of the master placeholder a layout placeholder of this type
    /// inherits from.
    fn base_kind(&self) -> &str {
        match self.kind.as_str() {
            "title" | "ctrTitle" => "title",
            "dt" => "dt",
            "ftr" => "ftr",
            "sldNum" => "sldNum",
            _ => "body",
        }
    }
}

/// The parts of an `a:xfrm` a shape actually states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Geometry {
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
}

impl Geometry {
    /// Fills in whatever `self` leaves out from `base`.
    fn or(self, base: Geometry) -> Geometry {
        Geometry {
            off: self.off.or(base.off),
            ext: self.ext.or(base.ext),
        }
    }

    fn rect(&self) -> Rect {
        let (x, y) = self.off.unwrap_or((0, 0));
        let (w, h) = self.ext.unwrap_or((0, 0));
        Rect::new(coord(x), coord(y), extent(w), extent(h))
    }
}

/// A shape as seen in the slide XML, before relationships are followed.
#[derive(Debug)]
struct RawShape {
    tag: Tag,
    /// Stack depth of the shape element itself.
    depth: usize,
    id: u32,
    name: Option<String>,
    ph: Option<Placeholder>,
    tx_box: bool,
    prst: Option<String>,
    xfrm: Geometry,
    fill: Option<Fill>,
    line_width: Option<i64>,
    line_color: Option<Color>,
    frame: Option<TextFrame>,
    para: Option<Paragraph>,
    runs: usize,
    blip: Option<String>,
    chart: Option<String>,
    table: Option<Table>,
    row: Vec<String>,
    cell: Option<String>,
}

impl RawShape {
    fn new(tag: Tag, depth: usize) -> Self {
        Self {
            tag,
            depth,
            id: 0,
            name: None,
            ph: None,
            tx_box: false,
            prst: None,
            xfrm: Geometry::default(),
            fill: None,
            line_width: None,
            line_color: None,
            frame: None,
            para: None,
            runs: 0,
            blip: None,
            chart: None,
            table: None,
            row: Vec::new(),
            cell: None,
        }
    }

    /// `stack` includes the element being opened as its last entry.
    fn open(&mut self, e: &BytesStart, stack: &[Vec<u8>]) -> Result<()> {
        let name = stack[stack.len() - 1].as_slice();
        let parent = stack[stack.len() - 2].as_slice();
        // shape-relative path, starting at the shape element
        let rel = &stack[self.depth..];

        match name {
            b"cNvPr" if self.name.is_none() => {
                self.id = attr(e, b"id")?.and_then(|v| v.parse().ok()).unwrap_or(0);
                self.name = Some(attr(e, b"name")?.unwrap_or_default());
            }
            b"off" if parent == b"xfrm" && self.xfrm.off.is_none() => {
                self.xfrm.off = Some((
                    attr_i64(e, b"x")?.unwrap_or(0),
                    attr_i64(e, b"y")?.unwrap_or(0),
                ));
            }
            b"ext" if parent == b"xfrm" && self.xfrm.ext.is_none() => {
                self.xfrm.ext = Some((
                    attr_i64(e, b"cx")?.unwrap_or(0),
                    attr_i64(e, b"cy")?.unwrap_or(0),
                ));
            }
            _ => {}
        }
        if self.tag == Tag::Grp {
            return Ok(());
        }

        match name {
            b"cNvSpPr" => self.tx_box = attr_flag(e, b"txBox")?,
            b"ph" if rel.len() == 4 && parent == b"nvPr" => {
                self.ph = Some(Placeholder {
                    kind: attr(e, b"type")?.unwrap_or_else(|| "obj".to_string()),
                    idx: attr(e, b"idx")?.and_then(|v| v.parse().ok()).unwrap_or(0),
                });
            }
            b"prstGeom" if rel.len() == 3 => self.prst = attr(e, b"prst")?,
            b"srgbClr" => {
                let color = attr(e, b"val")?.and_then(|v| v.parse::<Color>().ok());
                if rel.len() == 4 && ends_with(rel, &[b"spPr", b"solidFill", b"srgbClr"]) {
                    self.fill = color.map(Fill::solid);
                } else if rel.len() == 5 && ends_with(rel, &[b"spPr", b"ln", b"solidFill", b"srgbClr"]) {
                    self.line_color = color;
                } else if ends_with(stack, &[b"rPr", b"solidFill", b"srgbClr"]) && self.runs == 0 {
                    if let (Some(p), Some(c)) = (self.para.as_mut(), color) {
                        p.font.color = Some(c);
                    }
                }
            }
            b"alpha" if rel.len() == 5 && ends_with(rel, &[b"spPr", b"solidFill", b"srgbClr", b"alpha"]) => {
                if let (Some(fill), Some(val)) = (self.fill.as_mut(), attr_i64(e, b"val")?) {
                    fill.transparency = (1.0 - val as f32 / 100_000.0).clamp(0.0, 1.0);
                }
            }
            b"ln" if rel.len() == 3 && parent == b"spPr" => self.line_width = attr_i64(e, b"w")?,
            b"bodyPr" if self.table.is_none() => {
                let mut tf = TextFrame::new(Vec::new());
                tf.wrap = attr(e, b"wrap")?.as_deref() != Some("none");
                tf.anchor = match attr(e, b"anchor")?.as_deref() {
                    Some("ctr") => Anchor::Middle,
                    Some("b") => Anchor::Bottom,
                    _ => Anchor::Top,
                };
                let insets = [
                    attr_i64(e, b"lIns")?,
                    attr_i64(e, b"rIns")?,
                    attr_i64(e, b"tIns")?,
                    attr_i64(e, b"bIns")?,
                ];
                if insets.iter().any(Option::is_some) {
                    let d = Margins::default();
                    tf.margins = Some(Margins {
                        left: insets[0].unwrap_or(d.left),
                        right: insets[1].unwrap_or(d.right),
                        top: insets[2].unwrap_or(d.top),
                        bottom: insets[3].unwrap_or(d.bottom),
                    });
                }
                self.frame = Some(tf);
            }
            b"p" if parent == b"txBody" => {
                self.para = Some(Paragraph::default());
                self.runs = 0;
            }
            b"pPr" => {
                if let (Some(p), Some(algn)) = (self.para.as_mut(), attr(e, b"algn")?) {
                    p.align = algn.parse().unwrap_or_default();
                }
            }
            b"spcPct" if parent == b"lnSpc" => {
                if let (Some(p), Some(val)) = (self.para.as_mut(), attr_i64(e, b"val")?) {
                    p.line_spacing = Some(val as f32 / 100_000.0);
                }
            }
            b"rPr" if parent == b"r" && self.runs == 0 => {
                let size = attr_i64(e, b"sz")?;
                let bold = attr_flag(e, b"b")?;
                let italic = attr_flag(e, b"i")?;
                if let Some(p) = self.para.as_mut() {
                    p.font.size = size.map(|v| v as f32 / 100.0);
                    p.font.bold = bold;
                    p.font.italic = italic;
                }
            }
            b"latin" if parent == b"rPr" && self.runs == 0 => {
                if let (Some(p), Some(face)) = (self.para.as_mut(), attr(e, b"typeface")?) {
                    p.font.family = Some(face);
                }
            }
            b"br" => {
                if let Some(p) = self.para.as_mut() {
                    p.text.push('\n');
                }
            }
            b"blip" => self.blip = rel_attr(e, b"embed")?,
            b"chart" if parent == b"graphicData" => self.chart = rel_attr(e, b"id")?,
            b"tbl" => self.table = Some(Table::default()),
            b"tblPr" => {
                let header = attr_flag(e, b"firstRow")?;
                if let Some(t) = self.table.as_mut() {
                    t.header = header;
                }
            }
            b"tr" => self.row.clear(),
            b"tc" => self.cell = Some(String::new()),
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if self.tag == Tag::Grp {
            return;
        }
        match name {
            b"r" => self.runs += 1,
            b"p" => {
                if let Some(p) = self.para.take() {
                    if let Some(cell) = self.cell.as_mut() {
                        if !cell.is_empty() {
                            cell.push('\n');
                        }
                        cell.push_str(&p.text);
                    } else if let Some(tf) = self.frame.as_mut() {
                        tf.paragraphs.push(p);
                    }
                }
            }
            b"tc" => {
                if let Some(cell) = self.cell.take() {
                    self.row.push(cell);
                }
            }
            b"tr" => {
                if let Some(t) = self.table.as_mut() {
                    t.rows.push(std::mem::take(&mut self.row));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(p) = self.para.as_mut() {
            p.text.push_str(text);
        }
    }

    fn rect(&self) -> Rect {
        self.xfrm.rect()
    }

    /// Geometry after inheriting from the layout placeholder with the same `idx`.
    fn geometry(&self, inherited: &[(Placeholder, Geometry)]) -> Geometry {
        let Some(ph) = &self.ph else {
            return self.xfrm;
        };
        let base = inherited
            .iter()
            .find(|(p, _)| p.idx == ph.idx)
            .map(|(_, g)| *g)
            .unwrap_or_default();
        self.xfrm.or(base)
    }

    fn line(&self) -> Option<Line> {
        if self.line_width.is_none() && self.line_color.is_none() {
            return None;
        }
        Some(Line {
            color: self.line_color.unwrap_or(Color::BLACK),
            width: self.line_width.unwrap_or(12_700),
        })
    }
}

#[derive(Debug)]
struct RawSlide {
    background: Option<Color>,
    shapes: Vec<RawShape>,
}

fn parse_slide(xml: &[u8]) -> Result<RawSlide> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut slide = RawSlide {
        background: None,
        shapes: Vec::new(),
    };
    let mut current: Option<RawShape> = None;

    loop {
        let (start, empty) = match reader.read_event_into(&mut buf)? {
            Event::Start(e) => (Some(e.into_owned()), false),
            Event::Empty(e) => (Some(e.into_owned()), true),
            Event::End(_) => {
                let name = stack.pop().unwrap_or_default();
                close(&mut slide, &mut current, &stack, &name);
                (None, false)
            }
            Event::Text(t) => {
                if stack.last().map(Vec::as_slice) == Some(b"t".as_slice()) {
                    if let Some(shape) = current.as_mut() {
                        shape.text(&t.unescape()?);
                    }
                }
                (None, false)
            }
            Event::Eof => break,
            _ => (None, false),
        };

        if let Some(e) = start {
            let name = e.local_name().as_ref().to_vec();
            // p:sld, p:sldLayout and p:sldMaster share this shape tree
            let top_level =
                current.is_none() && stack.len() == 3 && ends_with(&stack, &[b"cSld", b"spTree"]);
            if top_level {
                if let Some(tag) = Tag::from_local(&name) {
                    current = Some(RawShape::new(tag, stack.len()));
                }
            }
            stack.push(name);
            if let Some(shape) = current.as_mut() {
                shape.open(&e, &stack)?;
            } else if ends_with(&stack, &[b"bg", b"bgPr", b"solidFill", b"srgbClr"]) {
                slide.background = attr(&e, b"val")?.and_then(|v| v.parse().ok());
            }
            if empty {
                let name = stack.pop().unwrap_or_default();
                close(&mut slide, &mut current, &stack, &name);
            }
        }
        buf.clear();
    }
    Ok(slide)
}

/// Handles an end tag; `stack` no longer contains the closed element.
fn close(slide: &mut RawSlide, current: &mut Option<RawShape>, stack: &[Vec<u8>], name: &[u8]) {
    let Some(shape) = current.as_mut() else {
        return;
    };
    shape.close(name);
    if stack.len() == shape.depth {
        if let Some(done) = current.take() {
            slide.shapes.push(done);
        }
    }
}

/// Placeholders of a slide layout with the geometry they pass on to slides.
/// A missing layout part only costs the inheritance.
fn layout_placeholders(
    pkg: &mut PackageReader,
    layout: &str,
) -> Result<Vec<(Placeholder, Geometry)>> {
    if !pkg.has(layout) {
        warn!(part = layout, "slide layout missing");
        return Ok(Vec::new());
    }
    let raw = parse_slide(&pkg.part(layout)?)?;
    let rels = pkg.rels_for(layout)?;
    let master = match related(&rels, rel::SLIDE_MASTER, dir_of(layout)) {
        Some(path) if pkg.has(&path) => parse_slide(&pkg.part(&path)?)?.placeholders(),
        Some(path) => {
            warn!(part = %path, "slide master missing");
            Vec::new()
        }
        None => Vec::new(),
    };
    Ok(raw
        .placeholders()
        .into_iter()
        .map(|(ph, geo)| {
            let base = master
                .iter()
                .find(|(m, _)| m.kind == ph.base_kind())
                .map(|(_, g)| *g)
                .unwrap_or_default();
            (ph, geo.or(base))
        })
        .collect())
}

impl RawSlide {
    fn placeholders(&self) -> Vec<(Placeholder, Geometry)> {
        self.shapes
            .iter()
            .filter_map(|s| s.ph.clone().map(|ph| (ph, s.xfrm)))
            .collect()
    }

    fn resolve(
        self,
        pkg: &mut PackageReader,
        dir: &str,
        rels: &HashMap<String, Relation>,
        inherited: &[(Placeholder, Geometry)],
    ) -> Result<Slide> {
        let mut shapes = Vec::with_capacity(self.shapes.len());
        for raw in self.shapes {
            let rect = raw.geometry(inherited).rect();
            let line = raw.line();
            let target = |rid: &Option<String>| {
                rid.as_ref()
                    .and_then(|r| rels.get(r))
                    .filter(|r| !r.external)
                    .map(|r| resolve(dir, &r.target))
            };

            let (content, text) = match raw.tag {
                Tag::Sp => {
                    let content = if raw.tx_box {
                        ShapeContent::TextBox
                    } else {
                        ShapeContent::AutoShape(
                            raw.prst
                                .as_deref()
                                .and_then(Preset::from_ooxml)
                                .unwrap_or(Preset::Rectangle),
                        )
                    };
                    (content, raw.frame.clone())
                }
                Tag::Pic => {
                    let picture = match target(&raw.blip) {
                        Some(path) => load_picture(&path, pkg.part(&path)?),
                        None => Picture {
                            format: ImageFormat::Png,
                            data: Vec::new(),
                            pixel_size: None,
                        },
                    };
                    (ShapeContent::Picture(picture), None)
                }
                Tag::Frame => {
                    let chart = match target(&raw.chart) {
                        Some(path) => parse_chart(&pkg.part(&path)?)?,
                        None => None,
                    };
                    match (chart, raw.table.clone()) {
                        (Some(chart), _) => (ShapeContent::Chart(chart), None),
                        (None, Some(table)) => (ShapeContent::Table(table), None),
                        // SmartArt, OLE objects and the like stay opaque
                        (None, None) => (ShapeContent::Group, None),
                    }
                }
                Tag::Cxn => (ShapeContent::Connector, None),
                Tag::Grp => (ShapeContent::Group, None),
            };

            shapes.push(Shape {
                id: raw.id,
                name: raw.name.unwrap_or_default(),
                rect,
                content,
                fill: raw.fill,
                line,
                text,
            });
        }
        Ok(Slide {
            shapes,
            background: self.background,
        })
    }
}

/// Falls back to the file extension when the image header cannot be read,
/// so decks with EMF or GIF media still load.
fn load_picture(path: &str, data: Vec<u8>) -> Picture {
    let format = if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        ImageFormat::Jpeg
    } else {
        ImageFormat::Png
    };
    match Picture::from_bytes(data.clone()) {
        Ok(p) => p,
        Err(e) => {
            warn!(part = path, error = %e, "unreadable picture");
            Picture {
                format,
                data,
                pixel_size: None,
            }
        }
    }
}

fn put<T: Default + Clone>(v: &mut Vec<T>, idx: usize, value: T) {
    if idx >= MAX_POINTS {
        return;
    }
    if v.len() <= idx {
        v.resize(idx + 1, T::default());
    }
    v[idx] = value;
}

/// Reads the first plot of a chart part. Unsupported plot types yield `None`.
fn parse_chart(xml: &[u8]) -> Result<Option<Chart>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut kind: Option<ChartKind> = None;
    let mut plot_depth = 0;
    let mut categories: Vec<String> = Vec::new();
    let mut series: Vec<Series> = Vec::new();
    let mut current: Option<Series> = None;
    // index of the current c:pt, None once it lies past c:ptCount
    let mut pt_idx: Option<usize> = None;
    let mut pt_count = MAX_POINTS;
    let mut legend = false;
    let mut data_labels = false;

    loop {
        let (start, empty) = match reader.read_event_into(&mut buf)? {
            Event::Start(e) => (Some(e.into_owned()), false),
            Event::Empty(e) => (Some(e.into_owned()), true),
            Event::End(_) => {
                if let Some(name) = stack.pop() {
                    if name == b"ser" {
                        series.extend(current.take());
                    }
                }
                (None, false)
            }
            Event::Text(t) => {
                if stack.last().map(Vec::as_slice) == Some(b"v".as_slice()) {
                    let text = t.unescape()?.into_owned();
                    let within = |tag: &[u8]| stack.iter().any(|n| n.as_slice() == tag);
                    if let Some(ser) = current.as_mut().filter(|_| within(b"ser")) {
                        if within(b"tx") {
                            ser.name = text;
                        } else if within(b"cat") {
                            if let Some(idx) = pt_idx.filter(|_| series.is_empty()) {
                                put(&mut categories, idx, text);
                            }
                        } else if let Some(idx) = pt_idx.filter(|_| within(b"val")) {
                            put(&mut ser.values, idx, text.trim().parse().unwrap_or(0.0));
                        }
                    }
                }
                (None, false)
            }
            Event::Eof => break,
            _ => (None, false),
        };

        if let Some(e) = start {
            let name = e.local_name().as_ref().to_vec();
            stack.push(name);
            let name = stack[stack.len() - 1].as_slice();
            match name {
                b"barChart" | b"bar3DChart" if kind.is_none() => {
                    kind = Some(ChartKind::Column);
                    plot_depth = stack.len();
                }
                b"barDir" if stack.len() == plot_depth + 1 => {
                    if attr(&e, b"val")?.as_deref() == Some("bar") {
                        kind = Some(ChartKind::Bar);
                    }
                }
                b"lineChart" | b"line3DChart" if kind.is_none() => {
                    kind = Some(ChartKind::Line);
                    plot_depth = stack.len();
                }
                b"pieChart" | b"pie3DChart" | b"ofPieChart" if kind.is_none() => {
                    kind = Some(ChartKind::Pie);
                    plot_depth = stack.len();
                }
                b"doughnutChart" if kind.is_none() => {
                    kind = Some(ChartKind::Doughnut);
                    plot_depth = stack.len();
                }
                b"ser" if kind.is_some() && stack.len() == plot_depth + 1 => {
                    current = Some(Series {
                        name: String::new(),
                        values: Vec::new(),
                        color: None,
                    });
                }
                b"cat" | b"val" => pt_count = MAX_POINTS,
                b"ptCount" => {
                    pt_count = attr(&e, b"val")?
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .map_or(MAX_POINTS, |n| n.min(MAX_POINTS));
                }
                b"pt" => {
                    pt_idx = attr(&e, b"idx")?
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .filter(|&i| i < pt_count);
                }
                b"srgbClr" => {
                    let serie_fill = ends_with(&stack, &[b"ser", b"spPr", b"solidFill", b"srgbClr"])
                        || ends_with(&stack, &[b"ser", b"spPr", b"ln", b"solidFill", b"srgbClr"]);
                    if let Some(s) = current.as_mut().filter(|_| serie_fill) {
                        if s.color.is_none() {
                            s.color = attr(&e, b"val")?.and_then(|v| v.parse().ok());
                        }
                    }
                }
                b"legend" => legend = true,
                b"showVal" if stack.iter().any(|n| n.as_slice() == b"dLbls") => {
                    data_labels |= attr_flag(&e, b"val")?;
                }
                _ => {}
            }
            if empty {
                if let Some(name) = stack.pop() {
                    if name == b"ser" {
                        series.extend(current.take());
                    }
                }
            }
        }
        buf.clear();
    }

    let Some(kind) = kind else {
        return Ok(None);
    };
    // series shorter than the category axis are padded like PowerPoint shows them
    for s in &mut series {
        if s.values.len() < categories.len() {
            s.values.resize(categories.len(), 0.0);
        }
    }
    Ok(Some(Chart {
        kind,
        categories,
        series,
        legend,
        data_labels,
    }))
}
