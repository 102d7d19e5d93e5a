//! PPTX serialisation.
//!
//! XML is generated with `write!` into `String`s and every user-supplied
//! string goes through [`xml_text`]. Parts are collected first and zipped at
//! the end so `[Content_Types].xml` is the first entry of the archive.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{Cursor, Write as _};
use std::path::Path;

use quick_xml::escape::escape;
use tracing::debug;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::{NS_A, NS_C, NS_P, NS_R, NS_RELS, NS_TABLE, ct, rel};
use crate::error::{DeckError, Result};
use crate::model::{
    Align, Anchor, Chart, ChartKind, Color, Fill, Font, ImageFormat, Line, Paragraph,
    Presentation, Rect, Shape, ShapeContent, Slide, Table, TextFrame,
};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const MASTER_XML: &str = include_str!("parts/slideMaster1.xml");
const LAYOUT_XML: &str = include_str!("parts/slideLayout1.xml");
const THEME_XML: &str = include_str!("parts/theme1.xml");
const PRES_PROPS_XML: &str = include_str!("parts/presProps.xml");
const TABLE_STYLES_XML: &str = include_str!("parts/tableStyles.xml");

/// Serialises `pres` into the bytes of a `.pptx` file.
pub fn write_pptx(pres: &Presentation) -> Result<Vec<u8>> {
    if pres.slides.is_empty() {
        return Err(DeckError::Empty);
    }
    if pres.width <= 0 || pres.height <= 0 {
        return Err(DeckError::InvalidDimensions {
            width: pres.width,
            height: pres.height,
        });
    }

    let mut pkg = Package::default();

    let mut root = Rels::default();
    root.add(rel::OFFICE_DOCUMENT, "ppt/presentation.xml");
    root.add(rel::CORE_PROPS, "docProps/core.xml");
    root.add(rel::APP_PROPS, "docProps/app.xml");
    pkg.rels("_rels/.rels", &root)?;
    pkg.xml("docProps/core.xml", ct::CORE_PROPS, core_props(pres)?);
    pkg.xml("docProps/app.xml", ct::APP_PROPS, app_props(pres)?);

    let mut pres_rels = Rels::default();
    pres_rels.add(rel::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    let mut slide_rids = Vec::with_capacity(pres.slides.len());
    for (i, slide) in pres.slides.iter().enumerate() {
        let n = i + 1;
        slide_rids.push(pres_rels.add(rel::SLIDE, format!("slides/slide{n}.xml")));

        let mut rels = Rels::default();
        rels.add(rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        let xml = slide_xml(slide, &mut rels, &mut pkg)?;
        pkg.xml(format!("ppt/slides/slide{n}.xml"), ct::SLIDE, xml);
        pkg.rels(&format!("ppt/slides/_rels/slide{n}.xml.rels"), &rels)?;
        debug!(slide = n, shapes = slide.shapes.len(), "serialised slide");
    }
    pres_rels.add(rel::PRES_PROPS, "presProps.xml");
    pres_rels.add(rel::TABLE_STYLES, "tableStyles.xml");
    pres_rels.add(rel::THEME, "theme/theme1.xml");

    pkg.xml(
        "ppt/presentation.xml",
        ct::PRESENTATION,
        presentation_xml(pres, &slide_rids)?,
    );
    pkg.rels("ppt/_rels/presentation.xml.rels", &pres_rels)?;

    pkg.xml("ppt/slideMasters/slideMaster1.xml", ct::SLIDE_MASTER, MASTER_XML);
    let mut master_rels = Rels::default();
    master_rels.add(rel::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    master_rels.add(rel::THEME, "../theme/theme1.xml");
    pkg.rels("ppt/slideMasters/_rels/slideMaster1.xml.rels", &master_rels)?;

    pkg.xml("ppt/slideLayouts/slideLayout1.xml", ct::SLIDE_LAYOUT, LAYOUT_XML);
    let mut layout_rels = Rels::default();
    layout_rels.add(rel::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    pkg.rels("ppt/slideLayouts/_rels/slideLayout1.xml.rels", &layout_rels)?;

    pkg.xml("ppt/theme/theme1.xml", ct::THEME, THEME_XML);
    pkg.xml("ppt/presProps.xml", ct::PRES_PROPS, PRES_PROPS_XML);
    pkg.xml("ppt/tableStyles.xml", ct::TABLE_STYLES, TABLE_STYLES_XML);

    pkg.finish()
}

/// Writes `pres` to `path` as a `.pptx` file.
pub fn save(pres: &Presentation, path: impl AsRef<Path>) -> Result<()> {
    let bytes = write_pptx(pres)?;
    std::fs::write(path.as_ref(), &bytes)?;
    debug!(path = %path.as_ref().display(), bytes = bytes.len(), "saved presentation");
    Ok(())
}

/// Relationships of one part. Ids are assigned in insertion order.
#[derive(Debug, Default)]
struct Rels {
    items: Vec<(&'static str, String)>,
}

impl Rels {
    fn add(&mut self, kind: &'static str, target: impl Into<String>) -> String {
        self.items.push((kind, target.into()));
        format!("rId{}", self.items.len())
    }

    fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(128 + self.items.len() * 160);
        xml.push_str(XML_DECL);
        write!(xml, r#"<Relationships xmlns="{NS_RELS}">"#)?;
        for (i, (kind, target)) in self.items.iter().enumerate() {
            write!(
                xml,
                r#"<Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
                i + 1,
                kind,
                xml_text(target.as_str())
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

/// Parts waiting to be zipped.
#[derive(Default)]
struct Package {
    parts: Vec<(String, Vec<u8>, bool)>,
    overrides: Vec<(String, &'static str)>,
    has_png: bool,
    has_jpeg: bool,
    images: usize,
    charts: usize,
}

impl Package {
    fn xml(&mut self, name: impl Into<String>, content_type: &'static str, xml: impl Into<String>) {
        let name = name.into();
        self.overrides.push((format!("/{name}"), content_type));
        self.parts.push((name, xml.into().into_bytes(), true));
    }

    fn rels(&mut self, name: &str, rels: &Rels) -> Result<()> {
        self.parts.push((name.to_string(), rels.to_xml()?.into_bytes(), true));
        Ok(())
    }

    /// Stores picture bytes and returns the slide-relative target.
    fn media(&mut self, format: ImageFormat, data: &[u8]) -> String {
        self.images += 1;
        match format {
            ImageFormat::Png => self.has_png = true,
            ImageFormat::Jpeg => self.has_jpeg = true,
        }
        let file = format!("image{}.{}", self.images, format.extension());
        // already compressed
        self.parts
            .push((format!("ppt/media/{file}"), data.to_vec(), false));
        format!("../media/{file}")
    }

    fn chart(&mut self, chart: &Chart) -> Result<String> {
        self.charts += 1;
        let file = format!("chart{}.xml", self.charts);
        self.xml(format!("ppt/charts/{file}"), ct::CHART, chart_xml(chart)?);
        Ok(format!("../charts/{file}"))
    }

    fn content_types(&self) -> Result<String> {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 160);
        xml.push_str(XML_DECL);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        write!(xml, r#"<Default Extension="rels" ContentType="{}"/>"#, ct::RELS)?;
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        if self.has_png {
            xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
        }
        if self.has_jpeg {
            xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);
        }
        for (part, content_type) in &self.overrides {
            write!(
                xml,
                r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
            )?;
        }
        xml.push_str("</Types>");
        Ok(xml)
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", deflated)?;
        zip.write_all(self.content_types()?.as_bytes())?;
        for (name, data, compress) in &self.parts {
            zip.start_file(name.as_str(), if *compress { deflated } else { stored })?;
            zip.write_all(data)?;
        }
        let bytes = zip.finish()?.into_inner();
        debug!(parts = self.parts.len() + 1, bytes = bytes.len(), "package written");
        Ok(bytes)
    }
}

fn core_props(pres: &Presentation) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if let Some(title) = &pres.title {
        write!(xml, "<dc:title>{}</dc:title>", xml_text(title.as_str()))?;
    }
    if let Some(author) = &pres.author {
        write!(xml, "<dc:creator>{}</dc:creator>", xml_text(author.as_str()))?;
    }
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

fn app_props(pres: &Presentation) -> Result<String> {
    let mut xml = String::with_capacity(320);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>deckforge</Application><Slides>{}</Slides></Properties>"#,
        pres.slides.len()
    )?;
    Ok(xml)
}

fn presentation_xml(pres: &Presentation, slide_rids: &[String]) -> Result<String> {
    let mut xml = String::with_capacity(512 + slide_rids.len() * 48);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    )?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str("<p:sldIdLst>");
    for (i, rid) in slide_rids.iter().enumerate() {
        write!(xml, r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rid)?;
    }
    xml.push_str("</p:sldIdLst>");
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        pres.width, pres.height
    )?;
    xml.push_str("</p:presentation>");
    Ok(xml)
}

fn slide_xml(slide: &Slide, rels: &mut Rels, pkg: &mut Package) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide.shapes.len() * 768);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld>"#
    )?;
    if let Some(bg) = slide.background {
        write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            bg.hex()
        )?;
    }
    xml.push_str(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    );
    for shape in &slide.shapes {
        shape_xml(&mut xml, shape, rels, pkg)?;
    }
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(xml)
}

fn c_nv_pr(xml: &mut String, shape: &Shape) -> Result<()> {
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        shape.id,
        xml_text(shape.name.as_str())
    )?;
    Ok(())
}

fn xfrm(xml: &mut String, prefix: &str, r: &Rect) -> Result<()> {
    write!(
        xml,
        r#"<{prefix}:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{prefix}:xfrm>"#,
        r.x,
        r.y,
        r.w.max(0),
        r.h.max(0)
    )?;
    Ok(())
}

fn srgb(xml: &mut String, color: Color, transparency: f32) -> Result<()> {
    if transparency > 0.0 {
        let alpha = ((1.0 - transparency.clamp(0.0, 1.0)) * 100_000.0).round() as u32;
        write!(
            xml,
            r#"<a:srgbClr val="{}"><a:alpha val="{alpha}"/></a:srgbClr>"#,
            color.hex()
        )?;
    } else {
        write!(xml, r#"<a:srgbClr val="{}"/>"#, color.hex())?;
    }
    Ok(())
}

fn fill(xml: &mut String, fill: Option<&Fill>) -> Result<()> {
    match fill {
        Some(f) => {
            xml.push_str("<a:solidFill>");
            srgb(xml, f.color, f.transparency)?;
            xml.push_str("</a:solidFill>");
        }
        None => xml.push_str("<a:noFill/>"),
    }
    Ok(())
}

fn line(xml: &mut String, line: Option<&Line>) -> Result<()> {
    match line {
        Some(l) => {
            write!(xml, r#"<a:ln w="{}"><a:solidFill>"#, l.width)?;
            srgb(xml, l.color, 0.0)?;
            xml.push_str("</a:solidFill></a:ln>");
        }
        None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
    }
    Ok(())
}

fn shape_xml(xml: &mut String, shape: &Shape, rels: &mut Rels, pkg: &mut Package) -> Result<()> {
    match &shape.content {
        ShapeContent::AutoShape(_) | ShapeContent::TextBox => {
            let (prst, tx_box) = match &shape.content {
                ShapeContent::AutoShape(p) => (p.ooxml_name(), false),
                _ => ("rect", true),
            };
            xml.push_str("<p:sp><p:nvSpPr>");
            c_nv_pr(xml, shape)?;
            xml.push_str(if tx_box {
                r#"<p:cNvSpPr txBox="1"/>"#
            } else {
                "<p:cNvSpPr/>"
            });
            xml.push_str("<p:nvPr/></p:nvSpPr><p:spPr>");
            xfrm(xml, "a", &shape.rect)?;
            write!(xml, r#"<a:prstGeom prst="{prst}"><a:avLst/></a:prstGeom>"#)?;
            fill(xml, shape.fill.as_ref())?;
            line(xml, shape.line.as_ref())?;
            xml.push_str("</p:spPr>");
            text_body(xml, "p", shape.text.as_ref())?;
            xml.push_str("</p:sp>");
        }
        ShapeContent::Picture(pic) => {
            let target = pkg.media(pic.format, &pic.data);
            let rid = rels.add(rel::IMAGE, target);
            xml.push_str("<p:pic><p:nvPicPr>");
            c_nv_pr(xml, shape)?;
            xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
            write!(
                xml,
                r#"<p:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#
            )?;
            xml.push_str("<p:spPr>");
            xfrm(xml, "a", &shape.rect)?;
            xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
            if let Some(l) = &shape.line {
                line(xml, Some(l))?;
            }
            xml.push_str("</p:spPr></p:pic>");
        }
        ShapeContent::Chart(chart) => {
            let target = pkg.chart(chart)?;
            let rid = rels.add(rel::CHART, target);
            graphic_frame_open(xml, shape)?;
            write!(
                xml,
                r#"<a:graphic><a:graphicData uri="{NS_C}"><c:chart xmlns:c="{NS_C}" r:id="{rid}"/></a:graphicData></a:graphic></p:graphicFrame>"#
            )?;
        }
        ShapeContent::Table(table) => {
            graphic_frame_open(xml, shape)?;
            write!(xml, r#"<a:graphic><a:graphicData uri="{NS_TABLE}">"#)?;
            table_xml(xml, table, &shape.rect)?;
            xml.push_str("</a:graphicData></a:graphic></p:graphicFrame>");
        }
        ShapeContent::Connector => {
            xml.push_str("<p:cxnSp><p:nvCxnSpPr>");
            c_nv_pr(xml, shape)?;
            xml.push_str("<p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr>");
            xfrm(xml, "a", &shape.rect)?;
            xml.push_str(r#"<a:prstGeom prst="line"><a:avLst/></a:prstGeom>"#);
            line(xml, shape.line.as_ref())?;
            xml.push_str("</p:spPr></p:cxnSp>");
        }
        ShapeContent::Group => {
            let r = &shape.rect;
            xml.push_str("<p:grpSp><p:nvGrpSpPr>");
            c_nv_pr(xml, shape)?;
            xml.push_str("<p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr>");
            write!(
                xml,
                r#"<a:xfrm><a:off x="{0}" y="{1}"/><a:ext cx="{2}" cy="{3}"/><a:chOff x="{0}" y="{1}"/><a:chExt cx="{2}" cy="{3}"/></a:xfrm>"#,
                r.x,
                r.y,
                r.w.max(0),
                r.h.max(0)
            )?;
            xml.push_str("</p:grpSpPr></p:grpSp>");
        }
    }
    Ok(())
}

fn graphic_frame_open(xml: &mut String, shape: &Shape) -> Result<()> {
    xml.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
    c_nv_pr(xml, shape)?;
    xml.push_str(
        r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
    );
    xfrm(xml, "p", &shape.rect)
}

fn align_attr(a: Align) -> &'static str {
    match a {
        Align::Left => "l",
        Align::Center => "ctr",
        Align::Right => "r",
        Align::Justify => "just",
    }
}

fn anchor_attr(a: Anchor) -> &'static str {
    match a {
        Anchor::Top => "t",
        Anchor::Middle => "ctr",
        Anchor::Bottom => "b",
    }
}

/// `<p:txBody>` or `<a:txBody>` (table cells) with at least one paragraph.
fn text_body(xml: &mut String, prefix: &str, frame: Option<&TextFrame>) -> Result<()> {
    write!(xml, "<{prefix}:txBody>")?;
    match frame {
        Some(tf) => {
            write!(
                xml,
                r#"<a:bodyPr wrap="{}" rtlCol="0" anchor="{}""#,
                if tf.wrap { "square" } else { "none" },
                anchor_attr(tf.anchor)
            )?;
            if let Some(m) = tf.margins {
                write!(
                    xml,
                    r#" lIns="{}" tIns="{}" rIns="{}" bIns="{}""#,
                    m.left, m.top, m.right, m.bottom
                )?;
            }
            xml.push_str("/><a:lstStyle/>");
            if tf.paragraphs.is_empty() {
                xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
            }
            for p in &tf.paragraphs {
                paragraph(xml, p)?;
            }
        }
        None => xml.push_str(
            r#"<a:bodyPr rtlCol="0" anchor="ctr"/><a:lstStyle/><a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#,
        ),
    }
    write!(xml, "</{prefix}:txBody>")?;
    Ok(())
}

fn run_props(xml: &mut String, tag: &str, font: &Font) -> Result<()> {
    write!(xml, r#"<a:{tag} lang="en-US""#)?;
    if let Some(size) = font.size {
        write!(xml, r#" sz="{}""#, (size * 100.0).round() as u32)?;
    }
    if font.bold {
        xml.push_str(r#" b="1""#);
    }
    if font.italic {
        xml.push_str(r#" i="1""#);
    }
    xml.push_str(r#" dirty="0""#);
    if font.color.is_none() && font.family.is_none() {
        xml.push_str("/>");
        return Ok(());
    }
    xml.push('>');
    if let Some(color) = font.color {
        xml.push_str("<a:solidFill>");
        srgb(xml, color, 0.0)?;
        xml.push_str("</a:solidFill>");
    }
    if let Some(family) = &font.family {
        write!(xml, r#"<a:latin typeface="{}"/>"#, xml_text(family.as_str()))?;
    }
    write!(xml, "</a:{tag}>")?;
    Ok(())
}

/// Characters XML 1.0 does not allow in a document.
fn forbidden(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// [`escape`] that also writes forbidden characters as `_xHHHH_`, the form
/// Office uses for them.
fn xml_text(s: &str) -> Cow<'_, str> {
    if !s.chars().any(forbidden) {
        return escape(s);
    }
    let mut clean = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if forbidden(c) {
            clean.push_str(&format!("_x{:04X}_", u32::from(c)));
        } else {
            clean.push(c);
        }
    }
    Cow::Owned(escape(clean.as_str()).into_owned())
}

fn paragraph(xml: &mut String, p: &Paragraph) -> Result<()> {
    xml.push_str("<a:p>");
    write!(xml, r#"<a:pPr algn="{}""#, align_attr(p.align))?;
    match p.line_spacing {
        Some(mult) => write!(
            xml,
            r#"><a:lnSpc><a:spcPct val="{}"/></a:lnSpc></a:pPr>"#,
            (mult * 100_000.0).round() as u32
        )?,
        None => xml.push_str("/>"),
    }
    // embedded newlines and vertical tabs become soft breaks inside the paragraph
    for (i, chunk) in p.text.split(['\n', '\u{B}']).enumerate() {
        if i > 0 {
            xml.push_str("<a:br>");
            run_props(xml, "rPr", &p.font)?;
            xml.push_str("</a:br>");
        }
        if chunk.is_empty() {
            continue;
        }
        xml.push_str("<a:r>");
        run_props(xml, "rPr", &p.font)?;
        write!(xml, "<a:t>{}</a:t></a:r>", xml_text(chunk))?;
    }
    run_props(xml, "endParaRPr", &p.font)?;
    xml.push_str("</a:p>");
    Ok(())
}

fn table_xml(xml: &mut String, table: &Table, rect: &Rect) -> Result<()> {
    let ncols = table.column_count().max(1);
    let nrows = table.row_count().max(1);
    let col_w = rect.w.max(0) / ncols as i64;
    let row_h = rect.h.max(0) / nrows as i64;

    write!(
        xml,
        r#"<a:tbl><a:tblPr firstRow="{}" bandRow="{}"/><a:tblGrid>"#,
        u8::from(table.header),
        u8::from(table.band_fill.is_some())
    )?;
    for _ in 0..ncols {
        write!(xml, r#"<a:gridCol w="{col_w}"/>"#)?;
    }
    xml.push_str("</a:tblGrid>");

    for (r, row) in table.rows.iter().enumerate() {
        let is_header = table.header && r == 0;
        let body_index = if table.header { r.wrapping_sub(1) } else { r };
        let cell_fill = if is_header {
            table.header_fill
        } else if body_index % 2 == 1 {
            table.band_fill
        } else {
            None
        };
        let font = Font {
            size: table.font_size,
            bold: is_header,
            color: if is_header { table.header_color } else { None },
            ..Default::default()
        };

        write!(xml, r#"<a:tr h="{row_h}">"#)?;
        for c in 0..ncols {
            let text = row.get(c).map(String::as_str).unwrap_or("");
            let para = Paragraph {
                text: text.to_string(),
                font: font.clone(),
                ..Default::default()
            };
            xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>");
            paragraph(xml, &para)?;
            xml.push_str("</a:txBody><a:tcPr>");
            if let Some(color) = cell_fill {
                xml.push_str("<a:solidFill>");
                srgb(xml, color, 0.0)?;
                xml.push_str("</a:solidFill>");
            }
            xml.push_str("</a:tcPr></a:tc>");
        }
        xml.push_str("</a:tr>");
    }
    xml.push_str("</a:tbl>");
    Ok(())
}

fn chart_xml(chart: &Chart) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<c:chartSpace xmlns:c="{NS_C}" xmlns:a="{NS_A}" xmlns:r="{NS_R}"><c:roundedCorners val="0"/><c:chart><c:autoTitleDeleted val="1"/><c:plotArea><c:layout/>"#
    )?;

    let round = matches!(chart.kind, ChartKind::Pie | ChartKind::Doughnut);
    match chart.kind {
        ChartKind::Column | ChartKind::Bar => {
            let dir = if chart.kind == ChartKind::Column { "col" } else { "bar" };
            write!(
                xml,
                r#"<c:barChart><c:barDir val="{dir}"/><c:grouping val="clustered"/><c:varyColors val="0"/>"#
            )?;
            series_xml(&mut xml, chart)?;
            xml.push_str(r#"<c:gapWidth val="150"/><c:axId val="1"/><c:axId val="2"/></c:barChart>"#);
        }
        ChartKind::Line => {
            xml.push_str(r#"<c:lineChart><c:grouping val="standard"/><c:varyColors val="0"/>"#);
            series_xml(&mut xml, chart)?;
            xml.push_str(r#"<c:marker val="1"/><c:axId val="1"/><c:axId val="2"/></c:lineChart>"#);
        }
        ChartKind::Pie => {
            xml.push_str(r#"<c:pieChart><c:varyColors val="1"/>"#);
            series_xml(&mut xml, chart)?;
            xml.push_str(r#"<c:firstSliceAng val="0"/></c:pieChart>"#);
        }
        ChartKind::Doughnut => {
            xml.push_str(r#"<c:doughnutChart><c:varyColors val="1"/>"#);
            series_xml(&mut xml, chart)?;
            xml.push_str(r#"<c:firstSliceAng val="0"/><c:holeSize val="50"/></c:doughnutChart>"#);
        }
    }
    if !round {
        let (cat_pos, val_pos) = if chart.kind == ChartKind::Bar {
            ("l", "b")
        } else {
            ("b", "l")
        };
        write!(
            xml,
            r#"<c:catAx><c:axId val="1"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="{cat_pos}"/><c:numFmt formatCode="General" sourceLinked="0"/><c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="2"/><c:crosses val="autoZero"/><c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/></c:catAx>"#
        )?;
        write!(
            xml,
            r#"<c:valAx><c:axId val="2"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="{val_pos}"/><c:majorGridlines/><c:numFmt formatCode="General" sourceLinked="0"/><c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="1"/><c:crosses val="autoZero"/><c:crossBetween val="between"/></c:valAx>"#
        )?;
    }
    xml.push_str("</c:plotArea>");
    if chart.legend {
        xml.push_str(r#"<c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#);
    }
    xml.push_str(r#"<c:plotVisOnly val="1"/></c:chart></c:chartSpace>"#);
    Ok(xml)
}

fn series_xml(xml: &mut String, chart: &Chart) -> Result<()> {
    let round = matches!(chart.kind, ChartKind::Pie | ChartKind::Doughnut);
    for (i, s) in chart.series.iter().enumerate() {
        write!(
            xml,
            r#"<c:ser><c:idx val="{i}"/><c:order val="{i}"/><c:tx><c:v>{}</c:v></c:tx>"#,
            xml_text(s.name.as_str())
        )?;
        // a series-level fill would paint every slice of a pie the same
        if let (Some(color), false) = (s.color, round) {
            xml.push_str("<c:spPr>");
            if chart.kind == ChartKind::Line {
                xml.push_str(r#"<a:ln w="28575" cap="rnd"><a:solidFill>"#);
                srgb(xml, color, 0.0)?;
                xml.push_str("</a:solidFill></a:ln>");
            } else {
                xml.push_str("<a:solidFill>");
                srgb(xml, color, 0.0)?;
                xml.push_str("</a:solidFill>");
            }
            xml.push_str("</c:spPr>");
        }
        if matches!(chart.kind, ChartKind::Column | ChartKind::Bar) {
            xml.push_str(r#"<c:invertIfNegative val="0"/>"#);
        }
        if chart.data_labels {
            write!(
                xml,
                r#"<c:dLbls><c:showLegendKey val="0"/><c:showVal val="1"/><c:showCatName val="0"/><c:showSerName val="0"/><c:showPercent val="{}"/><c:showBubbleSize val="0"/></c:dLbls>"#,
                u8::from(round)
            )?;
        }
        write!(
            xml,
            r#"<c:cat><c:strLit><c:ptCount val="{}"/>"#,
            chart.categories.len()
        )?;
        for (j, cat) in chart.categories.iter().enumerate() {
            write!(xml, r#"<c:pt idx="{j}"><c:v>{}</c:v></c:pt>"#, xml_text(cat.as_str()))?;
        }
        write!(
            xml,
            r#"</c:strLit></c:cat><c:val><c:numLit><c:formatCode>General</c:formatCode><c:ptCount val="{}"/>"#,
            s.values.len()
        )?;
        for (j, v) in s.values.iter().enumerate() {
            write!(xml, r#"<c:pt idx="{j}"><c:v>{v}</c:v></c:pt>"#)?;
        }
        xml.push_str("</c:numLit></c:val>");
        if chart.kind == ChartKind::Line {
            xml.push_str(r#"<c:smooth val="0"/>"#);
        }
        xml.push_str("</c:ser>");
    }
    Ok(())
}
