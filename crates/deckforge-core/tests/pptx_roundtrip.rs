use std::io::{Cursor, Read, Write};

use deckforge_core::model::{
    Anchor, Chart, ChartKind, Color, Fill, Line, Paragraph, Picture, Presentation, Preset, Rect,
    Series, ShapeContent, ShapeKind, Table, TextFrame,
};
use deckforge_core::{
    DeckError, PresentationBuilder, SlideBuilder, analyze, open, read_pptx, save, write_pptx,
};

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([0, 83, 160]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn sample() -> Presentation {
    let mut s1 = SlideBuilder::new();
    s1.text_box(
        Rect::from_inches(0.6, 0.4, 12.0, 0.7),
        TextFrame::single(Paragraph::new("Q&A <draft>").size(24.0).bold()).anchor(Anchor::Middle),
    );
    s1.auto_shape(Preset::Chevron, Rect::from_inches(0.6, 1.5, 3.0, 1.0))
        .set_fill(Fill::solid(Color::rgb(0, 83, 160)).with_transparency(0.2))
        .set_line(Line::new(Color::BLACK, 2.0))
        .set_text(TextFrame::new(vec![
            Paragraph::new("Triage").color(Color::WHITE),
            Paragraph::new("Kiosk\nRecord"),
        ]));
    s1.connector(
        914_400,
        3_000_000,
        5_000_000,
        3_000_000,
        Line::new(Color::rgb(51, 51, 51), 1.0),
    );
    s1.background(Color::rgb(0xF5, 0xF5, 0xF5));

    let mut s2 = SlideBuilder::new();
    s2.chart(
        Rect::from_inches(0.6, 1.5, 7.0, 4.5),
        Chart {
            kind: ChartKind::Bar,
            categories: vec!["Urban".into(), "Tier-2/3".into()],
            series: vec![
                Series {
                    name: "Doctors".into(),
                    values: vec![1.8, 0.5],
                    color: Some(Color::rgb(0, 83, 160)),
                },
                Series {
                    name: "Branches".into(),
                    values: vec![18.0, 6.0],
                    color: Some(Color::rgb(0, 150, 170)),
                },
            ],
            legend: true,
            data_labels: true,
        },
    )
    .unwrap();
    s2.table(
        Rect::from_inches(8.0, 1.5, 4.5, 1.5),
        Table {
            rows: vec![
                vec!["Option".into(), "Cost".into()],
                vec!["Build".into(), "$120M".into()],
                vec!["Partner".into(), "$45M".into()],
            ],
            header: true,
            header_fill: Some(Color::rgb(0, 32, 96)),
            header_color: Some(Color::WHITE),
            band_fill: None,
            font_size: Some(12.0),
        },
    )
    .unwrap();
    s2.picture(
        Rect::from_inches(8.0, 3.5, 2.0, 1.0),
        Picture::from_bytes(png_bytes(40, 20)).unwrap(),
    );

    PresentationBuilder::new(12_192_000, 6_858_000)
        .title("Round trip")
        .author("deckforge tests")
        .push(s1.build())
        .push(s2.build())
        .build()
}

#[test]
fn save_then_open_preserves_structure_and_text() {
    let pres = sample();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.pptx");
    save(&pres, &path).unwrap();
    let back = open(&path).unwrap();

    assert_eq!((back.width, back.height), (pres.width, pres.height));
    assert_eq!(back.title.as_deref(), Some("Round trip"));
    assert_eq!(back.author.as_deref(), Some("deckforge tests"));
    assert_eq!(back.slides.len(), 2);
    for (a, b) in pres.slides.iter().zip(&back.slides) {
        assert_eq!(a.shapes.len(), b.shapes.len());
        for (sa, sb) in a.shapes.iter().zip(&b.shapes) {
            assert_eq!(sa.kind(), sb.kind(), "{}", sa.name);
            assert_eq!(sa.name, sb.name);
            assert_eq!(sa.id, sb.id);
            assert_eq!(sa.rect, sb.rect, "{}", sa.name);
            assert_eq!(sa.text(), sb.text(), "{}", sa.name);
        }
    }
}

#[test]
fn styling_survives_the_round_trip() {
    let back = read_pptx(&write_pptx(&sample()).unwrap()).unwrap();
    let s1 = &back.slides[0];
    assert_eq!(s1.background, Some(Color::rgb(0xF5, 0xF5, 0xF5)));

    let title = &s1.shapes[0];
    assert_eq!(title.kind(), ShapeKind::TextBox);
    let frame = title.text.as_ref().unwrap();
    assert_eq!(frame.anchor, Anchor::Middle);
    assert_eq!(frame.paragraphs[0].text, "Q&A <draft>");
    assert_eq!(frame.paragraphs[0].font.size, Some(24.0));
    assert!(frame.paragraphs[0].font.bold);

    let chevron = &s1.shapes[1];
    assert_eq!(chevron.content, ShapeContent::AutoShape(Preset::Chevron));
    let fill = chevron.fill.unwrap();
    assert_eq!(fill.color, Color::rgb(0, 83, 160));
    assert!((fill.transparency - 0.2).abs() < 1e-3);
    assert_eq!(chevron.line.unwrap().width, 25_400);
    let paras = &chevron.text.as_ref().unwrap().paragraphs;
    assert_eq!(paras[0].font.color, Some(Color::WHITE));
    assert_eq!(paras[1].text, "Kiosk\nRecord");

    assert_eq!(s1.shapes[2].kind(), ShapeKind::Connector);
}

#[test]
fn charts_tables_and_pictures_read_back() {
    let back = read_pptx(&write_pptx(&sample()).unwrap()).unwrap();
    let s2 = &back.slides[1];

    match &s2.shapes[0].content {
        ShapeContent::Chart(c) => {
            assert_eq!(c.kind, ChartKind::Bar);
            assert_eq!(c.categories, vec!["Urban", "Tier-2/3"]);
            assert_eq!(c.series.len(), 2);
            assert_eq!(c.series[1].name, "Branches");
            assert_eq!(c.series[1].values, vec![18.0, 6.0]);
            assert_eq!(c.series[0].color, Some(Color::rgb(0, 83, 160)));
            assert!(c.legend);
            assert!(c.data_labels);
        }
        other => panic!("expected chart, got {other:?}"),
    }
    match &s2.shapes[1].content {
        ShapeContent::Table(t) => {
            assert!(t.header);
            assert_eq!(t.rows[2], vec!["Partner", "$45M"]);
        }
        other => panic!("expected table, got {other:?}"),
    }
    match &s2.shapes[2].content {
        ShapeContent::Picture(p) => assert_eq!(p.pixel_size, Some((40, 20))),
        other => panic!("expected picture, got {other:?}"),
    }
}

#[test]
fn missing_parts_are_reported() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let opts = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", opts).unwrap();
        zip.write_all(
            br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#,
        )
        .unwrap();
        zip.finish().unwrap();
    }
    match read_pptx(buf.get_ref()) {
        Err(DeckError::MissingPart(name)) => assert_eq!(name, "ppt/presentation.xml"),
        other => panic!("expected MissingPart, got {other:?}"),
    }
}

fn part_text(pkg: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(pkg)).unwrap();
    let mut out = String::new();
    zip.by_name(name).unwrap().read_to_string(&mut out).unwrap();
    out
}

/// Copies a package, swapping in new contents for the named parts.
fn with_parts(pkg: &[u8], parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(Cursor::new(pkg)).unwrap();
    let mut buf = Cursor::new(Vec::new());
    {
        let mut out = zip::ZipWriter::new(&mut buf);
        let opts = zip::write::SimpleFileOptions::default();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).unwrap();
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            if let Some((_, text)) = parts.iter().find(|(n, _)| *n == name) {
                data = text.clone().into_bytes();
            }
            out.start_file(name, opts).unwrap();
            out.write_all(&data).unwrap();
        }
        out.finish().unwrap();
    }
    buf.into_inner()
}

fn append_to_tree(xml: &str, shape: &str) -> String {
    xml.replace("</p:spTree>", &format!("{shape}</p:spTree>"))
}

const SLIDE: &str = "ppt/slides/slide1.xml";
const LAYOUT: &str = "ppt/slideLayouts/slideLayout1.xml";
const MASTER: &str = "ppt/slideMasters/slideMaster1.xml";

const TITLE_WITHOUT_XFRM: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="90" name="Title 89"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>Inherited</a:t></a:r></a:p></p:txBody></p:sp>"#;

const TITLE_AT_HALF_INCH: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274320"/><a:ext cx="11247120" cy="914400"/></a:xfrm></p:spPr></p:sp>"#;

#[test]
fn placeholders_take_their_position_from_the_layout() {
    let pkg = write_pptx(&sample()).unwrap();
    let patched = with_parts(
        &pkg,
        &[
            (SLIDE, append_to_tree(&part_text(&pkg, SLIDE), TITLE_WITHOUT_XFRM)),
            (LAYOUT, append_to_tree(&part_text(&pkg, LAYOUT), TITLE_AT_HALF_INCH)),
        ],
    );
    let back = read_pptx(&patched).unwrap();
    let s1 = &back.slides[0];
    assert_eq!(s1.shapes.len(), 4);
    let title = &s1.shapes[3];
    assert_eq!(title.name, "Title 89");
    assert_eq!(title.rect, Rect::new(457_200, 274_320, 11_247_120, 914_400));
    assert_eq!(title.text(), "Inherited");

    // the inherited box sits on top of the deck's own title
    let report = analyze(&back);
    assert!(
        report.slides[0]
            .overlaps
            .iter()
            .any(|o| (o.first, o.second) == (0, 3))
    );
}

#[test]
fn layout_placeholders_fall_back_to_the_master() {
    let layout_title = TITLE_AT_HALF_INCH.replace(
        r#"<p:spPr><a:xfrm><a:off x="457200" y="274320"/><a:ext cx="11247120" cy="914400"/></a:xfrm></p:spPr>"#,
        "<p:spPr/>",
    );
    let layout_title = layout_title.replace(r#"type="title""#, r#"type="ctrTitle""#);
    let pkg = write_pptx(&sample()).unwrap();
    let patched = with_parts(
        &pkg,
        &[
            (SLIDE, append_to_tree(&part_text(&pkg, SLIDE), TITLE_WITHOUT_XFRM)),
            (LAYOUT, append_to_tree(&part_text(&pkg, LAYOUT), &layout_title)),
            (MASTER, append_to_tree(&part_text(&pkg, MASTER), TITLE_AT_HALF_INCH)),
        ],
    );
    let back = read_pptx(&patched).unwrap();
    assert_eq!(
        back.slides[0].shapes[3].rect,
        Rect::new(457_200, 274_320, 11_247_120, 914_400)
    );
}

#[test]
fn hostile_numbers_do_not_panic_the_analysis() {
    let far = r#"<p:sp><p:nvSpPr><p:cNvPr id="91" name="Far"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="9223372036854775000" y="0"/><a:ext cx="9223372036854775000" cy="100"/></a:xfrm></p:spPr></p:sp>"#;
    let pkg = write_pptx(&sample()).unwrap();
    let chart = part_text(&pkg, "ppt/charts/chart1.xml")
        .replacen(r#"<c:pt idx="1">"#, r#"<c:pt idx="18446744073709551615">"#, 1);
    let patched = with_parts(
        &pkg,
        &[
            (SLIDE, append_to_tree(&part_text(&pkg, SLIDE), far)),
            ("ppt/charts/chart1.xml", chart),
        ],
    );
    let back = read_pptx(&patched).unwrap();
    let report = analyze(&back);
    assert_eq!(report.slides[0].shape_count, 4);
    assert!(back.stats().coverage.is_finite());
    match &back.slides[1].shapes[0].content {
        ShapeContent::Chart(c) => assert_eq!(c.categories, vec!["Urban"]),
        other => panic!("expected chart, got {other:?}"),
    }
}
