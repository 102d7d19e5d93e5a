use std::path::Path;

use deckforge_core::samples::SAMPLES;
use deckforge_core::{
    BuildConfig, OverlapPolicy, analyze, overlap, read_pptx, render_deck, write_pptx,
};

#[test]
fn every_sample_builds_without_overlaps() {
    for sample in &SAMPLES {
        let spec = sample.spec().unwrap();
        let pres = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap();
        assert_eq!(pres.slides.len(), spec.slides.len(), "{}", sample.name);

        let found = overlap::enforce(&pres, OverlapPolicy::Deny);
        assert!(found.is_ok(), "{}: {:?}", sample.name, found.err());

        let page = pres.bounds();
        for (i, slide) in pres.slides.iter().enumerate() {
            for shape in &slide.shapes {
                assert!(
                    page.contains(&shape.rect),
                    "{} slide {}: {} leaves the page",
                    sample.name,
                    i + 1,
                    shape.name
                );
            }
        }
    }
}

#[test]
fn every_sample_writes_a_readable_pptx() {
    for sample in &SAMPLES {
        let spec = sample.spec().unwrap();
        let pres = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap();
        let bytes = write_pptx(&pres).unwrap();
        assert!(!bytes.is_empty());

        let back = read_pptx(&bytes).unwrap();
        assert_eq!(back.slides.len(), pres.slides.len(), "{}", sample.name);
        let report = analyze(&back);
        assert_eq!(report.total_overlaps(), 0, "{}", sample.name);
        assert_eq!(report.total_shapes(), pres.stats().num_shapes, "{}", sample.name);
    }
}

#[test]
fn deck_settings_override_the_config() {
    let spec = deckforge_core::samples::find("strategy-frameworks")
        .unwrap()
        .spec()
        .unwrap();
    let pres = render_deck(&spec, &BuildConfig::default(), Path::new(".")).unwrap();
    // standard 4:3 page from the deck settings
    assert_eq!((pres.width, pres.height), (9_144_000, 6_858_000));
}
