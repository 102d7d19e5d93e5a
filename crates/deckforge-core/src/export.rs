use serde_json::{Value, json};

use crate::analysis::DeckReport;
use crate::model::DeckStats;

/// Serialize an analysis report as `{ file, width_in, height_in, total_slides,
/// total_shapes, total_overlaps, slides }`.
/// This is also the context handed to user report templates.
pub fn report_to_json(report: &DeckReport, file: &str) -> Value {
    let slides: Vec<Value> = report
        .slides
        .iter()
        .map(|s| {
            let overlaps: Vec<Value> = s
                .overlaps
                .iter()
                .map(|o| json!([o.first, o.second]))
                .collect();
            json!({
                "index": s.index,
                "shape_count": s.shape_count,
                "text_boxes": s.text_boxes,
                "charts": s.charts,
                "pictures": s.pictures,
                "tables": s.tables,
                "items": &s.items,
                "overlaps": overlaps,
                "overlap_count": s.overlaps.len(),
            })
        })
        .collect();
    json!({
        "file": file,
        "width_in": report.width_in,
        "height_in": report.height_in,
        "total_slides": report.slides.len(),
        "total_shapes": report.total_shapes(),
        "total_overlaps": report.total_overlaps(),
        "slides": slides,
    })
}

/// Build statistics plus the overlap count, for `--export-stats`.
pub fn stats_to_json(stats: &DeckStats, overlaps: usize) -> Value {
    json!({
        "num_slides": stats.num_slides,
        "num_shapes": stats.num_shapes,
        "avg_shapes_per_slide": stats.avg_shapes_per_slide(),
        "text_boxes": stats.text_boxes,
        "auto_shapes": stats.auto_shapes,
        "pictures": stats.pictures,
        "charts": stats.charts,
        "tables": stats.tables,
        "connectors": stats.connectors,
        "groups": stats.groups,
        "coverage": stats.coverage,
        "overlaps": overlaps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::builder::SlideBuilder;
    use crate::model::{Presentation, Rect};

    #[test]
    fn report_json_carries_pairs_and_totals() {
        let mut b = SlideBuilder::new();
        b.rect(Rect::new(0, 0, 100, 100));
        b.rect(Rect::new(50, 50, 100, 100));
        let mut pres = Presentation::new(914_400, 914_400);
        pres.slides.push(b.build());

        let v = report_to_json(&analyze(&pres), "a.pptx");
        assert_eq!(v["file"], "a.pptx");
        assert_eq!(v["total_slides"], 1);
        assert_eq!(v["total_overlaps"], 1);
        assert_eq!(v["slides"][0]["overlaps"][0], json!([0, 1]));
        assert_eq!(v["width_in"], 1.0);

        let stats = stats_to_json(&pres.stats(), 1);
        assert_eq!(stats["auto_shapes"], 2);
        assert_eq!(stats["overlaps"], 1);
    }
}
