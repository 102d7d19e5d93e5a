//! Post-hoc overlap detection between shapes on a slide.
//!
//! Two rectangles overlap unless one lies strictly to the left, right, above
//! or below the other. Shared edges count as overlapping and there is no
//! tolerance; the result is informational and never changes a slide.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::OverlapPolicy;
use crate::error::{DeckError, Result};
use crate::model::{Presentation, Rect, Slide};

/// Index pair of two overlapping shapes, `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Overlap {
    pub first: usize,
    pub second: usize,
}

pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

/// Pairwise O(n²) check over `rects`, in ascending `(first, second)` order.
pub fn find_overlaps(rects: &[Rect]) -> Vec<Overlap> {
    let mut out = Vec::new();
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if overlaps(&rects[i], &rects[j]) {
                out.push(Overlap {
                    first: i,
                    second: j,
                });
            }
        }
    }
    out
}

pub fn slide_overlaps(slide: &Slide) -> Vec<Overlap> {
    find_overlaps(&slide.rects())
}

/// Overlaps for every slide of a deck, indexed like `pres.slides`.
#[cfg(not(feature = "parallel"))]
pub fn deck_overlaps(pres: &Presentation) -> Vec<Vec<Overlap>> {
    pres.slides.iter().map(slide_overlaps).collect()
}

/// Overlaps for every slide of a deck, indexed like `pres.slides`.
#[cfg(feature = "parallel")]
pub fn deck_overlaps(pres: &Presentation) -> Vec<Vec<Overlap>> {
    use rayon::prelude::*;
    pres.slides.par_iter().map(slide_overlaps).collect()
}

/// Applies `policy` to a rendered deck and returns the number of overlapping
/// pairs found. `Deny` turns any overlap into an `InvalidLayout` error.
pub fn enforce(pres: &Presentation, policy: OverlapPolicy) -> Result<usize> {
    if policy == OverlapPolicy::Ignore {
        return Ok(0);
    }
    let per_slide = deck_overlaps(pres);
    let total = per_slide.iter().map(Vec::len).sum();
    if total == 0 {
        return Ok(0);
    }
    let mut pairs = Vec::new();
    for (idx, (slide, found)) in pres.slides.iter().zip(&per_slide).enumerate() {
        for o in found {
            let a = &slide.shapes[o.first].name;
            let b = &slide.shapes[o.second].name;
            if policy == OverlapPolicy::Warn {
                warn!(slide = idx + 1, "{a} overlaps {b}");
            }
            pairs.push(format!("slide {}: {a} / {b}", idx + 1));
        }
    }
    if policy == OverlapPolicy::Deny {
        let shown = pairs.iter().take(5).cloned().collect::<Vec<_>>().join("; ");
        let more = if pairs.len() > 5 {
            format!(" (+{} more)", pairs.len() - 5)
        } else {
            String::new()
        };
        return Err(DeckError::InvalidLayout(format!(
            "{total} overlapping shape pairs: {shown}{more}"
        )));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{PresentationBuilder, SlideBuilder};

    #[test]
    fn touching_edges_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(overlaps(&a, &b));
        let c = Rect::new(11, 0, 10, 10);
        assert!(!overlaps(&a, &c));
    }

    #[test]
    fn pairs_are_ordered() {
        let rects = [
            Rect::new(0, 0, 10, 10),
            Rect::new(100, 100, 10, 10),
            Rect::new(5, 5, 10, 10),
            Rect::new(105, 105, 1, 1),
        ];
        let found = find_overlaps(&rects);
        assert_eq!(
            found,
            vec![
                Overlap { first: 0, second: 2 },
                Overlap { first: 1, second: 3 },
            ]
        );
    }

    fn crowded_deck() -> Presentation {
        let mut b = SlideBuilder::new();
        b.rect(Rect::new(0, 0, 100, 100));
        b.rect(Rect::new(50, 50, 100, 100));
        PresentationBuilder::new(1_000, 1_000).push(b.build()).build()
    }

    #[test]
    fn policies() {
        let pres = crowded_deck();
        assert_eq!(enforce(&pres, OverlapPolicy::Ignore).unwrap(), 0);
        assert_eq!(enforce(&pres, OverlapPolicy::Warn).unwrap(), 1);
        let err = enforce(&pres, OverlapPolicy::Deny).unwrap_err();
        assert!(err.to_string().contains("Rectangle 1 / Rectangle 2"));
    }
}
