//! Grid and column positioning for slide content.
//!
//! All helpers work in EMU and return rectangles in reading order
//! (left-to-right, then top-to-bottom). Cells are disjoint whenever the gap
//! is positive, so templates built on top of them pass the overlap check.

use crate::error::{DeckError, Result};
use crate::model::Rect;

fn check_count(what: &str, n: usize) -> Result<()> {
    if n == 0 {
        return Err(DeckError::InvalidLayout(format!("{what}: count must be > 0")));
    }
    Ok(())
}

fn cell_size(what: &str, extent: i64, n: usize, gap: i64) -> Result<i64> {
    if gap < 0 {
        return Err(DeckError::InvalidLayout(format!("{what}: negative gap {gap}")));
    }
    let free = extent - gap * (n as i64 - 1);
    let size = free / n as i64;
    if size <= 0 {
        return Err(DeckError::InvalidLayout(format!(
            "{what}: {n} cells with gap {gap} do not fit in {extent} EMU"
        )));
    }
    Ok(size)
}

/// `n` equal columns across `area`, separated by `gap`.
pub fn columns(area: Rect, n: usize, gap: i64) -> Result<Vec<Rect>> {
    check_count("columns", n)?;
    let w = cell_size("columns", area.w, n, gap)?;
    Ok((0..n as i64)
        .map(|i| Rect::new(area.x + i * (w + gap), area.y, w, area.h))
        .collect())
}

/// `n` equal rows down `area`, separated by `gap`.
pub fn rows(area: Rect, n: usize, gap: i64) -> Result<Vec<Rect>> {
    check_count("rows", n)?;
    let h = cell_size("rows", area.h, n, gap)?;
    Ok((0..n as i64)
        .map(|i| Rect::new(area.x, area.y + i * (h + gap), area.w, h))
        .collect())
}

/// Row-major grid of `nrows * ncols` cells.
pub fn grid(area: Rect, nrows: usize, ncols: usize, hgap: i64, vgap: i64) -> Result<Vec<Rect>> {
    let mut cells = Vec::with_capacity(nrows * ncols);
    for row in rows(area, nrows, vgap)? {
        cells.extend(columns(row, ncols, hgap)?);
    }
    Ok(cells)
}

/// Columns whose widths are proportional to `weights`.
pub fn split_columns(area: Rect, weights: &[f64], gap: i64) -> Result<Vec<Rect>> {
    check_count("split_columns", weights.len())?;
    if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err(DeckError::InvalidLayout(
            "split_columns: weights must be positive".into(),
        ));
    }
    // validates the gap against the extent
    cell_size("split_columns", area.w, weights.len(), gap)?;
    let free = (area.w - gap * (weights.len() as i64 - 1)) as f64;
    let total: f64 = weights.iter().sum();
    let mut x = area.x;
    let mut out = Vec::with_capacity(weights.len());
    for w in weights {
        let cw = (free * w / total).floor() as i64;
        if cw <= 0 {
            return Err(DeckError::InvalidLayout(format!(
                "split_columns: weight {w} leaves an empty column"
            )));
        }
        out.push(Rect::new(x, area.y, cw, area.h));
        x += cw + gap;
    }
    Ok(out)
}

/// Horizontal centres of `n` markers spaced `area.w / (n + 1)` apart,
/// leaving equal margins at both ends.
pub fn spread(area: Rect, n: usize) -> Result<Vec<i64>> {
    check_count("spread", n)?;
    let spacing = area.w / (n as i64 + 1);
    if spacing <= 0 {
        return Err(DeckError::InvalidLayout(format!(
            "spread: {n} markers do not fit in {} EMU",
            area.w
        )));
    }
    Ok((1..=n as i64).map(|i| area.x + spacing * i).collect())
}

/// Distance between neighbouring centres returned by [`spread`].
pub fn spread_spacing(area: Rect, n: usize) -> i64 {
    area.w / (n as i64 + 1)
}

/// Largest rectangle with the aspect ratio `px_w:px_h` that fits inside
/// `frame`, centred. Returns `frame` unchanged for degenerate sizes.
pub fn fit_aspect(frame: Rect, px_w: u32, px_h: u32) -> Rect {
    if px_w == 0 || px_h == 0 || frame.w <= 0 || frame.h <= 0 {
        return frame;
    }
    let scale = (frame.w as f64 / px_w as f64).min(frame.h as f64 / px_h as f64);
    let w = ((px_w as f64 * scale).round() as i64).min(frame.w);
    let h = ((px_h as f64 * scale).round() as i64).min(frame.h);
    Rect::new(
        frame.x + (frame.w - w) / 2,
        frame.y + (frame.h - h) / 2,
        w,
        h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_cover_area_with_gaps() {
        let area = Rect::new(100, 0, 1000, 50);
        let cols = columns(area, 3, 10).unwrap();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0], Rect::new(100, 0, 326, 50));
        assert_eq!(cols[1].x, cols[0].right() + 10);
        assert!(cols[2].right() <= area.right());
    }

    #[test]
    fn zero_count_and_overfull_gaps_are_errors() {
        let area = Rect::new(0, 0, 100, 100);
        assert!(columns(area, 0, 0).is_err());
        assert!(rows(area, 5, 30).is_err());
        assert!(columns(area, 2, -1).is_err());
        assert!(split_columns(area, &[], 0).is_err());
        assert!(split_columns(area, &[1.0, 0.0], 0).is_err());
    }

    #[test]
    fn grid_is_row_major() {
        let cells = grid(Rect::new(0, 0, 200, 200), 2, 2, 20, 20).unwrap();
        assert_eq!(cells[0], Rect::new(0, 0, 90, 90));
        assert_eq!(cells[1], Rect::new(110, 0, 90, 90));
        assert_eq!(cells[2], Rect::new(0, 110, 90, 90));
    }

    #[test]
    fn split_columns_follow_weights() {
        let cols = split_columns(Rect::new(0, 0, 1010, 10), &[2.0, 1.0], 10).unwrap();
        assert_eq!(cols[0].w, 666);
        assert_eq!(cols[1].w, 333);
        assert_eq!(cols[1].x, 676);
    }

    #[test]
    fn spread_leaves_equal_margins() {
        let xs = spread(Rect::new(0, 0, 400, 10), 3).unwrap();
        assert_eq!(xs, vec![100, 200, 300]);
    }

    #[test]
    fn fit_aspect_letterboxes() {
        let frame = Rect::new(0, 0, 400, 200);
        let fitted = fit_aspect(frame, 100, 100);
        assert_eq!(fitted, Rect::new(100, 0, 200, 200));
        assert!(frame.contains(&fitted));
        assert_eq!(fit_aspect(frame, 0, 10), frame);
    }
}
