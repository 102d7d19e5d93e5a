//! Length units. All geometry is stored in EMU (English Metric Units).

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_POINT: i64 = 12_700;

/// Inches to EMU, rounded to the nearest unit.
pub fn inches(v: f64) -> i64 {
    (v * EMU_PER_INCH as f64).round() as i64
}

/// Points to EMU, rounded to the nearest unit.
pub fn points(v: f64) -> i64 {
    (v * EMU_PER_POINT as f64).round() as i64
}

pub fn to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

pub fn to_points(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inch_and_point_conversions() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(13.333), 12_191_695);
        assert_eq!(points(2.0), 25_400);
        assert_eq!(to_inches(inches(7.5)), 7.5);
        assert_eq!(to_points(points(18.0)), 18.0);
    }
}
