use crate::types::{Point, Value};

// Return the interpolation factor t corresponding to iso_val.
// Equal endpoint values have no crossing to locate, so t collapses to 0.
pub fn find_t(v0: Value, v1: Value, iso_val: Value) -> Value {
    let t = (iso_val - v0) / (v1 - v0);
    if t.is_finite() { t } else { 0. }
}

// Linear interpolation
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

// Linearly interpolate between two points by factor t
pub fn interpolate_points(p0: Point, p1: Point, t: Value) -> Point {
    Point::from(p0.coords.zip_map(&p1.coords, |a, b| lerp(a, b, t)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_locates_the_crossing() {
        assert_eq!(find_t(-1., 3., 0.), 0.25);
        assert_eq!(find_t(2., -2., 0.), 0.5);
    }

    #[test]
    fn degenerate_edge_clamps_to_start() {
        assert_eq!(find_t(0.5, 0.5, 0.), 0.);
        assert_eq!(find_t(0., 0., 0.), 0.);
    }

    #[test]
    fn points_interpolate_componentwise() {
        let p = interpolate_points(Point::new(0., 2., 4.), Point::new(4., 2., 0.), 0.25);
        assert_eq!(p, Point::new(1., 2., 3.));
    }
}
