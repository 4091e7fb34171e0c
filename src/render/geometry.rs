//! Shared geometry calculations for annotations
//!
//! Constants and math shared between interactive construction (tool
//! handlers, hit testing) and image rendering (tiny-skia).

/// Arrow geometry
pub mod arrow {
    use crate::domain::Point;

    /// Arrowhead half-angle from the shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;
    /// Head stroke length as a multiple of the arrow's stroke width
    pub const HEAD_LENGTH_FACTOR: f32 = 4.0;

    /// Calculate the two arrowhead points for an arrow from `start` to `end`.
    ///
    /// Each head point is `end` pushed back along the shaft by
    /// `4 × stroke_width`, rotated by ±30° around `end`. Pure; identical
    /// inputs give bit-identical outputs.
    pub fn head_points(start: Point, end: Point, stroke_width: f32) -> (Point, Point) {
        let length = HEAD_LENGTH_FACTOR * stroke_width;
        let angle = (end.y - start.y).atan2(end.x - start.x);

        let head1 = Point {
            x: end.x - length * (angle - HEAD_ANGLE).cos(),
            y: end.y - length * (angle - HEAD_ANGLE).sin(),
        };
        let head2 = Point {
            x: end.x - length * (angle + HEAD_ANGLE).cos(),
            y: end.y - length * (angle + HEAD_ANGLE).sin(),
        };
        (head1, head2)
    }

    /// The three line segments an arrow is drawn with: shaft, then both heads
    pub fn segments(start: Point, end: Point, stroke_width: f32) -> [(Point, Point); 3] {
        let (head1, head2) = head_points(start, end, stroke_width);
        [(start, end), (end, head1), (end, head2)]
    }
}

/// Shape (rectangle/circle) geometry constants
pub mod shape {
    /// Circle bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point;

    #[test]
    fn test_horizontal_arrow_heads() {
        let end = Point::new(100.0, 0.0);
        let (h1, h2) = arrow::head_points(Point::new(0.0, 0.0), end, 5.0);

        // Length 4 × 5 = 20
        assert!((h1.distance(end) - 20.0).abs() < 1e-4);
        assert!((h2.distance(end) - 20.0).abs() < 1e-4);

        // Symmetric about the shaft, pointing backwards
        let back = 100.0 - 20.0 * (std::f32::consts::FRAC_PI_6).cos();
        assert!((h1.x - back).abs() < 1e-4);
        assert!((h2.x - back).abs() < 1e-4);
        assert!((h1.y + 10.0).abs() < 1e-4);
        assert!((h2.y - 10.0).abs() < 1e-4);
        assert!((h1.y + h2.y).abs() < 1e-5);
    }

    #[test]
    fn test_head_points_are_deterministic() {
        let a = Point::new(13.25, -7.5);
        let b = Point::new(-40.0, 91.125);
        let first = arrow::head_points(a, b, 3.0);
        // Unrelated work in between must not influence the result
        let _ = arrow::head_points(b, a, 11.0);
        let second = arrow::head_points(a, b, 3.0);
        assert_eq!(first.0.x.to_bits(), second.0.x.to_bits());
        assert_eq!(first.0.y.to_bits(), second.0.y.to_bits());
        assert_eq!(first.1.x.to_bits(), second.1.x.to_bits());
        assert_eq!(first.1.y.to_bits(), second.1.y.to_bits());
    }

    #[test]
    fn test_head_angle_is_thirty_degrees() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(0.0, 50.0);
        let (h1, _) = arrow::head_points(start, end, 2.0);
        // Vector from end back to the head vs. the reversed shaft
        let (vx, vy) = (h1.x - end.x, h1.y - end.y);
        let cos = (vx * 0.0 + vy * -1.0) / (vx.hypot(vy));
        assert!((cos.acos() - arrow::HEAD_ANGLE).abs() < 1e-4);
    }

    #[test]
    fn test_segments_share_the_tip() {
        let segs = arrow::segments(Point::new(50.0, 50.0), Point::new(150.0, 50.0), 3.0);
        assert_eq!(segs[0], (Point::new(50.0, 50.0), Point::new(150.0, 50.0)));
        assert_eq!(segs[1].0, Point::new(150.0, 50.0));
        assert_eq!(segs[2].0, Point::new(150.0, 50.0));
    }

    #[test]
    fn test_normalize_rect() {
        assert_eq!(normalize_rect(5.0, 1.0, 2.0, 8.0), (2.0, 1.0, 5.0, 8.0));
    }
}
