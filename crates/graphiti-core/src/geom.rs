pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width, height)
}

/// Euclidean distance between two points.
pub fn distance(p: Point, q: Point) -> f64 {
    (q - p).length()
}

/// Length of the segment `head -> tail`. Zero for coincident endpoints.
pub fn segment_length(head: Point, tail: Point) -> f64 {
    distance(head, tail)
}

/// Linear interpolation between `head` (fraction 0) and `tail` (fraction 1).
pub fn point_along(head: Point, tail: Point, fraction: f64) -> Point {
    head.lerp(tail, fraction)
}

/// Unit vector pointing from `head` to `tail`.
///
/// Returns `None` when the segment is degenerate (zero or non-finite length), so callers never
/// divide by zero while normalizing.
pub fn direction(head: Point, tail: Point) -> Option<Vector> {
    let d = tail - head;
    let len = d.length();
    if !(len.is_finite() && len > 0.0) {
        return None;
    }
    Some(d / len)
}
