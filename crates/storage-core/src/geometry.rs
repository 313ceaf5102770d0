//! Plain 2-D geometry in projected metres: points, extents and polygons.
use serde::{Deserialize, Serialize};

/// A projected coordinate. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Closed-interval overlap test; touching edges count as intersecting.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Closed containment.
    pub fn contains(&self, p: Point) -> bool {
        self.min_x <= p.x && p.x <= self.max_x && self.min_y <= p.y && p.y <= self.max_y
    }

    /// Bounding box of `points`; `None` for an empty slice.
    pub fn of_points(points: &[Point]) -> Option<Extent> {
        let first = points.first()?;
        let mut e = Extent { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
        for p in &points[1..] {
            e.min_x = e.min_x.min(p.x);
            e.min_y = e.min_y.min(p.y);
            e.max_x = e.max_x.max(p.x);
            e.max_y = e.max_y.max(p.y);
        }
        Some(e)
    }
}

/// Polygon with one exterior ring and optional holes. Rings may be given
/// open or closed (first point repeated at the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Point>) -> Self {
        Self { exterior, holes: Vec::new() }
    }

    /// Axis-aligned rectangle, counter-clockwise, closed.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(vec![
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
            Point::new(min_x, min_y),
        ])
    }

    pub fn extent(&self) -> Option<Extent> {
        Extent::of_points(&self.exterior)
    }

    /// Even-odd containment over the exterior and every hole.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = ring_contains(&self.exterior, p);
        for hole in &self.holes {
            if ring_contains(hole, p) {
                inside = !inside;
            }
        }
        inside
    }

    /// Closed intersection test against the rectangle `e`: true when the
    /// polygon and the rectangle share at least one point.
    pub fn intersects_extent(&self, e: &Extent) -> bool {
        match self.extent() {
            Some(bbox) if bbox.intersects(e) => {}
            _ => return false,
        }
        let rings = || std::iter::once(&self.exterior).chain(self.holes.iter());
        if rings().flatten().any(|&p| e.contains(p)) {
            return true;
        }
        let corners = [
            Point::new(e.min_x, e.min_y),
            Point::new(e.max_x, e.min_y),
            Point::new(e.max_x, e.max_y),
            Point::new(e.min_x, e.max_y),
        ];
        if corners.iter().any(|&c| self.contains(c)) {
            return true;
        }
        rings().any(|ring| {
            let n = ring.len();
            (0..n).any(|i| {
                let (a, b) = (ring[(i + n - 1) % n], ring[i]);
                (0..4).any(|k| segments_intersect(a, b, corners[k], corners[(k + 1) % 4]))
            })
        })
    }

    /// Planar area: exterior minus holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| ring_signed_area(h).abs()).sum();
        ring_signed_area(&self.exterior).abs() - holes
    }
}

/// Ray-casting parity of `p` against one ring.
fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Closed segment intersection, collinear overlap included.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let on_segment = |p: Point, q: Point, r: Point| {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    let (d1, d2) = (orient(c, d, a), orient(c, d, b));
    let (d3, d4) = (orient(a, b, c), orient(a, b, d));
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }
    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

pub(crate) fn ring_contains(ring: &[Point], p: Point) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shoelace formula; positive for counter-clockwise rings.
pub(crate) fn ring_signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_contains_interior_only() {
        let r = Polygon::rectangle(0.0, 0.0, 10.0, 5.0);
        assert!(r.contains(Point::new(5.0, 2.5)));
        assert!(!r.contains(Point::new(-1.0, 2.5)));
        assert!(!r.contains(Point::new(5.0, 6.0)));
        assert!((r.area() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn hole_is_excluded() {
        let mut r = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        r.holes.push(Polygon::rectangle(4.0, 4.0, 6.0, 6.0).exterior);
        assert!(!r.contains(Point::new(5.0, 5.0)));
        assert!(r.contains(Point::new(1.0, 1.0)));
        assert!((r.area() - 96.0).abs() < 1e-12);
    }

    #[test]
    fn extents_touching_edges_intersect() {
        let a = Polygon::rectangle(0.0, 0.0, 1.0, 1.0).extent().unwrap();
        let b = Polygon::rectangle(1.0, 0.0, 2.0, 1.0).extent().unwrap();
        let c = Polygon::rectangle(3.0, 3.0, 4.0, 4.0).extent().unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn l_shape_outside_rectangle_does_not_intersect() {
        let rect = Extent { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
        // Wraps the top-right corner without touching it; bounding boxes overlap.
        let l = Polygon::new(vec![
            Point::new(5.0, 11.0),
            Point::new(11.0, 11.0),
            Point::new(11.0, 5.0),
            Point::new(15.0, 5.0),
            Point::new(15.0, 15.0),
            Point::new(5.0, 15.0),
        ]);
        assert!(l.extent().unwrap().intersects(&rect));
        assert!(!l.intersects_extent(&rect));

        let crossing = Polygon::new(vec![Point::new(-5.0, 4.0), Point::new(15.0, 4.0), Point::new(15.0, 6.0), Point::new(-5.0, 6.0)]);
        assert!(crossing.intersects_extent(&rect));
        let enclosing = Polygon::rectangle(-1.0, -1.0, 11.0, 11.0);
        assert!(enclosing.intersects_extent(&rect));
        let inside = Polygon::rectangle(2.0, 2.0, 3.0, 3.0);
        assert!(inside.intersects_extent(&rect));
    }

    #[test]
    fn rectangle_inside_hole_does_not_intersect() {
        let mut donut = Polygon::rectangle(-10.0, -10.0, 20.0, 20.0);
        donut.holes.push(vec![
            Point::new(-5.0, -5.0),
            Point::new(-5.0, 15.0),
            Point::new(15.0, 15.0),
            Point::new(15.0, -5.0),
            Point::new(-5.0, -5.0),
        ]);
        let rect = Extent { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
        assert!(!donut.intersects_extent(&rect));
    }

    #[test]
    fn polygon_json_uses_coordinate_pairs() {
        let json = r#"{"exterior": [[0, 0], [2, 0], [2, 2], [0, 2]]}"#;
        let p: Polygon = serde_json::from_str(json).unwrap();
        assert_eq!(p.exterior[1], Point::new(2.0, 0.0));
        assert!(p.holes.is_empty());
        assert!((p.area() - 4.0).abs() < 1e-12);
    }
}
