//! Point and polyline types shared by the geometry engine and the draw sequencer.

use serde::{Deserialize, Serialize};

/// A 2D coordinate in device millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

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
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// An ordered, non-empty chain of points drawn with the pen down.
///
/// A single-point polyline is a dot: the pen still touches down and lifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Returns `None` when `points` is empty.
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self(points))
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn first(&self) -> Point {
        self.0[0]
    }

    pub fn last(&self) -> Point {
        self.0[self.0.len() - 1]
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Applies `f` to every point, keeping order.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        Self(self.0.iter().copied().map(f).collect())
    }
}

impl TryFrom<Vec<Point>> for Polyline {
    type Error = &'static str;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Polyline::new(points).ok_or("polyline must contain at least one point")
    }
}

impl From<Polyline> for Vec<Point> {
    fn from(polyline: Polyline) -> Self {
        polyline.0
    }
}

/// Axis-aligned bounds of a polyline set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Ordered collection of polylines. Order is the draw order and is never changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolylineSet(Vec<Polyline>);

impl PolylineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, polyline: Polyline) {
        self.0.push(polyline);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polyline> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of points across all polylines.
    pub fn point_count(&self) -> usize {
        self.0.iter().map(Polyline::len).sum()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.0.iter().flat_map(|line| line.points().iter());
        let first = *points.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for point in points {
            bounds.min.x = bounds.min.x.min(point.x);
            bounds.min.y = bounds.min.y.min(point.y);
            bounds.max.x = bounds.max.x.max(point.x);
            bounds.max.y = bounds.max.y.max(point.y);
        }
        Some(bounds)
    }
}

impl FromIterator<Polyline> for PolylineSet {
    fn from_iter<I: IntoIterator<Item = Polyline>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PolylineSet {
    type Item = &'a Polyline;
    type IntoIter = std::slice::Iter<'a, Polyline>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
