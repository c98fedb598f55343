use lyon::extra::parser::{ParserOptions, PathParser, Source};
use lyon::math::Point as LyonPoint;
use lyon::path::iterator::PathIterator;
use lyon::path::{Event, Path};

use super::markup::{self, Tag};
use super::types::{Point, Polyline, PolylineSet};
use super::GeometryError;

/// Converts SVG documents into polylines and fits polylines to the drawable area.
///
/// Both operations are pure: the same input always yields the same output.
pub trait GeometryEngine: Send + Sync {
    fn svg_to_polylines(&self, svg: &str) -> Result<PolylineSet, GeometryError>;

    fn scale_to_dimension(
        &self,
        polylines: &PolylineSet,
        width: f64,
        height: f64,
        preserve_aspect: bool,
    ) -> PolylineSet;
}

/// Geometry engine that flattens SVG path data with lyon.
#[derive(Debug, Clone)]
pub struct LyonGeometryEngine {
    tolerance: f32,
}

impl LyonGeometryEngine {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    fn flatten_path(&self, data: &str, out: &mut PolylineSet) -> Result<(), GeometryError> {
        let mut source = Source::new(data.chars());
        let mut parser = PathParser::new();
        let mut builder = Path::builder();
        parser
            .parse(&ParserOptions::DEFAULT, &mut source, &mut builder)
            .map_err(|e| GeometryError::InvalidPath(format!("{:?}", e)))?;
        let path = builder.build();

        let mut current: Vec<Point> = Vec::new();
        for event in path.iter().flattened(self.tolerance) {
            match event {
                Event::Begin { at } => {
                    current.clear();
                    current.push(to_point(at));
                }
                Event::Line { to, .. } => current.push(to_point(to)),
                Event::End { first, close, .. } => {
                    if close {
                        current.push(to_point(first));
                    }
                    if let Some(line) = Polyline::new(std::mem::take(&mut current)) {
                        out.push(line);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn element_polyline(tag: &Tag<'_>) -> Result<Option<Polyline>, GeometryError> {
        match tag.name {
            "polyline" | "polygon" => {
                let Some(raw) = tag.attribute("points") else {
                    return Ok(None);
                };
                let mut points = parse_points(&raw)?;
                if tag.name == "polygon"
                    && let Some(first) = points.first().copied()
                {
                    points.push(first);
                }
                Ok(Polyline::new(points))
            }
            "line" => {
                let coord = |name: &str| -> Result<f64, GeometryError> {
                    let raw = tag.attribute(name).unwrap_or_else(|| "0".to_string());
                    parse_coordinate(raw.trim()).ok_or_else(|| {
                        GeometryError::InvalidPoints(format!("bad {} on <line>", name))
                    })
                };
                Ok(Polyline::new(vec![
                    Point::new(coord("x1")?, coord("y1")?),
                    Point::new(coord("x2")?, coord("y2")?),
                ]))
            }
            _ => Ok(None),
        }
    }
}

impl Default for LyonGeometryEngine {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl GeometryEngine for LyonGeometryEngine {
    fn svg_to_polylines(&self, svg: &str) -> Result<PolylineSet, GeometryError> {
        if markup::find_tags(svg, &["svg"]).is_empty() {
            return Err(GeometryError::NotSvg);
        }

        let mut polylines = PolylineSet::new();
        for tag in markup::find_tags(svg, &["path", "polyline", "polygon", "line"]) {
            if tag.name == "path" {
                if let Some(data) = tag.attribute("d") {
                    self.flatten_path(&data, &mut polylines)?;
                }
            } else if let Some(line) = Self::element_polyline(&tag)? {
                polylines.push(line);
            }
        }

        log::debug!(
            "Converted SVG into {} polylines ({} points)",
            polylines.len(),
            polylines.point_count()
        );
        Ok(polylines)
    }

    fn scale_to_dimension(
        &self,
        polylines: &PolylineSet,
        width: f64,
        height: f64,
        preserve_aspect: bool,
    ) -> PolylineSet {
        let Some(bounds) = polylines.bounds() else {
            return polylines.clone();
        };

        let fit = |extent: f64, target: f64| (extent > f64::EPSILON).then(|| target / extent);
        let (sx, sy) = match (fit(bounds.width(), width), fit(bounds.height(), height)) {
            (Some(sx), Some(sy)) if preserve_aspect => (sx.min(sy), sx.min(sy)),
            (Some(sx), Some(sy)) => (sx, sy),
            (Some(s), None) | (None, Some(s)) => (s, s),
            (None, None) => (1.0, 1.0),
        };

        let min = bounds.min;
        polylines
            .iter()
            .map(|line| line.map(|p| Point::new((p.x - min.x) * sx, (p.y - min.y) * sy)))
            .collect()
    }
}

fn to_point(point: LyonPoint) -> Point {
    Point::new(point.x as f64, point.y as f64)
}

/// Accepts finite numbers only; `NaN` and `inf` parse as `f64` but cannot be plotted.
fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_points(raw: &str) -> Result<Vec<Point>, GeometryError> {
    let values = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            parse_coordinate(part)
                .ok_or_else(|| GeometryError::InvalidPoints(format!("'{}' is not a number", part)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() % 2 != 0 {
        return Err(GeometryError::InvalidPoints(
            "odd number of coordinates".to_string(),
        ));
    }

    Ok(values
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}
