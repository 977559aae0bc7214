//! Geometry adapter over cross-section and element polygons.
//!
//! Coordinates are (station, elevation): `x` is the horizontal station across
//! the river, `y` the elevation. Every clip returns a possibly-empty
//! [`Shape`]; an empty shape has zero area and no bounds.

use geo::{Area, BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};

use crate::error::{LawError, Result};

/// A wetted or clipped region, possibly made of several parts.
pub type Shape = MultiPolygon<f64>;

/// Margin added around a shape's bounds when building cutting rectangles.
const CUT_MARGIN: f64 = 1.0;

/// Vertical cut of a shape by one or two stations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalCut {
    /// Keep the part left of the station.
    Left(f64),
    /// Keep the part right of the station.
    Right(f64),
    /// Keep the part between the two stations.
    Between(f64, f64),
}

/// Axis-aligned extent of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_station: f64,
    pub min_elevation: f64,
    pub max_station: f64,
    pub max_elevation: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_station - self.min_station
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_station: rect.min().x,
            min_elevation: rect.min().y,
            max_station: rect.max().x,
            max_elevation: rect.max().y,
        }
    }
}

/// Polygon clipping and measurement used by every hydraulic method.
pub trait SectionGeometry {
    /// Part of `shape` lying below `elevation`.
    fn clip_horizontal(&self, shape: &Shape, elevation: f64) -> Shape;

    /// Part of `shape` selected by a vertical cut.
    fn clip_vertical(&self, shape: &Shape, cut: VerticalCut) -> Shape;

    /// Extent of `shape`, `None` when it is empty.
    fn bounds(&self, shape: &Shape) -> Option<Bounds>;

    /// Unsigned area of `shape`.
    fn area(&self, shape: &Shape) -> f64;

    /// Area of the part of `shape` lying below `elevation`.
    fn wet_area(&self, shape: &Shape, elevation: f64) -> f64 {
        self.area(&self.clip_horizontal(shape, elevation))
    }
}

/// [`SectionGeometry`] backed by the `geo` boolean operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoClipper;

impl GeoClipper {
    fn clip_to_rect(shape: &Shape, min: Coord<f64>, max: Coord<f64>) -> Shape {
        if min.x >= max.x || min.y >= max.y {
            return MultiPolygon::new(Vec::new());
        }
        let cutter = MultiPolygon::new(vec![Rect::new(min, max).to_polygon()]);
        shape.intersection(&cutter)
    }
}

impl SectionGeometry for GeoClipper {
    fn clip_horizontal(&self, shape: &Shape, elevation: f64) -> Shape {
        let Some(b) = self.bounds(shape) else {
            return MultiPolygon::new(Vec::new());
        };
        if elevation <= b.min_elevation {
            return MultiPolygon::new(Vec::new());
        }
        if elevation >= b.max_elevation {
            return shape.clone();
        }
        Self::clip_to_rect(
            shape,
            Coord {
                x: b.min_station - CUT_MARGIN,
                y: b.min_elevation - CUT_MARGIN,
            },
            Coord {
                x: b.max_station + CUT_MARGIN,
                y: elevation,
            },
        )
    }

    fn clip_vertical(&self, shape: &Shape, cut: VerticalCut) -> Shape {
        let Some(b) = self.bounds(shape) else {
            return MultiPolygon::new(Vec::new());
        };
        let (left, right) = match cut {
            VerticalCut::Left(x) => (b.min_station - CUT_MARGIN, x),
            VerticalCut::Right(x) => (x, b.max_station + CUT_MARGIN),
            VerticalCut::Between(a, c) => (a.min(c), a.max(c)),
        };
        Self::clip_to_rect(
            shape,
            Coord {
                x: left,
                y: b.min_elevation - CUT_MARGIN,
            },
            Coord {
                x: right,
                y: b.max_elevation + CUT_MARGIN,
            },
        )
    }

    fn bounds(&self, shape: &Shape) -> Option<Bounds> {
        if shape.0.is_empty() {
            return None;
        }
        shape.bounding_rect().map(Bounds::from)
    }

    fn area(&self, shape: &Shape) -> f64 {
        shape.unsigned_area()
    }
}

/// Wrap a single polygon as a [`Shape`].
pub fn shape_of(polygon: Polygon<f64>) -> Shape {
    MultiPolygon::new(vec![polygon])
}

/// Build a closed polygon from a ring of (station, elevation) vertices.
///
/// The ring does not need to repeat its first vertex.
pub fn polygon_from_ring(points: &[(f64, f64)]) -> Result<Polygon<f64>> {
    let coords = dedup_coords(points);
    if coords.len() < 3 {
        return Err(LawError::InvalidGeometry(format!(
            "a polygon needs at least 3 distinct vertices, got {}",
            coords.len()
        )));
    }
    Ok(Polygon::new(LineString::from(coords), vec![]))
}

/// Build a cross-section polygon from a surveyed profile.
///
/// The profile is an open polyline from left bank to right bank; it is
/// closed by a horizontal lid at the highest surveyed elevation.
pub fn polygon_from_profile(points: &[(f64, f64)]) -> Result<Polygon<f64>> {
    let mut coords = dedup_coords(points);
    if coords.len() < 2 {
        return Err(LawError::InvalidGeometry(format!(
            "a profile needs at least 2 distinct points, got {}",
            coords.len()
        )));
    }
    let top = coords
        .iter()
        .map(|c| c.y)
        .fold(f64::NEG_INFINITY, f64::max);

    let (first, last) = (coords[0], coords[coords.len() - 1]);
    if last.y < top {
        coords.push(Coord { x: last.x, y: top });
    }
    if first.y < top {
        coords.push(Coord { x: first.x, y: top });
    }
    if coords.len() < 3 {
        return Err(LawError::InvalidGeometry(
            "profile encloses no area".to_string(),
        ));
    }
    Ok(Polygon::new(LineString::from(coords), vec![]))
}

fn dedup_coords(points: &[(f64, f64)]) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(points.len());
    for &(x, y) in points {
        let c = Coord { x, y };
        if coords.last() != Some(&c) {
            coords.push(c);
        }
    }
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}
