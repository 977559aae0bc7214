use geo::{Area, BoundingRect, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LawError, Result};
use crate::geometry::{shape_of, Shape};

/// Kind of structure element, as stored in the element table.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A bay, culvert barrel or any opening water flows through.
    Opening,
    /// A bridge pier or pile.
    Pier,
}

impl ElementKind {
    pub fn code(&self) -> i64 {
        match self {
            ElementKind::Opening => 0,
            ElementKind::Pier => 1,
        }
    }
}

impl TryFrom<i64> for ElementKind {
    type Error = LawError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(ElementKind::Opening),
            1 => Ok(ElementKind::Pier),
            other => Err(LawError::InvalidGeometry(format!(
                "unknown element kind {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Opening => write!(f, "opening"),
            ElementKind::Pier => write!(f, "pier"),
        }
    }
}

/// One opening or pier of a structure, with its derived extents.
#[derive(Debug, Clone)]
pub struct StructureElement {
    pub index: i64,
    pub kind: ElementKind,
    pub shape: Shape,
    /// Invert (lowest elevation).
    pub z_min: f64,
    /// Top (highest elevation).
    pub z_max: f64,
    pub width: f64,
    pub area: f64,
}

impl StructureElement {
    pub fn new(index: i64, kind: ElementKind, polygon: Polygon<f64>) -> Result<Self> {
        let rect = polygon.bounding_rect().ok_or_else(|| {
            LawError::InvalidGeometry(format!("{} {} has no vertices", kind, index))
        })?;
        let area = polygon.unsigned_area();
        Ok(Self {
            index,
            kind,
            z_min: rect.min().y,
            z_max: rect.max().y,
            width: rect.width(),
            area,
            shape: shape_of(polygon),
        })
    }

    /// Height between invert and top.
    pub fn opening_height(&self) -> f64 {
        self.z_max - self.z_min
    }
}

/// Lowest top among `elements`, the level where the first opening is drowned.
pub fn lowest_top(elements: &[StructureElement]) -> Option<f64> {
    elements.iter().map(|e| e.z_max).reduce(f64::min)
}

/// Lowest invert among `elements`.
pub fn lowest_invert(elements: &[StructureElement]) -> Option<f64> {
    elements.iter().map(|e| e.z_min).reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_from_ring;

    fn opening(index: i64, x0: f64, x1: f64, top: f64) -> StructureElement {
        let polygon = polygon_from_ring(&[(x0, 0.5), (x1, 0.5), (x1, top), (x0, top)]).unwrap();
        StructureElement::new(index, ElementKind::Opening, polygon).unwrap()
    }

    #[test]
    fn derived_extents() {
        let e = opening(1, 12.0, 24.0, 5.0);
        assert_eq!(e.z_min, 0.5);
        assert_eq!(e.z_max, 5.0);
        assert_eq!(e.width, 12.0);
        assert!((e.area - 54.0).abs() < 1e-9);
        assert!((e.opening_height() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn lowest_top_and_invert() {
        let elements = vec![opening(1, 0.0, 2.0, 5.0), opening(2, 3.0, 4.0, 4.0)];
        assert_eq!(lowest_top(&elements), Some(4.0));
        assert_eq!(lowest_invert(&elements), Some(0.5));
        assert_eq!(lowest_top(&[]), None);
    }

    #[test]
    fn kind_codes() {
        assert_eq!(ElementKind::try_from(0).unwrap(), ElementKind::Opening);
        assert_eq!(ElementKind::try_from(1).unwrap(), ElementKind::Pier);
        assert!(ElementKind::try_from(2).is_err());
        assert_eq!(ElementKind::Pier.code(), 1);
    }
}
