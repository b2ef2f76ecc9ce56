use std::sync::Arc;

use geo::{MultiPolygon, Point};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use serde_json::{Map, Value};

use crate::{error::GeometryError, geom::CoordinateFrame};

/// One region as handed over by a loader, before indexing.
#[derive(Debug, Clone)]
pub struct RegionSource {
    pub name: String,
    pub boundary: MultiPolygon<f64>,
    pub frame: CoordinateFrame,
    pub attributes: Map<String, Value>,
}

impl RegionSource {
    pub fn new(name: impl Into<String>, boundary: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            boundary,
            frame: CoordinateFrame::Untagged,
            attributes: Map::new(),
        }
    }

    pub fn with_frame(mut self, frame: CoordinateFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// A named polygon in the administrative partition. Immutable once indexed.
#[derive(Debug, Clone)]
pub struct Region {
    pub(super) idx: usize,
    pub(super) name: Arc<str>,
    pub(super) boundary: MultiPolygon<f64>,
    pub(super) attributes: Map<String, Value>,
    pub(super) issue: Option<GeometryError>,
}

impl Region {
    /// Position of the region in input order.
    #[inline] pub fn idx(&self) -> usize { self.idx }

    #[inline] pub fn name(&self) -> &Arc<str> { &self.name }

    #[inline] pub fn boundary(&self) -> &MultiPolygon<f64> { &self.boundary }

    #[inline] pub fn attributes(&self) -> &Map<String, Value> { &self.attributes }

    /// Validation problem found at build time, if the boundary was accepted with a flag.
    #[inline] pub fn issue(&self) -> Option<&GeometryError> { self.issue.as_ref() }

    /// Inclusive containment: points on the boundary count as inside.
    #[inline]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.boundary.coordinate_position(&point.0) != CoordPos::Outside
    }
}
