use std::sync::Arc;

use ahash::AHashMap;
use geo::{BoundingRect, Coord, Point, Rect};
use rstar::{RTree, AABB};

use crate::{
    error::{FrameMismatch, GeometryError},
    geom::{bbox::BoundingBox, validate, CoordinateFrame, Region, RegionSource},
};

/// Build-time options for a `GeometryIndex`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Reject self-intersecting boundaries instead of flagging them.
    pub strict: bool,
}

/// GeometryIndex holds the region partition and answers point lookups.
///
/// Lookups go through an R-tree of region bounding boxes, but always resolve
/// to the lowest input index among the containing regions, so the answer is
/// the same as a full linear scan.
#[derive(Debug, Clone)]
pub struct GeometryIndex {
    regions: Vec<Region>,
    rtree: RTree<BoundingBox>,
    names: AHashMap<Arc<str>, usize>,
    frame: CoordinateFrame,
}

impl GeometryIndex {
    /// Construct a GeometryIndex from an ordered sequence of region sources.
    pub fn new(sources: impl IntoIterator<Item = RegionSource>) -> Result<Self, GeometryError> {
        Self::with_options(sources, IndexOptions::default())
    }

    /// Construct a GeometryIndex with explicit validation options.
    pub fn with_options(
        sources: impl IntoIterator<Item = RegionSource>,
        options: IndexOptions,
    ) -> Result<Self, GeometryError> {
        let mut regions = Vec::new();
        let mut names = AHashMap::new();
        let mut frame = CoordinateFrame::Untagged;
        let mut boxes = Vec::new();

        for (idx, source) in sources.into_iter().enumerate() {
            let name: Arc<str> = Arc::from(source.name);

            if !frame.is_compatible(&source.frame) {
                return Err(GeometryError::MixedFrames { region: name, expected: frame, found: source.frame })
            }
            if frame == CoordinateFrame::Untagged { frame = source.frame }

            validate::check_boundary(&name, &source.boundary)?;

            let issue = validate::find_self_intersection(&source.boundary)
                .map(|ring| GeometryError::SelfIntersecting { region: name.clone(), ring });
            if let Some(issue) = issue.clone() {
                if options.strict { return Err(issue) }
                log::warn!("[geom::index] accepting flagged boundary: {issue}");
            }

            if names.insert(name.clone(), idx).is_some() {
                return Err(GeometryError::DuplicateRegion { region: name })
            }

            let bbox = source.boundary.bounding_rect()
                .ok_or_else(|| GeometryError::EmptyBoundary { region: name.clone() })?;
            boxes.push(BoundingBox::new(idx, bbox));

            regions.push(Region {
                idx,
                name,
                boundary: source.boundary,
                attributes: source.attributes,
                issue,
            });
        }

        log::debug!("[geom::index] indexed {} regions in frame {}", regions.len(), frame);

        Ok(Self { regions, rtree: RTree::bulk_load(boxes), names, frame })
    }

    /// Get the number of regions.
    #[inline] pub fn len(&self) -> usize { self.regions.len() }

    /// Check if there are no regions.
    #[inline] pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    /// Get the regions in input order.
    #[inline] pub fn regions(&self) -> &[Region] { &self.regions }

    /// Get a region by input index.
    #[inline] pub fn region(&self, idx: usize) -> Option<&Region> { self.regions.get(idx) }

    /// Get a region by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.names.get(name).map(|&idx| &self.regions[idx])
    }

    /// Get the frame shared by all regions (`Untagged` if none was tagged).
    #[inline] pub fn frame(&self) -> CoordinateFrame { self.frame }

    /// Regions accepted with a validation flag.
    pub fn flagged(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|region| region.issue.is_some())
    }

    /// Find the region containing `point`, boundary inclusive.
    /// Overlaps resolve to the lowest input index.
    pub fn locate(&self, point: Point<f64>) -> Option<&Region> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|bb| bb.idx())
            .filter(|&idx| self.regions[idx].contains(&point))
            .min()
            .map(|idx| &self.regions[idx])
    }

    /// Same as `locate`, but first checks the point's frame against the index frame.
    pub fn locate_in(&self, point: Point<f64>, frame: CoordinateFrame) -> Result<Option<&Region>, FrameMismatch> {
        if !self.frame.is_compatible(&frame) {
            return Err(FrameMismatch { expected: self.frame, found: frame })
        }
        Ok(self.locate(point))
    }

    /// Reference lookup by scanning every region in order.
    pub fn locate_linear(&self, point: Point<f64>) -> Option<&Region> {
        self.regions.iter().find(|region| region.contains(&point))
    }

    /// Compute the bounding rectangle of all regions.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.regions.iter()
            .filter_map(|region| region.boundary.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }
}
