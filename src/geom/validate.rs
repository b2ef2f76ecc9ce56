use std::sync::Arc;

use geo::{Area, BoundingRect, Line, LineString, MultiPolygon};
use geo::line_intersection::{line_intersection, LineIntersection};
use rstar::{RTree, AABB};

use crate::{error::GeometryError, geom::bbox::BoundingBox};

/// Reject boundaries that cannot be indexed at all: empty, zero-area, or non-finite.
pub(super) fn check_boundary(name: &Arc<str>, boundary: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    let finite = boundary.0.iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .flat_map(|ring| ring.coords())
        .all(|coord| coord.x.is_finite() && coord.y.is_finite());
    if !finite {
        return Err(GeometryError::NonFiniteCoordinate { region: name.clone() })
    }

    if boundary.bounding_rect().is_none() || boundary.unsigned_area() == 0.0 {
        return Err(GeometryError::EmptyBoundary { region: name.clone() })
    }

    Ok(())
}

/// Find the first self-intersecting ring, numbering rings across the whole
/// MultiPolygon (each exterior followed by its holes).
pub(super) fn find_self_intersection(boundary: &MultiPolygon<f64>) -> Option<usize> {
    boundary.0.iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .position(ring_self_intersects)
}

/// Check a closed ring for crossing or overlapping segments.
/// Rings that merely touch themselves at a vertex are accepted.
fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    let segments: Vec<Line<f64>> = ring.lines()
        .filter(|line| line.start != line.end)
        .collect();
    let n = segments.len();
    if n < 3 { return false }

    let rtree = RTree::bulk_load(segments.iter().enumerate()
        .map(|(i, segment)| BoundingBox::new(i, segment.bounding_rect()))
        .collect());

    for (i, segment) in segments.iter().enumerate() {
        let rect = segment.bounding_rect();
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());

        for cand in rtree.locate_in_envelope_intersecting(&envelope) {
            let j = cand.idx();
            if j <= i { continue } // check each unordered pair once

            match line_intersection(*segment, segments[j]) {
                Some(LineIntersection::SinglePoint { is_proper: true, .. }) => return true,
                Some(LineIntersection::Collinear { .. }) => return true,
                _ => {}
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use super::*;

    #[test]
    fn square_is_simple() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        assert_eq!(find_self_intersection(&MultiPolygon(vec![square])), None);
    }

    #[test]
    fn bowtie_is_detected() {
        let bowtie = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        assert_eq!(find_self_intersection(&MultiPolygon(vec![bowtie])), Some(0));
    }

    #[test]
    fn crossing_hole_is_numbered_after_exterior() {
        let with_bad_hole = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 4.0, y: 4.0), (x: 4.0, y: 2.0), (x: 2.0, y: 4.0)]]
        );
        assert_eq!(find_self_intersection(&MultiPolygon(vec![with_bad_hole])), Some(1));
    }

    #[test]
    fn empty_and_degenerate_boundaries_are_rejected() {
        let name: Arc<str> = Arc::from("empty");
        assert!(matches!(
            check_boundary(&name, &MultiPolygon(vec![])),
            Err(GeometryError::EmptyBoundary { .. }),
        ));

        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)];
        assert!(matches!(
            check_boundary(&name, &MultiPolygon(vec![flat])),
            Err(GeometryError::EmptyBoundary { .. }),
        ));

        let nan = polygon![(x: 0.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0)];
        assert!(matches!(
            check_boundary(&name, &MultiPolygon(vec![nan])),
            Err(GeometryError::NonFiniteCoordinate { .. }),
        ));
    }
}
