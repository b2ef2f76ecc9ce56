use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    error::AttributionError,
    geom::{GeometryIndex, Region},
    observation::Observation,
};

/// Outcome of placing one observation.
#[derive(Debug, Clone, PartialEq)]
enum Placement {
    Region(usize),
    Unattributed,
    Rejected(AttributionError),
}

/// An observation that was kept out of every bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Position of the observation in the input slice.
    pub position: usize,
    pub station: Arc<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AttributionError>,
}

/// Observations dropped from attribution, by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Audit {
    /// Valid point, but no region contains it.
    pub unattributed: Vec<AuditEntry>,
    /// Missing or invalid coordinates.
    pub malformed: Vec<AuditEntry>,
    /// Observation frame incompatible with the region frame.
    pub mismatched: Vec<AuditEntry>,
}

impl Audit {
    /// Total number of observations kept out of aggregation.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.unattributed.len() + self.malformed.len() + self.mismatched.len()
    }

    #[inline] pub fn is_clean(&self) -> bool { self.dropped() == 0 }
}

/// Left-outer join of regions to the observations they contain.
///
/// Every region owns a (possibly empty) bucket. Buckets hold observations in
/// input order.
#[derive(Debug, Clone)]
pub struct Attribution<'a> {
    index: &'a GeometryIndex,
    observations: &'a [Observation],
    buckets: Vec<Vec<usize>>,
    audit: Audit,
}

impl<'a> Attribution<'a> {
    /// Attribute each observation to the region containing it.
    pub fn join(index: &'a GeometryIndex, observations: &'a [Observation]) -> Self {
        let placements = place_all(index, observations);

        let mut buckets = vec![Vec::new(); index.len()];
        let mut audit = Audit::default();

        for (position, placement) in placements.into_iter().enumerate() {
            let station = observations[position].station().clone();
            match placement {
                Placement::Region(idx) => buckets[idx].push(position),
                Placement::Unattributed => {
                    audit.unattributed.push(AuditEntry { position, station, error: None })
                }
                Placement::Rejected(error @ AttributionError::MalformedObservation { .. }) => {
                    audit.malformed.push(AuditEntry { position, station, error: Some(error) })
                }
                Placement::Rejected(error @ AttributionError::CoordinateMismatch { .. }) => {
                    audit.mismatched.push(AuditEntry { position, station, error: Some(error) })
                }
            }
        }

        if !audit.malformed.is_empty() || !audit.mismatched.is_empty() {
            log::warn!(
                "[attribution] rejected {} malformed and {} frame-mismatched observations",
                audit.malformed.len(),
                audit.mismatched.len(),
            );
        }
        log::info!(
            "[attribution] {} observations: {} attributed, {} unattributed",
            observations.len(),
            observations.len() - audit.dropped(),
            audit.unattributed.len(),
        );

        Self { index, observations, buckets, audit }
    }

    #[inline] pub fn index(&self) -> &'a GeometryIndex { self.index }

    #[inline] pub fn observations(&self) -> &'a [Observation] { self.observations }

    #[inline] pub fn audit(&self) -> &Audit { &self.audit }

    /// Number of regions (one bucket each).
    #[inline] pub fn len(&self) -> usize { self.buckets.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.buckets.is_empty() }

    /// Observations attributed to region `idx`, in input order.
    pub fn bucket(&self, idx: usize) -> impl Iterator<Item = &'a Observation> + '_ {
        let observations = self.observations;
        self.buckets.get(idx)
            .into_iter()
            .flatten()
            .map(move |&position| &observations[position])
    }

    /// Input positions of the observations attributed to region `idx`.
    #[inline]
    pub fn bucket_positions(&self, idx: usize) -> &[usize] {
        self.buckets.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate regions with their buckets, in region input order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Region, Vec<&'a Observation>)> + '_ {
        self.index.regions().iter()
            .map(|region| (region, self.bucket(region.idx()).collect()))
    }

    /// Region owning the observation at input `position`, if any.
    pub fn region_of(&self, position: usize) -> Option<&'a Region> {
        self.buckets.iter()
            .position(|bucket| bucket.binary_search(&position).is_ok())
            .and_then(|idx| self.index.region(idx))
    }

    /// Latest observation time over the whole input, used for legend timestamps.
    pub fn latest_observation_time(&self) -> Option<NaiveDateTime> {
        self.observations.iter().filter_map(Observation::time).max()
    }
}

/// Locate a single observation against the index.
fn place(index: &GeometryIndex, observation: &Observation) -> Placement {
    let point = match observation.point() {
        Ok(point) => point,
        Err(reason) => return Placement::Rejected(AttributionError::MalformedObservation {
            station: observation.station().clone(),
            reason,
        }),
    };

    match index.locate_in(point, observation.frame()) {
        Ok(Some(region)) => Placement::Region(region.idx()),
        Ok(None) => Placement::Unattributed,
        Err(mismatch) => Placement::Rejected(AttributionError::CoordinateMismatch {
            station: observation.station().clone(),
            region_frame: mismatch.expected,
            observation_frame: mismatch.found,
        }),
    }
}

#[cfg(not(feature = "parallel"))]
fn place_all(index: &GeometryIndex, observations: &[Observation]) -> Vec<Placement> {
    observations.iter().map(|observation| place(index, observation)).collect()
}

#[cfg(feature = "parallel")]
fn place_all(index: &GeometryIndex, observations: &[Observation]) -> Vec<Placement> {
    use rayon::prelude::*;
    // Indexed collect keeps input order regardless of scheduling.
    observations.par_iter().map(|observation| place(index, observation)).collect()
}
