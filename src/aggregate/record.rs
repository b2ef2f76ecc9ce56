use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{aggregate::ReductionRules, attribution::Audit};

/// A reduced field value. `NoData` is distinct from any number, including 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Reduced {
    NoData,
    Scalar { value: f64 },
    /// Direction in [0, 360) degrees clockwise from north.
    Angle { degrees: f64 },
    /// Mean vector (east, north components), its length, and its bearing if it has one.
    Vector { u: f64, v: f64, speed: f64, direction: Option<f64> },
}

impl Reduced {
    /// Representative number for display and masking: the scalar, the angle,
    /// or the vector's speed.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::NoData => None,
            Self::Scalar { value } => Some(*value),
            Self::Angle { degrees } => Some(*degrees),
            Self::Vector { speed, .. } => Some(*speed),
        }
    }

    #[inline] pub fn is_no_data(&self) -> bool { matches!(self, Self::NoData) }
}

/// One field of one region's record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldAggregate {
    pub field: Arc<str>,
    pub value: Reduced,
    /// Observations that contributed a present value.
    pub count: usize,
    /// Set when the field has a threshold band and a value; the value itself is left intact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_range: Option<bool>,
}

/// Aggregated statistics for one region.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionRecord {
    pub region: Arc<str>,
    pub idx: usize,
    /// Size of the region's bucket, whether or not any field was present.
    pub observations: usize,
    pub fields: Vec<FieldAggregate>,
}

impl RegionRecord {
    /// Get the aggregate for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldAggregate> {
        self.fields.iter().find(|aggregate| aggregate.field.as_ref() == field)
    }

    /// Shortcut for the representative number of `field`.
    #[inline]
    pub fn value(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(|aggregate| aggregate.value.value())
    }
}

/// One record per region, in region input order, plus the attribution audit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Aggregation {
    #[serde(skip)]
    pub(super) rules: ReductionRules,
    pub(super) records: Vec<RegionRecord>,
    pub(super) audit: Audit,
    pub(super) latest: Option<NaiveDateTime>,
}

impl Aggregation {
    #[inline] pub fn records(&self) -> &[RegionRecord] { &self.records }

    #[inline] pub fn audit(&self) -> &Audit { &self.audit }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Latest observation time over the input, for legend labels.
    #[inline] pub fn latest_observation_time(&self) -> Option<NaiveDateTime> { self.latest }

    /// Get the record of a region by name.
    pub fn get(&self, region: &str) -> Option<&RegionRecord> {
        self.records.iter().find(|record| record.region.as_ref() == region)
    }

    /// Rules the records were reduced with; output fields follow their order.
    #[inline] pub fn rules(&self) -> &ReductionRules { &self.rules }
}
