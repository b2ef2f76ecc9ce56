#![doc = "Spatial attribution and per-region aggregation of weather station observations"]
mod aggregate;
mod attribution;
mod error;
mod geom;
mod io;
mod observation;
mod pipeline;

#[doc(inline)]
pub use aggregate::{
    Aggregation, Band, ChoroplethOptions, FieldAggregate, Reduced, ReductionKind, ReductionRules,
    RegionAggregator, RegionRecord, Rule, RuleConfig, RulesConfig,
};

#[doc(inline)]
pub use attribution::{Attribution, Audit, AuditEntry};

#[doc(inline)]
pub use error::{AttributionError, ConfigError, FrameMismatch, GeometryError, MalformedReason};

#[doc(inline)]
pub use geom::{reproject, CoordinateFrame, GeometryIndex, IndexOptions, Region, RegionSource};

#[doc(inline)]
pub use io::{read_cwb_observations, read_regions_geojson, ColorRamp, Rgb};

#[doc(inline)]
pub use observation::{Fields, Observation};

#[doc(inline)]
pub use pipeline::Pipeline;
