use std::sync::Arc;

use thiserror::Error;

use crate::geom::CoordinateFrame;

/// Errors raised while building a `GeometryIndex` from region sources.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("region '{region}' has an empty boundary")]
    EmptyBoundary { region: Arc<str> },

    #[error("region '{region}' has a non-finite coordinate")]
    NonFiniteCoordinate { region: Arc<str> },

    #[error("region '{region}' ring {ring} is self-intersecting")]
    SelfIntersecting { region: Arc<str>, ring: usize },

    #[error("region '{region}' appears more than once")]
    DuplicateRegion { region: Arc<str> },

    #[error("region '{region}' is tagged {found}, expected {expected}")]
    MixedFrames { region: Arc<str>, expected: CoordinateFrame, found: CoordinateFrame },
}

/// Per-observation failures collected during attribution. Never fatal to a batch.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AttributionError {
    #[error("station '{station}' is tagged {observation_frame}, regions are tagged {region_frame}")]
    CoordinateMismatch {
        station: Arc<str>,
        region_frame: CoordinateFrame,
        observation_frame: CoordinateFrame,
    },

    #[error("station '{station}' is malformed: {reason}")]
    MalformedObservation { station: Arc<str>, reason: MalformedReason },
}

/// Why an observation could not be placed on the map at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedReason {
    MissingLatitude,
    MissingLongitude,
    NonFiniteCoordinate,
    LatitudeOutOfRange,
    LongitudeOutOfRange,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::MissingLatitude => "missing latitude",
            Self::MissingLongitude => "missing longitude",
            Self::NonFiniteCoordinate => "non-finite coordinate",
            Self::LatitudeOutOfRange => "latitude outside [-90, 90]",
            Self::LongitudeOutOfRange => "longitude outside [-180, 180]",
        };
        f.write_str(text)
    }
}

/// Reduction configuration errors. Raised before any region is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown reduction kind '{kind}' for field '{field}'")]
    UnknownReductionKind { field: String, kind: String },

    #[error("reduction '{kind}' for field '{field}' requires '{parameter}'")]
    MissingParameter { field: String, kind: &'static str, parameter: &'static str },

    #[error("invalid threshold band [{low}, {high}] for field '{field}'")]
    InvalidBand { field: String, low: f64, high: f64 },

    #[error("threshold mask on field '{field}' has no reduction to attach to")]
    MaskWithoutReduction { field: String },

    #[error("field '{field}' has more than one reduction rule")]
    DuplicateRule { field: String },
}

/// A lookup was asked to compare a point against geometry in a different frame.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("frame {found} is incompatible with index frame {expected}")]
pub struct FrameMismatch {
    pub expected: CoordinateFrame,
    pub found: CoordinateFrame,
}
