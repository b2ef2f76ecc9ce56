//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - CSV export of aggregated records
//! - `svg` - SVG choropleth export
//! - `geojson` - region boundaries
//! - `cwb` - station observations from the Central Weather Bureau feed

pub(crate) mod csv;
pub(crate) mod svg;
mod cwb;
mod geojson;

pub use cwb::read_cwb_observations;
pub use geojson::read_regions_geojson;
pub use svg::{ColorRamp, Rgb};
