//! SVG format writing operations for choropleth export.

mod color;
mod draw;
mod writer;

pub use color::{ColorRamp, Rgb};
pub(crate) use color::{MASKED, NO_DATA};
pub(crate) use draw::*;
pub(crate) use writer::*;
