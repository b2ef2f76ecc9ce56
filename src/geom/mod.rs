mod bbox;
mod frame;
mod index;
mod proj;
mod region;
mod validate;

pub use frame::CoordinateFrame;
pub use index::{GeometryIndex, IndexOptions};
pub use proj::reproject;
pub use region::{Region, RegionSource};
