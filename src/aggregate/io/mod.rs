mod csv;
mod svg;

pub use svg::ChoroplethOptions;
