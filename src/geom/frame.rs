use std::fmt;

use serde::{Deserialize, Serialize};

/// Coordinate reference frame tag carried by regions and observations.
///
/// `Untagged` is compatible with every frame; two `Epsg` tags are compatible
/// only when the codes are equal. The crate never reprojects implicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateFrame {
    #[default]
    Untagged,
    Epsg(u32),
}

impl CoordinateFrame {
    /// WGS84 lon/lat, the frame of the station feeds.
    pub const WGS84: Self = Self::Epsg(4326);

    /// Check whether points in `other` can be compared against geometry in `self`.
    #[inline]
    pub fn is_compatible(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Epsg(a), Self::Epsg(b)) => a == b,
            _ => true,
        }
    }

    /// Whether coordinates in this frame are degrees of longitude and latitude.
    /// Untagged points are assumed to come straight from a station feed.
    #[inline]
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::Untagged | Self::Epsg(4326 | 4269))
    }

    /// Get the EPSG code, if tagged.
    #[inline]
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Self::Epsg(code) => Some(*code),
            Self::Untagged => None,
        }
    }

    /// Parse a CRS identifier as found in GeoJSON `crs` members.
    /// Accepts `EPSG:3826`, `urn:ogc:def:crs:EPSG::3826` and the OGC CRS84 alias.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.ends_with("CRS84") { return Some(Self::WGS84) }

        let code = name.rsplit(':').next()?;
        if !name.to_ascii_uppercase().contains("EPSG") { return None }
        code.parse().ok().map(Self::Epsg)
    }
}

impl fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epsg(code) => write!(f, "EPSG:{code}"),
            Self::Untagged => write!(f, "untagged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoordinateFrame;

    #[test]
    fn untagged_is_compatible_with_anything() {
        assert!(CoordinateFrame::Untagged.is_compatible(&CoordinateFrame::Epsg(3826)));
        assert!(CoordinateFrame::Epsg(3826).is_compatible(&CoordinateFrame::Untagged));
    }

    #[test]
    fn different_codes_are_incompatible() {
        assert!(!CoordinateFrame::Epsg(3826).is_compatible(&CoordinateFrame::WGS84));
        assert!(CoordinateFrame::WGS84.is_compatible(&CoordinateFrame::Epsg(4326)));
    }

    #[test]
    fn geographic_frames() {
        assert!(CoordinateFrame::WGS84.is_geographic());
        assert!(CoordinateFrame::Epsg(4269).is_geographic());
        assert!(CoordinateFrame::Untagged.is_geographic());
        assert!(!CoordinateFrame::Epsg(3826).is_geographic());
        assert!(!CoordinateFrame::Epsg(3857).is_geographic());
    }

    #[test]
    fn parse_crs_names() {
        assert_eq!(CoordinateFrame::parse("EPSG:3826"), Some(CoordinateFrame::Epsg(3826)));
        assert_eq!(CoordinateFrame::parse("urn:ogc:def:crs:EPSG::4326"), Some(CoordinateFrame::WGS84));
        assert_eq!(CoordinateFrame::parse("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(CoordinateFrame::WGS84));
        assert_eq!(CoordinateFrame::parse("not a crs"), None);
    }

    #[test]
    fn display() {
        assert_eq!(CoordinateFrame::Epsg(3826).to_string(), "EPSG:3826");
        assert_eq!(CoordinateFrame::Untagged.to_string(), "untagged");
    }
}
