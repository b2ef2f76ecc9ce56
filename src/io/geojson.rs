//! GeoJSON region reading.

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};

use crate::geom::{CoordinateFrame, RegionSource};

/// Read the Polygon and MultiPolygon features of a FeatureCollection as regions.
///
/// The region name is taken from `name_property`; the remaining properties are
/// kept as attributes. The frame is `frame` when given, else the collection's
/// `crs` member, else EPSG:4326. Features without an areal geometry are skipped.
pub fn read_regions_geojson(bytes: &[u8], name_property: &str, frame: Option<CoordinateFrame>) -> Result<Vec<RegionSource>> {
    let value: Value = serde_json::from_slice(bytes)
        .context("[io::geojson] Failed to parse GeoJSON bytes")?;

    if value["type"].as_str() != Some("FeatureCollection") {
        bail!("[io::geojson] Expected a FeatureCollection, found {}", value["type"]);
    }

    let frame = match frame {
        Some(frame) => frame,
        None => collection_frame(&value)?,
    };

    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] FeatureCollection has no features array"))?;

    let mut regions = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        let Some(boundary) = parse_geometry(&feature["geometry"])
            .with_context(|| format!("[io::geojson] Invalid geometry in feature {i}"))?
        else {
            log::warn!("[io::geojson] Skipping feature {i}: geometry is not a Polygon or MultiPolygon");
            continue;
        };

        let mut attributes = feature["properties"].as_object().cloned().unwrap_or_default();
        let name = take_name(&mut attributes, name_property)
            .ok_or_else(|| anyhow!("[io::geojson] Feature {i} has no {name_property:?} property"))?;

        regions.push(RegionSource { name, boundary, frame, attributes });
    }

    log::debug!("[io::geojson] Read {} regions in {frame}", regions.len());
    Ok(regions)
}

/// Frame named by the legacy `crs` member, defaulting to EPSG:4326.
fn collection_frame(value: &Value) -> Result<CoordinateFrame> {
    match value["crs"]["properties"]["name"].as_str() {
        Some(name) => CoordinateFrame::parse(name)
            .ok_or_else(|| anyhow!("[io::geojson] Unrecognized crs name {name:?}")),
        None => Ok(CoordinateFrame::WGS84),
    }
}

/// Remove the name property, accepting strings and numbers.
fn take_name(attributes: &mut Map<String, Value>, name_property: &str) -> Option<String> {
    match attributes.remove(name_property)? {
        Value::String(name) => Some(name),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Parse an areal geometry. `Ok(None)` for null or non-areal geometries.
fn parse_geometry(geometry: &Value) -> Result<Option<MultiPolygon<f64>>> {
    let coords = geometry["coordinates"].as_array();
    match (geometry["type"].as_str(), coords) {
        (Some("Polygon"), Some(rings)) => Ok(Some(MultiPolygon(vec![parse_polygon_coords(rings)?]))),
        (Some("MultiPolygon"), Some(polygons)) => {
            let polygons = polygons.iter()
                .map(|polygon| polygon.as_array()
                    .ok_or_else(|| anyhow!("MultiPolygon member is not an array"))
                    .and_then(|rings| parse_polygon_coords(rings)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(MultiPolygon(polygons)))
        }
        (Some("Polygon" | "MultiPolygon"), None) => bail!("geometry has no coordinates array"),
        _ => Ok(None),
    }
}

/// Parse `[exterior, hole, hole, ...]`.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("ring is not an array"))
            .and_then(|coords| parse_ring_coords(coords))
    });

    let exterior = rings.next()
        .ok_or_else(|| anyhow!("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from `[[x, y], [x, y], ...]`. Extra ordinates are ignored.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|position| {
            let x = position[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
            let y = position[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Ensure ring is closed (first point == last point)
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }

    Ok(LineString(points))
}
