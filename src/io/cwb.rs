//! Central Weather Bureau automatic station feed (O-A0001-001) reading.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::{geom::CoordinateFrame, observation::Observation};

/// Readings the feed uses for "no measurement".
const SENTINELS: [f64; 3] = [-99.0, -999.0, -9999.0];

#[derive(Debug, Deserialize)]
struct Feed {
    records: Records,
}

#[derive(Debug, Deserialize)]
struct Records {
    #[serde(default)]
    location: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    #[serde(default)]
    lat: Value,
    #[serde(default)]
    lon: Value,
    #[serde(default)]
    location_name: Option<String>,
    station_id: String,
    #[serde(default)]
    time: Option<ObsTime>,
    #[serde(default)]
    weather_element: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsTime {
    obs_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Element {
    element_name: String,
    #[serde(default)]
    element_value: Value,
}

/// Read station observations from an O-A0001-001 response body.
///
/// Element values arrive as strings; sentinels and unparsable values become
/// absent fields. Unparsable coordinates become absent coordinates and are left
/// for attribution to reject. Observations are tagged EPSG:4326.
pub fn read_cwb_observations(bytes: &[u8]) -> Result<Vec<Observation>> {
    let feed: Feed = serde_json::from_slice(bytes)
        .context("[io::cwb] Failed to parse O-A0001-001 response")?;

    let observations: Vec<Observation> = feed.records.location.into_iter()
        .map(|location| {
            let mut observation = Observation::new(&location.station_id, number(&location.lat), number(&location.lon))
                .with_frame(CoordinateFrame::WGS84);

            if let Some(name) = location.location_name {
                observation = observation.with_name(name);
            }
            if let Some(time) = location.time.as_ref().and_then(|time| parse_time(&time.obs_time)) {
                observation = observation.with_time(time);
            }
            for element in &location.weather_element {
                let value = number(&element.element_value).filter(|v| !SENTINELS.contains(v));
                observation = observation.with_field(&element.element_name, value);
            }
            observation
        })
        .collect();

    log::debug!("[io::cwb] Read {} station observations", observations.len());
    Ok(observations)
}

/// Numeric value of a JSON number or numeric string.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Parse `2023-05-10 13:00:00` or an RFC 3339 timestamp (kept in its local time).
fn parse_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|time| time.naive_local()))
        .or_else(|| {
            log::debug!("[io::cwb] Unparsable obsTime {text:?}");
            None
        })
}
