use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDateTime;
use geo::Point;
use serde::Serialize;

use crate::{error::MalformedReason, geom::CoordinateFrame};

/// Sparse field map of one observation. A missing key means "absent", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fields(BTreeMap<Arc<str>, f64>);

impl Fields {
    pub fn new() -> Self { Self::default() }

    /// Record a field value. `None` and non-finite values are stored as absent.
    pub fn set(&mut self, name: &str, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => { self.0.insert(Arc::from(name), v); }
            None => { self.0.remove(name); }
        }
    }

    #[inline] pub fn get(&self, name: &str) -> Option<f64> { self.0.get(name).copied() }

    #[inline] pub fn contains(&self, name: &str) -> bool { self.0.contains_key(name) }

    #[inline] pub fn len(&self) -> usize { self.0.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), *v))
    }
}

/// A single station's reading at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    station: Arc<str>,
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    time: Option<NaiveDateTime>,
    frame: CoordinateFrame,
    fields: Fields,
}

impl Observation {
    /// New observation in WGS84 with no timestamp and no fields.
    pub fn new(station: impl AsRef<str>, lat: Option<f64>, lon: Option<f64>) -> Self {
        Self {
            station: Arc::from(station.as_ref()),
            name: None,
            lat,
            lon,
            time: None,
            frame: CoordinateFrame::WGS84,
            fields: Fields::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_time(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_frame(mut self, frame: CoordinateFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_field(mut self, name: &str, value: Option<f64>) -> Self {
        self.fields.set(name, value);
        self
    }

    #[inline] pub fn station(&self) -> &Arc<str> { &self.station }

    #[inline] pub fn name(&self) -> Option<&str> { self.name.as_deref() }

    #[inline] pub fn lat(&self) -> Option<f64> { self.lat }

    #[inline] pub fn lon(&self) -> Option<f64> { self.lon }

    #[inline] pub fn time(&self) -> Option<NaiveDateTime> { self.time }

    #[inline] pub fn frame(&self) -> CoordinateFrame { self.frame }

    #[inline] pub fn fields(&self) -> &Fields { &self.fields }

    #[inline] pub fn field(&self, name: &str) -> Option<f64> { self.fields.get(name) }

    /// Validated station position as an (x, y) = (lon, lat) point.
    ///
    /// In geographic frames, longitude: [-180.0, 180.0], latitude: [-90.0, 90.0].
    /// Projected frames (northing in `lat`, easting in `lon`) only need finite values.
    pub fn point(&self) -> Result<Point<f64>, MalformedReason> {
        let lat = self.lat.ok_or(MalformedReason::MissingLatitude)?;
        let lon = self.lon.ok_or(MalformedReason::MissingLongitude)?;

        if !lat.is_finite() || !lon.is_finite() { return Err(MalformedReason::NonFiniteCoordinate) }
        if self.frame.is_geographic() {
            if !(-90.0..=90.0).contains(&lat) { return Err(MalformedReason::LatitudeOutOfRange) }
            if !(-180.0..=180.0).contains(&lon) { return Err(MalformedReason::LongitudeOutOfRange) }
        }

        Ok(Point::new(lon, lat))
    }
}
