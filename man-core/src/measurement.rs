use crate::error::Result;
use chrono::{NaiveDate, NaiveTime};
use log::warn;
use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A single scalar reading taken at a site.
///
/// Measurements are immutable once fetched. A fetch result owns its
/// measurements and the whole set is discarded on the next successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub site: String,
    pub filename: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub position: LatLng,
    pub instrument_id: i64,
    pub value: f64,
}

/// One record as returned by the measurements endpoint.
///
/// The backend renames the requested reading column to `value` and sends
/// `latlng` as null when a row has no usable point geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementRecord {
    pub site: String,
    #[serde(default)]
    pub filename: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub latlng: Option<LatLng>,
    #[serde(default)]
    pub aeronet_number: i64,
    pub value: f64,
}

impl MeasurementRecord {
    /// Convert into a placeable measurement; `None` when the record has no position.
    pub fn into_measurement(self) -> Option<Measurement> {
        let position = self.latlng?;
        Some(Measurement {
            site: self.site,
            filename: self.filename,
            date: self.date,
            time: self.time,
            position,
            instrument_id: self.aeronet_number,
            value: self.value,
        })
    }
}

impl Measurement {
    /// Parse a measurements response body, preserving arrival order.
    ///
    /// Records without a position are dropped; anything that is not a JSON
    /// array of records is a `MalformedResponse`.
    pub fn parse_response(body: &str) -> Result<Vec<Measurement>> {
        let records: Vec<MeasurementRecord> = serde_json::from_str(body)?;
        let total = records.len();
        let measurements: Vec<Measurement> = records
            .into_iter()
            .filter_map(MeasurementRecord::into_measurement)
            .collect();
        if measurements.len() != total {
            warn!(
                "Dropped {} of {} measurements without a position",
                total - measurements.len(),
                total
            );
        }
        Ok(measurements)
    }
}
