use crate::error::{OverlayError, Result};
use man_utils::geo::{clamp_latitude, clamp_longitude};
use serde::{Deserialize, Serialize};

/// A spatial bounding box in WGS84 degrees.
///
/// Values held by a `BoundingBox` are always clamped into the valid
/// latitude/longitude ranges. Corners are not reordered: a box drawn
/// "upside down" stays that way and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Build a clamped box from raw corner values.
    ///
    /// Non-finite coordinates are rejected rather than clamped.
    pub fn clamped(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Result<Self> {
        let corners = [min_lat, min_lng, max_lat, max_lng];
        if corners.iter().any(|c| !c.is_finite()) {
            return Err(OverlayError::InvalidFilter(format!(
                "bounding box coordinates must be finite: {:?}",
                corners
            )));
        }
        Ok(Self {
            min_lat: clamp_latitude(min_lat),
            min_lng: clamp_longitude(min_lng),
            max_lat: clamp_latitude(max_lat),
            max_lng: clamp_longitude(max_lng),
        })
    }

    /// Parse "min_lat,min_lng,max_lat,max_lng".
    pub fn parse(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| OverlayError::InvalidFilter(format!("bad bounding box '{}': {}", s, e)))?;
        match parts.as_slice() {
            [min_lat, min_lng, max_lat, max_lng] => {
                Self::clamped(*min_lat, *min_lng, *max_lat, *max_lng)
            }
            _ => Err(OverlayError::InvalidFilter(format!(
                "bounding box needs four values, got '{}'",
                s
            ))),
        }
    }
}
