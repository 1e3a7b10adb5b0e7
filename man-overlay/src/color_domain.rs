//! Measurement type to color scale resolution.

use crate::color::Rgb;
use man_core::error::{OverlayError, Result};
use serde::{Deserialize, Serialize};

const AOD_DOMAIN: [f64; 6] = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5];
const WATER_DOMAIN: [f64; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
const ANGSTROM_DOMAIN: [f64; 6] = [0.0, 0.4, 0.8, 1.2, 1.6, 2.0];

const SEVEN_STOP: [Rgb; 7] = [
    Rgb::BLUE,
    Rgb::TEAL,
    Rgb::GREEN,
    Rgb::CHARTREUSE,
    Rgb::YELLOW,
    Rgb::ORANGE,
    Rgb::RED,
];

const SIX_STOP: [Rgb; 6] = [
    Rgb::BLUE,
    Rgb::TEAL,
    Rgb::GREEN,
    Rgb::YELLOW,
    Rgb::ORANGE,
    Rgb::RED,
];

/// Which marker ramp to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampVariant {
    #[default]
    SevenStop,
    /// The seven-stop ramp without chartreuse.
    SixStop,
}

impl RampVariant {
    pub fn colors(&self) -> &'static [Rgb] {
        match self {
            RampVariant::SevenStop => &SEVEN_STOP,
            RampVariant::SixStop => &SIX_STOP,
        }
    }
}

/// Breakpoints for a measurement type.
///
/// Checked in order: `std`/`aod`, then `water`/`air_mass`, then `angstrom`;
/// anything else gets seven evenly spaced fractions of 1.
pub fn breakpoints_for(measurement_type: &str) -> Vec<f64> {
    let t = measurement_type;
    if t.contains("std") || t.contains("aod") {
        AOD_DOMAIN.to_vec()
    } else if t.contains("water") || t.contains("air_mass") {
        WATER_DOMAIN.to_vec()
    } else if t.contains("angstrom") {
        ANGSTROM_DOMAIN.to_vec()
    } else {
        (0..=6).map(|i| i as f64 / 6.0).collect()
    }
}

/// Ordered breakpoints paired one to one with ramp colors.
///
/// Breakpoints are strictly increasing and the two vectors always have the
/// same length. `upper` is the top of the resolved domain before pairing,
/// so a short ramp still colors values up to the full maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorDomain {
    breakpoints: Vec<f64>,
    colors: Vec<Rgb>,
    upper: f64,
}

impl ColorDomain {
    fn paired(mut breakpoints: Vec<f64>, mut colors: Vec<Rgb>) -> Self {
        let upper = breakpoints.last().copied().unwrap_or(0.0);
        let len = breakpoints.len().min(colors.len());
        breakpoints.truncate(len);
        colors.truncate(len);
        Self {
            breakpoints,
            colors,
            upper,
        }
    }

    /// Pair breakpoints with colors. Extra entries on the longer side are
    /// dropped from interpolation; the last breakpoint stays the maximum.
    pub fn new(breakpoints: Vec<f64>, colors: Vec<Rgb>) -> Result<Self> {
        if breakpoints.is_empty() || colors.is_empty() {
            return Err(OverlayError::InvalidDomain(
                "a color domain needs at least one breakpoint and one color".to_string(),
            ));
        }
        if breakpoints.iter().any(|b| !b.is_finite()) {
            return Err(OverlayError::InvalidDomain(format!(
                "breakpoints must be finite: {:?}",
                breakpoints
            )));
        }
        if breakpoints.windows(2).any(|w| w[0] >= w[1]) {
            return Err(OverlayError::InvalidDomain(format!(
                "breakpoints must be strictly increasing: {:?}",
                breakpoints
            )));
        }
        Ok(Self::paired(breakpoints, colors))
    }

    /// Marker scale for a measurement type.
    pub fn for_measurement_type(measurement_type: &str, ramp: RampVariant) -> Self {
        Self::paired(breakpoints_for(measurement_type), ramp.colors().to_vec())
    }

    /// Recency scale for traces: bright green at 0, red at 1.
    pub fn trace() -> Self {
        Self::paired(vec![0.0, 1.0], vec![Rgb::BRIGHT_GREEN, Rgb::RED])
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn min(&self) -> f64 {
        self.breakpoints[0]
    }

    /// Values above this are out of range.
    pub fn max(&self) -> f64 {
        self.upper
    }
}
