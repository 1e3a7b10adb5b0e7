use crate::color::Rgb;
use crate::color_domain::{ColorDomain, RampVariant};
use crate::interaction::HighlightState;
use crate::marker_color::{OUT_OF_RANGE_HIGH, OUT_OF_RANGE_LOW};
use crate::style::{Marker, MarkerStyle};
use crate::trace::TraceSegment;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMarker {
    #[serde(flatten)]
    pub marker: Marker,
    pub style: MarkerStyle,
    /// Present only when the style enables tooltips.
    pub tooltip: Option<String>,
}

/// Everything a map surface needs to draw the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// Fetch generation the markers came from; `None` before the first apply.
    pub generation: Option<u64>,
    pub measurement_type: String,
    pub markers: Vec<RenderedMarker>,
    pub segments: Vec<TraceSegment>,
    pub highlight: HighlightState,
    pub notice: Option<String>,
}

/// Color key for a measurement type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub measurement_type: String,
    pub scale: ColorDomain,
    pub below_range: Rgb,
    pub above_range: Rgb,
    pub trace: ColorDomain,
}

impl Legend {
    pub fn for_measurement_type(measurement_type: &str, ramp: RampVariant) -> Self {
        Self {
            measurement_type: measurement_type.to_string(),
            scale: ColorDomain::for_measurement_type(measurement_type, ramp),
            below_range: OUT_OF_RANGE_LOW,
            above_range: OUT_OF_RANGE_HIGH,
            trace: ColorDomain::trace(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_serializes_hex_colors() {
        let legend = Legend::for_measurement_type("aod_500nm", RampVariant::SixStop);
        let json = serde_json::to_value(&legend).unwrap();
        assert_eq!(json["above_range"], "#8b0000");
        assert_eq!(json["below_range"], "#808080");
        assert_eq!(json["scale"]["colors"][0], "#0000ff");
        assert_eq!(json["scale"]["breakpoints"].as_array().unwrap().len(), 6);
        assert_eq!(json["trace"]["colors"][0], "#39ff14");
    }
}
