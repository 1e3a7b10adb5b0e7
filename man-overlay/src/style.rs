use crate::color::Rgb;
use crate::color_domain::ColorDomain;
use crate::config::OverlayConfig;
use crate::interaction::HighlightState;
use crate::marker_color::color_for;
use chrono::NaiveDate;
use man_core::measurement::{LatLng, Measurement};
use man_utils::dates::format_date;
use serde::Serialize;

/// A placed point and the color its value maps to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub site: String,
    pub position: LatLng,
    pub value: f64,
    pub date: NaiveDate,
    pub color: Rgb,
}

impl Marker {
    pub fn from_measurement(measurement: &Measurement, domain: &ColorDomain) -> Self {
        Self {
            site: measurement.site.clone(),
            position: measurement.position,
            value: measurement.value,
            date: measurement.date,
            color: color_for(measurement.value, domain),
        }
    }

    /// Hover text; `measurement_type` labels the value line.
    pub fn tooltip(&self, measurement_type: &str) -> String {
        format!(
            "Site: {}\n{}: {:.3}\nDate: {}",
            self.site,
            measurement_type,
            self.value,
            format_date(&self.date)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: Rgb,
    pub fill_opacity: f64,
    pub opacity: f64,
    pub radius: f64,
    pub tooltip: bool,
}

/// Style of `marker` under the current highlight.
///
/// Idle: original color at default radius. With a site active, its markers
/// are opaque and enlarged, every other marker is grey and faded with no
/// tooltip.
pub fn style_for(
    marker: &Marker,
    highlight: &HighlightState,
    config: &OverlayConfig,
) -> MarkerStyle {
    match highlight.active_site.as_deref() {
        None => MarkerStyle {
            color: marker.color,
            fill_opacity: config.idle_fill_opacity,
            opacity: 1.0,
            radius: config.marker_radius,
            tooltip: true,
        },
        Some(active) if active == marker.site => MarkerStyle {
            color: marker.color,
            fill_opacity: 1.0,
            opacity: 1.0,
            radius: config.highlight_radius,
            tooltip: true,
        },
        Some(_) => MarkerStyle {
            color: Rgb::GREY,
            fill_opacity: config.dimmed_opacity,
            opacity: config.dimmed_opacity,
            radius: config.marker_radius,
            tooltip: false,
        },
    }
}
