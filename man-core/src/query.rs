use crate::bbox::BoundingBox;
use crate::filter::FilterState;
use chrono::NaiveDate;
use man_utils::dates::format_date;
use serde::Serialize;

/// Site list request: the date and spatial parts of a filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bbox: Option<BoundingBox>,
}

/// Measurement request resolved from a [`FilterState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bbox: Option<BoundingBox>,
    /// Empty means "no site constraint".
    pub sites: Vec<String>,
    pub reading: String,
}

fn push_common(
    params: &mut Vec<(&'static str, String)>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    bbox: Option<&BoundingBox>,
) {
    if let Some(start) = start_date {
        params.push(("start_date", format_date(&start)));
    }
    if let Some(end) = end_date {
        params.push(("end_date", format_date(&end)));
    }
    if let Some(bbox) = bbox {
        params.push(("min_lat", bbox.min_lat.to_string()));
        params.push(("min_lng", bbox.min_lng.to_string()));
        params.push(("max_lat", bbox.max_lat.to_string()));
        params.push(("max_lng", bbox.max_lng.to_string()));
    }
}

impl SiteQuery {
    pub fn from_filter(filter: &FilterState) -> Self {
        Self {
            start_date: filter.start_date,
            end_date: filter.end_date,
            bbox: filter.bbox,
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_common(&mut params, self.start_date, self.end_date, self.bbox.as_ref());
        params
    }
}

impl MeasurementQuery {
    pub fn from_filter(filter: &FilterState) -> Self {
        Self {
            start_date: filter.start_date,
            end_date: filter.end_date,
            bbox: filter.bbox,
            sites: filter.selected_sites.iter().cloned().collect(),
            reading: filter.measurement_type.clone(),
        }
    }

    /// Query-string pairs; unset fields are left out entirely.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_common(&mut params, self.start_date, self.end_date, self.bbox.as_ref());
        if !self.sites.is_empty() {
            params.push(("sites", self.sites.join(",")));
        }
        if !self.reading.is_empty() {
            params.push(("reading", self.reading.clone()));
        }
        params
    }
}
