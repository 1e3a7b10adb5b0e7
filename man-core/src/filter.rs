//! Filter state and the tracker that turns edits into refresh signals.
//!
//! Every setter reports whether it changed anything. Changes only raise a
//! pending flag; the owner drains it with [`FilterTracker::take_refresh`],
//! so any number of edits made in one logical update cost one fetch.

use crate::bbox::BoundingBox;
use crate::error::{OverlayError, Result};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

/// Measurement type requested when nothing else is configured.
pub const DEFAULT_MEASUREMENT_TYPE: &str = "aod_500nm";

/// The active filter parameters.
///
/// Invariant: when both dates are set, `start_date <= end_date`. The bbox,
/// when present, is already clamped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bbox: Option<BoundingBox>,
    pub selected_sites: BTreeSet<String>,
    pub measurement_type: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            bbox: None,
            selected_sites: BTreeSet::new(),
            measurement_type: DEFAULT_MEASUREMENT_TYPE.to_string(),
        }
    }
}

fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(OverlayError::InvalidFilter(format!(
            "start date {} is after end date {}",
            s, e
        ))),
        _ => Ok(()),
    }
}

/// Holds the current [`FilterState`] and coalesces changes into refreshes.
#[derive(Debug, Clone, Default)]
pub struct FilterTracker {
    state: FilterState,
    pending: bool,
}

impl FilterTracker {
    pub fn new(state: FilterState) -> Result<Self> {
        check_date_order(state.start_date, state.end_date)?;
        Ok(Self {
            state,
            pending: true,
        })
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Schedule a refresh without changing any field.
    pub fn request_refresh(&mut self) {
        self.pending = true;
    }

    /// Drain the pending refresh, returning the snapshot to fetch with.
    pub fn take_refresh(&mut self) -> Option<FilterState> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(self.state.clone())
    }

    fn mark(&mut self, changed: bool, field: &str) -> bool {
        if changed {
            debug!("filter: {} changed, refresh scheduled", field);
            self.pending = true;
        }
        changed
    }

    pub fn set_start_date(&mut self, start: Option<NaiveDate>) -> Result<bool> {
        check_date_order(start, self.state.end_date)?;
        let changed = self.state.start_date != start;
        self.state.start_date = start;
        Ok(self.mark(changed, "start date"))
    }

    pub fn set_end_date(&mut self, end: Option<NaiveDate>) -> Result<bool> {
        check_date_order(self.state.start_date, end)?;
        let changed = self.state.end_date != end;
        self.state.end_date = end;
        Ok(self.mark(changed, "end date"))
    }

    /// Set both dates as one edit.
    pub fn set_date_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<bool> {
        check_date_order(start, end)?;
        let changed = self.state.start_date != start || self.state.end_date != end;
        self.state.start_date = start;
        self.state.end_date = end;
        Ok(self.mark(changed, "date range"))
    }

    /// Set all four corners at once; the values are clamped before storing.
    pub fn set_bounds(
        &mut self,
        min_lat: f64,
        min_lng: f64,
        max_lat: f64,
        max_lng: f64,
    ) -> Result<bool> {
        let bbox = BoundingBox::clamped(min_lat, min_lng, max_lat, max_lng)?;
        let changed = self.state.bbox != Some(bbox);
        self.state.bbox = Some(bbox);
        Ok(self.mark(changed, "bounds"))
    }

    /// Drop the spatial constraint.
    pub fn clear_bounds(&mut self) -> bool {
        let changed = self.state.bbox.take().is_some();
        self.mark(changed, "bounds")
    }

    pub fn set_selected_sites<I, S>(&mut self, sites: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sites: BTreeSet<String> = sites.into_iter().map(Into::into).collect();
        let changed = self.state.selected_sites != sites;
        self.state.selected_sites = sites;
        self.mark(changed, "site selection")
    }

    /// Add the site if absent, remove it if present.
    pub fn toggle_site(&mut self, site: &str) -> bool {
        if !self.state.selected_sites.remove(site) {
            self.state.selected_sites.insert(site.to_string());
        }
        self.mark(true, "site selection")
    }

    /// Drop selected sites that are not in `available`.
    pub fn retain_sites<'a, I>(&mut self, available: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let available: BTreeSet<&str> = available.into_iter().collect();
        let before = self.state.selected_sites.len();
        self.state
            .selected_sites
            .retain(|site| available.contains(site.as_str()));
        let changed = self.state.selected_sites.len() != before;
        self.mark(changed, "site selection")
    }

    pub fn set_measurement_type(&mut self, measurement_type: &str) -> bool {
        let changed = self.state.measurement_type != measurement_type;
        if changed {
            self.state.measurement_type = measurement_type.to_string();
        }
        self.mark(changed, "measurement type")
    }
}
