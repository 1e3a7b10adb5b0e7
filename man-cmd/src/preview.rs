//! Site listing, overlay preview and legend commands.

use crate::source::SourceArgs;
use clap::Args;
use man_core::bbox::BoundingBox;
use man_core::filter::FilterTracker;
use man_core::query::SiteQuery;
use man_core::service::DataService;
use man_overlay::color_domain::RampVariant;
use man_overlay::config::OverlayConfig;
use man_overlay::controller::{FetchOutcome, OverlayController};
use man_overlay::interaction::ClickInstant;
use man_overlay::render::Legend;
use man_utils::dates::parse_optional_date;
use serde::Serialize;
use std::path::PathBuf;

/// Filter flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub start: String,

    /// End date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub end: String,

    /// Bounding box as min_lat,min_lng,max_lat,max_lng
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<String>,

    /// Site to include; repeat for several
    #[arg(long = "site")]
    pub sites: Vec<String>,

    /// Measurement type, e.g. aod_500nm
    #[arg(long = "type")]
    pub measurement_type: Option<String>,
}

impl FilterArgs {
    /// Apply these flags through the tracker's setters.
    pub fn apply(&self, tracker: &mut FilterTracker) -> anyhow::Result<()> {
        tracker.set_date_range(
            parse_optional_date(&self.start)?,
            parse_optional_date(&self.end)?,
        )?;
        if let Some(bbox) = &self.bbox {
            let bbox = BoundingBox::parse(bbox)?;
            tracker.set_bounds(bbox.min_lat, bbox.min_lng, bbox.max_lat, bbox.max_lng)?;
        }
        tracker.set_selected_sites(self.sites.iter().cloned());
        if let Some(measurement_type) = &self.measurement_type {
            tracker.set_measurement_type(measurement_type);
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_sites(source: &SourceArgs, filter: &FilterArgs) -> anyhow::Result<()> {
    let service = source.open()?;
    let mut tracker = FilterTracker::default();
    filter.apply(&mut tracker)?;
    let sites = service
        .list_sites(&SiteQuery::from_filter(tracker.state()))
        .await?;
    print_json(&sites)
}

pub async fn run_overlay(
    source: &SourceArgs,
    filter: &FilterArgs,
    config: Option<&PathBuf>,
    highlight: Option<&str>,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => OverlayConfig::load(path)?,
        None => OverlayConfig::default(),
    };
    let service = source.open()?;
    let mut controller = OverlayController::new(config);
    filter.apply(controller.filter_mut())?;

    if controller.refresh_sites(&service).await? {
        log::warn!("Some selected sites are outside the filter and were dropped");
    }
    if let Some(FetchOutcome::Failed { error, .. }) = controller.refresh(&service).await {
        anyhow::bail!("Failed to fetch measurements: {}", error);
    }

    if let Some(site) = highlight {
        match controller.click_site(site, ClickInstant::from_millis(0)) {
            Some(transition) => log::info!("Highlight: {:?}", transition),
            None => log::warn!("No markers for site {}, nothing highlighted", site),
        }
    }
    print_json(&controller.frame())
}

pub fn run_legend(measurement_type: &str, six_stop: bool) -> anyhow::Result<()> {
    let ramp = if six_stop {
        RampVariant::SixStop
    } else {
        RampVariant::SevenStop
    };
    print_json(&Legend::for_measurement_type(measurement_type, ramp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn filter_args_set_every_field() {
        let args = FilterArgs {
            start: "2020-01-01".into(),
            end: "2020-03-01".into(),
            bbox: Some("-10,-20,10,20".into()),
            sites: vec!["Tara".into()],
            measurement_type: Some("water_vapor".into()),
        };
        let mut tracker = FilterTracker::default();
        args.apply(&mut tracker).unwrap();
        let state = tracker.state();
        assert_eq!(state.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(state.bbox.unwrap().max_lng, 20.0);
        assert!(state.selected_sites.contains("Tara"));
        assert_eq!(state.measurement_type, "water_vapor");
    }

    #[test]
    fn empty_filter_args_keep_defaults() {
        let mut tracker = FilterTracker::default();
        FilterArgs::default().apply(&mut tracker).unwrap();
        assert!(tracker.state().start_date.is_none());
        assert!(tracker.state().bbox.is_none());
        assert_eq!(tracker.state().measurement_type, "aod_500nm");
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let args = FilterArgs {
            start: "2021-01-01".into(),
            end: "2020-01-01".into(),
            ..FilterArgs::default()
        };
        assert!(args.apply(&mut FilterTracker::default()).is_err());
    }
}
