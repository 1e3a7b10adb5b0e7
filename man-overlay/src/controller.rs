//! The overlay controller.
//!
//! `OverlayController` owns the filter, the fetched measurements, their site
//! groups, the highlight machine and the trace layer. Callers drive it from
//! a single event loop:
//!
//! 1. edit the filter through [`OverlayController::filter_mut`],
//! 2. call [`OverlayController::poll_refresh`] to get a [`FetchTicket`],
//! 3. run the fetch however they like and hand the result back to
//!    [`OverlayController::apply_fetch`].
//!
//! Only the most recently issued ticket can be applied. An older result that
//! arrives late is reported as stale and leaves the rendered state alone.

use crate::color_domain::ColorDomain;
use crate::config::OverlayConfig;
use crate::grouping::SiteGroups;
use crate::interaction::{ClickInstant, HighlightMachine, HighlightState, Transition};
use crate::render::{RenderFrame, RenderedMarker};
use crate::style::{style_for, Marker};
use crate::trace::{Trace, TraceLayer};
use log::{debug, info, warn};
use man_core::error::{OverlayError, Result};
use man_core::filter::{FilterState, FilterTracker};
use man_core::measurement::Measurement;
use man_core::query::{MeasurementQuery, SiteQuery};
use man_core::service::DataService;
use man_core::site::Site;
use serde::Serialize;
use std::fmt;

/// Monotonic fetch counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(pub u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// An issued fetch: its generation plus the filter it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub filter: FilterState,
    pub query: MeasurementQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied { generation: Generation, count: usize },
    Failed { generation: Generation, error: OverlayError },
    Stale { generation: Generation, latest: Generation },
}

const SITES_FAILED: &str = "Failed to load sites";

pub struct OverlayController {
    config: OverlayConfig,
    tracker: FilterTracker,
    sites: Vec<Site>,
    issued: Generation,
    rendered: Option<Generation>,
    measurement_type: String,
    domain: ColorDomain,
    measurements: Vec<Measurement>,
    markers: Vec<Marker>,
    groups: SiteGroups,
    highlight: HighlightMachine,
    traces: TraceLayer,
    notice: Option<String>,
}

impl OverlayController {
    /// A controller with an empty filter for the configured measurement type.
    /// The first refresh is already scheduled.
    pub fn new(config: OverlayConfig) -> Self {
        let mut tracker = FilterTracker::default();
        tracker.set_measurement_type(&config.default_measurement_type);
        tracker.request_refresh();
        Self::with_tracker(config, tracker)
    }

    fn with_tracker(config: OverlayConfig, tracker: FilterTracker) -> Self {
        let measurement_type = tracker.state().measurement_type.clone();
        let domain = ColorDomain::for_measurement_type(&measurement_type, config.ramp);
        let highlight = HighlightMachine::new(config.double_click_window_ms);
        Self {
            config,
            tracker,
            sites: Vec::new(),
            issued: Generation::default(),
            rendered: None,
            measurement_type,
            domain,
            measurements: Vec::new(),
            markers: Vec::new(),
            groups: SiteGroups::default(),
            highlight,
            traces: TraceLayer::default(),
            notice: None,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn filter(&self) -> &FilterState {
        self.tracker.state()
    }

    /// Filter setters. Edits only schedule a refresh; nothing is fetched
    /// until [`poll_refresh`](Self::poll_refresh).
    pub fn filter_mut(&mut self) -> &mut FilterTracker {
        &mut self.tracker
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn groups(&self) -> &SiteGroups {
        &self.groups
    }

    pub fn domain(&self) -> &ColorDomain {
        &self.domain
    }

    pub fn highlight(&self) -> &HighlightState {
        self.highlight.state()
    }

    pub fn traces(&self) -> &TraceLayer {
        &self.traces
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn latest_generation(&self) -> Generation {
        self.issued
    }

    pub fn rendered_generation(&self) -> Option<Generation> {
        self.rendered
    }

    /// Issue a ticket if the filter changed since the last one.
    pub fn poll_refresh(&mut self) -> Option<FetchTicket> {
        let filter = self.tracker.take_refresh()?;
        self.issued = self.issued.next();
        let query = MeasurementQuery::from_filter(&filter);
        info!(
            "Issued fetch {} for {} (sites: {}, bbox: {})",
            self.issued,
            query.reading,
            query.sites.len(),
            query.bbox.is_some()
        );
        Some(FetchTicket {
            generation: self.issued,
            filter,
            query,
        })
    }

    /// Apply a fetch result if its ticket is still the latest one.
    ///
    /// Success replaces every marker and group. Failure clears them and sets
    /// a notice. Either way the highlight returns to idle and the trace is
    /// removed.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Measurement>>,
    ) -> FetchOutcome {
        if ticket.generation != self.issued {
            info!(
                "Discarding stale fetch {} (latest is {})",
                ticket.generation, self.issued
            );
            return FetchOutcome::Stale {
                generation: ticket.generation,
                latest: self.issued,
            };
        }

        self.highlight.reset();
        self.traces.clear();
        self.rendered = Some(ticket.generation);
        self.measurement_type = ticket.filter.measurement_type.clone();
        self.domain = ColorDomain::for_measurement_type(&self.measurement_type, self.config.ramp);

        match result {
            Ok(measurements) => {
                self.markers = measurements
                    .iter()
                    .map(|m| Marker::from_measurement(m, &self.domain))
                    .collect();
                self.groups = SiteGroups::build(&measurements);
                self.measurements = measurements;
                self.notice = None;
                info!(
                    "Applied fetch {}: {} measurements across {} sites",
                    ticket.generation,
                    self.measurements.len(),
                    self.groups.len()
                );
                FetchOutcome::Applied {
                    generation: ticket.generation,
                    count: self.measurements.len(),
                }
            }
            Err(error) => {
                warn!("Fetch {} failed: {}", ticket.generation, error);
                self.measurements.clear();
                self.markers.clear();
                self.groups.clear();
                self.notice = Some(if error.is_fetch_failure() {
                    format!("Failed to load measurements: {}", error)
                } else {
                    format!("Measurement request rejected: {}", error)
                });
                FetchOutcome::Failed {
                    generation: ticket.generation,
                    error,
                }
            }
        }
    }

    /// Poll, fetch from `service` and apply in one go.
    pub async fn refresh<S: DataService>(&mut self, service: &S) -> Option<FetchOutcome> {
        let ticket = self.poll_refresh()?;
        let result = service.list_measurements(&ticket.query).await;
        Some(self.apply_fetch(&ticket, result))
    }

    /// Replace the site list and drop selected sites that are no longer
    /// listed. Returns whether the selection changed.
    pub fn apply_sites(&mut self, sites: Vec<Site>) -> bool {
        info!("Site list replaced: {} sites", sites.len());
        if self.notice.as_deref().is_some_and(|n| n.starts_with(SITES_FAILED)) {
            self.notice = None;
        }
        self.sites = sites;
        let names: Vec<&str> = self.sites.iter().map(|s| s.name.as_str()).collect();
        self.tracker.retain_sites(names)
    }

    /// Fetch the site list for the current dates and bounds.
    pub async fn refresh_sites<S: DataService>(&mut self, service: &S) -> Result<bool> {
        let query = SiteQuery::from_filter(self.tracker.state());
        match service.list_sites(&query).await {
            Ok(sites) => Ok(self.apply_sites(sites)),
            Err(e) => {
                warn!("Site list fetch failed: {}", e);
                self.notice = Some(format!("{}: {}", SITES_FAILED, e));
                Err(e)
            }
        }
    }

    /// Click on the marker at `index` in the rendered set.
    pub fn click_marker(&mut self, index: usize, at: ClickInstant) -> Option<Transition> {
        let site = self.markers.get(index)?.site.clone();
        self.click_site(&site, at)
    }

    /// Click on any marker of `site`. Ignored when the site has no markers.
    pub fn click_site(&mut self, site: &str, at: ClickInstant) -> Option<Transition> {
        let group = match self.groups.get(site) {
            Some(group) => group,
            None => {
                debug!("Click on {} ignored, no rendered markers", site);
                return None;
            }
        };
        let transition = self.highlight.click(site, at);
        if transition.needs_trace() {
            let trace = Trace::build(site, group.indices.iter().map(|i| &self.measurements[*i]));
            debug!("Trace for {}: {} segments", site, trace.segments.len());
            self.traces.replace(trace);
        } else {
            self.traces.clear();
        }
        Some(transition)
    }

    /// Derive every marker's style from the current highlight.
    pub fn frame(&self) -> RenderFrame {
        let highlight = self.highlight.state();
        let markers = self
            .markers
            .iter()
            .map(|marker| {
                let style = style_for(marker, highlight, &self.config);
                let tooltip = style
                    .tooltip
                    .then(|| marker.tooltip(&self.measurement_type));
                RenderedMarker {
                    marker: marker.clone(),
                    style,
                    tooltip,
                }
            })
            .collect();
        RenderFrame {
            generation: self.rendered.map(|g| g.0),
            measurement_type: self.measurement_type.clone(),
            markers,
            segments: self.traces.segments().to_vec(),
            highlight: highlight.clone(),
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::grouping::tests::measurement;
    use crate::marker_color::{scale_position, OUT_OF_RANGE_HIGH};
    use chrono::NaiveDate;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeService {
        sites: Vec<Site>,
        measurements: Vec<Measurement>,
        fail: bool,
        queries: RefCell<Vec<MeasurementQuery>>,
    }

    impl DataService for FakeService {
        async fn list_sites(&self, _query: &SiteQuery) -> Result<Vec<Site>> {
            if self.fail {
                return Err(OverlayError::Transport("connection refused".into()));
            }
            Ok(self.sites.clone())
        }

        async fn list_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>> {
            self.queries.borrow_mut().push(query.clone());
            if self.fail {
                return Err(OverlayError::Transport("connection refused".into()));
            }
            Ok(self.measurements.clone())
        }
    }

    fn at(ms: u64) -> ClickInstant {
        ClickInstant::from_millis(ms)
    }

    fn two_sites() -> Vec<Measurement> {
        vec![
            measurement("A", "2020-01-01", 0.1),
            measurement("B", "2020-01-01", 0.2),
            measurement("A", "2020-01-02", 0.3),
            measurement("A", "2020-01-03", 0.4),
        ]
    }

    #[tokio::test]
    async fn aod_scenario_colors() {
        let service = FakeService {
            measurements: vec![
                measurement("SiteA", "2021-03-01", 0.05),
                measurement("SiteA", "2021-03-02", 0.45),
                measurement("SiteA", "2021-03-03", 0.6),
            ],
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        controller.filter_mut().set_selected_sites(["SiteA"]);

        let outcome = controller.refresh(&service).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Applied { count: 3, .. }));

        let queries = service.queries.borrow();
        let query = &queries[0];
        assert_eq!(query.reading, "aod_500nm");
        assert!(query.bbox.is_none());
        assert_eq!(query.sites, vec!["SiteA".to_string()]);

        let domain = controller.domain();
        assert!((scale_position(0.05, domain).unwrap() - 0.5).abs() < 1e-9);
        assert!((scale_position(0.45, domain).unwrap() - 4.5).abs() < 1e-9);

        let frame = controller.frame();
        assert_eq!(frame.markers.len(), 3);
        assert_eq!(frame.markers[0].marker.color, Rgb::new(0, 64, 192));
        assert_eq!(frame.markers[2].marker.color, OUT_OF_RANGE_HIGH);
    }

    #[tokio::test]
    async fn no_refresh_without_changes() {
        let service = FakeService::default();
        let mut controller = OverlayController::new(OverlayConfig::default());
        assert!(controller.refresh(&service).await.is_some());
        assert!(controller.refresh(&service).await.is_none());
        assert_eq!(service.queries.borrow().len(), 1);
    }

    #[test]
    fn stale_fetch_does_not_overwrite_newer() {
        let mut controller = OverlayController::new(OverlayConfig::default());
        let g1 = controller.poll_refresh().unwrap();
        controller.filter_mut().set_measurement_type("water_vapor");
        let g2 = controller.poll_refresh().unwrap();
        assert!(g2.generation > g1.generation);

        let newer = vec![measurement("B", "2020-01-01", 2.5)];
        let older = vec![
            measurement("A", "2020-01-01", 0.1),
            measurement("A", "2020-01-02", 0.2),
        ];
        assert!(matches!(
            controller.apply_fetch(&g2, Ok(newer)),
            FetchOutcome::Applied { count: 1, .. }
        ));
        let outcome = controller.apply_fetch(&g1, Ok(older));
        assert_eq!(
            outcome,
            FetchOutcome::Stale {
                generation: g1.generation,
                latest: g2.generation
            }
        );

        assert_eq!(controller.latest_generation(), g2.generation);
        let frame = controller.frame();
        assert_eq!(frame.generation, Some(g2.generation.0));
        assert_eq!(frame.measurement_type, "water_vapor");
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].marker.site, "B");
    }

    #[test]
    fn stale_result_is_discarded_even_before_newer_arrives() {
        let mut controller = OverlayController::new(OverlayConfig::default());
        let g1 = controller.poll_refresh().unwrap();
        controller.filter_mut().set_measurement_type("angstrom");
        let _g2 = controller.poll_refresh().unwrap();
        let outcome = controller.apply_fetch(&g1, Ok(two_sites()));
        assert!(matches!(outcome, FetchOutcome::Stale { .. }));
        assert!(controller.frame().markers.is_empty());
        assert_eq!(controller.rendered_generation(), None);
    }

    #[tokio::test]
    async fn failure_clears_everything_and_sets_notice() {
        let ok = FakeService {
            measurements: two_sites(),
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        controller.refresh(&ok).await;
        controller.click_site("A", at(0));
        assert_eq!(controller.traces().segments().len(), 2);

        let failing = FakeService {
            fail: true,
            ..FakeService::default()
        };
        controller.filter_mut().set_measurement_type("water_vapor");
        let outcome = controller.refresh(&failing).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Failed { .. }));

        let frame = controller.frame();
        assert!(frame.markers.is_empty());
        assert!(frame.segments.is_empty());
        assert!(frame.highlight.active_site.is_none());
        assert!(frame.notice.unwrap().contains("connection refused"));
    }

    #[test]
    fn rejected_request_gets_its_own_notice() {
        let mut controller = OverlayController::new(OverlayConfig::default());
        let ticket = controller.poll_refresh().unwrap();
        let error = OverlayError::InvalidFilter("end before start".into());
        let outcome = controller.apply_fetch(&ticket, Err(error));
        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        let notice = controller.notice().unwrap();
        assert!(notice.starts_with("Measurement request rejected"));
        assert!(notice.contains("end before start"));
    }

    #[tokio::test]
    async fn click_highlights_and_double_click_resets() {
        let service = FakeService {
            measurements: two_sites(),
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        controller.refresh(&service).await;

        let t = controller.click_marker(0, at(10_000)).unwrap();
        assert!(matches!(t, Transition::Highlighted { ref site, .. } if site == "A"));
        let frame = controller.frame();
        assert_eq!(frame.segments.len(), 2);
        let b = &frame.markers[1];
        assert_eq!(b.style.color, Rgb::GREY);
        assert!(b.tooltip.is_none());
        assert_eq!(frame.markers[0].style.radius, 8.0);

        let t = controller.click_site("A", at(10_500)).unwrap();
        assert_eq!(t, Transition::Reset { site: "A".into() });
        let frame = controller.frame();
        assert!(frame.segments.is_empty());
        assert!(frame.markers.iter().all(|m| {
            m.style.color == m.marker.color && m.style.radius == 4.0 && m.tooltip.is_some()
        }));
    }

    #[tokio::test]
    async fn switching_sites_replaces_trace() {
        let service = FakeService {
            measurements: two_sites(),
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        controller.refresh(&service).await;

        controller.click_site("A", at(0));
        assert_eq!(controller.traces().current().unwrap().site, "A");
        controller.click_site("B", at(100));
        assert_eq!(controller.traces().current().unwrap().site, "B");
        assert!(controller.traces().segments().is_empty());
        assert!(controller.highlight().is_active("B"));
    }

    #[tokio::test]
    async fn refresh_resets_highlight() {
        let service = FakeService {
            measurements: two_sites(),
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        controller.refresh(&service).await;
        controller.click_site("A", at(0));

        controller
            .filter_mut()
            .set_start_date(NaiveDate::from_ymd_opt(2020, 1, 1))
            .unwrap();
        controller.refresh(&service).await;
        assert!(controller.highlight().is_idle());
        assert!(controller.traces().current().is_none());
        // the last click was forgotten, so this is a fresh single click
        let t = controller.click_site("A", at(100)).unwrap();
        assert!(matches!(t, Transition::Highlighted { .. }));
    }

    #[test]
    fn click_on_unknown_marker_is_ignored() {
        let mut controller = OverlayController::new(OverlayConfig::default());
        assert!(controller.click_marker(3, at(0)).is_none());
        assert!(controller.click_site("nowhere", at(0)).is_none());
    }

    #[tokio::test]
    async fn site_refresh_prunes_selection() {
        let service = FakeService {
            sites: vec![Site::new("A", None)],
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        controller.poll_refresh();
        controller.filter_mut().set_selected_sites(["A", "Gone"]);
        controller.poll_refresh();

        assert!(controller.refresh_sites(&service).await.unwrap());
        assert_eq!(controller.filter().selected_sites.len(), 1);
        assert!(controller.poll_refresh().is_some());
    }

    #[tokio::test]
    async fn site_list_success_clears_site_failure_notice() {
        let failing = FakeService {
            fail: true,
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        assert!(controller.refresh_sites(&failing).await.is_err());
        assert!(controller.notice().unwrap().starts_with("Failed to load sites"));

        let ok = FakeService {
            sites: vec![Site::new("A", None)],
            ..FakeService::default()
        };
        controller.refresh_sites(&ok).await.unwrap();
        assert!(controller.notice().is_none());
        assert_eq!(controller.sites().len(), 1);
    }

    #[tokio::test]
    async fn site_list_success_keeps_measurement_failure_notice() {
        let failing = FakeService {
            fail: true,
            ..FakeService::default()
        };
        let mut controller = OverlayController::new(OverlayConfig::default());
        controller.refresh(&failing).await;
        controller.refresh_sites(&FakeService::default()).await.unwrap();
        assert!(controller.notice().unwrap().starts_with("Failed to load measurements"));
    }
}
