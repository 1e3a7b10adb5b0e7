use crate::color::Rgb;
use crate::color_domain::ColorDomain;
use crate::marker_color::color_for;
use man_core::measurement::{LatLng, Measurement};
use serde::Serialize;
use std::cmp::Reverse;

/// One line segment of a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSegment {
    pub from: LatLng,
    pub to: LatLng,
    /// `i / N` for segment `i` of an `N`-point trace.
    pub fraction: f64,
    pub color: Rgb,
}

/// A site's measurements joined newest to oldest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub site: String,
    pub segments: Vec<TraceSegment>,
}

impl Trace {
    /// Build the trace for `site` from its measurements.
    ///
    /// Points are ordered by date then time of day, newest first; exact ties
    /// keep arrival order. Fewer than two points give no segments.
    pub fn build<'a, I>(site: &str, measurements: I) -> Self
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut points: Vec<&Measurement> = measurements.into_iter().collect();
        points.sort_by_key(|m| Reverse((m.date, m.time)));

        let ramp = ColorDomain::trace();
        let n = points.len();
        let segments = points
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let fraction = i as f64 / n as f64;
                TraceSegment {
                    from: pair[0].position,
                    to: pair[1].position,
                    fraction,
                    color: color_for(fraction, &ramp),
                }
            })
            .collect();

        Trace {
            site: site.to_string(),
            segments,
        }
    }
}

/// The segments currently on screen.
///
/// Holds at most one trace; installing a new one drops the old one whole.
#[derive(Debug, Clone, Default)]
pub struct TraceLayer {
    current: Option<Trace>,
}

impl TraceLayer {
    pub fn replace(&mut self, trace: Trace) {
        self.current = Some(trace);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Trace> {
        self.current.as_ref()
    }

    pub fn segments(&self) -> &[TraceSegment] {
        self.current
            .as_ref()
            .map(|t| t.segments.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::tests::measurement;
    use chrono::NaiveTime;

    fn at(lat: f64, mut m: Measurement) -> Measurement {
        m.position = LatLng::new(lat, 0.0);
        m
    }

    #[test]
    fn segments_run_newest_to_oldest() {
        let data = vec![
            at(1.0, measurement("A", "2020-01-01", 0.1)),
            at(3.0, measurement("A", "2020-01-03", 0.1)),
            at(2.0, measurement("A", "2020-01-02", 0.1)),
            at(4.0, measurement("A", "2020-01-04", 0.1)),
        ];
        let trace = Trace::build("A", &data);
        assert_eq!(trace.segments.len(), 3);
        let lats: Vec<(f64, f64)> = trace
            .segments
            .iter()
            .map(|s| (s.from.lat, s.to.lat))
            .collect();
        assert_eq!(lats, vec![(4.0, 3.0), (3.0, 2.0), (2.0, 1.0)]);
        assert_eq!(trace.segments[0].fraction, 0.0);
        assert_eq!(trace.segments[1].fraction, 0.25);
        assert_eq!(trace.segments[2].fraction, 0.5);
        assert_eq!(trace.segments[0].color, Rgb::BRIGHT_GREEN);
    }

    #[test]
    fn same_day_orders_by_time_then_arrival() {
        let mut morning = at(1.0, measurement("A", "2020-01-01", 0.1));
        morning.time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let mut evening = at(2.0, measurement("A", "2020-01-01", 0.1));
        evening.time = NaiveTime::from_hms_opt(20, 0, 0).unwrap();
        let tie_first = at(3.0, measurement("A", "2019-12-31", 0.1));
        let tie_second = at(4.0, measurement("A", "2019-12-31", 0.1));

        let data = vec![morning, tie_first, evening, tie_second];
        let trace = Trace::build("A", &data);
        let order: Vec<f64> = std::iter::once(trace.segments[0].from.lat)
            .chain(trace.segments.iter().map(|s| s.to.lat))
            .collect();
        assert_eq!(order, vec![2.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn single_point_has_no_segments() {
        let data = vec![measurement("A", "2020-01-01", 0.1)];
        assert!(Trace::build("A", &data).segments.is_empty());
        assert!(Trace::build("A", &Vec::<Measurement>::new()).segments.is_empty());
    }

    #[test]
    fn layer_replaces_previous_trace() {
        let a = vec![
            measurement("A", "2020-01-01", 0.1),
            measurement("A", "2020-01-02", 0.1),
        ];
        let b = vec![
            measurement("B", "2020-01-01", 0.1),
            measurement("B", "2020-01-02", 0.1),
            measurement("B", "2020-01-03", 0.1),
        ];
        let mut layer = TraceLayer::default();
        layer.replace(Trace::build("A", &a));
        layer.replace(Trace::build("B", &b));
        assert_eq!(layer.current().unwrap().site, "B");
        assert_eq!(layer.segments().len(), 2);
        layer.clear();
        assert!(layer.segments().is_empty());
    }
}
