//! Site and measurement queries with the backend's filter semantics.
//!
//! # Site spans
//!
//! A site's span runs from its first to its last measurement date. Date
//! filters match on that span:
//!
//! - start and end: the span intersects `[start, end]`
//! - start only: the span intersects `[start, today]`
//! - end only: the span contains `end`
//!
//! A bounding box keeps sites with at least one measurement inside it.

use crate::Database;
use chrono::{NaiveDate, NaiveTime};
use man_core::bbox::BoundingBox;
use man_core::measurement::{LatLng, Measurement};
use man_core::query::{MeasurementQuery, SiteQuery};
use man_core::site::Site;
use man_utils::dates::{format_date, parse_date, spans_intersect};
use rusqlite::types::Value;

fn span_matches(
    span: Option<(NaiveDate, NaiveDate)>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    match (start, end) {
        (None, None) => true,
        (Some(s), Some(e)) => span.is_some_and(|(a, b)| spans_intersect(a, b, s, e)),
        (Some(s), None) => span.is_some_and(|(a, b)| spans_intersect(a, b, s, today)),
        (None, Some(e)) => span.is_some_and(|(a, b)| a <= e && e <= b),
    }
}

fn push_bbox(clauses: &mut Vec<String>, values: &mut Vec<Value>, bbox: &BoundingBox) {
    clauses.push("lat >= ? AND lat <= ? AND lng >= ? AND lng <= ?".to_string());
    values.extend([
        Value::Real(bbox.min_lat),
        Value::Real(bbox.max_lat),
        Value::Real(bbox.min_lng),
        Value::Real(bbox.max_lng),
    ]);
}

impl Database {
    /// Sites matching the query, ordered by span start. Sites without any
    /// measurement sort last and only match when no date is given.
    pub fn query_sites(&self, query: &SiteQuery, today: NaiveDate) -> anyhow::Result<Vec<Site>> {
        let conn = self.conn.borrow();
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(bbox) = &query.bbox {
            let mut inner = Vec::new();
            push_bbox(&mut inner, &mut values, bbox);
            clauses.push(format!(
                "s.name IN (SELECT DISTINCT site FROM measurements WHERE {})",
                inner.join(" AND ")
            ));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT s.name, MIN(m.date), MAX(m.date)
             FROM sites s
             LEFT JOIN measurements m ON m.site = s.name
             {}
             GROUP BY s.name",
            where_sql
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(values.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut sites = Vec::with_capacity(rows.len());
        for (name, first, last) in rows {
            let span = match (first, last) {
                (Some(a), Some(b)) => Some((parse_date(&a)?, parse_date(&b)?)),
                _ => None,
            };
            if span_matches(span, query.start_date, query.end_date, today) {
                sites.push(Site::new(name, span));
            }
        }
        sites.sort_by(|a, b| {
            (a.span.is_none(), a.span.map(|s| s.0), &a.name)
                .cmp(&(b.span.is_none(), b.span.map(|s| s.0), &b.name))
        });
        log::info!("query: query_sites returned {} records", sites.len());
        Ok(sites)
    }

    /// Measurements of `query.reading` in load order.
    ///
    /// Rows without a position are left out, as the HTTP service drops them.
    pub fn query_measurements(&self, query: &MeasurementQuery) -> anyhow::Result<Vec<Measurement>> {
        let conn = self.conn.borrow();
        let mut clauses = vec![
            "reading = ?".to_string(),
            "lat IS NOT NULL AND lng IS NOT NULL".to_string(),
        ];
        let mut values = vec![Value::Text(query.reading.clone())];
        if let Some(start) = query.start_date {
            clauses.push("date >= ?".to_string());
            values.push(Value::Text(format_date(&start)));
        }
        if let Some(end) = query.end_date {
            clauses.push("date <= ?".to_string());
            values.push(Value::Text(format_date(&end)));
        }
        if let Some(bbox) = &query.bbox {
            push_bbox(&mut clauses, &mut values, bbox);
        }
        if !query.sites.is_empty() {
            let marks = vec!["?"; query.sites.len()].join(", ");
            clauses.push(format!("site IN ({})", marks));
            values.extend(query.sites.iter().cloned().map(Value::Text));
        }

        let sql = format!(
            "SELECT site, filename, date, time, lat, lng, instrument_id, value
             FROM measurements
             WHERE {}
             ORDER BY id",
            clauses.join(" AND ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(values.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, f64>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut measurements = Vec::with_capacity(rows.len());
        for (site, filename, date, time, lat, lng, instrument_id, value) in rows {
            measurements.push(Measurement {
                site,
                filename,
                date: parse_date(&date)?,
                time: NaiveTime::parse_from_str(&time, "%H:%M:%S")?,
                position: LatLng::new(lat, lng),
                instrument_id,
                value,
            });
        }
        log::info!(
            "query: query_measurements({}) returned {} records",
            query.reading,
            measurements.len()
        );
        Ok(measurements)
    }
}
