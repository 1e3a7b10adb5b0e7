//! CSV loaders for the in-memory store.
//!
//! # CSV Formats
//!
//! - **Sites** (has headers): `name,description`
//! - **Measurements** (has headers):
//!   `site,filename,date,time,lat,lng,instrument_id,reading,value`
//!
//! Dates are `YYYY-MM-DD`, times `HH:MM:SS`. Empty `lat`/`lng` mean the row
//! has no position.

use crate::Database;
use chrono::NaiveTime;
use man_utils::dates::{format_date, parse_date};
use rusqlite::params;

/// Fill value the archive uses for readings that were not taken.
pub const MISSING_VALUE: f64 = -999.0;

impl Database {
    /// Load site metadata.
    ///
    /// # Example CSV
    /// ```text
    /// name,description
    /// Tara_Pacific,Tara Pacific expedition
    /// ```
    pub fn load_sites(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let name = r.get(0).unwrap_or("").trim();
            let description = r.get(1).unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }
            conn.execute(
                "INSERT OR REPLACE INTO sites (name, description) VALUES (?1, ?2)",
                params![name, description],
            )?;
            count += 1;
        }
        log::info!("loader: Loaded {} sites", count);
        Ok(())
    }

    /// Load measurements.
    ///
    /// Unknown sites are added with an empty description. Rows with a
    /// non-numeric value or the `-999` fill value are skipped; a bad date or
    /// time is an error.
    ///
    /// # Example CSV
    /// ```text
    /// site,filename,date,time,lat,lng,instrument_id,reading,value
    /// Tara_Pacific,Tara_Pacific_all_points.lev15,2018-06-03,23:10:00,21.3,-157.9,12,aod_500nm,0.62
    /// ```
    pub fn load_measurements(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let site = r.get(0).unwrap_or("").trim();
            let filename = r.get(1).unwrap_or("").trim();
            let reading = r.get(7).unwrap_or("").trim();
            let value: f64 = match r.get(8).unwrap_or("").trim().parse::<f64>() {
                Ok(v) if v != MISSING_VALUE => v,
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            if site.is_empty() || reading.is_empty() {
                skipped += 1;
                continue;
            }

            let date = parse_date(r.get(2).unwrap_or(""))?;
            let time = NaiveTime::parse_from_str(r.get(3).unwrap_or("").trim(), "%H:%M:%S")?;
            let lat: Option<f64> = r.get(4).and_then(|s| s.trim().parse().ok());
            let lng: Option<f64> = r.get(5).and_then(|s| s.trim().parse().ok());
            let instrument_id: i64 = r.get(6).unwrap_or("0").trim().parse().unwrap_or(0);

            conn.execute(
                "INSERT OR IGNORE INTO sites (name) VALUES (?1)",
                params![site],
            )?;
            conn.execute(
                "INSERT INTO measurements
                 (site, filename, date, time, lat, lng, instrument_id, reading, value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    site,
                    filename,
                    format_date(&date),
                    time.format("%H:%M:%S").to_string(),
                    lat,
                    lng,
                    instrument_id,
                    reading,
                    value
                ],
            )?;
            count += 1;
        }
        log::info!(
            "loader: Loaded {} measurements, skipped {} without a value",
            count,
            skipped
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn count(db: &Database, table: &str) -> i64 {
        db.conn
            .borrow()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn load_sites_with_headers() {
        let db = Database::new().unwrap();
        db.load_sites("name,description\nA,First\nB,Second\n").unwrap();
        assert_eq!(count(&db, "sites"), 2);
    }

    #[test]
    fn load_measurements_skips_fill_values() {
        let db = Database::new().unwrap();
        db.load_measurements(
            "site,filename,date,time,lat,lng,instrument_id,reading,value\n\
             A,a.lev15,2020-01-01,10:00:00,1.0,2.0,7,aod_500nm,0.1\n\
             A,a.lev15,2020-01-01,10:00:00,1.0,2.0,7,water_vapor,-999\n\
             A,a.lev15,2020-01-02,10:00:00,1.0,2.0,7,aod_500nm,n/a\n",
        )
        .unwrap();
        assert_eq!(count(&db, "measurements"), 1);
        // the site was created on the fly
        assert_eq!(count(&db, "sites"), 1);
    }

    #[test]
    fn load_measurements_keeps_missing_position() {
        let db = Database::new().unwrap();
        db.load_measurements(
            "site,filename,date,time,lat,lng,instrument_id,reading,value\n\
             A,a.lev15,2020-01-01,10:00:00,,,7,aod_500nm,0.1\n",
        )
        .unwrap();
        assert_eq!(count(&db, "measurements"), 1);
    }

    #[test]
    fn load_measurements_rejects_bad_date() {
        let db = Database::new().unwrap();
        let result = db.load_measurements(
            "site,filename,date,time,lat,lng,instrument_id,reading,value\n\
             A,a.lev15,01/02/2020,10:00:00,1,2,7,aod_500nm,0.1\n",
        );
        assert!(result.is_err());
    }
}
