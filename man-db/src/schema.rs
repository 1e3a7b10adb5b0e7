//! SQL schema for the in-memory measurement store.
//!
//! One row per (measurement, reading type). Site spans are not stored; they
//! are derived from the measurement dates at query time.

/// Returns the full SQL schema as a single batch string.
///
/// - `sites` - site name and free-text description
/// - `measurements` - one reading of one type at a time and place; `lat`
///   and `lng` are NULL when the source row had no position
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS sites (
        name TEXT PRIMARY KEY,
        description TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS measurements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        site TEXT NOT NULL,
        filename TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        lat REAL,
        lng REAL,
        instrument_id INTEGER NOT NULL DEFAULT 0,
        reading TEXT NOT NULL,
        value REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_meas_site ON measurements(site);
    CREATE INDEX IF NOT EXISTS idx_meas_reading_date ON measurements(reading, date);
    "#
}
