//! In-memory SQLite measurement store.
//!
//! Loads sites and measurements from CSV into an in-memory SQLite database
//! and answers site and measurement queries with the same filter semantics
//! as the maritime measurements API. [`Database`] implements
//! [`DataService`], so the overlay can run against local files instead of
//! the HTTP backend.
//!
//! # Usage
//!
//! ```rust
//! use man_db::Database;
//! use man_core::query::SiteQuery;
//!
//! let db = Database::new().unwrap();
//! db.load_measurements(
//!     "site,filename,date,time,lat,lng,instrument_id,reading,value\n\
//!      Tara,t.lev15,2018-06-03,23:10:00,21.3,-157.9,2,aod_500nm,0.62\n",
//! )
//! .unwrap();
//! let today = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let sites = db.query_sites(&SiteQuery::default(), today).unwrap();
//! assert_eq!(sites.len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;

pub use loader::MISSING_VALUE;

use man_core::error::{OverlayError, Result};
use man_core::measurement::Measurement;
use man_core::query::{MeasurementQuery, SiteQuery};
use man_core::service::DataService;
use man_core::site::Site;
use man_utils::dates::today;
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database of sites and measurements.
///
/// Cheaply cloneable; clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

impl DataService for Database {
    async fn list_sites(&self, query: &SiteQuery) -> Result<Vec<Site>> {
        self.query_sites(query, today())
            .map_err(|e| OverlayError::Transport(e.to_string()))
    }

    async fn list_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>> {
        self.query_measurements(query)
            .map_err(|e| OverlayError::Transport(e.to_string()))
    }
}
