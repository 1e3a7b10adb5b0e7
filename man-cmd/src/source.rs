//! Where commands read sites and measurements from.

use clap::Args;
use man_core::error::Result;
use man_core::http::HttpDataService;
use man_core::measurement::Measurement;
use man_core::query::{MeasurementQuery, SiteQuery};
use man_core::service::DataService;
use man_core::site::Site;
use man_db::Database;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Base URL of the measurements API
    #[arg(long, env = "MAN_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Local site CSV (name,description); used with --measurements-csv
    #[arg(long)]
    pub sites_csv: Option<PathBuf>,

    /// Local measurements CSV; when set, the API is not contacted
    #[arg(long)]
    pub measurements_csv: Option<PathBuf>,
}

/// A data service chosen from the command line.
pub enum Source {
    Http(HttpDataService),
    Local(Database),
}

impl SourceArgs {
    pub fn open(&self) -> anyhow::Result<Source> {
        let Some(measurements_csv) = &self.measurements_csv else {
            log::info!("Using measurements API at {}", self.api_url);
            return Ok(Source::Http(HttpDataService::new(&self.api_url)?));
        };

        let db = Database::new()?;
        if let Some(sites_csv) = &self.sites_csv {
            db.load_sites(&std::fs::read_to_string(sites_csv)?)?;
        }
        db.load_measurements(&std::fs::read_to_string(measurements_csv)?)?;
        log::info!("Using local data from {}", measurements_csv.display());
        Ok(Source::Local(db))
    }
}

impl DataService for Source {
    async fn list_sites(&self, query: &SiteQuery) -> Result<Vec<Site>> {
        match self {
            Source::Http(service) => service.list_sites(query).await,
            Source::Local(db) => db.list_sites(query).await,
        }
    }

    async fn list_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>> {
        match self {
            Source::Http(service) => service.list_measurements(query).await,
            Source::Local(db) => db.list_measurements(query).await,
        }
    }
}
