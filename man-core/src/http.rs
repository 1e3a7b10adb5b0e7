use crate::download::{content_disposition_filename, DownloadRequest};
use crate::error::{OverlayError, Result};
use crate::measurement::Measurement;
use crate::query::{MeasurementQuery, SiteQuery};
use crate::service::DataService;
use crate::site::Site;
use log::{info, warn};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const SITES_PATH: &str = "/maritimeapp/measurements/sites/";
pub const MEASUREMENTS_PATH: &str = "/maritimeapp/measurements/";
pub const DOWNLOAD_PATH: &str = "/maritimeapp/download/";

/// A fetched archive and the name the server gave it.
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// [`DataService`] backed by the maritime measurements HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDataService {
    client: Client,
    base_url: String,
}

impl HttpDataService {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_text(&self, path: &str, params: &[(&'static str, String)]) -> Result<String> {
        let url = self.url(path);
        let response = self.client.get(&url).query(params).send().await?;
        if response.status() != StatusCode::OK {
            warn!("Bad response status for {}: {}", url, response.status());
            return Err(OverlayError::Transport(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }

    /// Request a bulk archive.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadedArchive> {
        let url = self.url(DOWNLOAD_PATH);
        let response = self
            .client
            .get(&url)
            .query(&request.to_params())
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            warn!("Bad response status for {}: {}", url, response.status());
            return Err(OverlayError::Transport(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        let filename = content_disposition_filename(
            response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = response.bytes().await?.to_vec();
        info!("Downloaded {} ({} bytes)", filename, bytes.len());
        Ok(DownloadedArchive { filename, bytes })
    }
}

impl DataService for HttpDataService {
    async fn list_sites(&self, query: &SiteQuery) -> Result<Vec<Site>> {
        let body = self.get_text(SITES_PATH, &query.to_params()).await?;
        let sites = Site::parse_response(&body)?;
        info!("Fetched {} sites", sites.len());
        Ok(sites)
    }

    async fn list_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>> {
        let body = self.get_text(MEASUREMENTS_PATH, &query.to_params()).await?;
        let measurements = Measurement::parse_response(&body)?;
        info!(
            "Fetched {} {} measurements",
            measurements.len(),
            query.reading
        );
        Ok(measurements)
    }
}
