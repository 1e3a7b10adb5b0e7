//! Bulk archive download.

use crate::preview::FilterArgs;
use man_core::download::{DownloadRequest, Frequency, Quality, Retrieval};
use man_core::filter::FilterTracker;
use man_core::http::HttpDataService;
use man_utils::dates::today;
use std::path::Path;

pub struct DownloadOptions<'a> {
    pub retrievals: &'a [String],
    pub frequencies: &'a [String],
    pub qualities: &'a [String],
}

fn parse_all<T>(labels: &[String]) -> anyhow::Result<Vec<T>>
where
    T: std::str::FromStr<Err = man_core::error::OverlayError>,
{
    Ok(labels
        .iter()
        .map(|label| label.parse::<T>())
        .collect::<Result<Vec<_>, _>>()?)
}

pub fn build_request(
    filter: &FilterArgs,
    options: &DownloadOptions<'_>,
) -> anyhow::Result<DownloadRequest> {
    let mut tracker = FilterTracker::default();
    filter.apply(&mut tracker)?;
    let request = DownloadRequest::from_filter(
        tracker.state(),
        parse_all::<Retrieval>(options.retrievals)?,
        parse_all::<Frequency>(options.frequencies)?,
        parse_all::<Quality>(options.qualities)?,
    );
    Ok(request.without_default_dates(today()))
}

pub async fn run_download(
    api_url: &str,
    filter: &FilterArgs,
    options: &DownloadOptions<'_>,
    out_dir: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let request = build_request(filter, options)?;
    if request.sites.is_empty() {
        anyhow::bail!("Select at least one site with --site");
    }

    if dry_run {
        for name in request.file_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let service = HttpDataService::new(api_url)?;
    let archive = service.download(&request).await?;
    let path = out_dir.join(&archive.filename);
    std::fs::write(&path, &archive.bytes)?;
    log::info!("Wrote {} bytes to {}", archive.bytes.len(), path.display());
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn build_request_parses_option_labels() {
        let filter = FilterArgs {
            sites: strings(&["Tara"]),
            ..FilterArgs::default()
        };
        let retrievals = strings(&["SDA"]);
        let frequencies = strings(&["Series"]);
        let qualities = strings(&["Level 1.5", "Level 2.0"]);
        let request = build_request(
            &filter,
            &DownloadOptions {
                retrievals: &retrievals,
                frequencies: &frequencies,
                qualities: &qualities,
            },
        )
        .unwrap();
        assert_eq!(
            request.file_names(),
            vec!["Tara_series.ONEILL_15", "Tara_series.ONEILL_20"]
        );
    }

    #[test]
    fn build_request_rejects_unknown_quality() {
        let qualities = strings(&["Level 3.0"]);
        let result = build_request(
            &FilterArgs::default(),
            &DownloadOptions {
                retrievals: &[],
                frequencies: &[],
                qualities: &qualities,
            },
        );
        assert!(result.is_err());
    }
}
