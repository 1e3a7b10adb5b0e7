//! Command implementations for the MAN overlay CLI.
//!
//! Provides subcommands for listing sites, previewing the measurement
//! overlay as JSON, printing color legends and requesting bulk archives.

use clap::Subcommand;
use std::path::PathBuf;

pub mod download;
pub mod preview;
pub mod source;

use download::DownloadOptions;
use preview::FilterArgs;
use source::SourceArgs;

#[derive(Subcommand)]
pub enum Command {
    /// List sites matching the date and bounding box filters
    Sites {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Fetch, color and group measurements and print the render frame
    Overlay {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Highlight this site and draw its trace
        #[arg(long)]
        highlight: Option<String>,

        /// Overlay config file (JSON)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Print the color scale for a measurement type
    Legend {
        /// Measurement type, e.g. aod_500nm
        #[arg(long = "type", default_value = "aod_500nm")]
        measurement_type: String,

        /// Use the six-color ramp
        #[arg(long)]
        six_stop: bool,
    },

    /// Download the data archive for the selected sites
    Download {
        /// Base URL of the measurements API
        #[arg(long, env = "MAN_API_URL", default_value = "http://localhost:8000")]
        api_url: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Retrieval (AOD, SDA); repeat for several
        #[arg(long = "retrieval", default_value = "AOD")]
        retrievals: Vec<String>,

        /// Frequency (Point, Series, Daily); repeat for several
        #[arg(long = "frequency", default_value = "Daily")]
        frequencies: Vec<String>,

        /// Quality ("Level 1.0", "Level 1.5", "Level 2.0"); repeat for several
        #[arg(long = "quality", default_value = "Level 1.5")]
        qualities: Vec<String>,

        /// Directory to write the archive into
        #[arg(short = 'o', long, default_value = ".")]
        out_dir: PathBuf,

        /// Only list the files the archive would contain
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Sites { source, filter } => preview::run_sites(&source, &filter).await,
        Command::Overlay {
            source,
            filter,
            highlight,
            config,
        } => {
            preview::run_overlay(&source, &filter, config.as_ref(), highlight.as_deref()).await
        }
        Command::Legend {
            measurement_type,
            six_stop,
        } => preview::run_legend(&measurement_type, six_stop),
        Command::Download {
            api_url,
            filter,
            retrievals,
            frequencies,
            qualities,
            out_dir,
            dry_run,
        } => {
            let options = DownloadOptions {
                retrievals: &retrievals,
                frequencies: &frequencies,
                qualities: &qualities,
            };
            download::run_download(&api_url, &filter, &options, &out_dir, dry_run).await
        }
    }
}
