//! Bulk archive requests.
//!
//! A download uses the same filter shape as the overlay plus three option
//! sets. The backend packages one file per (retrieval, site, frequency,
//! quality) combination that exists.

use crate::error::{OverlayError, Result};
use crate::filter::FilterState;
use crate::query::SiteQuery;
use chrono::NaiveDate;
use man_utils::dates::earliest_start_date;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Filename used when the response carries no usable `Content-Disposition`.
pub const FALLBACK_FILENAME: &str = "downloaded_file.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Retrieval {
    Aod,
    Sda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Frequency {
    Point,
    Series,
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Quality {
    Level10,
    Level15,
    Level20,
}

impl Retrieval {
    pub fn label(&self) -> &'static str {
        match self {
            Retrieval::Aod => "AOD",
            Retrieval::Sda => "SDA",
        }
    }
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Point => "Point",
            Frequency::Series => "Series",
            Frequency::Daily => "Daily",
        }
    }

    /// File name prefix the archive uses for this frequency.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Frequency::Point => "all_points",
            Frequency::Series => "series",
            Frequency::Daily => "daily",
        }
    }
}

impl Quality {
    pub fn label(&self) -> &'static str {
        match self {
            Quality::Level10 => "Level 1.0",
            Quality::Level15 => "Level 1.5",
            Quality::Level20 => "Level 2.0",
        }
    }

    /// File extension for a retrieval at this quality level.
    pub fn file_ending(&self, retrieval: Retrieval) -> &'static str {
        match (retrieval, self) {
            (Retrieval::Aod, Quality::Level10) => "lev10",
            (Retrieval::Aod, Quality::Level15) => "lev15",
            (Retrieval::Aod, Quality::Level20) => "lev20",
            (Retrieval::Sda, Quality::Level10) => "ONEILL_10",
            (Retrieval::Sda, Quality::Level15) => "ONEILL_15",
            (Retrieval::Sda, Quality::Level20) => "ONEILL_20",
        }
    }

    /// Level 1.0 is only published as point data.
    pub fn available_for(&self, frequency: Frequency) -> bool {
        !matches!(
            (self, frequency),
            (Quality::Level10, Frequency::Series) | (Quality::Level10, Frequency::Daily)
        )
    }
}

macro_rules! label_display_and_parse {
    ($ty:ty, $what:literal, [$($variant:expr),+]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = OverlayError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        OverlayError::InvalidFilter(format!("unknown {} '{}'", $what, s))
                    })
            }
        }
    };
}

label_display_and_parse!(Retrieval, "retrieval", [Retrieval::Aod, Retrieval::Sda]);
label_display_and_parse!(
    Frequency,
    "frequency",
    [Frequency::Point, Frequency::Series, Frequency::Daily]
);
label_display_and_parse!(
    Quality,
    "quality",
    [Quality::Level10, Quality::Level15, Quality::Level20]
);

/// Everything the download endpoint needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRequest {
    pub filter: SiteQuery,
    pub sites: Vec<String>,
    pub retrievals: Vec<Retrieval>,
    pub frequencies: Vec<Frequency>,
    pub qualities: Vec<Quality>,
}

impl DownloadRequest {
    pub fn from_filter(
        filter: &FilterState,
        retrievals: Vec<Retrieval>,
        frequencies: Vec<Frequency>,
        qualities: Vec<Quality>,
    ) -> Self {
        Self {
            filter: SiteQuery::from_filter(filter),
            sites: filter.selected_sites.iter().cloned().collect(),
            retrievals,
            frequencies,
            qualities,
        }
    }

    /// Drop dates that only restate the archive bounds: a start on the
    /// first archive day or an end on `today` constrain nothing.
    pub fn without_default_dates(mut self, today: NaiveDate) -> Self {
        if self.filter.start_date == Some(earliest_start_date()) {
            self.filter.start_date = None;
        }
        if self.filter.end_date == Some(today) {
            self.filter.end_date = None;
        }
        self
    }

    /// Query pairs, array options repeated under `name[]` keys.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.filter.to_params();
        params.extend(self.sites.iter().map(|s| ("sites[]", s.clone())));
        params.extend(self.retrievals.iter().map(|r| ("retrievals[]", r.to_string())));
        params.extend(self.frequencies.iter().map(|f| ("frequency[]", f.to_string())));
        params.extend(self.qualities.iter().map(|q| ("quality[]", q.to_string())));
        params
    }

    /// Names of the archive members this request can produce.
    pub fn file_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for retrieval in &self.retrievals {
            for site in &self.sites {
                for frequency in &self.frequencies {
                    for quality in &self.qualities {
                        if !quality.available_for(*frequency) {
                            continue;
                        }
                        names.push(format!(
                            "{}_{}.{}",
                            site,
                            frequency.file_prefix(),
                            quality.file_ending(*retrieval)
                        ));
                    }
                }
            }
        }
        names
    }
}

/// Pull the `filename=` token out of a `Content-Disposition` header value.
pub fn content_disposition_filename(header: Option<&str>) -> String {
    header
        .and_then(|value| {
            value
                .split(';')
                .map(str::trim)
                .find_map(|part| part.strip_prefix("filename="))
        })
        .map(|name| name.trim().trim_matches('"'))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}
