use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named sampling location (for shipborne data, a cruise).
///
/// The site list is replaced wholesale on each refresh; sites are never
/// edited field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    /// Unique key.
    pub name: String,
    /// First and last measurement dates, absent for sites with no data.
    pub span: Option<(NaiveDate, NaiveDate)>,
}

/// Site entry as returned by the sites endpoint.
///
/// `span_date` may be null, and either bound inside it may be null when the
/// site has no measurements yet.
#[derive(Debug, Clone, Deserialize)]
struct SiteRecord {
    name: String,
    #[serde(default)]
    span_date: Option<Vec<Option<NaiveDate>>>,
}

impl From<SiteRecord> for Site {
    fn from(record: SiteRecord) -> Self {
        let span = match record.span_date.as_deref() {
            Some([Some(start), Some(end)]) => Some((*start, *end)),
            _ => None,
        };
        Site {
            name: record.name,
            span,
        }
    }
}

impl Site {
    pub fn new(name: impl Into<String>, span: Option<(NaiveDate, NaiveDate)>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Parse a sites response body in server order.
    pub fn parse_response(body: &str) -> Result<Vec<Site>> {
        let records: Vec<SiteRecord> = serde_json::from_str(body)?;
        Ok(records.into_iter().map(Site::from).collect())
    }
}
