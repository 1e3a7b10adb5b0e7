/// Error types for the measurement overlay
use thiserror::Error;

/// Main error type for overlay operations.
///
/// None of these are fatal: a failed fetch degrades to "no markers shown"
/// plus a notice, and an invalid filter edit is rejected before it reaches
/// the data service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// Fetch or download failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload did not parse into the expected record shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Filter edit rejected (e.g. end date before start date)
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Color domain is empty or not strictly increasing
    #[error("Invalid color domain: {0}")]
    InvalidDomain(String),
}

impl OverlayError {
    /// Whether this error means the fetch produced no usable data.
    ///
    /// Malformed payloads are handled exactly like transport failures.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            OverlayError::Transport(_) | OverlayError::MalformedResponse(_)
        )
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        OverlayError::MalformedResponse(e.to_string())
    }
}

#[cfg(feature = "api")]
impl From<reqwest::Error> for OverlayError {
    fn from(e: reqwest::Error) -> Self {
        OverlayError::Transport(e.to_string())
    }
}

/// Type alias for Results using OverlayError
pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::OverlayError;

    #[test]
    fn malformed_payload_counts_as_fetch_failure() {
        let err: OverlayError = serde_json::from_str::<Vec<u32>>("{").unwrap_err().into();
        assert!(matches!(err, OverlayError::MalformedResponse(_)));
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn invalid_filter_is_not_a_fetch_failure() {
        let err = OverlayError::InvalidFilter("end before start".into());
        assert!(!err.is_fetch_failure());
        assert_eq!(err.to_string(), "Invalid filter: end before start");
    }
}
