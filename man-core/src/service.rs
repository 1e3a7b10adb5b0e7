use crate::error::Result;
use crate::measurement::Measurement;
use crate::query::{MeasurementQuery, SiteQuery};
use crate::site::Site;

/// The backend the overlay reads from.
///
/// Implementations are used from a single-threaded event loop, so the
/// futures are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait DataService {
    /// Sites whose span and position match the query.
    async fn list_sites(&self, query: &SiteQuery) -> Result<Vec<Site>>;

    /// Measurements of one reading type, in backend order.
    async fn list_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>>;
}
