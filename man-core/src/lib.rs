pub mod bbox;
pub mod download;
pub mod error;
pub mod filter;
#[cfg(feature = "api")]
pub mod http;
pub mod measurement;
pub mod query;
pub mod service;
pub mod site;
