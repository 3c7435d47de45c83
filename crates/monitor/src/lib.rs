//! One-shot keyword alarm: fetch the board catalog, count the keyword, and
//! alert through the configured channels when the threshold is reached.

pub mod channels;
pub mod error;
pub mod fetcher;
pub mod runner;

pub use error::MonitorError;
pub use fetcher::CatalogFetcher;
pub use runner::{Outcome, Runner};
