//! Catalog download.
//!
//! A single GET with an identifying User-Agent and a bounded timeout. Any
//! network error, non-2xx status or malformed body aborts the run; there is
//! no retry.

use std::time::Duration;

use boardwatch_core::config::SourceConfig;
use boardwatch_core::Catalog;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{MonitorError, Result};

pub struct CatalogFetcher {
    client: Client,
    url: Url,
    user_agent: String,
}

impl CatalogFetcher {
    pub fn new(source: &SourceConfig) -> Result<Self> {
        let url = Url::parse(&source.catalog_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(source.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url,
            user_agent: source.user_agent.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Board label for messages, e.g. `/pol/` for `.../pol/catalog.json`.
    pub fn board_label(&self) -> String {
        board_label(&self.url)
    }

    pub async fn fetch(&self) -> Result<Catalog> {
        let start = std::time::Instant::now();
        let response = self
            .client
            .get(self.url.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let catalog = Catalog::from_json(&bytes)?;
        debug!(
            url = %self.url,
            bytes = bytes.len(),
            pages = catalog.pages.len(),
            threads = catalog.thread_count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "catalog fetched"
        );
        Ok(catalog)
    }
}

/// First path segment wrapped in slashes, falling back to the host.
pub fn board_label(url: &Url) -> String {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    match segments.as_slice() {
        // A bare `/catalog.json` has no board segment.
        [board, _, ..] => format!("/{board}/"),
        _ => url.host_str().unwrap_or(url.as_str()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> String {
        board_label(&Url::parse(s).unwrap())
    }

    #[test]
    fn board_label_from_path() {
        assert_eq!(label("https://a.4cdn.org/pol/catalog.json"), "/pol/");
        assert_eq!(label("https://a.4cdn.org/g/catalog.json"), "/g/");
    }

    #[test]
    fn board_label_falls_back_to_host() {
        assert_eq!(label("https://boards.example/catalog.json"), "boards.example");
        assert_eq!(label("https://boards.example/"), "boards.example");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let source = SourceConfig {
            catalog_url: "not a url".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(CatalogFetcher::new(&source), Err(MonitorError::Url(_))));
    }
}
