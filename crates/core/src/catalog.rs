//! Board catalog snapshot as served by the upstream JSON endpoint.
//!
//! The endpoint returns a top-level array of pages, each carrying a
//! `threads` array. Only the text fields used for keyword counting are
//! modelled; every other field is ignored during deserialization.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ordered sequence of catalog pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub pages: Vec<Page>,
}

/// One catalog page. A page without a `threads` key is treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default)]
    pub threads: Vec<Thread>,
}

/// One discussion thread. Subject and body may be absent or `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<u64>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub com: Option<String>,
}

impl Thread {
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("")
    }

    pub fn body(&self) -> &str {
        self.com.as_deref().unwrap_or("")
    }
}

impl Catalog {
    /// Parse a catalog document from raw JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Iterate threads in page order, then thread order.
    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.pages.iter().flat_map(|p| p.threads.iter())
    }

    pub fn thread_count(&self) -> usize {
        self.pages.iter().map(|p| p.threads.len()).sum()
    }

    /// Subject then body of every thread, missing fields as empty strings.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.threads().flat_map(|t| [t.subject(), t.body()])
    }
}
