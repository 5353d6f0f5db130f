//! Catalog source: load the `{status, data, message}` envelope.
//!
//! The source is either an HTTP(S) endpoint or a local JSON file holding the
//! same envelope (handy for offline runs and fixtures). A non-`"success"`
//! status aborts the run here, before any item reaches the table builder.

use crate::error::CatalogError;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// The status value that marks a usable envelope.
pub const SUCCESS_STATUS: &str = "success";

/// The wire shape of a catalog API response.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CatalogEnvelope {
    /// Take the item list out of a verified envelope.
    pub fn into_items(self, source_name: &str) -> Result<Vec<Value>, CatalogError> {
        if self.status != SUCCESS_STATUS {
            return Err(CatalogError::ApiStatus {
                status: self.status,
                message: self.message,
            });
        }
        self.data.ok_or_else(|| CatalogError::MalformedResponse {
            source_name: source_name.to_string(),
            detail: "envelope has no 'data' array".into(),
        })
    }
}

/// Check if the source string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load catalog items from a URL or a local file.
pub async fn load_items(source: &str, timeout_secs: u64) -> Result<Vec<Value>, CatalogError> {
    if is_url(source) {
        fetch_url(source, timeout_secs).await
    } else {
        read_local(source).await
    }
}

/// Parse envelope bytes and return the verified item list.
pub fn parse_envelope(bytes: &[u8], source_name: &str) -> Result<Vec<Value>, CatalogError> {
    let envelope: CatalogEnvelope =
        serde_json::from_slice(bytes).map_err(|e| CatalogError::MalformedResponse {
            source_name: source_name.to_string(),
            detail: e.to_string(),
        })?;
    let items = envelope.into_items(source_name)?;
    debug!("{} items in envelope from {}", items.len(), source_name);
    Ok(items)
}

async fn read_local(path_str: &str) -> Result<Vec<Value>, CatalogError> {
    if path_str.trim().is_empty() {
        return Err(CatalogError::InvalidSource {
            input: path_str.to_string(),
        });
    }
    let path = PathBuf::from(path_str);
    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::SourceNotFound { path });
        }
        Err(_) => {
            return Err(CatalogError::InvalidSource {
                input: path_str.to_string(),
            });
        }
    };
    info!("Read catalog from {}", path.display());
    parse_envelope(&bytes, path_str)
}

async fn fetch_url(url: &str, timeout_secs: u64) -> Result<Vec<Value>, CatalogError> {
    info!("Fetching catalog from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CatalogError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_error = |e: reqwest::Error| {
        if e.is_timeout() {
            CatalogError::FetchTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            CatalogError::FetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_error)?;

    if !response.status().is_success() {
        return Err(CatalogError::FetchFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_error)?;
    info!("Fetched {} bytes of catalog JSON", bytes.len());
    parse_envelope(&bytes, url)
}
