//! Error types for the catalog2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CatalogError`]: **Fatal**: the run cannot proceed at all (catalog
//!   API unreachable, non-success envelope, invalid column mapping, output
//!   not writable). Returned as `Err(CatalogError)` from the top-level
//!   `generate*` functions.
//!
//! * [`ImageError`]: **Non-fatal**: a single product image could not be
//!   fetched or decoded. The row still renders, with a visible fallback text
//!   in the image cell, and the run continues.

use std::path::PathBuf;
use thiserror::Error;

/// Text shown in an image cell when no image could be fetched.
pub const NO_IMAGE: &str = "No Image";

/// Text shown in an image cell when bytes arrived but were not an image.
pub const IMAGE_FAILED: &str = "Image failed to load";

/// All fatal errors returned by the catalog2pdf library.
///
/// Per-item image failures use [`ImageError`] and are rendered into the
/// document rather than propagated here.
#[derive(Debug, Error)]
pub enum CatalogError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// The source string is neither an HTTP(S) URL nor an existing file.
    #[error("Invalid catalog source '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidSource { input: String },

    /// Local catalog file was not found.
    #[error("Catalog file not found: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// The catalog API request failed.
    #[error("Failed to fetch catalog from '{url}': {reason}\nCheck your internet connection.")]
    FetchFailed { url: String, reason: String },

    /// The catalog API request exceeded the configured timeout.
    #[error("Catalog request timed out after {secs}s for '{url}'\nIncrease --api-timeout.")]
    FetchTimeout { url: String, secs: u64 },

    /// The API answered, but its envelope status was not `"success"`.
    #[error("Catalog API reported status '{status}'{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    ApiStatus {
        status: String,
        message: Option<String>,
    },

    /// The response body was not the expected `{status, data: [...]}` shape.
    #[error("Malformed catalog response from '{source_name}': {detail}")]
    MalformedResponse { source_name: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An extra-column descriptor is missing its header or its path.
    #[error("Invalid column descriptor '{descriptor}': {reason}")]
    InvalidColumn { descriptor: String, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The document writer could not serialise the document.
    #[error("Failed to write document: {0}")]
    WriteFailed(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single product image.
///
/// Logged and reported through the progress callback, then downgraded to a
/// fallback text cell via [`ImageError::fallback_text`].
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// The URL does not use the `http` or `https` scheme.
    #[error("unsupported image URL '{url}'")]
    UnsupportedUrl { url: String },

    /// Connection, DNS or body-read failure.
    #[error("request for '{url}' failed: {detail}")]
    RequestFailed { url: String, detail: String },

    /// The request did not finish within the image timeout.
    #[error("request for '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The server answered with a non-2xx status.
    #[error("'{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The server answered 2xx with an empty body.
    #[error("'{url}' returned an empty body")]
    EmptyBody { url: String },

    /// Bytes were retrieved but are not a decodable image.
    #[error("'{url}' is not a decodable image: {detail}")]
    Undecodable { url: String, detail: String },
}

impl ImageError {
    /// The text rendered in place of the image.
    pub fn fallback_text(&self) -> &'static str {
        match self {
            ImageError::Undecodable { .. } => IMAGE_FAILED,
            _ => NO_IMAGE,
        }
    }

    /// The URL that failed.
    pub fn url(&self) -> &str {
        match self {
            ImageError::UnsupportedUrl { url }
            | ImageError::RequestFailed { url, .. }
            | ImageError::Timeout { url, .. }
            | ImageError::HttpStatus { url, .. }
            | ImageError::EmptyBody { url }
            | ImageError::Undecodable { url, .. } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_display_with_message() {
        let e = CatalogError::ApiStatus {
            status: "error".into(),
            message: Some("database offline".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("'error'"), "got: {msg}");
        assert!(msg.contains("database offline"), "got: {msg}");
    }

    #[test]
    fn api_status_display_without_message() {
        let e = CatalogError::ApiStatus {
            status: "failed".into(),
            message: None,
        };
        assert_eq!(e.to_string(), "Catalog API reported status 'failed'");
    }

    #[test]
    fn fetch_timeout_display() {
        let e = CatalogError::FetchTimeout {
            url: "https://example.com/items".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("example.com"));
    }

    #[test]
    fn undecodable_falls_back_to_failed_to_load() {
        let e = ImageError::Undecodable {
            url: "http://x/y.png".into(),
            detail: "bad header".into(),
        };
        assert_eq!(e.fallback_text(), IMAGE_FAILED);
        assert_eq!(e.url(), "http://x/y.png");
    }

    #[test]
    fn transport_failures_fall_back_to_no_image() {
        let errors = [
            ImageError::UnsupportedUrl { url: "ftp://x".into() },
            ImageError::RequestFailed {
                url: "http://x".into(),
                detail: "dns".into(),
            },
            ImageError::Timeout {
                url: "http://x".into(),
                secs: 5,
            },
            ImageError::HttpStatus {
                url: "http://x".into(),
                status: 404,
            },
            ImageError::EmptyBody { url: "http://x".into() },
        ];
        for e in errors {
            assert_eq!(e.fallback_text(), NO_IMAGE, "{e}");
        }
    }
}
