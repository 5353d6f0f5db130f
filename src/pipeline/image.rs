//! Product images: URL extraction, download, validation and fallback.
//!
//! Every image cell ends up as either a [`Block::Image`] or a fallback
//! paragraph. Failures never propagate: they are logged, counted and
//! rendered as "No Image" / "Image failed to load".
//!
//! Downloaded bytes live in an [`ImageCache`], a temporary directory owned by
//! exactly one run. It is removed when the cache is dropped, so cleanup also
//! happens when the run returns an error or panics.

use crate::document::{Align, Block, ImageBlock, TextStyle};
use crate::error::{CatalogError, ImageError, NO_IMAGE};
use image::DynamicImage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Keys tried, in order, when an image entry is an object.
pub const IMAGE_URL_KEYS: &[&str] = &["product_image", "product_image_md", "image", "src", "url"];

/// Embedded pixels per point of display size.
const PIXELS_PER_POINT: f32 = 4.0;

static RE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([A-Za-z0-9]{1,4})(?:[?#].*)?$").unwrap());

/// Pick the image URL out of a resolved `images` value.
///
/// * array → first element; an object element is searched with
///   [`IMAGE_URL_KEYS`], a string element is used as is
/// * string → used as is
/// * anything else → no URL
pub fn extract_image_url(images: Option<&Value>) -> Option<String> {
    match images? {
        Value::Array(entries) => match entries.first()? {
            Value::String(url) => non_empty(url),
            Value::Object(map) => IMAGE_URL_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(|v| v.as_str().and_then(non_empty)),
            _ => None,
        },
        Value::String(url) => non_empty(url),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ── Cache ────────────────────────────────────────────────────────────────

/// Run-scoped store for downloaded image bytes and failed URLs.
pub struct ImageCache {
    dir: TempDir,
    entries: HashMap<String, PathBuf>,
    failures: HashMap<String, ImageError>,
}

impl ImageCache {
    /// Create a fresh temporary directory for one run.
    pub fn new() -> Result<Self, CatalogError> {
        let dir = tempfile::Builder::new()
            .prefix("catalog2pdf-images-")
            .tempdir()
            .map_err(|e| CatalogError::Internal(format!("image cache: {e}")))?;
        debug!("Image cache at {}", dir.path().display());
        Ok(Self {
            dir,
            entries: HashMap::new(),
            failures: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Number of cached downloads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes previously stored for `url`.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.entries.get(url)?;
        std::fs::read(path).ok()
    }

    /// Persist `bytes` for `url`, returning the file path.
    pub fn store(&mut self, url: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let name = format!("img_{:04}.{}", self.entries.len(), file_extension(url));
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes)?;
        self.entries.insert(url.to_string(), path.clone());
        Ok(path)
    }

    /// Remember that `url` could not be fetched, so later cells reuse the error.
    pub fn record_failure(&mut self, url: &str, error: ImageError) {
        self.failures.insert(url.to_string(), error);
    }

    /// Error previously recorded for `url`.
    pub fn failure(&self, url: &str) -> Option<&ImageError> {
        self.failures.get(url)
    }

    /// Delete the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<(), CatalogError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| CatalogError::Internal(format!("removing {}: {e}", path.display())))
    }
}

/// File extension taken from the URL path, `jpg` when absent or implausible.
fn file_extension(url: &str) -> String {
    RE_EXTENSION
        .captures(url)
        .map(|c| c[1].to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}

// ── Fetcher ──────────────────────────────────────────────────────────────

/// Outcome of one image cell.
#[derive(Debug)]
pub struct FetchedImage {
    pub block: Block,
    /// Why the cell fell back, if it did.
    pub error: Option<ImageError>,
    /// Bytes came from the cache rather than the network.
    pub cache_hit: bool,
}

/// Downloads images one at a time with a fixed timeout and no retries.
pub struct ImageFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    display_size: f32,
}

impl ImageFetcher {
    pub fn new(timeout_secs: u64, display_size: f32) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CatalogError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs,
            display_size,
        })
    }

    /// Produce the image cell for `url`.
    ///
    /// A missing or non-HTTP URL falls back without touching the network.
    /// A URL that already failed once in this run is not requested again.
    pub async fn fetch(&self, url: Option<&str>, cache: &mut ImageCache) -> FetchedImage {
        let Some(url) = url else {
            return FetchedImage {
                block: fallback(NO_IMAGE),
                error: None,
                cache_hit: false,
            };
        };

        if let Some(e) = cache.failure(url) {
            debug!("Known bad image {}", url);
            return FetchedImage {
                block: fallback(e.fallback_text()),
                error: Some(e.clone()),
                cache_hit: true,
            };
        }

        let (result, cache_hit) = match cache.get(url) {
            Some(bytes) => (self.decode(url, &bytes), true),
            None => (self.download(url, cache).await, false),
        };
        if let Err(ref e) = result {
            cache.record_failure(url, e.clone());
        }

        match result {
            Ok(block) => FetchedImage {
                block: Block::Image(block),
                error: None,
                cache_hit,
            },
            Err(e) => {
                warn!("Image fallback: {}", e);
                FetchedImage {
                    block: fallback(e.fallback_text()),
                    error: Some(e),
                    cache_hit,
                }
            }
        }
    }

    async fn download(&self, url: &str, cache: &mut ImageCache) -> Result<ImageBlock, ImageError> {
        if !is_http_url(url) {
            return Err(ImageError::UnsupportedUrl {
                url: url.to_string(),
            });
        }

        debug!("Downloading image {}", url);
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                ImageError::Timeout {
                    url: url.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                ImageError::RequestFailed {
                    url: url.to_string(),
                    detail: e.to_string(),
                }
            }
        };

        let response = self.client.get(url).send().await.map_err(map_err)?;
        if !response.status().is_success() {
            return Err(ImageError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(map_err)?;
        if bytes.is_empty() {
            return Err(ImageError::EmptyBody {
                url: url.to_string(),
            });
        }

        if let Err(e) = cache.store(url, &bytes) {
            // Non-fatal: decoding below works from memory.
            warn!("Could not cache image {}: {}", url, e);
        }

        self.decode(url, &bytes)
    }

    fn decode(&self, url: &str, bytes: &[u8]) -> Result<ImageBlock, ImageError> {
        let img = image::load_from_memory(bytes).map_err(|e| ImageError::Undecodable {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
        Ok(self.fit(url, img))
    }

    /// Down-sample and fit into the square display footprint.
    fn fit(&self, url: &str, img: DynamicImage) -> ImageBlock {
        let max_px = (self.display_size * PIXELS_PER_POINT).round() as u32;
        let img = if img.width() > max_px || img.height() > max_px {
            img.thumbnail(max_px, max_px)
        } else {
            img
        };
        let rgb = img.to_rgb8();
        let (pw, ph) = rgb.dimensions();

        let scale = self.display_size / pw.max(ph).max(1) as f32;
        debug!("Decoded {} → {}x{} px", url, pw, ph);

        ImageBlock {
            source: url.to_string(),
            pixel_width: pw,
            pixel_height: ph,
            rgb: rgb.into_raw(),
            width: pw as f32 * scale,
            height: ph as f32 * scale,
            align: Align::Center,
        }
    }
}

fn fallback(text: &str) -> Block {
    Block::paragraph(text, TextStyle::Fallback)
}
