//! # catalog2pdf
//!
//! Turn a JSON product catalog into a grouped, paginated PDF.
//!
//! A catalog API answers with an envelope `{status, data: [item, …]}` whose
//! items have no fixed shape. A [`FieldMapping`] names, by dotted path,
//! which values become the group key, product name, description, image and
//! any extra columns. Items are bucketed by group in first-seen order and
//! each group becomes a headed table; HTML descriptions are flattened into
//! bullet lists and product images are downloaded and embedded, with a text
//! fallback when an image is missing or broken.
//!
//! ## Pipeline Overview
//!
//! ```text
//! envelope (URL or .json file)
//!  │
//!  ├─ 1. Source    fetch + verify status == "success"
//!  ├─ 2. Group     bucket items by the group path, first-seen order
//!  ├─ 3. Rows      resolve paths, normalise HTML, fetch images (sequential)
//!  ├─ 4. Assemble  title, subtitle, sections, footer
//!  └─ 5. Write     paginated PDF via lopdf (spawn_blocking)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog2pdf::{generate_to_file, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GenerationConfig::default();
//!     let stats = generate_to_file("https://api.example.com/products", "catalog.pdf", &config).await?;
//!     eprintln!("{} items, {} image fallbacks", stats.total_items, stats.image_fallbacks);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `catalog2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! catalog2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod progress;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ColumnHeaders, ColumnWidths, ExtraColumn, FieldMapping, GenerationConfig,
    GenerationConfigBuilder, PageSize, Rgb, Theme,
};
pub use document::{Block, Document, GenerationOutput, GenerationStats, TableBlock};
pub use error::{CatalogError, ImageError};
pub use generate::{generate, generate_from_items, generate_sync, generate_to_file};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use writer::{DocumentWriter, PdfWriter};
