//! Document writers.
//!
//! The pipeline produces a writer-agnostic [`Document`]; a
//! [`DocumentWriter`] turns it into bytes. [`PdfWriter`] is the only
//! backend.

pub mod metrics;
pub mod pdf;

pub use pdf::PdfWriter;

use crate::config::Theme;
use crate::document::Document;
use crate::error::CatalogError;

/// Renders an assembled [`Document`].
///
/// Writers are synchronous and CPU-bound; async callers should run them on
/// a blocking thread.
pub trait DocumentWriter: Send + Sync {
    /// Lay out `document` with `theme`'s colours and return the encoded file.
    fn write(&self, document: &Document, theme: &Theme) -> Result<Vec<u8>, CatalogError>;
}
