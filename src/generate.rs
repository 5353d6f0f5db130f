//! Generation entry points.
//!
//! [`generate`] loads a catalog envelope and runs the whole pipeline;
//! [`generate_from_items`] starts from items already in memory. Both return
//! the PDF bytes together with the assembled [`crate::Document`] and
//! [`GenerationStats`].

use crate::config::GenerationConfig;
use crate::document::{GenerationOutput, GenerationStats};
use crate::error::CatalogError;
use crate::pipeline::assemble::assemble;
use crate::pipeline::image::{ImageCache, ImageFetcher};
use crate::pipeline::source;
use crate::pipeline::table::TableBuilder;
use crate::writer::{DocumentWriter, PdfWriter};
use chrono::Local;
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate a catalog PDF from an API URL or a local JSON file.
///
/// # Errors
/// Returns `Err(CatalogError)` only for fatal errors:
/// - the source cannot be read or fetched
/// - the envelope status is not `"success"` or `data` is missing
/// - the field mapping is invalid
/// - the PDF cannot be written
///
/// Image failures are not errors; they show up as fallback text in the
/// table and in `stats.image_fallbacks`.
pub async fn generate(
    source: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, CatalogError> {
    let total_start = Instant::now();
    let source = source.as_ref();
    info!("Starting catalog generation: {}", source);

    // Reject a bad mapping before touching the network.
    config.mapping.validate()?;

    let fetch_start = Instant::now();
    let items = source::load_items(source, config.api_timeout_secs).await?;
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;
    info!("Loaded {} items in {}ms", items.len(), fetch_duration_ms);

    let mut output = generate_from_items(&items, config).await?;
    output.stats.fetch_duration_ms = fetch_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Generate a catalog PDF from items that are already loaded.
///
/// Each call owns a fresh image cache; it is removed before returning.
pub async fn generate_from_items(
    items: &[Value],
    config: &GenerationConfig,
) -> Result<GenerationOutput, CatalogError> {
    let total_start = Instant::now();
    config.mapping.validate()?;

    let fetcher = ImageFetcher::new(config.image_timeout_secs, config.image_size)?;
    let mut cache = ImageCache::new()?;

    // ── Build sections ───────────────────────────────────────────────────
    let build_start = Instant::now();
    let (sections, built) = TableBuilder::new(config, &fetcher)
        .build(items, &mut cache)
        .await;
    let build_duration_ms = build_start.elapsed().as_millis() as u64;
    let groups = sections.len();
    info!(
        "Built {} sections ({} images, {} fallbacks) in {}ms",
        groups, built.images_embedded, built.image_fallbacks, build_duration_ms
    );

    // ── Assemble ─────────────────────────────────────────────────────────
    let document = assemble(
        &config.title,
        &config.subtitle,
        sections,
        Local::now(),
        &config.footer_label,
    );
    debug!("Assembled {} blocks", document.blocks.len());

    // ── Write ────────────────────────────────────────────────────────────
    let write_start = Instant::now();
    let writer = PdfWriter::from_config(config);
    let theme = config.theme.clone();
    let (pdf, document) = tokio::task::spawn_blocking(move || {
        writer.write(&document, &theme).map(|pdf| (pdf, document))
    })
    .await
    .map_err(|e| CatalogError::Internal(format!("PDF writer task failed: {}", e)))??;
    let write_duration_ms = write_start.elapsed().as_millis() as u64;

    if let Err(e) = cache.close() {
        warn!("Failed to remove image cache: {}", e);
    }

    let stats = GenerationStats {
        total_items: built.items,
        groups,
        images_embedded: built.images_embedded,
        image_fallbacks: built.image_fallbacks,
        image_cache_hits: built.image_cache_hits,
        pdf_bytes: pdf.len(),
        fetch_duration_ms: 0,
        build_duration_ms,
        write_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Generation complete: {} items, {} groups, {} bytes, {}ms total",
        stats.total_items, stats.groups, stats.pdf_bytes, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(stats.total_items, stats.image_fallbacks);
    }

    Ok(GenerationOutput {
        pdf,
        document,
        stats,
    })
}

/// Generate a catalog and write the PDF to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// truncated PDF behind.
pub async fn generate_to_file(
    source: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationStats, CatalogError> {
    let output = generate(source, config).await?;
    let path = output_path.as_ref();
    write_atomic(path, &output.pdf).await?;
    info!("Wrote {}", path.display());
    Ok(output.stats)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CatalogError> {
    let fail = |source| CatalogError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(fail)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(fail(e));
    }
    Ok(())
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    source: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, CatalogError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CatalogError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(source, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtraColumn, FieldMapping};
    use crate::document::Block;
    use serde_json::json;

    fn offline_items() -> Vec<Value> {
        vec![
            json!({"category": "B", "product_name": "Bandage", "product_description": "<ul><li>Sterile</li></ul>", "images": []}),
            json!({"category": "A", "product_name": "Alcohol Swab", "images": ""}),
            json!({"category": "B", "product_name": "Gauze", "product_description": "Plain text"}),
        ]
    }

    #[tokio::test]
    async fn items_without_images_never_touch_the_network() {
        let output = generate_from_items(&offline_items(), &GenerationConfig::default())
            .await
            .unwrap();

        assert!(output.pdf.starts_with(b"%PDF"));
        assert_eq!(output.stats.total_items, 3);
        assert_eq!(output.stats.groups, 2);
        assert_eq!(output.stats.images_embedded, 0);
        assert_eq!(output.stats.image_fallbacks, 3);
        assert_eq!(output.stats.pdf_bytes, output.pdf.len());

        let headings: Vec<&str> = output
            .document
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(headings, ["ACCORD MEDICAL PRODUCTS CATALOG", "B", "A"]);
    }

    #[tokio::test]
    async fn empty_item_list_still_produces_a_pdf() {
        let output = generate_from_items(&[], &GenerationConfig::default())
            .await
            .unwrap();
        assert!(output.pdf.starts_with(b"%PDF"));
        assert_eq!(output.stats.groups, 0);
        assert_eq!(output.document.tables().count(), 0);
    }

    #[tokio::test]
    async fn invalid_mapping_fails_before_loading() {
        let config = GenerationConfig {
            mapping: FieldMapping {
                extra_columns: vec![ExtraColumn {
                    header: "SKU".into(),
                    path: String::new(),
                }],
                ..FieldMapping::default()
            },
            ..GenerationConfig::default()
        };
        let err = generate("/definitely/not/here.json", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidColumn { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn atomic_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/catalog.pdf");
        write_atomic(&path, b"%PDF-1.5 test").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 test");
        assert!(!path.with_extension("pdf.tmp").exists());
    }

    #[test]
    fn sync_wrapper_reports_missing_source() {
        let err = generate_sync("/definitely/not/here.json", &GenerationConfig::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::SourceNotFound { .. }), "{err:?}");
    }
}
