//! CLI binary for catalog2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints results.

use anyhow::{Context, Result};
use catalog2pdf::{
    generate_to_file, ColumnHeaders, ExtraColumn, FieldMapping, GenerationConfig,
    GenerationProgressCallback, PageSize, ProgressCallback, Rgb, Theme,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over all items, plus a log line per
/// group and per image fallback.
struct CliProgressCallback {
    bar: ProgressBar,
    fallbacks: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_generation_start` reports the item count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading catalog…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            fallbacks: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} items  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Building");
        self.bar.reset_eta();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, total_items: usize, total_groups: usize) {
        self.activate_bar(total_items);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Building catalog: {total_items} items in {total_groups} groups…"
            ))
        ));
    }

    fn on_group_start(&self, name: Option<&str>, item_count: usize) {
        if let Some(name) = name {
            self.bar.println(format!(
                "  {} {:<32} {}",
                cyan("▸"),
                name,
                dim(&format!("{item_count:>4} items"))
            ));
            self.bar.set_message(name.to_string());
        }
    }

    fn on_item_complete(&self, done: usize, _total: usize) {
        self.bar.set_position(done as u64);
    }

    fn on_image_fallback(&self, url: Option<&str>, reason: &str) {
        self.fallbacks.fetch_add(1, Ordering::SeqCst);
        let Some(url) = url else {
            // Items without any image URL are routine; the summary counts them.
            return;
        };
        let url = if url.chars().count() > 60 {
            let head: String = url.chars().take(59).collect();
            format!("{head}\u{2026}")
        } else {
            url.to_string()
        };
        self.bar.println(format!(
            "    {} {}  {}",
            yellow("!"),
            dim(&url),
            yellow(reason)
        ));
    }

    fn on_generation_complete(&self, total_items: usize, image_fallbacks: usize) {
        self.bar.finish_and_clear();
        if image_fallbacks == 0 {
            eprintln!(
                "{} {} items laid out, all images embedded",
                green("✔"),
                bold(&total_items.to_string())
            );
        } else {
            eprintln!(
                "{} {} items laid out  ({} without image)",
                cyan("⚠"),
                bold(&total_items.to_string()),
                yellow(&image_fallbacks.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Catalog API to PDF
  catalog2pdf https://api.example.com/products -o catalog.pdf

  # Local envelope file, US Letter, no grouping
  catalog2pdf products.json --no-group --page-size letter

  # Different item shape
  catalog2pdf feed.json --group-key meta.dept --name-key title \
      --desc-key body_html --images-key media

  # Extra columns
  catalog2pdf feed.json --column "SKU=meta.sku" --column "Price=pricing.0.amount"

  # Whole mapping from a file
  catalog2pdf feed.json --mapping mapping.json

MAPPING FILE:
  {
    "group_path": "category",
    "name_path": "product_name",
    "desc_path": "product_description",
    "images_path": "images",
    "extra_columns": [{"header": "SKU", "path": "meta.sku"}]
  }
  Flags given on the command line override the file.

INPUT ENVELOPE:
  {"status": "success", "data": [ {...item...}, ... ]}
  Any other status aborts before images are fetched.

ENVIRONMENT VARIABLES:
  CATALOG2PDF_SOURCE      Catalog URL or JSON file
  CATALOG2PDF_OUTPUT      Output PDF path
  CATALOG2PDF_MAPPING     Mapping file
  RUST_LOG                Log filter (overrides --verbose / --quiet)
"#;

/// Render a JSON product catalog into a grouped, paginated PDF.
#[derive(Parser, Debug)]
#[command(
    name = "catalog2pdf",
    version,
    about = "Render a JSON product catalog into a grouped, paginated PDF",
    long_about = "Fetch a product catalog envelope ({status, data}) from a URL or read it from a \
JSON file, group items by a configurable key and render one table per group with product \
name, HTML description as bullets, and the product image.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Catalog API URL or local JSON file.
    #[arg(env = "CATALOG2PDF_SOURCE")]
    source: String,

    /// Output PDF path.
    #[arg(short, long, env = "CATALOG2PDF_OUTPUT", default_value = "catalog.pdf")]
    output: PathBuf,

    /// JSON file with a field mapping.
    #[arg(long, env = "CATALOG2PDF_MAPPING")]
    mapping: Option<PathBuf>,

    /// Path of the grouping key.
    #[arg(long, env = "CATALOG2PDF_GROUP_KEY", conflicts_with = "no_group")]
    group_key: Option<String>,

    /// Put all items in one table without group headings.
    #[arg(long, env = "CATALOG2PDF_NO_GROUP")]
    no_group: bool,

    /// Path of the product name.
    #[arg(long, env = "CATALOG2PDF_NAME_KEY")]
    name_key: Option<String>,

    /// Path of the HTML description.
    #[arg(long, env = "CATALOG2PDF_DESC_KEY")]
    desc_key: Option<String>,

    /// Path of the image list or image URL.
    #[arg(long, env = "CATALOG2PDF_IMAGES_KEY")]
    images_key: Option<String>,

    /// Extra column as "Header=path" (repeatable).
    #[arg(long = "column", value_name = "HEADER=PATH")]
    columns: Vec<String>,

    /// Document title.
    #[arg(long, env = "CATALOG2PDF_TITLE")]
    title: Option<String>,

    /// Line under the title.
    #[arg(long, env = "CATALOG2PDF_SUBTITLE")]
    subtitle: Option<String>,

    /// Text after the timestamp in the footer.
    #[arg(long, env = "CATALOG2PDF_FOOTER")]
    footer: Option<String>,

    /// Header of the name column.
    #[arg(long)]
    product_header: Option<String>,

    /// Header of the description column.
    #[arg(long)]
    description_header: Option<String>,

    /// Header of the image column.
    #[arg(long)]
    image_header: Option<String>,

    /// Title and end-marker colour (#RRGGBB).
    #[arg(long)]
    accent_color: Option<Rgb>,

    /// Group heading and table header colour (#RRGGBB).
    #[arg(long)]
    brand_color: Option<Rgb>,

    /// Page format.
    #[arg(long, env = "CATALOG2PDF_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Page margin in points (0–144).
    #[arg(long, default_value_t = 36.0)]
    margin: f32,

    /// Image box size in points (16–300).
    #[arg(long, default_value_t = 90.0)]
    image_size: f32,

    /// Per-image download timeout in seconds.
    #[arg(long, env = "CATALOG2PDF_IMAGE_TIMEOUT", default_value_t = 5)]
    image_timeout: u64,

    /// Catalog API timeout in seconds.
    #[arg(long, env = "CATALOG2PDF_API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,

    /// Print run statistics as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CATALOG2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CATALOG2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CATALOG2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Run generation ───────────────────────────────────────────────────
    let stats = generate_to_file(&cli.source, &cli.output, &config)
        .await
        .with_context(|| format!("Catalog generation from '{}' failed", cli.source))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} items  {} groups  {} images  {}ms  →  {}",
            if stats.image_fallbacks == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.total_items,
            stats.groups,
            stats.images_embedded,
            stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {} bytes  /  {} cached image hits",
            dim(&stats.pdf_bytes.to_string()),
            dim(&stats.image_cache_hits.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mapping = build_mapping(cli).await?;

    let mut headers = ColumnHeaders::default();
    if let Some(ref h) = cli.product_header {
        headers.name = h.clone();
    }
    if let Some(ref h) = cli.description_header {
        headers.description = h.clone();
    }
    if let Some(ref h) = cli.image_header {
        headers.image = h.clone();
    }

    let mut theme = Theme::default();
    if let Some(accent) = cli.accent_color {
        theme.title = accent;
        theme.end_marker = accent;
    }
    if let Some(brand) = cli.brand_color {
        theme.group_heading = brand;
        theme.header_background = brand;
    }

    let mut builder = GenerationConfig::builder()
        .mapping(mapping)
        .headers(headers)
        .theme(theme)
        .page_size(cli.page_size.into())
        .margin(cli.margin)
        .image_size(cli.image_size)
        .image_timeout_secs(cli.image_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(ref subtitle) = cli.subtitle {
        builder = builder.subtitle(subtitle.clone());
    }
    if let Some(ref footer) = cli.footer {
        builder = builder.footer_label(footer.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Mapping file (if any) with command-line overrides applied.
async fn build_mapping(cli: &Cli) -> Result<FieldMapping> {
    let mut mapping = match cli.mapping {
        Some(ref path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read mapping file {:?}", path))?;
            FieldMapping::from_json(&json)
                .with_context(|| format!("Invalid mapping file {:?}", path))?
        }
        None => FieldMapping::default(),
    };

    if cli.no_group {
        mapping.group_path = None;
    } else if let Some(ref key) = cli.group_key {
        // Blank key means ungrouped, same as a blank `group_path` in a mapping file.
        let key = key.trim();
        mapping.group_path = (!key.is_empty()).then(|| key.to_string());
    }
    if let Some(ref key) = cli.name_key {
        mapping.name_path = key.clone();
    }
    if let Some(ref key) = cli.desc_key {
        mapping.desc_path = key.clone();
    }
    if let Some(ref key) = cli.images_key {
        mapping.images_path = key.clone();
    }

    for descriptor in &cli.columns {
        let column: ExtraColumn = descriptor
            .parse()
            .with_context(|| format!("Invalid --column '{descriptor}'"))?;
        mapping.extra_columns.push(column);
    }

    mapping.validate().context("Invalid field mapping")?;
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("catalog2pdf").chain(args.iter().copied()))
    }

    #[tokio::test]
    async fn blank_group_key_means_ungrouped() {
        for key in ["", "   "] {
            let mapping = build_mapping(&cli(&["feed.json", "--group-key", key]))
                .await
                .unwrap();
            assert_eq!(mapping.group_path, None, "{key:?}");
        }
    }

    #[tokio::test]
    async fn group_key_overrides_the_default() {
        let mapping = build_mapping(&cli(&["feed.json", "--group-key", " meta.dept "]))
            .await
            .unwrap();
        assert_eq!(mapping.group_path.as_deref(), Some("meta.dept"));
    }

    #[tokio::test]
    async fn no_group_clears_the_group_path() {
        let mapping = build_mapping(&cli(&["feed.json", "--no-group"])).await.unwrap();
        assert_eq!(mapping.group_path, None);
    }

    #[tokio::test]
    async fn columns_are_appended_to_the_mapping() {
        let mapping = build_mapping(&cli(&["feed.json", "--column", "SKU=meta.sku"]))
            .await
            .unwrap();
        assert_eq!(mapping.extra_columns.len(), 1);
        assert_eq!(mapping.extra_columns[0].header, "SKU");
        assert_eq!(mapping.extra_columns[0].path, "meta.sku");
    }
}
