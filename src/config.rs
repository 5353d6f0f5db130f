//! Configuration types for catalog generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`],
//! built via its [`GenerationConfigBuilder`]. The JSON-facing parts
//! ([`FieldMapping`], [`ColumnHeaders`], [`Theme`]) derive serde so a mapping
//! file can be loaded with `serde_json` and validated before a run starts.
//!
//! The stock medical-products catalog layout is not a separate code path:
//! it is [`FieldMapping::default()`] together with the default title,
//! headers and brand colours.

use crate::error::CatalogError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default document title.
pub const DEFAULT_TITLE: &str = "ACCORD MEDICAL PRODUCTS CATALOG";

/// Default document subtitle.
pub const DEFAULT_SUBTITLE: &str = "Product Catalog – Department Listing";

/// Default text appended to the generation timestamp in the footer.
pub const DEFAULT_FOOTER_LABEL: &str = "System: Catalog PDF Generator";

/// Configuration for one catalog generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use catalog2pdf::{ExtraColumn, FieldMapping, GenerationConfig};
///
/// let mapping = FieldMapping {
///     extra_columns: vec![ExtraColumn::new("SKU", "meta.sku").unwrap()],
///     ..FieldMapping::default()
/// };
/// let config = GenerationConfig::builder()
///     .title("Spring Catalog")
///     .mapping(mapping)
///     .image_timeout_secs(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.mapping.column_count(), 4);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Document title (first heading). Default: [`DEFAULT_TITLE`].
    pub title: String,

    /// Line printed under the title. Default: [`DEFAULT_SUBTITLE`].
    pub subtitle: String,

    /// Text after the timestamp in the footer. Default: [`DEFAULT_FOOTER_LABEL`].
    pub footer_label: String,

    /// Which JSON paths supply group, name, description, images and extras.
    pub mapping: FieldMapping,

    /// Header labels of the three base columns.
    pub headers: ColumnHeaders,

    /// Column widths in points.
    pub widths: ColumnWidths,

    /// Brand colours.
    pub theme: Theme,

    /// Page format. Default: A4.
    pub page_size: PageSize,

    /// Page margin on all four sides, in points. Default: 36.
    pub margin: f32,

    /// Side of the square an image is fitted into, in points. Default: 90.
    pub image_size: f32,

    /// Per-image request timeout in seconds. Default: 5.
    ///
    /// Images are fetched one at a time and each fetch blocks the run, so a
    /// slow CDN multiplies directly into total generation time.
    pub image_timeout_secs: u64,

    /// Catalog API request timeout in seconds. Default: 30.
    pub api_timeout_secs: u64,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            footer_label: DEFAULT_FOOTER_LABEL.to_string(),
            mapping: FieldMapping::default(),
            headers: ColumnHeaders::default(),
            widths: ColumnWidths::default(),
            theme: Theme::default(),
            page_size: PageSize::default(),
            margin: 36.0,
            image_size: 90.0,
            image_timeout_secs: 5,
            api_timeout_secs: 30,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("title", &self.title)
            .field("subtitle", &self.subtitle)
            .field("footer_label", &self.footer_label)
            .field("mapping", &self.mapping)
            .field("headers", &self.headers)
            .field("widths", &self.widths)
            .field("theme", &self.theme)
            .field("page_size", &self.page_size)
            .field("margin", &self.margin)
            .field("image_size", &self.image_size)
            .field("image_timeout_secs", &self.image_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.config.subtitle = subtitle.into();
        self
    }

    pub fn footer_label(mut self, label: impl Into<String>) -> Self {
        self.config.footer_label = label.into();
        self
    }

    pub fn mapping(mut self, mapping: FieldMapping) -> Self {
        self.config.mapping = mapping;
        self
    }

    pub fn headers(mut self, headers: ColumnHeaders) -> Self {
        self.config.headers = headers;
        self
    }

    pub fn widths(mut self, widths: ColumnWidths) -> Self {
        self.config.widths = widths;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margin(mut self, points: f32) -> Self {
        self.config.margin = points.clamp(0.0, 144.0);
        self
    }

    pub fn image_size(mut self, points: f32) -> Self {
        self.config.image_size = points.clamp(16.0, 300.0);
        self
    }

    pub fn image_timeout_secs(mut self, secs: u64) -> Self {
        self.config.image_timeout_secs = secs.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, CatalogError> {
        let c = &self.config;
        c.mapping.validate()?;
        if c.title.trim().is_empty() {
            return Err(CatalogError::InvalidConfig("Title must not be empty".into()));
        }
        let image_column = c.widths.image;
        if image_column < c.image_size {
            return Err(CatalogError::InvalidConfig(format!(
                "Image column ({image_column}pt) is narrower than the image size ({}pt)",
                c.image_size
            )));
        }
        if c.widths.name <= 0.0 || c.widths.description <= 0.0 || c.widths.extra < 0.0 {
            return Err(CatalogError::InvalidConfig(
                "Column widths must be positive".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Field mapping ────────────────────────────────────────────────────────

/// Where each table cell finds its value inside a catalog item.
///
/// Paths are dot-separated (`"meta.sku"`, `"images.0.src"`); see
/// [`crate::pipeline::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Grouping key. `None` puts every item in one implicit, unheaded group.
    pub group_path: Option<String>,
    pub name_path: String,
    pub desc_path: String,
    pub images_path: String,
    /// Additional columns appended after the image column.
    pub extra_columns: Vec<ExtraColumn>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            group_path: Some("category".to_string()),
            name_path: "product_name".to_string(),
            desc_path: "product_description".to_string(),
            images_path: "images".to_string(),
            extra_columns: Vec::new(),
        }
    }
}

impl FieldMapping {
    /// Parse and validate a JSON mapping document.
    ///
    /// Missing fields fall back to the defaults; a blank `group_path` turns
    /// grouping off.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut mapping: FieldMapping = serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidConfig(format!("mapping file: {e}")))?;
        if mapping
            .group_path
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            mapping.group_path = None;
        }
        mapping.validate()?;
        Ok(mapping)
    }

    /// Reject mappings the table builder cannot use.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (field, path) in [
            ("name_path", &self.name_path),
            ("desc_path", &self.desc_path),
            ("images_path", &self.images_path),
        ] {
            if path.trim().is_empty() {
                return Err(CatalogError::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        for column in &self.extra_columns {
            column.validate()?;
        }
        Ok(())
    }

    /// Whether items are split into headed groups.
    pub fn is_grouped(&self) -> bool {
        self.group_path.is_some()
    }

    /// Number of table columns: name, description, image plus extras.
    pub fn column_count(&self) -> usize {
        3 + self.extra_columns.len()
    }
}

/// One user-defined column: a header label and the path of its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraColumn {
    pub header: String,
    pub path: String,
}

impl ExtraColumn {
    pub fn new(header: impl Into<String>, path: impl Into<String>) -> Result<Self, CatalogError> {
        let column = Self {
            header: header.into(),
            path: path.into(),
        };
        column.validate()?;
        Ok(column)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let descriptor = format!("{}={}", self.header, self.path);
        if self.header.trim().is_empty() {
            return Err(CatalogError::InvalidColumn {
                descriptor,
                reason: "header is missing".into(),
            });
        }
        if self.path.trim().is_empty() {
            return Err(CatalogError::InvalidColumn {
                descriptor,
                reason: "key path is missing".into(),
            });
        }
        Ok(())
    }
}

impl FromStr for ExtraColumn {
    type Err = CatalogError;

    /// Parse a `Header=path` descriptor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((header, path)) = s.split_once('=') else {
            return Err(CatalogError::InvalidColumn {
                descriptor: s.to_string(),
                reason: "expected HEADER=PATH".into(),
            });
        };
        ExtraColumn::new(header.trim(), path.trim())
    }
}

/// Header labels of the three base columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnHeaders {
    pub name: String,
    pub description: String,
    pub image: String,
}

impl Default for ColumnHeaders {
    fn default() -> Self {
        Self {
            name: "Product".to_string(),
            description: "Description".to_string(),
            image: "Image".to_string(),
        }
    }
}

/// Column widths in points.
///
/// The three base columns are fixed; every extra column shares `extra`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnWidths {
    pub name: f32,
    pub description: f32,
    pub image: f32,
    pub extra: f32,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            name: 120.0,
            description: 230.0,
            image: 100.0,
            extra: 70.0,
        }
    }
}

impl ColumnWidths {
    /// Width of each extra column; zero when none are configured.
    pub fn extra_width(&self, mapping: &FieldMapping) -> f32 {
        if mapping.extra_columns.is_empty() {
            0.0
        } else {
            self.extra
        }
    }
}

// ── Theme ────────────────────────────────────────────────────────────────

/// An sRGB colour, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Components scaled to `0.0..=1.0` as PDF colour operators expect.
    pub fn unit(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

impl FromStr for Rgb {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || CatalogError::InvalidConfig(format!("'{s}' is not a #RRGGBB colour"));
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Brand colours used by the document writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub title: Rgb,
    pub subtitle: Rgb,
    pub group_heading: Rgb,
    pub end_marker: Rgb,
    pub header_background: Rgb,
    pub header_text: Rgb,
    pub grid: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        let red = Rgb(0xFF, 0x00, 0x00);
        let blue = Rgb(0x00, 0xAE, 0xEF);
        Self {
            title: red,
            subtitle: Rgb::BLACK,
            group_heading: blue,
            end_marker: red,
            header_background: blue,
            header_text: Rgb::WHITE,
            grid: Rgb::BLACK,
        }
    }
}

/// Page format of the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 595 × 842 pt (default).
    #[default]
    A4,
    /// 612 × 792 pt.
    Letter,
}

impl PageSize {
    /// `(width, height)` in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping_is_the_medical_catalog() {
        let m = FieldMapping::default();
        assert_eq!(m.group_path.as_deref(), Some("category"));
        assert_eq!(m.name_path, "product_name");
        assert_eq!(m.desc_path, "product_description");
        assert_eq!(m.images_path, "images");
        assert_eq!(m.column_count(), 3);
    }

    #[test]
    fn extra_column_parses_header_and_path() {
        let c: ExtraColumn = " Price = pricing.0.amount ".parse().unwrap();
        assert_eq!(c.header, "Price");
        assert_eq!(c.path, "pricing.0.amount");
    }

    #[test]
    fn extra_column_rejects_missing_parts() {
        assert!(matches!(
            "Price".parse::<ExtraColumn>(),
            Err(CatalogError::InvalidColumn { .. })
        ));
        assert!(matches!(
            "=sku".parse::<ExtraColumn>(),
            Err(CatalogError::InvalidColumn { .. })
        ));
        assert!(matches!(
            "SKU=".parse::<ExtraColumn>(),
            Err(CatalogError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn mapping_file_rejects_malformed_column() {
        let json = r#"{"extra_columns": [{"header": "SKU"}]}"#;
        assert!(FieldMapping::from_json(json).is_err());

        let json = r#"{"extra_columns": [{"header": "", "path": "sku"}]}"#;
        assert!(matches!(
            FieldMapping::from_json(json),
            Err(CatalogError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn mapping_file_blank_group_disables_grouping() {
        let m = FieldMapping::from_json(r#"{"group_path": "  ", "name_path": "title"}"#).unwrap();
        assert!(!m.is_grouped());
        assert_eq!(m.name_path, "title");
        assert_eq!(m.desc_path, "product_description");
    }

    #[test]
    fn mapping_file_null_group_disables_grouping() {
        let m = FieldMapping::from_json(r#"{"group_path": null}"#).unwrap();
        assert!(!m.is_grouped());
    }

    #[test]
    fn extra_width_is_zero_without_extra_columns() {
        let widths = ColumnWidths::default();
        let mut mapping = FieldMapping::default();
        assert_eq!(widths.extra_width(&mapping), 0.0);
        mapping
            .extra_columns
            .push(ExtraColumn::new("SKU", "sku").unwrap());
        assert_eq!(widths.extra_width(&mapping), 70.0);
    }

    #[test]
    fn rgb_round_trips_through_hex() {
        let c: Rgb = "#00aeef".parse().unwrap();
        assert_eq!(c, Rgb(0x00, 0xAE, 0xEF));
        assert_eq!(c.to_string(), "#00AEEF");
        assert!("#00aef".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn theme_deserialises_partial_overrides() {
        let theme: Theme = serde_json::from_str(r##"{"title": "#112233"}"##).unwrap();
        assert_eq!(theme.title, Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.group_heading, Theme::default().group_heading);
    }

    #[test]
    fn builder_clamps_and_validates() {
        let config = GenerationConfig::builder()
            .image_timeout_secs(0)
            .margin(500.0)
            .build()
            .unwrap();
        assert_eq!(config.image_timeout_secs, 1);
        assert_eq!(config.margin, 144.0);

        let err = GenerationConfig::builder().title("   ").build().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidConfig(_)));

        let narrow = ColumnWidths {
            image: 40.0,
            ..ColumnWidths::default()
        };
        assert!(GenerationConfig::builder().widths(narrow).build().is_err());
    }

    #[test]
    fn builder_rejects_invalid_mapping() {
        let mapping = FieldMapping {
            name_path: String::new(),
            ..FieldMapping::default()
        };
        assert!(GenerationConfig::builder().mapping(mapping).build().is_err());
    }
}
