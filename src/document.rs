//! The abstract document model passed from the pipeline to a writer.
//!
//! Blocks carry content and a semantic role, never coordinates: choosing
//! fonts, wrapping lines and breaking pages is the writer's job.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Horizontal placement of a block inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Heading level. The writer maps each level to a theme colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeadingLevel {
    /// Document title.
    Title,
    /// Group name above a table.
    Group,
}

/// Semantic style of a paragraph or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextStyle {
    /// Line under the document title.
    Subtitle,
    /// Product name and extra-column values.
    Cell,
    /// Description text and bullet items.
    Description,
    /// Substitute text for a missing image or description.
    Fallback,
    /// "End of <group>" marker.
    EndMarker,
    /// Generation timestamp line.
    Footer,
}

/// A renderable unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Heading {
        text: String,
        level: HeadingLevel,
    },
    Paragraph {
        text: String,
        style: TextStyle,
    },
    BulletList {
        items: Vec<String>,
        style: TextStyle,
    },
    Image(ImageBlock),
    Table(TableBlock),
    /// Vertical gap in points.
    Spacer {
        height: f32,
    },
}

impl Block {
    pub fn heading(text: impl Into<String>, level: HeadingLevel) -> Self {
        Block::Heading {
            text: text.into(),
            level,
        }
    }

    pub fn paragraph(text: impl Into<String>, style: TextStyle) -> Self {
        Block::Paragraph {
            text: text.into(),
            style,
        }
    }

    pub fn spacer(height: f32) -> Self {
        Block::Spacer { height }
    }

    /// The plain text of a paragraph or heading, if this is one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Heading { text, .. } | Block::Paragraph { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A decoded raster image ready for embedding.
#[derive(Clone, PartialEq, Serialize)]
pub struct ImageBlock {
    /// Source URL; writers use it to embed each image once.
    pub source: String,
    /// Pixel dimensions of `rgb`.
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Packed 8-bit RGB samples, row-major.
    #[serde(skip)]
    pub rgb: Vec<u8>,
    /// Display footprint in points.
    pub width: f32,
    pub height: f32,
    pub align: Align,
}

impl std::fmt::Debug for ImageBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlock")
            .field("source", &self.source)
            .field("pixels", &format_args!("{}x{}", self.pixel_width, self.pixel_height))
            .field("size", &format_args!("{}x{}", self.width, self.height))
            .field("align", &self.align)
            .finish()
    }
}

/// One table column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub header: String,
    /// Width in points.
    pub width: f32,
}

/// A table with a styled header row and block-valued cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBlock {
    pub columns: Vec<Column>,
    /// Every row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<Block>>,
    /// Redraw the header row at the top of each continuation page.
    pub repeat_header: bool,
}

impl TableBlock {
    pub fn total_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }
}

/// An ordered, writer-agnostic document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub blocks: Vec<Block>,
}

impl Document {
    /// All tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// Aggregate statistics for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub total_items: usize,
    pub groups: usize,
    pub images_embedded: usize,
    pub image_fallbacks: usize,
    /// Image cells served from the run's cache instead of the network.
    pub image_cache_hits: usize,
    pub pdf_bytes: usize,
    pub fetch_duration_ms: u64,
    pub build_duration_ms: u64,
    pub write_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The result of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    /// The rendered PDF.
    #[serde(skip)]
    pub pdf: Vec<u8>,
    pub document: Document,
    pub stats: GenerationStats,
}
