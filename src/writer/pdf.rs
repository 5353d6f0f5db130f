//! PDF backend built on `lopdf`.
//!
//! Layout happens in two passes. [`Layout`] walks the block sequence and
//! emits content-stream operations page by page, tracking a vertical cursor
//! measured from the top edge. [`PdfWriter::write`] then turns those pages
//! into PDF objects: three base-14 Helvetica fonts, one image XObject per
//! distinct image source, a page tree and the document info dictionary.

use super::metrics::{encode_win_ansi, text_width, wrap, Font};
use super::DocumentWriter;
use crate::config::{GenerationConfig, PageSize, Rgb, Theme};
use crate::document::{Align, Block, Document, HeadingLevel, ImageBlock, TableBlock, TextStyle};
use crate::error::CatalogError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream, StringFormat};
use std::collections::HashMap;
use tracing::debug;

const CELL_PAD_X: f32 = 6.0;
const CELL_PAD_Y: f32 = 4.0;
const BULLET_INDENT: f32 = 12.0;
const BULLET_OFFSET: f32 = 2.0;
const BULLET_GAP: f32 = 2.0;
const GRID_LINE_WIDTH: f32 = 0.5;
const FALLBACK_GREY: Rgb = Rgb(0x55, 0x55, 0x55);
const EPSILON: f32 = 0.01;

/// Writes a [`Document`] as a paginated PDF.
#[derive(Debug, Clone, Copy)]
pub struct PdfWriter {
    page_size: PageSize,
    margin: f32,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(PageSize::A4, 36.0)
    }
}

impl PdfWriter {
    pub fn new(page_size: PageSize, margin: f32) -> Self {
        Self { page_size, margin }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.page_size, config.margin)
    }

    fn serialize(
        &self,
        document: &Document,
        pages: Vec<PageContent>,
        images: &[&ImageBlock],
    ) -> Result<Vec<u8>, CatalogError> {
        let (width, height) = self.page_size.dimensions();
        let mut pdf = lopdf::Document::with_version("1.5");
        let pages_id = pdf.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = pdf.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource(), font_id);
        }

        let image_ids: Vec<ObjectId> = images
            .iter()
            .map(|image| {
                pdf.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => image.pixel_width as i64,
                        "Height" => image.pixel_height as i64,
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8_i64,
                    },
                    image.rgb.clone(),
                ))
            })
            .collect();

        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = Content {
                operations: page.operations,
            };
            let bytes = content
                .encode()
                .map_err(|e| CatalogError::WriteFailed(format!("content stream: {e}")))?;
            let content_id = pdf.add_object(Stream::new(Dictionary::new(), bytes));

            let mut xobjects = Dictionary::new();
            for index in page.images {
                xobjects.set(image_name(index), image_ids[index]);
            }

            let page_id = pdf.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => fonts.clone(),
                    "XObject" => xobjects,
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            width.into(),
            height.into(),
        ];
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = pdf.add_object(dictionary! {
            "Title" => text_string(&document.title),
            "Producer" => Object::string_literal(concat!("catalog2pdf ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(
                document.generated_at.format("D:%Y%m%d%H%M%S").to_string(),
            ),
        });
        pdf.trailer.set("Root", catalog_id);
        pdf.trailer.set("Info", info_id);

        pdf.compress();
        let mut buffer = Vec::new();
        pdf.save_to(&mut buffer)
            .map_err(|e| CatalogError::WriteFailed(e.to_string()))?;
        Ok(buffer)
    }
}

impl DocumentWriter for PdfWriter {
    fn write(&self, document: &Document, theme: &Theme) -> Result<Vec<u8>, CatalogError> {
        let (width, _) = self.page_size.dimensions();
        if width - 2.0 * self.margin <= 0.0 {
            return Err(CatalogError::InvalidConfig(format!(
                "margin {} leaves no room on a {width}pt wide page",
                self.margin
            )));
        }

        let mut layout = Layout::new(self.page_size, self.margin, theme);
        layout.blocks(&document.blocks);
        let (pages, images) = layout.finish();
        debug!(
            pages = pages.len(),
            images = images.len(),
            "Laid out catalog document"
        );

        self.serialize(document, pages, &images)
    }
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

/// A PDF text string (UTF-16BE with byte-order mark) for the info dictionary.
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

// ── Styles ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct TextSpec {
    font: Font,
    size: f32,
    leading: f32,
    color: Rgb,
    align: Align,
    space_after: f32,
}

impl TextSpec {
    fn new(font: Font, size: f32, leading: f32, color: Rgb) -> Self {
        Self {
            font,
            size,
            leading,
            color,
            align: Align::Left,
            space_after: 0.0,
        }
    }

    fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    fn after(mut self, space: f32) -> Self {
        self.space_after = space;
        self
    }

    fn heading(level: HeadingLevel, theme: &Theme) -> Self {
        match level {
            HeadingLevel::Title => TextSpec::new(Font::Bold, 20.0, 24.0, theme.title)
                .centered()
                .after(12.0),
            HeadingLevel::Group => {
                TextSpec::new(Font::Bold, 16.0, 19.0, theme.group_heading).after(6.0)
            }
        }
    }

    fn paragraph(style: TextStyle, theme: &Theme) -> Self {
        match style {
            TextStyle::Subtitle => TextSpec::new(Font::Regular, 14.0, 17.0, theme.subtitle)
                .centered()
                .after(12.0),
            TextStyle::Cell => TextSpec::new(Font::Regular, 9.0, 11.0, Rgb::BLACK),
            TextStyle::Description => TextSpec::new(Font::Regular, 8.0, 10.0, Rgb::BLACK),
            TextStyle::Fallback => TextSpec::new(Font::Oblique, 8.0, 10.0, FALLBACK_GREY),
            TextStyle::EndMarker => TextSpec::new(Font::Oblique, 10.0, 12.0, theme.end_marker),
            TextStyle::Footer => TextSpec::new(Font::Regular, 10.0, 12.0, Rgb::BLACK),
        }
    }

    fn table_header(theme: &Theme) -> Self {
        TextSpec::new(Font::Bold, 9.0, 11.0, theme.header_text)
    }

    /// Distance from the top of a line box to the baseline.
    fn baseline(&self) -> f32 {
        self.leading - (self.leading - self.size) / 2.0 - self.size * 0.22
    }

    fn wrap(&self, text: &str, width: f32) -> Vec<String> {
        wrap(text, self.font, self.size, width)
    }

    fn width_of(&self, text: &str) -> f32 {
        text_width(text, self.font, self.size)
    }
}

// ── Table cells ──────────────────────────────────────────────────────────

/// One unbreakable slice of a cell's content, stacked top to bottom.
///
/// Rows taller than a page are split between pieces, so a page break can
/// land between two wrapped lines or two bullets but never inside one.
enum Piece<'a> {
    Line {
        spec: TextSpec,
        text: String,
        indent: f32,
        bullet: bool,
    },
    Image {
        image: &'a ImageBlock,
        width: f32,
        height: f32,
    },
    Space(f32),
}

impl Piece<'_> {
    fn height(&self) -> f32 {
        match self {
            Piece::Line { spec, .. } => spec.leading,
            Piece::Image { height, .. } => *height,
            Piece::Space(height) => *height,
        }
    }
}

type Cell<'a> = Vec<Piece<'a>>;

fn text_pieces<'a>(spec: TextSpec, lines: Vec<String>) -> Cell<'a> {
    lines
        .into_iter()
        .map(|text| Piece::Line {
            spec,
            text,
            indent: 0.0,
            bullet: false,
        })
        .collect()
}

fn layout_cell<'a>(block: &'a Block, width: f32, theme: &Theme) -> Cell<'a> {
    match block {
        Block::Paragraph { text, style } => {
            let spec = TextSpec::paragraph(*style, theme);
            text_pieces(spec, spec.wrap(text, width))
        }
        Block::Heading { text, level } => {
            let spec = TextSpec::heading(*level, theme);
            text_pieces(spec, spec.wrap(text, width))
        }
        Block::BulletList { items, style } => {
            let spec = TextSpec::paragraph(*style, theme);
            let mut pieces = Vec::new();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    pieces.push(Piece::Space(BULLET_GAP));
                }
                let mut lines = spec.wrap(item, width - BULLET_INDENT);
                if lines.is_empty() {
                    lines.push(String::new());
                }
                for (j, text) in lines.into_iter().enumerate() {
                    pieces.push(Piece::Line {
                        spec,
                        text,
                        indent: BULLET_INDENT,
                        bullet: j == 0,
                    });
                }
            }
            pieces
        }
        Block::Image(image) => {
            let (width, height) = fit_image(image, width);
            vec![Piece::Image {
                image,
                width,
                height,
            }]
        }
        Block::Spacer { height } => vec![Piece::Space(*height)],
        Block::Table(_) => {
            debug!("Nested table inside a cell is not rendered");
            Vec::new()
        }
    }
}

/// Shrink an image's display box to `max_width`, keeping its aspect ratio.
fn fit_image(image: &ImageBlock, max_width: f32) -> (f32, f32) {
    if image.width > max_width && image.width > 0.0 {
        let factor = max_width / image.width;
        (max_width, image.height * factor)
    } else {
        (image.width, image.height)
    }
}

fn stacked_height(pieces: &[Piece<'_>]) -> f32 {
    pieces.iter().map(Piece::height).sum()
}

fn row_height<'p, C: AsRef<[Piece<'p>]>>(cells: &[C]) -> f32 {
    let content = cells
        .iter()
        .map(|cell| stacked_height(cell.as_ref()))
        .fold(0.0, f32::max);
    content + 2.0 * CELL_PAD_Y
}

/// Column geometry and header of a table, measured against the page.
struct TableFrame<'a> {
    x: f32,
    widths: Vec<f32>,
    header: Vec<Cell<'a>>,
    header_height: f32,
}

// ── Layout ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct PageContent {
    operations: Vec<Operation>,
    /// Indices into the layout's image list used on this page.
    images: Vec<usize>,
}

struct Layout<'a> {
    theme: &'a Theme,
    page_width: f32,
    page_height: f32,
    margin: f32,
    pages: Vec<PageContent>,
    current: PageContent,
    /// Cursor, measured down from the top edge of the page.
    y: f32,
    images: Vec<&'a ImageBlock>,
    image_index: HashMap<&'a str, usize>,
}

impl<'a> Layout<'a> {
    fn new(page_size: PageSize, margin: f32, theme: &'a Theme) -> Self {
        let (page_width, page_height) = page_size.dimensions();
        Self {
            theme,
            page_width,
            page_height,
            margin,
            pages: Vec::new(),
            current: PageContent::default(),
            y: margin,
            images: Vec::new(),
            image_index: HashMap::new(),
        }
    }

    fn finish(mut self) -> (Vec<PageContent>, Vec<&'a ImageBlock>) {
        self.pages.push(self.current);
        (self.pages, self.images)
    }

    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn bottom(&self) -> f32 {
        self.page_height - self.margin
    }

    fn at_top(&self) -> bool {
        self.y <= self.margin + EPSILON
    }

    fn new_page(&mut self) {
        let done = std::mem::take(&mut self.current);
        self.pages.push(done);
        self.y = self.margin;
    }

    /// Start a new page unless `height` still fits below the cursor.
    fn ensure(&mut self, height: f32) {
        if self.y + height > self.bottom() + EPSILON && !self.at_top() {
            self.new_page();
        }
    }

    /// Lay out `blocks` in order. A group heading moves to the next page
    /// unless the start of the table it introduces fits below it.
    fn blocks(&mut self, blocks: &'a [Block]) {
        for (i, block) in blocks.iter().enumerate() {
            if let Block::Heading {
                text,
                level: HeadingLevel::Group,
            } = block
            {
                let spec = TextSpec::heading(HeadingLevel::Group, self.theme);
                let lines = spec.wrap(text, self.content_width()).len() as f32;
                let heading = lines * spec.leading + spec.space_after;
                self.ensure(heading + self.lead_in(&blocks[i + 1..]));
            }
            self.block(block);
        }
    }

    /// Height of the spacers and the table start that follow a heading.
    fn lead_in(&self, blocks: &'a [Block]) -> f32 {
        let mut height = 0.0_f32;
        for block in blocks {
            match block {
                Block::Spacer { height: space } => height += *space,
                Block::Table(table) => {
                    if let Some(frame) = self.table_frame(table) {
                        let reserved = if table.repeat_header {
                            frame.header_height
                        } else {
                            0.0
                        };
                        height += frame.header_height;
                        if let Some(row) = table.rows.first() {
                            let cells = self.table_row(row, &frame.widths);
                            height += self.row_start_height(&cells, reserved);
                        }
                    }
                    break;
                }
                _ => break,
            }
        }
        height
    }

    fn block(&mut self, block: &'a Block) {
        match block {
            Block::Heading { text, level } => {
                self.text_block(text, TextSpec::heading(*level, self.theme))
            }
            Block::Paragraph { text, style } => {
                self.text_block(text, TextSpec::paragraph(*style, self.theme))
            }
            Block::BulletList { items, style } => {
                self.bullet_list(items, TextSpec::paragraph(*style, self.theme))
            }
            Block::Image(image) => self.image_block(image),
            Block::Table(table) => self.table(table),
            Block::Spacer { height } => {
                self.y += height;
                if self.y > self.bottom() {
                    self.new_page();
                }
            }
        }
    }

    fn text_block(&mut self, text: &str, spec: TextSpec) {
        let width = self.content_width();
        for line in spec.wrap(text, width) {
            self.ensure(spec.leading);
            self.draw_lines(self.margin, self.y, width, &spec, std::slice::from_ref(&line));
            self.y += spec.leading;
        }
        self.y += spec.space_after;
    }

    fn bullet_list(&mut self, items: &[String], spec: TextSpec) {
        let width = self.content_width() - BULLET_INDENT;
        for item in items {
            for (i, line) in spec.wrap(item, width).iter().enumerate() {
                self.ensure(spec.leading);
                if i == 0 {
                    self.draw_text(self.margin + BULLET_OFFSET, self.y + spec.baseline(), &spec, "•");
                }
                self.draw_text(self.margin + BULLET_INDENT, self.y + spec.baseline(), &spec, line);
                self.y += spec.leading;
            }
            self.y += BULLET_GAP;
        }
        self.y += spec.space_after;
    }

    fn image_block(&mut self, image: &'a ImageBlock) {
        let available = self.content_width();
        let (width, height) = fit_image(image, available);
        self.ensure(height);
        let x = match image.align {
            Align::Left => self.margin,
            Align::Center => self.margin + (available - width) / 2.0,
        };
        self.draw_image(image, x, self.y, width, height);
        self.y += height;
    }

    /// Column widths and header cells, or `None` for a table without columns.
    fn table_frame(&self, table: &TableBlock) -> Option<TableFrame<'a>> {
        if table.columns.is_empty() {
            return None;
        }

        let available = self.content_width();
        let total = table.total_width();
        let scale = if total > available { available / total } else { 1.0 };
        let widths: Vec<f32> = table.columns.iter().map(|c| c.width * scale).collect();
        let table_width: f32 = widths.iter().sum();
        if scale < 1.0 {
            debug!(scale, "Table wider than the page; scaling columns down");
        }

        let header_spec = TextSpec::table_header(self.theme);
        let header: Vec<Cell<'a>> = table
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| {
                text_pieces(
                    header_spec,
                    header_spec.wrap(&column.header, width - 2.0 * CELL_PAD_X),
                )
            })
            .collect();
        let header_height = row_height(&header);

        Some(TableFrame {
            x: self.margin + (available - table_width) / 2.0,
            widths,
            header,
            header_height,
        })
    }

    fn table_row(&self, row: &'a [Block], widths: &[f32]) -> Vec<Cell<'a>> {
        row.iter()
            .zip(widths)
            .map(|(block, width)| layout_cell(block, width - 2.0 * CELL_PAD_X, self.theme))
            .collect()
    }

    /// Height available to rows on a fresh page once `reserved` is drawn.
    fn page_room(&self, reserved: f32) -> f32 {
        self.bottom() - self.margin - reserved
    }

    /// Space a row needs on the page where it starts: all of it when it fits
    /// on one page, otherwise its first line.
    fn row_start_height(&self, cells: &[Cell<'a>], reserved: f32) -> f32 {
        let height = row_height(cells);
        if height <= self.page_room(reserved) + EPSILON {
            return height;
        }
        let first = cells
            .iter()
            .filter_map(|cell| cell.first())
            .map(Piece::height)
            .fold(0.0, f32::max);
        first + 2.0 * CELL_PAD_Y
    }

    fn table(&mut self, table: &'a TableBlock) {
        let Some(frame) = self.table_frame(table) else {
            return;
        };
        let rows: Vec<Vec<Cell<'a>>> = table
            .rows
            .iter()
            .map(|row| self.table_row(row, &frame.widths))
            .collect();
        let reserved = if table.repeat_header {
            frame.header_height
        } else {
            0.0
        };

        // Keep the header together with the first row.
        let first_row = rows
            .first()
            .map_or(0.0, |cells| self.row_start_height(cells, reserved));
        self.ensure(frame.header_height + first_row);
        self.draw_header(&frame);

        for cells in &rows {
            let height = row_height(cells);
            if self.y + height > self.bottom() + EPSILON
                && height <= self.page_room(reserved) + EPSILON
            {
                self.continue_table(&frame, table.repeat_header);
            }
            self.split_row(&frame, cells, table.repeat_header);
        }
    }

    fn continue_table(&mut self, frame: &TableFrame<'a>, repeat_header: bool) {
        self.new_page();
        if repeat_header {
            self.draw_header(frame);
        }
    }

    fn draw_header(&mut self, frame: &TableFrame<'a>) {
        let cells: Vec<&[Piece<'a>]> = frame.header.iter().map(Vec::as_slice).collect();
        let background = self.theme.header_background;
        self.draw_row(frame.x, &frame.widths, &cells, frame.header_height, Some(background));
    }

    /// Draw a row, carrying whatever does not fit over to the next page.
    fn split_row(&mut self, frame: &TableFrame<'a>, cells: &[Cell<'a>], repeat_header: bool) {
        let mut next = vec![0; cells.len()];
        let mut fresh = false;
        loop {
            let room = self.bottom() - self.y - 2.0 * CELL_PAD_Y;
            let mut end = next.clone();
            for (cell, stop) in cells.iter().zip(end.iter_mut()) {
                let mut used = 0.0_f32;
                while let Some(piece) = cell.get(*stop) {
                    if used + piece.height() > room + EPSILON {
                        break;
                    }
                    used += piece.height();
                    *stop += 1;
                }
            }

            let done = cells.iter().zip(&end).all(|(cell, to)| *to == cell.len());
            let progressed = next.iter().zip(&end).any(|(from, to)| to > from);
            if !done && !progressed {
                if !fresh {
                    self.continue_table(frame, repeat_header);
                    fresh = true;
                    continue;
                }
                // A piece taller than an empty page is drawn whole.
                for ((cell, from), to) in cells.iter().zip(&next).zip(end.iter_mut()) {
                    if *from < cell.len() {
                        *to = from + 1;
                    }
                }
            }

            let done = cells.iter().zip(&end).all(|(cell, to)| *to == cell.len());
            let parts: Vec<&[Piece<'a>]> = cells
                .iter()
                .zip(next.iter().zip(&end))
                .map(|(cell, (from, to))| &cell[*from..*to])
                .collect();
            let height = if done {
                row_height(&parts)
            } else {
                row_height(&parts).max(self.bottom() - self.y)
            };
            self.draw_row(frame.x, &frame.widths, &parts, height, None);
            if done {
                return;
            }

            next = end;
            self.continue_table(frame, repeat_header);
            fresh = true;
        }
    }

    fn draw_row(
        &mut self,
        x: f32,
        widths: &[f32],
        cells: &[&[Piece<'a>]],
        height: f32,
        background: Option<Rgb>,
    ) {
        let top = self.y;
        if let Some(color) = background {
            self.fill_rect(x, top, widths.iter().sum(), height, color);
        }

        let mut cell_x = x;
        for (cell, width) in cells.iter().zip(widths) {
            self.stroke_rect(cell_x, top, *width, height, self.theme.grid);
            self.draw_pieces(
                cell,
                cell_x + CELL_PAD_X,
                top + CELL_PAD_Y,
                width - 2.0 * CELL_PAD_X,
            );
            cell_x += width;
        }
        self.y = top + height;
    }

    fn draw_pieces(&mut self, pieces: &[Piece<'a>], x: f32, top: f32, width: f32) {
        let mut y = top;
        for piece in pieces {
            match piece {
                Piece::Line {
                    spec,
                    text,
                    indent,
                    bullet,
                } => {
                    if *bullet {
                        self.draw_text(x + BULLET_OFFSET, y + spec.baseline(), spec, "•");
                    }
                    if !text.is_empty() {
                        let lines = std::slice::from_ref(text);
                        self.draw_lines(x + indent, y, width - indent, spec, lines);
                    }
                }
                Piece::Image {
                    image,
                    width: image_width,
                    height,
                } => {
                    let image_x = match image.align {
                        Align::Left => x,
                        Align::Center => x + (width - image_width) / 2.0,
                    };
                    self.draw_image(*image, image_x, y, *image_width, *height);
                }
                Piece::Space(_) => {}
            }
            y += piece.height();
        }
    }

    // ── Drawing primitives (top-down coordinates) ────────────────────────

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.current.operations.push(Operation::new(operator, operands));
    }

    fn draw_lines(&mut self, x: f32, top: f32, width: f32, spec: &TextSpec, lines: &[String]) {
        for (i, line) in lines.iter().enumerate() {
            let line_x = match spec.align {
                Align::Left => x,
                Align::Center => x + (width - spec.width_of(line)) / 2.0,
            };
            let baseline = top + i as f32 * spec.leading + spec.baseline();
            self.draw_text(line_x, baseline, spec, line);
        }
    }

    fn draw_text(&mut self, x: f32, baseline: f32, spec: &TextSpec, text: &str) {
        let [r, g, b] = spec.color.unit();
        let y = self.page_height - baseline;
        self.push("BT", vec![]);
        self.push("rg", vec![r.into(), g.into(), b.into()]);
        self.push(
            "Tf",
            vec![Object::Name(spec.font.resource().into()), spec.size.into()],
        );
        self.push("Td", vec![x.into(), y.into()]);
        self.push(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)],
        );
        self.push("ET", vec![]);
    }

    fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Rgb) {
        let [r, g, b] = color.unit();
        let y = self.page_height - top - height;
        self.push("q", vec![]);
        self.push("rg", vec![r.into(), g.into(), b.into()]);
        self.push("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.push("f", vec![]);
        self.push("Q", vec![]);
    }

    fn stroke_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Rgb) {
        let [r, g, b] = color.unit();
        let y = self.page_height - top - height;
        self.push("q", vec![]);
        self.push("RG", vec![r.into(), g.into(), b.into()]);
        self.push("w", vec![GRID_LINE_WIDTH.into()]);
        self.push("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.push("S", vec![]);
        self.push("Q", vec![]);
    }

    fn draw_image(&mut self, image: &'a ImageBlock, x: f32, top: f32, width: f32, height: f32) {
        let index = match self.image_index.get(image.source.as_str()) {
            Some(&index) => index,
            None => {
                let index = self.images.len();
                self.images.push(image);
                self.image_index.insert(image.source.as_str(), index);
                index
            }
        };
        if !self.current.images.contains(&index) {
            self.current.images.push(index);
        }

        let y = self.page_height - top - height;
        self.push("q", vec![]);
        self.push(
            "cm",
            vec![
                width.into(),
                Object::Integer(0),
                Object::Integer(0),
                height.into(),
                x.into(),
                y.into(),
            ],
        );
        self.push("Do", vec![Object::Name(image_name(index).into_bytes())]);
        self.push("Q", vec![]);
    }
}
