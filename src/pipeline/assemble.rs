//! Document assembly: put the title, sections and footer in order.
//!
//! This stage only orders blocks. Fonts, wrapping and page breaks are
//! decided by the [`crate::writer::DocumentWriter`].

use crate::document::{Block, Document, HeadingLevel, TextStyle};
use crate::pipeline::table::Section;
use chrono::{DateTime, Local};

/// Timestamp format used in the footer.
pub const FOOTER_TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Build the final block sequence.
///
/// Order: title, subtitle, spacer, every section in group order, spacer,
/// footer.
pub fn assemble(
    title: &str,
    subtitle: &str,
    sections: Vec<Section>,
    generated_at: DateTime<Local>,
    footer_label: &str,
) -> Document {
    let section_blocks: usize = sections.iter().map(|s| s.blocks.len()).sum();
    let mut blocks = Vec::with_capacity(section_blocks + 5);

    blocks.push(Block::heading(title, HeadingLevel::Title));
    blocks.push(Block::paragraph(subtitle, TextStyle::Subtitle));
    blocks.push(Block::spacer(12.0));

    for section in sections {
        blocks.extend(section.blocks);
    }

    blocks.push(Block::spacer(12.0));
    blocks.push(Block::paragraph(
        footer_text(generated_at, footer_label),
        TextStyle::Footer,
    ));

    Document {
        title: title.to_string(),
        generated_at,
        blocks,
    }
}

/// `"Generated on: 19-10-2026 14:03:07 | <label>"`
pub fn footer_text(generated_at: DateTime<Local>, label: &str) -> String {
    let stamp = generated_at.format(FOOTER_TIME_FORMAT);
    if label.is_empty() {
        format!("Generated on: {stamp}")
    } else {
        format!("Generated on: {stamp} | {label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Column, TableBlock};
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, 14, 3, 7).unwrap()
    }

    fn section(name: &str) -> Section {
        Section {
            name: Some(name.to_string()),
            blocks: vec![
                Block::heading(name, HeadingLevel::Group),
                Block::Table(TableBlock {
                    columns: vec![Column {
                        header: "Product".into(),
                        width: 120.0,
                    }],
                    rows: Vec::new(),
                    repeat_header: true,
                }),
            ],
            rows: 0,
        }
    }

    #[test]
    fn blocks_are_in_fixed_order() {
        let doc = assemble(
            "CATALOG",
            "Listing",
            vec![section("B"), section("A")],
            at(),
            "System: Test",
        );

        assert_eq!(doc.blocks[0], Block::heading("CATALOG", HeadingLevel::Title));
        assert_eq!(doc.blocks[1], Block::paragraph("Listing", TextStyle::Subtitle));
        assert_eq!(doc.blocks[2], Block::spacer(12.0));
        assert_eq!(doc.blocks[3], Block::heading("B", HeadingLevel::Group));
        assert_eq!(doc.blocks[5], Block::heading("A", HeadingLevel::Group));
        assert_eq!(doc.blocks[7], Block::spacer(12.0));
        assert_eq!(
            doc.blocks[8],
            Block::paragraph(
                "Generated on: 19-10-2026 14:03:07 | System: Test",
                TextStyle::Footer
            )
        );
        assert_eq!(doc.blocks.len(), 9);
        assert_eq!(doc.tables().count(), 2);
    }

    #[test]
    fn no_sections_still_has_frame() {
        let doc = assemble("T", "S", Vec::new(), at(), "");
        assert_eq!(doc.blocks.len(), 5);
        assert_eq!(doc.blocks[4].text(), Some("Generated on: 19-10-2026 14:03:07"));
    }
}
