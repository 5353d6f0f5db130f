//! Grouping and table construction.
//!
//! Items are bucketed by the stringified value at `group_path` in
//! first-seen order, then each bucket becomes one section: an optional group
//! heading, a table (header row plus one row per item) and an optional
//! "End of …" marker. Every table in a document has the same columns:
//! name, description, image, then the configured extra columns.

use crate::config::GenerationConfig;
use crate::document::{Block, Column, HeadingLevel, TableBlock, TextStyle};
use crate::pipeline::describe;
use crate::pipeline::image::{extract_image_url, ImageCache, ImageFetcher};
use crate::pipeline::resolve::{resolve, resolve_string};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// Group name for items whose group key is missing.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Cell text for a missing extra-column value.
pub const MISSING_VALUE: &str = "-";

/// A bucket of items sharing a group key.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    /// `None` for the single implicit group used when grouping is off.
    pub name: Option<String>,
    pub items: Vec<&'a Value>,
}

/// Partition `items` by the value at `group_path`.
///
/// Buckets appear in the order their key is first seen. With no
/// `group_path` every item lands in one unnamed group; an empty catalog
/// yields no groups at all.
pub fn group_items<'a>(items: &'a [Value], group_path: Option<&str>) -> Vec<Group<'a>> {
    let Some(path) = group_path else {
        if items.is_empty() {
            return Vec::new();
        }
        return vec![Group {
            name: None,
            items: items.iter().collect(),
        }];
    };

    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = resolve_string(item, path).unwrap_or_else(|| UNCATEGORIZED.to_string());
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                name: Some(key),
                items: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].items.push(item);
    }

    groups
}

/// The blocks emitted for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: Option<String>,
    pub blocks: Vec<Block>,
    pub rows: usize,
}

/// Counters gathered while building rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub items: usize,
    pub images_embedded: usize,
    pub image_fallbacks: usize,
    pub image_cache_hits: usize,
}

/// Builds group sections from catalog items.
pub struct TableBuilder<'a> {
    config: &'a GenerationConfig,
    fetcher: &'a ImageFetcher,
}

impl<'a> TableBuilder<'a> {
    pub fn new(config: &'a GenerationConfig, fetcher: &'a ImageFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Column definitions shared by every table of the document.
    pub fn columns(&self) -> Vec<Column> {
        let headers = &self.config.headers;
        let widths = &self.config.widths;
        let mapping = &self.config.mapping;
        let extra_width = widths.extra_width(mapping);

        let mut columns = vec![
            Column {
                header: headers.name.clone(),
                width: widths.name,
            },
            Column {
                header: headers.description.clone(),
                width: widths.description,
            },
            Column {
                header: headers.image.clone(),
                width: widths.image,
            },
        ];
        columns.extend(mapping.extra_columns.iter().map(|c| Column {
            header: c.header.clone(),
            width: extra_width,
        }));
        columns
    }

    /// Group `items` and build one section per non-empty group.
    ///
    /// Items are processed strictly one after another; each image download
    /// finishes (or times out) before the next row starts.
    pub async fn build(&self, items: &[Value], cache: &mut ImageCache) -> (Vec<Section>, BuildStats) {
        let mapping = &self.config.mapping;
        let groups = group_items(items, mapping.group_path.as_deref());
        let progress = self.config.progress_callback.as_ref();
        let total = items.len();

        info!("{} items in {} groups", total, groups.len());
        if let Some(cb) = progress {
            cb.on_generation_start(total, groups.len());
        }

        let mut stats = BuildStats::default();
        let mut sections = Vec::with_capacity(groups.len());

        for group in groups {
            if group.items.is_empty() {
                continue;
            }
            if let Some(cb) = progress {
                cb.on_group_start(group.name.as_deref(), group.items.len());
            }
            debug!(
                "Building group {:?} ({} items)",
                group.name.as_deref().unwrap_or("<all>"),
                group.items.len()
            );

            let mut rows = Vec::with_capacity(group.items.len());
            for item in &group.items {
                rows.push(self.build_row(item, cache, &mut stats).await);
                stats.items += 1;
                if let Some(cb) = progress {
                    cb.on_item_complete(stats.items, total);
                }
            }

            sections.push(self.section(group.name, rows));
        }

        (sections, stats)
    }

    async fn build_row(&self, item: &Value, cache: &mut ImageCache, stats: &mut BuildStats) -> Vec<Block> {
        let mapping = &self.config.mapping;
        let mut row = Vec::with_capacity(mapping.column_count());

        let name = resolve_string(item, &mapping.name_path).unwrap_or_default();
        row.push(Block::paragraph(name, TextStyle::Cell));

        let description = resolve_string(item, &mapping.desc_path);
        row.push(describe::normalize(description.as_deref()));

        let url = extract_image_url(resolve(item, &mapping.images_path));
        let image = self.fetcher.fetch(url.as_deref(), cache).await;
        if image.cache_hit {
            stats.image_cache_hits += 1;
        }
        match (&image.block, &image.error) {
            (Block::Image(_), _) => stats.images_embedded += 1,
            (_, error) => {
                stats.image_fallbacks += 1;
                if let Some(cb) = self.config.progress_callback.as_ref() {
                    let reason = error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "no image URL".to_string());
                    cb.on_image_fallback(url.as_deref(), &reason);
                }
            }
        }
        row.push(image.block);

        for column in &mapping.extra_columns {
            let value = resolve_string(item, &column.path).unwrap_or_else(|| MISSING_VALUE.to_string());
            row.push(Block::paragraph(value, TextStyle::Cell));
        }

        row
    }

    fn section(&self, name: Option<String>, rows: Vec<Vec<Block>>) -> Section {
        let row_count = rows.len();
        let table = Block::Table(TableBlock {
            columns: self.columns(),
            rows,
            repeat_header: true,
        });

        let blocks = match &name {
            Some(group) => vec![
                Block::heading(group.clone(), HeadingLevel::Group),
                Block::spacer(12.0),
                table,
                Block::spacer(12.0),
                Block::paragraph(format!("End of {group}"), TextStyle::EndMarker),
                Block::spacer(24.0),
            ],
            None => vec![table],
        };

        Section {
            name,
            blocks,
            rows: row_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtraColumn, FieldMapping};
    use crate::error::NO_IMAGE;
    use serde_json::json;

    fn names<'a>(groups: &'a [Group<'a>]) -> Vec<Option<&'a str>> {
        groups.iter().map(|g| g.name.as_deref()).collect()
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let items = vec![
            json!({"category": "B", "id": 1}),
            json!({"category": "A", "id": 2}),
            json!({"category": "B", "id": 3}),
        ];
        let groups = group_items(&items, Some("category"));
        assert_eq!(names(&groups), [Some("B"), Some("A")]);
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[0].items[1]["id"], 3);
    }

    #[test]
    fn missing_keys_are_uncategorized_and_values_stringified() {
        let items = vec![
            json!({"dept": 7}),
            json!({}),
            json!({"dept": null}),
            json!({"dept": "7"}),
        ];
        let groups = group_items(&items, Some("dept"));
        assert_eq!(names(&groups), [Some("7"), Some(UNCATEGORIZED)]);
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].items.len(), 2);
    }

    #[test]
    fn disabled_grouping_yields_one_unnamed_group() {
        let items = vec![json!({"category": "B"}), json!({"category": "A"})];
        let groups = group_items(&items, None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, None);
        assert_eq!(groups[0].items.len(), 2);
        assert!(group_items(&[], None).is_empty());
    }

    #[test]
    fn every_item_lands_in_exactly_one_group() {
        let items: Vec<Value> = (0..50)
            .map(|i| match i % 4 {
                0 => json!({"g": "x"}),
                1 => json!({"g": i % 3}),
                2 => json!({}),
                _ => json!({"g": {"nested": true}}),
            })
            .collect();
        let groups = group_items(&items, Some("g"));
        let total: usize = groups.iter().map(|g| g.items.len()).sum();
        assert_eq!(total, items.len());
    }

    fn config(mapping: FieldMapping) -> GenerationConfig {
        GenerationConfig::builder().mapping(mapping).build().unwrap()
    }

    fn table_of(section: &Section) -> &TableBlock {
        section
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .expect("section has a table")
    }

    #[tokio::test]
    async fn grouped_sections_have_heading_table_and_end_marker() {
        let cfg = config(FieldMapping::default());
        let fetcher = ImageFetcher::new(1, 90.0).unwrap();
        let mut cache = ImageCache::new().unwrap();
        let items = vec![
            json!({"category": "B", "product_name": "Gauze", "product_description": "<ul><li>A</li><li></li><li>B</li></ul>"}),
            json!({"category": "A", "product_name": "Mask"}),
        ];

        let (sections, stats) = TableBuilder::new(&cfg, &fetcher).build(&items, &mut cache).await;

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].name.as_deref(), Some("B"));
        assert_eq!(
            sections[0].blocks.first(),
            Some(&Block::heading("B", HeadingLevel::Group))
        );
        assert!(sections[0]
            .blocks
            .contains(&Block::paragraph("End of B", TextStyle::EndMarker)));

        let row = &table_of(&sections[0]).rows[0];
        assert_eq!(row[0], Block::paragraph("Gauze", TextStyle::Cell));
        assert_eq!(
            row[1],
            Block::BulletList {
                items: vec!["A".into(), "B".into()],
                style: TextStyle::Description
            }
        );
        assert_eq!(row[2].text(), Some(NO_IMAGE));

        let row = &table_of(&sections[1]).rows[0];
        assert_eq!(row[1].text(), Some(describe::NO_DESCRIPTION));

        assert_eq!(stats.items, 2);
        assert_eq!(stats.image_fallbacks, 2);
        assert_eq!(stats.images_embedded, 0);
    }

    #[tokio::test]
    async fn ungrouped_build_has_no_heading_or_marker() {
        let cfg = config(FieldMapping {
            group_path: None,
            ..FieldMapping::default()
        });
        let fetcher = ImageFetcher::new(1, 90.0).unwrap();
        let mut cache = ImageCache::new().unwrap();
        let items = vec![
            json!({"category": "B", "product_name": "one"}),
            json!({"category": "A", "product_name": "two"}),
            json!({"product_name": "three"}),
        ];

        let (sections, _) = TableBuilder::new(&cfg, &fetcher).build(&items, &mut cache).await;

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].rows, 3);
        assert!(sections[0].blocks.iter().all(|b| matches!(b, Block::Table(_))));
    }

    #[tokio::test]
    async fn extra_columns_stringify_or_dash() {
        let cfg = config(FieldMapping {
            extra_columns: vec![
                ExtraColumn::new("SKU", "meta.sku").unwrap(),
                ExtraColumn::new("Stock", "meta.stock").unwrap(),
            ],
            ..FieldMapping::default()
        });
        let fetcher = ImageFetcher::new(1, 90.0).unwrap();
        let mut cache = ImageCache::new().unwrap();
        let items = vec![json!({"product_name": "Gloves", "meta": {"stock": 40}})];

        let (sections, _) = TableBuilder::new(&cfg, &fetcher).build(&items, &mut cache).await;
        let table = table_of(&sections[0]);

        assert_eq!(table.columns.len(), 5);
        assert_eq!(table.columns[3].header, "SKU");
        assert_eq!(table.columns[3].width, 70.0);
        assert_eq!(table.rows[0].len(), 5);
        assert_eq!(table.rows[0][3].text(), Some(MISSING_VALUE));
        assert_eq!(table.rows[0][4].text(), Some("40"));
        assert_eq!(sections[0].name.as_deref(), Some(UNCATEGORIZED));
    }

    #[tokio::test]
    async fn empty_catalog_builds_nothing() {
        let cfg = config(FieldMapping::default());
        let fetcher = ImageFetcher::new(1, 90.0).unwrap();
        let mut cache = ImageCache::new().unwrap();
        let (sections, stats) = TableBuilder::new(&cfg, &fetcher).build(&[], &mut cache).await;
        assert!(sections.is_empty());
        assert_eq!(stats, BuildStats::default());
    }

    #[test]
    fn base_columns_use_configured_headers() {
        let cfg = config(FieldMapping::default());
        let fetcher = ImageFetcher::new(1, 90.0).unwrap();
        let columns = TableBuilder::new(&cfg, &fetcher).columns();
        let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, ["Product", "Description", "Image"]);
        let widths: Vec<f32> = columns.iter().map(|c| c.width).collect();
        assert_eq!(widths, [120.0, 230.0, 100.0]);
    }
}
