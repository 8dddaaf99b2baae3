//! Block classification: buckets and reading order
//!
//! A single pass over a page's block tree groups bounding boxes by
//! structural category and builds the numbered reading-order sequence.
//! Classification is a pure function of the page record; running it
//! twice yields identical results.

use std::collections::BTreeMap;

use crate::geometry::BBox;
use crate::model::{Block, PageLayout, SubBlock, SubBlockKind};

/// Structural category of a visualized region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Region dropped by the analyzer
    Discarded,
    /// Whole table region (sub-parts carry the content)
    Table,
    /// Table body
    TableBody,
    /// Table caption
    TableCaption,
    /// Table footnote
    TableFootnote,
    /// Whole image region (sub-parts carry the content)
    Image,
    /// Image body
    ImageBody,
    /// Image caption
    ImageCaption,
    /// Image footnote
    ImageFootnote,
    /// Heading
    Title,
    /// Body text
    Text,
    /// Display equation
    InterlineEquation,
    /// List region
    List,
    /// Index region
    Index,
}

/// Reading-order priority for table sub-blocks: captions before the
/// body, footnotes last, regardless of analyzer emission order.
const fn table_order(kind: SubBlockKind) -> Option<u8> {
    match kind {
        SubBlockKind::TableCaption => Some(1),
        SubBlockKind::TableBody => Some(2),
        SubBlockKind::TableFootnote => Some(3),
        _ => None,
    }
}

/// Per-page classification result: category buckets plus the reading
/// order sequence. Buckets preserve insertion order; it only matters
/// for numbering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedPage {
    buckets: BTreeMap<Category, Vec<BBox>>,
    /// Boxes in reading order, spanning all categories except Discarded
    pub reading_order: Vec<BBox>,
}

impl ClassifiedPage {
    /// Boxes collected for a category, empty if none were seen.
    #[inline]
    #[must_use]
    pub fn bucket(&self, category: Category) -> &[BBox] {
        self.buckets.get(&category).map_or(&[], Vec::as_slice)
    }

    /// No bucket has content and the reading order is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reading_order.is_empty() && self.buckets.values().all(Vec::is_empty)
    }

    /// The paste set for clean reconstruction: every recognized content
    /// region, excluding Discarded boxes and the raw Table/Image parent
    /// boxes (only their sub-parts are pasted, avoiding double
    /// coverage).
    #[must_use]
    pub fn content_regions(&self) -> Vec<BBox> {
        const ORDER: [Category; 11] = [
            Category::TableBody,
            Category::TableCaption,
            Category::TableFootnote,
            Category::ImageBody,
            Category::ImageCaption,
            Category::ImageFootnote,
            Category::Title,
            Category::Text,
            Category::InterlineEquation,
            Category::List,
            Category::Index,
        ];
        ORDER
            .iter()
            .flat_map(|c| self.bucket(*c).iter().copied())
            .collect()
    }

    fn push(&mut self, category: Category, bbox: BBox) {
        self.buckets.entry(category).or_default().push(bbox);
    }
}

fn bucket_sub_blocks(out: &mut ClassifiedPage, blocks: &[SubBlock]) {
    for sub in blocks {
        if let Some(category) = sub_category(sub.kind) {
            out.push(category, sub.bbox);
        }
    }
}

fn sub_category(kind: SubBlockKind) -> Option<Category> {
    match kind {
        SubBlockKind::TableBody => Some(Category::TableBody),
        SubBlockKind::TableCaption => Some(Category::TableCaption),
        SubBlockKind::TableFootnote => Some(Category::TableFootnote),
        SubBlockKind::ImageBody => Some(Category::ImageBody),
        SubBlockKind::ImageCaption => Some(Category::ImageCaption),
        SubBlockKind::ImageFootnote => Some(Category::ImageFootnote),
        SubBlockKind::Unknown => None,
    }
}

/// Classify one page: bucket every bounding box by category and build
/// the reading-order sequence.
///
/// Table and Image blocks contribute both their own box (to the parent
/// bucket) and their sub-blocks' boxes; descent stops at one level.
/// Sub-blocks with an unknown role are skipped. In reading order,
/// table sub-blocks are re-sorted caption, body, footnote; image
/// sub-blocks keep analyzer order.
#[must_use]
pub fn classify_page(page: &PageLayout) -> ClassifiedPage {
    let mut out = ClassifiedPage::default();

    for dropped in &page.discarded_blocks {
        out.push(Category::Discarded, dropped.bbox);
    }

    for block in &page.para_blocks {
        match block {
            Block::Table { bbox, blocks } => {
                out.push(Category::Table, *bbox);
                bucket_sub_blocks(&mut out, blocks);
            }
            Block::Image { bbox, blocks } => {
                out.push(Category::Image, *bbox);
                bucket_sub_blocks(&mut out, blocks);
            }
            Block::Title { bbox, .. } => out.push(Category::Title, *bbox),
            Block::Text { bbox, .. } => out.push(Category::Text, *bbox),
            Block::InterlineEquation { bbox, .. } => {
                out.push(Category::InterlineEquation, *bbox);
            }
            Block::List { bbox, .. } => out.push(Category::List, *bbox),
            Block::Index { bbox, .. } => out.push(Category::Index, *bbox),
        }
    }

    for block in &page.para_blocks {
        match block {
            Block::Text { bbox, .. }
            | Block::Title { bbox, .. }
            | Block::InterlineEquation { bbox, .. }
            | Block::List { bbox, .. }
            | Block::Index { bbox, .. } => out.reading_order.push(*bbox),
            Block::Image { blocks, .. } => {
                for sub in blocks.iter().filter(|s| sub_category(s.kind).is_some()) {
                    out.reading_order.push(sub.bbox);
                }
            }
            Block::Table { blocks, .. } => {
                // Stable sort keeps ties (duplicate roles) in input order.
                let mut ordered: Vec<&SubBlock> = blocks
                    .iter()
                    .filter(|s| table_order(s.kind).is_some())
                    .collect();
                ordered.sort_by_key(|s| table_order(s.kind));
                for sub in ordered {
                    out.reading_order.push(sub.bbox);
                }
            }
        }
    }

    out
}
