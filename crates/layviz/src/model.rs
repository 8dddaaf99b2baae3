//! Structural block-tree model
//!
//! Mirrors the layout analyzer's per-page JSON dump: a page carries an
//! ordered sequence of typed blocks, Table and Image blocks carry one
//! level of typed sub-blocks, and text content hangs off blocks as
//! line/span structure. The tree is a read-only input; nothing here
//! mutates it.

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

/// A top-level structural block.
///
/// Closed set: Table and Image are the only variants with sub-blocks,
/// and descent never goes deeper than one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Body text paragraph
    Text {
        /// Block bounds in page units
        bbox: BBox,
        /// Line/span structure
        #[serde(default)]
        lines: Vec<Line>,
    },
    /// Heading
    Title {
        /// Block bounds in page units
        bbox: BBox,
        /// Line/span structure
        #[serde(default)]
        lines: Vec<Line>,
    },
    /// Display equation
    InterlineEquation {
        /// Block bounds in page units
        bbox: BBox,
        /// Line/span structure
        #[serde(default)]
        lines: Vec<Line>,
    },
    /// List region
    List {
        /// Block bounds in page units
        bbox: BBox,
        /// Line/span structure
        #[serde(default)]
        lines: Vec<Line>,
    },
    /// Index / table-of-contents region
    Index {
        /// Block bounds in page units
        bbox: BBox,
        /// Line/span structure
        #[serde(default)]
        lines: Vec<Line>,
    },
    /// Table with caption/body/footnote sub-blocks
    Table {
        /// Bounds of the whole table region
        bbox: BBox,
        /// Typed sub-blocks, in analyzer emission order
        #[serde(default)]
        blocks: Vec<SubBlock>,
    },
    /// Image with caption/body/footnote sub-blocks
    Image {
        /// Bounds of the whole image region
        bbox: BBox,
        /// Typed sub-blocks, in analyzer emission order
        #[serde(default)]
        blocks: Vec<SubBlock>,
    },
}

impl Block {
    /// The block's own bounding box.
    #[inline]
    #[must_use]
    pub const fn bbox(&self) -> BBox {
        match self {
            Self::Text { bbox, .. }
            | Self::Title { bbox, .. }
            | Self::InterlineEquation { bbox, .. }
            | Self::List { bbox, .. }
            | Self::Index { bbox, .. }
            | Self::Table { bbox, .. }
            | Self::Image { bbox, .. } => *bbox,
        }
    }
}

/// A typed sub-block inside a Table or Image block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubBlock {
    /// Sub-block role
    #[serde(rename = "type")]
    pub kind: SubBlockKind,
    /// Sub-block bounds in page units
    pub bbox: BBox,
    /// Line/span structure
    #[serde(default)]
    pub lines: Vec<Line>,
}

/// Role of a Table/Image sub-block.
///
/// Unrecognized roles deserialize to [`SubBlockKind::Unknown`] and are
/// silently skipped by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubBlockKind {
    /// Table caption
    TableCaption,
    /// Table body
    TableBody,
    /// Table footnote
    TableFootnote,
    /// Image caption
    ImageCaption,
    /// Image body
    ImageBody,
    /// Image footnote
    ImageFootnote,
    /// Any role this model does not know
    #[serde(other)]
    Unknown,
}

/// A line of spans inside a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Spans in visual order
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// Leaf content unit inside a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Span bounds in page units
    pub bbox: BBox,
    /// Content type tag
    #[serde(rename = "type")]
    pub kind: ContentType,
    /// The span's visual content continues onto the next page
    #[serde(default)]
    pub cross_page: bool,
}

/// Content type of a span. Only text spans participate in last-line
/// extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Plain text
    Text,
    /// Inline equation
    InlineEquation,
    /// Display equation
    InterlineEquation,
    /// Raster content
    Image,
    /// Table content
    Table,
    /// Anything else
    #[serde(other)]
    Other,
}

/// A discarded region (headers, footers, noise) excluded from reading
/// order but still visualized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardedBlock {
    /// Region bounds in page units
    pub bbox: BBox,
}

/// Per-page structural record from the analyzer dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Final paragraph-level blocks (layout visualization input)
    #[serde(default)]
    pub para_blocks: Vec<Block>,
    /// Pre-processing blocks (span extraction input)
    #[serde(default)]
    pub preproc_blocks: Vec<Block>,
    /// Regions dropped by the analyzer
    #[serde(default)]
    pub discarded_blocks: Vec<DiscardedBlock>,
}

/// On-disk layout dump: either a bare page array or an object wrapping
/// it in a `pdf_info` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayoutDump {
    /// Bare page array
    Pages(Vec<PageLayout>),
    /// Wrapped form, as written by the analyzer
    Wrapped {
        /// The page array
        pdf_info: Vec<PageLayout>,
    },
}

impl LayoutDump {
    /// The page sequence, whichever form the dump used.
    #[must_use]
    pub fn into_pages(self) -> Vec<PageLayout> {
        match self {
            Self::Pages(pages) | Self::Wrapped { pdf_info: pages } => pages,
        }
    }
}
