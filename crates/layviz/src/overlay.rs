//! Overlay rendering onto the source document
//!
//! Draws each page's category buckets as colored rectangles (filled at
//! 30% opacity) and numbers the reading-order sequence, then composites
//! the drawing as an additional content stream on the original page.
//! The original content is isolated in a `q`/`Q` pair so leftover
//! graphics state cannot skew the overlay. Pages without drawable
//! content pass through untouched.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::classify::{Category, ClassifiedPage};
use crate::error::Result;
use crate::geometry::{map_to_canvas, CanvasRect, PageGeometry, Rotation};
use crate::pdf;

/// Resource name of the fill-opacity graphics state.
const FILL_GS_NAME: &[u8] = b"GSlv0";
/// Resource name of the label font.
const LABEL_FONT_NAME: &[u8] = b"Flv0";

/// Buckets drawn on the overlay, in draw order. The raw Table/Image
/// parent boxes are not drawn; their sub-parts are.
const DRAW_ORDER: [Category; 12] = [
    Category::Discarded,
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

/// RGB color for each category bucket.
#[inline]
const fn category_color(category: Category) -> [u8; 3] {
    match category {
        Category::Discarded => [158, 158, 158],          // Gray
        Category::Table | Category::TableBody => [204, 204, 0], // Olive
        Category::TableCaption => [255, 255, 102],       // Light yellow
        Category::TableFootnote => [229, 255, 204],      // Pale green
        Category::Image | Category::ImageBody => [153, 255, 51], // Green
        Category::ImageCaption => [102, 178, 255],       // Light blue
        Category::ImageFootnote => [255, 178, 102],      // Light orange
        Category::Title => [102, 102, 255],              // Blue
        Category::Text => [153, 0, 76],                  // Maroon
        Category::InterlineEquation => [0, 255, 0],      // Bright green
        Category::List | Category::Index => [40, 169, 92], // Sea green
    }
}

/// Overlay rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOptions {
    /// Opacity of filled category rectangles (0.0 - 1.0)
    pub fill_opacity: f32,
    /// Label font size in page units
    pub label_font_size: f32,
    /// Gap between a box edge and its label
    pub label_offset: f64,
    /// Whether to number the reading-order sequence
    pub show_reading_order: bool,
    /// Also stroke the reading-order boxes (labels only by default)
    pub reading_order_boxes: bool,
    /// Stroke/label color of the reading-order layer
    pub reading_order_color: [u8; 3],
}

impl Default for OverlayOptions {
    #[inline]
    fn default() -> Self {
        Self {
            fill_opacity: 0.3,
            label_font_size: 10.0,
            label_offset: 2.0,
            show_reading_order: true,
            reading_order_boxes: false,
            reading_order_color: [255, 0, 0],
        }
    }
}

#[inline]
fn color_operands(color: [u8; 3]) -> Vec<Object> {
    color
        .iter()
        .map(|c| Object::Real(f32::from(*c) / 255.0))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
#[inline]
fn rect_operands(rect: CanvasRect) -> Vec<Object> {
    vec![
        Object::Real(rect.x as f32),
        Object::Real(rect.y as f32),
        Object::Real(rect.width as f32),
        Object::Real(rect.height as f32),
    ]
}

/// Emit one rectangle, filled (under the shared opacity state) or
/// stroked.
fn push_rect(ops: &mut Vec<Operation>, rect: CanvasRect, color: [u8; 3], filled: bool) {
    ops.push(Operation::new("q", vec![]));
    if filled {
        ops.push(Operation::new(
            "gs",
            vec![Object::Name(FILL_GS_NAME.to_vec())],
        ));
        ops.push(Operation::new("rg", color_operands(color)));
    } else {
        ops.push(Operation::new("RG", color_operands(color)));
    }
    ops.push(Operation::new("re", rect_operands(rect)));
    ops.push(Operation::new(if filled { "f" } else { "S" }, vec![]));
    ops.push(Operation::new("Q", vec![]));
}

/// Anchor point of a reading-order label: just outside the box, on the
/// side that reads as "after the box" in the displayed orientation.
fn label_anchor(rect: CanvasRect, rotation: Rotation, font_size: f64, offset: f64) -> (f64, f64) {
    match rotation {
        Rotation::None => (rect.x + rect.width + offset, rect.y + rect.height - font_size),
        Rotation::Degrees90 => (rect.x + font_size, rect.y + rect.height + offset),
        Rotation::Degrees180 => (rect.x - offset, rect.y + font_size),
        Rotation::Degrees270 => (rect.x + rect.width - font_size, rect.y - offset),
    }
}

/// Emit a 1-based sequence number next to a box, rotated with the page
/// via the text matrix.
#[allow(clippy::cast_possible_truncation)]
fn push_label(
    ops: &mut Vec<Operation>,
    rect: CanvasRect,
    number: usize,
    rotation: Rotation,
    options: &OverlayOptions,
) {
    let font_size = f64::from(options.label_font_size);
    let (tx, ty) = label_anchor(rect, rotation, font_size, options.label_offset);
    let (cos, sin): (f32, f32) = match rotation {
        Rotation::None => (1.0, 0.0),
        Rotation::Degrees90 => (0.0, 1.0),
        Rotation::Degrees180 => (-1.0, 0.0),
        Rotation::Degrees270 => (0.0, -1.0),
    };

    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "rg",
        color_operands(options.reading_order_color),
    ));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(LABEL_FONT_NAME.to_vec()),
            Object::Real(options.label_font_size),
        ],
    ));
    ops.push(Operation::new(
        "Tm",
        vec![
            Object::Real(cos),
            Object::Real(sin),
            Object::Real(-sin),
            Object::Real(cos),
            Object::Real(tx as f32),
            Object::Real(ty as f32),
        ],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(
            number.to_string().into_bytes(),
            lopdf::StringFormat::Literal,
        )],
    ));
    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

/// Build the full overlay operation list for one page.
fn build_page_ops(
    geom: &PageGeometry,
    classified: &ClassifiedPage,
    options: &OverlayOptions,
) -> Vec<Operation> {
    let mut ops = Vec::new();

    for category in DRAW_ORDER {
        for bbox in classified.bucket(category) {
            if let Some(rect) = map_to_canvas(geom, *bbox) {
                push_rect(&mut ops, rect, category_color(category), true);
            }
        }
    }

    if options.show_reading_order {
        for (i, bbox) in classified.reading_order.iter().enumerate() {
            if let Some(rect) = map_to_canvas(geom, *bbox) {
                if options.reading_order_boxes {
                    push_rect(&mut ops, rect, options.reading_order_color, false);
                }
                push_label(&mut ops, rect, i + 1, geom.rotation, options);
            }
        }
    }

    ops
}

/// Clone the page's effective resources (own or inherited) and graft in
/// the overlay's graphics state and font entries.
fn ensure_overlay_resources(
    doc: &mut Document,
    page_id: ObjectId,
    gs_id: ObjectId,
    font_id: ObjectId,
) -> Result<()> {
    let mut resources = match pdf::resolve_inherited(doc, page_id, b"Resources") {
        Some(Object::Reference(rid)) => doc
            .get_object(*rid)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .cloned()
            .unwrap_or_default(),
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let entries: [(&[u8], &[u8], ObjectId); 2] = [
        (b"ExtGState", FILL_GS_NAME, gs_id),
        (b"Font", LABEL_FONT_NAME, font_id),
    ];
    for (class, name, id) in entries {
        let mut class_dict = match resources.get(class) {
            Ok(Object::Reference(rid)) => doc
                .get_object(*rid)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .cloned()
                .unwrap_or_default(),
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        class_dict.set(name, Object::Reference(id));
        resources.set(class, Object::Dictionary(class_dict));
    }

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Composite the overlay operations onto a page: wrap the original
/// content in `q`/`Q` and append the overlay stream.
fn attach_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    ops: Vec<Operation>,
    gs_id: ObjectId,
    font_id: ObjectId,
) -> Result<()> {
    let prefix_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let mut operations = vec![Operation::new("Q", vec![])];
    operations.extend(ops);
    let encoded = Content { operations }.encode()?;
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    ensure_overlay_resources(doc, page_id, gs_id, font_id)?;

    let existing = doc
        .get_object(page_id)?
        .as_dict()?
        .get(b"Contents")
        .ok()
        .cloned();
    let new_contents = match existing {
        Some(Object::Array(arr)) => {
            let mut v = Vec::with_capacity(arr.len() + 2);
            v.push(Object::Reference(prefix_id));
            v.extend(arr);
            v.push(Object::Reference(overlay_id));
            v
        }
        Some(reference @ Object::Reference(_)) => vec![
            Object::Reference(prefix_id),
            reference,
            Object::Reference(overlay_id),
        ],
        Some(Object::Stream(stream)) => {
            // Direct stream in the page dictionary: hoist it into an
            // indirect object so it can sit in the array.
            let sid = doc.add_object(Object::Stream(stream));
            vec![
                Object::Reference(prefix_id),
                Object::Reference(sid),
                Object::Reference(overlay_id),
            ]
        }
        _ => vec![Object::Reference(prefix_id), Object::Reference(overlay_id)],
    };

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", Object::Array(new_contents));
    Ok(())
}

/// Render the annotated document: per-page category rectangles plus
/// reading-order numbering, composited over the original pages.
///
/// Page count and order are preserved. Pages beyond the structural data
/// and pages whose classification holds nothing drawable pass through
/// unmodified; empty buckets are normal, not an error.
pub fn render_overlay(
    pdf_bytes: &[u8],
    pages: &[ClassifiedPage],
    options: &OverlayOptions,
) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(pdf_bytes)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    // Shared overlay resources, created once per document.
    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => Object::Real(options.fill_opacity),
        "CA" => Object::Real(1.0),
    });
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    for (idx, page_id) in page_ids.iter().copied().enumerate() {
        let Some(classified) = pages.get(idx) else {
            continue;
        };
        if classified.is_empty() {
            continue;
        }
        let geom = pdf::page_geometry(&doc, page_id)?;
        let ops = build_page_ops(&geom, classified, options);
        if ops.is_empty() {
            log::warn!("page {idx}: nothing drawable after mapping, passing through");
            continue;
        }
        attach_overlay(&mut doc, page_id, ops, gs_id, font_id)?;
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_page;
    use crate::geometry::BBox;
    use crate::model::{Block, PageLayout};
    use crate::pdf::tests::build_test_pdf;

    fn operators(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|o| o.operator.as_str()).collect()
    }

    #[test]
    fn test_rect_ops_filled_and_stroked() {
        let rect = CanvasRect {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        };
        let mut ops = Vec::new();
        push_rect(&mut ops, rect, [204, 204, 0], true);
        assert_eq!(operators(&ops), ["q", "gs", "rg", "re", "f", "Q"]);

        ops.clear();
        push_rect(&mut ops, rect, [255, 0, 0], false);
        assert_eq!(operators(&ops), ["q", "RG", "re", "S", "Q"]);
    }

    #[test]
    fn test_label_anchor_per_rotation() {
        let rect = CanvasRect {
            x: 100.0,
            y: 200.0,
            width: 50.0,
            height: 20.0,
        };
        assert_eq!(
            label_anchor(rect, Rotation::None, 10.0, 2.0),
            (152.0, 210.0)
        );
        assert_eq!(
            label_anchor(rect, Rotation::Degrees90, 10.0, 2.0),
            (110.0, 222.0)
        );
        assert_eq!(
            label_anchor(rect, Rotation::Degrees180, 10.0, 2.0),
            (98.0, 210.0)
        );
        assert_eq!(
            label_anchor(rect, Rotation::Degrees270, 10.0, 2.0),
            (140.0, 198.0)
        );
    }

    #[test]
    fn test_page_ops_skip_degenerate_boxes() {
        let geom = PageGeometry::new(612.0, 792.0);
        let page = PageLayout {
            para_blocks: vec![Block::Text {
                bbox: BBox::new(10.0, 10.0, 10.0, 50.0), // zero width
                lines: Vec::new(),
            }],
            ..PageLayout::default()
        };
        let classified = classify_page(&page);
        let ops = build_page_ops(&geom, &classified, &OverlayOptions::default());
        assert!(ops.is_empty());
    }

    #[test]
    fn test_reading_order_numbers_are_one_based() {
        let geom = PageGeometry::new(612.0, 792.0);
        let page = PageLayout {
            para_blocks: vec![
                Block::Title {
                    bbox: BBox::new(10.0, 10.0, 100.0, 30.0),
                    lines: Vec::new(),
                },
                Block::Text {
                    bbox: BBox::new(10.0, 40.0, 100.0, 90.0),
                    lines: Vec::new(),
                },
            ],
            ..PageLayout::default()
        };
        let classified = classify_page(&page);
        let ops = build_page_ops(&geom, &classified, &OverlayOptions::default());
        let labels: Vec<String> = ops
            .iter()
            .filter(|o| o.operator == "Tj")
            .map(|o| match &o.operands[0] {
                Object::String(bytes, _) => String::from_utf8(bytes.clone()).unwrap(),
                other => panic!("unexpected operand {other:?}"),
            })
            .collect();
        assert_eq!(labels, ["1", "2"]);
    }

    #[test]
    fn test_render_overlay_composites_streams() {
        let bytes = build_test_pdf([0.0, 0.0, 612.0, 792.0], None);
        let page = PageLayout {
            para_blocks: vec![Block::Text {
                bbox: BBox::new(50.0, 50.0, 200.0, 120.0),
                lines: Vec::new(),
            }],
            ..PageLayout::default()
        };
        let classified = vec![classify_page(&page)];

        let out = render_overlay(&bytes, &classified, &OverlayOptions::default()).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();

        // q-prefix, original content, overlay
        let contents = page_dict.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);

        let overlay_id = contents[2].as_reference().unwrap();
        let stream = doc.get_object(overlay_id).unwrap().as_stream().unwrap();
        let decoded = Content::decode(&stream.content).unwrap();
        let names: Vec<&str> = decoded
            .operations
            .iter()
            .map(|o| o.operator.as_str())
            .collect();
        assert!(names.contains(&"re"));
        assert!(names.contains(&"f"));
        assert!(names.contains(&"Tj"));
        // Balancing Q for the prefix stream comes first.
        assert_eq!(names[0], "Q");

        // Overlay resources grafted onto the page.
        let resources = page_dict.get(b"Resources").unwrap().as_dict().unwrap();
        let ext = resources.get(b"ExtGState").unwrap().as_dict().unwrap();
        assert!(ext.has(FILL_GS_NAME));
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(LABEL_FONT_NAME));
    }

    #[test]
    fn test_empty_classification_passes_page_through() {
        let bytes = build_test_pdf([0.0, 0.0, 612.0, 792.0], None);
        let classified = vec![ClassifiedPage::default()];
        let out = render_overlay(&bytes, &classified, &OverlayOptions::default()).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        // Contents untouched: still a single reference.
        assert!(page_dict.get(b"Contents").unwrap().as_reference().is_ok());
    }

    #[test]
    fn test_structural_data_shorter_than_document() {
        let bytes = build_test_pdf([0.0, 0.0, 612.0, 792.0], None);
        let out = render_overlay(&bytes, &[], &OverlayOptions::default()).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
