//! PDF document plumbing
//!
//! Thin helpers over `lopdf`: page-geometry introspection (crop box and
//! rotation, honoring page-tree inheritance) and assembly of a
//! multi-page PDF from raster page images.

use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Result, VizError};
use crate::geometry::PageGeometry;

/// Page-tree walks give up after this many parent hops.
const MAX_TREE_DEPTH: usize = 32;

/// Look up a key on the page dictionary, walking up `/Parent` links for
/// inheritable attributes. Returns `None` when the key is absent from
/// the whole chain or the chain is malformed.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Follow one level of indirection if `obj` is a reference.
fn deref<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj.as_reference() {
        Ok(id) => doc.get_object(id).unwrap_or(obj),
        Err(_) => obj,
    }
}

fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Read a page's geometry: width/height from the CropBox upper-right
/// corner (MediaBox fallback) and the normalized `/Rotate` value.
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> Result<PageGeometry> {
    let page_box = resolve_inherited(doc, page_id, b"CropBox")
        .or_else(|| resolve_inherited(doc, page_id, b"MediaBox"))
        .ok_or_else(|| VizError::Geometry("page has no CropBox or MediaBox".into()))?;
    let arr = deref(doc, page_box)
        .as_array()
        .map_err(|e| VizError::Geometry(format!("page box is not an array: {e}")))?;
    if arr.len() != 4 {
        return Err(VizError::Geometry(format!(
            "page box has {} elements, expected 4",
            arr.len()
        )));
    }
    let width = object_to_f64(deref(doc, &arr[2]))
        .ok_or_else(|| VizError::Geometry("page box width is not a number".into()))?;
    let height = object_to_f64(deref(doc, &arr[3]))
        .ok_or_else(|| VizError::Geometry("page box height is not a number".into()))?;

    let degrees = resolve_inherited(doc, page_id, b"Rotate")
        .and_then(|o| deref(doc, o).as_i64().ok())
        .unwrap_or(0);

    #[allow(clippy::cast_possible_truncation)]
    Ok(PageGeometry::with_rotation(
        width,
        height,
        (degrees % 360) as i32,
    ))
}

/// Geometry for every page of a document, in page order.
pub fn page_geometries(pdf_bytes: &[u8]) -> Result<Vec<PageGeometry>> {
    let doc = Document::load_mem(pdf_bytes)?;
    doc.get_pages()
        .into_values()
        .map(|id| page_geometry(&doc, id))
        .collect()
}

/// Assemble raster page images into a single PDF, one page per image.
///
/// Each image becomes a JPEG-encoded image XObject drawn over the full
/// page; page size is derived from the pixel dimensions at `dpi`.
pub fn assemble_image_pdf(pages: &[RgbImage], dpi: f32) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(VizError::Render("no page images to assemble".into()));
    }
    if dpi <= 0.0 {
        return Err(VizError::Render(format!("invalid dpi {dpi}")));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());

    for img in pages {
        let (px_w, px_h) = img.dimensions();
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 85).encode_image(img)?;

        let xobject_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(px_w),
                "Height" => i64::from(px_h),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let page_w = f64::from(px_w) * 72.0 / f64::from(dpi);
        let page_h = f64::from(px_h) * 72.0 / f64::from(dpi);

        #[allow(clippy::cast_possible_truncation)]
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page_w as f32),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(page_h as f32),
                        Object::Real(0.0),
                        Object::Real(0.0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        #[allow(clippy::cast_possible_truncation)]
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(page_w as f32),
                Object::Real(page_h as f32),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => Object::Reference(xobject_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    #[allow(clippy::cast_possible_wrap)]
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::Rotation;
    use image::Rgb;

    /// Build a one-page PDF with the given crop box and rotation.
    pub(crate) fn build_test_pdf(crop: [f32; 4], rotate: Option<i64>) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let mut page = dictionary! {
            "Type" => "Page",
            "MediaBox" => crop.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            "CropBox" => crop.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {},
        };
        if let Some(r) = rotate {
            page.set("Rotate", Object::Integer(r));
        }
        let page_id = doc.add_object(page);
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_page_geometry_from_crop_box() {
        let bytes = build_test_pdf([0.0, 0.0, 612.0, 792.0], Some(90));
        let geoms = page_geometries(&bytes).unwrap();
        assert_eq!(geoms.len(), 1);
        assert!((geoms[0].width - 612.0).abs() < 1e-6);
        assert!((geoms[0].height - 792.0).abs() < 1e-6);
        assert_eq!(geoms[0].rotation, Rotation::Degrees90);
    }

    #[test]
    fn test_page_geometry_defaults_to_unrotated() {
        let bytes = build_test_pdf([0.0, 0.0, 200.0, 400.0], None);
        let geoms = page_geometries(&bytes).unwrap();
        assert_eq!(geoms[0].rotation, Rotation::None);
    }

    #[test]
    fn test_assemble_image_pdf_page_per_image() {
        let images = vec![
            RgbImage::from_pixel(40, 60, Rgb([255, 255, 255])),
            RgbImage::from_pixel(40, 60, Rgb([0, 128, 255])),
        ];
        let bytes = assemble_image_pdf(&images, 100.0).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        // Page size derives from pixels at the given dpi.
        let (_, first) = doc.get_pages().into_iter().next().unwrap();
        let geom = page_geometry(&doc, first).unwrap();
        assert!((geom.width - 40.0 * 72.0 / 100.0).abs() < 1e-3);
        assert!((geom.height - 60.0 * 72.0 / 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_assemble_rejects_empty_input() {
        assert!(assemble_image_pdf(&[], 100.0).is_err());
    }
}
