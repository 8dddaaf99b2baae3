//! Last-line span extraction
//!
//! Finds the last text span on each page and crops its pixels from the
//! rendered page, for eyeballing paragraph-merge decisions across page
//! breaks. A span flagged `cross_page` visually belongs to the next
//! page, so it is carried forward and considered there instead.
//!
//! Like clean reconstruction, the rendered stage is best-effort and
//! never fails the caller.

use std::fs;
use std::path::Path;

use image::{imageops, RgbImage};

use crate::error::Result;
use crate::geometry::{map_to_raster, BBox, PageGeometry};
use crate::model::{Block, ContentType, Line, PageLayout};

fn text_span_boxes(lines: &[Line], carried: &mut Vec<BBox>, candidates: &mut Vec<BBox>) {
    for line in lines {
        for span in &line.spans {
            if span.kind != ContentType::Text {
                continue;
            }
            if span.cross_page {
                carried.push(span.bbox);
            } else {
                candidates.push(span.bbox);
            }
        }
    }
}

/// The last text span of each page, if any.
///
/// Scans the pre-processing block tree in analyzer order, including
/// Table/Image sub-blocks. Spans flagged `cross_page` are moved to the
/// front of the next page's candidates; the page's own spans win when
/// present.
#[must_use]
pub fn collect_last_spans(pages: &[PageLayout]) -> Vec<Option<BBox>> {
    let mut out = Vec::with_capacity(pages.len());
    let mut carried: Vec<BBox> = Vec::new();

    for page in pages {
        let mut candidates = std::mem::take(&mut carried);
        for block in &page.preproc_blocks {
            match block {
                Block::Text { lines, .. }
                | Block::Title { lines, .. }
                | Block::InterlineEquation { lines, .. }
                | Block::List { lines, .. }
                | Block::Index { lines, .. } => {
                    text_span_boxes(lines, &mut carried, &mut candidates);
                }
                Block::Table { blocks, .. } | Block::Image { blocks, .. } => {
                    for sub in blocks {
                        text_span_boxes(&sub.lines, &mut carried, &mut candidates);
                    }
                }
            }
        }
        out.push(candidates.last().copied());
    }

    out
}

/// Crop each page's last-line region out of its rendered image.
///
/// Pages without a last span, or whose span maps outside the raster,
/// yield `None`.
#[must_use]
pub fn crop_last_lines(
    page_images: &[RgbImage],
    geoms: &[PageGeometry],
    last_spans: &[Option<BBox>],
) -> Vec<Option<RgbImage>> {
    page_images
        .iter()
        .zip(geoms.iter())
        .enumerate()
        .map(|(idx, (img, geom))| {
            let bbox = (*last_spans.get(idx)?)?;
            let (width, height) = img.dimensions();
            let Some(rect) = map_to_raster(geom, bbox, width, height) else {
                log::warn!("page {idx}: last-line span maps outside the page, skipping");
                return None;
            };
            Some(imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image())
        })
        .collect()
}

/// Rasterize the document and crop every page's last-line image.
///
/// Returns `None` (after logging) when rasterization is unavailable;
/// the stage never propagates an error.
#[cfg(feature = "pdf-render")]
pub fn extract_last_lines(
    pdf_bytes: &[u8],
    pages: &[PageLayout],
    dpi: f32,
) -> Option<Vec<Option<RgbImage>>> {
    let page_images = match crate::render::rasterize_pages(pdf_bytes, dpi) {
        Ok(images) => images,
        Err(e) => {
            log::warn!("last-line extraction skipped: rasterization failed: {e}");
            return None;
        }
    };
    let geoms = match crate::pdf::page_geometries(pdf_bytes) {
        Ok(geoms) => geoms,
        Err(e) => {
            log::warn!("last-line extraction skipped: page geometry failed: {e}");
            return None;
        }
    };
    Some(crop_last_lines(&page_images, &geoms, &collect_last_spans(pages)))
}

/// Write the cropped last-line images as `page_NNN_lastline.png` under
/// `dir`, creating the directory if needed. Pages without a crop are
/// skipped.
pub fn save_last_line_images(images: &[Option<RgbImage>], dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (idx, image) in images.iter().enumerate() {
        if let Some(img) = image {
            img.save(dir.join(format!("page_{idx:03}_lastline.png")))?;
        }
    }
    Ok(())
}
