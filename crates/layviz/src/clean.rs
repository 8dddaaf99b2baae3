//! Clean-page reconstruction
//!
//! Rebuilds a "clean" rendition of the document: each page is
//! rasterized, recognized content regions are cropped out and pasted
//! onto a white canvas of the same size, and the canvases are bound
//! back into a multi-page PDF. Everything the analyzer did not keep
//! (headers, footers, discarded noise) disappears.
//!
//! The whole stage is best-effort: any failure is logged and the stage
//! yields nothing rather than failing the caller.

use image::{imageops, Rgb, RgbImage};

#[cfg(feature = "pdf-render")]
use crate::classify::ClassifiedPage;
use crate::geometry::{map_to_raster, BBox, PageGeometry};
#[cfg(feature = "pdf-render")]
use crate::pdf;

/// Clean reconstruction options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanOptions {
    /// Rasterization and output resolution
    pub dpi: f32,
}

impl Default for CleanOptions {
    #[inline]
    fn default() -> Self {
        Self { dpi: 200.0 }
    }
}

/// Paste the given content regions of a rendered page onto a fresh
/// white canvas of the same pixel size.
///
/// Regions that map to nothing (degenerate or fully outside the page)
/// are skipped with a warning.
#[must_use]
pub fn compose_clean_page(
    page_image: &RgbImage,
    geom: &PageGeometry,
    regions: &[BBox],
) -> RgbImage {
    let (width, height) = page_image.dimensions();
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for region in regions {
        let Some(rect) = map_to_raster(geom, *region, width, height) else {
            log::warn!("content region {region:?} maps outside the page, skipping");
            continue;
        };
        let patch = imageops::crop_imm(page_image, rect.x, rect.y, rect.width, rect.height);
        imageops::replace(
            &mut canvas,
            &patch.to_image(),
            i64::from(rect.x),
            i64::from(rect.y),
        );
    }

    canvas
}

/// Reconstruct the clean PDF: rasterize every page, keep only the
/// recognized content regions, and reassemble.
///
/// Returns `None` (after logging) when rasterization is unavailable or
/// any stage fails; the reconstruction never propagates an error.
#[cfg(feature = "pdf-render")]
pub fn reconstruct_clean(
    pdf_bytes: &[u8],
    pages: &[ClassifiedPage],
    options: &CleanOptions,
) -> Option<Vec<u8>> {
    let page_images = match crate::render::rasterize_pages(pdf_bytes, options.dpi) {
        Ok(images) => images,
        Err(e) => {
            log::warn!("clean reconstruction skipped: rasterization failed: {e}");
            return None;
        }
    };
    let geoms = match pdf::page_geometries(pdf_bytes) {
        Ok(geoms) => geoms,
        Err(e) => {
            log::warn!("clean reconstruction skipped: page geometry failed: {e}");
            return None;
        }
    };

    if pages.len() != page_images.len() {
        log::warn!(
            "structural pages ({}) and rendered pages ({}) differ, extra pages stay blank",
            pages.len(),
            page_images.len()
        );
    }

    let empty = ClassifiedPage::default();
    let canvases: Vec<RgbImage> = page_images
        .iter()
        .zip(geoms.iter())
        .enumerate()
        .map(|(idx, (img, geom))| {
            let classified = pages.get(idx).unwrap_or(&empty);
            compose_clean_page(img, geom, &classified.content_regions())
        })
        .collect();

    match pdf::assemble_image_pdf(&canvases, options.dpi) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("clean reconstruction skipped: page assembly failed: {e}");
            None
        }
    }
}
