//! Page rasterization via pdfium
//!
//! Compiled only with the `pdf-render` feature; the rest of the crate
//! stays free of the native dependency. Binds the system pdfium
//! library, falling back to a copy next to the executable.

use image::RgbImage;
use pdfium_render::prelude::*;

use crate::error::{Result, VizError};

fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_system_library()
        .or_else(|_| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")))
        .map_err(|e| VizError::Render(format!("failed to bind pdfium library: {e}")))?;
    Ok(Pdfium::new(bindings))
}

/// Rasterize every page of a document at `dpi`, in page order.
#[allow(clippy::cast_possible_truncation)]
pub fn rasterize_pages(pdf_bytes: &[u8], dpi: f32) -> Result<Vec<RgbImage>> {
    if dpi <= 0.0 {
        return Err(VizError::Render(format!("invalid dpi {dpi}")));
    }
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| VizError::Render(format!("failed to open document: {e}")))?;

    let scale = dpi / 72.0;
    let mut pages = Vec::with_capacity(document.pages().len() as usize);
    for page in document.pages().iter() {
        let width = (page.width().value * scale) as i32;
        let height = (page.height().value * scale) as i32;
        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| VizError::Render(format!("failed to render page: {e}")))?;
        pages.push(bitmap.as_image().to_rgb8());
    }
    Ok(pages)
}
