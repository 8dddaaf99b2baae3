//! # layviz
//!
//! Debug visualization for document layout analysis: takes a source PDF
//! plus the analyzer's structural JSON dump and renders annotated
//! artifacts for inspecting what the analyzer decided.
//!
//! ## Outputs
//!
//! - **Layout overlay** — the original pages with every detected region
//!   drawn as a semi-transparent colored rectangle and the reading
//!   order numbered ([`render_overlay`]).
//! - **Clean reconstruction** — pages rebuilt from only the recognized
//!   content regions on a white background ([`clean`]).
//! - **Last-line crops** — the final text span of each page cropped
//!   out as a PNG, for checking cross-page paragraph merges ([`spans`]).
//!
//! ## Example
//!
//! ```no_run
//! use layviz::{classify_page, render_overlay, LayoutDump, OverlayOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pdf = std::fs::read("paper.pdf")?;
//! let dump: LayoutDump = serde_json::from_slice(&std::fs::read("layout.json")?)?;
//!
//! let pages: Vec<_> = dump.into_pages().iter().map(classify_page).collect();
//! let annotated = render_overlay(&pdf, &pages, &OverlayOptions::default())?;
//! std::fs::write("layout_paper.pdf", annotated)?;
//! # Ok(())
//! # }
//! ```
//!
//! Rasterization-backed stages (clean reconstruction, last-line crops)
//! need the `pdf-render` feature, which links pdfium. The overlay works
//! without it.

#![warn(missing_docs)]

pub mod classify;
pub mod clean;
pub mod error;
pub mod geometry;
pub mod model;
pub mod overlay;
pub mod pdf;
#[cfg(feature = "pdf-render")]
pub mod render;
pub mod spans;

pub use classify::{classify_page, Category, ClassifiedPage};
#[cfg(feature = "pdf-render")]
pub use clean::reconstruct_clean;
pub use clean::{compose_clean_page, CleanOptions};
pub use error::{Result, VizError};
pub use geometry::{map_to_canvas, map_to_raster, BBox, CanvasRect, PageGeometry, PixelRect, Rotation};
pub use model::{Block, ContentType, LayoutDump, PageLayout, Span, SubBlock, SubBlockKind};
pub use overlay::{render_overlay, OverlayOptions};
pub use pdf::{assemble_image_pdf, page_geometries};
#[cfg(feature = "pdf-render")]
pub use render::rasterize_pages;
#[cfg(feature = "pdf-render")]
pub use spans::extract_last_lines;
pub use spans::{collect_last_spans, crop_last_lines, save_last_line_images};
