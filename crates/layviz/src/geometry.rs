//! Coordinate mapping between page space, canvas space and raster space
//!
//! Layout analysis reports axis-aligned bounding boxes in the page's
//! *displayed* orientation, with y growing downward. The overlay is drawn
//! in the page's unrotated stored frame (PDF canvas space, bottom-left
//! origin, y growing upward), and raster composition happens in pixel
//! space (top-left origin, scaled by the render resolution). The two
//! mappings here are the contract both rendering backends share.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page units, `(x0, y0, x1, y1)`.
///
/// Serialized as a bare 4-element array, matching the layout analyzer's
/// JSON dump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f64,
    /// Top edge (displayed orientation, y down)
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub y1: f64,
}

impl BBox {
    /// Create a box from its four edges.
    #[inline]
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// All four coordinates are finite numbers.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

impl From<[f64; 4]> for BBox {
    #[inline]
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    #[inline]
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// Page rotation, normalized to quarter turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation
    #[default]
    None,
    /// 90 degrees clockwise
    Degrees90,
    /// 180 degrees
    Degrees180,
    /// 270 degrees clockwise
    Degrees270,
}

impl Rotation {
    /// Normalize a raw `/Rotate` value to a quarter turn.
    ///
    /// The value is taken modulo 360 first (negative values wrap).
    /// Values that are not a multiple of 90 behave as no rotation.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Self::Degrees90,
            180 => Self::Degrees180,
            270 => Self::Degrees270,
            _ => Self::None,
        }
    }

    /// Rotation in degrees.
    #[inline]
    #[must_use]
    pub const fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Degrees90 => 90,
            Self::Degrees180 => 180,
            Self::Degrees270 => 270,
        }
    }

    /// Whether displayed width/height are swapped relative to the stored page.
    #[inline]
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Degrees90 | Self::Degrees270)
    }
}

/// Per-page geometry: stored crop-box dimensions plus display rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Stored page width in page units
    pub width: f64,
    /// Stored page height in page units
    pub height: f64,
    /// Display rotation
    pub rotation: Rotation,
}

impl PageGeometry {
    /// Create geometry for an unrotated page.
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotation: Rotation::None,
        }
    }

    /// Create geometry with an explicit raw rotation value.
    #[inline]
    #[must_use]
    pub fn with_rotation(width: f64, height: f64, degrees: i32) -> Self {
        Self {
            width,
            height,
            rotation: Rotation::from_degrees(degrees),
        }
    }
}

/// Rectangle in PDF canvas space (bottom-left origin, y up).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanvasRect {
    /// Left edge
    pub x: f64,
    /// Bottom edge
    pub y: f64,
    /// Width (always positive)
    pub width: f64,
    /// Height (always positive)
    pub height: f64,
}

/// Rectangle in raster pixel space (top-left origin, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels (always positive)
    pub width: u32,
    /// Height in pixels (always positive)
    pub height: u32,
}

/// Map a displayed-orientation bounding box into canvas space.
///
/// The overlay is drawn on the page's stored (unrotated) frame, so the
/// mapping depends on the page rotation. Width and height are computed
/// via absolute difference before any axis swap; degenerate or
/// non-finite boxes yield `None` and must not be drawn.
#[must_use]
pub fn map_to_canvas(geom: &PageGeometry, bbox: BBox) -> Option<CanvasRect> {
    if !bbox.is_finite() {
        return None;
    }

    // Displayed page dimensions: swapped for quarter turns.
    let (actual_w, actual_h) = if geom.rotation.swaps_axes() {
        (geom.height, geom.width)
    } else {
        (geom.width, geom.height)
    };

    let rect_w = (bbox.x1 - bbox.x0).abs();
    let rect_h = (bbox.y1 - bbox.y0).abs();
    if rect_w <= 0.0 || rect_h <= 0.0 {
        return None;
    }

    let rect = match geom.rotation {
        Rotation::None => CanvasRect {
            x: bbox.x0,
            y: geom.height - bbox.y1,
            width: rect_w,
            height: rect_h,
        },
        Rotation::Degrees90 => CanvasRect {
            x: bbox.y0,
            y: bbox.x0,
            width: rect_h,
            height: rect_w,
        },
        Rotation::Degrees180 => CanvasRect {
            x: geom.width - bbox.x1,
            y: bbox.y0,
            width: rect_w,
            height: rect_h,
        },
        Rotation::Degrees270 => CanvasRect {
            x: actual_h - bbox.y1,
            y: actual_w - bbox.x1,
            width: rect_h,
            height: rect_w,
        },
    };

    Some(rect)
}

/// Map a bounding box into raster pixel space.
///
/// Rotation-agnostic: the rasterized page is already in display
/// orientation, so the box scales elementwise by the raster/page ratio
/// and is clamped to the image. A clamped box without positive area is
/// rejected.
#[must_use]
pub fn map_to_raster(
    geom: &PageGeometry,
    bbox: BBox,
    raster_width: u32,
    raster_height: u32,
) -> Option<PixelRect> {
    if !bbox.is_finite() || geom.width <= 0.0 || geom.height <= 0.0 {
        return None;
    }

    let scale_x = f64::from(raster_width) / geom.width;
    let scale_y = f64::from(raster_height) / geom.height;

    let x0 = (bbox.x0 * scale_x).max(0.0);
    let y0 = (bbox.y0 * scale_y).max(0.0);
    let x1 = (bbox.x1 * scale_x).min(f64::from(raster_width));
    let y1 = (bbox.y1 * scale_y).min(f64::from(raster_height));

    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let px = x0 as u32;
    let py = y0 as u32;
    let width = (x1 as u32).saturating_sub(px);
    let height = (y1 as u32).saturating_sub(py);
    if width == 0 || height == 0 {
        return None;
    }

    Some(PixelRect {
        x: px,
        y: py,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_W: f64 = 612.0;
    const PAGE_H: f64 = 792.0;

    fn geom(rotation: i32) -> PageGeometry {
        PageGeometry::with_rotation(PAGE_W, PAGE_H, rotation)
    }

    #[test]
    fn test_rotation_normalization() {
        assert_eq!(Rotation::from_degrees(0), Rotation::None);
        assert_eq!(Rotation::from_degrees(360), Rotation::None);
        assert_eq!(Rotation::from_degrees(450), Rotation::Degrees90);
        assert_eq!(Rotation::from_degrees(-90), Rotation::Degrees270);
        assert_eq!(Rotation::from_degrees(-180), Rotation::Degrees180);
        // Non-quarter values behave as unrotated
        assert_eq!(Rotation::from_degrees(45), Rotation::None);
    }

    #[test]
    fn test_canvas_rotation_0() {
        let rect = map_to_canvas(&geom(0), BBox::new(10.0, 20.0, 110.0, 70.0)).unwrap();
        assert_eq!(rect.x, 10.0);
        assert_eq!(rect.y, PAGE_H - 70.0);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 50.0);
    }

    #[test]
    fn test_canvas_corner_roundtrip() {
        // Box at displayed corner (0,0)-(1,1) lands just below the top
        // of the canvas frame.
        let rect = map_to_canvas(&geom(0), BBox::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert!((rect.y - (PAGE_H - 1.0)).abs() < 1e-9);
        assert!((rect.height - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_rotation_90_swaps_axes() {
        // Displayed page is PAGE_H wide, PAGE_W tall.
        let rect = map_to_canvas(&geom(90), BBox::new(10.0, 20.0, 110.0, 70.0)).unwrap();
        assert_eq!(rect.x, 20.0);
        assert_eq!(rect.y, 10.0);
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn test_canvas_rotation_180() {
        let rect = map_to_canvas(&geom(180), BBox::new(10.0, 20.0, 110.0, 70.0)).unwrap();
        assert_eq!(rect.x, PAGE_W - 110.0);
        assert_eq!(rect.y, 20.0);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 50.0);
    }

    #[test]
    fn test_canvas_rotation_270() {
        let rect = map_to_canvas(&geom(270), BBox::new(10.0, 20.0, 110.0, 70.0)).unwrap();
        assert_eq!(rect.x, PAGE_W - 70.0);
        assert_eq!(rect.y, PAGE_H - 110.0);
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn test_canvas_all_rotations_stay_in_frame() {
        for degrees in [0, 90, 180, 270] {
            let g = geom(degrees);
            // Box inside the displayed page for every rotation.
            let (disp_w, disp_h) = if g.rotation.swaps_axes() {
                (PAGE_H, PAGE_W)
            } else {
                (PAGE_W, PAGE_H)
            };
            let bbox = BBox::new(disp_w * 0.1, disp_h * 0.1, disp_w * 0.4, disp_h * 0.3);
            let rect = map_to_canvas(&g, bbox).unwrap();
            assert!(rect.width > 0.0 && rect.height > 0.0, "rotation {degrees}");
            assert!(rect.x >= 0.0 && rect.y >= 0.0, "rotation {degrees}");
            assert!(rect.x + rect.width <= PAGE_W + 1e-9, "rotation {degrees}");
            assert!(rect.y + rect.height <= PAGE_H + 1e-9, "rotation {degrees}");
        }
    }

    #[test]
    fn test_canvas_swapped_coordinates_are_flipped_order_proof() {
        // Reversed edges still produce a positive-size rect.
        let rect = map_to_canvas(&geom(0), BBox::new(110.0, 70.0, 10.0, 20.0)).unwrap();
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 50.0);
    }

    #[test]
    fn test_canvas_rejects_degenerate_and_nonfinite() {
        assert!(map_to_canvas(&geom(0), BBox::new(10.0, 20.0, 10.0, 70.0)).is_none());
        assert!(map_to_canvas(&geom(0), BBox::new(10.0, 20.0, 110.0, 20.0)).is_none());
        assert!(map_to_canvas(&geom(0), BBox::new(f64::NAN, 0.0, 1.0, 1.0)).is_none());
        assert!(map_to_canvas(&geom(0), BBox::new(0.0, 0.0, f64::INFINITY, 1.0)).is_none());
    }

    #[test]
    fn test_raster_full_page_scale() {
        // (0,0,100,100) on a 100-unit page rendered at 200px covers it all.
        let g = PageGeometry::new(100.0, 100.0);
        let rect = map_to_raster(&g, BBox::new(0.0, 0.0, 100.0, 100.0), 200, 200).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x: 0,
                y: 0,
                width: 200,
                height: 200
            }
        );
    }

    #[test]
    fn test_raster_clamps_to_image() {
        let g = PageGeometry::new(100.0, 100.0);
        let rect = map_to_raster(&g, BBox::new(-10.0, 50.0, 120.0, 120.0), 200, 200).unwrap();
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 100);
        assert_eq!(rect.width, 200);
        assert_eq!(rect.height, 100);
    }

    #[test]
    fn test_raster_rejects_degenerate() {
        let g = PageGeometry::new(100.0, 100.0);
        // Zero-area input
        assert!(map_to_raster(&g, BBox::new(50.0, 50.0, 50.0, 80.0), 200, 200).is_none());
        // Entirely outside the page
        assert!(map_to_raster(&g, BBox::new(150.0, 150.0, 180.0, 180.0), 200, 200).is_none());
        // Inverted edges clamp to nothing
        assert!(map_to_raster(&g, BBox::new(80.0, 80.0, 20.0, 20.0), 200, 200).is_none());
    }

    #[test]
    fn test_raster_ignores_rotation() {
        let bbox = BBox::new(10.0, 10.0, 60.0, 40.0);
        let a = map_to_raster(&geom(0), bbox, 612, 792).unwrap();
        let b = map_to_raster(&geom(270), bbox, 612, 792).unwrap();
        assert_eq!(a, b);
    }
}
