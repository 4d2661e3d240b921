//! Overlay composition
//!
//! Builds a single-page content fragment that draws one symbol, uniformly
//! scaled to fit the placement box and centered in it. The fragment is
//! wrapped in `/QrStamp BMC ... EMC` so the stamp can be told apart from the
//! page's own marks.

use crate::symbol::{SymbolEncoder, SymbolImage};
use crate::{CompositeError, PlacementBox};
use pdf_core::{fit_within, generate_image_operators, ImageXObject, PageGeometry, PageOverlay};

/// Marked-content tag around every stamp
pub const OVERLAY_TAG: &str = "QrStamp";

/// Resource name of the image XObject used by raster stamps
pub const RASTER_IMAGE_NAME: &str = "QrStampIm";

/// Where a symbol ends up on the page, in page user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fit a symbol of the given natural size into `placement` and center it
pub fn layout(
    natural_width: f64,
    natural_height: f64,
    geometry: &PageGeometry,
    placement: &PlacementBox,
) -> OverlayLayout {
    let size = placement.size();
    let (width, height) = fit_within(natural_width, natural_height, size, size);
    OverlayLayout {
        x: geometry.x0 + placement.x() + (size - width) / 2.0,
        y: geometry.y0 + placement.y() + (size - height) / 2.0,
        width,
        height,
    }
}

/// Build the overlay for one page
///
/// Fails on a blank payload; callers decide whether a blank row means
/// "no overlay" before getting here.
pub fn build_overlay(
    geometry: &PageGeometry,
    payload: &str,
    placement: &PlacementBox,
    encoder: &SymbolEncoder,
) -> Result<PageOverlay, CompositeError> {
    if payload.trim().is_empty() {
        return Err(CompositeError::EmptyPayload);
    }

    let symbol = encoder.encode(payload, placement.size())?;
    let (natural_width, natural_height) = symbol.natural_size();
    let at = layout(natural_width, natural_height, geometry, placement);

    match symbol {
        SymbolImage::Vector(symbol) => {
            let sx = at.width / natural_width;
            let sy = at.height / natural_height;
            let content = format!(
                "/{OVERLAY_TAG} BMC\nq\n0 g\n{sx} 0 0 {sy} {} {} cm\n{}f\nQ\nEMC\n",
                at.x,
                at.y,
                symbol.path_operators()
            );
            Ok(PageOverlay::new(*geometry, content.into_bytes()))
        }
        SymbolImage::Raster(image) => {
            let xobject = ImageXObject::from_gray(&image)?;
            let mut content = format!("/{OVERLAY_TAG} BMC\n").into_bytes();
            content.extend(generate_image_operators(
                RASTER_IMAGE_NAME,
                at.x,
                at.y,
                at.width,
                at.height,
            ));
            content.extend_from_slice(b"EMC\n");
            Ok(PageOverlay::new(*geometry, content).with_image(RASTER_IMAGE_NAME, xobject))
        }
    }
}
