//! Stateless request entry points
//!
//! Each call takes all of its inputs at once and keeps nothing afterwards,
//! so concurrent requests never share state.

use crate::merge::merge;
use crate::symbol::SymbolEncoder;
use crate::{PlacementBox, Result, StampConfig, StampError};
use image::{DynamicImage, ImageFormat};
use pdf_core::PdfDocument;
use serde::Serialize;
use std::io::Cursor;
use tracing::debug;

/// Preview symbols are rendered at this multiple of the box size, in pixels
const PREVIEW_SCALE: f64 = 4.0;

/// Everything needed to stamp one document
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    /// Source PDF bytes
    pub document: &'a [u8],
    /// Delimited table bytes, header row first
    pub table: &'a [u8],
    /// Header name of the payload column
    pub column: &'a str,
    pub placement: PlacementBox,
}

/// Page 1 geometry and page count of a document
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub width: f64,
    pub height: f64,
    pub page_count: usize,
}

/// Produce the stamped document for a request
///
/// Table errors surface before the document is opened.
pub fn generate(request: &GenerateRequest<'_>, config: &StampConfig) -> Result<Vec<u8>> {
    let values = tabular::extract(request.table, request.column)?;
    debug!(
        column = request.column,
        rows = values.len(),
        "extracted payload column"
    );
    merge(request.document, &values, &request.placement, config)
}

/// Size of the first page and number of pages
pub fn document_info(document: &[u8]) -> Result<DocumentInfo> {
    let doc = PdfDocument::open_from_bytes(document)
        .map_err(|e| StampError::DocumentParse(e.to_string()))?;
    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(StampError::DocumentParse("document has no pages".to_string()));
    }
    let geometry = doc
        .page_geometry(1)
        .map_err(|e| StampError::DocumentParse(e.to_string()))?;
    Ok(DocumentInfo {
        width: geometry.width,
        height: geometry.height,
        page_count,
    })
}

/// PNG preview of the symbol that would land on `page_number` (1-indexed)
///
/// Returns `None` when that page's row is blank and would be left unstamped.
pub fn preview_symbol(
    table: &[u8],
    column: &str,
    page_number: usize,
    size: f64,
    config: &StampConfig,
) -> Result<Option<Vec<u8>>> {
    let values = tabular::extract(table, column)?;
    if page_number == 0 || page_number > values.len() {
        return Err(StampError::invalid(
            "page number",
            format!("must be 1-{}, got {page_number}", values.len()),
        ));
    }
    if !size.is_finite() || size <= 0.0 {
        return Err(StampError::invalid(
            "size",
            format!("must be a positive number of points, got {size}"),
        ));
    }

    let payload = &values[page_number - 1];
    if payload.trim().is_empty() {
        return Ok(None);
    }

    let page_index = page_number - 1;
    let pixels = (size * PREVIEW_SCALE).max(1.0) as u32;
    let image = SymbolEncoder::new(config)
        .encode_raster(payload, pixels)
        .map_err(|source| StampError::PageComposite { page_index, source })?;

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| StampError::Output(e.to_string()))?;
    Ok(Some(png.into_inner()))
}
