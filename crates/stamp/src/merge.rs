//! Document merging
//!
//! Page `i` of the source document is paired with row `i` of the table.
//! Blank rows leave their page untouched. Every page of the source appears
//! in the output, in order.

use crate::overlay::build_overlay;
use crate::symbol::SymbolEncoder;
use crate::{CompositeError, PlacementBox, Result, StampConfig, StampError};
use pdf_core::{PageGeometry, PageOverlay, PdfDocument};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Outcome of stamping a document in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub pages: usize,
    pub stamped: usize,
    pub skipped: usize,
}

/// Stamp `values[i]` onto page `i + 1` of the PDF in `source`
///
/// Returns the serialized result. The row count must equal the page count;
/// that is checked before any page is touched.
pub fn merge(
    source: &[u8],
    values: &[String],
    placement: &PlacementBox,
    config: &StampConfig,
) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::open_from_bytes(source)
        .map_err(|e| StampError::DocumentParse(e.to_string()))?;

    merge_document(&mut doc, values, placement, config)?;

    if config.compress {
        doc.compress();
    }
    doc.to_bytes()
        .map_err(|e| StampError::Output(e.to_string()))
}

/// Stamp an already opened document in place
pub fn merge_document(
    doc: &mut PdfDocument,
    values: &[String],
    placement: &PlacementBox,
    config: &StampConfig,
) -> Result<MergeReport> {
    let pages = doc.page_count();
    if values.len() != pages {
        return Err(StampError::RowCountMismatch {
            rows: values.len(),
            pages,
        });
    }

    let geometries = (1..=pages)
        .map(|page| {
            doc.page_geometry(page)
                .map_err(|e| StampError::DocumentParse(format!("page {page}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let encoder = SymbolEncoder::new(config);
    let overlays = build_overlays(&geometries, values, placement, &encoder, config.concurrency)?;

    let mut stamped = 0;
    for (index, overlay) in overlays.iter().enumerate() {
        let Some(overlay) = overlay else {
            debug!(page = index + 1, "blank row, page left as is");
            continue;
        };
        doc.stamp_page(index + 1, overlay)
            .map_err(|e| StampError::PageComposite {
                page_index: index,
                source: CompositeError::Pdf(e),
            })?;
        stamped += 1;
    }

    let report = MergeReport {
        pages,
        stamped,
        skipped: pages - stamped,
    };
    info!(
        pages = report.pages,
        stamped = report.stamped,
        skipped = report.skipped,
        mode = %encoder.mode(),
        "merged symbols into document"
    );
    Ok(report)
}

/// Build every page's overlay, `None` for blank rows
///
/// Overlays depend only on their own geometry and payload, so they are built
/// on a dedicated pool and reassembled in page order.
fn build_overlays(
    geometries: &[PageGeometry],
    values: &[String],
    placement: &PlacementBox,
    encoder: &SymbolEncoder,
    concurrency: usize,
) -> Result<Vec<Option<PageOverlay>>> {
    let build = |index: usize| -> Result<Option<PageOverlay>> {
        let payload = values[index].as_str();
        if payload.trim().is_empty() {
            return Ok(None);
        }
        build_overlay(&geometries[index], payload, placement, encoder)
            .map(Some)
            .map_err(|source| StampError::PageComposite {
                page_index: index,
                source,
            })
    };

    if concurrency <= 1 || values.len() <= 1 {
        return (0..values.len()).map(build).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build()
    {
        Ok(pool) => pool.install(|| (0..values.len()).into_par_iter().map(build).collect()),
        Err(e) => {
            warn!(error = %e, "failed to start worker pool, building overlays sequentially");
            (0..values.len()).map(build).collect()
        }
    }
}
