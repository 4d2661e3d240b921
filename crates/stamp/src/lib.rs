//! Stamp - per-page QR code overlays for PDF documents
//!
//! This crate provides:
//! - QR symbol encoding in vector (filled rectangles) or raster form
//! - Overlay composition: fit a symbol into a square box on a page
//! - Document merging: pair page `i` with table row `i` and stamp it
//! - A stateless request entry point tying the table and document together
//!
//! # Coordinates
//!
//! All positions and sizes are PDF points (1/72 inch) in the page's own
//! space: origin at the lower-left corner of the MediaBox, y growing upward.
//! Callers working in a top-left-origin space (screen, canvas) flip y before
//! calling in, see [`PlacementBox::top_left_y`].
//!
//! # Example
//!
//! ```ignore
//! use stamp::{generate, GenerateRequest, PlacementBox, StampConfig};
//!
//! let request = GenerateRequest {
//!     document: &pdf_bytes,
//!     table: &csv_bytes,
//!     column: "Code",
//!     placement: PlacementBox::new(80.0, 36.0, 36.0)?,
//! };
//! let output = generate(&request, &StampConfig::default())?;
//! ```

mod config;
mod merge;
mod overlay;
mod placement;
mod request;
mod symbol;

pub use config::{RenderMode, StampConfig, StampConfigBuilder};
pub use merge::{merge, merge_document, MergeReport};
pub use overlay::{build_overlay, layout, OverlayLayout, OVERLAY_TAG, RASTER_IMAGE_NAME};
pub use placement::PlacementBox;
pub use request::{document_info, generate, preview_symbol, DocumentInfo, GenerateRequest};
pub use symbol::{SymbolEncoder, SymbolImage, VectorSymbol};

use serde::Serialize;
use thiserror::Error;

/// Why a single page's overlay could not be built or merged
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("cannot encode payload: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("cannot resample symbol to {0}x{0} pixels")]
    Resample(u32),

    #[error(transparent)]
    Pdf(#[from] pdf_core::PdfError),
}

/// Errors that can occur while generating a stamped document
///
/// Every variant is fatal to the request; no partial output is produced.
#[derive(Debug, Error)]
pub enum StampError {
    #[error("Table is empty")]
    EmptyTable,

    #[error("Column '{column}' not found. Available: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Table could not be read: {0}")]
    InvalidTable(String),

    #[error("Table has {rows} data rows but the document has {pages} pages")]
    RowCountMismatch { rows: usize, pages: usize },

    #[error("Failed to read document: {0}")]
    DocumentParse(String),

    #[error("Failed to composite page {} (index {page_index}): {source}", .page_index + 1)]
    PageComposite {
        page_index: usize,
        #[source]
        source: CompositeError,
    },

    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed to write document: {0}")]
    Output(String),
}

impl StampError {
    /// Stable machine-readable identifier of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            StampError::EmptyTable => "empty_table",
            StampError::ColumnNotFound { .. } => "column_not_found",
            StampError::InvalidTable(_) => "invalid_table",
            StampError::RowCountMismatch { .. } => "row_count_mismatch",
            StampError::DocumentParse(_) => "document_parse_error",
            StampError::PageComposite { .. } => "page_composite_error",
            StampError::InvalidParameter { .. } => "invalid_parameter",
            StampError::Output(_) => "output_error",
        }
    }

    /// Kind and message, ready to be serialized for a client
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        StampError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<tabular::TableError> for StampError {
    fn from(err: tabular::TableError) -> Self {
        match err {
            tabular::TableError::EmptyTable => StampError::EmptyTable,
            tabular::TableError::ColumnNotFound { column, available } => {
                StampError::ColumnNotFound { column, available }
            }
            other => StampError::InvalidTable(other.to_string()),
        }
    }
}

/// Client-facing error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

/// Result type for stamping operations
pub type Result<T> = std::result::Result<T, StampError>;
