//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Reading per-page physical geometry (MediaBox, with inheritance)
//! - Stamping overlay content on top of existing pages
//! - Embedding grayscale images as XObjects
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{PdfDocument, PageOverlay};
//!
//! let mut doc = PdfDocument::open_from_bytes(&bytes)?;
//! let geometry = doc.page_geometry(1)?;
//! doc.stamp_page(1, &PageOverlay::new(geometry, b"0 g 10 10 20 20 re f".to_vec()))?;
//! let out = doc.to_bytes()?;
//! ```

mod document;
mod image;

pub use document::{PageGeometry, PageOverlay, PdfDocument, DEFAULT_PAGE_SIZE};
pub use image::{fit_within, generate_image_operators, ImageXObject};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
