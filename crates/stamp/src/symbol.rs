//! QR symbol encoding
//!
//! Payloads are always encoded as byte data at error-correction level L,
//! with the smallest version that fits.

use crate::config::{RenderMode, StampConfig};
use crate::CompositeError;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

/// Smallest oversampled module edge, in pixels
const MIN_MODULE_PIXELS: u32 = 20;

/// Largest raster symbol edge we are willing to produce
const MAX_RASTER_PIXELS: u32 = 4_096;

/// Largest edge of the oversampled bitmap drawn before downsampling
const MAX_OVERSAMPLED_PIXELS: u32 = 8_192;

/// Module matrix of an encoded symbol, without quiet zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorSymbol {
    modules: usize,
    dark: Vec<bool>,
}

impl VectorSymbol {
    fn from_code(code: &QrCode) -> Self {
        Self {
            modules: code.width(),
            dark: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
        }
    }

    /// Modules per side
    pub fn modules(&self) -> usize {
        self.modules
    }

    /// Whether the module at column `x`, row `y` (row 0 at the top) is dark
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.modules && y < self.modules && self.dark[y * self.modules + x]
    }

    /// Horizontal runs of dark modules as `(x, y, length)`
    ///
    /// `y` is measured upward from the bottom row so the runs can be used
    /// directly in PDF user space.
    pub fn dark_runs(&self) -> Vec<(usize, usize, usize)> {
        let n = self.modules;
        let mut runs = Vec::new();
        for row in 0..n {
            let y = n - 1 - row;
            let mut x = 0;
            while x < n {
                if !self.is_dark(x, row) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < n && self.is_dark(x, row) {
                    x += 1;
                }
                runs.push((start, y, x - start));
            }
        }
        runs
    }

    /// Path construction operators covering every dark module, one unit per module
    pub fn path_operators(&self) -> String {
        self.dark_runs()
            .into_iter()
            .map(|(x, y, len)| format!("{x} {y} {len} 1 re\n"))
            .collect()
    }
}

/// An encoded symbol ready to be placed on a page
#[derive(Debug, Clone)]
pub enum SymbolImage {
    Vector(VectorSymbol),
    Raster(GrayImage),
}

impl SymbolImage {
    /// Intrinsic size: modules for vector symbols, pixels for raster ones
    pub fn natural_size(&self) -> (f64, f64) {
        match self {
            SymbolImage::Vector(symbol) => (symbol.modules as f64, symbol.modules as f64),
            SymbolImage::Raster(image) => (image.width() as f64, image.height() as f64),
        }
    }
}

/// Turns payload strings into symbols according to a [`StampConfig`]
#[derive(Debug, Clone, Copy)]
pub struct SymbolEncoder {
    mode: RenderMode,
    raster_dpi: u32,
    oversample: u32,
    quiet_zone: u32,
}

impl SymbolEncoder {
    pub fn new(config: &StampConfig) -> Self {
        Self {
            mode: config.render_mode,
            raster_dpi: config.raster_dpi,
            oversample: config.oversample,
            quiet_zone: config.quiet_zone,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Encode `payload` for a square box of `target_size` points
    pub fn encode(&self, payload: &str, target_size: f64) -> Result<SymbolImage, CompositeError> {
        match self.mode {
            RenderMode::Vector => Ok(SymbolImage::Vector(Self::encode_vector(payload)?)),
            RenderMode::Raster => {
                let pixels = (target_size * self.raster_dpi as f64 / 72.0).ceil();
                if !(1.0..=MAX_RASTER_PIXELS as f64).contains(&pixels) {
                    return Err(CompositeError::Resample(pixels as u32));
                }
                Ok(SymbolImage::Raster(self.encode_raster(payload, pixels as u32)?))
            }
        }
    }

    /// Encode as a module matrix with no quiet zone
    pub fn encode_vector(payload: &str) -> Result<VectorSymbol, CompositeError> {
        let code = encode_code(payload)?;
        Ok(VectorSymbol::from_code(&code))
    }

    /// Encode as a `pixels`×`pixels` grayscale bitmap, quiet zone included
    ///
    /// The symbol is first drawn with whole-pixel modules at a multiple of the
    /// target resolution, then Lanczos-downsampled so module edges stay crisp.
    pub fn encode_raster(&self, payload: &str, pixels: u32) -> Result<GrayImage, CompositeError> {
        if pixels == 0 || pixels > MAX_RASTER_PIXELS {
            return Err(CompositeError::Resample(pixels));
        }
        let code = encode_code(payload)?;
        let symbol = VectorSymbol::from_code(&code);

        let quiet = self.quiet_zone;
        let total = symbol.modules as u32 + 2 * quiet;
        let module_px = module_pixels(total, pixels, self.oversample);
        let side = total * module_px;
        if side > MAX_OVERSAMPLED_PIXELS {
            return Err(CompositeError::Resample(pixels));
        }

        let full = GrayImage::from_fn(side, side, |px, py| {
            let mx = (px / module_px) as i64 - quiet as i64;
            let my = (py / module_px) as i64 - quiet as i64;
            let dark = mx >= 0 && my >= 0 && symbol.is_dark(mx as usize, my as usize);
            if dark {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        });

        Ok(imageops::resize(&full, pixels, pixels, FilterType::Lanczos3))
    }
}

/// Edge of one module in the oversampled bitmap
///
/// Aims for `oversample` times the target resolution, but never below
/// [`MIN_MODULE_PIXELS`] nor so large that the bitmap outgrows
/// [`MAX_OVERSAMPLED_PIXELS`].
fn module_pixels(total_modules: u32, pixels: u32, oversample: u32) -> u32 {
    let wanted = oversample.saturating_mul(pixels).div_ceil(total_modules);
    let ceiling = MAX_OVERSAMPLED_PIXELS / total_modules;
    wanted.min(ceiling).max(MIN_MODULE_PIXELS)
}

fn encode_code(payload: &str) -> Result<QrCode, CompositeError> {
    Ok(QrCode::with_error_correction_level(
        payload.as_bytes(),
        EcLevel::L,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encoder(mode: RenderMode) -> SymbolEncoder {
        SymbolEncoder::new(&StampConfig {
            render_mode: mode,
            ..StampConfig::default()
        })
    }

    #[test]
    fn test_short_payload_uses_version_1() {
        let symbol = SymbolEncoder::encode_vector("123").unwrap();
        assert_eq!(symbol.modules(), 21);
    }

    #[test]
    fn test_longer_payload_grows_symbol() {
        let short = SymbolEncoder::encode_vector("A").unwrap();
        let long = SymbolEncoder::encode_vector(&"https://example.com/".repeat(8)).unwrap();
        assert!(long.modules() > short.modules());
    }

    #[test]
    fn test_finder_pattern_corner() {
        let symbol = SymbolEncoder::encode_vector("hello").unwrap();
        // Top-left finder: dark outer ring, light separator ring, dark core
        assert!(symbol.is_dark(0, 0));
        assert!(symbol.is_dark(6, 6));
        assert!(!symbol.is_dark(1, 1));
        assert!(symbol.is_dark(3, 3));
        assert!(!symbol.is_dark(7, 7));
    }

    #[test]
    fn test_dark_runs_cover_dark_modules_exactly() {
        let symbol = SymbolEncoder::encode_vector("run-length").unwrap();
        let n = symbol.modules();
        let mut covered = vec![false; n * n];
        for (x, y, len) in symbol.dark_runs() {
            let row = n - 1 - y;
            for col in x..x + len {
                assert!(!covered[row * n + col], "module painted twice");
                covered[row * n + col] = true;
            }
        }
        for row in 0..n {
            for col in 0..n {
                assert_eq!(covered[row * n + col], symbol.is_dark(col, row));
            }
        }
    }

    #[test]
    fn test_path_operators_use_unit_height_rects() {
        let symbol = SymbolEncoder::encode_vector("ops").unwrap();
        let ops = symbol.path_operators();
        assert!(ops.lines().count() > 0);
        assert!(ops.lines().all(|line| line.ends_with(" 1 re")));
        // Top-left finder row starts at x=0 on the top row
        assert!(ops.starts_with(&format!("0 {} 7 1 re\n", symbol.modules() - 1)));
    }

    #[test]
    fn test_oversized_payload_fails() {
        let payload = "x".repeat(4000);
        assert!(matches!(
            SymbolEncoder::encode_vector(&payload),
            Err(CompositeError::Encode(_))
        ));
    }

    #[test]
    fn test_raster_has_requested_size_and_quiet_zone() {
        let image = encoder(RenderMode::Raster).encode_raster("123", 230).unwrap();
        assert_eq!(image.dimensions(), (230, 230));
        // Quiet zone is light, the finder pattern just inside it is dark
        assert!(image.get_pixel(1, 1)[0] > 200);
        assert!(image.get_pixel(15, 15)[0] < 60);
    }

    #[test]
    fn test_raster_rejects_zero_pixels() {
        assert!(matches!(
            encoder(RenderMode::Raster).encode_raster("123", 0),
            Err(CompositeError::Resample(0))
        ));
    }

    #[test]
    fn test_module_pixels_bounds_oversampled_bitmap() {
        // Version 1 with a one-module quiet zone at default oversampling
        assert_eq!(module_pixels(23, 230, 4), 40);
        // Small symbols still get whole, visible modules
        assert_eq!(module_pixels(23, 10, 1), MIN_MODULE_PIXELS);

        // Version 40 with the widest quiet zone at the largest output size
        let total = 177 + 2 * 8;
        let module_px = module_pixels(total, MAX_RASTER_PIXELS, 16);
        assert!(total * module_px <= MAX_OVERSAMPLED_PIXELS);
        assert!(total * module_px >= MAX_RASTER_PIXELS);
    }

    #[test]
    fn test_raster_too_large_is_an_error() {
        let encoder = SymbolEncoder::new(
            &StampConfig::builder()
                .render_mode(RenderMode::Raster)
                .raster_dpi(1200)
                .oversample(16)
                .build()
                .unwrap(),
        );
        // 600pt at 1200dpi is 10000 pixels per side
        assert!(matches!(
            encoder.encode("123", 600.0),
            Err(CompositeError::Resample(10_000))
        ));
        assert!(matches!(
            encoder.encode_raster("123", MAX_RASTER_PIXELS + 1),
            Err(CompositeError::Resample(_))
        ));
    }

    #[test]
    fn test_encode_natural_size_per_mode() {
        let vector = encoder(RenderMode::Vector).encode("123", 72.0).unwrap();
        assert_eq!(vector.natural_size(), (21.0, 21.0));

        // 72pt at 300dpi
        let raster = encoder(RenderMode::Raster).encode("123", 72.0).unwrap();
        assert_eq!(raster.natural_size(), (300.0, 300.0));
    }
}
