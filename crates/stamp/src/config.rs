//! Stamping configuration

use crate::{Result, StampError};
use std::fmt;
use std::str::FromStr;

/// How symbols are drawn onto pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Dark modules as filled rectangles; stays sharp at any zoom or DPI
    #[default]
    Vector,
    /// Embedded grayscale bitmap, oversampled then Lanczos-downsampled
    Raster,
}

impl FromStr for RenderMode {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" => Ok(RenderMode::Vector),
            "raster" => Ok(RenderMode::Raster),
            other => Err(StampError::invalid(
                "render mode",
                format!("expected 'vector' or 'raster', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Vector => f.write_str("vector"),
            RenderMode::Raster => f.write_str("raster"),
        }
    }
}

/// Configuration for stamping a document
///
/// Built via [`StampConfig::builder()`] or [`StampConfig::default()`].
///
/// # Example
/// ```
/// use stamp::{RenderMode, StampConfig};
///
/// let config = StampConfig::builder()
///     .render_mode(RenderMode::Raster)
///     .raster_dpi(600)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StampConfig {
    /// Symbol drawing mode. Default: [`RenderMode::Vector`].
    pub render_mode: RenderMode,

    /// Worker threads used to build overlays. `1` builds them in order on
    /// the calling thread. Default: available parallelism.
    pub concurrency: usize,

    /// Pixel density of raster symbols. Range: 72-1200. Default: 300.
    pub raster_dpi: u32,

    /// Internal oversampling factor for raster symbols. Range: 1-16. Default: 4.
    pub oversample: u32,

    /// Light modules around raster symbols. Range: 0-8. Default: 1.
    pub quiet_zone: u32,

    /// Flate-compress uncompressed streams before writing. Default: true.
    pub compress: bool,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            raster_dpi: 300,
            oversample: 4,
            quiet_zone: 1,
            compress: true,
        }
    }
}

impl StampConfig {
    /// Create a new builder for `StampConfig`.
    pub fn builder() -> StampConfigBuilder {
        StampConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`StampConfig`].
#[derive(Debug)]
pub struct StampConfigBuilder {
    config: StampConfig,
}

impl StampConfigBuilder {
    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.config.render_mode = mode;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn raster_dpi(mut self, dpi: u32) -> Self {
        self.config.raster_dpi = dpi;
        self
    }

    pub fn oversample(mut self, factor: u32) -> Self {
        self.config.oversample = factor;
        self
    }

    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.config.quiet_zone = modules;
        self
    }

    pub fn compress(mut self, v: bool) -> Self {
        self.config.compress = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StampConfig> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(StampError::invalid("concurrency", "must be at least 1"));
        }
        if !(72..=1200).contains(&c.raster_dpi) {
            return Err(StampError::invalid(
                "raster dpi",
                format!("must be 72-1200, got {}", c.raster_dpi),
            ));
        }
        if !(1..=16).contains(&c.oversample) {
            return Err(StampError::invalid(
                "oversample",
                format!("must be 1-16, got {}", c.oversample),
            ));
        }
        if c.quiet_zone > 8 {
            return Err(StampError::invalid(
                "quiet zone",
                format!("must be 0-8, got {}", c.quiet_zone),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StampConfig::default();
        assert_eq!(config.render_mode, RenderMode::Vector);
        assert!(config.concurrency >= 1);
        assert_eq!(config.raster_dpi, 300);
        assert_eq!(config.oversample, 4);
        assert_eq!(config.quiet_zone, 1);
        assert!(config.compress);
    }

    #[test]
    fn test_builder_rejects_zero_concurrency() {
        let err = StampConfig::builder().concurrency(0).build().unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");
    }

    #[test]
    fn test_builder_rejects_out_of_range_dpi() {
        let err = StampConfig::builder().raster_dpi(10).build().unwrap_err();
        assert_eq!(err.to_string(), "Invalid raster dpi: must be 72-1200, got 10");
        assert!(StampConfig::builder().raster_dpi(5000).build().is_err());
        assert!(StampConfig::builder().raster_dpi(600).build().is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_oversample_and_quiet_zone() {
        assert!(StampConfig::builder().oversample(0).build().is_err());
        assert!(StampConfig::builder().quiet_zone(9).build().is_err());
    }

    #[test]
    fn test_render_mode_from_str() {
        assert_eq!("Vector".parse::<RenderMode>().unwrap(), RenderMode::Vector);
        assert_eq!(" raster ".parse::<RenderMode>().unwrap(), RenderMode::Raster);
        assert!("svg".parse::<RenderMode>().is_err());
        assert_eq!(RenderMode::Raster.to_string(), "raster");
    }
}
