//! Placement box shared by every page of a request

use crate::{Result, StampError};

/// Square box a symbol is centered in, in page points
///
/// `(x, y)` is the lower-left corner relative to the page's MediaBox origin,
/// y measured upward. The same box is applied to every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementBox {
    size: f64,
    x: f64,
    y: f64,
}

impl PlacementBox {
    /// Create a box, rejecting non-finite coordinates and non-positive sizes
    pub fn new(size: f64, x: f64, y: f64) -> Result<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(StampError::invalid(
                "size",
                format!("must be a positive number of points, got {size}"),
            ));
        }
        if !x.is_finite() {
            return Err(StampError::invalid("x", format!("must be finite, got {x}")));
        }
        if !y.is_finite() {
            return Err(StampError::invalid("y", format!("must be finite, got {y}")));
        }
        Ok(Self { size, x, y })
    }

    /// Parse form-style string inputs
    pub fn parse(size: &str, x: &str, y: &str) -> Result<Self> {
        Self::new(number("size", size)?, number("x", x)?, number("y", y)?)
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Distance from the page's top edge to the box's top edge
    ///
    /// This is the one place where the bottom-up page space is flipped for
    /// top-left-origin consumers such as preview canvases.
    pub fn top_left_y(&self, page_height: f64) -> f64 {
        page_height - self.y - self.size
    }
}

fn number(name: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| StampError::invalid(name, format!("'{value}' is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        let placement = PlacementBox::parse("80", " 36.5 ", "-10").unwrap();
        assert_eq!(placement.size(), 80.0);
        assert_eq!(placement.x(), 36.5);
        assert_eq!(placement.y(), -10.0);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = PlacementBox::parse("eighty", "36", "36").unwrap_err();
        assert!(matches!(err, StampError::InvalidParameter { name: "size", .. }));

        let err = PlacementBox::parse("80", "", "36").unwrap_err();
        assert!(matches!(err, StampError::InvalidParameter { name: "x", .. }));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(PlacementBox::new(0.0, 0.0, 0.0).is_err());
        assert!(PlacementBox::new(-5.0, 0.0, 0.0).is_err());
        assert!(PlacementBox::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(PlacementBox::new(10.0, f64::INFINITY, 0.0).is_err());
        assert!(PlacementBox::parse("80", "36", "inf").is_err());
    }

    #[test]
    fn test_top_left_y_flip() {
        let placement = PlacementBox::new(80.0, 36.0, 36.0).unwrap();
        assert_eq!(placement.top_left_y(792.0), 676.0);
    }
}
