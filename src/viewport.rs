//! Maps pixels on the canvas to points on the complex plane.
//!
//! The visible part of the plane is a square centered on the pan point.
//! Its side is `base_extent / zoom`, so zooming in by 2 halves the side
//! while the center stays put.

use num::Complex;

use crate::error::{ExplorerError, Result};
use crate::render::RasterConfig;

pub const DEFAULT_BASE_EXTENT: f64 = 4.0;

/// Zoom, pan and base extent of the view. Only constructible through
/// [`ViewParameters::new`], so every value yields a finite region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParameters {
    zoom: f64,
    pan: Complex<f64>,
    base_extent: f64,
}

/// The rectangle of the plane currently mapped onto the raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRegion {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for ViewParameters {
    fn default() -> Self {
        ViewParameters {
            zoom: 1.0,
            pan: Complex::new(0.0, 0.0),
            base_extent: DEFAULT_BASE_EXTENT,
        }
    }
}

impl ViewParameters {
    pub fn new(zoom: f64, pan: Complex<f64>, base_extent: f64) -> Result<Self> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(ExplorerError::InvalidZoom(zoom));
        }
        if !(pan.re.is_finite() && pan.im.is_finite()) {
            return Err(ExplorerError::InvalidPan {
                re: pan.re,
                im: pan.im,
            });
        }
        if !(base_extent.is_finite() && base_extent > 0.0) {
            return Err(ExplorerError::InvalidExtent(base_extent));
        }
        // A finite zoom can still overflow the side length when tiny.
        let side = base_extent / zoom;
        if !side.is_finite() || side <= 0.0 {
            return Err(ExplorerError::InvalidZoom(zoom));
        }
        Ok(ViewParameters {
            zoom,
            pan,
            base_extent,
        })
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Complex<f64> {
        self.pan
    }

    pub fn base_extent(&self) -> f64 {
        self.base_extent
    }

    /// Side length of the visible square.
    pub fn extent(&self) -> f64 {
        self.base_extent / self.zoom
    }

    pub fn visible_region(&self) -> VisibleRegion {
        let half = self.extent() / 2.0;
        VisibleRegion {
            x_min: self.pan.re - half,
            x_max: self.pan.re + half,
            y_min: self.pan.im - half,
            y_max: self.pan.im + half,
        }
    }

    /// Multiply the zoom by `factor`, keeping the same center.
    pub fn zoomed(&self, factor: f64) -> Result<Self> {
        ViewParameters::new(self.zoom * factor, self.pan, self.base_extent)
    }

    /// Move the center by fractions of the visible extent.
    pub fn panned(&self, dx: f64, dy: f64) -> Result<Self> {
        let extent = self.extent();
        let pan = Complex::new(self.pan.re + dx * extent, self.pan.im + dy * extent);
        ViewParameters::new(self.zoom, pan, self.base_extent)
    }
}

impl VisibleRegion {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// The plane point for pixel `(px, py)`. Column 0 is `x_min`, row 0 is
    /// `y_min`, and the last column/row land exactly on the max edges.
    pub fn point(&self, px: u32, py: u32, raster: &RasterConfig) -> Complex<f64> {
        Complex::new(
            axis_coordinate(px, raster.width(), self.x_min, self.x_max),
            axis_coordinate(py, raster.height(), self.y_min, self.y_max),
        )
    }
}

/// Place pixel index `p` of an axis with `n` pixels on `[min, max]`.
///
/// A single-pixel axis has no span to divide, so it sits on `min`.
#[inline]
pub fn axis_coordinate(p: u32, n: u32, min: f64, max: f64) -> f64 {
    if n <= 1 {
        return min;
    }
    let max_pixel_index = (n - 1) as f64;
    min + (p as f64 / max_pixel_index) * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_spans_minus_two_to_two() {
        let region = ViewParameters::default().visible_region();
        assert_eq!(
            region,
            VisibleRegion {
                x_min: -2.0,
                x_max: 2.0,
                y_min: -2.0,
                y_max: 2.0
            }
        );
    }

    #[test]
    fn doubling_zoom_halves_the_region() {
        for pan in [Complex::new(0.0, 0.0), Complex::new(0.5, -0.25)] {
            let view = ViewParameters::new(1.0, pan, 4.0).unwrap();
            let wide = view.visible_region();
            let narrow = view.zoomed(2.0).unwrap().visible_region();
            assert_eq!(narrow.width(), wide.width() / 2.0);
            assert_eq!(narrow.height(), wide.height() / 2.0);
            assert_eq!((narrow.x_min + narrow.x_max) / 2.0, pan.re);
            assert_eq!((narrow.y_min + narrow.y_max) / 2.0, pan.im);
        }
    }

    #[test]
    fn region_is_square() {
        let view = ViewParameters::new(3.0, Complex::new(-0.75, 0.1), 4.0).unwrap();
        let region = view.visible_region();
        assert!(region.x_max > region.x_min);
        assert!(region.y_max > region.y_min);
        assert!((region.width() - region.height()).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let origin = Complex::new(0.0, 0.0);
        assert!(ViewParameters::new(0.0, origin, 4.0).is_err());
        assert!(ViewParameters::new(-1.0, origin, 4.0).is_err());
        assert!(ViewParameters::new(f64::NAN, origin, 4.0).is_err());
        assert!(ViewParameters::new(f64::INFINITY, origin, 4.0).is_err());
        assert!(ViewParameters::new(1.0, Complex::new(f64::NAN, 0.0), 4.0).is_err());
        assert!(ViewParameters::new(1.0, origin, 0.0).is_err());
        assert!(ViewParameters::new(1e-320, origin, 4.0).is_err());
    }

    #[test]
    fn axis_endpoints_hit_the_edges() {
        assert_eq!(axis_coordinate(0, 3, -2.0, 2.0), -2.0);
        assert_eq!(axis_coordinate(1, 3, -2.0, 2.0), 0.0);
        assert_eq!(axis_coordinate(2, 3, -2.0, 2.0), 2.0);
        assert_eq!(axis_coordinate(499, 500, -2.0, 2.0), 2.0);
    }

    #[test]
    fn single_pixel_axis_maps_to_min() {
        let x = axis_coordinate(0, 1, -2.0, 2.0);
        assert_eq!(x, -2.0);
        assert!(x.is_finite());
    }

    #[test]
    fn pan_moves_by_fraction_of_extent() {
        let view = ViewParameters::default().panned(0.25, -0.5).unwrap();
        assert_eq!(view.pan(), Complex::new(1.0, -2.0));
        assert_eq!(view.extent(), 4.0);
    }

    #[test]
    fn point_uses_row_for_imaginary_axis() {
        let raster = RasterConfig::square(3).unwrap();
        let region = ViewParameters::default().visible_region();
        assert_eq!(region.point(0, 0, &raster), Complex::new(-2.0, -2.0));
        assert_eq!(region.point(2, 0, &raster), Complex::new(2.0, -2.0));
        assert_eq!(region.point(0, 2, &raster), Complex::new(-2.0, 2.0));
        assert_eq!(region.point(1, 1, &raster), Complex::new(0.0, 0.0));
    }
}
