/*
Raster pass: every pixel is mapped onto the plane, run through the escape
test and painted one of two opaque colours.
*/

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::escape::{is_bounded, IterationBudget};
use crate::viewport::{ViewParameters, VisibleRegion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    red: u8,
    green: u8,
    blue: u8,
}

impl Colour {
    /// Painted on points that stayed bounded.
    pub const BOUNDED: Colour = Colour { red: 255, green: 255, blue: 255 };
    /// Painted on points that escaped.
    pub const ESCAPED: Colour = Colour { red: 0, green: 0, blue: 0 };

    pub const fn rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, 255]
    }
}

/// Width and height of the canvas in pixels, each at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterConfig {
    width: u32,
    height: u32,
}

impl RasterConfig {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ExplorerError::InvalidRaster { width, height });
        }
        Ok(RasterConfig { width, height })
    }

    pub fn square(resolution: u32) -> Result<Self> {
        RasterConfig::new(resolution, resolution)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// How the raster loop is driven. Both modes produce the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Sequential,
    /// Rows are split across the rayon pool.
    Parallel,
}

/// Row-major RGBA8 pixels produced by one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageBuffer {
    fn blank(raster: &RasterConfig) -> Self {
        ImageBuffer {
            width: raster.width,
            height: raster.height,
            data: vec![0; 4 * raster.pixel_count()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// The RGBA quadruple at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = 4 * (y as usize * self.width as usize + x as usize);
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.data[idx..idx + 4]);
        Some(rgba)
    }

    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }

    /// Write the frame to disk as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let img = self.to_rgba_image().ok_or(ExplorerError::BufferSize {
            width: self.width,
            height: self.height,
            len: self.data.len(),
        })?;
        img.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[inline]
fn classify(region: &VisibleRegion, raster: &RasterConfig, budget: IterationBudget, px: u32, py: u32) -> Colour {
    let c = region.point(px, py, raster);
    if is_bounded(c.re, c.im, budget) {
        Colour::BOUNDED
    } else {
        Colour::ESCAPED
    }
}

/// Run a full single-threaded pass over the raster.
pub fn render(view: &ViewParameters, raster: &RasterConfig, budget: IterationBudget) -> ImageBuffer {
    let region = view.visible_region();
    let mut image = ImageBuffer::blank(raster);
    let width = raster.width as usize;
    for py in 0..raster.height {
        for px in 0..raster.width {
            let rgba = classify(&region, raster, budget, px, py).rgba();
            let pixel_idx = 4 * (py as usize * width + px as usize);
            image.data[pixel_idx..pixel_idx + 4].copy_from_slice(&rgba);
        }
    }
    image
}

/// Same output as [`render`], with rows filled on the rayon pool.
pub fn render_parallel(view: &ViewParameters, raster: &RasterConfig, budget: IterationBudget) -> ImageBuffer {
    let region = view.visible_region();
    let mut image = ImageBuffer::blank(raster);
    image
        .data
        .par_chunks_exact_mut(4 * raster.width as usize)
        .enumerate()
        .for_each(|(py, row)| {
            for (px, pixel) in row.chunks_exact_mut(4).enumerate() {
                let rgba = classify(&region, raster, budget, px as u32, py as u32).rgba();
                pixel.copy_from_slice(&rgba);
            }
        });
    image
}

pub fn render_with(
    mode: RenderMode,
    view: &ViewParameters,
    raster: &RasterConfig,
    budget: IterationBudget,
) -> ImageBuffer {
    match mode {
        RenderMode::Sequential => render(view, raster, budget),
        RenderMode::Parallel => render_parallel(view, raster, budget),
    }
}
