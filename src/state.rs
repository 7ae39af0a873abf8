//! State owned by the host window: the knobs the user turns and whether
//! a render is in flight. The core render functions never see this
//! struct, only the validated values it hands out.

use std::time::Duration;

use num::{clamp, Complex};

use crate::error::Result;
use crate::escape::IterationBudget;
use crate::render::{ImageBuffer, RasterConfig};
use crate::settings::ExplorerSettings;
use crate::viewport::ViewParameters;
use crate::worker::{RenderWorker, RenderedFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStatus {
    #[default]
    Idle,
    Computing,
}

#[derive(Debug, Clone)]
pub struct ExplorerState {
    resolution: u32,
    max_iterations: u32,
    zoom: f64,
    pan: Complex<f64>,
    status: RenderStatus,
    pending: Option<u64>,
    last_render: Option<Duration>,
    settings: ExplorerSettings,
}

impl ExplorerState {
    pub fn from_settings(settings: ExplorerSettings) -> Self {
        let mut state = ExplorerState {
            resolution: 0,
            max_iterations: 0,
            zoom: 0.0,
            pan: Complex::new(0.0, 0.0),
            status: RenderStatus::Idle,
            pending: None,
            last_render: None,
            settings,
        };
        state.reset();
        state
    }

    /// Return resolution, iterations, zoom and pan to the configured
    /// defaults. Render bookkeeping is left alone.
    pub fn reset(&mut self) {
        let s = &self.settings;
        self.resolution = clamp(s.canvas.resolution, s.canvas.min_resolution, s.canvas.max_resolution);
        self.max_iterations = clamp(s.iterations.default, s.iterations.min, s.iterations.max);
        self.zoom = clamp(s.view.zoom, s.view.min_zoom, s.view.max_zoom);
        self.pan = Complex::new(s.view.pan[0], s.view.pan[1]);
    }

    pub fn settings(&self) -> &ExplorerSettings {
        &self.settings
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Complex<f64> {
        self.pan
    }

    pub fn status(&self) -> RenderStatus {
        self.status
    }

    pub fn is_computing(&self) -> bool {
        self.status == RenderStatus::Computing
    }

    /// Duration of the last accepted render.
    pub fn last_render(&self) -> Option<Duration> {
        self.last_render
    }

    // Setters clamp to the configured limits and report whether anything
    // changed, so the host knows when to re-render.

    pub fn set_resolution(&mut self, resolution: u32) -> bool {
        let canvas = &self.settings.canvas;
        let resolution = clamp(resolution, canvas.min_resolution, canvas.max_resolution);
        replace(&mut self.resolution, resolution)
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) -> bool {
        let limits = &self.settings.iterations;
        let max_iterations = clamp(max_iterations, limits.min, limits.max);
        replace(&mut self.max_iterations, max_iterations)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let zoom = clamp(zoom, self.settings.view.min_zoom, self.settings.view.max_zoom);
        replace(&mut self.zoom, zoom)
    }

    pub fn set_pan(&mut self, pan: Complex<f64>) -> bool {
        if !(pan.re.is_finite() && pan.im.is_finite()) {
            return false;
        }
        replace(&mut self.pan, pan)
    }

    /// Zoom in by `steps` wheel notches; negative steps zoom out.
    pub fn zoom_by(&mut self, steps: f64) -> bool {
        self.set_zoom(self.zoom * self.settings.view.zoom_step.powf(steps))
    }

    /// Pan by a number of key presses along each axis.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        let distance = self.settings.view.pan_step * self.settings.view.base_extent / self.zoom;
        self.set_pan(self.pan + Complex::new(dx * distance, dy * distance))
    }

    pub fn view(&self) -> Result<ViewParameters> {
        ViewParameters::new(self.zoom, self.pan, self.settings.view.base_extent)
    }

    pub fn raster(&self) -> Result<RasterConfig> {
        RasterConfig::square(self.resolution)
    }

    pub fn budget(&self) -> Result<IterationBudget> {
        IterationBudget::new(self.max_iterations)
    }

    /// Submit the current parameters to the worker and flip to Computing.
    pub fn request_render(&mut self, worker: &mut RenderWorker) -> Result<u64> {
        let generation = worker.submit(
            self.view()?,
            self.raster()?,
            self.budget()?,
            self.settings.render.mode,
        )?;
        self.pending = Some(generation);
        self.status = RenderStatus::Computing;
        Ok(generation)
    }

    /// Take the buffer out of `frame` if it answers the newest request.
    /// Stale frames are dropped.
    pub fn accept(&mut self, frame: RenderedFrame) -> Option<ImageBuffer> {
        if self.pending != Some(frame.generation) {
            log::debug!("ignoring stale frame {}", frame.generation);
            return None;
        }
        self.pending = None;
        self.last_render = Some(frame.elapsed);
        Some(frame.buffer)
    }

    /// Called once the accepted buffer is on screen.
    pub fn finish_blit(&mut self) {
        if self.pending.is_none() {
            self.status = RenderStatus::Idle;
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
