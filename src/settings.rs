//! Explorer settings.
//!
//! Read from a TOML file; every field has a default so the file is
//! optional and may be partial.
//!
//! # Location
//!
//! 1. `$POINT_EXPLORER_CONFIG`
//! 2. `./point-explorer.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::render::RenderMode;

pub const CONFIG_ENV: &str = "POINT_EXPLORER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "point-explorer.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExplorerSettings {
    pub canvas: CanvasSettings,
    pub iterations: IterationSettings,
    pub view: ViewSettings,
    pub render: RenderSettings,
    pub export: ExportSettings,
}

/// Side length of the square canvas, in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CanvasSettings {
    pub resolution: u32,
    pub min_resolution: u32,
    pub max_resolution: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            resolution: 500,
            min_resolution: 1,
            max_resolution: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct IterationSettings {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl Default for IterationSettings {
    fn default() -> Self {
        Self {
            default: 50,
            min: 1,
            max: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ViewSettings {
    pub base_extent: f64,
    pub zoom: f64,
    pub pan: [f64; 2],
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom multiplier for one mouse wheel notch.
    pub zoom_step: f64,
    /// Pan distance for one key press, as a fraction of the visible extent.
    pub pan_step: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            base_extent: 4.0,
            zoom: 1.0,
            pan: [0.0, 0.0],
            min_zoom: 0.25,
            max_zoom: 1e12,
            zoom_step: 1.5,
            pan_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RenderSettings {
    pub mode: RenderMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExportSettings {
    pub path: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("point-explorer.png"),
        }
    }
}

impl ExplorerSettings {
    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        log::info!("Loading settings from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let settings: ExplorerSettings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn config_path() -> PathBuf {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => PathBuf::from(path),
            Err(_) => PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let canvas = &self.canvas;
        if canvas.min_resolution == 0 || canvas.min_resolution > canvas.max_resolution {
            return Err(invalid(format!(
                "canvas resolution range {}..={} must be non-empty and start at 1 or more",
                canvas.min_resolution, canvas.max_resolution
            )));
        }
        if !(canvas.min_resolution..=canvas.max_resolution).contains(&canvas.resolution) {
            return Err(invalid(format!(
                "canvas.resolution must be between {} and {}, got {}",
                canvas.min_resolution, canvas.max_resolution, canvas.resolution
            )));
        }

        let iterations = &self.iterations;
        if iterations.min == 0 || iterations.min > iterations.max {
            return Err(invalid(format!(
                "iteration range {}..={} must be non-empty and start at 1 or more",
                iterations.min, iterations.max
            )));
        }
        if !(iterations.min..=iterations.max).contains(&iterations.default) {
            return Err(invalid(format!(
                "iterations.default must be between {} and {}, got {}",
                iterations.min, iterations.max, iterations.default
            )));
        }

        let view = &self.view;
        for (name, value) in [
            ("view.base_extent", view.base_extent),
            ("view.zoom", view.zoom),
            ("view.min_zoom", view.min_zoom),
            ("view.max_zoom", view.max_zoom),
            ("view.pan_step", view.pan_step),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{} must be positive and finite, got {}", name, value)));
            }
        }
        if !(view.zoom_step.is_finite() && view.zoom_step > 1.0) {
            return Err(invalid(format!(
                "view.zoom_step must be greater than 1, got {}",
                view.zoom_step
            )));
        }
        if view.min_zoom > view.max_zoom || !(view.min_zoom..=view.max_zoom).contains(&view.zoom) {
            return Err(invalid(format!(
                "view.zoom must be between view.min_zoom ({}) and view.max_zoom ({}), got {}",
                view.min_zoom, view.max_zoom, view.zoom
            )));
        }
        if !view.pan.iter().all(|v| v.is_finite()) {
            return Err(invalid(format!("view.pan must be finite, got {:?}", view.pan)));
        }
        if !(view.base_extent / view.max_zoom).is_normal() {
            return Err(invalid(format!(
                "view.max_zoom {} is too deep for base extent {}",
                view.max_zoom, view.base_extent
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ExplorerError {
    ExplorerError::Settings(message)
}
