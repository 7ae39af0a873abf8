//! Point explorer: paints which points of the complex plane stay bounded
//! under `z <- z^2 + c`.
//!
//! Each pixel of a square canvas is mapped onto a viewport of the plane
//! ([`viewport`]), classified with a bounded escape-time test
//! ([`escape`]) and written white (bounded) or black (escaped) into an
//! RGBA buffer ([`render`]). The window in `main.rs` drives renders
//! through a background [`worker`] and keeps its knobs in [`state`].

pub mod error;
pub mod escape;
pub mod render;
pub mod settings;
pub mod state;
pub mod viewport;
pub mod worker;

pub use error::{ExplorerError, Result};
pub use escape::{escape_time, is_bounded, IterationBudget};
pub use render::{render, render_parallel, render_with, ImageBuffer, RasterConfig, RenderMode};
pub use settings::ExplorerSettings;
pub use state::{ExplorerState, RenderStatus};
pub use viewport::{axis_coordinate, ViewParameters, VisibleRegion};
pub use worker::{FrameSink, RenderWorker, RenderedFrame};
