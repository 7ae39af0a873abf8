//! Background render worker.
//!
//! Renders run on a dedicated thread so the host can paint its busy
//! indicator while the raster loop grinds. Every request carries a
//! generation number; only the newest generation is ever delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{ExplorerError, Result};
use crate::escape::IterationBudget;
use crate::render::{render_with, ImageBuffer, RasterConfig, RenderMode};
use crate::viewport::ViewParameters;

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest {
    pub generation: u64,
    pub view: ViewParameters,
    pub raster: RasterConfig,
    pub budget: IterationBudget,
    pub mode: RenderMode,
}

/// A finished render pass.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub generation: u64,
    pub buffer: ImageBuffer,
    pub elapsed: Duration,
}

/// Receives finished frames from the worker thread.
pub trait FrameSink: Send + 'static {
    /// Hand over a frame. Returning false tells the worker nobody is
    /// listening any more and it should stop.
    fn deliver(&self, frame: RenderedFrame) -> bool;
}

impl FrameSink for Sender<RenderedFrame> {
    fn deliver(&self, frame: RenderedFrame) -> bool {
        self.send(frame).is_ok()
    }
}

pub struct RenderWorker {
    requests: Option<Sender<RenderRequest>>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    pub fn spawn<S: FrameSink>(sink: S) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));
        let handle = {
            let latest = Arc::clone(&latest);
            thread::Builder::new()
                .name("render".into())
                .spawn(move || run(rx, latest, sink))?
        };
        Ok(RenderWorker {
            requests: Some(tx),
            latest,
            handle: Some(handle),
        })
    }

    /// Queue a render and return its generation. Any render still queued
    /// or in flight becomes stale.
    pub fn submit(
        &mut self,
        view: ViewParameters,
        raster: RasterConfig,
        budget: IterationBudget,
        mode: RenderMode,
    ) -> Result<u64> {
        let requests = self.requests.as_ref().ok_or(ExplorerError::WorkerClosed)?;
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        requests
            .send(RenderRequest {
                generation,
                view,
                raster,
                budget,
                mode,
            })
            .map_err(|_| ExplorerError::WorkerClosed)?;
        Ok(generation)
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("render worker panicked");
            }
        }
    }
}

fn run<S: FrameSink>(rx: Receiver<RenderRequest>, latest: Arc<AtomicU64>, sink: S) {
    serve(&rx, &latest, &sink, |request| {
        render_with(request.mode, &request.view, &request.raster, request.budget)
    });
}

/// The worker loop, with the raster pass passed in as `render`.
fn serve<S, F>(rx: &Receiver<RenderRequest>, latest: &AtomicU64, sink: &S, render: F)
where
    S: FrameSink,
    F: Fn(&RenderRequest) -> ImageBuffer,
{
    while let Ok(mut request) = rx.recv() {
        // Only the newest queued request matters.
        while let Ok(newer) = rx.try_recv() {
            log::debug!("superseding render {} with {}", request.generation, newer.generation);
            request = newer;
        }
        if request.generation != latest.load(Ordering::SeqCst) {
            continue;
        }

        let start = Instant::now();
        let buffer = render(&request);
        let elapsed = start.elapsed();

        if request.generation != latest.load(Ordering::SeqCst) {
            log::debug!("dropping stale render {}", request.generation);
            continue;
        }
        log::debug!(
            "render {} finished: {}x{}, {} iterations, {:?}",
            request.generation,
            request.raster.width(),
            request.raster.height(),
            request.budget.get(),
            elapsed
        );
        let frame = RenderedFrame {
            generation: request.generation,
            buffer,
            elapsed,
        };
        if !sink.deliver(frame) {
            log::debug!("frame sink closed, stopping render worker");
            break;
        }
    }
}
