use std::sync::mpsc;
use std::time::Duration;

use num::Complex;
use point_explorer::{
    render, render_parallel, ExplorerSettings, ExplorerState, ImageBuffer, IterationBudget, RasterConfig,
    RenderStatus, RenderWorker, ViewParameters,
};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn budget(n: u32) -> IterationBudget {
    IterationBudget::new(n).unwrap()
}

fn count_white(image: &ImageBuffer) -> usize {
    image.as_bytes().chunks_exact(4).filter(|p| *p == WHITE).count()
}

#[test]
fn three_pixel_canvas_end_to_end() {
    let view = ViewParameters::new(1.0, Complex::new(0.0, 0.0), 4.0).unwrap();
    let raster = RasterConfig::square(3).unwrap();
    let image = render(&view, &raster, budget(50));

    let region = view.visible_region();
    assert_eq!(region.point(0, 0, &raster), Complex::new(-2.0, -2.0));
    assert_eq!(region.point(2, 0, &raster), Complex::new(2.0, -2.0));
    assert_eq!(region.point(0, 2, &raster), Complex::new(-2.0, 2.0));
    assert_eq!(region.point(2, 2, &raster), Complex::new(2.0, 2.0));
    assert_eq!(region.point(1, 1, &raster), Complex::new(0.0, 0.0));

    // (0, ±2) and (2, 0) escape on the second step; (-2, 0) sits on the
    // boundary forever.
    let expected: Vec<u8> = [
        BLACK, BLACK, BLACK, //
        WHITE, WHITE, BLACK, //
        BLACK, BLACK, BLACK,
    ]
    .iter()
    .flatten()
    .copied()
    .collect();
    assert_eq!(image.as_bytes(), expected.as_slice());
}

#[test]
fn render_is_deterministic() {
    let view = ViewParameters::new(4.0, Complex::new(-0.75, 0.1), 4.0).unwrap();
    let raster = RasterConfig::new(80, 60).unwrap();
    let a = render(&view, &raster, budget(100));
    let b = render(&view, &raster, budget(100));
    assert_eq!(a.as_bytes(), b.as_bytes());
    assert_eq!(a, render_parallel(&view, &raster, budget(100)));
}

#[test]
fn every_pixel_is_opaque_black_or_white() {
    let raster = RasterConfig::square(120).unwrap();
    for (zoom, pan) in [(1.0, (0.0, 0.0)), (8.0, (-0.75, 0.1)), (0.5, (1.0, -1.0))] {
        let view = ViewParameters::new(zoom, Complex::new(pan.0, pan.1), 4.0).unwrap();
        let image = render(&view, &raster, budget(60));
        assert!(image.as_bytes().chunks_exact(4).all(|p| p == WHITE || p == BLACK));
        assert!(image.as_bytes().chunks_exact(4).all(|p| p[3] == 255));
    }
}

#[test]
fn raising_the_budget_only_darkens_the_canvas() {
    // A point that escapes within k iterations keeps escaping for any
    // larger budget, so the white area can only shrink.
    let view = ViewParameters::default();
    let raster = RasterConfig::square(100).unwrap();
    let mut previous = count_white(&render(&view, &raster, budget(1)));
    for n in [2, 5, 10, 25, 50, 100] {
        let white = count_white(&render(&view, &raster, budget(n)));
        assert!(white <= previous, "budget {} brightened the canvas", n);
        previous = white;
    }
    assert!(previous > 0);
}

#[test]
fn host_state_drives_worker_to_idle() {
    let mut settings = ExplorerSettings::default();
    settings.canvas.resolution = 24;
    let mut state = ExplorerState::from_settings(settings);
    let (tx, rx) = mpsc::channel();
    let mut worker = RenderWorker::spawn(tx).unwrap();

    state.request_render(&mut worker).unwrap();
    state.zoom_by(1.0);
    let newest = state.request_render(&mut worker).unwrap();
    assert_eq!(state.status(), RenderStatus::Computing);

    let mut accepted = None;
    while accepted.is_none() {
        let frame = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        let generation = frame.generation;
        accepted = state.accept(frame);
        assert!(accepted.is_none() || generation == newest);
    }
    state.finish_blit();
    assert_eq!(state.status(), RenderStatus::Idle);

    let expected = render(&state.view().unwrap(), &state.raster().unwrap(), state.budget().unwrap());
    assert_eq!(accepted.unwrap(), expected);
}

#[test]
fn exports_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let image = render(&ViewParameters::default(), &RasterConfig::square(9).unwrap(), budget(20));
    image.save_png(&path).unwrap();
    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (9, 9));
    assert_eq!(decoded.into_raw(), image.into_vec());
}
