#![windows_subsystem = "windows"]

mod gui;

use std::error::Error;

use pixels::{Pixels, SurfaceTexture};
use winit::{
    dpi::LogicalSize,
    event::{Event, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
    window::WindowBuilder,
};
use winit_input_helper::WinitInputHelper;

use gui::Framework;
use point_explorer::{ExplorerSettings, ExplorerState, FrameSink, ImageBuffer, RenderWorker, RenderedFrame};

const MIN_SIZE: f64 = 300.0;
const INIT_SIZE: f64 = 800.0;

/// Events sent from the render worker to the event loop.
#[derive(Debug)]
enum UserEvent {
    Rendered(RenderedFrame),
}

/// Wakes the event loop when a frame is ready.
struct FrameProxy(EventLoopProxy<UserEvent>);

impl FrameSink for FrameProxy {
    fn deliver(&self, frame: RenderedFrame) -> bool {
        self.0.send_event(UserEvent::Rendered(frame)).is_ok()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = ExplorerSettings::load()?;
    let mut state = ExplorerState::from_settings(settings);

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let mut input = WinitInputHelper::new();

    let window = WindowBuilder::new()
        .with_title("Point Explorer")
        .with_inner_size(LogicalSize::new(INIT_SIZE, INIT_SIZE))
        .with_min_inner_size(LogicalSize::new(MIN_SIZE, MIN_SIZE))
        .build(&event_loop)?;

    // The pixel buffer is the canvas; the surface scales it to the window.
    let window_size = window.inner_size();
    let mut canvas_size = (state.resolution(), state.resolution());
    let mut pixels = {
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(canvas_size.0, canvas_size.1, surface_texture)?
    };

    let scale_factor = window.scale_factor() as f32;
    let mut framework = Framework::new(
        &event_loop,
        window_size.width,
        window_size.height,
        scale_factor,
        &pixels,
        (10.0, 10.0),
        (320.0, 260.0),
        (85.0, 30.0),
    );

    let mut worker = RenderWorker::spawn(FrameProxy(event_loop.create_proxy()))?;
    state.request_render(&mut worker)?;

    // Last frame on screen, kept for PNG export.
    let mut presented: Option<ImageBuffer> = None;

    event_loop.run(move |event, _, control_flow| {
        let event = match event {
            Event::UserEvent(UserEvent::Rendered(frame)) => {
                if let Some(buffer) = state.accept(frame) {
                    let size = (buffer.width(), buffer.height());
                    if size != canvas_size {
                        if let Err(err) = pixels.resize_buffer(size.0, size.1) {
                            log::error!("pixels.resize_buffer() failed: {err}");
                            *control_flow = ControlFlow::Exit;
                            return;
                        }
                        canvas_size = size;
                    }
                    pixels.frame_mut().copy_from_slice(buffer.as_bytes());
                    presented = Some(buffer);
                    window.request_redraw();
                }
                return;
            }
            event => event,
        };

        let mut needs_render = false;

        match &event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
                return;
            }

            Event::WindowEvent { event, .. } => framework.handle_event(event),

            Event::RedrawRequested(_) => {
                let actions = framework.prepare(&window, &mut state);
                if actions.reset {
                    state.reset();
                }
                needs_render |= actions.changed || actions.reset;
                if actions.export {
                    export(presented.as_ref(), &state);
                }

                let render_result = pixels.render_with(|encoder, render_target, context| {
                    context.scaling_renderer.render(encoder, render_target);
                    framework.render(encoder, render_target, context);
                    Ok(())
                });
                if let Err(err) = render_result {
                    log::error!("pixels.render_with() failed: {err}");
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                state.finish_blit();
            }
            _ => {}
        }

        // Let winit_input_helper collect events to build its state.
        // It returns `true` when it is time to update and request a redraw.
        if input.update(&event) {
            if !framework.wants_input() {
                let scroll = input.scroll_diff();
                if scroll != 0.0 {
                    needs_render |= state.zoom_by(scroll.signum() as f64);
                }
                let (mut dx, mut dy) = (0.0, 0.0);
                if input.key_pressed(VirtualKeyCode::W) || input.key_pressed(VirtualKeyCode::Up) {
                    dy -= 1.0;
                }
                if input.key_pressed(VirtualKeyCode::S) || input.key_pressed(VirtualKeyCode::Down) {
                    dy += 1.0;
                }
                if input.key_pressed(VirtualKeyCode::A) || input.key_pressed(VirtualKeyCode::Left) {
                    dx -= 1.0;
                }
                if input.key_pressed(VirtualKeyCode::D) || input.key_pressed(VirtualKeyCode::Right) {
                    dx += 1.0;
                }
                if dx != 0.0 || dy != 0.0 {
                    needs_render |= state.pan_by(dx, dy);
                }
                if input.key_pressed(VirtualKeyCode::R) {
                    state.reset();
                    needs_render = true;
                }
            }

            if let Some(scale_factor) = input.scale_factor() {
                framework.scale_factor(scale_factor);
            }
            if let Some(size) = input.window_resized() {
                if let Err(err) = pixels.resize_surface(size.width, size.height) {
                    log::error!("pixels.resize_surface() failed: {err}");
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                framework.resize(size.width, size.height);
            }
            window.request_redraw();
        }

        if needs_render {
            // The worker renders off this thread so the spinner keeps painting.
            if let Err(err) = state.request_render(&mut worker) {
                log::error!("could not start render: {err}");
                *control_flow = ControlFlow::Exit;
                return;
            }
            window.request_redraw();
        }
    });
}

fn export(buffer: Option<&ImageBuffer>, state: &ExplorerState) {
    let path = &state.settings().export.path;
    match buffer {
        Some(buffer) => match buffer.save_png(path) {
            Ok(()) => log::info!("exported {}x{} frame to {}", buffer.width(), buffer.height(), path.display()),
            Err(err) => log::error!("export to {} failed: {err}", path.display()),
        },
        None => log::warn!("nothing rendered yet, skipping export"),
    }
}
