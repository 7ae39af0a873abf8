use egui::{Align, ClippedPrimitive, Context, FontFamily, FontId, RichText, Stroke, TexturesDelta};
use egui_wgpu::renderer::{Renderer, ScreenDescriptor};
use num::Complex;
use pixels::{wgpu, PixelsContext};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::Window;

use point_explorer::ExplorerState;

/// The egui overlay: input state, wgpu renderer and the settings panel.
pub(crate) struct Framework {
    egui_ctx: Context,
    egui_state: egui_winit::State,
    screen_descriptor: ScreenDescriptor,
    renderer: Renderer,
    paint_jobs: Vec<ClippedPrimitive>,
    textures: TexturesDelta,

    /// The settings panel drawn on top of the canvas.
    gui: Gui,
}

/// What the user asked for in the last frame.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct GuiActions {
    /// A parameter changed and the canvas must be re-rendered.
    pub changed: bool,
    pub reset: bool,
    pub export: bool,
}

/// Settings panel state.
struct Gui {
    window_position: (f32, f32),
    window_open_size: (f32, f32),
    window_closed_size: (f32, f32),
    window_open: bool,
    font: FontId,
}

impl Framework {
    /// Set up egui on the same wgpu device as the canvas.
    pub(crate) fn new<T>(
        event_loop: &EventLoopWindowTarget<T>,
        width: u32,
        height: u32,
        scale_factor: f32,
        pixels: &pixels::Pixels,
        window_position: (f32, f32),
        window_open_size: (f32, f32),
        window_closed_size: (f32, f32),
    ) -> Self {
        let max_texture_size = pixels.device().limits().max_texture_dimension_2d as usize;

        let egui_ctx = Context::default();
        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_style(style);

        let mut egui_state = egui_winit::State::new(event_loop);
        egui_state.set_max_texture_side(max_texture_size);
        egui_state.set_pixels_per_point(scale_factor);
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: scale_factor,
        };
        let renderer = Renderer::new(pixels.device(), pixels.render_texture_format(), None, 1);
        let textures = TexturesDelta::default();

        let gui = Gui::new(window_position, window_open_size, window_closed_size);

        Self {
            egui_ctx,
            egui_state,
            screen_descriptor,
            renderer,
            paint_jobs: Vec::new(),
            textures,
            gui,
        }
    }

    /// Feed a window event to egui so the panel sees clicks and drags.
    pub(crate) fn handle_event(&mut self, event: &winit::event::WindowEvent) {
        let _ = self.egui_state.on_event(&self.egui_ctx, event);
    }

    /// True while the pointer or keyboard is busy with the settings panel.
    pub(crate) fn wants_input(&self) -> bool {
        self.egui_ctx.wants_pointer_input() || self.egui_ctx.wants_keyboard_input()
    }

    /// Track the window size in physical pixels.
    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.screen_descriptor.size_in_pixels = [width, height];
        }
    }

    pub(crate) fn scale_factor(&mut self, scale_factor: f64) {
        self.screen_descriptor.pixels_per_point = scale_factor as f32;
    }

    /// Lay out the settings panel and collect what the user asked for.
    pub(crate) fn prepare(&mut self, window: &Window, state: &mut ExplorerState) -> GuiActions {
        let mut actions = GuiActions::default();
        let raw_input = self.egui_state.take_egui_input(window);
        let output = self.egui_ctx.run(raw_input, |egui_ctx| {
            actions = self.gui.ui(egui_ctx, state);
        });

        self.textures.append(output.textures_delta);
        self.egui_state
            .handle_platform_output(window, &self.egui_ctx, output.platform_output);
        self.paint_jobs = self.egui_ctx.tessellate(output.shapes);
        actions
    }

    /// Draw the panel over the canvas in the same command encoder.
    pub(crate) fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        render_target: &wgpu::TextureView,
        context: &PixelsContext,
    ) {
        // Panel textures (fonts, the spinner) change between frames.
        for (id, image_delta) in &self.textures.set {
            self.renderer
                .update_texture(&context.device, &context.queue, *id, image_delta);
        }
        self.renderer.update_buffers(
            &context.device,
            &context.queue,
            encoder,
            &self.paint_jobs,
            &self.screen_descriptor,
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: render_target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            self.renderer
                .render(&mut rpass, &self.paint_jobs, &self.screen_descriptor);
        }

        let textures = std::mem::take(&mut self.textures);
        for id in &textures.free {
            self.renderer.free_texture(id);
        }
    }
}

/// Adds a label and a widget on one row.
/// If the widget changed, `$changed` is set so the canvas is redrawn.
macro_rules! setting_row {
    ($ui:ident, $changed:ident, $font:ident, $(($label:expr, $widget:ident)),+) => {
        $(
            $ui.horizontal(|ui| {
                ui.label(RichText::new($label).font($font.clone()));
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    ui.add_space(10.0);
                    $changed |= ui.add($widget).changed();
                });
            });
        )*
    };
}

impl Gui {
    fn new(window_position: (f32, f32), window_open_size: (f32, f32), window_closed_size: (f32, f32)) -> Self {
        Self {
            window_position,
            window_open_size,
            window_closed_size,
            window_open: true,
            font: FontId {
                size: 15.0,
                family: FontFamily::default(),
            },
        }
    }

    fn window_size(&self) -> (f32, f32) {
        if self.window_open {
            self.window_open_size
        } else {
            self.window_closed_size
        }
    }

    /// The collapsible settings panel in the top left corner.
    fn ui(&mut self, ctx: &Context, state: &mut ExplorerState) -> GuiActions {
        let size = self.window_size();
        let font = self.font.clone();
        let mut actions = GuiActions::default();

        egui::Area::new("Settings")
            .fixed_pos(self.window_position)
            .movable(false)
            .show(ctx, |ui| {
                ui.set_width(size.0);
                ui.set_height(size.1);
                ui.add_space(10.0);
                ui.painter().rect_filled(ui.max_rect(), 2.0, egui::Color32::from_black_alpha(220));
                ui.painter().rect_stroke(
                    ui.max_rect(),
                    2.0,
                    Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(150, 150, 150, 200)),
                );

                let title = RichText::new("Settings").color(egui::Color32::WHITE).font(font.clone());
                let collapse = ui.collapsing(title, |ui| {
                    ui.separator();
                    actions.changed |= Self::parameters(ui, &font, state);
                    ui.separator();

                    ui.horizontal(|ui| {
                        actions.reset = ui.button(RichText::new("Reset").font(font.clone())).clicked();
                        actions.export = ui.button(RichText::new("Export PNG").font(font.clone())).clicked();
                    });

                    ui.horizontal(|ui| {
                        if state.is_computing() {
                            ui.add(egui::Spinner::new());
                            ui.label(RichText::new("Rendering...").font(font.clone()));
                        } else if let Some(elapsed) = state.last_render() {
                            ui.label(RichText::new(format!("Rendered in {:.0?}", elapsed)).font(font.clone()));
                        }
                    });
                });
                self.window_open = collapse.fully_open();
            });

        actions
    }

    /// Sliders and number inputs for the render parameters.
    fn parameters(ui: &mut egui::Ui, font: &FontId, state: &mut ExplorerState) -> bool {
        let settings = state.settings().clone();
        let mut resolution = state.resolution();
        let mut max_iterations = state.max_iterations();
        let mut zoom = state.zoom();
        let (mut pan_x, mut pan_y) = (state.pan().re, state.pan().im);
        let pan_speed = 0.01 * settings.view.base_extent / zoom;
        let zoom_speed = 0.01 * zoom;

        let mut changed = false;
        let resolution_slider = egui::Slider::new(
            &mut resolution,
            settings.canvas.min_resolution..=settings.canvas.max_resolution,
        )
        .clamp_to_range(true);
        let iteration_slider = egui::Slider::new(&mut max_iterations, settings.iterations.min..=settings.iterations.max)
            .clamp_to_range(true);
        let zoom_input = egui::DragValue::new(&mut zoom)
            .speed(zoom_speed)
            .clamp_range(settings.view.min_zoom..=settings.view.max_zoom);
        let pan_x_input = egui::DragValue::new(&mut pan_x).speed(pan_speed).max_decimals(12);
        let pan_y_input = egui::DragValue::new(&mut pan_y).speed(pan_speed).max_decimals(12);
        setting_row!(
            ui,
            changed,
            font,
            ("Resolution", resolution_slider),
            ("Max Iterations", iteration_slider),
            ("Zoom", zoom_input),
            ("Center (re)", pan_x_input),
            ("Center (im)", pan_y_input)
        );

        if !changed {
            return false;
        }
        // Widgets report drags that end on the same value; only the
        // setters know whether anything really moved.
        let mut moved = state.set_resolution(resolution);
        moved |= state.set_max_iterations(max_iterations);
        moved |= state.set_zoom(zoom);
        moved |= state.set_pan(Complex::new(pan_x, pan_y));
        moved
    }
}
