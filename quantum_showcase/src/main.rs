//! Quantum Concept Showcase
//!
//! All five animations in one window with a control sidebar.
//!
//! Usage: `quantum_showcase [--only a,b] [--without a,b] [--seed N] [--size WxH]`
//! where modules are particles, box, entanglement, slit, uncertainty.
//!
//! Controls:
//! - Click: open the box / measure a spin
//! - Space: Pause or resume every animation
//! - O: Toggle which-slit observation
//! - S: Separate the entangled pair
//! - R: Reset the box
//! - Escape: Quit

use common::{Camera2D, GraphicsContext};
use glam::Vec2;
use clap::Parser;
use quantum_showcase::config::{Args, ShowcaseConfig};
use quantum_showcase::control_panel::{draw_control_panel, paint_canvas_text};
use quantum_showcase::palette::BACKGROUND;
use quantum_showcase::renderer::{build_batches, CanvasRenderer};
use quantum_showcase::showcase::{canvas_area, Showcase, SurfaceMap};
use quantum_showcase::tessellate::CanvasVertex;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: CanvasRenderer,
    camera: Camera2D,
    egui: EguiState,
    config: ShowcaseConfig,
    showcase: Showcase,
    surfaces: SurfaceMap,
    vertices: Vec<CanvasVertex>,
    cursor: Vec2,
    /// Sidebar width in points from the last UI pass
    sidebar_width: f32,
    pixels_per_point: f32,
}

/// Sidebar width assumed until the first UI pass reports the real one
const SIDEBAR_MIN_WIDTH: f32 = 280.0;

impl App {
    fn new(ctx: GraphicsContext, config: ShowcaseConfig) -> Self {
        let renderer = CanvasRenderer::new(&ctx);
        let camera = Camera2D::new(ctx.size.width as f32, ctx.size.height as f32);

        let pixels_per_point = ctx.window.scale_factor() as f32;
        let surfaces = SurfaceMap::layout(
            canvas_area(
                Vec2::new(ctx.size.width as f32, ctx.size.height as f32),
                SIDEBAR_MIN_WIDTH * pixels_per_point,
            ),
            &config.modules,
        );
        let showcase = Showcase::new(&config, &surfaces);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            renderer,
            camera,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
            config,
            showcase,
            surfaces,
            vertices: Vec::new(),
            cursor: Vec2::ZERO,
            sidebar_width: SIDEBAR_MIN_WIDTH,
            pixels_per_point,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera
            .update_viewport(self.ctx.size.width as f32, self.ctx.size.height as f32);
        self.relayout();
    }

    fn update(&mut self, dt: f32) {
        self.relayout();
        self.showcase.frame(dt);
    }

    /// Re-split the canvas if the window or the sidebar changed size
    fn relayout(&mut self) {
        let window = Vec2::new(self.ctx.size.width as f32, self.ctx.size.height as f32);
        let area = canvas_area(window, self.sidebar_width * self.pixels_per_point);
        let surfaces = SurfaceMap::layout(area, &self.config.modules);
        if surfaces != self.surfaces {
            self.showcase.layout(&surfaces);
            self.surfaces = surfaces;
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.ctx.queue, &self.camera);

        let batches = build_batches(&self.showcase.panels(), &mut self.vertices);
        self.renderer
            .upload(&self.ctx.device, &self.ctx.queue, &self.vertices);

        // Build egui UI
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let showcase = &mut self.showcase;
        let mut sidebar_width = self.sidebar_width;
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            let canvas = draw_control_panel(ctx, showcase);
            sidebar_width = ctx.screen_rect().width() - canvas.width();
            paint_canvas_text(ctx, showcase, ctx.pixels_per_point());
        });
        // Picked up by the next update, before any module steps
        self.sidebar_width = sidebar_width;
        self.pixels_per_point = full_output.pixels_per_point;

        self.egui
            .state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self
            .egui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui
                .renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(
            &mut encoder,
            &view,
            (self.ctx.size.width, self.ctx.size.height),
            &batches,
            BACKGROUND,
        );

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui
                .renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState, elwt: &EventLoopWindowTarget<()>) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space => self.showcase.toggle_pause(),
            KeyCode::KeyO => self.showcase.toggle_observing(),
            KeyCode::KeyS => self.showcase.separate_pair(),
            KeyCode::KeyR => self.showcase.reset_box(),
            KeyCode::Escape => elwt.exit(),
            _ => {}
        }
    }

    fn handle_click(&mut self) {
        if !self.showcase.click(self.cursor) {
            log::debug!("Click at {:?} hit no interactive element", self.cursor);
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui
            .state
            .on_window_event(&self.ctx.window, event)
            .consumed
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ShowcaseConfig::from(Args::parse());

    let (ctx, event_loop) = match pollster::block_on(GraphicsContext::new(
        &config.title,
        config.width,
        config.height,
    )) {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("Failed to initialize graphics: {}", e);
            std::process::exit(1);
        }
    };

    let enabled: Vec<&str> = config.modules.iter().map(|kind| kind.key()).collect();
    log::info!(
        "Quantum showcase starting: {}x{}, modules [{}]",
        config.width,
        config.height,
        enabled.join(", ")
    );

    let mut app = App::new(ctx, config);
    let mut last_time = std::time::Instant::now();

    let result = event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                // Cursor tracking must see every move, even over the sidebar
                if let WindowEvent::CursorMoved { position, .. } = event {
                    app.cursor = Vec2::new(position.x as f32, position.y as f32);
                }

                let consumed = app.handle_window_event(event);

                // Redraws and resizes are never swallowed by the UI
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => app.resize(*size),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state,
                                ..
                            },
                        ..
                    } if !consumed => app.handle_key(*key, *state, elwt),
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } if !consumed => app.handle_click(),
                    WindowEvent::RedrawRequested => {
                        let now = std::time::Instant::now();
                        let dt = (now - last_time).as_secs_f32().min(0.1);
                        last_time = now;

                        app.update(dt);
                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("GPU out of memory");
                                elwt.exit();
                            }
                            Err(e) => log::warn!("Render error: {:?}", e),
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    });

    if let Err(e) = result {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
