use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use ringlife_common::AutomatonConfig;
use ringlife_gpu::{GpuContext, Presenter, WgpuEngine};
use ringlife_input::{Action, PaintState, PointerMapping, adjust_radius};
use ringlife_kernel::{Automaton, Brush, ComputeEngine, EngineError};
use ringlife_tools::{AutomatonSummary, FrameTimer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "ringlife-desktop", about = "Ringlife desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Pixels of trackpad scroll treated as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Window-independent application state.
struct AppState {
    config: AutomatonConfig,
    paint: PaintState,
    /// Window-space position to paint at while the button is held.
    painting: Option<Vec2>,
    paused: bool,
    reset_requested: bool,
    show_panel: bool,
    timer: FrameTimer,
    last_frame: Instant,
}

impl AppState {
    fn new(config: AutomatonConfig) -> Self {
        Self {
            config,
            paint: PaintState::new(),
            painting: None,
            paused: false,
            reset_requested: false,
            show_panel: true,
            timer: FrameTimer::new(120),
            last_frame: Instant::now(),
        }
    }

    fn apply<E: ComputeEngine>(&mut self, action: Action, automaton: &mut Automaton<E>) {
        match action {
            Action::Paint(at) => self.painting = Some(at),
            Action::StopPaint => self.painting = None,
            Action::AdjustRadius(lines) => {
                let brush = automaton.brush();
                automaton.set_brush(Brush {
                    radius: adjust_radius(brush.radius, lines),
                    ..brush
                });
            }
            Action::TogglePause => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "toggled pause");
            }
            Action::Reset => self.reset_requested = true,
            Action::Noop => {}
        }
    }

    fn key_action(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Space => Action::TogglePause,
            KeyCode::KeyR => Action::Reset,
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
                Action::Noop
            }
            _ => Action::Noop,
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext, automaton: &mut Automaton<WgpuEngine>) {
        if !self.show_panel {
            return;
        }

        let summary = AutomatonSummary::of(automaton);
        let mut brush = automaton.brush();

        egui::SidePanel::left("status")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Ringlife");
                ui.separator();
                ui.label(format!("Tick: {}", summary.ticks));
                ui.label(format!("Current grid: {}", summary.role.current()));
                ui.label(format!("Field: {}", summary.field));
                ui.label(format!(
                    "Frame: {:.2?} ({:.0} fps)",
                    self.timer.average(),
                    self.timer.fps()
                ));
                ui.separator();

                ui.heading("Brush");
                ui.add(egui::Slider::new(&mut brush.radius, 1.0..=200.0).text("radius"));
                ui.add(egui::Slider::new(&mut brush.fill, 0.0..=1.0).text("fill"));
                ui.separator();

                ui.horizontal(|ui| {
                    let label = if self.paused { "Resume (Space)" } else { "Pause (Space)" };
                    if ui.button(label).clicked() {
                        self.paused = !self.paused;
                    }
                    if ui.button("Reset (R)").clicked() {
                        self.reset_requested = true;
                    }
                });

                ui.separator();
                ui.small("LMB: Paint | Wheel: Radius | F1: Toggle Panel");
            });

        if brush != automaton.brush() {
            automaton.set_brush(brush);
        }
    }
}

/// Everything that exists only while a window is open.
struct Gfx {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    gpu: Arc<GpuContext>,
    presenter: Presenter,
    automaton: Automaton<WgpuEngine>,
    mapping: PointerMapping,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gfx {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, config: &AutomatonConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Ringlife")
            .with_inner_size(PhysicalSize::new(1024u32, 1024));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = Arc::new(pollster::block_on(GpuContext::request(
            &instance,
            Some(&surface),
        ))?);

        let size = window.inner_size();
        let caps = surface.get_capabilities(&gpu.adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);

        let presenter = Presenter::new(&gpu.device, format);
        let automaton = Automaton::new(WgpuEngine::new(gpu.clone()), config)?;
        let mapping = PointerMapping::fullscreen(
            Vec2::new(surface_config.width as f32, surface_config.height as f32),
            config.field,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, format, None, 1, false);

        Ok(Self {
            window,
            surface,
            surface_config,
            gpu,
            presenter,
            automaton,
            mapping,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface_config.width = size.width.max(1);
        self.surface_config.height = size.height.max(1);
        self.surface.configure(&self.gpu.device, &self.surface_config);
        self.mapping.set_viewport(
            Vec2::ZERO,
            Vec2::new(size.width as f32, size.height as f32),
        );
    }

    fn reset(&mut self, config: &mut AutomatonConfig) -> Result<()> {
        let engine = WgpuEngine::new(self.gpu.clone());
        self.automaton = rebuild(engine, config, &self.automaton)?;
        Ok(())
    }

    fn frame(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        if state.reset_requested {
            state.reset_requested = false;
            if let Err(e) = self.reset(&mut state.config) {
                tracing::error!("reset failed: {e:#}");
            }
        }

        if !state.paused {
            let paint_at = state
                .painting
                .and_then(|cursor| self.mapping.to_field(cursor));
            self.automaton.tick(paint_at);
        }

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.gpu.device, &self.surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx, &mut self.automaton);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        if let Some(result) = self.automaton.engine().result_view() {
            self.presenter.draw(device, &mut encoder, &view, result);
        }
        self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    gfx: Option<Gfx>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(config: AutomatonConfig) -> Self {
        Self {
            state: AppState::new(config),
            gfx: None,
            egui_ctx: EguiContext::default(),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }
        match Gfx::new(event_loop, &self.egui_ctx, &self.state.config) {
            Ok(gfx) => self.gfx = Some(gfx),
            Err(e) => {
                tracing::error!("failed to start: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gfx) = &mut self.gfx else {
            return;
        };

        // A release over the panel still has to end a stroke started in the field.
        if let WindowEvent::MouseInput {
            button: MouseButton::Left,
            state: ElementState::Released,
            ..
        } = event
        {
            let action = self.state.paint.button(false);
            self.state.apply(action, &mut gfx.automaton);
        }

        let response = gfx.egui_winit.on_window_event(&gfx.window, &event);
        if response.consumed {
            return;
        }

        let action = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                gfx.resize(size);
                return;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state.key_action(key)
            }
            WindowEvent::CursorMoved { position, .. } => self
                .state
                .paint
                .cursor_moved(Vec2::new(position.x as f32, position.y as f32)),
            WindowEvent::CursorLeft { .. } => self.state.paint.cursor_left(),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => self.state.paint.button(state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                Action::AdjustRadius(lines)
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                self.state.timer.record(now - self.state.last_frame);
                self.state.last_frame = now;
                gfx.frame(&mut self.state, &self.egui_ctx);
                gfx.window.request_redraw();
                return;
            }
            _ => return,
        };

        self.state.apply(action, &mut gfx.automaton);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.gfx {
            gfx.window.request_redraw();
        }
    }
}

/// Build a fresh automaton with the next noise seed, keeping the brush of
/// `previous`.
fn rebuild<E: ComputeEngine>(
    engine: E,
    config: &mut AutomatonConfig,
    previous: &Automaton<E>,
) -> Result<Automaton<E>, EngineError> {
    config.seed = config.seed.wrapping_add(1);
    let mut automaton = Automaton::new(engine, config)?;
    automaton.set_brush(previous.brush());
    tracing::info!(seed = config.seed, "automaton reset");
    Ok(automaton)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => AutomatonConfig::load(path)?,
        None => AutomatonConfig::default(),
    };
    tracing::info!(field = %config.field, seed = config.seed, "ringlife-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
