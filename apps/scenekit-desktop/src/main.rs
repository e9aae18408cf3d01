use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use scenekit_controls::{Action, Binding};
use scenekit_demos::{Demo, DemoKind, FrameLoop};
use scenekit_render::{Backend, RenderSettings, Viewport};
use scenekit_render_wgpu::{SurfaceFrame, WgpuRenderer};
use scenekit_tools::StatsMode;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "scenekit-desktop", about = "Scene demos in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo to show: basic, camera, transform or objects
    #[arg(short, long, default_value = "basic")]
    demo: DemoKind,

    /// Seed for demos that place objects randomly
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Initial window width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// JSON file with the demo's controls state
    #[arg(long)]
    controls: Option<PathBuf>,

    /// Show milliseconds per frame instead of frames per second
    #[arg(long)]
    ms: bool,
}

/// Demo, frame driver and panel state.
struct AppState {
    demo: Box<dyn Demo>,
    frame_loop: FrameLoop,
    /// False once a frame has failed; no further frames are scheduled.
    running: bool,
}

impl AppState {
    fn new(cli: &Cli) -> Result<Self> {
        let settings = RenderSettings::new(Viewport::new(cli.width, cli.height));
        let mut demo = cli.demo.build(settings, cli.seed)?;
        if let Some(path) = &cli.controls {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading controls from {}", path.display()))?;
            demo.load_controls(&json)?;
            tracing::info!(path = %path.display(), "controls loaded");
        }
        let mode = if cli.ms { StatsMode::Ms } else { StatsMode::Fps };
        Ok(Self {
            demo,
            frame_loop: FrameLoop::new(mode),
            running: true,
        })
    }

    /// Stats overlay in the top-left corner and the controls window.
    /// Returns the actions whose buttons were clicked.
    fn draw_ui(&mut self, ctx: &EguiContext) -> Vec<Action> {
        egui::Area::new(egui::Id::new("Stats-output"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(self.frame_loop.stats().label())
                        .monospace()
                        .color(egui::Color32::from_rgb(0x00, 0xff, 0xff))
                        .background_color(egui::Color32::from_rgb(0x00, 0x00, 0x22)),
                );
            });

        let mut clicked = Vec::new();
        egui::Window::new("Controls")
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0))
            .resizable(false)
            .show(ctx, |ui| {
                let mut rows = self.demo.bindings();
                let mut opened: Vec<&'static str> = Vec::new();
                for i in 0..rows.len() {
                    match rows[i].folder() {
                        None => draw_row(ui, &mut rows[i], &mut clicked),
                        Some(folder) if !opened.contains(&folder) => {
                            opened.push(folder);
                            ui.collapsing(folder, |ui| {
                                for row in rows.iter_mut().filter(|r| r.folder() == Some(folder)) {
                                    draw_row(ui, row, &mut clicked);
                                }
                            });
                        }
                        Some(_) => {}
                    }
                }
                if !self.running {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, "animation stopped, see log");
                }
            });
        clicked
    }

    fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            tracing::info!(%action, "panel action");
            if let Err(err) = self.demo.invoke(action) {
                tracing::error!(%err, %action, "action failed");
            }
        }
    }
}

fn draw_row(ui: &mut egui::Ui, row: &mut Binding<'_>, clicked: &mut Vec<Action>) {
    match row {
        Binding::Slider {
            label,
            value,
            min,
            max,
            ..
        } => {
            ui.add(egui::Slider::new(&mut **value, *min..=*max).text(*label));
        }
        Binding::Toggle { label, value, .. } => {
            ui.checkbox(&mut **value, *label);
        }
        Binding::Readout { label, text } => {
            ui.label(format!("{label}: {text}"));
        }
        Binding::Button { action, .. } => {
            if ui.button(action.label()).clicked() {
                clicked.push(*action);
            }
        }
    }
}

/// Probe for a hardware adapter, falling back to the platform's software
/// adapter.
fn request_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
) -> Option<(wgpu::Adapter, Backend)> {
    let request = |force_fallback_adapter| {
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(surface),
            force_fallback_adapter,
        }))
    };
    let hardware = request(false);
    let backend = Backend::select(hardware.is_some());
    match hardware {
        Some(adapter) => Some((adapter, backend)),
        None => request(backend.force_fallback()).map(|adapter| (adapter, backend)),
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(surface), Some(device), Some(config)) =
            (&self.surface, &self.device, &mut self.config)
        else {
            return;
        };
        config.width = new_size.width.max(1);
        config.height = new_size.height.max(1);
        surface.configure(device, config);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(device, config.width, config.height);
        }
        self.state
            .demo
            .context_mut()
            .resize(Viewport::new(config.width, config.height));
    }

    fn redraw(&mut self) {
        let (Some(window), Some(surface), Some(device), Some(queue), Some(renderer)) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &mut self.renderer,
        ) else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(config) = &self.config {
                    surface.configure(device, config);
                }
                window.request_redraw();
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

        if self.state.running {
            let mut frame = SurfaceFrame {
                renderer,
                device,
                queue,
                view: &view,
            };
            let next = window.clone();
            let result = self.state.frame_loop.tick(self.state.demo.as_mut(), &mut frame, || {
                next.request_redraw()
            });
            if result.is_err() {
                self.state.running = false;
            }
        } else {
            // Keep showing the last state under the panel.
            let ctx = self.state.demo.context();
            renderer.render(device, queue, &view, &ctx.scene, &ctx.camera);
        }

        let (Some(egui_winit), Some(egui_renderer), Some(config)) =
            (&mut self.egui_winit, &mut self.egui_renderer, &self.config)
        else {
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let mut clicked = Vec::new();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            clicked = self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
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
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();

        if !clicked.is_empty() {
            self.state.dispatch(clicked);
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let viewport = self.state.demo.context().viewport();
        let attrs = Window::default_attributes()
            .with_title(self.state.demo.kind().title())
            .with_inner_size(PhysicalSize::new(viewport.width, viewport.height));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let (adapter, backend) = request_adapter(&instance, &surface).expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("scenekit_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let viewport = Viewport::new(config.width, config.height);
        self.state.demo.context_mut().resize(viewport);
        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            self.state.demo.context().settings,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            ?backend,
            api = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            "GPU initialized"
        );

        // The first frame is requested here; every later one is scheduled by
        // the frame loop itself.
        window.request_redraw();

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.repaint && !self.state.running {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(demo = %cli.demo, "scenekit-desktop starting");

    let state = AppState::new(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
