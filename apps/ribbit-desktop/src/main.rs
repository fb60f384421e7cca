mod keymap;

use anyhow::{Context, Result};
use clap::Parser;
use ribbit_assets::FileTextureLoader;
use ribbit_engine::{EngineConfig, Ribbit, demo};
use ribbit_render::{Canvas2d, RasterCanvas};
use ribbit_render_wgpu::CanvasPresenter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "ribbit-desktop", about = "Run the ribbit demo in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine config (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial window size as a multiple of the canvas size
    #[arg(long, default_value = "2")]
    scale: u32,

    /// Scene to start in
    #[arg(long, default_value = demo::TITLE)]
    scene: String,
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    presenter: CanvasPresenter,
}

struct App {
    engine: Ribbit<RasterCanvas>,
    scale: u32,
    started: Instant,
    gpu: Option<Gpu>,
}

impl App {
    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let scale = self.scale.max(1);
        let attrs = Window::default_attributes()
            .with_title("Ribbit")
            .with_inner_size(PhysicalSize::new(
                self.engine.width() * scale,
                self.engine.height() * scale,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("ribbit_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut presenter =
            CanvasPresenter::new(&device, format, self.engine.width(), self.engine.height());
        presenter.resize(&queue, config.width, config.height);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );
        self.gpu = Some(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            presenter,
        });
        Ok(())
    }

    fn redraw(&mut self) {
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.engine.frame(now_ms);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let canvas = self.engine.canvas();
        gpu.presenter.upload(
            &gpu.device,
            &gpu.queue,
            canvas.pixels(),
            canvas.width(),
            canvas.height(),
        );

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
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
        gpu.presenter.render(&gpu.device, &gpu.queue, &view);
        output.present();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize window: {e:#}");
            event_loop.exit();
            return;
        }
        self.started = Instant::now();
        self.engine.start();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.engine.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.presenter
                        .resize(&gpu.queue, gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => self.engine.keyboard_mut().reset(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let key = keymap::map_key(code);
                match state {
                    ElementState::Pressed => self.engine.key_down(key),
                    ElementState::Released => self.engine.key_up(key),
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<(EngineConfig, PathBuf)> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
            Ok((config, root))
        }
        None => Ok((EngineConfig::with_size(320, 180), PathBuf::from("."))),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("ribbit-desktop starting");

    let (config, root) = load_config(cli.config.as_deref())?;
    let mut engine = Ribbit::<RasterCanvas>::from_config(config)?;
    let requested = engine.load_textures(&FileTextureLoader::new(root))?;
    tracing::info!(requested, "textures requested");
    demo::install(&mut engine, &cli.scene)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        engine,
        scale: cli.scale,
        started: Instant::now(),
        gpu: None,
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
