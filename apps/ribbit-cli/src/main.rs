use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ribbit_assets::FileTextureLoader;
use ribbit_engine::{EngineConfig, Ribbit, demo};
use ribbit_input::Key;
use ribbit_render::{Canvas2d, RasterCanvas};
use ribbit_tools::SceneInspector;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ribbit-cli", about = "CLI tool for ribbit operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Check an engine config file
    Validate {
        config: PathBuf,
        /// Print the config with defaults filled in
        #[arg(long)]
        dump: bool,
    },
    /// Run the demo headlessly and save the last frame as an image
    Render {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Output image (.png, .bmp or .jpg)
        #[arg(short, long, default_value = "frame.png")]
        out: PathBuf,
        /// Engine config (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Scene to start in
        #[arg(long, default_value = demo::POND)]
        scene: String,
        /// Keys held for the whole run, by DOM code (e.g. ArrowRight)
        #[arg(long = "hold")]
        hold: Vec<String>,
        /// Show the debug overlay
        #[arg(long)]
        debug: bool,
        /// Seconds to wait for textures before the first frame
        #[arg(long, default_value = "10")]
        texture_timeout: f32,
    },
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

/// Poll texture loads until all have settled or `timeout` runs out. Returns
/// whether everything settled.
fn settle_textures(engine: &mut Ribbit<RasterCanvas>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        engine.textures_mut().poll();
        if engine.textures().all_settled() {
            return true;
        }
        if Instant::now() >= deadline {
            tracing::warn!(
                pending = engine.textures().pending_count(),
                "textures still loading after timeout"
            );
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Drive `frames` animation frames spaced `dt` seconds apart.
fn run_frames(engine: &mut Ribbit<RasterCanvas>, frames: u32, dt: f32) {
    let step_ms = f64::from(dt) * 1000.0;
    for i in 0..frames {
        engine.frame(f64::from(i) * step_ms);
    }
}

fn save_image(canvas: &RasterCanvas, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.to_rgba_image())
        .context("canvas buffer does not match its size")?;
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("ribbit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", ribbit_common::crate_info());
            println!("render: {}", ribbit_render::crate_info());
            println!("input: {}", ribbit_input::crate_info());
            println!("assets: {}", ribbit_assets::crate_info());
            println!("ecs: {}", ribbit_ecs::crate_info());
            println!("tools: {}", ribbit_tools::crate_info());
            println!("engine: {}", ribbit_engine::crate_info());
        }
        Commands::Validate { config, dump } => {
            let cfg = EngineConfig::load(&config)
                .with_context(|| format!("invalid config {}", config.display()))?;
            println!(
                "OK: {}x{}, {} layers, {} textures, debug toggle {}",
                cfg.width,
                cfg.height,
                cfg.layers.len(),
                cfg.textures.len(),
                cfg.debug.toggle_key
            );
            if dump {
                print!("{}", cfg.to_yaml()?);
            }
        }
        Commands::Render {
            frames,
            out,
            config,
            dt,
            scene,
            hold,
            debug,
            texture_timeout,
        } => {
            if !(dt.is_finite() && dt > 0.0) {
                bail!("--dt must be positive, got {dt}");
            }
            let timeout = Duration::try_from_secs_f32(texture_timeout)
                .with_context(|| format!("invalid --texture-timeout {texture_timeout}"))?;
            let (cfg, root) = load_config(config.as_deref())?;
            let mut engine = Ribbit::<RasterCanvas>::from_config(cfg)?;
            engine.load_textures(&FileTextureLoader::new(root))?;
            settle_textures(&mut engine, timeout);
            demo::install(&mut engine, &scene)?;
            engine.debug_mut().set_enabled(debug);
            for code in &hold {
                engine.key_down(Key::from_code(code));
            }
            engine.start();
            run_frames(&mut engine, frames, dt);

            let stats = engine.stats();
            if stats.skipped > 0 {
                for (name, error) in engine.textures().failures() {
                    tracing::warn!(texture = name, error, "texture failed");
                }
                tracing::warn!(skipped = stats.skipped, "frames skipped waiting for textures");
            }
            save_image(engine.canvas(), &out)?;
            println!(
                "Rendered {} frames ({} skipped) to {}",
                stats.frames,
                stats.skipped,
                out.display()
            );
            if let Some(active) = engine.active_scene() {
                println!("{}", SceneInspector::summary(active));
            }
        }
    }

    Ok(())
}
