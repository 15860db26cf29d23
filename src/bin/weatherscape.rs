use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use weatherscape::{
    CpuSurface, FrameLimiter, FsAssetLoader, Host, RenderContext, Scene, SceneConfig, SceneEnv,
    WeatherCondition, WeatherSkyKind, WeatherStore,
};

#[derive(Parser, Debug)]
#[command(name = "weatherscape", version, about = "Weather-reactive background renderer")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render frames of the scene offline to PNG files.
    Render(RenderArgs),
    /// Show how a weather condition code is classified.
    Condition(ConditionArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output directory for `frame_00000.png` and following.
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = 60)]
    frames: u32,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Rate of the simulated display signal the frame limiter runs on.
    #[arg(long, default_value_t = 120.0)]
    refresh_hz: f64,
    /// Directory the asset URLs resolve against. Without it the scene renders without images.
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Weather API response body (JSON).
    #[arg(long)]
    weather: Option<PathBuf>,
    /// Scene config (JSON). `WEATHERSCAPE_FPS` overrides its fps.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Wall-clock time of the first frame, seconds since the Unix epoch. Defaults to now.
    #[arg(long)]
    epoch: Option<i64>,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct ConditionArgs {
    code: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Condition(args) => cmd_condition(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if !args.refresh_hz.is_finite() || args.refresh_hz <= 0.0 {
        anyhow::bail!("--refresh-hz must be finite and > 0");
    }
    let config = match &args.config {
        Some(path) => SceneConfig::from_path(path)?,
        None => SceneConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let epoch = args.epoch.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let (host, clock, queue) = Host::manual(epoch);

    let store = Rc::new(WeatherStore::new());
    if let Some(path) = &args.weather {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("read weather response '{}'", path.display()))?;
        store.publish_json(&body)?;
    }

    let mut env = SceneEnv::new(host.clone(), store).with_config(config.clone());
    if let Some(seed) = args.seed {
        env = env.with_seed(seed);
    }
    if let Some(root) = &args.assets {
        env.assets.load_all_blocking(&FsAssetLoader::new(root.clone()));
    }

    let surface = Rc::new(RefCell::new(CpuSurface::new(args.width, args.height)?));
    let scene = Rc::new(Scene::new(Rc::new(env), RenderContext::new(surface.clone())));
    let limiter = FrameLimiter::new(config.fps, &host)?;

    let rendered = Rc::new(Cell::new(0u32));
    limiter.start({
        let scene = scene.clone();
        let rendered = rendered.clone();
        move || {
            scene.tick();
            rendered.set(rendered.get() + 1);
        }
    });

    let refresh_ms = 1000.0 / args.refresh_hz;
    let max_signals = u64::from(args.frames)
        .saturating_mul((args.refresh_hz / config.fps).ceil().max(1.0) as u64 + 1)
        .saturating_add(16);
    let mut written = 0u32;
    let mut signals = 0u64;
    while written < args.frames && signals < max_signals {
        clock.advance(refresh_ms);
        queue.run_frame();
        signals += 1;
        if rendered.get() == written {
            continue;
        }
        let image = surface.borrow_mut().snapshot()?;
        let path = args.out.join(format!("frame_{written:05}.png"));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write '{}'", path.display()))?;
        written = rendered.get();
    }

    limiter.stop();
    queue.run_frame();
    scene.destroy();
    eprintln!("wrote {written} frames to {}", args.out.display());
    Ok(())
}

fn cmd_condition(args: ConditionArgs) -> anyhow::Result<()> {
    let condition = WeatherCondition::from_code(args.code);
    match WeatherSkyKind::for_condition(condition) {
        Some(sky) => println!("{condition} ({sky:?} sky)"),
        None => println!("{condition} (no weather sky)"),
    }
    Ok(())
}
