use std::{
    cell::Cell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use raffle_anim::{
    AnimationEngineConfig, CpuCanvas, EngineCallbacks, EngineFactory, FrameQueue, FrameRGBA,
    ImageCache, ManualClock, run_to_completion,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "raffle-anim", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported animation styles.
    Styles,
    /// Check a config JSON without rendering anything.
    Validate(ValidateArgs),
    /// Play a config headlessly on the CPU backend and write PNG frames.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 960)]
    width: u32,

    #[arg(long, default_value_t = 540)]
    height: u32,

    /// TTF/OTF font for participant names. Without it, text is skipped.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write every Nth frame; the final frame is always written.
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Override the style named in the config.
    #[arg(long)]
    style: Option<String>,

    /// Override the layout seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Styles => {
            for style in raffle_anim::supported_styles() {
                println!("{style}");
            }
            Ok(())
        }
        Command::Validate(args) => cmd_validate(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<AnimationEngineConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let cfg = AnimationEngineConfig::from_json_reader(BufReader::new(f))
        .with_context(|| format!("parse config '{}'", path.display()))?;
    Ok(cfg)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.in_path)?;
    raffle_anim::validate_config(&cfg)?;
    println!(
        "ok: style={} participants={} frames={}",
        cfg.style,
        cfg.participants.len(),
        cfg.playback.total_frames()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = read_config(&args.in_path)?;
    if let Some(style) = args.style {
        cfg.style = style;
    }
    if let Some(seed) = args.seed {
        cfg.playback.style_options.seed = Some(seed);
    }
    if cfg.playback.style_options.asset_root.is_none() {
        let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
        cfg.playback.style_options.asset_root = Some(root.to_path_buf());
    }

    let mut canvas = CpuCanvas::new(args.width, args.height);
    if let Some(font) = &args.font {
        let bytes =
            std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
        canvas = canvas.with_font(bytes);
    }

    let clock = ManualClock::new();
    let queue = FrameQueue::new();
    let factory = EngineFactory::new(Arc::new(clock.clone()), Arc::new(ImageCache::new()));
    let mut engine = factory.create_engine_for(&cfg, Box::new(queue.clone()))?;

    let completed = Rc::new(Cell::new(false));
    let done = Rc::clone(&completed);
    engine.set_callbacks(EngineCallbacks::new().on_complete(move || done.set(true)));
    engine.initialize(&mut canvas, &cfg)?;
    engine.start()?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let every = args.every.max(1);
    let total = cfg.playback.total_frames();
    let mut written = 0u64;
    let mut write_err: Option<anyhow::Error> = None;
    let report = run_to_completion(
        engine.as_mut(),
        &clock,
        &queue,
        cfg.playback.frame_interval_ms(),
        total.saturating_mul(2).max(16),
        |e| {
            let frame = e.state().current_frame;
            let last = e.progress() >= 1.0;
            if write_err.is_some() || !(frame % every == 0 || last) {
                return;
            }
            let Some(snapshot) = e.frame_snapshot() else {
                return;
            };
            let path = args.out_dir.join(format!("frame_{frame:05}.png"));
            match write_png(&path, snapshot) {
                Ok(()) => written += 1,
                Err(err) => write_err = Some(err),
            }
        },
    );
    if let Some(err) = write_err {
        return Err(err);
    }
    if let Some(err) = engine.last_error() {
        anyhow::bail!("playback failed: {err}");
    }

    let winner = engine
        .revealed_winner()
        .map(|p| p.display_name.clone())
        .unwrap_or_default();
    let metrics = serde_json::to_string_pretty(engine.performance_metrics())
        .context("serialize performance metrics")?;
    eprintln!(
        "{} frames played ({} written to {}), completed={}, revealed={winner}",
        report.frames,
        written,
        args.out_dir.display(),
        completed.get()
    );
    println!("{metrics}");
    Ok(())
}

fn write_png(path: &Path, mut frame: FrameRGBA) -> anyhow::Result<()> {
    if frame.premultiplied {
        unpremultiply_in_place(&mut frame.data);
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
