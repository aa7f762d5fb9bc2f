use clap::{Parser, Subcommand};
use glam::Vec2;
use ringlife_common::{AutomatonConfig, FieldSize};
use ringlife_gpu::{GpuContext, WgpuEngine};
use ringlife_kernel::{Automaton, ConvolutionKernel, RecordingEngine, paint_region};
use ringlife_tools::{AutomatonSummary, FrameTimer, KernelSummary, TraceSummary};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ringlife-cli", about = "CLI tool for the ringlife automaton")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration summary
    Info,
    /// Print the default configuration as YAML
    Config,
    /// Show the convolution kernel
    Kernel,
    /// Compute the tile-aligned paint region for a cursor position
    Region {
        x: f32,
        y: f32,
        /// Brush radius in cells (defaults to the configured brush)
        #[arg(short, long)]
        radius: Option<f32>,
    },
    /// Run ticks on the recording engine and print every dispatch
    Trace {
        /// Number of ticks to run
        #[arg(short, long, default_value = "2")]
        ticks: u64,
        /// Paint at this field position on every tick
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        paint: Option<Vec<f32>>,
    },
    /// Run ticks on a headless GPU and report timing
    Run {
        /// Number of ticks to run
        #[arg(short, long, default_value = "100")]
        ticks: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => AutomatonConfig::load(path)?,
        None => AutomatonConfig::default(),
    };
    tracing::debug!(config = ?cli.config, field = %config.field, "configuration ready");

    match cli.command {
        Commands::Info => {
            println!("ringlife-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "field: {} ({} tiles, dispatch {})",
                config.field,
                config.field.tiles_x() * config.field.tiles_y(),
                config.field.full_dispatch()
            );
            let kernel = ConvolutionKernel::ring(config.kernel.width, config.kernel.height);
            println!("{}", KernelSummary::of(&kernel));
            println!(
                "brush: radius={} fill={}",
                config.brush.radius, config.brush.fill
            );
            println!("seed: {}", config.seed);
        }
        Commands::Config => {
            print!("{}", AutomatonConfig::default().to_yaml()?);
        }
        Commands::Kernel => {
            let kernel = ConvolutionKernel::ring(config.kernel.width, config.kernel.height);
            print!("{}", KernelSummary::ascii_map(&kernel));
            println!("{}", KernelSummary::of(&kernel));
        }
        Commands::Region { x, y, radius } => {
            let radius = radius.unwrap_or(config.brush.radius);
            region(config.field, Vec2::new(x, y), radius, config.brush.fill);
        }
        Commands::Trace { ticks, paint } => {
            let paint_at = paint.map(|p| Vec2::new(p[0], p[1]));
            trace(&config, ticks, paint_at)?;
        }
        Commands::Run { ticks } => run(&config, ticks)?,
    }

    Ok(())
}

fn region(size: FieldSize, center: Vec2, radius: f32, fill: f32) {
    match paint_region(size, center, radius, fill) {
        Some(region) => {
            let (min, max) = region.cell_bounds();
            println!(
                "tiles x={}..={} y={}..={}",
                region.min_tile_x, region.max_tile_x, region.min_tile_y, region.max_tile_y
            );
            println!("cells ({}, {})..({}, {})", min.x, min.y, max.x, max.y);
            println!("dispatch {}", region.dispatch());
            println!(
                "cursor=({}, {}) rad_sqr={} offset={}",
                region.params.cursor_x,
                region.params.cursor_y,
                region.params.cursor_rad_sqr,
                region.offset()
            );
        }
        None => println!("no paint dispatch"),
    }
}

fn trace(config: &AutomatonConfig, ticks: u64, paint_at: Option<Vec2>) -> anyhow::Result<()> {
    let engine = RecordingEngine::new();
    let log = engine.log();
    let mut automaton = Automaton::new(engine, config)?;
    for _ in 0..ticks {
        automaton.tick(paint_at);
    }
    println!("{}", AutomatonSummary::of(&automaton));
    drop(automaton);

    let events = log.events();
    for (i, event) in events.iter().enumerate() {
        println!("{i:4}  {event}");
    }
    println!("{}", TraceSummary::of(&events));
    Ok(())
}

fn run(config: &AutomatonConfig, ticks: u64) -> anyhow::Result<()> {
    let ctx = Arc::new(GpuContext::headless()?);
    println!("adapter: {} ({:?})", ctx.info.name, ctx.info.backend);

    let mut automaton = Automaton::new(WgpuEngine::new(ctx.clone()), config)?;
    ctx.wait_idle();

    let mut timer = FrameTimer::new(ticks.clamp(1, 1024) as usize);
    let started = Instant::now();
    for _ in 0..ticks {
        let frame = Instant::now();
        automaton.tick(None);
        ctx.wait_idle();
        timer.record(frame.elapsed());
    }
    let total = started.elapsed();

    let cells = automaton.engine().read_grid(automaton.current_grid())?;
    let mean = cells.iter().sum::<f32>() / cells.len().max(1) as f32;

    println!("{}", AutomatonSummary::of(&automaton));
    println!(
        "{ticks} ticks in {:.2?}: avg={:.2?} min={:.2?} max={:.2?} ({:.1} ticks/s)",
        total,
        timer.average(),
        timer.min(),
        timer.max(),
        timer.fps()
    );
    println!("mean cell value: {mean:.4}");
    Ok(())
}
