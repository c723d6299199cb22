mod app;
mod clock;
mod headless;
mod input_map;

use anyhow::{Context, Result};
use app::{ViewerApp, ViewerOptions};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(
    name = "airdrag-viewer",
    about = "Render an airfoil and print per-frame fragment force and torque sums"
)]
struct Cli {
    /// Airfoil identifier (NACA 4-digit designation)
    #[arg(default_value = airdrag_assets::DEFAULT_VARIANT)]
    airfoil: String,

    /// Directory holding `<airfoil>.obj` meshes
    #[arg(long, default_value = "resources")]
    resources: PathBuf,

    /// Generate the NACA section instead of loading a mesh file
    #[arg(long)]
    procedural: bool,

    /// Initial window width
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Exit after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Accumulate on the CPU without a window; runs one frame unless
    /// `--max-frames` says otherwise
    #[arg(long)]
    headless: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("airdrag-viewer starting");

    let mesh = if cli.procedural {
        airdrag_assets::procedural_variant(&cli.airfoil)
    } else {
        airdrag_assets::load_variant(&cli.resources, &cli.airfoil)
    }
    .with_context(|| format!("failed to load airfoil {}", cli.airfoil))?;

    if cli.headless {
        let workers = std::thread::available_parallelism().map_or(4, |n| n.get());
        return headless::drive(&mesh, cli.max_frames.unwrap_or(1), workers, app::emit);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(
        mesh,
        ViewerOptions {
            width: cli.width,
            height: cli.height,
            max_frames: cli.max_frames,
        },
    );
    event_loop.run_app(&mut app)?;

    app.into_result()
}
