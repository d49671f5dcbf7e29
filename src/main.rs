use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use retro_camcorder::{
    assets::{AssetProvider, DirectoryAssetProvider},
    config::Config,
    grade::FilmSimulation,
    pipeline::FramePipeline,
    video::{ImageSequenceSink, ImageSequenceSource},
};

#[derive(Parser)]
#[command(
    name = "retro-camcorder",
    version,
    about = "Give clean digital footage an analog camcorder and film look",
    long_about = "Retro-Camcorder grades every frame of an image sequence with a film simulation, optionally adds chromatic aberration, jitter and light leaks, and burns in a glowing camcorder date stamp."
)]
struct Cli {
    /// Directory of input frames (PNG or JPEG, processed in file name order)
    #[arg(short, long, required_unless_present = "list_profiles")]
    input: Option<PathBuf>,

    /// Directory the processed frames are written to
    #[arg(short, long, required_unless_present = "list_profiles")]
    output: Option<PathBuf>,

    /// Film simulation to apply (see --list-profiles)
    #[arg(short, long)]
    profile: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text shown top-right in the timestamp (empty to hide)
    #[arg(short, long)]
    message: Option<String>,

    /// Date text shown bottom-left, e.g. "07-04-'98"
    #[arg(short, long)]
    date: Option<String>,

    /// Enable chromatic aberration
    #[arg(long)]
    aberration: bool,

    /// Enable frame jitter
    #[arg(long)]
    jitter: bool,

    /// Enable light leaks from this directory
    #[arg(long, value_name = "DIR")]
    leaks: Option<PathBuf>,

    /// Random seed for grain, jitter and leak selection
    #[arg(long)]
    seed: Option<u64>,

    /// Number of processing threads
    #[arg(short, long)]
    threads: Option<usize>,

    /// Stop after this many frames (preview)
    #[arg(long)]
    max_frames: Option<u64>,

    /// Print the built-in film simulations and exit
    #[arg(long)]
    list_profiles: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.list_profiles {
        for simulation in FilmSimulation::ALL {
            println!("{:<22} {}", simulation.name(), simulation.description());
        }
        return Ok(());
    }

    let (Some(input), Some(output)) = (cli.input.clone(), cli.output.clone()) else {
        bail!("--input and --output are required");
    };

    info!("Starting Retro-Camcorder v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", input);
    info!("Output: {:?}", output);

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path).map_err(|e| anyhow::anyhow!(e.user_message()))?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    apply_overrides(&mut config, &cli);

    let mut source = ImageSequenceSource::open(&input).with_context(|| format!("Cannot read frames from {:?}", input))?;
    match source.probe_dimensions()? {
        Some((width, height)) => {
            config.video.width = width;
            config.video.height = height;
        }
        None => warn!("No frames found in {:?}", input),
    }

    let provider = config
        .light_leaks
        .directory
        .clone()
        .filter(|_| config.light_leaks.enabled)
        .map(DirectoryAssetProvider::new);

    // Every configuration and asset error surfaces here, before any frame is read
    let pipeline = FramePipeline::from_config(&config, provider.as_ref().map(|p| p as &dyn AssetProvider))
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let mut sink = ImageSequenceSink::create(&output)?;
    let stats = pipeline.run_parallel(&mut source, &mut sink)?;

    info!(
        "Done! {} frames written to {:?} ({:.1} fps, seed {})",
        stats.frames,
        output,
        stats.fps(),
        pipeline.seed()
    );
    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(profile) = &cli.profile {
        config.grade.profile = profile.clone();
    }
    if let Some(message) = &cli.message {
        config.timestamp.message = message.clone();
    }
    if let Some(date) = &cli.date {
        config.timestamp.date = Some(date.clone());
    }
    if cli.aberration {
        config.aberration.enabled = true;
    }
    if cli.jitter {
        config.jitter.enabled = true;
    }
    if let Some(leaks) = &cli.leaks {
        config.light_leaks.enabled = true;
        config.light_leaks.directory = Some(leaks.clone());
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(threads) = cli.threads {
        config.video.processing_threads = threads;
    }
    if cli.max_frames.is_some() {
        config.video.max_frames = cli.max_frames;
    }
}
