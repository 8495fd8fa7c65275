use std::{path::PathBuf, process::ExitCode};

use beatmap_player_core::{
    session, Environment, FilterCriteria, HeadlessPlatform, HeadlessSimulation, JsonCatalog,
    LaunchOptions, RunSummary, ScriptedPress, SettingsFile, VideoMode,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(summary) => {
            tracing::info!(
                record = %summary.record,
                frames = summary.frames,
                cursors = summary.cursor_divides,
                "playback finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) if err.is_user_guidance() => {
            tracing::info!("{err}, closing...");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> beatmap_player_core::Result<RunSummary> {
    let script = match cli.script.as_deref() {
        Some(script) => ScriptedPress::parse_list(script)?,
        None => Vec::new(),
    };
    let options = cli.launch_options();
    let settings_version = options.settings_version;
    let monitor = cli.monitor;
    let frames = cli.frames;
    let catalog = cli.catalog;
    let settings_dir = cli.settings_dir;

    tracing::info!(criteria = %options.criteria, mover = %options.mover, "starting playback");

    session::launch(options, move || {
        let mut platform = HeadlessPlatform::new(monitor).with_script(script);
        if frames > 0 {
            platform = platform.with_frame_limit(frames);
        }
        Ok(Environment {
            platform,
            catalog: JsonCatalog::open(catalog),
            settings: SettingsFile::new(settings_dir, settings_version),
            simulation: HeadlessSimulation::new(),
        })
    })
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .try_init();
}

fn parse_monitor(value: &str) -> Result<VideoMode, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width `{width}`"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height `{height}`"))?;
    Ok(VideoMode { width, height })
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Beatmap playback client", long_about = None)]
struct Cli {
    /// Artist to match exactly; empty matches any.
    #[arg(long, default_value = "")]
    artist: String,
    /// Title to match exactly; empty matches any.
    #[arg(long, default_value = "Sidetracked Day")]
    title: String,
    /// Difficulty name to match exactly; empty matches any.
    #[arg(long, default_value = "THREE DIMENSIONS")]
    difficulty: String,
    /// Beatmap creator to match exactly; empty matches any.
    #[arg(long, default_value = "")]
    creator: String,
    /// Settings schema version; 0 re-detects the display.
    #[arg(long, default_value_t = 0)]
    settings: u32,
    /// Number of cursors.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    cursors: i64,
    /// Number of cursors sharing one tag.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    tag: i64,
    /// Playback speed multiplier.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
    /// Playback pitch multiplier.
    #[arg(long, default_value_t = 1.0)]
    pitch: f64,
    /// Cursor movement algorithm.
    #[arg(long, default_value = "linear")]
    mover: String,
    /// Verbose logging and debug overlays.
    #[arg(long)]
    debug: bool,
    /// Show the frame rate.
    #[arg(long)]
    fps: bool,
    /// Catalog file.
    #[arg(long, default_value = "catalog.json")]
    catalog: PathBuf,
    /// Directory holding `settings.json`.
    #[arg(long, default_value = ".")]
    settings_dir: PathBuf,
    /// Close after this many frames (0 runs until Escape).
    #[arg(long, default_value_t = 0)]
    frames: u64,
    /// Primary monitor mode reported by the headless backend.
    #[arg(long, default_value = "1920x1080", value_parser = parse_monitor)]
    monitor: VideoMode,
    /// Scripted key presses, e.g. `30:equal,60:f2,90:escape:1`.
    #[arg(long)]
    script: Option<String>,
}

impl Cli {
    fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            criteria: FilterCriteria {
                artist: self.artist.clone(),
                title: self.title.clone(),
                creator: self.creator.clone(),
                difficulty: self.difficulty.clone(),
            },
            settings_version: self.settings,
            cursors: self.cursors,
            tag: self.tag,
            speed: self.speed,
            pitch: self.pitch,
            mover: self.mover.clone(),
            debug: self.debug,
            fps: self.fps,
        }
    }
}
