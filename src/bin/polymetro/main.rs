//! polymetro - terminal polyrhythmic metronome
//!
//! Run with: cargo run -- --voices 12 --tempo-min 40 --tempo-step 1

mod app;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use env_logger::{Env, Target};

use app::Polymetro;
use polymetro::{
    ensemble::{DEFAULT_FADE_WINDOW_MS, DEFAULT_RING_SPACING, DEFAULT_STAGE_SIZE},
    timing::DEFAULT_START_OFFSET_MS,
    EnsembleConfig, ToneOverflow,
};

/// Concentric rings pulsing at slowly diverging tempos.
#[derive(Parser, Debug)]
#[command(name = "polymetro")]
#[command(about = "Phase-synchronized polyrhythmic metronome")]
struct Args {
    /// Number of voices (one ring and one tone each)
    #[arg(short, long, default_value_t = 12)]
    voices: usize,

    /// Tempo of the outermost voice, in BPM
    #[arg(long, default_value_t = 40.0)]
    tempo_min: f64,

    /// Tempo added per voice, in BPM
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    tempo_step: f64,

    /// How long a ring takes to fade after its beat, in ms
    #[arg(long, default_value_t = DEFAULT_FADE_WINDOW_MS)]
    fade_window_ms: f64,

    /// Visual offset applied when the run's clock starts, in ms
    #[arg(long, default_value_t = DEFAULT_START_OFFSET_MS, allow_hyphen_values = true)]
    start_offset_ms: f64,

    /// Distance between neighbouring rings
    #[arg(long, default_value_t = DEFAULT_RING_SPACING)]
    ring_spacing: f64,

    /// Width and height of the square stage the rings are laid out on
    #[arg(long, default_value_t = DEFAULT_STAGE_SIZE)]
    stage_size: f64,

    /// Reuse tones from the bottom of the table past 28 voices
    #[arg(long)]
    wrap_tones: bool,

    /// Run without opening an audio device
    #[arg(short, long)]
    mute: bool,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let tone_overflow = if args.wrap_tones {
        ToneOverflow::Wrap
    } else {
        ToneOverflow::Reject
    };

    let config = EnsembleConfig::new(args.voices, args.tempo_min, args.tempo_step)
        .fade_window_ms(args.fade_window_ms)
        .start_offset_ms(args.start_offset_ms)
        .ring_spacing(args.ring_spacing)
        .stage_size(args.stage_size)
        .tone_overflow(tone_overflow);

    Polymetro::new(config).mute(args.mute).run()
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("polymetro=debug"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .wrap_err("failed to install logger")?;

    log::info!("logging to {}", path.display());
    Ok(())
}
