//! Phasing trace - watch voices drift apart and realign, without audio.
//!
//! Steps an ensemble through time with a manual clock and prints one row per
//! step: each column is a voice, drawn darker the brighter its ring.
//!
//!   - 60, 90 and 120 BPM share a 30 BPM pulse, so every voice lands on the
//!     same beat every 2 seconds
//!
//! Run with: cargo run --example phasing_trace

use polymetro::{sound::SilentEngine, timing::ManualClock, Ensemble, EnsembleConfig};

/// Intensity ramp, dimmest first
const SHADES: &[u8] = b" .:-=+*#%@";

/// Time between printed rows
const STEP_MS: f64 = 50.0;

fn shade(alpha: f64) -> char {
    let last = SHADES.len() - 1;
    SHADES[(alpha * last as f64).round() as usize] as char
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let clock = ManualClock::new(0.0);
    let mut ensemble = Ensemble::with_clock(SilentEngine, clock.clone());
    ensemble.configure_with(EnsembleConfig::new(3, 60.0, 30.0).start_offset_ms(0.0))?;

    let realign = ensemble.realignment_ms();
    match realign {
        Some(ms) => println!("voices realign every {:.0} ms", ms),
        None => println!("voices never realign exactly"),
    }
    for voice in ensemble.voice_configs() {
        println!(
            "  voice {}: {:>5.1} BPM  {:>7.2} ms/beat  {}",
            voice.index, voice.tempo_bpm, voice.beat_period_ms, voice.tone.name
        );
    }
    println!();

    ensemble.start()?;
    let mut last_beats: Option<Vec<i64>> = None;

    for _ in 0..=(4_000.0 / STEP_MS) as usize {
        let Some(frame) = ensemble.on_tick()? else {
            break;
        };

        let beats: Vec<i64> = ensemble
            .voice_configs()
            .iter()
            .map(|voice| voice.beat_at(frame.elapsed_ms))
            .collect();
        // Every voice started a new beat within this step
        let aligned = match &last_beats {
            Some(last) => last.iter().zip(&beats).all(|(a, b)| a != b),
            None => true,
        };

        let row: String = frame.rings.iter().map(|ring| shade(ring.alpha)).collect();
        println!(
            "{:>7.0} ms |{}|{}",
            frame.elapsed_ms,
            row,
            if aligned { "  <- all on the beat" } else { "" }
        );

        last_beats = Some(beats);
        clock.advance(STEP_MS);
    }

    ensemble.stop()?;
    Ok(())
}
