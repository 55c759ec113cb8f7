//! polymetro - a phase-synchronized polyrhythmic metronome.
//!
//! N voices tick at N tempos. Each is drawn as a ring that flashes on its
//! beat and fades out, and every voice reads its phase from the same epoch,
//! so the rings drift in and out of alignment exactly as the audio does.
//!
//! # Example
//!
//! ```
//! use polymetro::{sound::SilentEngine, timing::ManualClock, Ensemble};
//!
//! let clock = ManualClock::new(0.0);
//! let mut ensemble = Ensemble::with_clock(SilentEngine, clock.clone());
//! ensemble.configure(3, 60.0, 60.0).unwrap();
//! ensemble.start().unwrap();
//!
//! let first = ensemble.on_tick().unwrap().unwrap();
//! assert!(first.rings.iter().all(|ring| ring.alpha == 1.0));
//! ```

pub mod color;
pub mod ensemble; // Voices, lifecycle and per-frame evaluation
pub mod render;
pub mod sound; // Sound engine boundary and the click engine
pub mod timing;
pub mod tones;

pub use ensemble::{
    ConfigError, Ensemble, EnsembleConfig, EnsembleError, EnsembleState, Frame, LifecycleError,
    RingInstruction, ToneOverflow, Voice, VoiceConfig,
};

/// Largest block the audio callback renders in one go.
pub const MAX_BLOCK_SIZE: usize = 2048;
