// Purpose: voices, their shared clock, and the per-frame evaluation
// This layer decides what every ring looks like at a given instant.

pub mod config;
pub mod error;
pub mod frame;
pub mod lifecycle;
pub mod voice;

pub use config::{
    EnsembleConfig, ToneOverflow, DEFAULT_FADE_WINDOW_MS, DEFAULT_RING_SPACING,
    DEFAULT_STAGE_SIZE, DEFAULT_STROKE_WIDTH, MAX_VOICE_COUNT, STAGE_MARGIN,
};
pub use error::{ConfigError, EnsembleError, LifecycleError};
pub use frame::{Frame, RingInstruction};
pub use lifecycle::{Ensemble, EnsembleState};
pub use voice::{Voice, VoiceConfig};
