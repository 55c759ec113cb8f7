#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::voice::VoiceConfig;
use crate::color::Rgb;
use crate::timing::DEFAULT_START_OFFSET_MS;
use crate::tones::{self, TONE_COUNT};

/// Default length of a ring's fade after each beat, in milliseconds.
pub const DEFAULT_FADE_WINDOW_MS: f64 = 500.0;
/// Default distance between neighbouring rings.
pub const DEFAULT_RING_SPACING: f64 = 15.0;
/// Default width and height of the square stage.
pub const DEFAULT_STAGE_SIZE: f64 = 400.0;
/// Default ring stroke width.
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;
/// Space left between the outermost ring and the stage edge (both sides).
pub const STAGE_MARGIN: f64 = 20.0;
/// Most voices one ensemble runs, with or without tone wrapping.
pub const MAX_VOICE_COUNT: usize = 256;

/// What to do with voices beyond the end of the tone table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneOverflow {
    /// Refuse to configure more voices than there are tones.
    #[default]
    Reject,
    /// Start again from the lowest tone.
    Wrap,
}

/// Everything that shapes an ensemble, validated as a whole by
/// [`EnsembleConfig::validate`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    pub voice_count: usize,
    /// Tempo of voice 0.
    pub tempo_min_bpm: f64,
    /// Tempo added per voice index. May be zero or negative.
    pub tempo_step_bpm: f64,
    pub fade_window_ms: f64,
    /// Applied once, when a run's epoch is captured.
    pub start_offset_ms: f64,
    pub ring_spacing: f64,
    pub stage_size: f64,
    pub stroke_width: f64,
    pub tone_overflow: ToneOverflow,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            voice_count: 12,
            tempo_min_bpm: 40.0,
            tempo_step_bpm: 1.0,
            fade_window_ms: DEFAULT_FADE_WINDOW_MS,
            start_offset_ms: DEFAULT_START_OFFSET_MS,
            ring_spacing: DEFAULT_RING_SPACING,
            stage_size: DEFAULT_STAGE_SIZE,
            stroke_width: DEFAULT_STROKE_WIDTH,
            tone_overflow: ToneOverflow::Reject,
        }
    }
}

impl EnsembleConfig {
    /// Voices `0..voice_count` at `tempo_min, tempo_min + tempo_step, ...`,
    /// everything else default.
    pub fn new(voice_count: usize, tempo_min_bpm: f64, tempo_step_bpm: f64) -> Self {
        Self {
            voice_count,
            tempo_min_bpm,
            tempo_step_bpm,
            ..Self::default()
        }
    }

    pub fn fade_window_ms(mut self, fade_window_ms: f64) -> Self {
        self.fade_window_ms = fade_window_ms;
        self
    }

    pub fn start_offset_ms(mut self, start_offset_ms: f64) -> Self {
        self.start_offset_ms = start_offset_ms;
        self
    }

    pub fn ring_spacing(mut self, ring_spacing: f64) -> Self {
        self.ring_spacing = ring_spacing;
        self
    }

    pub fn stage_size(mut self, stage_size: f64) -> Self {
        self.stage_size = stage_size;
        self
    }

    pub fn stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn tone_overflow(mut self, tone_overflow: ToneOverflow) -> Self {
        self.tone_overflow = tone_overflow;
        self
    }

    /// Radius of voice 0's ring.
    pub fn max_radius(&self) -> f64 {
        (self.stage_size - STAGE_MARGIN) / 2.0
    }

    /// Tempo of voice `index`.
    pub fn tempo_of(&self, index: usize) -> f64 {
        self.tempo_min_bpm + index as f64 * self.tempo_step_bpm
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voice_count == 0 {
            return Err(ConfigError::NoVoices);
        }
        if self.voice_count > MAX_VOICE_COUNT {
            return Err(ConfigError::TooManyVoices {
                requested: self.voice_count,
                maximum: MAX_VOICE_COUNT,
            });
        }
        if self.voice_count > TONE_COUNT && self.tone_overflow == ToneOverflow::Reject {
            return Err(ConfigError::ToneTableOverflow {
                requested: self.voice_count,
                available: TONE_COUNT,
            });
        }
        if !self.tempo_step_bpm.is_finite() {
            return Err(ConfigError::InvalidTempoStep(self.tempo_step_bpm));
        }
        // Tempo is linear in the index, so checking both ends covers every voice
        for index in [0, self.voice_count - 1] {
            let bpm = self.tempo_of(index);
            if !(bpm.is_finite() && bpm > 0.0) {
                return Err(ConfigError::InvalidTempo { index, bpm });
            }
        }
        if !(self.fade_window_ms.is_finite() && self.fade_window_ms > 0.0) {
            return Err(ConfigError::InvalidFadeWindow(self.fade_window_ms));
        }
        if !self.start_offset_ms.is_finite() {
            return Err(ConfigError::InvalidStartOffset(self.start_offset_ms));
        }
        if !(self.ring_spacing.is_finite() && self.ring_spacing > 0.0) {
            return Err(ConfigError::InvalidRingSpacing(self.ring_spacing));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(ConfigError::InvalidStrokeWidth(self.stroke_width));
        }
        if !(self.stage_size.is_finite() && self.stage_size > STAGE_MARGIN) {
            return Err(ConfigError::StageTooSmall {
                stage_size: self.stage_size,
                minimum: STAGE_MARGIN,
            });
        }
        let innermost = self.max_radius() - (self.voice_count - 1) as f64 * self.ring_spacing;
        if innermost <= 0.0 {
            return Err(ConfigError::RingsExceedStage {
                voice_count: self.voice_count,
                max_radius: self.max_radius(),
            });
        }
        Ok(())
    }

    /// Validate and derive every voice's static parameters, in index order.
    pub fn voice_configs(&self) -> Result<Vec<VoiceConfig>, ConfigError> {
        self.validate()?;

        let max_radius = self.max_radius();
        let voices = (0..self.voice_count)
            .map(|index| -> Result<VoiceConfig, ConfigError> {
                let tone = match self.tone_overflow {
                    ToneOverflow::Reject => *tones::tone(index).ok_or(
                        ConfigError::ToneTableOverflow {
                            requested: self.voice_count,
                            available: TONE_COUNT,
                        },
                    )?,
                    ToneOverflow::Wrap => *tones::tone_wrapping(index),
                };
                let tempo_bpm = self.tempo_of(index);
                let ring_offset = index as f64 * self.ring_spacing;
                Ok(VoiceConfig {
                    index,
                    tone,
                    tempo_bpm,
                    beat_period_ms: 60_000.0 / tempo_bpm,
                    color: Rgb::for_voice(index, self.voice_count),
                    ring_offset,
                    ring_radius: max_radius - ring_offset,
                    fade_window_ms: self.fade_window_ms,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(voices)
    }
}
