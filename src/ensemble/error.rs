use crate::render::RenderError;
use crate::sound::SoundError;

/// Rejected configuration. Only ever raised by `configure`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Voice count is zero.
    NoVoices,
    /// More voices than one ensemble runs.
    TooManyVoices { requested: usize, maximum: usize },
    /// More voices than the tone table holds, with overflow rejected.
    ToneTableOverflow { requested: usize, available: usize },
    /// A voice would tick at a zero, negative or non-finite tempo.
    InvalidTempo { index: usize, bpm: f64 },
    /// Tempo step is not a finite number.
    InvalidTempoStep(f64),
    /// Fade window is zero, negative or non-finite.
    InvalidFadeWindow(f64),
    /// Start offset is not a finite number.
    InvalidStartOffset(f64),
    /// Ring spacing is zero, negative or non-finite.
    InvalidRingSpacing(f64),
    /// Stroke width is zero, negative or non-finite.
    InvalidStrokeWidth(f64),
    /// Stage leaves no room for the outermost ring.
    StageTooSmall { stage_size: f64, minimum: f64 },
    /// The innermost ring would have no positive radius.
    RingsExceedStage { voice_count: usize, max_radius: f64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoVoices => write!(f, "voice count must be at least 1"),
            ConfigError::TooManyVoices { requested, maximum } => {
                write!(f, "{} voices requested, at most {} supported", requested, maximum)
            }
            ConfigError::ToneTableOverflow {
                requested,
                available,
            } => write!(
                f,
                "{} voices requested but the tone table holds {} (enable tone wrapping to reuse tones)",
                requested, available
            ),
            ConfigError::InvalidTempo { index, bpm } => {
                write!(f, "voice {} has invalid tempo {} BPM (must be positive)", index, bpm)
            }
            ConfigError::InvalidTempoStep(step) => write!(f, "tempo step {} is not finite", step),
            ConfigError::InvalidFadeWindow(ms) => {
                write!(f, "fade window {} ms must be positive", ms)
            }
            ConfigError::InvalidStartOffset(ms) => {
                write!(f, "start offset {} ms is not finite", ms)
            }
            ConfigError::InvalidRingSpacing(spacing) => {
                write!(f, "ring spacing {} must be positive", spacing)
            }
            ConfigError::InvalidStrokeWidth(width) => {
                write!(f, "stroke width {} must be positive", width)
            }
            ConfigError::StageTooSmall {
                stage_size,
                minimum,
            } => write!(f, "stage size {} must exceed {}", stage_size, minimum),
            ConfigError::RingsExceedStage {
                voice_count,
                max_radius,
            } => write!(
                f,
                "{} rings do not fit inside radius {} (reduce voices or ring spacing, or enlarge the stage)",
                voice_count, max_radius
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// An operation called in the wrong lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start` while already running.
    AlreadyRunning,
    /// Operation needs a configured ensemble.
    NotConfigured,
    /// `configure` while running.
    ReconfigureWhileRunning,
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleError::AlreadyRunning => write!(f, "ensemble is already running"),
            LifecycleError::NotConfigured => write!(f, "ensemble has not been configured"),
            LifecycleError::ReconfigureWhileRunning => {
                write!(f, "ensemble cannot be reconfigured while running")
            }
        }
    }
}

impl std::error::Error for LifecycleError {}

#[derive(Debug, Clone, PartialEq)]
pub enum EnsembleError {
    Config(ConfigError),
    Lifecycle(LifecycleError),
    Sound(SoundError),
    Render(RenderError),
}

impl std::fmt::Display for EnsembleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnsembleError::Config(err) => write!(f, "invalid configuration: {}", err),
            EnsembleError::Lifecycle(err) => write!(f, "lifecycle violation: {}", err),
            EnsembleError::Sound(err) => write!(f, "{}", err),
            EnsembleError::Render(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EnsembleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnsembleError::Config(err) => Some(err),
            EnsembleError::Lifecycle(err) => Some(err),
            EnsembleError::Sound(err) => Some(err),
            EnsembleError::Render(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EnsembleError {
    fn from(err: ConfigError) -> Self {
        EnsembleError::Config(err)
    }
}

impl From<LifecycleError> for EnsembleError {
    fn from(err: LifecycleError) -> Self {
        EnsembleError::Lifecycle(err)
    }
}

impl From<SoundError> for EnsembleError {
    fn from(err: SoundError) -> Self {
        EnsembleError::Sound(err)
    }
}

impl From<RenderError> for EnsembleError {
    fn from(err: RenderError) -> Self {
        EnsembleError::Render(err)
    }
}
