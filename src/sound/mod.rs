// Purpose: the boundary to whatever actually makes sound
// The ensemble only ever talks to these traits; `click` is one implementation.

pub mod click;

use rtrb::{Consumer, Producer};

use crate::tones::Tone;

pub use click::{ClickBank, ClickEngine, ClickHandle};

/// Capacity of a tone-on queue.
pub const TONE_ON_QUEUE_SIZE: usize = 64;

/// A handle produced a tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneOn {
    /// Beats sounded by the handle since its last `play`, counting this one.
    pub beat: u64,
}

pub type ToneOnSender = Producer<ToneOn>;
pub type ToneOnReceiver = Consumer<ToneOn>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundError {
    /// The engine could not hand out another handle.
    Unavailable(String),
    /// Anything the backend reports.
    Backend(String),
}

impl std::fmt::Display for SoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoundError::Unavailable(reason) => write!(f, "sound engine unavailable: {}", reason),
            SoundError::Backend(reason) => write!(f, "sound engine failure: {}", reason),
        }
    }
}

impl std::error::Error for SoundError {}

/// One voice's connection to a sound engine.
///
/// Dropping the handle releases it.
pub trait SoundHandle: Send {
    /// Start sounding `tone` continuously at `tempo_bpm`.
    ///
    /// Calling this again without [`silence`](Self::silence) triggers a
    /// second, overlapping start.
    fn play(&mut self, tempo_bpm: f64, tone: &Tone) -> Result<(), SoundError>;

    /// Stop sounding. Safe to call on a silent handle.
    fn silence(&mut self) -> Result<(), SoundError>;

    /// Route this handle's tone-on events into `tx`.
    ///
    /// Events that do not fit, or that arrive after the receiving side has
    /// gone away, are dropped.
    fn subscribe_tone_on(&mut self, tx: ToneOnSender);
}

/// Allow boxed handles to be used as handles (for dynamic dispatch)
impl SoundHandle for Box<dyn SoundHandle> {
    fn play(&mut self, tempo_bpm: f64, tone: &Tone) -> Result<(), SoundError> {
        (**self).play(tempo_bpm, tone)
    }

    fn silence(&mut self) -> Result<(), SoundError> {
        (**self).silence()
    }

    fn subscribe_tone_on(&mut self, tx: ToneOnSender) {
        (**self).subscribe_tone_on(tx)
    }
}

/// Factory for sound handles, one per voice.
pub trait SoundEngine {
    type Handle: SoundHandle;

    fn create_handle(&mut self) -> Result<Self::Handle, SoundError>;
}

/// An engine that never makes a sound. Used when no output device is
/// wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentEngine;

#[derive(Debug, Default)]
pub struct SilentHandle {
    playing: bool,
}

impl SilentHandle {
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl SoundHandle for SilentHandle {
    fn play(&mut self, _tempo_bpm: f64, _tone: &Tone) -> Result<(), SoundError> {
        self.playing = true;
        Ok(())
    }

    fn silence(&mut self) -> Result<(), SoundError> {
        self.playing = false;
        Ok(())
    }

    fn subscribe_tone_on(&mut self, _tx: ToneOnSender) {}
}

impl SoundEngine for SilentEngine {
    type Handle = SilentHandle;

    fn create_handle(&mut self) -> Result<Self::Handle, SoundError> {
        Ok(SilentHandle::default())
    }
}
