use crate::color::Rgb;
use crate::sound::{SoundError, SoundHandle, ToneOnSender};
use crate::tones::Tone;

/*
Beat Envelope
=============

Each voice turns the shared elapsed time into a brightness with one formula:

    frame     = elapsed mod beat_period        (time since the last beat)
    intensity = 1 - frame / fade_window

    Intensity
     1.0 |\          |\          |\
         | \         | \         | \
         |  \        |  \        |  \
     0.0 +---\-------+---\-------+---\----- Time
         beat        beat        beat
         <--> fade_window
         <----------> beat_period

A sawtooth: exactly 1.0 on every beat, falling linearly to 0.0 over the fade
window, then held at 0.0 until the next beat. Nothing is stored between
frames, so a voice's phase is always exact for any elapsed time and two voices
read against the same elapsed time can never drift apart.

The raw line keeps falling below zero once `frame > fade_window`; the
clamped value is what gets drawn. `envelope_at` exposes the raw line.

The remainder is Euclidean, so a negative elapsed time (positive start
offsets) still lands inside [0, beat_period).
*/

/// Static parameters of one voice.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// 0-based position. Voice 0 is the reference voice.
    pub index: usize,
    pub tone: Tone,
    pub tempo_bpm: f64,
    /// `60000 / tempo_bpm`.
    pub beat_period_ms: f64,
    pub color: Rgb,
    /// Distance inward from the outermost ring.
    pub ring_offset: f64,
    pub ring_radius: f64,
    pub fade_window_ms: f64,
}

impl VoiceConfig {
    /// Milliseconds since this voice's most recent beat.
    pub fn frame_ms(&self, elapsed_ms: f64) -> f64 {
        elapsed_ms.rem_euclid(self.beat_period_ms)
    }

    /// Unclamped beat envelope; negative once the fade window has passed.
    pub fn envelope_at(&self, elapsed_ms: f64) -> f64 {
        1.0 - self.frame_ms(elapsed_ms) / self.fade_window_ms
    }

    /// Beat envelope clamped to `[0, 1]`.
    pub fn intensity_at(&self, elapsed_ms: f64) -> f64 {
        self.envelope_at(elapsed_ms).clamp(0.0, 1.0)
    }

    /// Position within the current beat, in `[0, 1)`.
    pub fn phase_at(&self, elapsed_ms: f64) -> f64 {
        self.frame_ms(elapsed_ms) / self.beat_period_ms
    }

    /// Whole beats elapsed; beat 0 starts at elapsed = 0.
    pub fn beat_at(&self, elapsed_ms: f64) -> i64 {
        (elapsed_ms / self.beat_period_ms).floor() as i64
    }
}

/// One running voice: its parameters plus its connection to the sound
/// engine.
pub struct Voice<H: SoundHandle> {
    config: VoiceConfig,
    running: bool,
    handle: H,
}

impl<H: SoundHandle> Voice<H> {
    pub fn new(config: VoiceConfig, handle: H) -> Self {
        Self {
            config,
            running: false,
            handle,
        }
    }

    /// Begin continuous tone emission.
    ///
    /// Not idempotent: a second call without `stop` starts the sound engine
    /// again on top of the first.
    pub fn start(&mut self) -> Result<(), SoundError> {
        self.handle.play(self.config.tempo_bpm, &self.config.tone)?;
        self.running = true;
        Ok(())
    }

    /// Silence the voice. Safe to call at any time.
    pub fn stop(&mut self) -> Result<(), SoundError> {
        self.running = false;
        self.handle.silence()
    }

    /// Forward this voice's tone-on events into `tx`.
    pub fn subscribe_tone_on(&mut self, tx: ToneOnSender) {
        self.handle.subscribe_tone_on(tx);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    pub fn index(&self) -> usize {
        self.config.index
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn intensity_at(&self, elapsed_ms: f64) -> f64 {
        self.config.intensity_at(elapsed_ms)
    }

    pub fn envelope_at(&self, elapsed_ms: f64) -> f64 {
        self.config.envelope_at(elapsed_ms)
    }

    pub fn phase_at(&self, elapsed_ms: f64) -> f64 {
        self.config.phase_at(elapsed_ms)
    }

    pub fn beat_at(&self, elapsed_ms: f64) -> i64 {
        self.config.beat_at(elapsed_ms)
    }
}
