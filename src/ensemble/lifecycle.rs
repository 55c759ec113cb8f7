use rtrb::RingBuffer;

use super::config::EnsembleConfig;
use super::error::{EnsembleError, LifecycleError};
use super::frame::{Frame, RingInstruction};
use super::voice::{Voice, VoiceConfig};
use crate::render::{FrameRenderer, Renderer, Stage};
use crate::sound::{SoundEngine, SoundError, SoundHandle, ToneOnReceiver, TONE_ON_QUEUE_SIZE};
use crate::timing::{Clock, MonotonicClock, PhaseClock, DEFAULT_START_OFFSET_MS};

/*
Ensemble Lifecycle
==================

    ┌──────────────┐ configure ┌────────────┐  start  ┌─────────┐
    │ Unconfigured │ ────────→ │ Configured │ ──────→ │ Running │
    └──────────────┘           └────────────┘ ←────── └─────────┘
                                 ↑      │       stop
                                 └──────┘
                                configure

A run is everything between `start` and `stop`: the voices, their sound
handles, the downbeat queue and the epoch. It is built whole on start and
dropped whole on stop, so nothing leaks from one run into the next.

  start    Unconfigured: NotConfigured    Running: AlreadyRunning
  on_tick  Unconfigured: NotConfigured    Configured: no-op (None)
  stop     Unconfigured: NotConfigured    Configured: no-op

The run loop owns the ensemble. "Registering for ticks" is simply being in
the Running state: the loop calls `on_tick` every frame and gets `None` back
whenever there is nothing to draw.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsembleState {
    Unconfigured,
    Configured,
    Running,
}

/// State that exists only while running.
struct Run<H: SoundHandle> {
    voices: Vec<Voice<H>>,
    /// Tone-on events from the reference voice.
    downbeats: ToneOnReceiver,
}

/// A set of voices sharing one clock.
pub struct Ensemble<E: SoundEngine, C: Clock = MonotonicClock> {
    engine: E,
    clock: PhaseClock<C>,
    config: Option<EnsembleConfig>,
    voice_configs: Vec<VoiceConfig>,
    run: Option<Run<E::Handle>>,
}

impl<E: SoundEngine> Ensemble<E> {
    /// Ensemble driven by the wall clock.
    pub fn new(engine: E) -> Self {
        Self::with_clock(engine, MonotonicClock::new())
    }
}

impl<E: SoundEngine, C: Clock> Ensemble<E, C> {
    pub fn with_clock(engine: E, clock: C) -> Self {
        Self {
            engine,
            clock: PhaseClock::new(clock, DEFAULT_START_OFFSET_MS),
            config: None,
            voice_configs: Vec::new(),
            run: None,
        }
    }

    pub fn state(&self) -> EnsembleState {
        match (&self.config, &self.run) {
            (_, Some(_)) => EnsembleState::Running,
            (Some(_), None) => EnsembleState::Configured,
            (None, None) => EnsembleState::Unconfigured,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Configure `voice_count` voices at `tempo_min, tempo_min + tempo_step, ...`.
    ///
    /// Other settings keep their current (or default) values.
    pub fn configure(
        &mut self,
        voice_count: usize,
        tempo_min_bpm: f64,
        tempo_step_bpm: f64,
    ) -> Result<(), EnsembleError> {
        let config = EnsembleConfig {
            voice_count,
            tempo_min_bpm,
            tempo_step_bpm,
            ..self.config.clone().unwrap_or_default()
        };
        self.configure_with(config)
    }

    pub fn configure_with(&mut self, config: EnsembleConfig) -> Result<(), EnsembleError> {
        if self.is_running() {
            return Err(LifecycleError::ReconfigureWhileRunning.into());
        }

        let voice_configs = config.voice_configs()?;
        log::debug!(
            "configured {} voices from {} BPM in steps of {} BPM",
            config.voice_count,
            config.tempo_min_bpm,
            config.tempo_step_bpm
        );

        self.clock.set_offset_ms(config.start_offset_ms);
        self.voice_configs = voice_configs;
        self.config = Some(config);
        Ok(())
    }

    /// Create and start every voice.
    ///
    /// The epoch stays unset until the first tick. If any voice fails to
    /// start, the voices already started are silenced again and the
    /// ensemble stays Configured.
    pub fn start(&mut self) -> Result<(), EnsembleError> {
        match self.state() {
            EnsembleState::Unconfigured => return Err(LifecycleError::NotConfigured.into()),
            EnsembleState::Running => return Err(LifecycleError::AlreadyRunning.into()),
            EnsembleState::Configured => {}
        }

        let (tx, downbeats) = RingBuffer::new(TONE_ON_QUEUE_SIZE);
        let mut tx = Some(tx);
        let mut voices = Vec::with_capacity(self.voice_configs.len());

        for config in &self.voice_configs {
            let started = self.engine.create_handle().and_then(|handle| {
                let mut voice = Voice::new(config.clone(), handle);
                if config.index == 0 {
                    if let Some(tx) = tx.take() {
                        voice.subscribe_tone_on(tx);
                    }
                }
                voice.start()?;
                Ok(voice)
            });

            match started {
                Ok(voice) => voices.push(voice),
                Err(err) => {
                    log::warn!("voice {} failed to start: {}", config.index, err);
                    for voice in voices.iter_mut() {
                        if let Err(silence_err) = voice.stop() {
                            log::warn!("voice {} failed to stop: {}", voice.index(), silence_err);
                        }
                    }
                    return Err(err.into());
                }
            }
        }

        self.clock.reset();
        self.run = Some(Run { voices, downbeats });
        log::debug!("started {} voices", self.voice_configs.len());
        Ok(())
    }

    /// Resolve this frame's draw instructions.
    ///
    /// The first tick of a run captures the epoch. Returns `None` when
    /// configured but not running.
    pub fn on_tick(&mut self) -> Result<Option<Frame>, EnsembleError> {
        let run = match (&self.config, self.run.as_mut()) {
            (None, _) => return Err(LifecycleError::NotConfigured.into()),
            (Some(_), None) => return Ok(None),
            (Some(_), Some(run)) => run,
        };

        let elapsed_ms = self.clock.elapsed_ms();

        let mut downbeat = false;
        while run.downbeats.pop().is_ok() {
            downbeat = true;
        }

        let rings = run
            .voices
            .iter()
            .map(|voice| {
                let config = voice.config();
                RingInstruction {
                    index: config.index,
                    color: config.color,
                    radius: config.ring_radius,
                    alpha: voice.intensity_at(elapsed_ms),
                }
            })
            .collect();

        Ok(Some(Frame {
            elapsed_ms,
            downbeat,
            rings,
        }))
    }

    /// Tick, then paint the frame onto `renderer`.
    ///
    /// Returns the painted frame, or `None` when there was nothing to paint.
    pub fn render_tick<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
    ) -> Result<Option<Frame>, EnsembleError> {
        let frame = match self.on_tick()? {
            Some(frame) => frame,
            None => return Ok(None),
        };
        if let Some(painter) = self.frame_renderer() {
            painter.paint(&frame, renderer)?;
        }
        Ok(Some(frame))
    }

    /// Silence and discard every voice, then forget the epoch.
    ///
    /// Every voice is stopped and dropped even if one of them fails; the
    /// first failure is returned afterwards.
    pub fn stop(&mut self) -> Result<(), EnsembleError> {
        if self.config.is_none() {
            return Err(LifecycleError::NotConfigured.into());
        }
        let Some(mut run) = self.run.take() else {
            return Ok(());
        };

        let mut first_error: Option<SoundError> = None;
        for voice in run.voices.iter_mut() {
            if let Err(err) = voice.stop() {
                log::warn!("voice {} failed to stop: {}", voice.index(), err);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        drop(run);
        self.clock.reset();
        log::debug!("stopped {} voices", self.voice_configs.len());

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub fn config(&self) -> Option<&EnsembleConfig> {
        self.config.as_ref()
    }

    /// Static parameters of every configured voice, in index order.
    pub fn voice_configs(&self) -> &[VoiceConfig] {
        &self.voice_configs
    }

    /// Voices of the current run; empty when not running.
    pub fn voices(&self) -> &[Voice<E::Handle>] {
        self.run.as_ref().map(|r| r.voices.as_slice()).unwrap_or(&[])
    }

    /// Epoch of the current run, once the first tick has captured it.
    pub fn epoch_ms(&self) -> Option<f64> {
        self.clock.epoch_ms()
    }

    pub fn frame_renderer(&self) -> Option<FrameRenderer> {
        self.config
            .as_ref()
            .map(|config| FrameRenderer::new(Stage::from_config(config)))
    }

    /// Interval after which every voice's beat lines up again.
    ///
    /// Only defined when every tempo is a whole number of BPM: beats of all
    /// voices coincide every `60000 / gcd(tempos)` milliseconds.
    pub fn realignment_ms(&self) -> Option<f64> {
        if self.voice_configs.is_empty() {
            return None;
        }
        let mut divisor = 0u64;
        for voice in &self.voice_configs {
            let bpm = voice.tempo_bpm;
            if bpm.fract() != 0.0 || bpm > u64::MAX as f64 {
                return None;
            }
            divisor = gcd(divisor, bpm as u64);
        }
        Some(60_000.0 / divisor as f64)
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::SilentEngine;
    use crate::timing::ManualClock;

    fn ensemble() -> (Ensemble<SilentEngine, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000.0);
        (Ensemble::with_clock(SilentEngine, clock.clone()), clock)
    }

    #[test]
    fn starts_unconfigured() {
        let (ensemble, _) = ensemble();
        assert_eq!(ensemble.state(), EnsembleState::Unconfigured);
        assert!(ensemble.voices().is_empty());
    }

    #[test]
    fn full_lifecycle() {
        let (mut ensemble, _) = ensemble();
        ensemble.configure(3, 60.0, 60.0).unwrap();
        assert_eq!(ensemble.state(), EnsembleState::Configured);

        ensemble.start().unwrap();
        assert_eq!(ensemble.state(), EnsembleState::Running);
        assert_eq!(ensemble.voices().len(), 3);
        assert!(ensemble.voices().iter().all(|v| v.is_running()));

        ensemble.stop().unwrap();
        assert_eq!(ensemble.state(), EnsembleState::Configured);
        assert!(ensemble.voices().is_empty());

        ensemble.start().unwrap();
        assert_eq!(ensemble.state(), EnsembleState::Running);
    }

    #[test]
    fn tick_before_start() {
        let (mut ensemble, _) = ensemble();
        assert_eq!(
            ensemble.on_tick(),
            Err(EnsembleError::Lifecycle(LifecycleError::NotConfigured))
        );
        ensemble.configure(1, 60.0, 0.0).unwrap();
        assert_eq!(ensemble.on_tick(), Ok(None));
    }

    #[test]
    fn stop_before_configure_is_rejected() {
        let (mut ensemble, _) = ensemble();
        assert_eq!(
            ensemble.stop(),
            Err(EnsembleError::Lifecycle(LifecycleError::NotConfigured))
        );
    }

    #[test]
    fn cannot_reconfigure_while_running() {
        let (mut ensemble, _) = ensemble();
        ensemble.configure(2, 60.0, 1.0).unwrap();
        ensemble.start().unwrap();
        assert_eq!(
            ensemble.configure(3, 60.0, 1.0),
            Err(EnsembleError::Lifecycle(LifecycleError::ReconfigureWhileRunning))
        );
    }

    #[test]
    fn configure_keeps_other_settings() {
        let (mut ensemble, _) = ensemble();
        ensemble
            .configure_with(EnsembleConfig::new(2, 60.0, 1.0).fade_window_ms(250.0))
            .unwrap();
        ensemble.configure(4, 90.0, 2.0).unwrap();

        let config = ensemble.config().unwrap();
        assert_eq!(config.fade_window_ms, 250.0);
        assert_eq!(config.voice_count, 4);
    }

    #[test]
    fn failed_configure_keeps_previous_configuration() {
        let (mut ensemble, _) = ensemble();
        ensemble.configure(2, 60.0, 1.0).unwrap();
        assert!(ensemble.configure(0, 60.0, 1.0).is_err());
        assert_eq!(ensemble.voice_configs().len(), 2);
        assert_eq!(ensemble.state(), EnsembleState::Configured);
    }

    #[test]
    fn epoch_captured_on_first_tick_and_cleared_on_stop() {
        let (mut ensemble, clock) = ensemble();
        ensemble.configure(2, 60.0, 60.0).unwrap();
        ensemble.start().unwrap();
        assert_eq!(ensemble.epoch_ms(), None);

        let frame = ensemble.on_tick().unwrap().unwrap();
        assert_eq!(frame.elapsed_ms, 0.0);
        assert_eq!(ensemble.epoch_ms(), Some(700.0));

        clock.advance(16.0);
        let frame = ensemble.on_tick().unwrap().unwrap();
        assert_eq!(frame.elapsed_ms, 316.0);
        assert_eq!(ensemble.epoch_ms(), Some(700.0));

        ensemble.stop().unwrap();
        assert_eq!(ensemble.epoch_ms(), None);
    }

    #[test]
    fn realignment_of_integral_tempos() {
        let (mut ensemble, _) = ensemble();
        ensemble.configure(3, 60.0, 60.0).unwrap();
        assert_eq!(ensemble.realignment_ms(), Some(1_000.0));

        ensemble.configure(12, 40.0, 1.0).unwrap();
        assert_eq!(ensemble.realignment_ms(), Some(60_000.0));

        ensemble.configure(2, 60.5, 1.0).unwrap();
        assert_eq!(ensemble.realignment_ms(), None);
    }

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(0, 60), 60);
        assert_eq!(gcd(120, 180), 60);
        assert_eq!(gcd(41, 40), 1);
    }
}
