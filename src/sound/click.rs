use std::f32::consts::TAU;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{SoundEngine, SoundError, SoundHandle, ToneOn, ToneOnSender};
use crate::tones::Tone;

/*
Click Bank
==========

A minimal reference sound engine: every handle owns one slot in a shared
bank, and every slot repeats one short pitched click at its own tempo.

Scheduling
----------

A slot counts down the samples until its next beat. The beat length is kept
as a fractional sample count and accumulated, never rounded:

    samples_per_beat = 60 / bpm * sample_rate

    120 BPM @ 48kHz  -> 24000 samples
     41 BPM @ 48kHz  -> 70243.90... samples

Each beat fires on the first whole sample at or after its exact position, so
the error never exceeds one sample and never accumulates. A run of an hour
at 41 BPM lands its last beat within one sample of where it belongs.

The first beat fires on the very first sample rendered after `play`.

The Click
---------

    Level
     1.0 |\
         | \
         |  \
     0.0 +---\__________________ Time
         <-->
         CLICK_DECAY_SECONDS

A sine at the tone's frequency, restarted from phase 0 on each beat, under a
linear decay. Linear because it is cheap and the click is short enough that
its shape is not heard.

Threading
---------

The bank lives behind `Arc<Mutex<_>>`: handles lock it briefly on
play/silence, the audio callback locks it once per block. Tone-on events go
out over each slot's lock-free queue, never through the lock.
*/

/// Length of one click, in seconds.
const CLICK_DECAY_SECONDS: f32 = 0.08;

/// Output gain of a single click at full level.
const CLICK_GAIN: f32 = 0.25;

#[derive(Default)]
struct ClickSlot {
    /// Slot belongs to a live handle.
    claimed: bool,
    /// Slot is scheduling beats.
    playing: bool,
    frequency: f32,
    samples_per_beat: f64,
    /// Samples until the next beat fires (fractional).
    samples_to_beat: f64,
    beats: u64,
    osc_phase: f32,
    level: f32,
    tone_on: Option<ToneOnSender>,
}

impl ClickSlot {
    fn start(&mut self, samples_per_beat: f64, frequency: f32) {
        self.playing = true;
        self.frequency = frequency;
        self.samples_per_beat = samples_per_beat;
        self.samples_to_beat = 0.0;
        self.beats = 0;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn release(&mut self) {
        *self = ClickSlot::default();
    }

    fn fire(&mut self) {
        self.beats = self.beats.wrapping_add(1);
        self.level = 1.0;
        self.osc_phase = 0.0;
        if let Some(tx) = self.tone_on.as_mut() {
            // Full or abandoned queues just lose the event
            let _ = tx.push(ToneOn { beat: self.beats });
        }
    }

    fn next_sample(&mut self, sample_rate: f32, decay_per_sample: f32) -> f32 {
        if self.playing {
            if self.samples_to_beat <= 0.0 {
                self.fire();
                self.samples_to_beat += self.samples_per_beat;
            }
            self.samples_to_beat -= 1.0;
        }

        if self.level <= 0.0 {
            return 0.0;
        }

        let sample = (TAU * self.osc_phase).sin() * self.level * CLICK_GAIN;
        self.osc_phase += self.frequency / sample_rate;
        if self.osc_phase >= 1.0 {
            self.osc_phase -= 1.0;
        }
        self.level = (self.level - decay_per_sample).max(0.0);
        sample
    }
}

/// Every click voice of an engine, rendered together.
pub struct ClickBank {
    sample_rate: f32,
    slots: Vec<ClickSlot>,
}

impl ClickBank {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            slots: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Samples between beats at `tempo_bpm`.
    pub fn samples_per_beat(&self, tempo_bpm: f64) -> f64 {
        // beats per second = bpm / 60
        // samples per beat = sample_rate / beats per second
        60.0 / tempo_bpm * self.sample_rate as f64
    }

    /// Number of slots owned by live handles.
    pub fn claimed_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.claimed).count()
    }

    /// Number of slots currently scheduling beats.
    pub fn playing_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.playing).count()
    }

    /// Beats sounded by a slot since its last start.
    pub fn beats(&self, slot: usize) -> Option<u64> {
        self.slots.get(slot).filter(|s| s.claimed).map(|s| s.beats)
    }

    /// Render every slot, mixed, into `out`.
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let sample_rate = self.sample_rate;
        let decay_per_sample = 1.0 / (CLICK_DECAY_SECONDS * sample_rate);

        for slot in self.slots.iter_mut().filter(|s| s.claimed) {
            for o in out.iter_mut() {
                *o += slot.next_sample(sample_rate, decay_per_sample);
            }
        }

        // Voices that land together can sum past full scale
        for o in out.iter_mut() {
            *o = o.clamp(-1.0, 1.0);
        }
    }

    fn claim(&mut self) -> usize {
        let index = match self.slots.iter().position(|s| !s.claimed) {
            Some(free) => free,
            None => {
                self.slots.push(ClickSlot::default());
                self.slots.len() - 1
            }
        };
        self.slots[index].claimed = true;
        index
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut ClickSlot, SoundError> {
        self.slots
            .get_mut(slot)
            .filter(|s| s.claimed)
            .ok_or_else(|| SoundError::Backend(format!("click slot {} is not claimed", slot)))
    }
}

fn lock(bank: &Mutex<ClickBank>) -> Result<MutexGuard<'_, ClickBank>, SoundError> {
    bank.lock()
        .map_err(|_| SoundError::Backend("click bank lock poisoned".to_string()))
}

/// Sound engine that hands out click slots from a shared [`ClickBank`].
#[derive(Clone)]
pub struct ClickEngine {
    bank: Arc<Mutex<ClickBank>>,
}

impl ClickEngine {
    pub fn new(sample_rate: f32) -> Self {
        Self::from_bank(Arc::new(Mutex::new(ClickBank::new(sample_rate))))
    }

    pub fn from_bank(bank: Arc<Mutex<ClickBank>>) -> Self {
        Self { bank }
    }

    /// The bank to render from the audio callback.
    pub fn bank(&self) -> Arc<Mutex<ClickBank>> {
        Arc::clone(&self.bank)
    }
}

impl SoundEngine for ClickEngine {
    type Handle = ClickHandle;

    fn create_handle(&mut self) -> Result<ClickHandle, SoundError> {
        let slot = lock(&self.bank)?.claim();
        log::trace!("claimed click slot {}", slot);
        Ok(ClickHandle {
            bank: Arc::clone(&self.bank),
            slot,
        })
    }
}

pub struct ClickHandle {
    bank: Arc<Mutex<ClickBank>>,
    slot: usize,
}

impl ClickHandle {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl SoundHandle for ClickHandle {
    fn play(&mut self, tempo_bpm: f64, tone: &Tone) -> Result<(), SoundError> {
        if !(tempo_bpm.is_finite() && tempo_bpm > 0.0) {
            return Err(SoundError::Backend(format!("cannot click at {} BPM", tempo_bpm)));
        }
        let mut bank = lock(&self.bank)?;
        let samples_per_beat = bank.samples_per_beat(tempo_bpm);
        // At most one beat fires per sample
        if samples_per_beat < 1.0 {
            return Err(SoundError::Backend(format!(
                "{} BPM is faster than one beat per sample at {} Hz",
                tempo_bpm,
                bank.sample_rate()
            )));
        }
        bank.slot_mut(self.slot)?.start(samples_per_beat, tone.frequency());
        Ok(())
    }

    fn silence(&mut self) -> Result<(), SoundError> {
        lock(&self.bank)?.slot_mut(self.slot)?.stop();
        Ok(())
    }

    fn subscribe_tone_on(&mut self, tx: ToneOnSender) {
        match lock(&self.bank).and_then(|mut bank| {
            bank.slot_mut(self.slot)?.tone_on = Some(tx);
            Ok(())
        }) {
            Ok(()) => {}
            Err(err) => log::warn!("tone-on subscription lost: {}", err),
        }
    }
}

impl Drop for ClickHandle {
    fn drop(&mut self) {
        if let Ok(mut bank) = self.bank.lock() {
            if let Some(slot) = bank.slots.get_mut(self.slot) {
                slot.release();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tones::TONE_TABLE;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn start_slot(bank: &mut ClickBank, slot: usize, tempo_bpm: f64, frequency: f32) {
        let samples_per_beat = bank.samples_per_beat(tempo_bpm);
        bank.slots[slot].start(samples_per_beat, frequency);
    }

    /// Indices of the non-silent samples in the next `samples` rendered.
    fn sounding_samples(bank: &mut ClickBank, samples: usize) -> Vec<usize> {
        let mut out = vec![0.0; samples];
        bank.render_block(&mut out);
        out.iter()
            .enumerate()
            .filter(|(_, s)| s.abs() > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn samples_per_beat_from_tempo() {
        let bank = ClickBank::new(SAMPLE_RATE);
        assert_eq!(bank.samples_per_beat(120.0), 24_000.0);
        assert_eq!(bank.samples_per_beat(60.0), 48_000.0);
    }

    #[test]
    fn first_beat_fires_immediately() {
        let mut bank = ClickBank::new(SAMPLE_RATE);
        let slot = bank.claim();
        start_slot(&mut bank, slot, 120.0, TONE_TABLE[0].frequency());

        let mut out = vec![0.0; 16];
        bank.render_block(&mut out);
        assert_eq!(bank.beats(slot), Some(1));
    }

    #[test]
    fn beat_count_over_one_second() {
        let mut bank = ClickBank::new(SAMPLE_RATE);
        let slot = bank.claim();
        start_slot(&mut bank, slot, 180.0, 440.0);

        let mut out = vec![0.0; SAMPLE_RATE as usize];
        bank.render_block(&mut out);

        // 180 BPM = 3 beats per second, first at sample 0
        assert_eq!(bank.beats(slot), Some(3));
    }

    #[test]
    fn no_drift_over_long_run_with_fractional_beats() {
        let mut bank = ClickBank::new(SAMPLE_RATE);
        let slot = bank.claim();
        // 41 BPM: 70243.9 samples per beat
        start_slot(&mut bank, slot, 41.0, 440.0);

        let mut out = vec![0.0; 4096];
        let total_seconds = 601;
        let total_samples = SAMPLE_RATE as usize * total_seconds;
        let mut rendered = 0;
        while rendered < total_samples {
            let n = out.len().min(total_samples - rendered);
            bank.render_block(&mut out[..n]);
            rendered += n;
        }

        // Beat k sits at k * 70243.9 samples; beats 0..=410 fit in 601s
        let expected = (total_seconds as f64 / 60.0 * 41.0).ceil() as u64;
        assert_eq!(bank.beats(slot), Some(expected));
    }

    #[test]
    fn silence_stops_new_beats() {
        let mut bank = ClickBank::new(SAMPLE_RATE);
        let slot = bank.claim();
        start_slot(&mut bank, slot, 600.0, 440.0);
        bank.slots[slot].stop();

        let mut out = vec![0.0; SAMPLE_RATE as usize];
        bank.render_block(&mut out);
        assert_eq!(bank.beats(slot), Some(0));
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn click_decays_to_silence_between_beats() {
        let mut bank = ClickBank::new(SAMPLE_RATE);
        let slot = bank.claim();
        start_slot(&mut bank, slot, 60.0, 880.0);

        let sounding = sounding_samples(&mut bank, SAMPLE_RATE as usize);
        let last = *sounding.last().unwrap();
        assert!(last < (CLICK_DECAY_SECONDS * SAMPLE_RATE) as usize + 1);
    }

    #[test]
    fn output_stays_in_range_with_many_voices() {
        let mut bank = ClickBank::new(SAMPLE_RATE);
        for _ in 0..4 {
            let slot = bank.claim();
            start_slot(&mut bank, slot, 60.0, 440.0);
        }
        let mut out = vec![0.0; 2048];
        bank.render_block(&mut out);
        assert!(out.iter().all(|s| s.abs() <= 1.0));
        assert!(out.iter().any(|s| s.abs() > 0.0));
    }

    #[test]
    fn handle_rejects_tempo_faster_than_the_sample_rate() {
        let mut engine = ClickEngine::new(SAMPLE_RATE);
        let mut handle = engine.create_handle().unwrap();

        // 60 * 48000 BPM is exactly one beat per sample
        assert!(handle.play(60.0 * SAMPLE_RATE as f64, &TONE_TABLE[0]).is_ok());
        assert!(matches!(
            handle.play(60.0 * SAMPLE_RATE as f64 * 2.0, &TONE_TABLE[0]),
            Err(SoundError::Backend(_))
        ));
        assert_eq!(engine.bank().lock().unwrap().playing_slots(), 1);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut bank = ClickBank::new(SAMPLE_RATE);
        let a = bank.claim();
        let b = bank.claim();
        assert_ne!(a, b);

        bank.slots[a].release();
        assert_eq!(bank.claimed_slots(), 1);
        assert_eq!(bank.claim(), a);
    }
}
