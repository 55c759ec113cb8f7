use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;

/*
Phase Clock
===========

Every voice derives its beat phase from ONE elapsed-time value, read once per
frame. There is no per-voice clock, so voices cannot drift apart: if two
voices line up at t = 60s in theory, they line up on screen.

  now        Milliseconds from an arbitrary monotonic origin (the Clock).
  epoch      `now` of the first frame of a run, shifted by the start offset.
  elapsed    now - epoch

The start offset (default -300ms) is applied exactly once, when the epoch is
captured. The first frame of a run reports elapsed = 0; later frames report
`now - epoch`.

    first tick:   epoch = now + offset        elapsed = 0
    later ticks:                              elapsed = now - epoch
*/

/// Default start-up latency compensation, in milliseconds.
pub const DEFAULT_START_OFFSET_MS: f64 = -300.0;

/// A monotonic time source in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one copy and hand the
/// other to an ensemble.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now_bits.store(now_ms.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.set(self.now_ms() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.now_bits.load(Ordering::Relaxed))
    }
}

/// Shared time base for every voice of a run.
#[derive(Debug, Clone)]
pub struct PhaseClock<C: Clock> {
    source: C,
    offset_ms: f64,
    epoch_ms: Option<f64>,
}

impl<C: Clock> PhaseClock<C> {
    pub fn new(source: C, offset_ms: f64) -> Self {
        Self {
            source,
            offset_ms,
            epoch_ms: None,
        }
    }

    /// Read the source and resolve elapsed time for this frame.
    pub fn elapsed_ms(&mut self) -> f64 {
        let now = self.source.now_ms();
        self.elapsed_at(now)
    }

    /// Resolve elapsed time for an explicit `now`.
    pub fn elapsed_at(&mut self, now_ms: f64) -> f64 {
        match self.epoch_ms {
            Some(epoch) => now_ms - epoch,
            None => {
                self.epoch_ms = Some(now_ms + self.offset_ms);
                0.0
            }
        }
    }

    pub fn epoch_ms(&self) -> Option<f64> {
        self.epoch_ms
    }

    /// Change the start offset. Takes effect at the next epoch capture.
    pub fn set_offset_ms(&mut self, offset_ms: f64) {
        self.offset_ms = offset_ms;
    }

    /// Forget the epoch so the next frame starts a fresh run.
    pub fn reset(&mut self) {
        self.epoch_ms = None;
    }
}
