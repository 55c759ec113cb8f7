// Purpose: the shared time base every voice reads its phase from

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock, PhaseClock, DEFAULT_START_OFFSET_MS};
