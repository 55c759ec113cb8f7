#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Draw one voice's ring.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingInstruction {
    pub index: usize,
    pub color: Rgb,
    pub radius: f64,
    /// Clamped beat intensity, `[0, 1]`.
    pub alpha: f64,
}

/// Everything needed to paint one display frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub elapsed_ms: f64,
    /// The reference voice sounded at least once since the previous frame.
    pub downbeat: bool,
    /// One ring per voice, in voice-index order.
    pub rings: Vec<RingInstruction>,
}

impl Frame {
    pub fn ring(&self, index: usize) -> Option<&RingInstruction> {
        self.rings.get(index)
    }
}
