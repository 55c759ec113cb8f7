//! Voice colors.
//!
//! Each voice gets an evenly spaced hue around the color wheel, fully
//! saturated at half lightness.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert HSL to RGB.
    ///
    /// `hue` is in degrees (any value, wrapped to 0..360), `saturation` and
    /// `lightness` are percentages.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let hue = hue.rem_euclid(360.0);
        let l = lightness / 100.0;
        let a = saturation * l.min(1.0 - l) / 100.0;

        let channel = |n: f64| -> u8 {
            let k = (n + hue / 30.0) % 12.0;
            let value = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
            (255.0 * value).round().clamp(0.0, 255.0) as u8
        };

        Self {
            r: channel(0.0),
            g: channel(8.0),
            b: channel(4.0),
        }
    }

    /// Color of voice `index` out of `voice_count`.
    pub fn for_voice(index: usize, voice_count: usize) -> Self {
        let hue = index as f64 * (360.0 / voice_count.max(1) as f64);
        Self::from_hsl(hue, 100.0, 50.0)
    }

    pub fn lerp(&self, target: &Rgb, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |start: u8, end: u8| -> u8 {
            (start as f64 + (end as f64 - start as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, target.r),
            g: mix(self.g, target.g),
            b: mix(self.b, target.b),
        }
    }

    /// Apply `alpha` against a black background.
    pub fn over_black(&self, alpha: f64) -> Self {
        Rgb::BLACK.lerp(self, alpha)
    }
}
