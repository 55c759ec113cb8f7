/*
Tone Table
==========

Every voice sounds one fixed tone taken from a 28-entry diatonic table
spanning four octaves, ordered low to high. Voice `i` plays entry `i`.

Each entry carries three spellings of the same pitch:

  name       Display label (C1 .. B4), counted from the bottom of the table.
  symbol     ABC-notation pitch handed to a sound engine ("C," .. "b'").
  midi_note  MIDI note number, for engines that synthesize directly.

ABC octave marks: a trailing comma lowers by an octave, lower-case letters
raise by one, and a trailing apostrophe raises once more.

  "C,"  = MIDI 48      "C" = MIDI 60      "c" = MIDI 72      "c'" = MIDI 84
*/

/// Number of entries in [`TONE_TABLE`].
pub const TONE_COUNT: usize = 28;

/// One pitch of the tone table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tone {
    pub name: &'static str,
    pub symbol: &'static str,
    pub midi_note: u8,
}

impl Tone {
    const fn new(name: &'static str, symbol: &'static str, midi_note: u8) -> Self {
        Self {
            name,
            symbol,
            midi_note,
        }
    }

    /// Frequency in Hz (A4 = 440 Hz = MIDI note 69).
    pub fn frequency(&self) -> f32 {
        440.0 * 2.0_f32.powf((self.midi_note as f32 - 69.0) / 12.0)
    }
}

pub const TONE_TABLE: [Tone; TONE_COUNT] = [
    Tone::new("C1", "C,", 48),
    Tone::new("D1", "D,", 50),
    Tone::new("E1", "E,", 52),
    Tone::new("F1", "F,", 53),
    Tone::new("G1", "G,", 55),
    Tone::new("A1", "A,", 57),
    Tone::new("B1", "B,", 59),
    Tone::new("C2", "C", 60),
    Tone::new("D2", "D", 62),
    Tone::new("E2", "E", 64),
    Tone::new("F2", "F", 65),
    Tone::new("G2", "G", 67),
    Tone::new("A2", "A", 69),
    Tone::new("B2", "B", 71),
    Tone::new("C3", "c", 72),
    Tone::new("D3", "d", 74),
    Tone::new("E3", "e", 76),
    Tone::new("F3", "f", 77),
    Tone::new("G3", "g", 79),
    Tone::new("A3", "a", 81),
    Tone::new("B3", "b", 83),
    Tone::new("C4", "c'", 84),
    Tone::new("D4", "d'", 86),
    Tone::new("E4", "e'", 88),
    Tone::new("F4", "f'", 89),
    Tone::new("G4", "g'", 91),
    Tone::new("A4", "a'", 93),
    Tone::new("B4", "b'", 95),
];

/// Tone for a voice index, or `None` past the end of the table.
pub fn tone(index: usize) -> Option<&'static Tone> {
    TONE_TABLE.get(index)
}

/// Tone for a voice index, wrapping around the table.
pub fn tone_wrapping(index: usize) -> &'static Tone {
    &TONE_TABLE[index % TONE_COUNT]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ordered_low_to_high() {
        for pair in TONE_TABLE.windows(2) {
            assert!(pair[0].midi_note < pair[1].midi_note);
        }
    }

    #[test]
    fn table_spans_four_octaves() {
        let first = TONE_TABLE[0].midi_note;
        let last = TONE_TABLE[TONE_COUNT - 1].midi_note;
        assert_eq!(first, 48);
        assert_eq!(last - first, 47);
    }

    #[test]
    fn a_above_middle_c_is_440() {
        let a = TONE_TABLE.iter().find(|t| t.symbol == "A").unwrap();
        assert!((a.frequency() - 440.0).abs() < 1e-3);
    }

    #[test]
    fn lookup_past_end_is_none() {
        assert!(tone(TONE_COUNT - 1).is_some());
        assert!(tone(TONE_COUNT).is_none());
    }

    #[test]
    fn wrapping_lookup_cycles() {
        assert_eq!(tone_wrapping(TONE_COUNT), &TONE_TABLE[0]);
        assert_eq!(tone_wrapping(TONE_COUNT + 3), &TONE_TABLE[3]);
    }
}
