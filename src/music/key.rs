// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch classes, modes and the derived key / meter values.
//!
//! These are plain values computed once per cleaning run. They never
//! reference the notes they were estimated from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Index 0-11, C = 0
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Get pitch class from an index (wraps modulo 12)
    pub fn from_index(pc: u8) -> Self {
        PitchClass::ALL[(pc % 12) as usize]
    }

    /// Pitch class of a MIDI pitch. Negative pitches wrap as well.
    pub fn of_pitch(pitch: i32) -> Self {
        PitchClass::from_index(pitch.rem_euclid(12) as u8)
    }

    /// Transpose by semitones
    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::from_index((self.index() as i32 + semitones).rem_euclid(12) as u8)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        };
        write!(f, "{}", name)
    }
}

/// Tonal mode of an estimated key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

/// Estimated key: tonal center plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEstimate {
    pub root: PitchClass,
    pub mode: Mode,
}

impl KeyEstimate {
    pub fn new(root: PitchClass, mode: Mode) -> Self {
        Self { root, mode }
    }

    /// Relative major root (the minor's root up a minor third)
    pub fn relative_major(&self) -> PitchClass {
        match self.mode {
            Mode::Major => self.root,
            Mode::Minor => self.root.transpose(3),
        }
    }

    /// Number of sharps (positive) or flats (negative) in the key signature,
    /// in the range -6..=6. F# major / D# minor are spelled with six sharps.
    pub fn accidentals(&self) -> i8 {
        let fifths = (self.relative_major().index() as i32 * 7).rem_euclid(12);
        if fifths > 6 {
            (fifths - 12) as i8
        } else {
            fifths as i8
        }
    }
}

impl Default for KeyEstimate {
    fn default() -> Self {
        Self::new(PitchClass::C, Mode::Major)
    }
}

impl fmt::Display for KeyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.mode)
    }
}

/// Estimated time signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignatureEstimate {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignatureEstimate {
    pub const FOUR_FOUR: Self = Self { numerator: 4, denominator: 4 };
    pub const THREE_FOUR: Self = Self { numerator: 3, denominator: 4 };
    pub const SIX_EIGHT: Self = Self { numerator: 6, denominator: 8 };

    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self { numerator, denominator }
    }
}

impl Default for TimeSignatureEstimate {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl fmt::Display for TimeSignatureEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_index() {
        assert_eq!(PitchClass::C.index(), 0);
        assert_eq!(PitchClass::A.index(), 9);
        assert_eq!(PitchClass::B.index(), 11);
        assert_eq!(PitchClass::from_index(14), PitchClass::D);
    }

    #[test]
    fn test_pitch_class_of_pitch() {
        assert_eq!(PitchClass::of_pitch(60), PitchClass::C);
        assert_eq!(PitchClass::of_pitch(64), PitchClass::E);
        assert_eq!(PitchClass::of_pitch(-1), PitchClass::B);
    }

    #[test]
    fn test_transpose() {
        assert_eq!(PitchClass::A.transpose(3), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(-1), PitchClass::B);
    }

    #[test]
    fn test_key_display() {
        let key = KeyEstimate::new(PitchClass::Fs, Mode::Minor);
        assert_eq!(key.to_string(), "F# minor");
        assert_eq!(KeyEstimate::default().to_string(), "C major");
    }

    #[test]
    fn test_accidentals() {
        assert_eq!(KeyEstimate::new(PitchClass::C, Mode::Major).accidentals(), 0);
        assert_eq!(KeyEstimate::new(PitchClass::G, Mode::Major).accidentals(), 1);
        assert_eq!(KeyEstimate::new(PitchClass::E, Mode::Major).accidentals(), 4);
        assert_eq!(KeyEstimate::new(PitchClass::F, Mode::Major).accidentals(), -1);
        assert_eq!(KeyEstimate::new(PitchClass::As, Mode::Major).accidentals(), -2);
        assert_eq!(KeyEstimate::new(PitchClass::A, Mode::Minor).accidentals(), 0);
        assert_eq!(KeyEstimate::new(PitchClass::E, Mode::Minor).accidentals(), 1);
        assert_eq!(KeyEstimate::new(PitchClass::D, Mode::Minor).accidentals(), -1);
    }

    #[test]
    fn test_time_signature_display() {
        assert_eq!(TimeSignatureEstimate::default().to_string(), "4/4");
        assert_eq!(TimeSignatureEstimate::SIX_EIGHT.to_string(), "6/8");
    }
}
