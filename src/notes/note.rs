// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note model shared by every cleaning stage.
//!
//! Stages take a `Vec<Note>` by value and hand back a fresh one, so no
//! two stages ever alias the same collection.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest MIDI value
pub const MIDI_MIN: i32 = 0;
/// Highest MIDI value
pub const MIDI_MAX: i32 = 127;

/// One played note plus the annotations added while cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch. Only guaranteed to be 0-127 after sanitization.
    pub pitch: i32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// MIDI velocity. Only guaranteed to be 0-127 after sanitization.
    pub velocity: i32,
    /// Guitar string (1 = thinnest, 6 = thickest)
    #[serde(default)]
    pub string_number: Option<u8>,
    /// Strum group this note was assigned to
    #[serde(default)]
    pub group_id: Option<usize>,
    /// Second note of a slide / legato pair
    #[serde(default)]
    pub is_slide: bool,
}

impl Note {
    /// Create an unannotated note
    pub fn new(pitch: i32, start: f64, end: f64, velocity: i32) -> Self {
        Self {
            pitch,
            start,
            end,
            velocity,
            string_number: None,
            group_id: None,
            is_slide: false,
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Both timestamps are finite numbers
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// Finite and strictly positive length
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.end > self.start
    }

    /// Order by start time, then pitch
    pub fn cmp_start_pitch(&self, other: &Note) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then(self.pitch.cmp(&other.pitch))
    }
}

/// Sort notes by start time, then pitch. Stable for exact ties.
pub fn sort_by_start(notes: &mut [Note]) {
    notes.sort_by(|a, b| a.cmp_start_pitch(b));
}

/// A cluster of notes played as one near-simultaneous gesture.
///
/// Groups are rebuilt whenever they are needed and own their members only
/// while a stage works on them.
#[derive(Debug, Clone, PartialEq)]
pub struct StrumGroup {
    pub id: usize,
    /// Start of the first note seen when the group was opened
    pub anchor_start: f64,
    /// Members in ascending pitch order
    pub notes: Vec<Note>,
}

impl StrumGroup {
    /// Number of member notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Check if the group is empty
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Role of an output track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackRole {
    Guitar,
    Bass,
}

impl TrackRole {
    /// Track name written to the output file
    pub fn name(self) -> &'static str {
        match self {
            TrackRole::Guitar => "Guitar (TAB)",
            TrackRole::Bass => "Bass",
        }
    }

    /// MIDI channel (0-15) used for this role
    pub fn channel(self) -> u8 {
        match self {
            TrackRole::Guitar => 0,
            TrackRole::Bass => 1,
        }
    }
}

impl fmt::Display for TrackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackRole::Guitar => write!(f, "guitar"),
            TrackRole::Bass => write!(f, "bass"),
        }
    }
}

/// One output part
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub role: TrackRole,
    /// Notes ordered by start time
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(role: TrackRole, notes: Vec<Note>) -> Self {
        Self { role, notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
