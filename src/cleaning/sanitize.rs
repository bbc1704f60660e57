// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Final safety pass over a track before export.
//!
//! After this pass every note has a finite, non-negative start, an end
//! at least `min_duration` later, a pitch in 0-127 and a velocity in
//! 1-127. A track is never left empty.

use tracing::{debug, warn};

use crate::notes::note::{MIDI_MAX, MIDI_MIN};
use crate::notes::{sort_by_start, Note};

/// Tempo used when nothing usable was supplied or estimated
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Pitch of the placeholder note in an otherwise empty track
pub const FILLER_PITCH: i32 = 60;
/// Velocity of the placeholder note
pub const FILLER_VELOCITY: i32 = 1;
/// Length of the placeholder note in seconds
pub const FILLER_DURATION: f64 = 0.05;

/// Clamp a track into exportable ranges.
pub fn sanitize_notes(notes: Vec<Note>, min_duration: f64) -> Vec<Note> {
    let before = notes.len();
    let mut out: Vec<Note> = notes
        .into_iter()
        .filter(Note::is_valid)
        .map(|mut note| {
            note.start = note.start.max(0.0);
            if note.end - note.start < min_duration {
                note.end = note.start + min_duration;
            }
            note.pitch = note.pitch.clamp(MIDI_MIN, MIDI_MAX);
            // 0 would read as a note-off
            note.velocity = note.velocity.clamp(1, MIDI_MAX);
            note
        })
        .collect();

    if out.len() < before {
        warn!(dropped = before - out.len(), "dropped invalid notes");
    }

    if out.is_empty() {
        debug!("empty track, inserting placeholder note");
        out.push(filler_note());
    }

    sort_by_start(&mut out);
    out
}

/// Near-silent note that keeps an otherwise empty track loadable
pub fn filler_note() -> Note {
    Note::new(FILLER_PITCH, 0.0, FILLER_DURATION, FILLER_VELOCITY)
}

/// A tempo that is finite and positive, falling back to the default
pub fn safe_tempo(bpm: Option<f64>) -> f64 {
    match bpm {
        Some(bpm) if bpm.is_finite() && bpm > 0.0 => bpm,
        _ => DEFAULT_TEMPO_BPM,
    }
}
