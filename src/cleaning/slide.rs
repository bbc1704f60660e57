// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Same-pitch merging and slide / legato detection.
//!
//! Both run in one pass over the notes in (start, pitch) order. A note is
//! first offered to the last kept note of the same pitch for merging; only
//! when that fails is it compared with the note right before it for a
//! slide. Equal pitches therefore never count as a slide.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::CleanConfig;
use crate::notes::{sort_by_start, Note};

/// Merge and slide thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideParams {
    /// Largest silence between same-pitch notes that are merged
    pub merge_gap: f64,
    /// Largest silence bridged by a slide
    pub max_gap: f64,
    /// Largest overlap still treated as a slide
    pub max_overlap: f64,
    /// Largest interval in semitones
    pub max_pitch_diff: i32,
    /// Velocity factor for the second note of a slide, truncated
    pub velocity_scale: f64,
}

impl Default for SlideParams {
    fn default() -> Self {
        Self::from(&CleanConfig::default())
    }
}

impl From<&CleanConfig> for SlideParams {
    fn from(config: &CleanConfig) -> Self {
        Self {
            merge_gap: config.merge_gap,
            max_gap: config.slide_max_gap,
            max_overlap: config.slide_max_overlap,
            max_pitch_diff: config.slide_max_pitch_diff,
            velocity_scale: config.slide_velocity_scale,
        }
    }
}

/// Result of a merge / slide pass
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Surviving notes in (start, pitch) order
    pub notes: Vec<Note>,
    /// Notes absorbed into an earlier note of the same pitch
    pub merged: usize,
    /// Notes flagged as the second half of a slide
    pub slides: usize,
}

/// Collapse same-pitch re-triggers and flag slides.
pub fn merge_and_slide(mut notes: Vec<Note>, params: &SlideParams) -> MergeOutcome {
    let before = notes.len();
    notes.retain(Note::is_finite);
    if notes.len() < before {
        warn!(dropped = before - notes.len(), "dropped notes with non-finite timing");
    }

    sort_by_start(&mut notes);

    let mut kept: Vec<Note> = Vec::with_capacity(notes.len());
    let mut last_of_pitch: HashMap<i32, usize> = HashMap::new();
    let mut merged = 0;
    let mut slides = 0;

    for mut note in notes {
        if let Some(&idx) = last_of_pitch.get(&note.pitch) {
            let prev = &mut kept[idx];
            let gap = note.start - prev.end;
            if (0.0..=params.merge_gap).contains(&gap) {
                prev.end = prev.end.max(note.end);
                merged += 1;
                continue;
            }
        }

        if let Some(prev) = kept.last_mut() {
            if is_slide(prev, &note, params) {
                if prev.end < note.start {
                    prev.end = note.start;
                }
                note.is_slide = true;
                note.velocity = (note.velocity as f64 * params.velocity_scale).trunc() as i32;
                slides += 1;
            }
        }

        last_of_pitch.insert(note.pitch, kept.len());
        kept.push(note);
    }

    debug!(merged, slides, remaining = kept.len(), "merge and slide pass");

    MergeOutcome {
        notes: kept,
        merged,
        slides,
    }
}

fn is_slide(prev: &Note, next: &Note, params: &SlideParams) -> bool {
    let pitch_diff = (next.pitch - prev.pitch).abs();
    let gap = next.start - prev.end;
    pitch_diff > 0
        && pitch_diff <= params.max_pitch_diff
        && gap >= -params.max_overlap
        && gap <= params.max_gap
}
