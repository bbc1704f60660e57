// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tempo-grid quantization.
//!
//! Positions are snapped through their integer grid index, so snapping an
//! already-snapped time reproduces it bit for bit.

use tracing::{debug, warn};

use crate::notes::{Note, StrumGroup};

/// Tempos below this are raised to it before the grid is derived
pub const MIN_TEMPO_BPM: f64 = 30.0;

/// Quantization grid derived from tempo and resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    step: f64,
}

impl Grid {
    /// Build the grid for `division` notes per whole note at `bpm`.
    ///
    /// Returns `None` when the step would be non-positive or not finite;
    /// callers then leave timing untouched.
    pub fn from_tempo(bpm: f64, division: u32) -> Option<Self> {
        if bpm.is_nan() || division == 0 {
            return None;
        }
        let quarter = 60.0 / bpm.max(MIN_TEMPO_BPM);
        let step = quarter / (division as f64 / 4.0);
        Self::from_step(step)
    }

    /// Grid with an explicit step in seconds
    pub fn from_step(step: f64) -> Option<Self> {
        if step.is_finite() && step > 0.0 {
            Some(Self { step })
        } else {
            None
        }
    }

    /// Step in seconds
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Nearest grid index
    pub fn index(&self, time: f64) -> f64 {
        (time / self.step).round()
    }

    /// Time of a grid index
    pub fn time_at(&self, index: f64) -> f64 {
        index * self.step
    }

    /// Snap a time to the nearest grid line
    pub fn snap(&self, time: f64) -> f64 {
        self.time_at(self.index(time))
    }

    /// Strum grouping window for per-group quantization.
    ///
    /// Kept under half a step so that anchors on different grid lines never
    /// fall into one group, which makes a second per-group pass a no-op.
    pub fn group_window(&self, epsilon: f64) -> f64 {
        epsilon.min(self.step / 2.0)
    }
}

/// Quantize each note's start and end independently.
///
/// A note whose end collapses onto its start is given one grid step.
/// Notes with non-finite timestamps are dropped.
pub fn quantize_notes(notes: Vec<Note>, grid: Option<Grid>) -> Vec<Note> {
    let grid = match grid {
        Some(grid) => grid,
        None => {
            warn!("degenerate quantization grid, timing left unchanged");
            return notes;
        }
    };

    let before = notes.len();
    let out: Vec<Note> = notes
        .into_iter()
        .filter(Note::is_finite)
        .map(|mut note| {
            let start_idx = grid.index(note.start);
            let mut end_idx = grid.index(note.end);
            if end_idx <= start_idx {
                end_idx = start_idx + 1.0;
            }
            note.start = grid.time_at(start_idx);
            note.end = grid.time_at(end_idx);
            note
        })
        .collect();

    if out.len() < before {
        warn!(dropped = before - out.len(), "dropped notes with non-finite timing");
    }
    debug!(notes = out.len(), step = grid.step(), "quantized per note");
    out
}

/// Quantize whole strum groups.
///
/// The anchor is snapped once and every member moves by the same amount,
/// keeping the spread between strings intact.
pub fn quantize_groups(groups: Vec<StrumGroup>, grid: Option<Grid>) -> Vec<StrumGroup> {
    let grid = match grid {
        Some(grid) => grid,
        None => {
            warn!("degenerate quantization grid, timing left unchanged");
            return groups;
        }
    };

    let out: Vec<StrumGroup> = groups
        .into_iter()
        .map(|mut group| {
            let anchor = group.anchor_start;
            let snapped = grid.snap(anchor);
            if snapped != anchor && snapped.is_finite() {
                for note in &mut group.notes {
                    let duration = note.end - note.start;
                    note.start = snapped + (note.start - anchor);
                    note.end = note.start + duration;
                }
                group.anchor_start = snapped;
            }
            group
        })
        .collect();

    debug!(groups = out.len(), step = grid.step(), "quantized per strum group");
    out
}
