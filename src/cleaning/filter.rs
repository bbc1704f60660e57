// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Short-note removal.

use tracing::debug;

use crate::notes::Note;

/// Drop notes shorter than `min_length` seconds.
///
/// Runs after merging so that re-triggered fragments get a chance to be
/// absorbed before they are judged on length. Order is preserved.
pub fn remove_short_notes(notes: Vec<Note>, min_length: f64) -> Vec<Note> {
    let before = notes.len();
    let kept: Vec<Note> = notes
        .into_iter()
        .filter(|n| n.duration() >= min_length)
        .collect();

    if kept.len() < before {
        debug!(removed = before - kept.len(), min_length, "removed short notes");
    }
    kept
}
