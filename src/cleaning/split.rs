// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bass / guitar voice split.

use tracing::debug;

use crate::notes::Note;

/// Notes partitioned by register
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceSplit {
    pub bass: Vec<Note>,
    pub guitar: Vec<Note>,
}

/// Send every note at or below `threshold` to the bass, the rest to the
/// guitar. Both sides keep the input order.
pub fn split_voices(notes: Vec<Note>, threshold: i32) -> VoiceSplit {
    let (bass, guitar): (Vec<Note>, Vec<Note>) =
        notes.into_iter().partition(|n| n.pitch <= threshold);

    debug!(bass = bass.len(), guitar = guitar.len(), threshold, "split voices");
    VoiceSplit { bass, guitar }
}
