// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cleanup of machine-transcribed guitar notes for tablature.
//!
//! Raw notes from an audio-to-notes model are quantized, grouped into
//! strums, merged, split into guitar and bass, annotated with an estimated
//! key and meter, and sanitized so notation software can load the result.

pub mod analysis;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod music;
pub mod notes;
pub mod pipeline;

pub use config::{CleanConfig, QuantizeMode};
pub use error::{CleanError, Result};
pub use music::{KeyEstimate, Mode, PitchClass, TimeSignatureEstimate};
pub use notes::{Note, RawInstrument, RawNote, StrumGroup, Track, TrackRole, Transcription};
pub use pipeline::{CleanedScore, Cleaner};

/// Clean a transcription with the given configuration
pub fn clean(transcription: &Transcription, config: &CleanConfig) -> Result<CleanedScore> {
    Cleaner::new(config.clone()).clean(transcription)
}
