// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the cleaning pipeline.
//!
//! Only total absence of usable input is fatal. Degenerate grids, invalid
//! note data and empty output tracks are recovered inside their stages and
//! never show up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    /// No note survived ingestion.
    #[error("Empty transcription: no usable notes after ingestion")]
    EmptyTranscription,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("MIDI parse error: {0}")]
    MidiParse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CleanError>;
