// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note model and ingestion.
//!
//! This module provides:
//! - The cleaned note value and its derived groupings
//! - Raw transcription input types
//! - Validation and normalization of raw input

pub mod ingest;
pub mod note;

pub use ingest::{flatten, ingest, IngestedInstrument, RawInstrument, RawNote, Transcription};
pub use note::{sort_by_start, Note, StrumGroup, Track, TrackRole};
