// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The cleaning pipeline.
//!
//! Stages run in a fixed order:
//! ingest, quantize and group, merge and slide, drop short notes, split
//! voices, estimate key and meter, sanitize. A run owns its notes from
//! start to finish and keeps no state between runs.

use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::analysis::{estimate_key, estimate_tempo, estimate_time_signature};
use crate::cleaning::quantize::Grid;
use crate::cleaning::{
    apply_strum_offsets, build_strum_groups, flatten_groups, merge_and_slide, quantize_groups,
    quantize_notes, remove_short_notes, safe_tempo, sanitize_notes, split_voices, SlideParams,
};
use crate::config::{CleanConfig, QuantizeMode};
use crate::error::Result;
use crate::export::MidiExporter;
use crate::music::{KeyEstimate, TimeSignatureEstimate};
use crate::notes::{flatten, ingest, Note, Track, TrackRole, Transcription};

/// Result of one cleaning run
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedScore {
    pub guitar: Track,
    pub bass: Track,
    pub key: KeyEstimate,
    pub time_signature: TimeSignatureEstimate,
    /// Tempo in BPM, always finite and positive
    pub tempo: f64,
    pub guitar_program: u8,
    pub bass_program: u8,
}

impl CleanedScore {
    /// Both tracks, guitar first
    pub fn tracks(&self) -> [&Track; 2] {
        [&self.guitar, &self.bass]
    }

    /// Notes across both tracks
    pub fn note_count(&self) -> usize {
        self.guitar.len() + self.bass.len()
    }

    fn exporter(&self) -> MidiExporter {
        let mut exporter = MidiExporter::new();
        exporter.set_tempo(self.tempo);
        exporter.set_time_signature(self.time_signature);
        exporter.set_key(self.key);
        exporter.add_cleaned_track(&self.guitar, self.guitar_program);
        exporter.add_cleaned_track(&self.bass, self.bass_program);
        exporter
    }

    /// Serialize as a Type 1 MIDI file
    pub fn to_smf_bytes(&self) -> Vec<u8> {
        self.exporter().to_bytes()
    }

    /// Write a Type 1 MIDI file
    pub fn write_smf<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.exporter().export(path)
    }
}

/// Runs the cleaning stages with one configuration
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanConfig,
}

impl Cleaner {
    pub fn new(config: CleanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleanConfig {
        &self.config
    }

    /// Clean one transcription.
    ///
    /// Fails only on an invalid configuration or when ingestion leaves no
    /// notes at all.
    pub fn clean(&self, transcription: &Transcription) -> Result<CleanedScore> {
        let config = &self.config;
        config.validate()?;

        let notes = flatten(ingest(transcription)?);
        debug!(notes = notes.len(), "ingested");

        let tempo = self.resolve_tempo(transcription, &notes);
        let notes = self.quantize_and_group(notes, tempo);

        let merged = merge_and_slide(notes, &SlideParams::from(config));
        let notes = remove_short_notes(merged.notes, config.min_note_length);

        let split = split_voices(notes, config.bass_pitch_threshold);
        let key = estimate_key(split.bass.iter().chain(split.guitar.iter()));
        let time_signature = estimate_time_signature(split.bass.iter().chain(split.guitar.iter()));

        let guitar = Track::new(
            TrackRole::Guitar,
            sanitize_notes(split.guitar, config.safe_min_duration),
        );
        let bass = Track::new(
            TrackRole::Bass,
            sanitize_notes(split.bass, config.safe_min_duration),
        );
        let tempo = safe_tempo(tempo);

        info!(
            key = %key,
            time_signature = %time_signature,
            tempo,
            guitar = guitar.len(),
            bass = bass.len(),
            merged = merged.merged,
            slides = merged.slides,
            "cleaned transcription"
        );

        Ok(CleanedScore {
            guitar,
            bass,
            key,
            time_signature,
            tempo,
            guitar_program: config.guitar_program,
            bass_program: config.bass_program,
        })
    }

    /// Configured tempo, then the transcription's, then an estimate
    fn resolve_tempo(&self, transcription: &Transcription, notes: &[Note]) -> Option<f64> {
        let usable = |bpm: &f64| bpm.is_finite() && *bpm > 0.0;
        self.config
            .tempo
            .filter(usable)
            .or_else(|| transcription.tempo.filter(usable))
            .or_else(|| estimate_tempo(notes))
    }

    fn quantize_and_group(&self, notes: Vec<Note>, tempo: Option<f64>) -> Vec<Note> {
        let config = &self.config;
        let grid = tempo.and_then(|bpm| Grid::from_tempo(bpm, config.quantize_division));
        if tempo.is_none() && config.quantize_mode != QuantizeMode::Off {
            warn!("no tempo available, quantization skipped");
        }

        let groups = match config.quantize_mode {
            QuantizeMode::PerGroup => {
                let epsilon = grid.map_or(config.strum_epsilon, |g| g.group_window(config.strum_epsilon));
                let groups = build_strum_groups(notes, epsilon);
                quantize_groups(groups, grid)
            }
            QuantizeMode::PerNote => {
                build_strum_groups(quantize_notes(notes, grid), config.strum_epsilon)
            }
            QuantizeMode::Off => build_strum_groups(notes, config.strum_epsilon),
        };

        let groups = if config.strum_offset > 0.0 {
            apply_strum_offsets(groups, config.strum_offset, grid)
        } else {
            groups
        };

        flatten_groups(groups)
    }
}
