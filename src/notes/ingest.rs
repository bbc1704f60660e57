// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Ingestion of raw transcription output.
//!
//! Turns the audio-to-notes model's per-instrument note lists into
//! validated [`Note`]s: degenerate and duplicate notes are dropped,
//! drum instruments are skipped, and each instrument is sorted by start.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::note::Note;
use crate::error::{CleanError, Result};

/// A note exactly as the transcription model produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawNote {
    pub pitch: i32,
    pub start: f64,
    pub end: f64,
    #[serde(default = "default_velocity")]
    pub velocity: i32,
}

fn default_velocity() -> i32 {
    80
}

impl RawNote {
    pub fn new(pitch: i32, start: f64, end: f64, velocity: i32) -> Self {
        Self {
            pitch,
            start,
            end,
            velocity,
        }
    }
}

/// One instrument of the transcription
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawInstrument {
    #[serde(default)]
    pub name: String,
    /// General MIDI program (0-127)
    #[serde(default)]
    pub program: u8,
    #[serde(default)]
    pub is_drum: bool,
    #[serde(default)]
    pub notes: Vec<RawNote>,
}

impl RawInstrument {
    /// Create a pitched instrument
    pub fn new(name: impl Into<String>, notes: Vec<RawNote>) -> Self {
        Self {
            name: name.into(),
            program: 0,
            is_drum: false,
            notes,
        }
    }

    /// Create a drum instrument
    pub fn drums(name: impl Into<String>, notes: Vec<RawNote>) -> Self {
        Self {
            is_drum: true,
            ..Self::new(name, notes)
        }
    }
}

/// The whole input document of one cleaning run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub instruments: Vec<RawInstrument>,
    /// Tempo in BPM, if the producer knows it
    #[serde(default)]
    pub tempo: Option<f64>,
}

impl Transcription {
    pub fn new(instruments: Vec<RawInstrument>) -> Self {
        Self {
            instruments,
            tempo: None,
        }
    }

    /// Attach a tempo estimate
    pub fn with_tempo(mut self, bpm: f64) -> Self {
        self.tempo = Some(bpm);
        self
    }

    /// Total raw notes across all instruments
    pub fn note_count(&self) -> usize {
        self.instruments.iter().map(|i| i.notes.len()).sum()
    }

    /// Parse a transcription from a YAML (or JSON) string
    pub fn from_yaml(yaml: &str) -> AnyResult<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse transcription")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> AnyResult<String> {
        serde_yaml::to_string(self).context("Failed to serialize transcription to YAML")
    }

    /// Load a transcription document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> AnyResult<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read transcription: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }
}

/// Notes of one instrument that survived ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedInstrument {
    pub name: String,
    pub program: u8,
    /// Sorted by start time
    pub notes: Vec<Note>,
}

/// Validate and normalize a transcription.
///
/// Fails with [`CleanError::EmptyTranscription`] when no instrument keeps
/// a single note.
pub fn ingest(transcription: &Transcription) -> Result<Vec<IngestedInstrument>> {
    let mut instruments = Vec::new();

    for raw in &transcription.instruments {
        if raw.is_drum {
            debug!(instrument = %raw.name, notes = raw.notes.len(), "skipping drum instrument");
            continue;
        }

        let notes = normalize_notes(&raw.notes);
        let dropped = raw.notes.len() - notes.len();
        if dropped > 0 {
            debug!(instrument = %raw.name, dropped, "dropped degenerate or duplicate notes");
        }

        if notes.is_empty() {
            continue;
        }

        instruments.push(IngestedInstrument {
            name: raw.name.clone(),
            program: raw.program,
            notes,
        });
    }

    if instruments.is_empty() {
        return Err(CleanError::EmptyTranscription);
    }

    Ok(instruments)
}

/// Drop degenerate notes and `(start to the millisecond, pitch)` duplicates,
/// keeping the first occurrence, then sort by start.
fn normalize_notes(raw: &[RawNote]) -> Vec<Note> {
    let mut seen: HashSet<(i64, i32)> = HashSet::new();
    let mut notes = Vec::with_capacity(raw.len());

    for n in raw {
        if !n.start.is_finite() || !n.end.is_finite() || n.end <= n.start {
            continue;
        }

        let key = ((n.start * 1000.0).round_ties_even() as i64, n.pitch);
        if !seen.insert(key) {
            continue;
        }

        notes.push(Note::new(n.pitch, n.start, n.end, n.velocity));
    }

    // Stable: equal starts keep input order
    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    notes
}

/// Flatten ingested instruments into one start-sorted collection
pub fn flatten(instruments: Vec<IngestedInstrument>) -> Vec<Note> {
    let mut notes: Vec<Note> = instruments.into_iter().flat_map(|i| i.notes).collect();
    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_degenerate_notes() {
        let t = Transcription::new(vec![RawInstrument::new(
            "piano",
            vec![
                RawNote::new(60, 1.0, 1.0, 90),
                RawNote::new(62, 1.0, 0.5, 90),
                RawNote::new(64, f64::NAN, 2.0, 90),
                RawNote::new(65, 0.0, 0.5, 90),
            ],
        )]);

        let out = ingest(&t).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].notes.len(), 1);
        assert_eq!(out[0].notes[0].pitch, 65);
    }

    #[test]
    fn test_deduplicates_by_millisecond_and_pitch() {
        let t = Transcription::new(vec![RawInstrument::new(
            "piano",
            vec![
                RawNote::new(60, 1.0001, 1.5, 90),
                RawNote::new(60, 1.0002, 1.8, 70),
                RawNote::new(64, 1.0001, 1.5, 90),
                RawNote::new(60, 1.002, 1.5, 90),
            ],
        )]);

        let out = ingest(&t).unwrap();
        let notes = &out[0].notes;
        assert_eq!(notes.len(), 3);
        // First occurrence wins
        assert_eq!(notes[0].pitch, 60);
        assert_eq!(notes[0].velocity, 90);
        assert_eq!(notes[0].end, 1.5);
    }

    #[test]
    fn test_dedup_half_millisecond_rounds_to_even() {
        // 62.5 ms rounds to 62 and collides with the note at 62 ms
        let t = Transcription::new(vec![RawInstrument::new(
            "piano",
            vec![
                RawNote::new(60, 0.062, 0.5, 90),
                RawNote::new(60, 0.0625, 0.5, 70),
            ],
        )]);

        let out = ingest(&t).unwrap();
        assert_eq!(out[0].notes.len(), 1);
        assert_eq!(out[0].notes[0].velocity, 90);
    }

    #[test]
    fn test_skips_drums_and_empty_instruments() {
        let t = Transcription::new(vec![
            RawInstrument::drums("kit", vec![RawNote::new(36, 0.0, 0.1, 100)]),
            RawInstrument::new("empty", vec![]),
            RawInstrument::new("guitar", vec![RawNote::new(64, 0.0, 0.5, 100)]),
        ]);

        let out = ingest(&t).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "guitar");
    }

    #[test]
    fn test_sorted_by_start() {
        let t = Transcription::new(vec![RawInstrument::new(
            "guitar",
            vec![
                RawNote::new(64, 2.0, 2.5, 100),
                RawNote::new(60, 0.5, 1.0, 100),
                RawNote::new(62, 1.0, 1.5, 100),
            ],
        )]);

        let out = ingest(&t).unwrap();
        let starts: Vec<f64> = out[0].notes.iter().map(|n| n.start).collect();
        assert_eq!(starts, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_empty_transcription() {
        let t = Transcription::new(vec![
            RawInstrument::drums("kit", vec![RawNote::new(36, 0.0, 0.1, 100)]),
            RawInstrument::new("bad", vec![RawNote::new(60, 1.0, 0.9, 100)]),
        ]);
        assert!(matches!(ingest(&t), Err(CleanError::EmptyTranscription)));
        assert!(matches!(
            ingest(&Transcription::default()),
            Err(CleanError::EmptyTranscription)
        ));
    }

    #[test]
    fn test_flatten_merges_instruments() {
        let t = Transcription::new(vec![
            RawInstrument::new("a", vec![RawNote::new(40, 1.0, 2.0, 90)]),
            RawInstrument::new("b", vec![RawNote::new(70, 0.5, 1.0, 90)]),
        ]);
        let notes = flatten(ingest(&t).unwrap());
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].pitch, 70);
        assert_eq!(notes[1].pitch, 40);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
tempo: 96
instruments:
  - name: "Piano"
    program: 0
    notes:
      - { pitch: 60, start: 0.0, end: 0.5, velocity: 90 }
      - { pitch: 64, start: 0.5, end: 1.0 }
  - name: "Drums"
    is_drum: true
    notes:
      - { pitch: 36, start: 0.0, end: 0.1, velocity: 110 }
"#;
        let t = Transcription::from_yaml(yaml).unwrap();
        assert_eq!(t.tempo, Some(96.0));
        assert_eq!(t.instruments.len(), 2);
        assert_eq!(t.instruments[0].notes[1].velocity, 80);
        assert!(t.instruments[1].is_drum);
        assert_eq!(t.note_count(), 3);
    }
}
