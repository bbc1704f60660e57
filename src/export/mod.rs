// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export.
//!
//! Writes Type 1 files: a tempo track carrying tempo, time signature and
//! key signature, followed by one named track per instrument. Only notes
//! and program changes are written; no controllers or pitch bend.

use std::fs;
use std::io;
use std::path::Path;

use crate::music::{KeyEstimate, Mode, TimeSignatureEstimate};
use crate::notes::Track;

/// Default resolution (ticks per quarter note)
pub const DEFAULT_PPQN: u16 = 480;

/// Lowest tempo written to a file
pub const MIN_EXPORT_BPM: f64 = 20.0;
/// Highest tempo written to a file
pub const MAX_EXPORT_BPM: f64 = 300.0;

/// A track for export
#[derive(Debug, Clone)]
pub struct ExportTrack {
    /// Track name
    pub name: String,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Notes in this track
    pub notes: Vec<ExportNote>,
    /// Program change at start (None = no change)
    pub program: Option<u8>,
}

impl ExportTrack {
    /// Create a new export track
    pub fn new(name: impl Into<String>, channel: u8) -> Self {
        Self {
            name: name.into(),
            channel,
            notes: Vec::new(),
            program: None,
        }
    }

    /// Add a note
    pub fn add_note(&mut self, note: ExportNote) {
        self.notes.push(note);
    }

    /// Set program
    pub fn with_program(mut self, program: u8) -> Self {
        self.program = Some(program);
        self
    }

    /// Sort notes by tick
    pub fn sort(&mut self) {
        self.notes.sort_by_key(|n| (n.tick, n.note));
    }
}

/// A note for export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNote {
    /// Start tick
    pub tick: u64,
    /// Note number (0-127)
    pub note: u8,
    /// Velocity (1-127)
    pub velocity: u8,
    /// Duration in ticks
    pub duration: u64,
}

impl ExportNote {
    /// Create a new export note
    pub fn new(tick: u64, note: u8, velocity: u8, duration: u64) -> Self {
        Self {
            tick,
            note,
            velocity,
            duration,
        }
    }

    /// End tick
    pub fn end_tick(&self) -> u64 {
        self.tick + self.duration
    }
}

/// MIDI event for export
#[derive(Debug, Clone)]
struct MidiExportEvent {
    /// Absolute tick
    tick: u64,
    /// Ordering among events on the same tick: meta and program changes,
    /// then note-offs, then note-ons
    priority: u8,
    /// Event data
    data: Vec<u8>,
}

impl MidiExportEvent {
    fn meta(tick: u64, kind: u8, payload: &[u8]) -> Self {
        let mut data = vec![0xFF, kind];
        write_variable_length(&mut data, payload.len() as u32);
        data.extend_from_slice(payload);
        Self {
            tick,
            priority: 0,
            data,
        }
    }

    fn note_on(tick: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            tick,
            priority: 2,
            data: vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        }
    }

    fn note_off(tick: u64, channel: u8, note: u8) -> Self {
        Self {
            tick,
            priority: 1,
            data: vec![0x80 | (channel & 0x0F), note & 0x7F, 0],
        }
    }

    fn program_change(tick: u64, channel: u8, program: u8) -> Self {
        Self {
            tick,
            priority: 0,
            data: vec![0xC0 | (channel & 0x0F), program & 0x7F],
        }
    }

    fn tempo(tick: u64, bpm: f64) -> Self {
        let microseconds = (60_000_000.0 / bpm).round() as u32;
        Self::meta(
            tick,
            0x51,
            &[
                ((microseconds >> 16) & 0xFF) as u8,
                ((microseconds >> 8) & 0xFF) as u8,
                (microseconds & 0xFF) as u8,
            ],
        )
    }

    fn time_signature(tick: u64, numerator: u8, denominator: u8) -> Self {
        // Denominator is expressed as power of 2
        let denom_power = denominator.max(1).trailing_zeros() as u8;
        Self::meta(
            tick,
            0x58,
            &[
                numerator,
                denom_power,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per MIDI quarter note
            ],
        )
    }

    fn key_signature(tick: u64, key: &KeyEstimate) -> Self {
        let minor = match key.mode {
            Mode::Major => 0,
            Mode::Minor => 1,
        };
        Self::meta(tick, 0x59, &[key.accidentals() as u8, minor])
    }

    fn track_name(tick: u64, name: &str) -> Self {
        Self::meta(tick, 0x03, name.as_bytes())
    }
}

/// MIDI file exporter
#[derive(Debug, Clone)]
pub struct MidiExporter {
    /// PPQN (ticks per quarter note)
    ppqn: u16,
    /// Tempo in BPM
    tempo: f64,
    /// Time signature
    time_sig: TimeSignatureEstimate,
    /// Key signature
    key: Option<KeyEstimate>,
    /// Tracks to export
    tracks: Vec<ExportTrack>,
}

impl MidiExporter {
    /// Create a new exporter
    pub fn new() -> Self {
        Self {
            ppqn: DEFAULT_PPQN,
            tempo: 120.0,
            time_sig: TimeSignatureEstimate::default(),
            key: None,
            tracks: Vec::new(),
        }
    }

    /// Set tempo. Non-finite values are ignored.
    pub fn set_tempo(&mut self, bpm: f64) {
        if bpm.is_finite() {
            self.tempo = bpm.clamp(MIN_EXPORT_BPM, MAX_EXPORT_BPM);
        }
    }

    /// Set time signature
    pub fn set_time_signature(&mut self, time_sig: TimeSignatureEstimate) {
        self.time_sig = TimeSignatureEstimate::new(time_sig.numerator.max(1), time_sig.denominator.max(1));
    }

    /// Set key signature
    pub fn set_key(&mut self, key: KeyEstimate) {
        self.key = Some(key);
    }

    /// Add a track
    pub fn add_track(&mut self, track: ExportTrack) {
        self.tracks.push(track);
    }

    /// Convert a time in seconds to ticks at the current tempo
    pub fn seconds_to_ticks(&self, seconds: f64) -> u64 {
        let ticks = seconds * self.tempo / 60.0 * self.ppqn as f64;
        if ticks.is_finite() && ticks > 0.0 {
            ticks.round() as u64
        } else {
            0
        }
    }

    /// Convert a cleaned track to ticks and add it.
    ///
    /// Every note lasts at least one tick.
    pub fn add_cleaned_track(&mut self, track: &Track, program: u8) {
        let role = track.role;
        let mut export = ExportTrack::new(role.name(), role.channel()).with_program(program);

        for note in &track.notes {
            let tick = self.seconds_to_ticks(note.start);
            let end = self.seconds_to_ticks(note.end);
            export.add_note(ExportNote::new(
                tick,
                note.pitch.clamp(0, 127) as u8,
                note.velocity.clamp(1, 127) as u8,
                end.saturating_sub(tick).max(1),
            ));
        }

        export.sort();
        self.add_track(export);
    }

    /// Export to file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.to_bytes())
    }

    /// Export to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let num_tracks = self.tracks.len() + 1; // +1 for tempo track

        self.write_header(&mut buffer, num_tracks as u16);

        let mut tempo_events = vec![
            MidiExportEvent::track_name(0, "Tempo"),
            MidiExportEvent::tempo(0, self.tempo),
            MidiExportEvent::time_signature(0, self.time_sig.numerator, self.time_sig.denominator),
        ];
        if let Some(key) = &self.key {
            tempo_events.push(MidiExportEvent::key_signature(0, key));
        }
        write_track(&mut buffer, &tempo_events);

        for track in &self.tracks {
            let mut events = Vec::with_capacity(track.notes.len() * 2 + 2);

            events.push(MidiExportEvent::track_name(0, &track.name));

            if let Some(program) = track.program {
                events.push(MidiExportEvent::program_change(0, track.channel, program));
            }

            for note in &track.notes {
                events.push(MidiExportEvent::note_on(
                    note.tick,
                    track.channel,
                    note.note,
                    note.velocity,
                ));
                events.push(MidiExportEvent::note_off(note.end_tick(), track.channel, note.note));
            }

            events.sort_by_key(|e| (e.tick, e.priority));
            write_track(&mut buffer, &events);
        }

        buffer
    }

    /// Write MIDI file header chunk
    fn write_header(&self, buffer: &mut Vec<u8>, num_tracks: u16) {
        // MThd
        buffer.extend_from_slice(b"MThd");
        // Chunk length (always 6)
        buffer.extend_from_slice(&[0, 0, 0, 6]);
        // Format 1
        buffer.extend_from_slice(&1u16.to_be_bytes());
        // Number of tracks
        buffer.extend_from_slice(&num_tracks.to_be_bytes());
        // PPQN
        buffer.extend_from_slice(&self.ppqn.to_be_bytes());
    }
}

impl Default for MidiExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a track chunk
fn write_track(buffer: &mut Vec<u8>, events: &[MidiExportEvent]) {
    let mut track_data = Vec::new();
    let mut last_tick = 0u64;

    for event in events {
        let delta = event.tick.saturating_sub(last_tick);
        write_variable_length(&mut track_data, delta.min(0x0FFF_FFFF) as u32);
        track_data.extend_from_slice(&event.data);
        last_tick = last_tick.max(event.tick);
    }

    // End of track
    write_variable_length(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

    buffer.extend_from_slice(b"MTrk");
    buffer.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
    buffer.extend_from_slice(&track_data);
}

/// Write variable-length quantity
fn write_variable_length(buffer: &mut Vec<u8>, mut value: u32) {
    let mut bytes = Vec::with_capacity(4);

    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    buffer.extend_from_slice(&bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::PitchClass;
    use crate::notes::{Note, TrackRole};

    #[test]
    fn test_exporter_creation() {
        let exporter = MidiExporter::new();
        assert_eq!(exporter.ppqn, 480);
        assert_eq!(exporter.tempo, 120.0);
        assert_eq!(exporter.time_sig, TimeSignatureEstimate::FOUR_FOUR);
        assert!(exporter.key.is_none());
    }

    #[test]
    fn test_export_note() {
        let note = ExportNote::new(0, 60, 100, 480);
        assert_eq!(note.end_tick(), 480);
    }

    #[test]
    fn test_tempo_clamped() {
        let mut exporter = MidiExporter::new();
        exporter.set_tempo(500.0);
        assert_eq!(exporter.tempo, 300.0);
        exporter.set_tempo(5.0);
        assert_eq!(exporter.tempo, 20.0);
        exporter.set_tempo(f64::NAN);
        assert_eq!(exporter.tempo, 20.0);
    }

    #[test]
    fn test_seconds_to_ticks() {
        let exporter = MidiExporter::new();
        // 120 BPM: one quarter is half a second
        assert_eq!(exporter.seconds_to_ticks(0.5), 480);
        assert_eq!(exporter.seconds_to_ticks(1.0), 960);
        assert_eq!(exporter.seconds_to_ticks(0.0), 0);
        assert_eq!(exporter.seconds_to_ticks(-1.0), 0);
    }

    #[test]
    fn test_add_cleaned_track() {
        let mut exporter = MidiExporter::new();
        let track = Track::new(
            TrackRole::Bass,
            vec![Note::new(40, 0.0, 0.5, 90), Note::new(43, 0.5, 0.5001, 80)],
        );
        exporter.add_cleaned_track(&track, 32);

        let out = &exporter.tracks[0];
        assert_eq!(out.name, "Bass");
        assert_eq!(out.channel, 1);
        assert_eq!(out.program, Some(32));
        assert_eq!(out.notes[0], ExportNote::new(0, 40, 90, 480));
        // Sub-tick notes still last one tick
        assert_eq!(out.notes[1].duration, 1);
    }

    #[test]
    fn test_export_type1() {
        let mut exporter = MidiExporter::new();

        let mut track1 = ExportTrack::new("Track 1", 0);
        track1.add_note(ExportNote::new(0, 60, 100, 24));
        exporter.add_track(track1);

        let mut track2 = ExportTrack::new("Track 2", 1);
        track2.add_note(ExportNote::new(0, 64, 90, 24));
        exporter.add_track(track2);

        let bytes = exporter.to_bytes();

        // Check header
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(bytes[9], 1); // Format 1
        assert_eq!(&bytes[10..12], &3u16.to_be_bytes()); // 3 tracks
        assert_eq!(&bytes[12..14], &480u16.to_be_bytes()); // PPQN
        assert_eq!(&bytes[14..18], b"MTrk");
    }

    #[test]
    fn test_variable_length() {
        let mut buffer = Vec::new();

        write_variable_length(&mut buffer, 0);
        assert_eq!(buffer, vec![0x00]);

        buffer.clear();
        write_variable_length(&mut buffer, 127);
        assert_eq!(buffer, vec![0x7F]);

        buffer.clear();
        write_variable_length(&mut buffer, 128);
        assert_eq!(buffer, vec![0x81, 0x00]);

        buffer.clear();
        write_variable_length(&mut buffer, 16383);
        assert_eq!(buffer, vec![0xFF, 0x7F]);
    }

    #[test]
    fn test_tempo_event() {
        let event = MidiExportEvent::tempo(0, 120.0);
        // 120 BPM = 500000 microseconds per beat
        assert_eq!(&event.data[0..3], &[0xFF, 0x51, 0x03]);
        // 500000 = 0x07A120
        assert_eq!(&event.data[3..6], &[0x07, 0xA1, 0x20]);
    }

    #[test]
    fn test_time_signature_event() {
        let event = MidiExportEvent::time_signature(0, 6, 8);
        assert_eq!(event.data, vec![0xFF, 0x58, 0x04, 6, 3, 24, 8]);
    }

    #[test]
    fn test_key_signature_event() {
        let event = MidiExportEvent::key_signature(0, &KeyEstimate::new(PitchClass::E, Mode::Minor));
        // E minor: one sharp, minor flag set
        assert_eq!(event.data, vec![0xFF, 0x59, 0x02, 1, 1]);

        let event = MidiExportEvent::key_signature(0, &KeyEstimate::new(PitchClass::F, Mode::Major));
        assert_eq!(event.data, vec![0xFF, 0x59, 0x02, 0xFF, 0]);
    }

    #[test]
    fn test_note_off_before_note_on_on_same_tick() {
        let mut exporter = MidiExporter::new();
        let mut track = ExportTrack::new("Test", 0);
        track.add_note(ExportNote::new(0, 60, 100, 480));
        track.add_note(ExportNote::new(480, 60, 100, 480));
        exporter.add_track(track);

        let bytes = exporter.to_bytes();
        let off = bytes.windows(3).position(|w| w == [0x80, 60, 0]).unwrap();
        let second_on = bytes
            .windows(3)
            .enumerate()
            .filter(|(_, w)| *w == [0x90, 60, 100])
            .map(|(i, _)| i)
            .nth(1)
            .unwrap();
        assert!(off < second_on);
    }

    #[test]
    fn test_track_with_program() {
        let track = ExportTrack::new("Strings", 0).with_program(48);
        assert_eq!(track.program, Some(48));
    }
}
