// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file input.
//!
//! Reads the transcription model's MIDI output into a [`Transcription`].
//! Each (track, channel) pair that carries notes becomes one instrument;
//! channel 10 is treated as drums. Controllers, pitch bend and other
//! performance data are not carried over.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::debug;

use crate::error::{CleanError, Result};
use crate::notes::{RawInstrument, RawNote, Transcription};

/// General MIDI percussion channel (zero-based)
pub const DRUM_CHANNEL: u8 = 9;

/// Microseconds per quarter note when a file has no tempo event
const DEFAULT_TEMPO_US: u32 = 500_000;

/// Read and parse a MIDI file
pub fn load_smf<P: AsRef<Path>>(path: P) -> Result<Transcription> {
    let bytes = fs::read(path)?;
    transcription_from_smf(&bytes)
}

/// Parse MIDI file bytes into a transcription
pub fn transcription_from_smf(bytes: &[u8]) -> Result<Transcription> {
    let smf = Smf::parse(bytes).map_err(|e| CleanError::MidiParse(e.to_string()))?;
    let tempo_map = TempoMap::from_smf(&smf);

    let mut instruments: BTreeMap<(usize, u8), InstrumentBuilder> = BTreeMap::new();

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut tick = 0u64;
        let mut track_name: Option<String> = None;
        let mut programs: HashMap<u8, u8> = HashMap::new();
        let mut pending: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();

        for event in track {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Meta(MetaMessage::TrackName(name)) if track_name.is_none() => {
                    let name = String::from_utf8_lossy(name).trim().to_string();
                    if !name.is_empty() {
                        track_name = Some(name);
                    }
                }
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    match message {
                        MidiMessage::ProgramChange { program } => {
                            programs.entry(channel).or_insert(program.as_int());
                        }
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            pending
                                .entry((channel, key.as_int()))
                                .or_default()
                                .push_back((tick, vel.as_int()));
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            let key = key.as_int();
                            if let Some((start, vel)) = pending.get_mut(&(channel, key)).and_then(|q| q.pop_front()) {
                                instruments
                                    .entry((track_idx, channel))
                                    .or_default()
                                    .notes
                                    .push(tempo_map.note(key, start, tick, vel));
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Close anything still sounding at the end of the track
        let mut unterminated: Vec<((u8, u8), VecDeque<(u64, u8)>)> = pending.into_iter().collect();
        unterminated.sort_by_key(|(k, _)| *k);
        for ((channel, key), starts) in unterminated {
            for (start, vel) in starts {
                instruments
                    .entry((track_idx, channel))
                    .or_default()
                    .notes
                    .push(tempo_map.note(key, start, tick, vel));
            }
        }

        for ((_, channel), builder) in instruments.range_mut((track_idx, 0)..=(track_idx, u8::MAX)) {
            builder.name = track_name.clone();
            builder.program = programs.get(channel).copied();
        }
    }

    let instruments: Vec<RawInstrument> = instruments
        .into_iter()
        .map(|((track_idx, channel), builder)| builder.build(track_idx, channel))
        .collect();

    debug!(
        instruments = instruments.len(),
        tempo = ?tempo_map.first_bpm(),
        "read MIDI file"
    );

    Ok(Transcription {
        instruments,
        tempo: tempo_map.first_bpm(),
    })
}

#[derive(Debug, Default)]
struct InstrumentBuilder {
    name: Option<String>,
    program: Option<u8>,
    notes: Vec<RawNote>,
}

impl InstrumentBuilder {
    fn build(mut self, track_idx: usize, channel: u8) -> RawInstrument {
        self.notes
            .sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
        RawInstrument {
            name: self
                .name
                .unwrap_or_else(|| format!("Track {} Channel {}", track_idx, channel + 1)),
            program: self.program.unwrap_or(0),
            is_drum: channel == DRUM_CHANNEL,
            notes: self.notes,
        }
    }
}

/// A stretch of constant tempo
#[derive(Debug, Clone, Copy)]
struct TempoSegment {
    tick: u64,
    seconds: f64,
    seconds_per_tick: f64,
}

/// Tick to seconds conversion for one file
#[derive(Debug, Clone)]
struct TempoMap {
    segments: Vec<TempoSegment>,
    first_tempo_us: Option<u32>,
}

impl TempoMap {
    fn from_smf(smf: &Smf) -> Self {
        let ppqn = match smf.header.timing {
            Timing::Metrical(ticks) => ticks.as_int().max(1) as f64,
            Timing::Timecode(fps, subframes) => {
                // Absolute time: tempo events do not affect tick length
                let ticks_per_second = fps.as_f32() as f64 * subframes.max(1) as f64;
                return Self {
                    segments: vec![TempoSegment {
                        tick: 0,
                        seconds: 0.0,
                        seconds_per_tick: 1.0 / ticks_per_second,
                    }],
                    first_tempo_us: first_tempo(smf).map(|(_, us)| us),
                };
            }
        };

        let mut changes = tempo_changes(smf);
        changes.sort_by_key(|(tick, _)| *tick);

        let mut segments = vec![TempoSegment {
            tick: 0,
            seconds: 0.0,
            seconds_per_tick: DEFAULT_TEMPO_US as f64 / 1_000_000.0 / ppqn,
        }];

        for (tick, us) in changes {
            let last = segments[segments.len() - 1];
            let seconds = last.seconds + (tick - last.tick) as f64 * last.seconds_per_tick;
            let segment = TempoSegment {
                tick,
                seconds,
                seconds_per_tick: us as f64 / 1_000_000.0 / ppqn,
            };
            if last.tick == tick {
                let idx = segments.len() - 1;
                segments[idx] = segment;
            } else {
                segments.push(segment);
            }
        }

        Self {
            segments,
            first_tempo_us: first_tempo(smf).map(|(_, us)| us),
        }
    }

    fn seconds(&self, tick: u64) -> f64 {
        let idx = self.segments.partition_point(|s| s.tick <= tick).saturating_sub(1);
        let segment = &self.segments[idx];
        segment.seconds + (tick - segment.tick) as f64 * segment.seconds_per_tick
    }

    fn note(&self, key: u8, start: u64, end: u64, vel: u8) -> RawNote {
        RawNote::new(key as i32, self.seconds(start), self.seconds(end), vel as i32)
    }

    fn first_bpm(&self) -> Option<f64> {
        self.first_tempo_us.map(|us| 60_000_000.0 / us as f64)
    }
}

/// Every usable tempo event as (absolute tick, microseconds per quarter)
fn tempo_changes(smf: &Smf) -> Vec<(u64, u32)> {
    let mut changes = Vec::new();
    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta.as_int() as u64;
            if let TrackEventKind::Meta(MetaMessage::Tempo(us)) = event.kind {
                let us = us.as_int();
                if us > 0 {
                    changes.push((tick, us));
                }
            }
        }
    }
    changes
}

fn first_tempo(smf: &Smf) -> Option<(u64, u32)> {
    let mut changes = tempo_changes(smf);
    changes.sort_by_key(|(tick, _)| *tick);
    changes.into_iter().next()
}
