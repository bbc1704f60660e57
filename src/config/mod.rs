// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for a cleaning run.
//!
//! Every option has a default, so an empty document is a valid
//! configuration. Files may be YAML or TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CleanError;

/// How note timing is snapped to the tempo grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizeMode {
    /// Leave timing untouched
    Off,
    /// Round each note's start and end independently
    PerNote,
    /// Shift whole strum groups by their quantized anchor
    PerGroup,
}

impl Default for QuantizeMode {
    fn default() -> Self {
        QuantizeMode::PerGroup
    }
}

/// Options recognized by the cleaning pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanConfig {
    /// Grid resolution (16 = sixteenth notes)
    #[serde(default = "default_quantize_division")]
    pub quantize_division: u32,
    #[serde(default)]
    pub quantize_mode: QuantizeMode,
    /// Tempo in BPM. Overrides the transcription's tempo and the estimate.
    #[serde(default)]
    pub tempo: Option<f64>,
    /// Notes shorter than this (seconds) are dropped after merging
    #[serde(default = "default_min_note_length")]
    pub min_note_length: f64,
    /// Same-pitch re-triggers within this gap (seconds) are merged
    #[serde(default = "default_merge_gap")]
    pub merge_gap: f64,
    /// Notes starting within this window of a group's first note share the group
    #[serde(default = "default_strum_epsilon")]
    pub strum_epsilon: f64,
    /// Cosmetic per-string delay inside a strum (seconds, 0 = off)
    #[serde(default)]
    pub strum_offset: f64,
    /// Largest silence (seconds) bridged by a slide
    #[serde(default = "default_slide_max_gap")]
    pub slide_max_gap: f64,
    /// Largest overlap (seconds) still treated as a slide
    #[serde(default = "default_slide_max_overlap")]
    pub slide_max_overlap: f64,
    /// Largest interval (semitones) treated as a slide
    #[serde(default = "default_slide_max_pitch_diff")]
    pub slide_max_pitch_diff: i32,
    /// Velocity factor applied to the second note of a slide
    #[serde(default = "default_slide_velocity_scale")]
    pub slide_velocity_scale: f64,
    /// Pitches at or below go to the bass track
    #[serde(default = "default_bass_pitch_threshold")]
    pub bass_pitch_threshold: i32,
    /// Minimum duration enforced by the sanitizer (seconds)
    #[serde(default = "default_safe_min_duration")]
    pub safe_min_duration: f64,
    /// Guitar program, zero-based General MIDI
    #[serde(default = "default_guitar_program")]
    pub guitar_program: u8,
    /// Bass program, zero-based General MIDI
    #[serde(default = "default_bass_program")]
    pub bass_program: u8,
}

fn default_quantize_division() -> u32 {
    16
}
fn default_min_note_length() -> f64 {
    0.04
}
fn default_merge_gap() -> f64 {
    0.05
}
fn default_strum_epsilon() -> f64 {
    0.05
}
fn default_slide_max_gap() -> f64 {
    0.08
}
fn default_slide_max_overlap() -> f64 {
    0.03
}
fn default_slide_max_pitch_diff() -> i32 {
    4
}
fn default_slide_velocity_scale() -> f64 {
    0.8
}
fn default_bass_pitch_threshold() -> i32 {
    52 // E3
}
fn default_safe_min_duration() -> f64 {
    0.02
}
fn default_guitar_program() -> u8 {
    25 // Acoustic Guitar (steel)
}
fn default_bass_program() -> u8 {
    32 // Acoustic Bass
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            quantize_division: default_quantize_division(),
            quantize_mode: QuantizeMode::default(),
            tempo: None,
            min_note_length: default_min_note_length(),
            merge_gap: default_merge_gap(),
            strum_epsilon: default_strum_epsilon(),
            strum_offset: 0.0,
            slide_max_gap: default_slide_max_gap(),
            slide_max_overlap: default_slide_max_overlap(),
            slide_max_pitch_diff: default_slide_max_pitch_diff(),
            slide_velocity_scale: default_slide_velocity_scale(),
            bass_pitch_threshold: default_bass_pitch_threshold(),
            safe_min_duration: default_safe_min_duration(),
            guitar_program: default_guitar_program(),
            bass_program: default_bass_program(),
        }
    }
}

impl CleanConfig {
    /// Load a configuration file. `.toml` files are read as TOML,
    /// anything else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };

        config
            .validate()
            .with_context(|| format!("Rejected config file: {:?}", path))?;
        Ok(config)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Check that every option is usable
    pub fn validate(&self) -> std::result::Result<(), CleanError> {
        if self.quantize_division == 0 {
            return Err(invalid("quantize_division must be at least 1"));
        }

        let windows = [
            ("min_note_length", self.min_note_length),
            ("merge_gap", self.merge_gap),
            ("strum_epsilon", self.strum_epsilon),
            ("strum_offset", self.strum_offset),
            ("slide_max_gap", self.slide_max_gap),
            ("slide_max_overlap", self.slide_max_overlap),
            ("safe_min_duration", self.safe_min_duration),
        ];
        for (name, value) in windows {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(&format!("{} must be a finite, non-negative number of seconds", name)));
            }
        }

        if let Some(tempo) = self.tempo {
            if !tempo.is_finite() || tempo <= 0.0 {
                return Err(invalid("tempo must be a positive number of BPM"));
            }
        }

        if self.slide_max_pitch_diff < 0 {
            return Err(invalid("slide_max_pitch_diff must not be negative"));
        }

        if !(0.0..=1.0).contains(&self.slide_velocity_scale) {
            return Err(invalid("slide_velocity_scale must be within 0.0-1.0"));
        }

        if !(0..=127).contains(&self.bass_pitch_threshold) {
            return Err(invalid("bass_pitch_threshold must be a MIDI pitch (0-127)"));
        }

        if self.guitar_program > 127 || self.bass_program > 127 {
            return Err(invalid("programs must be within 0-127"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> CleanError {
    CleanError::InvalidConfig(msg.to_string())
}
