// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note cleaning stages.
//!
//! Each stage consumes a note collection and returns a new one:
//! - Strum grouping and string assignment
//! - Grid quantization, per note or per strum group
//! - Same-pitch merging and slide detection
//! - Short-note removal
//! - Bass / guitar split
//! - Range sanitization

pub mod filter;
pub mod quantize;
pub mod sanitize;
pub mod slide;
pub mod split;
pub mod strum;

pub use filter::remove_short_notes;
pub use quantize::{quantize_groups, quantize_notes, Grid};
pub use sanitize::{safe_tempo, sanitize_notes};
pub use slide::{merge_and_slide, MergeOutcome, SlideParams};
pub use split::{split_voices, VoiceSplit};
pub use strum::{apply_strum_offsets, build_strum_groups, flatten_groups};
