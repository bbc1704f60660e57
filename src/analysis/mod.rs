// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Musical structure inference.
//!
//! Estimators only read notes. They are deterministic for a given input
//! and hold no state between calls.

pub mod key;
pub mod meter;
pub mod tempo;

pub use key::{estimate_key, pitch_class_energy};
pub use meter::estimate_time_signature;
pub use tempo::estimate_tempo;
