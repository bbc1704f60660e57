// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory values shared by the estimators and the writer.

pub mod key;

pub use key::{KeyEstimate, Mode, PitchClass, TimeSignatureEstimate};
