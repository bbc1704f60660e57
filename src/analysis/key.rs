// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key estimation by profile correlation.
//!
//! A duration-weighted pitch-class histogram is correlated against every
//! rotation of the Krumhansl-Schmuckler major and minor profiles. Roots
//! are tried in ascending order, major before minor, and only a strictly
//! better score replaces the current best, so ties resolve the same way
//! on every run.

use tracing::debug;

use crate::music::{KeyEstimate, Mode, PitchClass};
use crate::notes::Note;

const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Duration-weighted pitch-class histogram, normalized to sum to 1.
///
/// Returns `None` when the notes carry no positive duration at all.
pub fn pitch_class_energy<'a, I>(notes: I) -> Option<[f64; 12]>
where
    I: IntoIterator<Item = &'a Note>,
{
    let mut energy = [0.0f64; 12];
    for note in notes {
        let duration = note.duration();
        if duration.is_finite() && duration > 0.0 {
            energy[PitchClass::of_pitch(note.pitch).index() as usize] += duration;
        }
    }

    let total: f64 = energy.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    for bin in &mut energy {
        *bin /= total;
    }
    Some(energy)
}

/// Estimate the key of a note collection. Silence estimates C major.
pub fn estimate_key<'a, I>(notes: I) -> KeyEstimate
where
    I: IntoIterator<Item = &'a Note>,
{
    let energy = match pitch_class_energy(notes) {
        Some(energy) => energy,
        None => return KeyEstimate::default(),
    };

    let mut best = f64::NEG_INFINITY;
    let mut key = KeyEstimate::default();

    for root in PitchClass::ALL {
        for (profile, mode) in [(&MAJOR_PROFILE, Mode::Major), (&MINOR_PROFILE, Mode::Minor)] {
            let rotated = rotate(profile, root.index() as usize);
            if let Some(score) = correlation(&rotated, &energy) {
                if score > best {
                    best = score;
                    key = KeyEstimate::new(root, mode);
                }
            }
        }
    }

    debug!(key = %key, score = best, "estimated key");
    key
}

/// Profile shifted so that its tonic weight lands on `root`
fn rotate(profile: &[f64; 12], root: usize) -> [f64; 12] {
    let mut out = [0.0; 12];
    for (k, slot) in out.iter_mut().enumerate() {
        *slot = profile[(k + 12 - root) % 12];
    }
    out
}

/// Pearson correlation, `None` when either side has no variance
fn correlation(a: &[f64; 12], b: &[f64; 12]) -> Option<f64> {
    let mean_a = a.iter().sum::<f64>() / 12.0;
    let mean_b = b.iter().sum::<f64>() / 12.0;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom > 0.0 && denom.is_finite() {
        Some(cov / denom)
    } else {
        None
    }
}
