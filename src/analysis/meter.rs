// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Time signature estimation from an onset-interval histogram.

use tracing::debug;

use crate::music::TimeSignatureEstimate;
use crate::notes::Note;

/// Fewer onsets than this always estimate 4/4
pub const MIN_ONSETS: usize = 10;

/// Intervals at or below this (seconds) are treated as noise
pub const NOISE_FLOOR: f64 = 0.05;

/// Estimate the time signature from note onsets.
///
/// The most common interval (to the hundredth of a second) is taken as the
/// beat. Both roundings send exact halves to the even neighbour, which
/// matters on quantized onsets where halves are common. Every interval is expressed in beats, and the most common whole
/// multiple between 2 and 12 picks the meter: 3 gives 3/4, 6 gives 6/8,
/// anything else 4/4.
pub fn estimate_time_signature<'a, I>(notes: I) -> TimeSignatureEstimate
where
    I: IntoIterator<Item = &'a Note>,
{
    let mut onsets: Vec<f64> = notes
        .into_iter()
        .map(|n| n.start)
        .filter(|s| s.is_finite())
        .collect();

    if onsets.len() < MIN_ONSETS {
        return TimeSignatureEstimate::default();
    }
    onsets.sort_by(|a, b| a.total_cmp(b));

    let intervals: Vec<f64> = onsets
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&i| i > NOISE_FLOOR)
        .collect();

    let beat_hundredths = match most_common(intervals.iter().map(|i| (i * 100.0).round_ties_even() as i64)) {
        Some(beat) if beat > 0 => beat,
        _ => return TimeSignatureEstimate::default(),
    };
    let beat = beat_hundredths as f64 / 100.0;

    let bars = intervals
        .iter()
        .map(|i| (i / beat).round_ties_even() as i64)
        .filter(|b| (2..=12).contains(b));

    let signature = match most_common(bars) {
        Some(3) => TimeSignatureEstimate::THREE_FOUR,
        Some(6) => TimeSignatureEstimate::SIX_EIGHT,
        _ => TimeSignatureEstimate::FOUR_FOUR,
    };

    debug!(beat, signature = %signature, "estimated time signature");
    signature
}

/// Most frequent value; ties go to the value seen first
fn most_common<I>(values: I) -> Option<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(i64, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
