// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tempo estimation from inter-onset intervals.

use tracing::debug;

use crate::notes::Note;

/// Intervals closer than this to a cluster's mean join the cluster
pub const CLUSTER_WIDTH: f64 = 0.025;

/// Shortest interval considered (seconds)
pub const MIN_INTERVAL: f64 = 0.05;

/// Longest interval considered (seconds)
pub const MAX_INTERVAL: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
struct Cluster {
    mean: f64,
    count: usize,
}

/// Estimate a tempo in BPM from note onsets.
///
/// Returns `None` with fewer than two distinct onsets or when no interval
/// falls in the usable range.
pub fn estimate_tempo<'a, I>(notes: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Note>,
{
    let mut onsets: Vec<f64> = notes
        .into_iter()
        .map(|n| n.start)
        .filter(|s| s.is_finite())
        .collect();
    onsets.sort_by(|a, b| a.total_cmp(b));
    onsets.dedup();

    if onsets.len() < 2 {
        return None;
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    for w in onsets.windows(2) {
        let interval = w[1] - w[0];
        if !(MIN_INTERVAL..MAX_INTERVAL).contains(&interval) {
            continue;
        }

        let mut nearest: Option<(usize, f64)> = None;
        for (idx, cluster) in clusters.iter().enumerate() {
            let distance = (cluster.mean - interval).abs();
            if distance < CLUSTER_WIDTH && nearest.map_or(true, |(_, d)| distance < d) {
                nearest = Some((idx, distance));
            }
        }

        match nearest {
            Some((idx, _)) => {
                let cluster = &mut clusters[idx];
                cluster.count += 1;
                cluster.mean += (interval - cluster.mean) / cluster.count as f64;
            }
            None => clusters.push(Cluster {
                mean: interval,
                count: 1,
            }),
        }
    }

    let mut best: Option<Cluster> = None;
    for cluster in clusters {
        if best.map_or(true, |b| cluster.count > b.count) {
            best = Some(cluster);
        }
    }

    let bpm = 60.0 / best?.mean;
    debug!(bpm, "estimated tempo");
    Some(bpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(interval: f64, count: usize) -> Vec<Note> {
        (0..count)
            .map(|i| {
                let t = i as f64 * interval;
                Note::new(60, t, t + interval / 2.0, 90)
            })
            .collect()
    }

    #[test]
    fn test_steady_pulse() {
        let bpm = estimate_tempo(&pulse(0.5, 16)).unwrap();
        assert!((bpm - 120.0).abs() < 1e-9);

        let bpm = estimate_tempo(&pulse(0.6, 16)).unwrap();
        assert!((bpm - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_absorbed() {
        let notes: Vec<Note> = (0..20)
            .map(|i| {
                let jitter = if i % 2 == 0 { 0.005 } else { -0.005 };
                let t = i as f64 * 0.5 + jitter;
                Note::new(60, t, t + 0.2, 90)
            })
            .collect();
        let bpm = estimate_tempo(&notes).unwrap();
        assert!((bpm - 120.0).abs() < 1.0);
    }

    #[test]
    fn test_chord_onsets_counted_once() {
        let mut notes = pulse(0.5, 8);
        notes.extend(pulse(0.5, 8).into_iter().map(|mut n| {
            n.pitch = 64;
            n
        }));
        let bpm = estimate_tempo(&notes).unwrap();
        assert!((bpm - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_most_populated_cluster_wins() {
        let mut starts = vec![0.0];
        let mut t = 0.0;
        for i in 0..12 {
            t += if i % 4 == 3 { 1.0 } else { 0.4 };
            starts.push(t);
        }
        let notes: Vec<Note> = starts.iter().map(|&s| Note::new(60, s, s + 0.1, 90)).collect();
        let bpm = estimate_tempo(&notes).unwrap();
        assert!((bpm - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_not_enough_onsets() {
        assert!(estimate_tempo(&Vec::<Note>::new()).is_none());
        assert!(estimate_tempo(&pulse(0.5, 1)).is_none());
        // Same onset twice is still one onset
        let notes = vec![Note::new(60, 1.0, 2.0, 90), Note::new(64, 1.0, 2.0, 90)];
        assert!(estimate_tempo(&notes).is_none());
    }

    #[test]
    fn test_out_of_range_intervals() {
        let notes = vec![Note::new(60, 0.0, 0.5, 90), Note::new(60, 5.0, 5.5, 90)];
        assert!(estimate_tempo(&notes).is_none());
    }
}
