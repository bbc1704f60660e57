// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for tabclean
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Individual cleaning stages
//! - Key and meter estimation
//! - The full pipeline including MIDI serialization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tabclean::analysis::{estimate_key, estimate_tempo, estimate_time_signature};
use tabclean::cleaning::{build_strum_groups, merge_and_slide, quantize_notes, Grid, SlideParams};
use tabclean::{Cleaner, Note, RawInstrument, RawNote, Transcription};

/// Strummed chords with timing jitter, like a transcription model's output
fn synthetic_transcription(beats: usize, seed: u64) -> Transcription {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut notes = Vec::with_capacity(beats * 5);

    for beat in 0..beats {
        let t = beat as f64 * 0.5;
        let root = 40 + rng.gen_range(0..12);
        for (i, interval) in [0, 7, 12, 16, 19].iter().enumerate() {
            let start = t + i as f64 * 0.008 + rng.gen_range(-0.01..0.01);
            let end = start + rng.gen_range(0.2..0.5);
            notes.push(RawNote::new(root + interval, start.max(0.0), end, rng.gen_range(60..110)));
        }
    }

    Transcription::new(vec![RawInstrument::new("guitar", notes)]).with_tempo(120.0)
}

fn synthetic_notes(beats: usize) -> Vec<Note> {
    synthetic_transcription(beats, 7)
        .instruments
        .into_iter()
        .flat_map(|i| i.notes)
        .map(|n| Note::new(n.pitch, n.start, n.end, n.velocity))
        .collect()
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let grid = Grid::from_tempo(120.0, 16);

    for beats in [100, 1000, 10000].iter() {
        let notes = synthetic_notes(*beats);

        group.bench_with_input(BenchmarkId::new("quantize", beats), &notes, |b, notes| {
            b.iter(|| black_box(quantize_notes(notes.clone(), grid)))
        });

        group.bench_with_input(BenchmarkId::new("strum_groups", beats), &notes, |b, notes| {
            b.iter(|| black_box(build_strum_groups(notes.clone(), 0.05)))
        });

        group.bench_with_input(BenchmarkId::new("merge_and_slide", beats), &notes, |b, notes| {
            let params = SlideParams::default();
            b.iter(|| black_box(merge_and_slide(notes.clone(), &params)))
        });
    }

    group.finish();
}

fn bench_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimation");

    for beats in [100, 1000, 10000].iter() {
        let notes = synthetic_notes(*beats);

        group.bench_with_input(BenchmarkId::new("key", beats), &notes, |b, notes| {
            b.iter(|| black_box(estimate_key(notes)))
        });

        group.bench_with_input(BenchmarkId::new("meter", beats), &notes, |b, notes| {
            b.iter(|| black_box(estimate_time_signature(notes)))
        });

        group.bench_with_input(BenchmarkId::new("tempo", beats), &notes, |b, notes| {
            b.iter(|| black_box(estimate_tempo(notes)))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let cleaner = Cleaner::default();

    for beats in [100, 1000].iter() {
        let transcription = synthetic_transcription(*beats, 42);

        group.bench_with_input(BenchmarkId::new("clean", beats), &transcription, |b, t| {
            b.iter(|| black_box(cleaner.clean(t)))
        });

        group.bench_with_input(BenchmarkId::new("clean_and_export", beats), &transcription, |b, t| {
            b.iter(|| black_box(cleaner.clean(t).map(|score| score.to_smf_bytes())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stages, bench_estimation, bench_pipeline);
criterion_main!(benches);
