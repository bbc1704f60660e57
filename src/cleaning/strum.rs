// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Strum group detection and string assignment.
//!
//! Notes are scanned in start order. A group stays open while each new
//! note starts within `epsilon` of the group's first note; the reference
//! is never recomputed, so a long group can span more than `epsilon`
//! between its outer members only when they are all close to the first.

use tracing::debug;

use super::quantize::Grid;
use crate::notes::{Note, StrumGroup};

/// Number of strings on the instrument
pub const STRING_COUNT: u8 = 6;

/// String for the `index`-th lowest note of a group: lowest pitch on
/// string 6, everything from the sixth note upwards on string 1.
pub fn string_for_index(index: usize) -> u8 {
    let string = STRING_COUNT as i64 - index as i64;
    string.clamp(1, STRING_COUNT as i64) as u8
}

/// Cluster notes into strum groups and annotate every member with its
/// group id and string.
pub fn build_strum_groups(mut notes: Vec<Note>, epsilon: f64) -> Vec<StrumGroup> {
    if notes.is_empty() {
        return Vec::new();
    }

    // Stable: equal starts keep their incoming order
    notes.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut groups = Vec::new();
    let mut current: Vec<Note> = Vec::new();
    let mut anchor = notes[0].start;

    for note in notes {
        if !current.is_empty() && note.start - anchor > epsilon {
            groups.push(close_group(groups.len(), anchor, std::mem::take(&mut current)));
        }
        if current.is_empty() {
            anchor = note.start;
        }
        current.push(note);
    }

    if !current.is_empty() {
        groups.push(close_group(groups.len(), anchor, current));
    }

    debug!(groups = groups.len(), "built strum groups");
    groups
}

fn close_group(id: usize, anchor_start: f64, mut notes: Vec<Note>) -> StrumGroup {
    notes.sort_by_key(|n| n.pitch);
    for (i, note) in notes.iter_mut().enumerate() {
        note.string_number = Some(string_for_index(i));
        note.group_id = Some(id);
    }
    StrumGroup {
        id,
        anchor_start,
        notes,
    }
}

/// Delay the members of each group by `step` per string so the strum is
/// audible when re-synthesized.
///
/// Offsets are kept under half a grid step, so a member never leaves the
/// grid line its anchor was snapped to. Notes that already start later
/// than their offset are left alone.
pub fn apply_strum_offsets(mut groups: Vec<StrumGroup>, step: f64, grid: Option<Grid>) -> Vec<StrumGroup> {
    if !(step.is_finite() && step > 0.0) {
        return groups;
    }

    let max_index = match grid {
        Some(grid) => {
            let half = grid.step() / 2.0;
            let n = (half / step).floor() as usize;
            if n as f64 * step >= half {
                n.saturating_sub(1)
            } else {
                n
            }
        }
        None => usize::MAX,
    };

    for group in &mut groups {
        for (i, note) in group.notes.iter_mut().enumerate() {
            let target = group.anchor_start + i.min(max_index) as f64 * step;
            if note.start < target {
                note.start = target;
                if note.end <= note.start {
                    note.end = note.start + step;
                }
            }
        }
    }

    groups
}

/// Dissolve groups back into one start-ordered collection
pub fn flatten_groups(groups: Vec<StrumGroup>) -> Vec<Note> {
    let mut notes: Vec<Note> = groups.into_iter().flat_map(|g| g.notes).collect();
    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_for_index() {
        assert_eq!(string_for_index(0), 6);
        assert_eq!(string_for_index(1), 5);
        assert_eq!(string_for_index(5), 1);
        assert_eq!(string_for_index(6), 1);
        assert_eq!(string_for_index(11), 1);
    }

    #[test]
    fn test_groups_by_epsilon() {
        let notes = vec![
            Note::new(52, 0.00, 0.5, 90),
            Note::new(40, 0.01, 0.5, 90),
            Note::new(47, 0.03, 0.5, 90),
            Note::new(60, 0.50, 1.0, 90),
        ];

        let groups = build_strum_groups(notes, 0.05);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0].anchor_start, 0.0);
        assert_eq!(groups[1].id, 1);
        assert_eq!(groups[1].anchor_start, 0.5);
    }

    #[test]
    fn test_reference_is_first_note() {
        // Each step is within epsilon of its neighbour but the third note
        // is too far from the first one.
        let notes = vec![
            Note::new(40, 0.00, 0.5, 90),
            Note::new(45, 0.03, 0.5, 90),
            Note::new(50, 0.06, 0.5, 90),
        ];

        let groups = build_strum_groups(notes, 0.05);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].notes[0].pitch, 50);
    }

    #[test]
    fn test_strings_by_ascending_pitch() {
        let notes = vec![
            Note::new(64, 0.0, 1.0, 90),
            Note::new(40, 0.0, 1.0, 90),
            Note::new(59, 0.0, 1.0, 90),
            Note::new(45, 0.0, 1.0, 90),
            Note::new(55, 0.0, 1.0, 90),
            Note::new(50, 0.0, 1.0, 90),
            Note::new(67, 0.0, 1.0, 90),
        ];

        let groups = build_strum_groups(notes, 0.05);
        assert_eq!(groups.len(), 1);
        let pitches: Vec<i32> = groups[0].notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![40, 45, 50, 55, 59, 64, 67]);
        let strings: Vec<u8> = groups[0]
            .notes
            .iter()
            .map(|n| n.string_number.unwrap())
            .collect();
        assert_eq!(strings, vec![6, 5, 4, 3, 2, 1, 1]);
        assert!(groups[0].notes.iter().all(|n| n.group_id == Some(0)));
    }

    #[test]
    fn test_empty_input() {
        assert!(build_strum_groups(Vec::new(), 0.05).is_empty());
    }

    #[test]
    fn test_strum_offsets() {
        let notes = vec![
            Note::new(40, 1.0, 2.0, 90),
            Note::new(45, 1.0, 2.0, 90),
            Note::new(50, 1.0, 2.0, 90),
        ];
        let groups = build_strum_groups(notes, 0.05);
        let groups = apply_strum_offsets(groups, 0.005, Grid::from_step(0.125));
        let starts: Vec<f64> = groups[0].notes.iter().map(|n| n.start).collect();
        assert_eq!(starts[0], 1.0);
        assert!((starts[1] - 1.005).abs() < 1e-12);
        assert!((starts[2] - 1.010).abs() < 1e-12);
    }

    #[test]
    fn test_strum_offsets_stay_inside_half_step() {
        let notes: Vec<Note> = (0..6).map(|i| Note::new(40 + i * 5, 1.0, 2.0, 90)).collect();
        let groups = build_strum_groups(notes, 0.05);
        // Half step is 0.01, so offsets stop at 0.005
        let groups = apply_strum_offsets(groups, 0.005, Grid::from_step(0.02));
        for note in &groups[0].notes {
            assert!(note.start - 1.0 < 0.01);
        }
        let grid = Grid::from_step(0.02).unwrap();
        for note in &groups[0].notes {
            assert_eq!(grid.snap(note.start), grid.snap(1.0));
        }
    }

    #[test]
    fn test_flatten_groups() {
        let notes = vec![
            Note::new(60, 0.5, 1.0, 90),
            Note::new(40, 0.0, 0.5, 90),
            Note::new(45, 0.0, 0.5, 90),
        ];
        let flat = flatten_groups(build_strum_groups(notes, 0.05));
        let pitches: Vec<i32> = flat.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![40, 45, 60]);
    }
}
