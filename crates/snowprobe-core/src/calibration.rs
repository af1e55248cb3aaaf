//! Removes readings logged while the operator ran the probe through its
//! reference depths to verify sensor accuracy.
//!
//! Two detectors, unioned: an authoritative counter-prefix check for
//! instruments configured to key calibration runs, and a windowed pattern
//! scan over the depth sequence for files where the keying is absent or
//! incomplete. The pattern scan deliberately over-flags short genuine
//! excursions that graze both reference bounds inside the window; losing a
//! handful of real readings is preferred over keeping calibration noise.

use tracing::info;

use crate::error::{CleaningError, Result};
use crate::record::ResolvedRecord;

/// Neighbors consulted on each side of a record.
const WINDOW_RADIUS: usize = 3;

/// A depth reading relative to the calibration reference bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundState {
    Low,
    High,
    Normal,
}

impl BoundState {
    fn classify(depth_m: f64, lower_bound: f64, upper_bound: f64) -> Self {
        if depth_m < lower_bound {
            BoundState::Low
        } else if depth_m > upper_bound {
            BoundState::High
        } else {
            BoundState::Normal
        }
    }

    fn opposite(self) -> Option<Self> {
        match self {
            BoundState::Low => Some(BoundState::High),
            BoundState::High => Some(BoundState::Low),
            BoundState::Normal => None,
        }
    }
}

/// Row counts at each detector stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationCounts {
    pub rows_in: usize,
    pub rows_after_prefix: usize,
    pub rows_after_patterns: usize,
}

impl CalibrationCounts {
    pub fn before(&self) -> usize {
        self.rows_in
    }

    pub fn after(&self) -> usize {
        self.rows_after_patterns
    }
}

/// Drop calibration artifacts from an ordered record sequence.
///
/// The pattern detector reads neighbors by position within this sequence,
/// so records must arrive in original file order and must all belong to
/// one file.
pub fn remove_calibration(
    records: Vec<ResolvedRecord>,
    prefix: &str,
    lower_bound: f64,
    upper_bound: f64,
) -> Result<(Vec<ResolvedRecord>, CalibrationCounts)> {
    if !lower_bound.is_finite() || !upper_bound.is_finite() || lower_bound >= upper_bound {
        return Err(CleaningError::Configuration {
            message: format!(
                "calibration bounds ({lower_bound}, {upper_bound}) must be finite and ordered"
            ),
        });
    }

    let rows_in = records.len();
    let keyed_out: Vec<ResolvedRecord> = records
        .into_iter()
        .filter(|record| !has_calibration_prefix(&record.counter, prefix))
        .collect();
    let rows_after_prefix = keyed_out.len();
    info!(
        rows_in,
        rows_after_prefix, "calibration counter-prefix screening complete"
    );

    let states: Vec<BoundState> = keyed_out
        .iter()
        .map(|record| BoundState::classify(record.depth_m, lower_bound, upper_bound))
        .collect();
    let filtered: Vec<ResolvedRecord> = keyed_out
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !matches_calibration_pattern(&states, *index))
        .map(|(_, record)| record)
        .collect();
    let rows_after_patterns = filtered.len();
    info!(
        rows_after_prefix,
        rows_after_patterns, "calibration pattern screening complete"
    );

    Ok((
        filtered,
        CalibrationCounts {
            rows_in,
            rows_after_prefix,
            rows_after_patterns,
        },
    ))
}

fn has_calibration_prefix(counter: &str, prefix: &str) -> bool {
    counter.trim().chars().take(2).eq(prefix.chars())
}

/// One evaluator for every calibration run shape: in either temporal
/// direction, a run of 1..=3 same-bound readings starting at `index`
/// followed immediately by the opposite bound. Covers the alternating
/// low/high, low-low-high, and low-low-low-high families and their
/// high-polarity mirrors. Neighbors past either end of the file match
/// nothing.
fn matches_calibration_pattern(states: &[BoundState], index: usize) -> bool {
    let current = states[index];
    let Some(opposite) = current.opposite() else {
        return false;
    };

    for step in [-1isize, 1] {
        'runs: for run in 1..=WINDOW_RADIUS {
            for offset in 1..run {
                match neighbor(states, index, step * offset as isize) {
                    Some(state) if state == current => {}
                    _ => continue 'runs,
                }
            }
            if neighbor(states, index, step * run as isize) == Some(opposite) {
                return true;
            }
        }
    }
    false
}

fn neighbor(states: &[BoundState], index: usize, delta: isize) -> Option<BoundState> {
    let target = index as isize + delta;
    if target < 0 {
        None
    } else {
        states.get(target as usize).copied()
    }
}
