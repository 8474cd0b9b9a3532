//! Evolver: resamples cells whose accumulated evidence falls below the policy threshold.

use crate::schema::ThresholdPolicy;

use super::{Accumulator, Grid, NoiseSource};

/// Mean accumulator value per cell. An empty grid averages to 0.
#[inline]
pub fn average_evidence(sum: i64, cell_count: usize) -> f64 {
    if cell_count == 0 {
        0.0
    } else {
        sum as f64 / cell_count as f64
    }
}

/// Decide whether a cell with evidence `value` must be resampled.
///
/// `average` is only consulted by [`ThresholdPolicy::RelativeAverage`].
#[inline]
pub fn is_unstable(value: i64, policy: ThresholdPolicy, average: f64) -> bool {
    match policy {
        ThresholdPolicy::NonPositive => value <= 0,
        ThresholdPolicy::RelativeAverage => (value as f64) < average / 2.0,
    }
}

/// Apply one evolution pass, returning how many cells were resampled.
///
/// Stable cells keep their value; unstable cells get `noise.sample(x, y)`.
/// The accumulator must have been scanned from the current grid state.
pub fn evolve(
    grid: &mut Grid,
    acc: &Accumulator,
    noise: &mut NoiseSource,
    policy: ThresholdPolicy,
) -> usize {
    assert_eq!(
        (acc.width(), acc.height()),
        (grid.width(), grid.height()),
        "accumulator shape does not match grid"
    );

    let average = match policy {
        ThresholdPolicy::RelativeAverage => average_evidence(acc.sum(), acc.len()),
        ThresholdPolicy::NonPositive => 0.0,
    };

    let width = grid.width();
    let mut resampled = 0usize;
    for (i, (cell, &value)) in grid
        .cells_mut()
        .iter_mut()
        .zip(acc.values().iter())
        .enumerate()
    {
        if is_unstable(value, policy, average) {
            *cell = noise.sample(i % width, i / width);
            resampled += 1;
        }
    }
    resampled
}
