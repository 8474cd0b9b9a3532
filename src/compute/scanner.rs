//! Match scanner: slides the window over the grid and accumulates evidence.

use serde::{Deserialize, Serialize};

use crate::schema::MatchMode;

use super::{Accumulator, Grid, PatternTrie};

/// Summary of one scan, shared with the evolver and any display layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Number of window anchors evaluated.
    pub anchors: usize,
    /// Anchors whose window produced non-zero evidence.
    pub matched: usize,
    /// Largest accumulator entry.
    pub max: i64,
    /// Sum over all accumulator entries.
    pub sum: i64,
}

/// Number of anchors at which a `window_size` window fits inside the grid.
#[inline]
pub fn anchor_count(width: usize, height: usize, window_size: usize) -> usize {
    if window_size == 0 || width < window_size || height < window_size {
        return 0;
    }
    (width - window_size + 1) * (height - window_size + 1)
}

/// Scan `grid` into a freshly allocated accumulator.
pub fn scan(
    grid: &Grid,
    trie: &PatternTrie,
    window_size: usize,
    mode: MatchMode,
) -> (Accumulator, ScanReport) {
    let mut acc = Accumulator::new(grid.width(), grid.height());
    let report = scan_into(grid, trie, window_size, mode, &mut acc);
    (acc, report)
}

/// Scan `grid` into a pre-allocated accumulator.
///
/// The accumulator is zeroed first. Every anchor (x, y) with the window fully
/// inside the grid is evaluated; non-zero evidence is added to all cells the
/// window covers. Cells outside every full window stay at 0.
///
/// # Panics
/// Panics if the accumulator shape differs from the grid, or if the trie
/// indexes windows of a length other than `window_size²`.
pub fn scan_into(
    grid: &Grid,
    trie: &PatternTrie,
    window_size: usize,
    mode: MatchMode,
    acc: &mut Accumulator,
) -> ScanReport {
    assert_eq!(
        (acc.width(), acc.height()),
        (grid.width(), grid.height()),
        "accumulator shape does not match grid"
    );
    acc.reset();

    let anchors = anchor_count(grid.width(), grid.height(), window_size);
    let mut matched = 0usize;

    if anchors > 0 && !trie.is_empty() {
        let mut window = Vec::with_capacity(window_size * window_size);
        for y in 0..=grid.height() - window_size {
            for x in 0..=grid.width() - window_size {
                grid.window_into(x, y, window_size, &mut window);
                let score = trie.evaluate(&window, mode);
                if score != 0 {
                    acc.add_window(x, y, window_size, score);
                    matched += 1;
                }
            }
        }
    }

    let report = ScanReport {
        anchors,
        matched,
        max: acc.max(),
        sum: acc.sum(),
    };
    log::trace!(
        "scan: {}/{} windows matched, max={}, sum={}",
        report.matched,
        report.anchors,
        report.max,
        report.sum
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Pattern;

    fn scenario_a() -> PatternTrie {
        PatternTrie::build(&[Pattern::bad(vec![0; 9]), Pattern::good(vec![1; 9])]).unwrap()
    }

    #[test]
    fn test_anchor_count() {
        assert_eq!(anchor_count(5, 5, 3), 9);
        assert_eq!(anchor_count(10, 4, 3), 16);
        assert_eq!(anchor_count(2, 5, 3), 0);
        assert_eq!(anchor_count(3, 3, 3), 1);
    }

    #[test]
    fn test_scenario_b_all_zero_grid() {
        let grid = Grid::filled(5, 5, 0);
        let (acc, report) = scan(&grid, &scenario_a(), 3, MatchMode::Scored);

        assert_eq!(report.anchors, 9);
        assert_eq!(report.matched, 9);
        assert_eq!(acc.get(2, 2), -9);
        assert_eq!(acc.get(0, 0), -1);
        assert_eq!(acc.get(4, 4), -1);
        assert_eq!(acc.get(2, 0), -3);
        assert_eq!(report.max, -1);
        assert_eq!(report.sum, -81);
    }

    #[test]
    fn test_membership_mode_counts_matches() {
        let grid = Grid::filled(5, 5, 0);
        let (acc, report) = scan(&grid, &scenario_a(), 3, MatchMode::Membership);
        assert_eq!(acc.get(2, 2), 9);
        assert_eq!(report.max, 9);
        assert_eq!(report.sum, 81);
    }

    #[test]
    fn test_heavy_weights_keep_their_sign() {
        let weight = i32::MAX / 4;
        let trie = PatternTrie::build(&[Pattern::new(vec![0; 9], weight)]).unwrap();
        let grid = Grid::filled(5, 5, 0);
        let (acc, report) = scan(&grid, &trie, 3, MatchMode::Scored);

        assert_eq!(report.matched, 9);
        assert_eq!(acc.get(2, 2), 9 * i64::from(weight));
        assert_eq!(report.max, 9 * i64::from(weight));
        assert_eq!(report.sum, 81 * i64::from(weight));
        assert!(acc.values().iter().all(|&v| v > 0));

        let trie = PatternTrie::build(&[Pattern::new(vec![0; 9], -weight)]).unwrap();
        let (acc, report) = scan(&grid, &trie, 3, MatchMode::Scored);
        assert_eq!(acc.get(2, 2), -9 * i64::from(weight));
        assert_eq!(report.max, -i64::from(weight));
    }

    #[test]
    fn test_uncovered_border_stays_zero() {
        // Only the top-left 3x3 block is all ones.
        let mut grid = Grid::filled(6, 4, 0);
        for y in 0..3 {
            for x in 0..3 {
                grid.set(x, y, 1);
            }
        }
        let trie = PatternTrie::build(&[Pattern::good(vec![1; 9])]).unwrap();
        let (acc, report) = scan(&grid, &trie, 3, MatchMode::Scored);

        assert_eq!(report.anchors, 8);
        assert_eq!(report.matched, 1);
        assert_eq!(acc.get(1, 1), 1);
        assert_eq!(acc.get(3, 0), 0);
        assert_eq!(acc.get(0, 3), 0);
    }

    #[test]
    fn test_window_larger_than_grid() {
        let grid = Grid::filled(2, 2, 0);
        let (acc, report) = scan(&grid, &scenario_a(), 3, MatchMode::Scored);
        assert_eq!(report.anchors, 0);
        assert_eq!(acc.sum(), 0);
    }

    #[test]
    fn test_positional_matching() {
        // Vertical bar and horizontal bar hold the same number of ones but
        // must not match each other.
        let vertical = Pattern::good(vec![0, 1, 0, 0, 1, 0, 0, 1, 0]);
        let trie = PatternTrie::build(&[vertical]).unwrap();
        let horizontal = Grid::from_cells(3, 3, vec![0, 0, 0, 1, 1, 1, 0, 0, 0]);
        let (_, report) = scan(&horizontal, &trie, 3, MatchMode::Scored);
        assert_eq!(report.matched, 0);
    }

    #[test]
    fn test_rescan_resets_accumulator() {
        let grid = Grid::filled(5, 5, 0);
        let trie = scenario_a();
        let mut acc = Accumulator::new(5, 5);
        scan_into(&grid, &trie, 3, MatchMode::Scored, &mut acc);
        let report = scan_into(&grid, &trie, 3, MatchMode::Scored, &mut acc);
        assert_eq!(report.sum, -81);
    }
}
