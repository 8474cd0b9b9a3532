//! Property tests for trie lookup, scanning and evolution.

use std::collections::HashMap;

use proptest::prelude::*;

use pattern_evolver::{
    compute::{Accumulator, Grid, NoiseSource, PatternTrie, anchor_count, evolve, scan},
    schema::{MatchMode, NoiseConfig, Pattern, ThresholdPolicy},
};

fn bits(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..2, len)
}

fn random_grid(w: usize, h: usize) -> impl Strategy<Value = Grid> {
    bits(w * h).prop_map(move |cells| Grid::from_cells(w, h, cells))
}

/// Any grid with any window size, including windows larger than the grid.
fn grid_strategy() -> impl Strategy<Value = (Grid, usize)> {
    (1usize..16, 1usize..16, 1usize..5)
        .prop_flat_map(|(w, h, pw)| random_grid(w, h).prop_map(move |grid| (grid, pw)))
}

/// Grids at least as large as the window in both directions.
fn covering_grid_strategy() -> impl Strategy<Value = (Grid, usize)> {
    (1usize..5)
        .prop_flat_map(|pw| (pw..16, pw..16, Just(pw)))
        .prop_flat_map(|(w, h, pw)| random_grid(w, h).prop_map(move |grid| (grid, pw)))
}

/// Any grid scanned with a 3x3 window.
fn grid_3x3_strategy() -> impl Strategy<Value = Grid> {
    (1usize..16, 1usize..16).prop_flat_map(|(w, h)| random_grid(w, h))
}

fn noise(seed: u64, width: usize, height: usize) -> NoiseSource {
    let config = NoiseConfig {
        seed: Some(seed),
        ..NoiseConfig::default()
    };
    NoiseSource::new(&config, width, height)
}

/// Every distinct window present in `grid`, scored +1.
fn all_windows(grid: &Grid, pw: usize) -> Vec<Pattern> {
    let mut window = Vec::new();
    let mut patterns = Vec::new();
    for y in 0..=grid.height() - pw {
        for x in 0..=grid.width() - pw {
            grid.window_into(x, y, pw, &mut window);
            patterns.push(Pattern::good(window.clone()));
        }
    }
    patterns
}

proptest! {
    #[test]
    fn lookup_returns_last_inserted_score(
        patterns in prop::collection::vec((bits(9), -5i32..6), 0..24),
        queries in prop::collection::vec(bits(9), 1..16),
    ) {
        let patterns: Vec<Pattern> =
            patterns.into_iter().map(|(data, score)| Pattern::new(data, score)).collect();
        let trie = PatternTrie::build(&patterns).unwrap();

        let mut expected: HashMap<Vec<u8>, i32> = HashMap::new();
        for p in &patterns {
            expected.insert(p.data.clone(), p.score);
        }

        for p in &patterns {
            prop_assert_eq!(trie.lookup(&p.data), expected[&p.data]);
            prop_assert!(trie.matches(&p.data));
        }
        for q in &queries {
            let want = expected.get(q).copied().unwrap_or(0);
            prop_assert_eq!(trie.lookup(q), want);
            prop_assert_eq!(trie.matches(q), expected.contains_key(q));
        }
    }

    #[test]
    fn anchor_count_matches_formula((grid, pw) in grid_strategy()) {
        let (w, h) = (grid.width(), grid.height());
        let expected = if w >= pw && h >= pw { (w - pw + 1) * (h - pw + 1) } else { 0 };
        prop_assert_eq!(anchor_count(w, h, pw), expected);

        let (_, report) = scan(&grid, &PatternTrie::empty(), pw, MatchMode::Scored);
        prop_assert_eq!(report.anchors, expected);

        if expected > 0 {
            // A trie holding every window in the grid matches at every anchor.
            let trie = PatternTrie::build(&all_windows(&grid, pw)).unwrap();
            let (_, report) = scan(&grid, &trie, pw, MatchMode::Membership);
            prop_assert_eq!(report.matched, expected);
        }
    }

    #[test]
    fn accumulation_is_order_independent(
        grid in grid_3x3_strategy(),
        patterns in prop::collection::vec((bits(9), -3i32..4), 1..12),
    ) {
        let pw = 3;
        let patterns: Vec<Pattern> =
            patterns.into_iter().map(|(data, score)| Pattern::new(data, score)).collect();
        let trie = PatternTrie::build(&patterns).unwrap();
        let (acc, report) = scan(&grid, &trie, pw, MatchMode::Scored);

        // Column-major, bottom-right first.
        let mut reversed = Accumulator::new(grid.width(), grid.height());
        let mut window = Vec::new();
        if grid.width() >= pw && grid.height() >= pw {
            for x in (0..=grid.width() - pw).rev() {
                for y in (0..=grid.height() - pw).rev() {
                    grid.window_into(x, y, pw, &mut window);
                    reversed.add_window(x, y, pw, trie.lookup(&window));
                }
            }
        }

        prop_assert_eq!(acc.values(), reversed.values());
        prop_assert_eq!(report.sum, reversed.sum());
        prop_assert_eq!(report.max, reversed.max());
    }

    #[test]
    fn fully_matched_grid_is_fixed_point((grid, pw) in covering_grid_strategy(), seed in any::<u64>()) {
        let trie = PatternTrie::build(&all_windows(&grid, pw)).unwrap();
        let (acc, _) = scan(&grid, &trie, pw, MatchMode::Scored);

        let mut evolved = grid.clone();
        let mut noise = noise(seed, grid.width(), grid.height());
        let resampled = evolve(&mut evolved, &acc, &mut noise, ThresholdPolicy::NonPositive);

        prop_assert_eq!(resampled, 0);
        prop_assert_eq!(evolved, grid);
    }

    #[test]
    fn stable_cells_are_never_touched(
        grid in grid_3x3_strategy(),
        patterns in prop::collection::vec((bits(9), -3i32..4), 1..12),
        seed in any::<u64>(),
        relative in any::<bool>(),
    ) {
        let pw = 3;
        let patterns: Vec<Pattern> =
            patterns.into_iter().map(|(data, score)| Pattern::new(data, score)).collect();
        let trie = PatternTrie::build(&patterns).unwrap();
        let (acc, _) = scan(&grid, &trie, pw, MatchMode::Scored);

        let policy = if relative {
            ThresholdPolicy::RelativeAverage
        } else {
            ThresholdPolicy::NonPositive
        };
        let average = acc.sum() as f64 / acc.len() as f64;

        let mut evolved = grid.clone();
        let mut noise = noise(seed, grid.width(), grid.height());
        let resampled = evolve(&mut evolved, &acc, &mut noise, policy);

        let mut unstable = 0;
        for (i, &value) in acc.values().iter().enumerate() {
            let is_unstable = match policy {
                ThresholdPolicy::NonPositive => value <= 0,
                ThresholdPolicy::RelativeAverage => (value as f64) < average / 2.0,
            };
            if is_unstable {
                unstable += 1;
            } else {
                prop_assert_eq!(evolved.cells()[i], grid.cells()[i]);
            }
        }
        prop_assert_eq!(resampled, unstable);
    }
}
