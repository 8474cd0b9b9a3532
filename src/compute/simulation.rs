//! Simulation context - owns the grid, accumulator, active trie and noise source.
//!
//! Each step scans the current grid into the accumulator, then evolves the
//! grid from that accumulator. Pattern changes build a new trie and swap it in
//! whole, so a scan holding the previous `Arc` is never affected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::{
    ConfigError, MatchMode, NoiseKind, Pattern, PatternSource, SimulationConfig, ThresholdPolicy,
    validate_dimensions,
};

use super::{Accumulator, Grid, NoiseSource, PatternTrie, ScanReport, evolve, scan_into};

/// Simulation state and the collaborators needed to advance it.
pub struct Simulation {
    config: SimulationConfig,
    grid: Grid,
    accumulator: Accumulator,
    trie: Arc<PatternTrie>,
    noise: NoiseSource,
    last_scan: ScanReport,
    last_resampled: usize,
    step: u64,
}

/// Reject tries whose patterns do not hold `window_size²` cells.
fn check_window(window_size: usize, trie: &PatternTrie) -> Result<(), ConfigError> {
    match trie.window_len() {
        Some(pattern_len) if pattern_len != window_size * window_size => {
            Err(ConfigError::WindowMismatch {
                window_size,
                pattern_len,
            })
        }
        _ => Ok(()),
    }
}

impl Simulation {
    /// Create a simulation and seed the grid from the configured noise source.
    pub fn new(config: SimulationConfig, patterns: &[Pattern]) -> Result<Self, ConfigError> {
        config.validate()?;
        let trie = PatternTrie::build(patterns)?;
        check_window(config.window_size, &trie)?;

        let mut noise = NoiseSource::new(&config.noise, config.width, config.height);
        let grid = Grid::seeded(config.width, config.height, &mut noise);
        let accumulator = Accumulator::new(config.width, config.height);

        log::info!(
            "Simulation created: {}x{} grid, window {}, {} patterns, {} noise",
            config.width,
            config.height,
            config.window_size,
            trie.pattern_count(),
            noise.kind()
        );

        Ok(Self {
            config,
            grid,
            accumulator,
            trie: Arc::new(trie),
            noise,
            last_scan: ScanReport::default(),
            last_resampled: 0,
            step: 0,
        })
    }

    /// Create a simulation from any pattern source.
    pub fn from_source<S: PatternSource + ?Sized>(
        config: SimulationConfig,
        source: &S,
    ) -> Result<Self, ConfigError> {
        Self::new(config, &source.patterns())
    }

    /// Perform one simulation step: full scan, then evolution.
    pub fn step(&mut self) -> ScanReport {
        let trie = Arc::clone(&self.trie);
        let report = scan_into(
            &self.grid,
            &trie,
            self.config.window_size,
            self.config.match_mode,
            &mut self.accumulator,
        );
        let resampled = evolve(
            &mut self.grid,
            &self.accumulator,
            &mut self.noise,
            self.config.policy,
        );

        self.step += 1;
        self.last_scan = report;
        self.last_resampled = resampled;

        log::debug!(
            "step {}: max={} sum={} matched={}/{} resampled={}",
            self.step,
            report.max,
            report.sum,
            report.matched,
            report.anchors,
            resampled
        );
        report
    }

    /// Run simulation for specified number of steps.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Run the configured iteration count without intermediate snapshots.
    pub fn run_batch(&mut self) -> SimulationStats {
        let steps = self.config.iterations;
        log::info!("Batch run: {steps} steps");
        self.run(steps);
        SimulationStats::from_simulation(self)
    }

    /// Reseed every cell from the noise source and clear step history.
    pub fn reset(&mut self) {
        self.grid.reseed(&mut self.noise);
        self.accumulator.reset();
        self.last_scan = ScanReport::default();
        self.last_resampled = 0;
        self.step = 0;
        log::info!("Simulation reset");
    }

    /// Rebuild the trie from `patterns` and swap it in.
    ///
    /// On error the previous trie stays active.
    pub fn set_patterns(&mut self, patterns: &[Pattern]) -> Result<(), ConfigError> {
        let trie = PatternTrie::build(patterns)
            .and_then(|trie| check_window(self.config.window_size, &trie).map(|_| trie))
            .inspect_err(|e| log::warn!("Pattern rebuild rejected, keeping previous trie: {e}"))?;

        log::info!(
            "Pattern trie rebuilt: {} patterns, {} nodes",
            trie.pattern_count(),
            trie.node_count()
        );
        self.trie = Arc::new(trie);
        Ok(())
    }

    /// Rebuild the trie from a pattern source.
    pub fn rebuild_from<S: PatternSource + ?Sized>(&mut self, source: &S) -> Result<(), ConfigError> {
        self.set_patterns(&source.patterns())
    }

    /// Handle to the active trie.
    pub fn trie(&self) -> Arc<PatternTrie> {
        Arc::clone(&self.trie)
    }

    /// Replace the grid with a freshly seeded one of the given size.
    ///
    /// Zero dimensions are rejected and the current grid is kept.
    pub fn set_grid_size(&mut self, width: usize, height: usize) -> Result<(), ConfigError> {
        validate_dimensions(width, height)?;

        self.config.width = width;
        self.config.height = height;
        self.noise.resize(width, height);
        self.grid = Grid::seeded(width, height, &mut self.noise);
        self.accumulator = Accumulator::new(width, height);
        self.last_scan = ScanReport::default();
        self.last_resampled = 0;
        self.step = 0;
        log::info!("Grid resized to {width}x{height}");
        Ok(())
    }

    /// Change the window side length. Must agree with the active patterns.
    pub fn set_window_size(&mut self, window_size: usize) -> Result<(), ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        check_window(window_size, &self.trie)?;
        self.config.window_size = window_size;
        Ok(())
    }

    /// Set the number of steps run by [`Simulation::run_batch`].
    pub fn set_iteration_count(&mut self, iterations: u64) {
        self.config.iterations = iterations;
    }

    pub fn set_policy(&mut self, policy: ThresholdPolicy) {
        self.config.policy = policy;
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) {
        self.config.match_mode = mode;
    }

    /// Set the noise probability offset.
    pub fn set_noise_offset(&mut self, offset: f32) -> Result<(), ConfigError> {
        if !offset.is_finite() {
            return Err(ConfigError::InvalidOffset);
        }
        self.config.noise.offset = offset;
        self.noise.set_offset(offset);
        Ok(())
    }

    /// Select the noise variant by name; unknown names fall back to uniform.
    pub fn select_noise_variant(&mut self, name: &str) -> NoiseKind {
        let kind = self.noise.select_variant(name);
        self.config.noise.variant = kind;
        kind
    }

    /// Get configuration reference.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current cells.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Evidence computed by the last step.
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn noise(&self) -> &NoiseSource {
        &self.noise
    }

    /// Report of the last scan (max and sum of the accumulator).
    pub fn last_scan(&self) -> ScanReport {
        self.last_scan
    }

    /// Cells resampled by the last step.
    pub fn last_resampled(&self) -> usize {
        self.last_resampled
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats::from_simulation(self)
    }
}

/// Simulation statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub step: u64,
    pub width: usize,
    pub height: usize,
    pub live_cells: usize,
    pub density: f32,
    pub accumulator_max: i64,
    pub accumulator_sum: i64,
    pub matched_windows: usize,
    pub resampled_cells: usize,
}

impl SimulationStats {
    /// Compute statistics from the simulation.
    pub fn from_simulation(sim: &Simulation) -> Self {
        let grid = sim.grid();
        let live_cells = grid.live_cells();
        let density = if grid.is_empty() {
            0.0
        } else {
            live_cells as f32 / grid.len() as f32
        };
        let scan = sim.last_scan();

        Self {
            step: sim.step_count(),
            width: grid.width(),
            height: grid.height(),
            live_cells,
            density,
            accumulator_max: scan.max,
            accumulator_sum: scan.sum,
            matched_windows: scan.matched,
            resampled_cells: sim.last_resampled(),
        }
    }
}
