//! Pattern evolver - binary grids steered by learned neighborhood examples.
//!
//! Users label small windows ("patterns") as good or bad with a signed score.
//! Each simulation step slides a window over the whole grid, looks every
//! window up in a binary trie, sums the matching scores onto the cells each
//! window covers, and resamples the cells whose evidence falls below a
//! threshold from a noise source. Repeated steps drift the grid towards
//! configurations dominated by good neighborhoods.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and pattern types (serde-friendly)
//! - `compute`: Trie, grid, scanner, evolver, noise sources and the simulation context
//!
//! # Example
//!
//! ```rust,no_run
//! use pattern_evolver::{
//!     schema::{Pattern, SimulationConfig},
//!     compute::Simulation,
//! };
//!
//! let config = SimulationConfig::default();
//! let patterns = vec![
//!     Pattern::from_bits("010 111 010", 1).unwrap(),
//!     Pattern::from_bits("000 000 000", -1).unwrap(),
//! ];
//!
//! let mut sim = Simulation::new(config, &patterns).expect("valid configuration");
//! sim.run(100);
//!
//! let stats = sim.stats();
//! println!("Live cells after {} steps: {}", stats.step, stats.live_cells);
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{
    Accumulator, Grid, NoiseSource, PatternTrie, ScanReport, Simulation, SimulationStats,
};
pub use schema::{ConfigError, Pattern, PatternSet, SimulationConfig};
