//! Compute module - Matching, accumulation and evolution for pattern-evolver.

mod evolver;
mod grid;
mod noise;
mod scanner;
mod simulation;
mod trie;

#[cfg(not(target_arch = "wasm32"))]
mod runner;

pub use evolver::*;
pub use grid::*;
pub use noise::*;
pub use scanner::*;
pub use simulation::*;
pub use trie::*;

#[cfg(not(target_arch = "wasm32"))]
pub use runner::*;
