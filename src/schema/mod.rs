//! Schema module - Configuration and pattern types for pattern-evolver simulations.

mod config;
mod pattern;

pub use config::*;
pub use pattern::*;
