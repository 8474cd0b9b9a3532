//! WebAssembly bindings for pattern-evolver.
//!
//! Provides a thin wrapper around `Simulation` for browser environments. The
//! page drives stepping from its own animation timer; `setRunning` only
//! records whether that timer should keep calling `tick`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    compute::{Simulation, SimulationStats},
    schema::{PatternSet, SimulationConfig},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{context}: {e}"))
}

/// WebAssembly wrapper for the simulation context.
#[wasm_bindgen]
pub struct WasmSimulation {
    simulation: Simulation,
    running: bool,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Create new simulation from JSON configuration and pattern set.
    ///
    /// # Arguments
    /// * `config_json` - JSON string containing SimulationConfig
    /// * `patterns_json` - JSON string containing PatternSet
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, patterns_json: &str) -> Result<WasmSimulation, JsValue> {
        let config: SimulationConfig =
            serde_json::from_str(config_json).map_err(|e| js_error("Invalid config JSON", e))?;
        let patterns: PatternSet = serde_json::from_str(patterns_json)
            .map_err(|e| js_error("Invalid patterns JSON", e))?;

        let simulation = Simulation::from_source(config, &patterns)
            .map_err(|e| js_error("Invalid configuration", e))?;

        Ok(WasmSimulation {
            simulation,
            running: false,
        })
    }

    /// Start or stop the page-driven timer.
    #[wasm_bindgen(js_name = setRunning)]
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Timer callback: step once if running. Returns whether a step happened.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> bool {
        if self.running {
            self.simulation.step();
        }
        self.running
    }

    /// Stop the timer and perform one simulation step.
    #[wasm_bindgen]
    pub fn step(&mut self) {
        self.running = false;
        self.simulation.step();
    }

    /// Run multiple simulation steps.
    #[wasm_bindgen]
    pub fn run(&mut self, steps: u64) {
        self.simulation.run(steps);
    }

    /// Run the configured iteration count and return statistics.
    #[wasm_bindgen(js_name = runBatch)]
    pub fn run_batch(&mut self) -> Result<JsValue, JsValue> {
        let stats = self.simulation.run_batch();
        serde_wasm_bindgen::to_value(&stats).map_err(|e| js_error("Serialization error", e))
    }

    /// Reseed every cell from the noise source.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.simulation.reset();
    }

    /// Replace the pattern set. On error the previous patterns stay active.
    #[wasm_bindgen(js_name = setPatterns)]
    pub fn set_patterns(&mut self, patterns_json: &str) -> Result<(), JsValue> {
        let patterns: PatternSet = serde_json::from_str(patterns_json)
            .map_err(|e| js_error("Invalid patterns JSON", e))?;
        self.simulation
            .rebuild_from(&patterns)
            .map_err(|e| js_error("Invalid patterns", e))
    }

    #[wasm_bindgen(js_name = setGridSize)]
    pub fn set_grid_size(&mut self, width: usize, height: usize) -> Result<(), JsValue> {
        self.simulation
            .set_grid_size(width, height)
            .map_err(|e| js_error("Invalid grid size", e))
    }

    #[wasm_bindgen(js_name = setWindowSize)]
    pub fn set_window_size(&mut self, window_size: usize) -> Result<(), JsValue> {
        self.simulation
            .set_window_size(window_size)
            .map_err(|e| js_error("Invalid window size", e))
    }

    #[wasm_bindgen(js_name = setIterationCount)]
    pub fn set_iteration_count(&mut self, iterations: u64) {
        self.simulation.set_iteration_count(iterations);
    }

    #[wasm_bindgen(js_name = setNoiseOffset)]
    pub fn set_noise_offset(&mut self, offset: f32) -> Result<(), JsValue> {
        self.simulation
            .set_noise_offset(offset)
            .map_err(|e| js_error("Invalid noise offset", e))
    }

    /// Select noise by name ("uniform" or "gradient"). Returns the variant in effect.
    #[wasm_bindgen(js_name = selectNoiseVariant)]
    pub fn select_noise_variant(&mut self, name: &str) -> String {
        self.simulation.select_noise_variant(name).to_string()
    }

    /// Current cells, row-major.
    #[wasm_bindgen(js_name = getCells)]
    pub fn get_cells(&self) -> Vec<u8> {
        self.simulation.grid().cells().to_vec()
    }

    /// Accumulator of the last step, row-major.
    #[wasm_bindgen(js_name = getAccumulator)]
    pub fn get_accumulator(&self) -> Vec<i64> {
        self.simulation.accumulator().values().to_vec()
    }

    /// Get current simulation state as JSON.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        let scan = self.simulation.last_scan();
        let snapshot = StateSnapshot {
            cells: self.simulation.grid().cells(),
            accumulator: self.simulation.accumulator().values(),
            width: self.simulation.grid().width(),
            height: self.simulation.grid().height(),
            accumulator_max: scan.max,
            accumulator_sum: scan.sum,
            step: self.simulation.step_count(),
        };

        serde_wasm_bindgen::to_value(&snapshot).map_err(|e| js_error("Serialization error", e))
    }

    /// Get simulation statistics as JSON.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        let stats = SimulationStats::from_simulation(&self.simulation);
        serde_wasm_bindgen::to_value(&stats).map_err(|e| js_error("Serialization error", e))
    }

    /// Get current step count.
    #[wasm_bindgen(js_name = getStep)]
    pub fn get_step(&self) -> u64 {
        self.simulation.step_count()
    }

    /// Get grid width.
    #[wasm_bindgen(js_name = getWidth)]
    pub fn get_width(&self) -> usize {
        self.simulation.grid().width()
    }

    /// Get grid height.
    #[wasm_bindgen(js_name = getHeight)]
    pub fn get_height(&self) -> usize {
        self.simulation.grid().height()
    }
}

/// Serializable snapshot of simulation state.
#[derive(Serialize)]
struct StateSnapshot<'a> {
    cells: &'a [u8],
    accumulator: &'a [i64],
    width: usize,
    height: usize,
    accumulator_max: i64,
    accumulator_sum: i64,
    step: u64,
}
