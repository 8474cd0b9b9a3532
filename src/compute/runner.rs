//! Fixed-rate runner driving a shared simulation from a background thread.
//!
//! Steps and control calls go through one mutex, so a step never overlaps
//! another step, a reset or a resize. Stopping only ends the timer loop; a
//! step already in progress finishes normally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{ScanReport, Simulation};

/// Periodic driver with start/stop/step controls.
pub struct SimulationRunner {
    simulation: Arc<Mutex<Simulation>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

fn lock(simulation: &Mutex<Simulation>) -> MutexGuard<'_, Simulation> {
    simulation.lock().unwrap_or_else(|e| e.into_inner())
}

impl SimulationRunner {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation: Arc::new(Mutex::new(simulation)),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start stepping at the configured tick rate. No-op when already running.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        // A loop that ended on its own (after a panic) is reaped before respawning.
        self.join_loop();

        let interval = lock(&self.simulation).config().tick_interval();
        let interval = match interval {
            Ok(interval) => interval,
            Err(e) => {
                log::warn!("Runner not started: {}", e);
                self.running.store(false, Ordering::Release);
                return;
            }
        };
        log::info!("Runner started ({:?} per step)", interval);

        let simulation = Arc::clone(&self.simulation);
        self.handle = Some(spawn_ticker(Arc::clone(&self.running), interval, move || {
            lock(&simulation).step();
        }));
    }

    /// Stop the timer and wait for the loop to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if self.join_loop() {
            log::info!("Runner stopped");
        }
    }

    fn join_loop(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        if handle.join().is_err() {
            log::warn!("Runner thread panicked");
        }
        true
    }

    /// Flip between running and stopped. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }

    /// Stop the timer, then perform exactly one step.
    pub fn step(&mut self) -> ScanReport {
        self.stop();
        let report = lock(&self.simulation).step();
        log::info!("manual step: max={} sum={}", report.max, report.sum);
        report
    }

    /// Run `f` with exclusive access to the simulation, between steps.
    pub fn with<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> R {
        f(&mut lock(&self.simulation))
    }

    /// Shared handle for readers such as a render loop.
    pub fn simulation(&self) -> Arc<Mutex<Simulation>> {
        Arc::clone(&self.simulation)
    }
}

/// Clears the running flag when the timer loop exits, including by panic.
struct ClearOnExit(Arc<AtomicBool>);

impl Drop for ClearOnExit {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Call `tick` every `interval` until `running` is cleared.
fn spawn_ticker(
    running: Arc<AtomicBool>,
    interval: Duration,
    mut tick: impl FnMut() + Send + 'static,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _guard = ClearOnExit(Arc::clone(&running));
        while running.load(Ordering::Acquire) {
            let started = Instant::now();
            tick();
            thread::sleep(interval.saturating_sub(started.elapsed()));
        }
    })
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
