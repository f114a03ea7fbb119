//! Background simulation thread, independent of the render cadence.
//!
//! The simulation and the renderer share the lattice through a single
//! coarse mutex: the simulation thread takes the lock per evolve burst, the
//! renderer takes it just long enough to copy a snapshot out. Neither side
//! waits on the other beyond that lock, and stop requests take effect
//! between whole steps, never mid-step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::lattice::{ColorCounts, Lattice, LatticeSnapshot};

/// Cloneable handle to the mutex-guarded lattice shared between the
/// simulation thread and the display loop.
#[derive(Clone)]
pub struct SharedLattice {
    inner: Arc<Mutex<Lattice>>,
}

impl SharedLattice {
    pub fn new(lattice: Lattice) -> Self {
        Self {
            inner: Arc::new(Mutex::new(lattice)),
        }
    }

    /// Advance the lattice; the lock is held for the whole burst so the
    /// grid, image, and counts stay mutually consistent.
    pub fn evolve(&self, n_steps: u64) {
        self.inner.lock().evolve(n_steps);
    }

    /// Copy out the display state under the lock. No rendering or I/O
    /// happens inside the critical section.
    pub fn snapshot(&self) -> LatticeSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation()
    }

    pub fn counts(&self) -> ColorCounts {
        self.inner.lock().counts()
    }

    /// Run a closure against the lattice under the lock, for reads beyond
    /// what the snapshot carries.
    pub fn with<R>(&self, f: impl FnOnce(&Lattice) -> R) -> R {
        f(&self.inner.lock())
    }
}

/// Drives repeated evolve steps on a dedicated thread.
pub struct LatticeRunner {
    thread: Option<JoinHandle<u64>>,
    stop: Arc<AtomicBool>,
}

impl LatticeRunner {
    /// Spawn the simulation thread. It performs `evolutions` single-step
    /// evolve calls (0 = unlimited) unless stopped first.
    pub fn spawn(lattice: SharedLattice, evolutions: u64) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            let mut completed = 0u64;
            while evolutions == 0 || completed < evolutions {
                if stop_flag.load(Ordering::Relaxed) {
                    log::info!("stop requested after {} evolutions", completed);
                    break;
                }
                lattice.evolve(1);
                completed += 1;
            }
            let generation = lattice.generation();
            log::info!("simulation thread finished at generation {}", generation);
            generation
        });

        Self {
            thread: Some(thread),
            stop,
        }
    }

    /// Request a cooperative stop. The flag is checked between iterations;
    /// an in-flight evolve call always completes.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Whether the simulation thread is still alive.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Wait for the simulation thread and return the final generation
    /// count, or `None` if it was already joined.
    pub fn join(&mut self) -> Option<u64> {
        self.thread.take().and_then(|t| t.join().ok())
    }
}

impl Drop for LatticeRunner {
    fn drop(&mut self) {
        self.stop();
        let _ = self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SizeSpec};
    use std::time::Duration;

    fn small_lattice(seed: u64) -> SharedLattice {
        let mut config = Config::default();
        config.grid.size = SizeSpec::Square(10);
        config.grid.density = 0.5;
        SharedLattice::new(Lattice::new_with_seed(&config, seed).unwrap())
    }

    #[test]
    fn test_runner_exhausts_its_budget() {
        let shared = small_lattice(1);
        let mut runner = LatticeRunner::spawn(shared.clone(), 500);
        assert_eq!(runner.join(), Some(500));
        assert_eq!(shared.generation(), 500);
        assert!(!runner.is_running());
    }

    #[test]
    fn test_unlimited_runner_stops_cooperatively() {
        let shared = small_lattice(2);
        let mut runner = LatticeRunner::spawn(shared.clone(), 0);
        thread::sleep(Duration::from_millis(50));
        assert!(runner.is_running());
        runner.stop();
        let generation = runner.join().expect("runner result");
        assert!(generation > 0);
        assert_eq!(shared.generation(), generation);
    }

    #[test]
    fn test_join_twice_returns_none() {
        let shared = small_lattice(3);
        let mut runner = LatticeRunner::spawn(shared, 10);
        assert!(runner.join().is_some());
        assert!(runner.join().is_none());
    }

    #[test]
    fn test_drop_stops_the_thread() {
        let shared = small_lattice(4);
        let runner = LatticeRunner::spawn(shared.clone(), 0);
        drop(runner);
        let generation = shared.generation();
        thread::sleep(Duration::from_millis(20));
        // No further progress once the runner is gone
        assert_eq!(shared.generation(), generation);
    }

    #[test]
    fn test_snapshot_while_running() {
        let shared = small_lattice(5);
        let mut runner = LatticeRunner::spawn(shared.clone(), 20_000);
        for _ in 0..20 {
            shared.with(|lattice| {
                let snapshot = lattice.snapshot();
                assert_eq!(snapshot.pixels.len(), 10 * 10 * 3);
                assert_eq!(snapshot.counts, lattice.counts());
                assert!(snapshot.generation <= 20_000);
            });
        }
        let _ = runner.join();
    }
}
