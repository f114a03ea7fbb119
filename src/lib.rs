//! # PETRI
//!
//! Stochastic lattice simulator of competing bacterial colonies.
//!
//! ## Features
//!
//! - **Two modes**: red-vs-blue warfare or a free-for-all of independently
//!   colored species
//! - **Live view**: a background thread evolves the lattice while the
//!   window renders it at its own cadence
//! - **Incremental**: color counts and the image buffer update per cell,
//!   never by rescans on the hot path
//! - **Reproducible**: seeded random number generation
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust
//! use petri::{Config, Lattice};
//!
//! let config = Config::default();
//! let mut lattice = Lattice::new_with_seed(&config, 42).unwrap();
//!
//! lattice.evolve(10_000);
//!
//! let counts = lattice.counts();
//! println!("red: {}, blue: {}", counts.red, counts.blue);
//! ```
//!
//! ## Shared state
//!
//! ```rust,no_run
//! use petri::{Config, Lattice, LatticeRunner, SharedLattice};
//!
//! let config = Config::default();
//! let shared = SharedLattice::new(Lattice::new(&config).unwrap());
//! let mut runner = LatticeRunner::spawn(shared.clone(), 100_000);
//!
//! // ...render shared.snapshot() at your own pace...
//!
//! runner.stop();
//! runner.join();
//! ```

pub mod config;
pub mod gui;
pub mod lattice;
pub mod runner;
pub mod species;
pub mod stats;

// Re-export main types
pub use config::{Config, ConfigError, SizeSpec};
pub use lattice::{ColorCounts, Lattice, LatticeSnapshot};
pub use runner::{LatticeRunner, SharedLattice};
pub use stats::MovingAverage;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick throughput benchmark
pub fn benchmark(steps: u64, size: usize) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.grid.size = SizeSpec::Square(size);

    let mut lattice = Lattice::new(&config)?;

    let start = Instant::now();
    lattice.evolve(steps);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        steps,
        size,
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: steps as f64 / elapsed.as_secs_f64(),
        final_counts: lattice.counts(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: u64,
    pub size: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
    pub final_counts: ColorCounts,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Grid: {}x{}", self.size, self.size)?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.0} steps/s", self.steps_per_second)?;
        writeln!(
            f,
            "Final counts: red {}, blue {}, other {}",
            self.final_counts.red, self.final_counts.blue, self.final_counts.other
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let config = Config::default();
        let mut lattice = Lattice::new_with_seed(&config, 1).unwrap();

        lattice.evolve(100);

        assert_eq!(lattice.generation(), 100);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(100, 20).unwrap();

        assert_eq!(result.steps, 100);
        assert!(result.steps_per_second > 0.0);
    }
}
