//! petri - CLI entry point
//!
//! Stochastic lattice simulator of competing bacterial colonies.

use clap::{Parser, Subcommand};
use petri::{benchmark, Config, Lattice, LatticeRunner, MovingAverage, SharedLattice, SizeSpec};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

/// Samples retained for the headless throughput readout
const RATE_WINDOW: usize = 20;

#[derive(Parser)]
#[command(name = "petri")]
#[command(version)]
#[command(about = "Stochastic lattice simulator of competing bacterial colonies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Grid side length (overrides the config file)
        #[arg(short, long)]
        size: Option<usize>,

        /// Number of evolutions; 0 runs until interrupted
        #[arg(short = 'e', long)]
        evolutions: Option<u64>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (no progress lines)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Open the live viewer
    Gui {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Grid side length (overrides the config file)
        #[arg(short, long)]
        size: Option<usize>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a performance benchmark
    Benchmark {
        /// Number of steps
        #[arg(short, long, default_value = "1000000")]
        steps: u64,

        /// Grid side length
        #[arg(long, default_value = "100")]
        size: usize,
    },

    /// Generate a default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            size,
            evolutions,
            seed,
            quiet,
        } => run_simulation(config, size, evolutions, seed, quiet),

        Commands::Gui { config, size, seed } => {
            let config = load_config(&config, size, seed)?;
            petri::gui::run_gui(config)
        }

        Commands::Benchmark { steps, size } => run_benchmark(steps, size),

        Commands::Init { output } => generate_config(output),
    }
}

/// Load the configuration file if present, falling back to defaults, and
/// apply command-line overrides.
fn load_config(
    path: &PathBuf,
    size: Option<usize>,
    seed: Option<u64>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    if let Some(n) = size {
        config.grid.size = SizeSpec::Square(n);
    }
    if let Some(s) = seed {
        config.run.seed = Some(s);
    }

    Ok(config)
}

fn run_simulation(
    config_path: PathBuf,
    size: Option<usize>,
    evolutions: Option<u64>,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path, size, seed)?;
    if let Some(n) = evolutions {
        config.run.evolutions = n;
    }

    let lattice = match config.run.seed {
        Some(s) => {
            println!("Using seed: {}", s);
            Lattice::new_with_seed(&config, s)?
        }
        None => Lattice::new(&config)?,
    };

    let (rows, cols) = lattice.dims();
    println!("Starting simulation");
    println!("  Grid: {}x{}", rows, cols);
    println!(
        "  Mode: {}",
        if config.rule.only_red_blue {
            "two-species"
        } else {
            "free-color"
        }
    );
    println!("  Evolutions: {}", config.run.evolutions);
    println!();

    let shared = SharedLattice::new(lattice);
    let mut runner = LatticeRunner::spawn(shared.clone(), config.run.evolutions);

    let mut throughput = MovingAverage::new(RATE_WINDOW)?;
    let started = Instant::now();
    let mut last_generation = 0u64;

    while runner.is_running() {
        thread::sleep(Duration::from_millis(config.run.report_interval_ms));

        let snapshot = shared.snapshot();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let delta = snapshot.generation.saturating_sub(last_generation);
        last_generation = snapshot.generation;
        let (_, rate) = throughput.add(delta as f64, elapsed_ms);

        if !quiet {
            println!(
                "gen {:>12} | red {:>8} | blue {:>8} | other {:>8} | {:>10.0} gen/s",
                snapshot.generation,
                snapshot.counts.red,
                snapshot.counts.blue,
                snapshot.counts.other,
                rate,
            );
        }
    }

    let final_generation = runner.join().unwrap_or(last_generation);
    let counts = shared.counts();
    let elapsed = started.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", final_generation);
    println!(
        "Speed: {:.0} gen/s",
        final_generation as f64 / elapsed.as_secs_f64()
    );
    println!(
        "Counts: red {}, blue {}, other {}",
        counts.red, counts.blue, counts.other
    );

    Ok(())
}

fn run_benchmark(steps: u64, size: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== petri benchmark ===");
    println!("Steps: {}", steps);
    println!("Grid: {}x{}", size, size);
    println!();

    let result = benchmark(steps, size)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
