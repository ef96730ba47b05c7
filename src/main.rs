//! PETRI - CLI Entry Point
//!
//! Artificial-life sandbox of cells, organisms, and flora.

use clap::{Parser, Subcommand};
use petri::{benchmark, Config, World, WorldSnapshot};
use std::path::PathBuf;
use std::time::Instant;

/// Ticks between console summaries during a run.
const SUMMARY_INTERVAL: u64 = 60;

#[derive(Parser)]
#[command(name = "petri")]
#[command(version)]
#[command(about = "Artificial-life sandbox of cells, organisms, and flora")]
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

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Seconds of simulated time per tick
        #[arg(long, default_value = "0.016")]
        dt: f32,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,

        /// Write stats history JSON here when the run ends
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },

    /// Run briefly and dump a render-ready snapshot
    Snapshot {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Ticks to simulate before the dump
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// Seconds of simulated time per tick
        #[arg(long, default_value = "0.016")]
        dt: f32,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Output path
        #[arg(short, long, default_value = "snapshot.json")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Free cells to seed
        #[arg(short, long, default_value = "200")]
        cells: usize,
    },

    /// Generate default configuration file
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
            ticks,
            dt,
            seed,
            quiet,
            stats_out,
        } => run_simulation(config, ticks, dt, seed, quiet, stats_out),

        Commands::Snapshot {
            config,
            ticks,
            dt,
            seed,
            output,
        } => dump_snapshot(config, ticks, dt, seed, output),

        Commands::Benchmark { ticks, cells } => run_benchmark(ticks, cells),

        Commands::Init { output } => generate_config(output),
    }
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn build_world(config: Config, seed: Option<u64>) -> World {
    match seed {
        Some(seed) => {
            println!("Using seed: {}", seed);
            World::new_with_seed(config, seed)
        }
        None => World::new(config),
    }
}

fn run_simulation(
    config_path: PathBuf,
    ticks: u64,
    dt: f32,
    seed: Option<u64>,
    quiet: bool,
    stats_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let mut world = build_world(config, seed);

    println!("Starting simulation");
    println!("  Initial population: {}", world.population());
    println!(
        "  World size: {}x{}",
        world.config.world.width, world.config.world.height
    );
    println!("  Ticks: {} at dt {}", ticks, dt);
    println!();

    let start = Instant::now();
    let mut executed = 0u64;

    for i in 0..ticks {
        world.update(dt);
        executed += 1;

        // Stats output
        if !quiet && i % SUMMARY_INTERVAL == 0 {
            println!("{}", world.stats.summary());
        }

        // Check for extinction
        if world.is_extinct() {
            println!("\nPopulation extinct at t={:.1}", world.time);
            break;
        }
    }

    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Ticks: {} ({:.1}s simulated)", executed, world.time);
    println!(
        "Speed: {:.1} ticks/s",
        executed as f64 / elapsed.as_secs_f64()
    );
    println!(
        "Final population: {} cells, {} organisms",
        world.cells.len(),
        world.organisms.len()
    );

    if let Some(path) = stats_out {
        world.stats_history.save(&path.to_string_lossy())?;
        println!("Stats history: {:?}", path);
    }

    Ok(())
}

fn dump_snapshot(
    config_path: PathBuf,
    ticks: u64,
    dt: f32,
    seed: Option<u64>,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let mut world = build_world(config, seed);

    world.run(ticks, dt);

    let snapshot = WorldSnapshot::from_world(&world);
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(&output, json)?;

    println!("{}", world.stats.summary());
    println!("Snapshot written to: {:?}", output);

    Ok(())
}

fn run_benchmark(ticks: u64, cells: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== PETRI Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Cells: {}", cells);
    println!();

    let result = benchmark(ticks, cells);
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
