//! MOESI multiprocessor simulator CLI.
//!
//! This binary provides a single entry point for driving a [`moesi_core::System`]:
//! 1. **Run:** free-run every processor thread for a wall-clock duration (`turn_on(true)`).
//! 2. **Step:** advance the system by a fixed number of one-shot ticks
//!    (`turn_on(false)`, joined each time before the next).
//! 3. **Check:** validate a scenario configuration file without running anything.

use std::fs;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use moesi_core::config::SystemConfig;
use moesi_core::system::System;

#[derive(Parser, Debug)]
#[command(
    name = "moesi-sim",
    author,
    version,
    about = "Educational MOESI cache-coherence multiprocessor simulator",
    long_about = "Simulate a shared-memory multiprocessor running a MOESI coherence \
protocol. Each processor gets its own OS thread and private cache; a \
shared bus and memory are snooped on every miss.\n\n\
Examples:\n  \
moesi-sim run --ticks 200\n  \
moesi-sim step --config scenario.json --count 20\n  \
moesi-sim check --config scenario.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Free-run every processor thread, then print the final state.
    Run {
        /// Scenario configuration file (JSON). Uses the built-in default if omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// How long to let the system run before stopping it.
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,
    },

    /// Advance the system synchronously by a fixed number of ticks, with no
    /// threads involved, and print the resulting state.
    Step {
        /// Scenario configuration file (JSON). Uses the built-in default if omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Number of one-shot ticks to advance (each spawns and joins one
        /// driver thread per processor; see `System::turn_on`).
        #[arg(long, default_value_t = 10)]
        count: u64,
    },

    /// Validate a scenario configuration file without running anything.
    Check {
        /// Scenario configuration file (JSON).
        config: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, seconds } => cmd_run(config.as_deref(), seconds),
        Commands::Step { config, count } => cmd_step(config.as_deref(), count),
        Commands::Check { config } => cmd_check(&config),
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn load_config(path: Option<&str>) -> Result<SystemConfig, String> {
    match path {
        None => Ok(SystemConfig::default()),
        Some(path) => {
            let contents = fs::read_to_string(path)
                .map_err(|err| format!("reading {path}: {err}"))?;
            serde_json::from_str(&contents).map_err(|err| format!("parsing {path}: {err}"))
        }
    }
}

fn cmd_check(path: &str) -> Result<(), String> {
    let config = load_config(Some(path))?;
    config.validate().map_err(|err| err.to_string())?;
    println!("{path}: valid");
    println!("  processors: {}", config.n_processors);
    println!("  memory: {} words", config.memory_size);
    println!("  cache capacity: {} blocks ({}-way)", config.cache_capacity, config.associativity);
    println!("  frequency: {} Hz", config.frequency_hz);
    Ok(())
}

fn cmd_run(config_path: Option<&str>, seconds: f64) -> Result<(), String> {
    let config = load_config(config_path)?;
    let system = Arc::new(System::new(config).map_err(|err| err.to_string())?);
    log::info!("run: {seconds}s at {} Hz", system.frequency_hz());

    println!(
        "Running {} processors at {} Hz for {seconds}s ({} words memory, {}-block caches)",
        system.processor_count(),
        system.frequency_hz(),
        config.memory_size,
        config.cache_capacity,
    );

    system.turn_on(true);
    thread::sleep(Duration::from_secs_f64(seconds));
    system.turn_off();

    print_snapshot(&system);
    Ok(())
}

fn cmd_step(config_path: Option<&str>, count: u64) -> Result<(), String> {
    let config = load_config(config_path)?;
    let system = Arc::new(System::new(config).map_err(|err| err.to_string())?);
    log::info!("step: {count} one-shot ticks");

    for _ in 0..count {
        system.turn_on(false);
        system.turn_off();
    }

    print_snapshot(&system);
    Ok(())
}

fn print_snapshot(system: &System) {
    let snapshot = system.snapshot();
    println!();
    println!("{}", system.stats());
    println!("bus: {}", if snapshot.bus_free { "free" } else { "busy" });
    for processor in &snapshot.processors {
        println!(
            "P{}: state={} current={} last={}",
            processor.display_id,
            processor.state,
            processor.current_instruction,
            processor.last_instruction
        );
        for (index, line) in processor.cache.iter().enumerate() {
            println!(
                "  block {index}: {} data={} state={}",
                line.address, line.data, line.state
            );
        }
    }
    print!("memory:");
    for word in &snapshot.memory {
        print!(" {word}");
    }
    println!();
}
