//! Game balance simulator CLI.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                  # Default: 100 runs to 3 rebirths
//!   cargo run --bin simulate -- -n 20 -r 10  # 20 runs to 10 rebirths
//!   cargo run --bin simulate -- --seed 42    # Reproducible run

use moondust::simulator::{run_simulation, SimConfig};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              MOONDUST BALANCE SIMULATOR                       ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:            {}", config.num_runs);
    println!("  Target Rebirths: {}", config.target_rebirths);
    println!("  Clicks/Tick:     0..={}", config.max_clicks_per_tick);
    println!("  Max Ticks:       {}", config.max_ticks_per_run);
    if let Some(seed) = config.seed {
        println!("  Seed:            {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = run_simulation(&config);

    if config.verbosity > 0 {
        println!("{}", report.to_text());
    }

    if args.iter().any(|a| a == "--json") {
        let json = report.to_json();
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        match std::fs::write(&filename, json) {
            Ok(()) => println!("JSON report saved to: {}", filename),
            Err(e) => {
                eprintln!("Failed to write JSON report: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Starting point for the flags: the last preset named, else the default.
fn preset(args: &[String]) -> SimConfig {
    args.iter()
        .rev()
        .find_map(|arg| match arg.as_str() {
            "--idle" => Some(SimConfig::idle_only()),
            "--quick" => Some(SimConfig::quick()),
            "--long" => Some(SimConfig::long_prestige()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Presets apply first, so explicit flags win wherever they appear.
fn parse_args(args: &[String]) -> SimConfig {
    let mut config = preset(args);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "-r" | "--rebirths" => {
                if i + 1 < args.len() {
                    config.target_rebirths = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "-c" | "--clicks" => {
                if i + 1 < args.len() {
                    config.max_clicks_per_tick = args[i + 1].parse().unwrap_or(5);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-t" | "--ticks" => {
                if i + 1 < args.len() {
                    config.max_ticks_per_run = args[i + 1].parse().unwrap_or(1_000_000);
                    i += 1;
                }
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-q" | "--quiet" => {
                config.verbosity = 0;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Moondust Balance Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>       Number of simulated players (default: 100)");
    println!("    -r, --rebirths <R>   Rebirths each run aims for (default: 3)");
    println!("    -c, --clicks <C>     Max clicks per tick (default: 5)");
    println!("    -s, --seed <S>       Random seed for reproducibility");
    println!("    -t, --ticks <T>      Max ticks per run (default: 1,000,000)");
    println!("    -v, --verbose        Print every run");
    println!("    -q, --quiet          Skip the text report");
    println!("    --json               Save JSON report");
    println!("    --idle               Never click (passive play only)");
    println!("    --quick              Quick test (10 runs to 1 rebirth)");
    println!("    --long               Long prestige grind (20 runs to 30 rebirths)");
    println!("    -h, --help           Show this help");
}
