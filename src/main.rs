//! Pattern evolver CLI - Run batch simulations from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use pattern_evolver::{
    compute::{Simulation, SimulationStats},
    schema::{Pattern, PatternSet, SimulationConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [steps]", args[0]);
        eprintln!();
        eprintln!("Evolve a binary grid against a labeled pattern set.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  steps        Number of simulation steps (default: config iterations)");
        eprintln!();
        eprintln!("Patterns are read from <config>.patterns.json next to the config.");
        eprintln!("Example files are printed with the --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let mut config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Some(steps) = args.get(2).and_then(|s| s.parse().ok()) {
        config.iterations = steps;
    }

    // Load or create patterns
    let patterns_path = config_path.with_extension("patterns.json");
    let patterns: PatternSet = if patterns_path.exists() {
        let patterns_str = fs::read_to_string(&patterns_path).unwrap_or_else(|e| {
            eprintln!("Error reading patterns file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&patterns_str).unwrap_or_else(|e| {
            eprintln!("Error parsing patterns: {}", e);
            std::process::exit(1);
        })
    } else {
        log::warn!(
            "No pattern file at {}, using built-in examples",
            patterns_path.display()
        );
        example_patterns()
    };

    println!("Pattern Evolver");
    println!("===============");
    println!("Grid: {}x{}", config.width, config.height);
    println!("Window: {0}x{0}", config.window_size);
    println!("Patterns: {}", patterns.len());
    println!("Policy: {:?}, mode: {:?}", config.policy, config.match_mode);
    println!("Noise: {} (offset {})", config.noise.variant, config.noise.offset);
    println!("Steps: {}", config.iterations);
    println!();

    let mut sim = Simulation::from_source(config, &patterns).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    print_stats("Initial state", &sim.stats());

    println!("Running simulation...");
    let start = Instant::now();
    let final_stats = sim.run_batch();
    let elapsed = start.elapsed();

    print_stats("Final state", &final_stats);
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        final_stats.step as f32 / elapsed.as_secs_f32().max(f32::EPSILON)
    );
}

fn print_stats(title: &str, stats: &SimulationStats) {
    println!("{}:", title);
    println!("  Step: {}", stats.step);
    println!(
        "  Live cells: {} ({:.1}%)",
        stats.live_cells,
        stats.density * 100.0
    );
    println!(
        "  Accumulator: max={} sum={}",
        stats.accumulator_max, stats.accumulator_sum
    );
    println!(
        "  Matched windows: {}, resampled cells: {}",
        stats.matched_windows, stats.resampled_cells
    );
    println!();
}

/// Cross shapes are good, solid blocks are bad.
fn example_patterns() -> PatternSet {
    let good = ["010111010", "101010101"];
    let bad = ["000000000", "111111111"];
    PatternSet::new(
        good.iter()
            .filter_map(|bits| Pattern::from_bits(bits, 1))
            .chain(bad.iter().filter_map(|bits| Pattern::from_bits(bits, -1)))
            .collect(),
    )
}

fn print_example_config() {
    let config = SimulationConfig::default();
    let patterns = example_patterns();

    let render = |value: serde_json::Result<String>| {
        value.unwrap_or_else(|e| {
            eprintln!("Error serializing example: {}", e);
            std::process::exit(1);
        })
    };

    println!("Example configuration (config.json):");
    println!("{}", render(serde_json::to_string_pretty(&config)));
    println!();
    println!("Example patterns (config.patterns.json):");
    println!("{}", render(serde_json::to_string_pretty(&patterns)));
}
