//! Bench entry point: CLI wiring and config-driven closed-loop runs.

use std::path::Path;
use std::process;

use emu_bench::config::BenchConfig;
use emu_bench::io::export::export_csv;
use emu_bench::reporting::{print_diagnostics, print_kpi_report};
use emu_bench::runner::run_closed_loop;

/// One simulated day at the default 300 s control interval.
const DEFAULT_STEPS: usize = 288;

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    steps: usize,
    seed_override: Option<u64>,
    results_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("emu-bench: closed-loop test bench for a thermal zone emulator");
    eprintln!();
    eprintln!("Usage: emu-bench [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load bench configuration from a TOML file");
    eprintln!("  --preset <name>        Use a built-in preset (baseline, fine_step, heavy_mass)");
    eprintln!("  --steps <n>            Number of control intervals to run (default: 288)");
    eprintln!("  --seed <u64>           Override the random seed");
    eprintln!("  --results-out <path>   Export accumulated trajectories to CSV");
    eprintln!("  --quiet                Suppress the per-step readable log");
    eprintln!("  --help                 Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        steps: DEFAULT_STEPS,
        seed_override: None,
        results_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--steps" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --steps requires a count argument");
                    process::exit(1);
                }
                if let Ok(n) = args[i].parse::<usize>() {
                    cli.steps = n;
                } else {
                    eprintln!("error: --steps value \"{}\" is not a valid count", args[i]);
                    process::exit(1);
                }
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--results-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --results-out requires a path argument");
                    process::exit(1);
                }
                cli.results_out = Some(args[i].clone());
            }
            "--quiet" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --config takes priority, then --preset, then baseline default
    let mut config = if let Some(ref path) = cli.config_path {
        match BenchConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match BenchConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        BenchConfig::baseline()
    };

    // Apply seed override
    if let Some(seed) = cli.seed_override {
        config.simulation.seed = seed;
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Build and run
    let (bench, summary) = match run_closed_loop(&config, cli.steps, !cli.quiet) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    print_kpi_report(&summary.kpis);
    print_diagnostics(bench.diagnostics());

    // Export CSV if requested
    if let Some(ref path) = cli.results_out {
        if let Err(e) = export_csv(&bench.results(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Results written to {path}");
    }
}
