//! Shared test fixtures for integration tests.

use emu_bench::config::BenchConfig;
use emu_bench::emulator::ThermalZone;
use emu_bench::sim::bench::TestBench;

/// Default bench configuration (300 s step, seed 42, synthetic weather).
pub fn default_config() -> BenchConfig {
    BenchConfig::baseline()
}

/// Builds a bench around the bundled thermal zone with default config.
pub fn default_bench() -> TestBench<ThermalZone> {
    let config = default_config();
    let zone = ThermalZone::new(&config.emulator, config.simulation.seed);
    TestBench::new(zone, &config).expect("default bench should build")
}
