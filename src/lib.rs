//! Stepwise closed-loop test bench for building energy emulators.

pub mod config;
pub mod control;
pub mod data;
/// Emulator interface plus the bundled thermal zone model.
pub mod emulator;
pub mod error;
pub mod forecast;
pub mod io;
pub mod reporting;
pub mod runner;
/// Bench core: clock, stores, metadata, diagnostics, and KPI scoring.
pub mod sim;
