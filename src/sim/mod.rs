/// The stepwise test bench driving one emulator instance.
pub mod bench;
/// Simulation clock for step-window management.
pub mod clock;
pub mod diagnostics;
pub mod kpi;
pub mod metadata;
/// Cumulative result trajectories accumulated across steps.
pub mod store;
pub mod types;
