//! Emulator seam between the bench and a packaged simulation model.
//!
//! The bench drives anything implementing [`Emulator`]: it asks for the
//! variable catalog once at construction, then calls
//! [`Emulator::simulate`] one control interval at a time. The built-in
//! [`ThermalZone`] model lives in [`thermal_zone`].

pub mod thermal_zone;
pub mod weather;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::sim::types::{InputTrajectory, TIME_KEY};

pub use thermal_zone::ThermalZone;

/// Emulator interface version this bench knows how to drive.
pub const INTERFACE_VERSION: &str = "2.0";

/// Direction of a catalog variable relative to the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Causality {
    /// Overridable control input (includes activation flags).
    Input,
    /// Measurement produced by the model.
    Output,
}

/// One entry in an emulator's variable catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    /// Variable name as used in requests, samples, and stores.
    pub name: String,
    /// Whether the bench writes this variable or reads it.
    pub causality: Causality,
    /// Engineering unit, when the variable has one.
    pub unit: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Lower bound for written values, when declared.
    pub minimum: Option<f64>,
    /// Upper bound for written values, when declared.
    pub maximum: Option<f64>,
}

impl VariableSpec {
    /// Declares a numeric control input with clamping bounds.
    pub fn input(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
        minimum: f64,
        maximum: f64,
    ) -> Self {
        Self {
            name: name.into(),
            causality: Causality::Input,
            unit: Some(unit.into()),
            description: description.into(),
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }

    /// Declares an activation flag input. Flags carry no unit and no
    /// bounds; any nonzero written value switches the override on.
    pub fn flag(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            causality: Causality::Input,
            unit: None,
            description: description.into(),
            minimum: None,
            maximum: None,
        }
    }

    /// Declares a measurement output.
    pub fn output(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            causality: Causality::Output,
            unit: Some(unit.into()),
            description: description.into(),
            minimum: None,
            maximum: None,
        }
    }
}

/// Columnar result of simulating one step window.
///
/// Every column holds one value per sample row, and the [`TIME_KEY`]
/// column carries the sample times in seconds. The first row restates
/// conditions at the window start and the last row lands on the window
/// end, so consecutive windows share their boundary row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutput {
    /// Sampled series keyed by variable name, [`TIME_KEY`] included.
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl SimulationOutput {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sampled series for `name`, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Returns the final sample of `name`, if present and non-empty.
    pub fn last(&self, name: &str) -> Option<f64> {
        self.columns.get(name).and_then(|series| series.last().copied())
    }

    /// Number of sample rows, taken from the time column.
    pub fn rows(&self) -> usize {
        self.columns.get(TIME_KEY).map_or(0, Vec::len)
    }
}

/// Failures an emulator can report from [`Emulator::simulate`].
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// Integration produced a non-finite state value.
    #[error("model diverged at t = {time} s: {variable} = {value}")]
    Diverged {
        time: f64,
        variable: String,
        value: f64,
    },

    /// The requested window has no extent.
    #[error("empty simulation window: start {start} s is not before end {end} s")]
    EmptyWindow { start: f64, end: f64 },

    /// Any other model-internal failure.
    #[error("emulator failure: {0}")]
    Internal(String),
}

/// A packaged simulation model the bench can step through time.
///
/// Implementations own all model state. The bench guarantees that
/// `simulate` windows are contiguous: each call's `start_time` equals
/// the previous call's `final_time`, except after a reset.
pub trait Emulator {
    /// Interface version string, checked against [`INTERFACE_VERSION`]
    /// at bench construction.
    fn interface_version(&self) -> &str;

    /// Short model name for reports and logs.
    fn model_name(&self) -> &str;

    /// Declared variable catalog. Must be stable across calls.
    fn variables(&self) -> &[VariableSpec];

    /// Simulates from `start_time` to `final_time` seconds.
    ///
    /// When `initialize` is true the model must discard prior state and
    /// re-establish initial conditions at `start_time` before
    /// integrating. `input` carries piecewise-constant overrides for
    /// the window; `None` means every input follows its internal
    /// default.
    ///
    /// A successful result must contain a [`TIME_KEY`] column with at
    /// least two rows spanning the window, plus one equal-length column
    /// per declared variable.
    fn simulate(
        &mut self,
        start_time: f64,
        final_time: f64,
        initialize: bool,
        input: Option<&InputTrajectory>,
    ) -> Result<SimulationOutput, EmulatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_spec_carries_bounds() {
        let spec = VariableSpec::input("heatingSetpoint", "degC", "Zone setpoint", 15.0, 30.0);
        assert_eq!(spec.causality, Causality::Input);
        assert_eq!(spec.minimum, Some(15.0));
        assert_eq!(spec.maximum, Some(30.0));
        assert_eq!(spec.unit.as_deref(), Some("degC"));
    }

    #[test]
    fn flag_spec_has_no_unit_or_bounds() {
        let spec = VariableSpec::flag("heatingSetpoint_activate", "Setpoint override switch");
        assert_eq!(spec.causality, Causality::Input);
        assert!(spec.unit.is_none());
        assert!(spec.minimum.is_none());
        assert!(spec.maximum.is_none());
    }

    #[test]
    fn output_rows_follow_time_column() {
        let mut output = SimulationOutput::new();
        assert_eq!(output.rows(), 0);
        output
            .columns
            .insert(TIME_KEY.to_string(), vec![0.0, 150.0, 300.0]);
        output
            .columns
            .insert("zoneTemp".to_string(), vec![20.0, 20.4, 20.9]);
        assert_eq!(output.rows(), 3);
        assert_eq!(output.last("zoneTemp"), Some(20.9));
        assert_eq!(output.column("missing"), None);
    }
}
