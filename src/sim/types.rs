//! Core bench types: input requests, step trajectories, and samples.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved variable name for simulation time in seconds.
///
/// Every trajectory store carries a `time` column, and every emulator
/// result must include one. `time` is never accepted as a control input.
pub const TIME_KEY: &str = "time";

/// Name suffix marking boolean-like activation flags.
///
/// Flag variables switch an override on or off and are exempt from
/// numeric bounds checking.
pub const ACTIVATE_SUFFIX: &str = "_activate";

/// Returns `true` when `name` denotes an activation flag.
pub fn is_activation_flag(name: &str) -> bool {
    name.ends_with(ACTIVATE_SUFFIX)
}

/// Control overrides requested for one upcoming interval.
///
/// Each entry maps a declared input variable to either `Some(value)`
/// ("override with this value for the whole step") or `None` ("do not
/// override; let the emulator use its internal default"). An empty
/// request is valid and means no overrides at all.
///
/// The JSON form maps `null` to `None`, so `{"heatingSetpoint": 22.5,
/// "shadePosition": null}` overrides the setpoint and explicitly leaves
/// the shade at its default.
///
/// Bounds checking is not this type's job; the bench clamps written
/// values against the declared variable bounds when the step runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputRequest {
    entries: BTreeMap<String, Option<f64>>,
}

impl InputRequest {
    /// Creates an empty request (no overrides).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override value, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.entries.insert(name.into(), Some(value));
        self
    }

    /// Adds an explicit "use the engine default" entry, builder style.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), None);
        self
    }

    /// Sets or replaces an override value.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.entries.insert(name.into(), Some(value));
    }

    /// Sets or replaces an entry with an explicit "use default" marker.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), None);
    }

    /// Returns `true` when the request carries no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when at least one entry carries a written value.
    pub fn has_written(&self) -> bool {
        self.entries.values().any(Option::is_some)
    }

    /// Iterates entries in variable-name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

/// Piecewise-constant input specification for one step window.
///
/// Holds the window start time plus the `(variable, value)` pairs that
/// are applied constantly across the whole step. Built fresh on every
/// `advance` call; an absent trajectory means "engine defaults".
#[derive(Debug, Clone, PartialEq)]
pub struct InputTrajectory {
    /// Step start time the values are stamped at, in seconds.
    pub start_time: f64,
    /// Ordered `(variable, value)` pairs applied across the window.
    pub values: Vec<(String, f64)>,
}

impl InputTrajectory {
    /// Looks up the value written for `name`, if any.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    /// Returns `true` when no value is written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Measurement sample at the end of the most recent step, keyed by
/// variable name and including [`TIME_KEY`].
pub type OutputSample = BTreeMap<String, f64>;

/// Forecast window configuration: how far ahead and how densely the
/// boundary-data forecast is sampled, both in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastParameters {
    /// Forecast horizon in seconds (non-negative).
    pub horizon: f64,
    /// Forecast sampling interval in seconds (non-negative).
    pub interval: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_has_nothing_written() {
        let request = InputRequest::new();
        assert!(request.is_empty());
        assert!(!request.has_written());
    }

    #[test]
    fn none_entries_do_not_count_as_written() {
        let request = InputRequest::new().with_default("heatingSetpoint");
        assert!(!request.is_empty());
        assert!(!request.has_written());
    }

    #[test]
    fn written_entry_is_detected() {
        let request = InputRequest::new()
            .with_default("shadePosition")
            .with("heatingSetpoint", 21.0);
        assert!(request.has_written());
        let written: Vec<_> = request.entries().collect();
        assert_eq!(
            written,
            vec![("heatingSetpoint", Some(21.0)), ("shadePosition", None)]
        );
    }

    #[test]
    fn json_null_deserializes_to_default_marker() {
        let request: InputRequest =
            serde_json::from_str(r#"{"heatingSetpoint": 22.5, "shadePosition": null}"#)
                .expect("request JSON should parse");
        let entries: Vec<_> = request.entries().collect();
        assert_eq!(
            entries,
            vec![("heatingSetpoint", Some(22.5)), ("shadePosition", None)]
        );
    }

    #[test]
    fn activation_flag_detection_uses_suffix() {
        assert!(is_activation_flag("heatingSetpoint_activate"));
        assert!(!is_activation_flag("heatingSetpoint"));
        assert!(!is_activation_flag("_activate_aux"));
    }

    #[test]
    fn trajectory_lookup() {
        let trajectory = InputTrajectory {
            start_time: 300.0,
            values: vec![("heatingSetpoint".to_string(), 21.0)],
        };
        assert_eq!(trajectory.get("heatingSetpoint"), Some(21.0));
        assert_eq!(trajectory.get("shadePosition"), None);
        assert!(!trajectory.is_empty());
    }
}
