//! Derives the unit, description, and bounds records served to callers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::emulator::{Causality, VariableSpec};
use crate::sim::types::{TIME_KEY, is_activation_flag};

/// Metadata record for one declared variable, built once at bench
/// construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableMetadata {
    /// Engineering unit, when the variable has one.
    pub unit: Option<String>,
    /// Human-readable description, when the catalog provides one.
    pub description: Option<String>,
    /// Lower clamping bound, reported for control inputs only.
    pub minimum: Option<f64>,
    /// Upper clamping bound, reported for control inputs only.
    pub maximum: Option<f64>,
}

/// Builds the metadata map for every catalog variable of `causality`.
///
/// Three rules shape the records:
/// * [`TIME_KEY`] always reads in seconds and never carries bounds.
/// * Activation flags carry no unit and no bounds.
/// * Bounds are reported for control inputs only; measurement records
///   never carry them.
pub fn build_metadata(
    catalog: &[VariableSpec],
    causality: Causality,
) -> BTreeMap<String, VariableMetadata> {
    let mut metadata = BTreeMap::new();
    for spec in catalog.iter().filter(|spec| spec.causality == causality) {
        let record = if spec.name == TIME_KEY {
            VariableMetadata {
                unit: Some("s".to_string()),
                description: Some("Time of simulation".to_string()),
                minimum: None,
                maximum: None,
            }
        } else if is_activation_flag(&spec.name) {
            VariableMetadata {
                unit: None,
                description: describe(spec),
                minimum: None,
                maximum: None,
            }
        } else {
            let bounded = causality == Causality::Input;
            VariableMetadata {
                unit: spec.unit.clone().filter(|unit| !unit.is_empty()),
                description: describe(spec),
                minimum: if bounded { spec.minimum } else { None },
                maximum: if bounded { spec.maximum } else { None },
            }
        };
        metadata.insert(spec.name.clone(), record);
    }
    metadata
}

fn describe(spec: &VariableSpec) -> Option<String> {
    if spec.description.is_empty() {
        None
    } else {
        Some(spec.description.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<VariableSpec> {
        vec![
            VariableSpec::input("heatingSetpoint", "degC", "Zone heating setpoint", 15.0, 30.0),
            VariableSpec::flag("heatingSetpoint_activate", "Setpoint override switch"),
            VariableSpec::output("zoneTemp", "degC", "Zone air temperature"),
            VariableSpec::output(TIME_KEY, "ignored", "ignored"),
        ]
    }

    #[test]
    fn inputs_keep_unit_and_bounds() {
        let inputs = build_metadata(&catalog(), Causality::Input);
        let setpoint = &inputs["heatingSetpoint"];
        assert_eq!(setpoint.unit.as_deref(), Some("degC"));
        assert_eq!(setpoint.minimum, Some(15.0));
        assert_eq!(setpoint.maximum, Some(30.0));
    }

    #[test]
    fn flags_have_no_unit_and_no_bounds() {
        let inputs = build_metadata(&catalog(), Causality::Input);
        let flag = &inputs["heatingSetpoint_activate"];
        assert_eq!(flag.unit, None);
        assert_eq!(flag.description.as_deref(), Some("Setpoint override switch"));
        assert_eq!(flag.minimum, None);
        assert_eq!(flag.maximum, None);
    }

    #[test]
    fn outputs_never_carry_bounds() {
        let mut specs = catalog();
        specs[2].minimum = Some(-40.0);
        specs[2].maximum = Some(60.0);

        let outputs = build_metadata(&specs, Causality::Output);
        let temp = &outputs["zoneTemp"];
        assert_eq!(temp.unit.as_deref(), Some("degC"));
        assert_eq!(temp.minimum, None);
        assert_eq!(temp.maximum, None);
    }

    #[test]
    fn time_reads_in_seconds() {
        let outputs = build_metadata(&catalog(), Causality::Output);
        let time = &outputs[TIME_KEY];
        assert_eq!(time.unit.as_deref(), Some("s"));
        assert_eq!(time.description.as_deref(), Some("Time of simulation"));
        assert_eq!(time.minimum, None);
        assert_eq!(time.maximum, None);
    }

    #[test]
    fn causality_filter_separates_maps() {
        let inputs = build_metadata(&catalog(), Causality::Input);
        let outputs = build_metadata(&catalog(), Causality::Output);
        assert!(inputs.contains_key("heatingSetpoint"));
        assert!(!inputs.contains_key("zoneTemp"));
        assert!(outputs.contains_key("zoneTemp"));
        assert!(!outputs.contains_key("heatingSetpoint"));
    }

    #[test]
    fn empty_unit_and_description_map_to_none() {
        let specs = vec![VariableSpec::output("raw", "", "")];
        let outputs = build_metadata(&specs, Causality::Output);
        assert_eq!(outputs["raw"].description, None);
        assert_eq!(outputs["raw"].unit, None);
    }
}
