//! Reference controller used by the closed-loop runner.

use crate::sim::types::{InputRequest, OutputSample};

/// Proportional comfort thermostat.
///
/// Steers the zone toward a comfort temperature by requesting a heating
/// setpoint proportional to the current tracking error. Requested
/// setpoints may exceed the declared input range; the bench clamps them
/// and records the truncation.
#[derive(Debug, Clone, Copy)]
pub struct ThermostatController {
    /// Temperature the controller tries to hold, degC.
    pub comfort_c: f64,
    /// Setpoint degrees added per degree of tracking error.
    pub gain: f64,
}

impl Default for ThermostatController {
    fn default() -> Self {
        Self {
            comfort_c: 21.0,
            gain: 1.5,
        }
    }
}

impl ThermostatController {
    /// Decides the input overrides for the next control interval.
    ///
    /// Before the first measurement arrives there is nothing to react
    /// to, so the request is empty and the emulator runs on its
    /// internal schedules.
    pub fn decide(&self, latest: Option<&OutputSample>) -> InputRequest {
        let Some(zone_temp) = latest.and_then(|sample| sample.get("zoneTemp")) else {
            return InputRequest::new();
        };
        let setpoint = self.comfort_c + self.gain * (self.comfort_c - zone_temp);
        InputRequest::new()
            .with("heatingSetpoint", setpoint)
            .with("heatingSetpoint_activate", 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::ThermostatController;
    use crate::sim::types::OutputSample;

    fn sample(zone_temp: f64) -> OutputSample {
        let mut sample = OutputSample::new();
        sample.insert("time".to_string(), 300.0);
        sample.insert("zoneTemp".to_string(), zone_temp);
        sample
    }

    #[test]
    fn first_interval_sends_no_overrides() {
        let controller = ThermostatController::default();
        assert!(!controller.decide(None).has_written());
    }

    #[test]
    fn raises_setpoint_when_zone_is_cold() {
        let controller = ThermostatController::default();
        let request = controller.decide(Some(&sample(19.0)));
        assert_eq!(request.entries().count(), 2);

        let setpoint = request
            .entries()
            .find(|(name, _)| *name == "heatingSetpoint")
            .and_then(|(_, value)| value)
            .unwrap();
        assert_eq!(setpoint, 24.0);
    }

    #[test]
    fn relaxes_setpoint_when_zone_is_warm() {
        let controller = ThermostatController::default();
        let request = controller.decide(Some(&sample(23.0)));

        let setpoint = request
            .entries()
            .find(|(name, _)| *name == "heatingSetpoint")
            .and_then(|(_, value)| value)
            .unwrap();
        assert_eq!(setpoint, 18.0);
    }

    #[test]
    fn missing_measurement_sends_no_overrides() {
        let controller = ThermostatController::default();
        let mut incomplete = OutputSample::new();
        incomplete.insert("time".to_string(), 300.0);
        assert!(!controller.decide(Some(&incomplete)).has_written());
    }
}
