//! Built-in single-zone thermal emulator.

use rand::{SeedableRng, rngs::StdRng};

use crate::config::EmulatorConfig;
use crate::emulator::weather::{gaussian_noise, outdoor_temp_c, solar_irradiance_w_m2};
use crate::emulator::{Emulator, EmulatorError, SimulationOutput, VariableSpec};
use crate::sim::types::{InputTrajectory, TIME_KEY};

/// Sample spacing of the returned trajectories, in seconds.
const OUTPUT_INTERVAL_S: f64 = 30.0;

/// Upper bound on the forward-Euler substep, in seconds.
const MAX_EULER_DT_S: f64 = 5.0;

/// Fraction of solar gain blocked by a fully closed shade.
const SHADE_BLOCK_FRACTION: f64 = 0.7;

const SETPOINT_MIN_C: f64 = 15.0;
const SETPOINT_MAX_C: f64 = 30.0;

/// A first-order (1R1C) thermal zone with a proportional electric
/// heater, a shadable window, and synthetic diurnal weather.
///
/// The zone air temperature follows
/// `C dT/dt = (Tout - T)/R + Qheat + Qsolar`, integrated with forward
/// Euler. The heater tracks a scheduled setpoint (day/night) unless an
/// override is written for the window.
///
/// # Overridable inputs
///
/// * `heatingSetpoint` with `heatingSetpoint_activate`: replaces the
///   scheduled setpoint for the window.
/// * `shadePosition` with `shadePosition_activate`: window shade in
///   `[0, 1]`, `0` fully open.
///
/// A written value overrides the internal default for the whole window.
/// Writing the paired `_activate` flag as zero cancels the override;
/// any nonzero flag (or an absent one) asserts it. Overrides do not
/// persist: an unwritten input falls back to its internal default on
/// the next window.
#[derive(Debug, Clone)]
pub struct ThermalZone {
    /// Zone temperature restored on initialization, degrees Celsius.
    pub initial_temp_c: f64,

    /// Envelope thermal resistance, K per kW.
    pub thermal_resistance_k_per_kw: f64,

    /// Lumped thermal capacitance, kWh per K.
    pub thermal_capacitance_kwh_per_k: f64,

    /// Heater power ceiling, kW.
    pub heater_max_kw: f64,

    /// Proportional heater gain, kW per K of setpoint deficit.
    pub heater_gain_kw_per_k: f64,

    /// Effective window area collecting solar gain, m2.
    pub solar_aperture_m2: f64,

    /// Daily mean outdoor temperature, degrees Celsius.
    pub weather_mean_c: f64,

    /// Daily outdoor temperature swing around the mean, Kelvin.
    pub weather_amplitude_c: f64,

    /// Standard deviation of per-sample outdoor noise, Kelvin.
    pub weather_noise_std_c: f64,

    /// Scheduled setpoint between 07:00 and 22:00, degrees Celsius.
    pub setpoint_day_c: f64,

    /// Scheduled setpoint outside occupied hours, degrees Celsius.
    pub setpoint_night_c: f64,

    /// Peak clear-sky irradiance, W per m2.
    pub solar_peak_w_m2: f64,

    seed: u64,
    rng: StdRng,
    temp_c: f64,
    variables: Vec<VariableSpec>,
}

impl ThermalZone {
    /// Creates a zone from configuration plus a noise seed.
    ///
    /// The same seed reproduces the same weather noise after every
    /// initializing step, so full runs are repeatable.
    pub fn new(config: &EmulatorConfig, seed: u64) -> Self {
        let variables = vec![
            VariableSpec::input(
                "heatingSetpoint",
                "degC",
                "Zone heating setpoint override",
                SETPOINT_MIN_C,
                SETPOINT_MAX_C,
            ),
            VariableSpec::flag("heatingSetpoint_activate", "Heating setpoint override switch"),
            VariableSpec::input(
                "shadePosition",
                "1",
                "Window shade position override, 0 open to 1 closed",
                0.0,
                1.0,
            ),
            VariableSpec::flag("shadePosition_activate", "Shade position override switch"),
            VariableSpec::output("zoneTemp", "degC", "Zone air temperature"),
            VariableSpec::output("heaterPower", "kW", "Electric heater power draw"),
            VariableSpec::output("outdoorTemp", "degC", "Outdoor dry-bulb temperature"),
            VariableSpec::output("solarGain", "kW", "Solar heat gain through the window"),
        ];

        Self {
            initial_temp_c: config.initial_temp_c,
            thermal_resistance_k_per_kw: config.thermal_resistance_k_per_kw.max(1e-6),
            thermal_capacitance_kwh_per_k: config.thermal_capacitance_kwh_per_k.max(1e-6),
            heater_max_kw: config.heater_max_kw.max(0.0),
            heater_gain_kw_per_k: config.heater_gain_kw_per_k.max(0.0),
            solar_aperture_m2: config.solar_aperture_m2.max(0.0),
            weather_mean_c: config.weather_mean_c,
            weather_amplitude_c: config.weather_amplitude_c,
            weather_noise_std_c: config.weather_noise_std_c.max(0.0),
            setpoint_day_c: config.setpoint_day_c,
            setpoint_night_c: config.setpoint_night_c,
            solar_peak_w_m2: config.solar_peak_w_m2.max(0.0),
            seed,
            rng: StdRng::seed_from_u64(seed),
            temp_c: config.initial_temp_c,
            variables,
        }
    }

    /// Current zone air temperature, degrees Celsius.
    pub fn zone_temp_c(&self) -> f64 {
        self.temp_c
    }

    /// Scheduled setpoint at `time_s`: day value 07:00 to 22:00, night
    /// value otherwise.
    fn scheduled_setpoint(&self, time_s: f64) -> f64 {
        let hour = time_s.rem_euclid(crate::emulator::weather::DAY_SECONDS) / 3600.0;
        if (7.0..22.0).contains(&hour) {
            self.setpoint_day_c
        } else {
            self.setpoint_night_c
        }
    }

    fn heater_power_kw(&self, setpoint_c: f64) -> f64 {
        (self.heater_gain_kw_per_k * (setpoint_c - self.temp_c)).clamp(0.0, self.heater_max_kw)
    }

    /// Resolves one override pair against the window's trajectory.
    ///
    /// Returns the written value unless the paired flag is written as
    /// zero. A flag written without a value asserts nothing.
    fn resolve_override(input: Option<&InputTrajectory>, name: &str, flag: &str) -> Option<f64> {
        let trajectory = input?;
        let value = trajectory.get(name)?;
        match trajectory.get(flag) {
            Some(f) if f == 0.0 => None,
            _ => Some(value),
        }
    }
}

impl Emulator for ThermalZone {
    fn interface_version(&self) -> &str {
        super::INTERFACE_VERSION
    }

    fn model_name(&self) -> &str {
        "thermal-zone-1r1c"
    }

    fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    fn simulate(
        &mut self,
        start_time: f64,
        final_time: f64,
        initialize: bool,
        input: Option<&InputTrajectory>,
    ) -> Result<SimulationOutput, EmulatorError> {
        if !(final_time > start_time) {
            return Err(EmulatorError::EmptyWindow {
                start: start_time,
                end: final_time,
            });
        }

        if initialize {
            self.temp_c = self.initial_temp_c;
            self.rng = StdRng::seed_from_u64(self.seed);
        }

        let setpoint_override =
            Self::resolve_override(input, "heatingSetpoint", "heatingSetpoint_activate");
        let shade_override =
            Self::resolve_override(input, "shadePosition", "shadePosition_activate");

        let window = final_time - start_time;
        let rows = (window / OUTPUT_INTERVAL_S).ceil().max(1.0) as usize;
        let dt_row = window / rows as f64;

        let mut time = Vec::with_capacity(rows + 1);
        let mut zone_temp = Vec::with_capacity(rows + 1);
        let mut heater_power = Vec::with_capacity(rows + 1);
        let mut outdoor_temp = Vec::with_capacity(rows + 1);
        let mut solar_gain = Vec::with_capacity(rows + 1);
        let mut setpoint_col = Vec::with_capacity(rows + 1);
        let mut setpoint_act = Vec::with_capacity(rows + 1);
        let mut shade_col = Vec::with_capacity(rows + 1);
        let mut shade_act = Vec::with_capacity(rows + 1);

        for k in 0..=rows {
            let t = if k == rows {
                final_time
            } else {
                start_time + dt_row * k as f64
            };

            if !self.temp_c.is_finite() {
                return Err(EmulatorError::Diverged {
                    time: t,
                    variable: "zoneTemp".to_string(),
                    value: self.temp_c,
                });
            }

            let setpoint = setpoint_override.unwrap_or_else(|| self.scheduled_setpoint(t));
            let shade = shade_override.unwrap_or(0.0);
            let noise = gaussian_noise(&mut self.rng, self.weather_noise_std_c);
            let t_out = outdoor_temp_c(t, self.weather_mean_c, self.weather_amplitude_c) + noise;
            let irradiance = solar_irradiance_w_m2(t, self.solar_peak_w_m2);
            let q_solar =
                (1.0 - SHADE_BLOCK_FRACTION * shade) * irradiance * self.solar_aperture_m2 / 1000.0;
            let q_heat = self.heater_power_kw(setpoint);

            time.push(t);
            zone_temp.push(self.temp_c);
            heater_power.push(q_heat);
            outdoor_temp.push(t_out);
            solar_gain.push(q_solar);
            setpoint_col.push(setpoint);
            setpoint_act.push(if setpoint_override.is_some() { 1.0 } else { 0.0 });
            shade_col.push(shade);
            shade_act.push(if shade_override.is_some() { 1.0 } else { 0.0 });

            if k < rows {
                let substeps = (dt_row / MAX_EULER_DT_S).ceil().max(1.0) as usize;
                let dt = dt_row / substeps as f64;
                for _ in 0..substeps {
                    let q_net = (t_out - self.temp_c) / self.thermal_resistance_k_per_kw
                        + self.heater_power_kw(setpoint)
                        + q_solar;
                    self.temp_c += q_net / (self.thermal_capacitance_kwh_per_k * 3600.0) * dt;
                }
            }
        }

        let mut output = SimulationOutput::new();
        output.columns.insert(TIME_KEY.to_string(), time);
        output.columns.insert("zoneTemp".to_string(), zone_temp);
        output
            .columns
            .insert("heaterPower".to_string(), heater_power);
        output
            .columns
            .insert("outdoorTemp".to_string(), outdoor_temp);
        output.columns.insert("solarGain".to_string(), solar_gain);
        output
            .columns
            .insert("heatingSetpoint".to_string(), setpoint_col);
        output
            .columns
            .insert("heatingSetpoint_activate".to_string(), setpoint_act);
        output
            .columns
            .insert("shadePosition".to_string(), shade_col);
        output
            .columns
            .insert("shadePosition_activate".to_string(), shade_act);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::InputTrajectory;

    fn zone() -> ThermalZone {
        ThermalZone::new(&EmulatorConfig::default(), 42)
    }

    fn trajectory(values: &[(&str, f64)]) -> InputTrajectory {
        InputTrajectory {
            start_time: 0.0,
            values: values
                .iter()
                .map(|&(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    #[test]
    fn test_catalog_declares_override_pairs() {
        let z = zone();
        let names: Vec<_> = z.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "heatingSetpoint",
                "heatingSetpoint_activate",
                "shadePosition",
                "shadePosition_activate",
                "zoneTemp",
                "heaterPower",
                "outdoorTemp",
                "solarGain",
            ]
        );

        let setpoint = &z.variables()[0];
        assert_eq!(setpoint.minimum, Some(15.0));
        assert_eq!(setpoint.maximum, Some(30.0));
    }

    #[test]
    fn test_empty_window_rejected() {
        let mut z = zone();
        assert!(matches!(
            z.simulate(0.0, 0.0, true, None),
            Err(EmulatorError::EmptyWindow { .. })
        ));
        assert!(matches!(
            z.simulate(300.0, 0.0, true, None),
            Err(EmulatorError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn test_rows_span_window_endpoints() {
        let mut z = zone();
        let output = z.simulate(0.0, 300.0, true, None).unwrap();

        let time = output.column("time").unwrap();
        assert_eq!(time.len(), 11);
        assert_eq!(time[0], 0.0);
        assert_eq!(*time.last().unwrap(), 300.0);

        for spec in z.variables() {
            let column = output.column(&spec.name).unwrap();
            assert_eq!(column.len(), time.len(), "column {}", spec.name);
        }
    }

    #[test]
    fn test_override_applies_and_echoes() {
        let mut z = zone();
        let input = trajectory(&[("heatingSetpoint", 25.0), ("heatingSetpoint_activate", 1.0)]);
        let output = z.simulate(0.0, 300.0, true, Some(&input)).unwrap();

        assert!(
            output
                .column("heatingSetpoint")
                .unwrap()
                .iter()
                .all(|&v| v == 25.0)
        );
        assert!(
            output
                .column("heatingSetpoint_activate")
                .unwrap()
                .iter()
                .all(|&v| v == 1.0)
        );
    }

    #[test]
    fn test_written_value_without_flag_applies() {
        let mut z = zone();
        let input = trajectory(&[("heatingSetpoint", 25.0)]);
        let output = z.simulate(0.0, 300.0, true, Some(&input)).unwrap();
        assert!(
            output
                .column("heatingSetpoint")
                .unwrap()
                .iter()
                .all(|&v| v == 25.0)
        );
    }

    #[test]
    fn test_zero_flag_cancels_override() {
        let mut z = zone();
        let input = trajectory(&[("heatingSetpoint", 25.0), ("heatingSetpoint_activate", 0.0)]);
        let output = z.simulate(0.0, 300.0, true, Some(&input)).unwrap();

        // 00:00 to 00:05 is outside occupied hours, so the schedule holds.
        let night = EmulatorConfig::default().setpoint_night_c;
        assert!(
            output
                .column("heatingSetpoint")
                .unwrap()
                .iter()
                .all(|&v| v == night)
        );
        assert!(
            output
                .column("heatingSetpoint_activate")
                .unwrap()
                .iter()
                .all(|&v| v == 0.0)
        );
    }

    #[test]
    fn test_heater_drives_temperature_toward_setpoint() {
        let mut z = zone();
        let input = trajectory(&[("heatingSetpoint", 28.0), ("heatingSetpoint_activate", 1.0)]);

        let mut start = 0.0;
        let mut first = None;
        let mut last = 0.0;
        for step in 0..12 {
            let output = z
                .simulate(start, start + 300.0, step == 0, Some(&input))
                .unwrap();
            let temps = output.column("zoneTemp").unwrap();
            if first.is_none() {
                first = Some(temps[0]);
            }
            last = *temps.last().unwrap();
            start += 300.0;
        }

        assert!(last > first.unwrap());
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let config = EmulatorConfig::default();
        let mut a = ThermalZone::new(&config, 7);
        let mut b = ThermalZone::new(&config, 7);

        let out_a = a.simulate(0.0, 600.0, true, None).unwrap();
        let out_b = b.simulate(0.0, 600.0, true, None).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_initialize_replays_from_scratch() {
        let mut z = zone();
        let fresh = z.simulate(0.0, 300.0, true, None).unwrap();
        z.simulate(300.0, 600.0, false, None).unwrap();

        let replay = z.simulate(0.0, 300.0, true, None).unwrap();
        assert_eq!(fresh, replay);
    }

    #[test]
    fn test_unstable_parameters_reported_as_divergence() {
        let mut z = zone();
        z.thermal_capacitance_kwh_per_k = 1e-9;
        let result = z.simulate(0.0, 300.0, true, None);
        assert!(matches!(result, Err(EmulatorError::Diverged { .. })));
    }
}
