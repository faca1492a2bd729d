//! Post-hoc KPI computation over the accumulated trajectory stores.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::store::TrajectoryStore;
use super::types::TIME_KEY;

/// Declares which trajectories feed each KPI and the constants used to
/// score them. Loaded from a JSON definition file or defaulted for the
/// built-in zone model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KpiSpec {
    /// Variables integrated into total energy use, in kW.
    pub energy_variables: Vec<String>,
    /// Temperature trajectory scored for comfort, in degC.
    pub comfort_variable: String,
    /// Lower edge of the comfort band, degC.
    pub comfort_lower_c: f64,
    /// Upper edge of the comfort band, degC.
    pub comfort_upper_c: f64,
    /// Flat electricity tariff, currency per kWh.
    pub price_per_kwh: f64,
    /// Grid emission factor, kg CO2 per kWh.
    pub emissions_kg_per_kwh: f64,
}

impl Default for KpiSpec {
    fn default() -> Self {
        Self {
            energy_variables: vec!["heaterPower".to_string()],
            comfort_variable: "zoneTemp".to_string(),
            comfort_lower_c: 20.0,
            comfort_upper_c: 25.0,
            price_per_kwh: 0.25,
            emissions_kg_per_kwh: 0.2,
        }
    }
}

impl KpiSpec {
    /// Parses a spec from its JSON definition text.
    ///
    /// Missing fields fall back to the built-in zone defaults; unknown
    /// fields are rejected.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Aggregate key performance indicators derived from a complete run.
///
/// Computed post-hoc from the trajectory stores so reported metrics
/// always match the committed history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    /// Total energy use across the scored variables (kWh).
    pub energy_use_kwh: f64,
    /// Integrated comfort-band violation (K*h).
    pub thermal_discomfort_kh: f64,
    /// Energy cost at the flat tariff (currency units).
    pub energy_cost: f64,
    /// Operational CO2 emissions (kg).
    pub emissions_kg: f64,
    /// Largest instantaneous scored power sample (kW).
    pub peak_power_kw: f64,
    /// Mean caller decision latency divided by the step length.
    pub time_ratio: f64,
}

impl KpiReport {
    /// Computes all KPIs from the accumulated stores.
    ///
    /// # Arguments
    ///
    /// * `spec` - KPI definitions to score against
    /// * `y` - Measurement histories
    /// * `u` - Echoed control input histories
    /// * `elapsed` - Wall-clock decision latencies, one per step after the first
    /// * `step_s` - Current step length in seconds
    ///
    /// # Returns
    ///
    /// A `KpiReport` with all fields populated; a run with fewer than
    /// two samples scores zero everywhere.
    pub fn from_stores(
        spec: &KpiSpec,
        y: &TrajectoryStore,
        u: &TrajectoryStore,
        elapsed: &[f64],
        step_s: f64,
    ) -> Self {
        let time_ratio = if elapsed.is_empty() || step_s <= 0.0 {
            0.0
        } else {
            let mean = elapsed.iter().sum::<f64>() / elapsed.len() as f64;
            mean / step_s
        };

        let Some(time) = y.series(TIME_KEY).filter(|series| series.len() >= 2) else {
            return Self {
                energy_use_kwh: 0.0,
                thermal_discomfort_kh: 0.0,
                energy_cost: 0.0,
                emissions_kg: 0.0,
                peak_power_kw: 0.0,
                time_ratio,
            };
        };

        let mut energy_kwh = 0.0;
        let mut peak_kw = 0.0_f64;
        for name in &spec.energy_variables {
            if let Some(power) = series(y, u, name) {
                energy_kwh += trapezoid(time, power) / 3600.0;
                peak_kw = power.iter().copied().fold(peak_kw, f64::max);
            }
        }

        let discomfort_kh = series(y, u, &spec.comfort_variable)
            .map(|temps| {
                let violation: Vec<f64> = temps
                    .iter()
                    .map(|&t| (spec.comfort_lower_c - t).max(0.0) + (t - spec.comfort_upper_c).max(0.0))
                    .collect();
                trapezoid(time, &violation) / 3600.0
            })
            .unwrap_or(0.0);

        Self {
            energy_use_kwh: energy_kwh,
            thermal_discomfort_kh: discomfort_kh,
            energy_cost: energy_kwh * spec.price_per_kwh,
            emissions_kg: energy_kwh * spec.emissions_kg_per_kwh,
            peak_power_kw: peak_kw,
            time_ratio,
        }
    }
}

fn series<'a>(y: &'a TrajectoryStore, u: &'a TrajectoryStore, name: &str) -> Option<&'a [f64]> {
    y.series(name).or_else(|| u.series(name))
}

/// Trapezoidal integral of `values` over `time`, in value-seconds.
fn trapezoid(time: &[f64], values: &[f64]) -> f64 {
    let mut total = 0.0;
    for i in 1..time.len().min(values.len()) {
        let dt = time[i] - time[i - 1];
        total += 0.5 * (values[i] + values[i - 1]) * dt;
    }
    total
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Energy use:           {:.3} kWh", self.energy_use_kwh)?;
        writeln!(f, "Thermal discomfort:   {:.3} K*h", self.thermal_discomfort_kh)?;
        writeln!(f, "Energy cost:          {:.3}", self.energy_cost)?;
        writeln!(f, "Emissions:            {:.3} kg CO2", self.emissions_kg)?;
        writeln!(f, "Peak power:           {:.2} kW", self.peak_power_kw)?;
        write!(f, "Control time ratio:   {:.4}", self.time_ratio)
    }
}
