//! TOML-based bench configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Top-level bench configuration parsed from TOML.
///
/// All fields have defaults matching the baseline setup. Load from
/// TOML with [`BenchConfig::from_toml_file`] or use
/// [`BenchConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    /// Step length, seed, and other run-wide parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Built-in thermal zone parameters.
    #[serde(default)]
    pub emulator: EmulatorConfig,
    /// Default forecast window.
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Boundary data and KPI definition sources.
    #[serde(default)]
    pub data: DataConfig,
}

/// Step length, seed, and other run-wide parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Default control interval length in seconds (must be > 0).
    pub step: f64,
    /// Master random seed for weather noise.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step: 300.0,
            seed: 42,
        }
    }
}

/// Built-in thermal zone parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmulatorConfig {
    /// Zone temperature at initialization (degC).
    pub initial_temp_c: f64,
    /// Envelope thermal resistance (K/kW, must be > 0).
    pub thermal_resistance_k_per_kw: f64,
    /// Lumped thermal capacitance (kWh/K, must be > 0).
    pub thermal_capacitance_kwh_per_k: f64,
    /// Heater power ceiling (kW).
    pub heater_max_kw: f64,
    /// Proportional heater gain (kW/K).
    pub heater_gain_kw_per_k: f64,
    /// Effective solar aperture (m2).
    pub solar_aperture_m2: f64,
    /// Daily mean outdoor temperature (degC).
    pub weather_mean_c: f64,
    /// Daily outdoor temperature swing (K).
    pub weather_amplitude_c: f64,
    /// Outdoor temperature noise standard deviation (K).
    pub weather_noise_std_c: f64,
    /// Scheduled occupied-hours setpoint (degC).
    pub setpoint_day_c: f64,
    /// Scheduled unoccupied-hours setpoint (degC).
    pub setpoint_night_c: f64,
    /// Peak clear-sky irradiance (W/m2).
    pub solar_peak_w_m2: f64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            initial_temp_c: 20.0,
            thermal_resistance_k_per_kw: 5.0,
            thermal_capacitance_kwh_per_k: 3.0,
            heater_max_kw: 5.0,
            heater_gain_kw_per_k: 2.0,
            solar_aperture_m2: 8.0,
            weather_mean_c: 5.0,
            weather_amplitude_c: 5.0,
            weather_noise_std_c: 0.3,
            setpoint_day_c: 21.0,
            setpoint_night_c: 18.0,
            solar_peak_w_m2: 600.0,
        }
    }
}

/// Default forecast window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Forecast horizon in seconds (must be >= 0).
    pub horizon: f64,
    /// Forecast sampling interval in seconds (must be >= 0).
    pub interval: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 86_400.0,
            interval: 3600.0,
        }
    }
}

/// Boundary data and KPI definition sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Boundary data CSV; synthetic weather is generated when unset.
    pub boundary_csv: Option<PathBuf>,
    /// KPI definition JSON; zone defaults are used when unset.
    pub kpi_json: Option<PathBuf>,
    /// Repetition period of the boundary data in seconds (must be > 0).
    pub period: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            boundary_csv: None,
            kpi_json: None,
            period: 86_400.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.step"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl BenchConfig {
    /// Returns the baseline configuration: a mild winter day driven at
    /// a five-minute step.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            emulator: EmulatorConfig::default(),
            forecast: ForecastConfig::default(),
            data: DataConfig::default(),
        }
    }

    /// Returns the fine-step preset: one-minute control intervals with
    /// a short, dense forecast window.
    pub fn fine_step() -> Self {
        Self {
            simulation: SimulationConfig {
                step: 60.0,
                ..SimulationConfig::default()
            },
            forecast: ForecastConfig {
                horizon: 21_600.0,
                interval: 900.0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the heavy-mass preset: a sluggish high-inertia building
    /// with an undersized heater.
    pub fn heavy_mass() -> Self {
        Self {
            emulator: EmulatorConfig {
                thermal_resistance_k_per_kw: 6.0,
                thermal_capacitance_kwh_per_k: 8.0,
                heater_max_kw: 4.0,
                ..EmulatorConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "fine_step", "heavy_mass"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "fine_step" => Ok(Self::fine_step()),
            "heavy_mass" => Ok(Self::heavy_mass()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML
    /// is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains
    /// unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let sim = &self.simulation;
        if !(sim.step.is_finite() && sim.step > 0.0) {
            errors.push(ConfigError {
                field: "simulation.step".into(),
                message: "must be a positive number of seconds".into(),
            });
        }

        let emu = &self.emulator;
        if !(emu.thermal_resistance_k_per_kw.is_finite() && emu.thermal_resistance_k_per_kw > 0.0) {
            errors.push(ConfigError {
                field: "emulator.thermal_resistance_k_per_kw".into(),
                message: "must be > 0".into(),
            });
        }
        if !(emu.thermal_capacitance_kwh_per_k.is_finite()
            && emu.thermal_capacitance_kwh_per_k > 0.0)
        {
            errors.push(ConfigError {
                field: "emulator.thermal_capacitance_kwh_per_k".into(),
                message: "must be > 0".into(),
            });
        }
        if !(emu.heater_max_kw.is_finite() && emu.heater_max_kw >= 0.0) {
            errors.push(ConfigError {
                field: "emulator.heater_max_kw".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(emu.heater_gain_kw_per_k.is_finite() && emu.heater_gain_kw_per_k >= 0.0) {
            errors.push(ConfigError {
                field: "emulator.heater_gain_kw_per_k".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(emu.solar_aperture_m2.is_finite() && emu.solar_aperture_m2 >= 0.0) {
            errors.push(ConfigError {
                field: "emulator.solar_aperture_m2".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(emu.weather_noise_std_c.is_finite() && emu.weather_noise_std_c >= 0.0) {
            errors.push(ConfigError {
                field: "emulator.weather_noise_std_c".into(),
                message: "must be >= 0".into(),
            });
        }

        let forecast = &self.forecast;
        if !(forecast.horizon.is_finite() && forecast.horizon >= 0.0) {
            errors.push(ConfigError {
                field: "forecast.horizon".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(forecast.interval.is_finite() && forecast.interval >= 0.0) {
            errors.push(ConfigError {
                field: "forecast.interval".into(),
                message: "must be >= 0".into(),
            });
        }

        let data = &self.data;
        if !(data.period.is_finite() && data.period > 0.0) {
            errors.push(ConfigError {
                field: "data.period".into(),
                message: "must be a positive number of seconds".into(),
            });
        }

        errors
    }
}
