//! Boundary data and KPI definition loading.
//!
//! The bench consults this module once at construction: it either reads
//! a boundary CSV (exogenous series such as outdoor temperature and
//! tariffs) or synthesizes one period of data from the weather
//! configuration, and pairs it with the KPI definitions.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::{BenchConfig, EmulatorConfig};
use crate::emulator::weather::{DAY_SECONDS, outdoor_temp_c, solar_irradiance_w_m2};
use crate::sim::kpi::KpiSpec;
use crate::sim::types::TIME_KEY;

const PRICE_PEAK: f64 = 0.35;
const PRICE_OFFPEAK: f64 = 0.15;

/// Failures while loading boundary data or KPI definitions.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid boundary data: {reason}")]
    Invalid { reason: String },
}

/// Periodic exogenous series sampled over one period.
///
/// Lookups interpolate linearly between samples and wrap around the
/// period, so any simulation time maps onto the stored data.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryData {
    times: Vec<f64>,
    columns: BTreeMap<String, Vec<f64>>,
    period: f64,
}

impl BoundaryData {
    /// Synthesizes one period of hourly boundary data from the weather
    /// configuration: `outdoorTemp`, `solarIrradiance`, and a two-rate
    /// `priceElectricity` tariff.
    ///
    /// # Panics
    ///
    /// Panics if `period` is not positive.
    pub fn synthetic(config: &EmulatorConfig, period: f64) -> Self {
        assert!(period > 0.0);

        let samples = ((period / 3600.0).ceil() as usize).max(1);
        let mut times = Vec::with_capacity(samples);
        let mut outdoor = Vec::with_capacity(samples);
        let mut irradiance = Vec::with_capacity(samples);
        let mut price = Vec::with_capacity(samples);
        for k in 0..samples {
            let t = k as f64 * 3600.0;
            if t >= period {
                break;
            }
            times.push(t);
            outdoor.push(outdoor_temp_c(
                t,
                config.weather_mean_c,
                config.weather_amplitude_c,
            ));
            irradiance.push(solar_irradiance_w_m2(t, config.solar_peak_w_m2));
            price.push(price_at(t));
        }

        let mut columns = BTreeMap::new();
        columns.insert("outdoorTemp".to_string(), outdoor);
        columns.insert("solarIrradiance".to_string(), irradiance);
        columns.insert("priceElectricity".to_string(), price);
        Self {
            times,
            columns,
            period,
        }
    }

    /// Reads boundary data from CSV text with a header row.
    ///
    /// The file must carry a `time` column in seconds, strictly
    /// increasing, starting at or after zero and ending before
    /// `period`; the wrap segment interpolates between the last and
    /// first samples.
    pub fn from_csv_reader<R: io::Read>(reader: R, period: f64) -> Result<Self, DataError> {
        if period <= 0.0 {
            return Err(invalid("period must be positive"));
        }

        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let Some(time_idx) = headers.iter().position(|h| h == TIME_KEY) else {
            return Err(invalid("missing time column"));
        };

        let mut times = Vec::new();
        let mut columns: BTreeMap<String, Vec<f64>> = headers
            .iter()
            .filter(|&name| name != TIME_KEY)
            .map(|name| (name.clone(), Vec::new()))
            .collect();

        for record in csv_reader.records() {
            let record = record?;
            for (idx, field) in record.iter().enumerate() {
                let value: f64 = field.trim().parse().map_err(|_| {
                    invalid(&format!("cannot parse {:?} in column {}", field, headers[idx]))
                })?;
                if idx == time_idx {
                    times.push(value);
                } else if let Some(series) = columns.get_mut(&headers[idx]) {
                    series.push(value);
                }
            }
        }

        if times.is_empty() {
            return Err(invalid("no data rows"));
        }
        if times[0] < 0.0 {
            return Err(invalid("time starts before zero"));
        }
        if !times.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(invalid("time column is not strictly increasing"));
        }
        if times.last().copied().unwrap_or(0.0) >= period {
            return Err(invalid("time column reaches past one period"));
        }

        Ok(Self {
            times,
            columns,
            period,
        })
    }

    /// Reads boundary data from a CSV file. See [`Self::from_csv_reader`].
    pub fn from_csv_path(path: impl AsRef<Path>, period: f64) -> Result<Self, DataError> {
        let file = fs::File::open(path)?;
        Self::from_csv_reader(io::BufReader::new(file), period)
    }

    /// Iterates the exogenous series names, [`TIME_KEY`] excluded.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Repetition period of the data, in seconds.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Number of stored sample rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` when no sample rows are stored.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Interpolated value of `name` at `time_s`, wrapping around the
    /// period. `None` for unknown names or empty data.
    pub fn value_at(&self, name: &str, time_s: f64) -> Option<f64> {
        let series = self.columns.get(name)?;
        let first = *self.times.first()?;
        if self.times.len() == 1 {
            return series.first().copied();
        }

        let t = time_s.rem_euclid(self.period);
        let last_idx = self.times.len() - 1;
        let idx = self.times.partition_point(|&sample| sample <= t);
        let (t0, v0, t1, v1) = if idx == 0 {
            // Before the first sample: wrap back to the last one.
            (
                self.times[last_idx] - self.period,
                series[last_idx],
                first,
                series[0],
            )
        } else if idx > last_idx {
            (
                self.times[last_idx],
                series[last_idx],
                first + self.period,
                series[0],
            )
        } else {
            (self.times[idx - 1], series[idx - 1], self.times[idx], series[idx])
        };

        let frac = (t - t0) / (t1 - t0);
        Some(v0 + frac * (v1 - v0))
    }
}

/// Two-rate daily tariff: peak between 07:00 and 23:00.
fn price_at(time_s: f64) -> f64 {
    let hour = time_s.rem_euclid(DAY_SECONDS) / 3600.0;
    if (7.0..23.0).contains(&hour) {
        PRICE_PEAK
    } else {
        PRICE_OFFPEAK
    }
}

fn invalid(reason: &str) -> DataError {
    DataError::Invalid {
        reason: reason.to_string(),
    }
}

/// Loads boundary data and KPI definitions for a bench configuration:
/// files when paths are configured, synthetic data and zone defaults
/// otherwise.
pub fn load(config: &BenchConfig) -> Result<(BoundaryData, KpiSpec), DataError> {
    let boundary = match &config.data.boundary_csv {
        Some(path) => BoundaryData::from_csv_path(path, config.data.period)?,
        None => BoundaryData::synthetic(&config.emulator, config.data.period),
    };

    let kpis = match &config.data.kpi_json {
        Some(path) => KpiSpec::from_json_str(&fs::read_to_string(path)?)?,
        None => KpiSpec::default(),
    };

    Ok((boundary, kpis))
}
