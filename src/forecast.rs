//! Forecast generation over the boundary data.

use std::collections::BTreeMap;

use crate::data::BoundaryData;
use crate::sim::types::TIME_KEY;

/// Perfect-knowledge forecaster over the periodic boundary data.
///
/// Samples every exogenous series at a regular grid ahead of the
/// current simulation time. Since the boundary data is deterministic,
/// the forecast is exact rather than predictive.
#[derive(Debug, Default, Clone, Copy)]
pub struct Forecaster;

impl Forecaster {
    /// Produces a forecast window starting at `start_s`.
    ///
    /// # Arguments
    ///
    /// * `data` - Boundary data to sample
    /// * `start_s` - Window start, in simulation seconds
    /// * `horizon_s` - How far ahead to forecast, in seconds
    /// * `interval_s` - Grid spacing, in seconds
    ///
    /// # Returns
    ///
    /// One series per boundary variable plus [`TIME_KEY`], sampled at
    /// `start_s + k * interval_s` for every grid point inside the
    /// horizon, both endpoints included. A zero interval or zero
    /// horizon collapses the window to the single starting point.
    pub fn forecast(
        &self,
        data: &BoundaryData,
        start_s: f64,
        horizon_s: f64,
        interval_s: f64,
    ) -> BTreeMap<String, Vec<f64>> {
        let points = if horizon_s <= 0.0 || interval_s <= 0.0 {
            1
        } else {
            (horizon_s / interval_s + 1e-9).floor() as usize + 1
        };

        let mut forecast = BTreeMap::new();
        let times: Vec<f64> = (0..points)
            .map(|k| start_s + k as f64 * interval_s)
            .collect();

        for name in data.names() {
            let series: Vec<f64> = times
                .iter()
                .map(|&t| data.value_at(name, t).unwrap_or(0.0))
                .collect();
            forecast.insert(name.to_string(), series);
        }
        forecast.insert(TIME_KEY.to_string(), times);
        forecast
    }
}
