//! Synthetic diurnal weather signals shared by the built-in zone model
//! and the boundary-data generator.

use rand::{Rng, rngs::StdRng};

/// Seconds in one simulated day.
pub const DAY_SECONDS: f64 = 86_400.0;

const SUNRISE_S: f64 = 6.0 * 3600.0;
const SUNSET_S: f64 = 18.0 * 3600.0;
const COLDEST_S: f64 = 4.0 * 3600.0;

/// Outdoor dry-bulb temperature at `time_s` seconds, in degrees Celsius.
///
/// A sinusoid over the day: coldest near 04:00, warmest near 16:00,
/// oscillating `amplitude_c` around `mean_c`. Times past one day wrap.
pub fn outdoor_temp_c(time_s: f64, mean_c: f64, amplitude_c: f64) -> f64 {
    let t = time_s.rem_euclid(DAY_SECONDS);
    let phase = 2.0 * std::f64::consts::PI * (t - COLDEST_S) / DAY_SECONDS;
    mean_c - amplitude_c * phase.cos()
}

/// Global horizontal irradiance at `time_s` seconds, in W/m2.
///
/// A half-sine between 06:00 and 18:00 peaking at `peak_w_m2` around
/// noon, zero at night. Times past one day wrap.
pub fn solar_irradiance_w_m2(time_s: f64, peak_w_m2: f64) -> f64 {
    let t = time_s.rem_euclid(DAY_SECONDS);
    if t < SUNRISE_S || t >= SUNSET_S {
        return 0.0;
    }
    let frac = (t - SUNRISE_S) / (SUNSET_S - SUNRISE_S);
    (peak_w_m2 * (std::f64::consts::PI * frac).sin()).max(0.0)
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
