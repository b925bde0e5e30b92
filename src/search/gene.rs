//! Random gene values.

use log::warn;
use rand::Rng;

use super::config::SearchConfig;

/// Rejection-sampling attempts before the integer branch switches to a scan.
const MAX_RESAMPLES: usize = 64;

/// Draws one gene value.
///
/// With probability `float_ratio` the value is a uniform float in
/// `[min, max]` rounded to `decimal_points` digits; otherwise it is a uniform
/// integer in the range that is not in `excluded`. Float draws may round to
/// zero.
///
/// Expects a validated config. If the integer branch is taken on a config
/// with no allowed integer, a float is returned instead of looping.
pub fn generate_value<R: Rng + ?Sized>(config: &SearchConfig, rng: &mut R) -> f64 {
    if rng.random::<f64>() < config.float_ratio {
        return random_float(config, rng);
    }
    match random_integer(config, rng) {
        Some(v) => v as f64,
        None => random_float(config, rng),
    }
}

/// Rounds half away from zero to `decimal_points` digits.
///
/// Values too large to scale are returned unchanged; they carry no
/// fractional digits at that magnitude anyway.
pub fn round_to(value: f64, decimal_points: u32) -> f64 {
    let scale = 10f64.powi(decimal_points as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

fn random_float<R: Rng + ?Sized>(config: &SearchConfig, rng: &mut R) -> f64 {
    let raw = if config.min < config.max {
        rng.random_range(config.min..=config.max)
    } else {
        config.min
    };
    round_to(raw, config.decimal_points).clamp(config.min, config.max)
}

fn random_integer<R: Rng + ?Sized>(config: &SearchConfig, rng: &mut R) -> Option<i64> {
    let (lo, hi) = config.integer_bounds()?;

    for _ in 0..MAX_RESAMPLES {
        let v = rng.random_range(lo..=hi);
        if !config.excluded.contains(&v) {
            return Some(v);
        }
    }

    // The excluded set is finite, so walking `excluded.len() + 1` steps from
    // any start within the range hits an allowed integer if one exists.
    warn!(
        "integer resampling exhausted {MAX_RESAMPLES} attempts in [{lo}, {hi}], scanning"
    );
    let width = hi as i128 - lo as i128 + 1;
    let start = rng.random_range(lo..=hi) as i128 - lo as i128;
    (0..=config.excluded.len() as i128)
        .map(|step| (lo as i128 + (start + step) % width) as i64)
        .find(|v| !config.excluded.contains(v))
}
