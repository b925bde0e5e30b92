//! Gene value generation parameters.
//!
//! [`SearchConfig`] controls how fresh gene values are drawn: the numeric
//! range, the rounding precision of float values, the share of float versus
//! integer draws, and which integers are never generated.

use crate::error::ConfigError;

/// Largest accepted `decimal_points`. Beyond this an `f64` cannot hold the
/// rounded digits anyway.
pub const MAX_DECIMAL_POINTS: u32 = 15;

/// Configuration for gene value generation.
///
/// # Defaults
///
/// ```
/// use u_eqsearch::search::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!((config.min, config.max), (-50.0, 50.0));
/// assert_eq!(config.decimal_points, 1);
/// assert_eq!(config.excluded, vec![0]);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_eqsearch::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_range(-10.0, 10.0)
///     .with_decimal_points(2)
///     .with_float_ratio(0.25)
///     .with_excluded(vec![0, 1]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Lower bound of generated values (inclusive).
    pub min: f64,

    /// Upper bound of generated values (inclusive).
    pub max: f64,

    /// Float values are rounded to this many decimal digits.
    pub decimal_points: u32,

    /// Probability (0.0–1.0) that a generated value is a float rather than
    /// an integer.
    pub float_ratio: f64,

    /// Integers the integer branch never produces.
    ///
    /// Zero is excluded by default so generated genes cannot trivially zero
    /// out a product or a divisor. Float draws are not filtered.
    pub excluded: Vec<i64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min: -50.0,
            max: 50.0,
            decimal_points: 1,
            float_ratio: 0.5,
            excluded: vec![0],
        }
    }
}

impl SearchConfig {
    /// Sets the inclusive value range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets the rounding precision of float values.
    pub fn with_decimal_points(mut self, decimal_points: u32) -> Self {
        self.decimal_points = decimal_points;
        self
    }

    /// Sets the float ratio.
    pub fn with_float_ratio(mut self, ratio: f64) -> Self {
        self.float_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Replaces the set of excluded integers.
    pub fn with_excluded(mut self, excluded: Vec<i64>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Integer bounds `[ceil(min), floor(max)]` of the integer branch.
    ///
    /// `None` when no integer lies in the range.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        let lo = self.min.ceil() as i64;
        let hi = self.max.floor() as i64;
        (lo <= hi).then_some((lo, hi))
    }

    /// Whether the integer branch can be taken at all.
    pub fn draws_integers(&self) -> bool {
        self.float_ratio < 1.0
    }

    /// Validates the configuration.
    ///
    /// Rejects ranges that would make the integer branch loop forever, such
    /// as `[0, 0]` with zero excluded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::NonFiniteRange {
                min: self.min,
                max: self.max,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                min: self.min,
                max: self.max,
            });
        }
        if !(self.max - self.min).is_finite() {
            return Err(ConfigError::RangeTooWide {
                min: self.min,
                max: self.max,
            });
        }
        if !(0.0..=1.0).contains(&self.float_ratio) {
            return Err(ConfigError::FloatRatioOutOfBounds(self.float_ratio));
        }
        if self.decimal_points > MAX_DECIMAL_POINTS {
            return Err(ConfigError::TooManyDecimalPoints {
                got: self.decimal_points,
                max: MAX_DECIMAL_POINTS,
            });
        }
        if self.draws_integers() && !self.has_allowed_integer() {
            return Err(ConfigError::NoAllowedInteger {
                min: self.min,
                max: self.max,
                excluded: self.excluded.clone(),
            });
        }
        Ok(())
    }

    fn has_allowed_integer(&self) -> bool {
        let Some((lo, hi)) = self.integer_bounds() else {
            return false;
        };
        let width = hi as i128 - lo as i128 + 1;
        let mut blocked: Vec<i64> = self
            .excluded
            .iter()
            .copied()
            .filter(|v| (lo..=hi).contains(v))
            .collect();
        blocked.sort_unstable();
        blocked.dedup();
        (blocked.len() as i128) < width
    }
}
