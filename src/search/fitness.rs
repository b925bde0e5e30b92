//! Residuals and the fitness transform.

use std::fmt;

use crate::error::EvalError;

/// Fitness of an exact solution: the largest integer an `f64` represents
/// exactly (2^53 − 1). The engine's default stopping threshold.
pub const MAX_FITNESS: f64 = 9_007_199_254_740_991.0;

/// Ceiling for non-zero residuals, so a near miss never ties a solution.
const MAX_NEAR_MISS_FITNESS: f64 = MAX_FITNESS - 1.0;

/// Left-hand side minus target for one assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Residual {
    Value(f64),
    /// The evaluator produced no number (division by zero, non-real result,
    /// unbound variable).
    Invalid,
}

impl Residual {
    pub fn value(self) -> Option<f64> {
        match self {
            Residual::Value(v) => Some(v),
            Residual::Invalid => None,
        }
    }

    /// Exactly zero: the assignment satisfies the equation.
    pub fn is_solution(self) -> bool {
        self == Residual::Value(0.0)
    }

    /// Maps the residual to a score, higher is better.
    ///
    /// - invalid, non-finite, or `|r| > MAX_FITNESS` → `0.0`
    /// - `r == 0` → [`MAX_FITNESS`]
    /// - otherwise `1 / |r|`, capped just below [`MAX_FITNESS`]
    ///
    /// ```
    /// use u_eqsearch::search::{Residual, MAX_FITNESS};
    ///
    /// assert_eq!(Residual::Value(0.0).fitness(), MAX_FITNESS);
    /// assert_eq!(Residual::Value(-2.0).fitness(), 0.5);
    /// assert_eq!(Residual::Invalid.fitness(), 0.0);
    /// ```
    pub fn fitness(self) -> f64 {
        match self {
            Residual::Invalid => 0.0,
            Residual::Value(r) if !r.is_finite() || r.abs() > MAX_FITNESS => 0.0,
            Residual::Value(r) if r == 0.0 => MAX_FITNESS,
            Residual::Value(r) => (1.0 / r.abs()).min(MAX_NEAR_MISS_FITNESS),
        }
    }
}

impl From<Result<f64, EvalError>> for Residual {
    fn from(result: Result<f64, EvalError>) -> Self {
        match result {
            Ok(v) => Residual::Value(v),
            Err(_) => Residual::Invalid,
        }
    }
}

impl fmt::Display for Residual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Residual::Value(v) => write!(f, "{v}"),
            Residual::Invalid => f.write_str("invalid"),
        }
    }
}
