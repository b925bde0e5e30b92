//! Error taxonomy.
//!
//! Only configuration-time problems are fatal. Numeric anomalies during the
//! search ([`EvalError`]) are absorbed into the fitness function and never
//! surface to the caller as errors.

use thiserror::Error;

/// Invalid search or engine configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A range bound is NaN or infinite.
    #[error("range bounds must be finite, got [{min}, {max}]")]
    NonFiniteRange { min: f64, max: f64 },

    /// Both bounds are finite but `max - min` is not.
    #[error("range [{min}, {max}] is too wide, its width overflows f64")]
    RangeTooWide { min: f64, max: f64 },

    /// `min > max`.
    #[error("range is inverted: min {min} > max {max}")]
    InvertedRange { min: f64, max: f64 },

    /// `float_ratio` outside `[0, 1]`.
    #[error("float_ratio must be within [0, 1], got {0}")]
    FloatRatioOutOfBounds(f64),

    /// Rounding precision beyond what an `f64` can represent.
    #[error("decimal_points must be at most {max}, got {got}")]
    TooManyDecimalPoints { got: u32, max: u32 },

    /// The integer branch can be taken but every integer in range is excluded.
    #[error("no integer in [{min}, {max}] survives the excluded set {excluded:?}")]
    NoAllowedInteger {
        min: f64,
        max: f64,
        excluded: Vec<i64>,
    },

    /// An engine parameter is out of bounds.
    #[error("invalid engine parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

/// Malformed equation string.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// The equation, or one side of it, is blank.
    #[error("empty expression")]
    Empty,

    /// More than one `=` sign.
    #[error("equation contains {0} `=` signs, at most one is allowed")]
    TooManyEquals(usize),

    /// A character the lexer does not recognise.
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// A numeric literal that does not parse as `f64`.
    #[error("malformed number {0:?}")]
    BadNumber(String),

    /// A token in a position the grammar does not allow.
    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    /// Input ended in the middle of an expression.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A call to a function outside the built-in library.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    /// Wrong number of arguments in a function call.
    #[error("function `{name}` takes {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// Nesting or operator chains beyond the supported depth.
    #[error("expression nested deeper than {max} levels at offset {offset}")]
    TooDeep { offset: usize, max: usize },

    /// The right-hand side references free variables.
    #[error("right-hand side must be constant, found variables {0:?}")]
    NonConstantTarget(Vec<String>),

    /// The right-hand side does not evaluate to a finite number.
    #[error("right-hand side does not evaluate to a finite number")]
    InvalidTarget,
}

/// Failure while evaluating a compiled formula for one assignment.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    /// Division by an exact zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The formula reads a variable slot the assignment does not provide.
    #[error("variable slot {0} is unbound")]
    UnboundVariable(usize),

    /// The result is not a real number.
    #[error("result is not a real number")]
    NonReal,
}

/// Crate-level error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// An explicitly supplied assignment does not cover exactly the
    /// formula's free variables.
    #[error("assignment variables {actual:?} do not match formula variables {expected:?}")]
    AssignmentMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// A value list whose length differs from the variable list.
    #[error("expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
}
