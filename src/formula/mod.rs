//! Equation parsing and evaluation.
//!
//! An equation string such as `"6a^0.75 - 3b + 3c - 12d = 25"` is split on
//! its single optional `=`. The left side is compiled into a
//! [`CompiledFormula`]; the right side must be a constant expression and is
//! evaluated once into the target. The result is a [`FormulaBinding`], an
//! immutable value shared by every individual of a search run.
//!
//! # Key Types
//!
//! - [`Evaluator`]: the seam between the search core and whatever computes
//!   the left-hand side for an assignment
//! - [`FormulaBinding`]: evaluator + ordered free variables + target
//! - [`CompiledFormula`]: the built-in evaluator produced by parsing

mod compile;
mod lexer;
mod parser;

use std::fmt;
use std::sync::Arc;

pub use compile::{CompiledFormula, Function};
pub use parser::{parse_expression, Expr, MAX_DEPTH};

use crate::error::{EvalError, FormulaError};
use crate::search::Assignment;

/// Computes the left-hand side of an equation for one assignment.
///
/// Implementations must be pure: the same assignment always yields the same
/// result. The search core memoizes on that assumption.
pub trait Evaluator: Send + Sync + fmt::Debug {
    /// Returns the value of the expression, or why it has none.
    fn evaluate(&self, assignment: &Assignment) -> Result<f64, EvalError>;
}

impl Evaluator for CompiledFormula {
    fn evaluate(&self, assignment: &Assignment) -> Result<f64, EvalError> {
        self.eval(assignment.values())
    }
}

/// Immutable pairing of an evaluator, its free variables, and the target.
///
/// Cloning is cheap: the evaluator and the variable list are shared.
#[derive(Debug, Clone)]
pub struct FormulaBinding {
    evaluator: Arc<dyn Evaluator>,
    variables: Arc<[String]>,
    target: f64,
}

impl FormulaBinding {
    /// Binds an arbitrary evaluator.
    ///
    /// `variables` must list exactly the names the evaluator reads, in the
    /// order assignments will store them.
    pub fn new(evaluator: Arc<dyn Evaluator>, variables: Vec<String>, target: f64) -> Self {
        Self {
            evaluator,
            variables: variables.into(),
            target,
        }
    }

    /// Parses `lhs` or `lhs = rhs` and compiles the left-hand side.
    ///
    /// # Errors
    ///
    /// Any [`FormulaError`]: blank sides, more than one `=`, syntax errors,
    /// unknown functions, or a right-hand side that is not a finite constant.
    ///
    /// ```
    /// use u_eqsearch::formula::FormulaBinding;
    ///
    /// let binding = FormulaBinding::parse("2*a - 4 = 0").unwrap();
    /// assert_eq!(binding.variables(), ["a"]);
    /// assert_eq!(binding.target(), 0.0);
    /// ```
    pub fn parse(equation: &str) -> Result<Self, FormulaError> {
        let equals = equation.matches('=').count();
        if equals > 1 {
            return Err(FormulaError::TooManyEquals(equals));
        }

        let (lhs, rhs) = match equation.split_once('=') {
            Some((lhs, rhs)) => (lhs, Some(rhs)),
            None => (equation, None),
        };

        let formula = CompiledFormula::compile(parse_expression(lhs, 0)?);
        let target = match rhs {
            Some(rhs) => constant_target(rhs, lhs.len() + 1)?,
            None => 0.0,
        };

        let variables = formula.variables().to_vec();
        Ok(Self::new(Arc::new(formula), variables, target))
    }

    pub fn evaluator(&self) -> &Arc<dyn Evaluator> {
        &self.evaluator
    }

    /// Free variables in assignment order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Shared handle to the variable list, for building assignments.
    pub fn variable_names(&self) -> &Arc<[String]> {
        &self.variables
    }

    /// Right-hand side value the left-hand side must reach.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Runs the evaluator and subtracts the target.
    pub fn residual(&self, assignment: &Assignment) -> Result<f64, EvalError> {
        Ok(self.evaluator.evaluate(assignment)? - self.target)
    }
}

fn constant_target(src: &str, offset: usize) -> Result<f64, FormulaError> {
    let compiled = CompiledFormula::compile(parse_expression(src, offset)?);
    if !compiled.variables().is_empty() {
        return Err(FormulaError::NonConstantTarget(compiled.variables().to_vec()));
    }
    match compiled.eval(&[]) {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormulaError::InvalidTarget),
    }
}
