//! Individual representation and genetic operators for equation solving.
//!
//! An individual ([`EquationChromosome`]) is one assignment of numbers to the
//! equation's free variables. Its quality is the residual
//! `lhs(assignment) - target`, turned into a fitness where a smaller
//! distance from zero scores strictly higher and an exact solution scores
//! [`MAX_FITNESS`].
//!
//! # Key Types
//!
//! - [`SearchConfig`]: value range, rounding precision, float/integer mix,
//!   excluded integers
//! - [`SearchSpace`]: formula binding + config shared by one run
//! - [`Assignment`]: variable name → value
//! - [`Residual`]: memoized evaluation result, or invalid
//! - [`EquationChromosome`]: create, fitness, crossover, mutate
//!
//! # Operators
//!
//! - Seeding draws every gene independently via [`generate_value`].
//! - Crossover is uniform, per gene and per child.
//! - Mutation redraws each gene with a given probability and hands back the
//!   original individual when nothing changed.

mod assignment;
mod chromosome;
mod config;
mod fitness;
mod gene;

pub use assignment::Assignment;
pub use chromosome::{EquationChromosome, SearchSpace};
pub use config::{SearchConfig, MAX_DECIMAL_POINTS};
pub use fitness::{Residual, MAX_FITNESS};
pub use gene::{generate_value, round_to};
