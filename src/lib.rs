//! Evolutionary search for numeric solutions of equations.
//!
//! Given an equation such as `2*a + 3*b = 7`, the crate evolves a population
//! of variable assignments until one makes the left-hand side equal the
//! right-hand side, or the search budget runs out.
//!
//! - **Formula** ([`formula`]): parses and compiles the equation, binds its
//!   free variables and constant target.
//! - **Search** ([`search`]): the individual representation, random gene
//!   generation, residual-based fitness, uniform crossover and
//!   identity-preserving mutation.
//! - **Genetic Algorithm** ([`ga`]): a generic, parallel evolutionary loop
//!   over any [`ga::Chromosome`].
//!
//! # Example
//!
//! ```
//! use u_eqsearch::ga::{GaConfig, GaRunner};
//! use u_eqsearch::search::{EquationChromosome, SearchConfig, SearchSpace};
//!
//! let config = SearchConfig::default().with_range(-10.0, 10.0).with_float_ratio(0.0);
//! let space = SearchSpace::parse("2*a - 4 = 0", config).unwrap();
//! let ga = GaConfig::default().with_population_size(200).with_seed(7);
//!
//! let result = GaRunner::run::<EquationChromosome>(&space, &ga).unwrap();
//! assert!(result.solved);
//! assert_eq!(result.best.assignment().get("a"), Some(2.0));
//! ```

pub mod error;
pub mod formula;
pub mod ga;
pub mod random;
pub mod search;

pub use error::{ConfigError, Error, EvalError, FormulaError};
