//! Genetic Algorithm framework.
//!
//! A generic GA engine built on a single trait. Users define their problem
//! by implementing [`Chromosome`], which specifies how to create, score,
//! crossover, and mutate individuals. The engine only ever maximizes.
//!
//! # Core Traits
//!
//! - [`Chromosome`]: A candidate solution and its genetic operators
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, selection, rates)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final optimization result with statistics
//! - [`GenerationStats`]: Per-generation snapshot passed to observers
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner, GenerationStats};
pub use selection::{Selection, Selector};
pub use types::Chromosome;
