//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::selection::Selection;
use crate::error::ConfigError;
use crate::search::MAX_FITNESS;

/// Configuration for the Genetic Algorithm.
///
/// Controls population size, selection strategy, operator rates,
/// termination conditions, and parallelism.
///
/// # Defaults
///
/// ```
/// use u_eqsearch::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 500);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_eqsearch::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(5000)
///     .with_max_generations(200)
///     .with_crossover_rate(0.2)
///     .with_mutation_rate(0.15)
///     .with_selection(Selection::Tournament(5));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    ///
    /// Larger populations increase diversity but slow down each generation.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Selection strategy for choosing parents.
    pub selection: Selection,

    /// Fraction of the population preserved as elites (0.0–1.0).
    ///
    /// Elite individuals are carried unchanged to the next generation.
    pub elite_ratio: f64,

    /// Probability of applying crossover to a pair of parents (0.0–1.0).
    ///
    /// When crossover is not applied, both parents pass through as-is.
    pub crossover_rate: f64,

    /// Per-gene mutation probability passed to [`Chromosome::mutate`](super::Chromosome::mutate).
    pub mutation_rate: f64,

    /// Fitness at which the run stops as solved.
    ///
    /// Defaults to [`MAX_FITNESS`], the score of an exact solution.
    pub solution_fitness: f64,

    /// Number of generations with no improvement before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination (the default).
    pub stagnation_limit: usize,

    /// Whether to evaluate individuals in parallel using rayon.
    ///
    /// Has no effect without the `parallel` feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at the start of each generation, so the actual runtime may
    /// exceed it by one generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            selection: Selection::default(),
            elite_ratio: 0.1,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            solution_fitness: MAX_FITNESS,
            stagnation_limit: 0,
            parallel: true,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for tournament selection of size `k`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the fitness that counts as solved.
    pub fn with_solution_fitness(mut self, fitness: f64) -> Self {
        self.solution_fitness = fitness;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Number of elites carried into each new generation.
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_ratio) as usize
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name, reason| Err(ConfigError::InvalidParameter { name, reason });

        if self.population_size < 2 {
            return invalid("population_size", "must be at least 2");
        }
        if self.max_generations == 0 {
            return invalid("max_generations", "must be at least 1");
        }
        for (name, rate) in [
            ("elite_ratio", self.elite_ratio),
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return invalid(name, "must be within [0, 1]");
            }
        }
        if self.elite_count() >= self.population_size {
            return invalid("elite_ratio", "elites fill entire population");
        }
        if self.solution_fitness.is_nan() {
            return invalid("solution_fitness", "must not be NaN");
        }
        if let Selection::Tournament(0) = self.selection {
            return invalid("selection", "tournament size must be at least 1");
        }
        if self.time_limit_ms == Some(0) {
            return invalid("time_limit_ms", "must be positive or None");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 500);
        assert_eq!(config.selection, Selection::Tournament(3));
        assert!((config.elite_ratio - 0.1).abs() < 1e-10);
        assert!((config.crossover_rate - 0.9).abs() < 1e-10);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
        assert_eq!(config.solution_fitness, MAX_FITNESS);
        assert_eq!(config.stagnation_limit, 0);
        assert!(config.parallel);
        assert!(config.seed.is_none());
        assert!(config.time_limit_ms.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(5000)
            .with_max_generations(200)
            .with_selection(Selection::Rank)
            .with_elite_ratio(0.2)
            .with_crossover_rate(0.2)
            .with_mutation_rate(0.15)
            .with_solution_fitness(100.0)
            .with_stagnation_limit(30)
            .with_parallel(false)
            .with_seed(42)
            .with_time_limit_ms(5000);

        assert_eq!(config.population_size, 5000);
        assert_eq!(config.max_generations, 200);
        assert_eq!(config.selection, Selection::Rank);
        assert!((config.elite_ratio - 0.2).abs() < 1e-10);
        assert!((config.crossover_rate - 0.2).abs() < 1e-10);
        assert!((config.mutation_rate - 0.15).abs() < 1e-10);
        assert_eq!(config.solution_fitness, 100.0);
        assert_eq!(config.stagnation_limit, 30);
        assert!(!config.parallel);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.time_limit_ms, Some(5000));
    }

    #[test]
    fn test_validate_ok() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = GaConfig::default().with_population_size(1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "population_size",
                reason: "must be at least 2",
            })
        );
    }

    #[test]
    fn test_validate_zero_generations() {
        let config = GaConfig::default().with_max_generations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_elite_too_high() {
        let config = GaConfig::default()
            .with_population_size(10)
            .with_elite_ratio(1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_raw_rate_out_of_bounds() {
        let mut config = GaConfig::default();
        config.mutation_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "mutation_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_zero_tournament() {
        let config = GaConfig::default().with_tournament_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_time_limit() {
        let config = GaConfig::default().with_time_limit_ms(0);
        assert!(config.validate().is_err());
        let config = GaConfig::default().with_time_limit_ms(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamp_rates() {
        let config = GaConfig::default()
            .with_elite_ratio(1.5)
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0);

        assert!((config.elite_ratio - 1.0).abs() < 1e-10);
        assert!((config.crossover_rate - 0.0).abs() < 1e-10);
        assert!((config.mutation_rate - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_elite_count() {
        let config = GaConfig::default()
            .with_population_size(50)
            .with_elite_ratio(0.1);
        assert_eq!(config.elite_count(), 5);
    }
}
