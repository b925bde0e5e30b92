//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → selection → crossover → mutation → repeat.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::GaConfig;
use super::types::Chromosome;
use crate::error::ConfigError;
use crate::random::{create_rng, entropy_rng};

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
pub struct GaResult<C> {
    /// The best individual found during the entire run.
    pub best: Arc<C>,

    /// Best fitness value (same as `best.fitness()`).
    pub best_fitness: f64,

    /// Number of generations bred after the initial population.
    pub generations: usize,

    /// Whether the best fitness reached `solution_fitness`.
    pub solved: bool,

    /// Whether the run was terminated due to stagnation.
    pub stagnated: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the run hit its wall-clock time limit.
    pub timed_out: bool,

    /// Best fitness so far, at the initial population and after each
    /// generation.
    pub fitness_history: Vec<f64>,

    /// Total number of fitness evaluations requested.
    pub evaluated: usize,
}

/// Snapshot handed to the observer after each evaluated generation.
#[derive(Debug)]
pub struct GenerationStats<'a, C> {
    /// 0 for the initial population.
    pub generation: usize,

    /// Best individual found so far.
    pub best: &'a Arc<C>,

    pub best_fitness: f64,

    /// Mean fitness of the current generation.
    pub mean_fitness: f64,

    /// Whether this generation produced a new overall best.
    pub improved: bool,
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use u_eqsearch::ga::{GaConfig, GaRunner};
/// use u_eqsearch::search::{EquationChromosome, SearchConfig, SearchSpace};
///
/// let space = SearchSpace::parse("2*a - 4 = 0", SearchConfig::default()).unwrap();
/// let config = GaConfig::default().with_seed(42).with_max_generations(20);
/// let result = GaRunner::run::<EquationChromosome>(&space, &config).unwrap();
/// println!("Best fitness: {}", result.best_fitness);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// # Errors
    /// Returns the [`GaConfig::validate`] error for an invalid configuration.
    pub fn run<C: Chromosome>(
        context: &C::Context,
        config: &GaConfig,
    ) -> Result<GaResult<C>, ConfigError> {
        Self::run_with_observer(context, config, None, |_| {})
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA will
    /// stop before breeding the next generation and return the best
    /// solution found so far.
    pub fn run_with_cancel<C: Chromosome>(
        context: &C::Context,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult<C>, ConfigError> {
        Self::run_with_observer(context, config, cancel, |_| {})
    }

    /// Runs the GA, calling `observer` after every evaluated generation.
    pub fn run_with_observer<C, F>(
        context: &C::Context,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
        mut observer: F,
    ) -> Result<GaResult<C>, ConfigError>
    where
        C: Chromosome,
        F: FnMut(&GenerationStats<'_, C>),
    {
        config.validate()?;

        let started = Instant::now();
        let time_limit = config.time_limit_ms.map(Duration::from_millis);
        let mut rng = config.seed.map_or_else(entropy_rng, create_rng);

        // 1. Initialize population
        let mut population: Vec<Arc<C>> = (0..config.population_size)
            .map(|_| Arc::new(C::create(context, &mut rng)))
            .collect();

        // 2. Evaluate initial population
        let mut fitness = evaluate_population(&population, config.parallel);
        let mut evaluated = population.len();

        // 3. Track best
        let first = find_best(&fitness);
        let mut best = Arc::clone(&population[first]);
        let mut best_fitness = fitness[first];
        let mut fitness_history = Vec::with_capacity(config.max_generations + 1);
        fitness_history.push(best_fitness);
        observer(&GenerationStats {
            generation: 0,
            best: &best,
            best_fitness,
            mean_fitness: mean(&fitness),
            improved: true,
        });

        let mut solved = best_fitness >= config.solution_fitness;
        let mut generations = 0usize;
        let mut stagnation_counter = 0usize;
        let mut stagnated = false;
        let mut cancelled = false;
        let mut timed_out = false;

        // 4. Evolutionary loop
        while !solved && generations < config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                timed_out = true;
                break;
            }

            population = breed(&population, &fitness, config, &mut rng);
            fitness = evaluate_population(&population, config.parallel);
            evaluated += population.len();
            generations += 1;

            // Update best
            let gen_best = find_best(&fitness);
            let improved = fitness[gen_best] > best_fitness;
            if improved {
                best = Arc::clone(&population[gen_best]);
                best_fitness = fitness[gen_best];
                stagnation_counter = 0;
                debug!("new best fitness {best_fitness} at generation {generations}");
            } else {
                stagnation_counter += 1;
            }

            fitness_history.push(best_fitness);
            let mean_fitness = mean(&fitness);
            debug!(
                "generation {generations}: best {best_fitness}, mean {mean_fitness}"
            );
            observer(&GenerationStats {
                generation: generations,
                best: &best,
                best_fitness,
                mean_fitness,
                improved,
            });

            solved = best_fitness >= config.solution_fitness;

            // Stagnation check
            if !solved
                && config.stagnation_limit > 0
                && stagnation_counter >= config.stagnation_limit
            {
                stagnated = true;
                break;
            }
        }

        if solved {
            info!("solution reached after {generations} generations ({evaluated} evaluations)");
        }

        Ok(GaResult {
            best,
            best_fitness,
            generations,
            solved,
            stagnated,
            cancelled,
            timed_out,
            fitness_history,
            evaluated,
        })
    }
}

/// Builds the next generation: elites first, then selected parents crossed
/// and mutated until the population is full.
fn breed<C: Chromosome, R: Rng>(
    population: &[Arc<C>],
    fitness: &[f64],
    config: &GaConfig,
    rng: &mut R,
) -> Vec<Arc<C>> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| {
        fitness[b]
            .partial_cmp(&fitness[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut next_gen: Vec<Arc<C>> = Vec::with_capacity(config.population_size);
    next_gen.extend(
        order[..config.elite_count()]
            .iter()
            .map(|&i| Arc::clone(&population[i])),
    );

    let selector = config.selection.prepare(fitness);
    while next_gen.len() < config.population_size {
        // Selection
        let p1 = &population[selector.select(rng)];
        let p2 = &population[selector.select(rng)];

        // Crossover
        let children: [Arc<C>; 2] = if rng.random_bool(config.crossover_rate) {
            p1.crossover(p2, rng).map(Arc::new)
        } else {
            [Arc::clone(p1), Arc::clone(p2)]
        };

        for child in children {
            if next_gen.len() >= config.population_size {
                break;
            }
            // Mutation
            next_gen.push(child.mutate(config.mutation_rate, rng));
        }
    }

    next_gen
}

/// Computes the fitness of every individual.
fn evaluate_population<C: Chromosome>(population: &[Arc<C>], parallel: bool) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    if parallel {
        return population.par_iter().map(|ind| ind.fitness()).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    population.iter().map(|ind| ind.fitness()).collect()
}

/// Index of the highest fitness. `fitness` must not be empty.
fn find_best(fitness: &[f64]) -> usize {
    let mut best = 0;
    for (i, &f) in fitness.iter().enumerate().skip(1) {
        if f > fitness[best] {
            best = i;
        }
    }
    best
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Selection;

    // ---- OneMax: maximize the number of set bits ----

    #[derive(Clone, Debug)]
    struct BitString {
        bits: Vec<bool>,
    }

    impl Chromosome for BitString {
        type Context = usize;

        fn create<R: Rng>(n: &usize, rng: &mut R) -> Self {
            BitString {
                bits: (0..*n).map(|_| rng.random_bool(0.5)).collect(),
            }
        }

        fn fitness(&self) -> f64 {
            self.bits.iter().filter(|&&b| b).count() as f64
        }

        fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> [Self; 2] {
            // Single-point crossover
            let point = rng.random_range(0..self.bits.len());
            let mut c1 = self.bits[..point].to_vec();
            c1.extend_from_slice(&other.bits[point..]);
            let mut c2 = other.bits[..point].to_vec();
            c2.extend_from_slice(&self.bits[point..]);
            [BitString { bits: c1 }, BitString { bits: c2 }]
        }

        fn mutate<R: Rng>(self: &Arc<Self>, rate: f64, rng: &mut R) -> Arc<Self> {
            let mut changed = false;
            let bits = self
                .bits
                .iter()
                .map(|&b| {
                    if rng.random_bool(rate) {
                        changed = true;
                        !b
                    } else {
                        b
                    }
                })
                .collect();
            if changed {
                Arc::new(BitString { bits })
            } else {
                Arc::clone(self)
            }
        }
    }

    fn onemax_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(50)
            .with_max_generations(200)
            .with_mutation_rate(0.02)
            .with_solution_fitness(f64::INFINITY)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_onemax_convergence() {
        let result = GaRunner::run::<BitString>(&20, &onemax_config()).unwrap();

        assert!(
            result.best_fitness >= 17.0,
            "expected fitness >= 17 for 20-bit OneMax, got {}",
            result.best_fitness
        );
        assert!(!result.solved);
        assert_eq!(result.generations, 200);
    }

    #[test]
    fn test_stops_at_solution_fitness() {
        let config = onemax_config().with_solution_fitness(10.0);
        let result = GaRunner::run::<BitString>(&10, &config).unwrap();

        assert!(result.solved);
        assert_eq!(result.best_fitness, 10.0);
        assert!(result.generations < 200);
        assert_eq!(result.fitness_history.len(), result.generations + 1);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let config = onemax_config().with_population_size(1);
        assert!(GaRunner::run::<BitString>(&10, &config).is_err());
    }

    #[test]
    fn test_stagnation_termination() {
        let config = onemax_config()
            .with_max_generations(1000)
            .with_stagnation_limit(10);
        let result = GaRunner::run::<BitString>(&5, &config).unwrap();

        assert!(result.stagnated, "expected stagnation");
        assert!(result.generations < 1000);
    }

    #[test]
    fn test_cancellation() {
        let config = onemax_config().with_max_generations(10);
        let cancel = Arc::new(AtomicBool::new(true));

        let result = GaRunner::run_with_cancel::<BitString>(&20, &config, Some(cancel)).unwrap();

        assert!(result.cancelled, "expected cancelled result");
        assert_eq!(result.generations, 0);
        assert_eq!(result.fitness_history.len(), 1);
    }

    #[test]
    fn test_elite_preservation() {
        let config = onemax_config()
            .with_max_generations(50)
            .with_elite_ratio(0.2);
        let result = GaRunner::run::<BitString>(&30, &config).unwrap();

        for window in result.fitness_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best fitness should never decrease: {} < {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_fitness_history_and_evaluations() {
        let config = onemax_config().with_max_generations(30);
        let result = GaRunner::run::<BitString>(&100, &config).unwrap();

        // initial + each generation
        assert_eq!(result.fitness_history.len(), 31);
        assert_eq!(result.evaluated, 31 * 50);
    }

    #[test]
    fn test_observer_sees_every_generation() {
        let config = onemax_config().with_max_generations(12);
        let mut seen = Vec::new();
        GaRunner::run_with_observer::<BitString, _>(&40, &config, None, |stats| {
            seen.push(stats.generation);
            assert!(stats.best_fitness >= stats.mean_fitness);
        })
        .unwrap();
        assert_eq!(seen, (0..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_selection_strategies() {
        for selection in [
            Selection::Tournament(3),
            Selection::Roulette,
            Selection::Rank,
        ] {
            let config = onemax_config()
                .with_max_generations(50)
                .with_selection(selection);
            let result = GaRunner::run::<BitString>(&10, &config).unwrap();

            assert!(
                result.best_fitness >= 7.0,
                "selection {:?} should find most bits, got fitness {}",
                selection,
                result.best_fitness
            );
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = GaRunner::run::<BitString>(&32, &onemax_config()).unwrap();
        let b = GaRunner::run::<BitString>(&32, &onemax_config()).unwrap();
        assert_eq!(a.fitness_history, b.fitness_history);
        assert_eq!(a.best.bits, b.best.bits);
    }

    #[test]
    fn test_parallel_gives_same_result() {
        let sequential = GaRunner::run::<BitString>(&32, &onemax_config()).unwrap();
        let parallel =
            GaRunner::run::<BitString>(&32, &onemax_config().with_parallel(true)).unwrap();
        // evaluation is pure, so ordering does not change the outcome
        assert_eq!(sequential.fitness_history, parallel.fitness_history);
    }
}
