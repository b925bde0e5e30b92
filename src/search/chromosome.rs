//! The equation-solving individual and its genetic operators.

use std::sync::{Arc, OnceLock};

use rand::Rng;

use super::assignment::Assignment;
use super::config::SearchConfig;
use super::fitness::Residual;
use super::gene::generate_value;
use crate::error::{ConfigError, Error};
use crate::formula::FormulaBinding;
use crate::ga::Chromosome;

/// Everything individuals of one search run share: the formula and the
/// gene generation parameters. Built once, then only referenced.
#[derive(Debug)]
pub struct SearchSpace {
    binding: FormulaBinding,
    config: SearchConfig,
}

impl SearchSpace {
    /// Validates `config` and bundles it with `binding`.
    pub fn new(binding: FormulaBinding, config: SearchConfig) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        Ok(Arc::new(Self { binding, config }))
    }

    /// Parses `equation` and bundles it with `config`.
    ///
    /// ```
    /// use u_eqsearch::search::{SearchConfig, SearchSpace};
    ///
    /// let space = SearchSpace::parse("2*a - 4 = 0", SearchConfig::default()).unwrap();
    /// assert_eq!(space.binding().variables(), ["a"]);
    /// ```
    pub fn parse(equation: &str, config: SearchConfig) -> Result<Arc<Self>, Error> {
        let binding = FormulaBinding::parse(equation)?;
        Ok(Self::new(binding, config)?)
    }

    pub fn binding(&self) -> &FormulaBinding {
        &self.binding
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// One candidate assignment for the equation.
///
/// Immutable after construction. The residual is computed on first request
/// and memoized; concurrent first requests may both run the evaluator, but
/// exactly one result is stored and the evaluator is deterministic.
#[derive(Debug, Clone)]
pub struct EquationChromosome {
    space: Arc<SearchSpace>,
    assignment: Assignment,
    residual: OnceLock<Residual>,
}

impl EquationChromosome {
    /// Creates an individual with every variable drawn at random.
    pub fn random<R: Rng + ?Sized>(space: &Arc<SearchSpace>, rng: &mut R) -> Self {
        let assignment = Assignment::random(
            Arc::clone(space.binding.variable_names()),
            &space.config,
            rng,
        );
        Self::from_parts(Arc::clone(space), assignment)
    }

    /// Creates an individual with a caller-chosen assignment, bypassing the
    /// generator (and its exclusions).
    ///
    /// # Errors
    ///
    /// [`Error::AssignmentMismatch`] if the assignment's variables differ
    /// from the formula's.
    pub fn with_assignment(space: &Arc<SearchSpace>, assignment: Assignment) -> Result<Self, Error> {
        if assignment.names() != space.binding.variables() {
            return Err(Error::AssignmentMismatch {
                expected: space.binding.variables().to_vec(),
                actual: assignment.names().to_vec(),
            });
        }
        Ok(Self::from_parts(Arc::clone(space), assignment))
    }

    /// Creates an individual from values in formula variable order.
    pub fn with_values(space: &Arc<SearchSpace>, values: Vec<f64>) -> Result<Self, Error> {
        let assignment = Assignment::new(Arc::clone(space.binding.variable_names()), values)?;
        Ok(Self::from_parts(Arc::clone(space), assignment))
    }

    fn from_parts(space: Arc<SearchSpace>, assignment: Assignment) -> Self {
        Self {
            space,
            assignment,
            residual: OnceLock::new(),
        }
    }

    pub fn space(&self) -> &Arc<SearchSpace> {
        &self.space
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Left-hand side minus target, evaluated at most once.
    pub fn residual(&self) -> Residual {
        *self
            .residual
            .get_or_init(|| self.space.binding.residual(&self.assignment).into())
    }

    /// See [`Residual::fitness`].
    pub fn fitness(&self) -> f64 {
        self.residual().fitness()
    }

    pub fn is_solution(&self) -> bool {
        self.residual().is_solution()
    }

    /// Uniform crossover producing two independent children.
    ///
    /// Every gene of every child takes `self`'s or `other`'s value on its own
    /// fair coin, so the children need not be complementary.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R) -> [Self; 2] {
        debug_assert_eq!(self.assignment.names(), other.assignment.names());
        [self.child_with(other, rng), self.child_with(other, rng)]
    }

    fn child_with<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R) -> Self {
        let values = self
            .assignment
            .values()
            .iter()
            .zip(other.assignment.values())
            .map(|(&mine, &theirs)| if rng.random_bool(0.5) { mine } else { theirs })
            .collect();
        Self::from_parts(Arc::clone(&self.space), self.assignment.with_values(values))
    }

    /// Replaces each gene with a fresh value with probability `rate`.
    ///
    /// When no gene is replaced the same `Arc` is returned, sharing the
    /// already computed residual. `rate` is clamped to `[0, 1]`; NaN counts
    /// as zero.
    pub fn mutate<R: Rng + ?Sized>(self: &Arc<Self>, rate: f64, rng: &mut R) -> Arc<Self> {
        if rate.is_nan() || rate <= 0.0 {
            return Arc::clone(self);
        }
        let rate = rate.min(1.0);

        let config = &self.space.config;
        let mut mutated = false;
        let values: Vec<f64> = self
            .assignment
            .values()
            .iter()
            .map(|&value| {
                if rng.random_bool(rate) {
                    mutated = true;
                    generate_value(config, rng)
                } else {
                    value
                }
            })
            .collect();

        if !mutated {
            return Arc::clone(self);
        }
        Arc::new(Self::from_parts(
            Arc::clone(&self.space),
            self.assignment.with_values(values),
        ))
    }
}

impl Chromosome for EquationChromosome {
    type Context = Arc<SearchSpace>;

    fn create<R: Rng>(context: &Arc<SearchSpace>, rng: &mut R) -> Self {
        Self::random(context, rng)
    }

    fn fitness(&self) -> f64 {
        EquationChromosome::fitness(self)
    }

    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> [Self; 2] {
        EquationChromosome::crossover(self, other, rng)
    }

    fn mutate<R: Rng>(self: &Arc<Self>, rate: f64, rng: &mut R) -> Arc<Self> {
        EquationChromosome::mutate(self, rate, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::formula::Evaluator;
    use crate::random::create_rng;
    use crate::search::MAX_FITNESS;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn space(equation: &str) -> Arc<SearchSpace> {
        SearchSpace::parse(equation, SearchConfig::default().with_range(-10.0, 10.0))
            .expect("valid equation")
    }

    #[derive(Debug, Default)]
    struct CountingEvaluator {
        calls: AtomicUsize,
    }

    impl Evaluator for CountingEvaluator {
        fn evaluate(&self, assignment: &Assignment) -> Result<f64, EvalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(assignment.get("a").unwrap_or(0.0) * 2.0)
        }
    }

    #[test]
    fn test_linear_example() {
        let space = space("2*a - 4 = 0");

        let exact = EquationChromosome::with_values(&space, vec![2.0]).unwrap();
        assert_eq!(exact.residual(), Residual::Value(0.0));
        assert_eq!(exact.fitness(), MAX_FITNESS);
        assert!(exact.is_solution());

        let off = EquationChromosome::with_values(&space, vec![3.0]).unwrap();
        assert_eq!(off.residual(), Residual::Value(2.0));
        assert_eq!(off.fitness(), 0.5);
    }

    #[test]
    fn test_injected_zero_divisor_is_invalid() {
        let space = space("1/a = 0");
        let ind = EquationChromosome::with_values(&space, vec![0.0]).unwrap();
        assert_eq!(ind.residual(), Residual::Invalid);
        assert_eq!(ind.fitness(), 0.0);
    }

    #[test]
    fn test_residual_memoized() {
        let evaluator = Arc::new(CountingEvaluator::default());
        let binding = FormulaBinding::new(evaluator.clone(), vec!["a".into()], 4.0);
        let space = SearchSpace::new(binding, SearchConfig::default()).unwrap();
        let ind = EquationChromosome::with_values(&space, vec![3.0]).unwrap();

        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ind.residual(), Residual::Value(2.0));
        assert_eq!(ind.residual(), Residual::Value(2.0));
        assert_eq!(ind.fitness(), 0.5);
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_with_assignment_rejects_foreign_variables() {
        let space = space("a + b");
        let names: Arc<[String]> = vec!["a".to_string(), "c".to_string()].into();
        let assignment = Assignment::new(names, vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            EquationChromosome::with_assignment(&space, assignment),
            Err(Error::AssignmentMismatch { .. })
        ));
    }

    #[test]
    fn test_random_individual_covers_variables() {
        let space = space("a*b + c = 7");
        let mut rng = create_rng(42);
        let ind = EquationChromosome::random(&space, &mut rng);
        assert_eq!(ind.assignment().names(), ["a", "b", "c"]);
        for (_, v) in ind.assignment().iter() {
            assert!((-10.0..=10.0).contains(&v));
        }
    }

    #[test]
    fn test_crossover_draws_genes_from_parents() {
        let space = space("a + b + c + d");
        let p1 = EquationChromosome::with_values(&space, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let p2 = EquationChromosome::with_values(&space, vec![-1.0, -2.0, -3.0, -4.0]).unwrap();
        let mut rng = create_rng(42);

        for _ in 0..100 {
            let children = p1.crossover(&p2, &mut rng);
            assert_eq!(children.len(), 2);
            for child in &children {
                assert!(Arc::ptr_eq(child.space(), &space));
                for (i, &v) in child.assignment().values().iter().enumerate() {
                    let a = p1.assignment().values()[i];
                    let b = p2.assignment().values()[i];
                    assert!(v == a || v == b, "gene {i} = {v} not from a parent");
                }
            }
        }
        // parents untouched
        assert_eq!(p1.assignment().values(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_crossover_children_are_independent() {
        let space = space("a + b + c + d + e + f + g + h");
        let p1 = EquationChromosome::with_values(&space, vec![1.0; 8]).unwrap();
        let p2 = EquationChromosome::with_values(&space, vec![2.0; 8]).unwrap();
        let mut rng = create_rng(9);

        // complementary children would always sum to 24
        let non_complementary = (0..50)
            .map(|_| p1.crossover(&p2, &mut rng))
            .filter(|[c1, c2]| {
                let sum: f64 = c1.assignment().values().iter().sum::<f64>()
                    + c2.assignment().values().iter().sum::<f64>();
                sum != 24.0
            })
            .count();
        assert!(non_complementary > 0);
    }

    #[test]
    fn test_mutate_zero_rate_returns_same_individual() {
        let space = space("a + b");
        let mut rng = create_rng(42);
        let ind = Arc::new(EquationChromosome::random(&space, &mut rng));
        let same = ind.mutate(0.0, &mut rng);
        assert!(Arc::ptr_eq(&ind, &same));
        let same = ind.mutate(f64::NAN, &mut rng);
        assert!(Arc::ptr_eq(&ind, &same));
    }

    #[test]
    fn test_mutate_full_rate_replaces_every_gene() {
        let config = SearchConfig::default()
            .with_range(-1_000_000.0, 1_000_000.0)
            .with_decimal_points(3);
        let space = SearchSpace::parse("a + b + c + d", config).unwrap();
        let ind = Arc::new(EquationChromosome::with_values(&space, vec![0.5; 4]).unwrap());
        let mut rng = create_rng(42);

        let mutant = ind.mutate(1.0, &mut rng);
        assert!(!Arc::ptr_eq(&ind, &mutant));
        for (old, new) in ind
            .assignment()
            .values()
            .iter()
            .zip(mutant.assignment().values())
        {
            assert_ne!(old, new);
        }
        assert_eq!(ind.assignment().values(), [0.5; 4]);
    }

    #[test]
    fn test_mutation_shares_cached_residual_on_noop() {
        let evaluator = Arc::new(CountingEvaluator::default());
        let binding = FormulaBinding::new(evaluator.clone(), vec!["a".into()], 0.0);
        let space = SearchSpace::new(binding, SearchConfig::default()).unwrap();
        let ind = Arc::new(EquationChromosome::with_values(&space, vec![1.0]).unwrap());
        let _ = ind.fitness();

        let mut rng = create_rng(1);
        let same = ind.mutate(0.0, &mut rng);
        let _ = same.fitness();
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mutation_rate_is_per_gene() {
        let names = (0..100).map(|i| format!("x{i}")).collect::<Vec<_>>();
        let equation = names.join(" + ");
        let space = space(&equation);
        let ind = Arc::new(EquationChromosome::with_values(&space, vec![0.25; 100]).unwrap());
        let mut rng = create_rng(5);

        let changed: usize = (0..100)
            .map(|_| {
                let m = ind.mutate(0.1, &mut rng);
                m.assignment()
                    .values()
                    .iter()
                    .filter(|&&v| v != 0.25)
                    .count()
            })
            .sum();
        // 10_000 genes at 10%; a replaced gene can coincide with 0.25 only rarely
        assert!(
            (800..1200).contains(&changed),
            "expected about 1000 replaced genes, got {changed}"
        );
    }

    #[test]
    fn test_trait_dispatch_matches_inherent() {
        fn create<C: Chromosome>(ctx: &C::Context, seed: u64) -> C {
            C::create(ctx, &mut create_rng(seed))
        }
        let space = space("a - b");
        let ind: EquationChromosome = create(&space, 3);
        assert_eq!(Chromosome::fitness(&ind), ind.fitness());
    }
}
