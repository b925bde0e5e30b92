//! Selection strategies for the GA.
//!
//! Selection determines which individuals are chosen as parents for
//! crossover. Different strategies provide different selection pressure.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use rand::Rng;

/// Selection strategy for choosing parents.
///
/// All strategies assume **maximization** (higher fitness = better) and
/// operate on the fitness values of the current generation.
///
/// # Examples
///
/// ```
/// use u_eqsearch::ga::Selection;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
///
/// // Roulette wheel (fitness-proportionate)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, select the best.
    ///
    /// Higher `k` = stronger selection pressure.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// **Warning**: an exact solution scores so far above every near miss
    /// that it takes over the wheel immediately.
    ///
    /// # Complexity
    /// O(n) per generation, O(log n) per selection
    Roulette,

    /// Rank-based selection.
    ///
    /// Selection probability is proportional to rank position, not raw
    /// fitness value, which avoids the scaling problems of roulette wheel
    /// selection on `1 / |residual|` scores.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) per generation, O(log n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Select a parent index given the fitness of every individual.
    ///
    /// Builds a [`Selector`] for a single draw; when drawing many parents
    /// from the same generation, call [`Selection::prepare`] once instead.
    ///
    /// # Panics
    /// Panics if `fitness` is empty.
    pub fn select<R: Rng + ?Sized>(&self, fitness: &[f64], rng: &mut R) -> usize {
        self.prepare(fitness).select(rng)
    }

    /// Precomputes the per-generation state of this strategy: the rank
    /// order for [`Selection::Rank`], cumulative weights for roulette and
    /// rank.
    ///
    /// # Panics
    /// Panics if `fitness` is empty.
    ///
    /// # Complexity
    /// O(n log n) for rank, O(n) for roulette, O(1) for tournament.
    pub fn prepare<'a>(&self, fitness: &'a [f64]) -> Selector<'a> {
        assert!(!fitness.is_empty(), "cannot select from empty population");

        let wheel = match self {
            Selection::Tournament(_) => Wheel::None,
            Selection::Roulette => roulette_wheel(fitness),
            Selection::Rank => rank_wheel(fitness),
        };
        Selector {
            selection: *self,
            fitness,
            wheel,
        }
    }
}

/// A [`Selection`] bound to one generation's fitness values.
///
/// Each draw costs O(k) for tournament and O(log n) for roulette and rank.
#[derive(Debug, Clone)]
pub struct Selector<'a> {
    selection: Selection,
    fitness: &'a [f64],
    wheel: Wheel,
}

#[derive(Debug, Clone)]
enum Wheel {
    None,
    /// All weights degenerate; draw uniformly.
    Uniform,
    /// Cumulative weights over `order` (identity order when `None`).
    Cumulative {
        order: Option<Vec<usize>>,
        cumulative: Vec<f64>,
    },
}

impl Selector<'_> {
    /// Draws one parent index.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.fitness.len();
        if n == 1 {
            return 0;
        }
        match (&self.selection, &self.wheel) {
            (Selection::Tournament(k), _) => tournament(self.fitness, *k, rng),
            (_, Wheel::Cumulative { order, cumulative }) => {
                let slot = spin(cumulative, rng);
                order.as_ref().map_or(slot, |order| order[slot])
            }
            _ => rng.random_range(0..n),
        }
    }
}

/// Tournament selection: pick k random individuals, return best.
fn tournament<R: Rng + ?Sized>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = fitness.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if fitness[idx] > fitness[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette wheel over fitness.
///
/// weight_i = max(fitness_i, 0) + epsilon, so zero-fitness individuals keep
/// a small chance.
fn roulette_wheel(fitness: &[f64]) -> Wheel {
    let epsilon = 1e-10;
    let cumulative = accumulate(
        fitness
            .iter()
            .map(|&f| if f.is_finite() && f > 0.0 { f + epsilon } else { epsilon }),
    );

    match cumulative.last() {
        Some(&total) if total.is_finite() && total > 0.0 => Wheel::Cumulative {
            order: None,
            cumulative,
        },
        _ => Wheel::Uniform,
    }
}

/// Linear ranking: the best of n individuals has weight n, the worst
/// weight 1.
fn rank_wheel(fitness: &[f64]) -> Wheel {
    let n = fitness.len();

    // best first
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        fitness[b]
            .partial_cmp(&fitness[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cumulative = accumulate((0..n).map(|rank| (n - rank) as f64));
    Wheel::Cumulative {
        order: Some(order),
        cumulative,
    }
}

fn accumulate(weights: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut total = 0.0;
    weights
        .map(|w| {
            total += w;
            total
        })
        .collect()
}

/// First slot whose cumulative weight exceeds a uniform threshold.
fn spin<R: Rng + ?Sized>(cumulative: &[f64], rng: &mut R) -> usize {
    let total = cumulative[cumulative.len() - 1];
    let threshold = rng.random_range(0.0..total);
    cumulative
        .partition_point(|&c| c <= threshold)
        .min(cumulative.len() - 1) // floating-point fallback
}
