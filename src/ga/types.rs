//! Core trait definition for the GA engine.
//!
//! [`Chromosome`] is the contract between the generic engine and a
//! candidate-solution type: how to create one, how good it is, and how to
//! recombine and perturb it.

use std::sync::Arc;

use rand::Rng;

/// A candidate solution the engine can evolve.
///
/// Chromosomes are immutable once built. The engine holds them behind
/// [`Arc`] so that unchanged individuals (elites, parents copied without
/// crossover, no-op mutations) are shared rather than cloned.
///
/// # Thread Safety
///
/// `Chromosome` must be `Send + Sync` because the runner may compute
/// fitness for a whole generation in parallel using rayon.
///
/// # Implementing
///
/// ```ignore
/// struct Bits(Vec<bool>);
///
/// impl Chromosome for Bits {
///     type Context = usize;
///     fn create<R: Rng>(len: &usize, rng: &mut R) -> Self {
///         Bits((0..*len).map(|_| rng.random_bool(0.5)).collect())
///     }
///     fn fitness(&self) -> f64 {
///         self.0.iter().filter(|&&b| b).count() as f64
///     }
///     fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> [Self; 2] { /* ... */ }
///     fn mutate<R: Rng>(self: &Arc<Self>, rate: f64, rng: &mut R) -> Arc<Self> { /* ... */ }
/// }
/// ```
pub trait Chromosome: Send + Sync + Sized {
    /// Shared, read-only data needed to create individuals.
    type Context: Send + Sync;

    /// Creates a random individual for population seeding.
    fn create<R: Rng>(context: &Self::Context, rng: &mut R) -> Self;

    /// Fitness score. Higher is better; must not be negative.
    fn fitness(&self) -> f64;

    /// Produces exactly two offspring from `self` and `other`.
    ///
    /// Neither parent is modified.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> [Self; 2];

    /// Perturbs each gene with probability `rate`.
    ///
    /// Returns a new individual if anything changed, otherwise a clone of
    /// the same [`Arc`], so callers can detect a no-op with
    /// [`Arc::ptr_eq`].
    fn mutate<R: Rng>(self: &Arc<Self>, rate: f64, rng: &mut R) -> Arc<Self>;
}
