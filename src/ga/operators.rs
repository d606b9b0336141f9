//! Genetic operators for allocation vectors.
//!
//! Selection works on fitness values and returns population indices.
//! Crossover and mutation work on [`Individual`] genes and keep every gene
//! inside `[0, capacity]` of its slot.
//!
//! # Usage
//!
//! ```
//! use u_production::ga::operators::GeneticOperators;
//! use u_production::ga::{GaConfig, Selection};
//!
//! let ops = GeneticOperators::from_config(&GaConfig::default());
//! assert_eq!(ops.selection, Selection::Tournament(3));
//! ```
//!
//! # Reference
//! - Michalewicz (1996), "Genetic Algorithms + Data Structures = Evolution
//!   Programs", Ch. 5 (arithmetic crossover, Gaussian mutation)
//! - Goldberg & Deb (1991), "A comparative analysis of selection schemes"

use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::{GaConfig, Individual, Selection};

/// Runtime-configured selection, crossover and mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticOperators {
    /// Mating-pool selection strategy.
    pub selection: Selection,
    /// Probability of blending a pair.
    pub crossover_rate: f64,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self::from_config(&GaConfig::default())
    }
}

impl GeneticOperators {
    /// Takes the operator settings from a configuration.
    pub fn from_config(config: &GaConfig) -> Self {
        Self {
            selection: config.selection,
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
        }
    }

    /// Selects `size` population indices with the configured strategy.
    pub fn select_pool<R: Rng>(&self, fitness: &[f64], size: usize, rng: &mut R) -> Vec<usize> {
        let n = fitness.len();
        if n == 0 {
            return Vec::new();
        }
        match self.selection {
            Selection::Tournament(k) => (0..size)
                .map(|_| tournament_select(fitness, k, rng))
                .collect(),
            Selection::RouletteWheel => {
                let weights = roulette_weights(fitness);
                (0..size).map(|_| weighted_pick(n, &weights, rng)).collect()
            }
            Selection::RankBased => {
                let weights = rank_weights(fitness);
                (0..size).map(|_| weighted_pick(n, &weights, rng)).collect()
            }
        }
    }

    /// Blends two parents with probability `crossover_rate`, otherwise
    /// copies them.
    pub fn crossover<R: Rng>(
        &self,
        p1: &Individual,
        p2: &Individual,
        rng: &mut R,
    ) -> (Individual, Individual) {
        if rng.random_bool(self.crossover_rate) {
            arithmetic_crossover(p1, p2, rng)
        } else {
            (unevaluated(p1), unevaluated(p2))
        }
    }

    /// Applies Gaussian mutation.
    pub fn mutate<R: Rng>(&self, individual: &mut Individual, rng: &mut R) {
        gaussian_mutation(individual, self.mutation_rate, rng);
    }
}

fn unevaluated(parent: &Individual) -> Individual {
    Individual::new(parent.layout_arc().clone(), parent.genes().to_vec())
}

// ======================== Selection ========================

/// Samples `k` distinct indices and returns the fittest.
///
/// When `k` exceeds the population, contenders are drawn with replacement.
pub fn tournament_select<R: Rng>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let n = fitness.len();
    let k = k.max(1);
    let fitter = |best: usize, i: usize| if fitness[i] > fitness[best] { i } else { best };
    if k <= n {
        let mut contenders = index::sample(rng, n, k).into_iter();
        let first = contenders.next().unwrap_or(0);
        return contenders.fold(first, fitter);
    }
    (1..k).fold(rng.random_range(0..n), |best, _| {
        fitter(best, rng.random_range(0..n))
    })
}

/// Roulette weights: fitness shifted so the minimum maps to 1.
///
/// Returns `None` (uniform selection) when every weight is equal or the
/// total is not finite.
pub fn roulette_weights(fitness: &[f64]) -> Option<Vec<f64>> {
    let min = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    let weights: Vec<f64> = fitness.iter().map(|f| f - min + 1.0).collect();
    let total: f64 = weights.iter().sum();
    let all_equal = weights.iter().all(|w| *w == weights[0]);
    if all_equal || !total.is_finite() {
        None
    } else {
        Some(weights)
    }
}

/// Rank weights: least fit gets 1, fittest gets `n`. Ties are ranked in
/// index order.
pub fn rank_weights(fitness: &[f64]) -> Option<Vec<f64>> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
    let mut weights = vec![0.0; fitness.len()];
    for (rank, &i) in order.iter().enumerate() {
        weights[i] = (rank + 1) as f64;
    }
    Some(weights)
}

/// Picks an index proportionally to `weights`; uniform when `None`.
fn weighted_pick<R: Rng>(n: usize, weights: &Option<Vec<f64>>, rng: &mut R) -> usize {
    let Some(w) = weights else {
        return rng.random_range(0..n);
    };
    let total: f64 = w.iter().sum();
    let mut target = rng.random::<f64>() * total;
    for (i, &wi) in w.iter().enumerate() {
        if target < wi {
            return i;
        }
        target -= wi;
    }
    w.len() - 1
}

// ======================== Crossover ========================

/// Arithmetic blend with one α ~ U[0.3, 0.7] shared by all genes.
pub fn arithmetic_crossover<R: Rng>(
    p1: &Individual,
    p2: &Individual,
    rng: &mut R,
) -> (Individual, Individual) {
    let alpha = rng.random_range(0.3..=0.7);
    blend(p1, p2, alpha)
}

/// `c1 = α·p1 + (1−α)·p2`, `c2 = (1−α)·p1 + α·p2`.
///
/// For α ∈ [0, 1] children stay within the parents' per-gene bounds.
pub fn blend(p1: &Individual, p2: &Individual, alpha: f64) -> (Individual, Individual) {
    let (g1, g2): (Vec<f64>, Vec<f64>) = p1
        .genes()
        .iter()
        .zip(p2.genes())
        .map(|(&a, &b)| (alpha * a + (1.0 - alpha) * b, (1.0 - alpha) * a + alpha * b))
        .unzip();
    let layout = p1.layout_arc().clone();
    (
        Individual::new(layout.clone(), g1),
        Individual::new(layout, g2),
    )
}

// ======================== Mutation ========================

/// Per gene, with probability `rate`, adds N(0, (0.1 · capacity)²) noise.
/// Every gene is then clamped to `[0, capacity]`.
pub fn gaussian_mutation<R: Rng>(individual: &mut Individual, rate: f64, rng: &mut R) {
    let caps: Vec<f64> = (0..individual.genes().len())
        .map(|i| individual.layout().capacity(i))
        .collect();
    for (g, cap) in individual.genes_mut().iter_mut().zip(caps) {
        if rng.random_bool(rate) {
            if let Ok(noise) = Normal::new(0.0, 0.1 * cap) {
                *g += noise.sample(rng);
            }
        }
        *g = g.clamp(0.0, cap.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GeneLayout;
    use crate::models::production::tests::sample_model;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn population(n: usize, rng: &mut SmallRng) -> Vec<Individual> {
        let layout = Arc::new(GeneLayout::from_model(&sample_model()));
        (0..n).map(|_| Individual::random(layout.clone(), rng)).collect()
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [1.0, 5.0, 3.0, 2.0];
        let mut wins = [0usize; 4];
        for _ in 0..1000 {
            wins[tournament_select(&fitness, 3, &mut rng)] += 1;
        }
        assert!(wins[1] > wins[0]);
        assert!(wins[1] > 500);
    }

    #[test]
    fn test_tournament_contenders_are_distinct() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [1.0, 5.0, 3.0, 2.0];
        // a full-size tournament sees everyone
        for _ in 0..200 {
            assert_eq!(tournament_select(&fitness, 4, &mut rng), 1);
        }
        let worst_wins = (0..1000)
            .filter(|_| tournament_select(&fitness, 3, &mut rng) == 0)
            .count();
        assert_eq!(worst_wins, 0);
    }

    #[test]
    fn test_tournament_larger_than_population() {
        let mut rng = SmallRng::seed_from_u64(42);
        let i = tournament_select(&[2.0, 1.0], 5, &mut rng);
        assert!(i < 2);
    }

    #[test]
    fn test_roulette_weights_shift() {
        let w = roulette_weights(&[-10.0, 0.0, 5.0]).unwrap();
        assert_eq!(w, vec![1.0, 11.0, 16.0]);
        assert!(roulette_weights(&[2.0, 2.0, 2.0]).is_none());
        assert!(roulette_weights(&[f64::MAX, -f64::MAX]).is_none());
    }

    #[test]
    fn test_rank_weights() {
        let w = rank_weights(&[3.0, -1.0, 10.0]).unwrap();
        assert_eq!(w, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_select_pool_sizes() {
        let mut rng = SmallRng::seed_from_u64(42);
        let fitness = [0.0, 1.0, 2.0, 3.0, 4.0];
        for selection in [
            Selection::Tournament(3),
            Selection::RouletteWheel,
            Selection::RankBased,
        ] {
            let ops = GeneticOperators {
                selection,
                ..Default::default()
            };
            let pool = ops.select_pool(&fitness, 20, &mut rng);
            assert_eq!(pool.len(), 20);
            assert!(pool.iter().all(|&i| i < 5));
        }
    }

    #[test]
    fn test_blend_closed_under_bounds() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = population(2, &mut rng);
        for alpha in [0.0, 0.3, 0.5, 0.7, 1.0] {
            let (c1, c2) = blend(&pop[0], &pop[1], alpha);
            for i in 0..c1.genes().len() {
                let lo = pop[0].genes()[i].min(pop[1].genes()[i]);
                let hi = pop[0].genes()[i].max(pop[1].genes()[i]);
                for g in [c1.genes()[i], c2.genes()[i]] {
                    assert!(g >= lo - 1e-12 && g <= hi + 1e-12);
                }
                let cap = c1.layout().capacity(i);
                assert!(c1.genes()[i] >= 0.0 && c1.genes()[i] <= cap);
            }
        }
    }

    #[test]
    fn test_blend_preserves_sum() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = population(2, &mut rng);
        let (c1, c2) = arithmetic_crossover(&pop[0], &pop[1], &mut rng);
        for i in 0..c1.genes().len() {
            let parents = pop[0].genes()[i] + pop[1].genes()[i];
            let children = c1.genes()[i] + c2.genes()[i];
            assert!((parents - children).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mutation_clamps() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pop = population(20, &mut rng);
        for ind in &mut pop {
            for g in ind.genes_mut() {
                *g *= 50.0;
            }
            gaussian_mutation(ind, 1.0, &mut rng);
            for (i, &g) in ind.genes().iter().enumerate() {
                assert!(g >= 0.0 && g <= ind.layout().capacity(i));
            }
        }
    }

    #[test]
    fn test_no_crossover_copies_parents() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = population(2, &mut rng);
        let ops = GeneticOperators {
            crossover_rate: 0.0,
            ..Default::default()
        };
        let (c1, c2) = ops.crossover(&pop[0], &pop[1], &mut rng);
        assert_eq!(c1.genes(), pop[0].genes());
        assert_eq!(c2.genes(), pop[1].genes());
    }
}
