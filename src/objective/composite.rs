//! Weighted multi-objective blend.

use tracing::warn;

use super::{
    CostMinimization, CostRates, Objective, ObjectiveComponents, ProductionMaximization,
    ProfitMaximization, QualityOptimization,
};
use crate::ga::Individual;
use crate::models::{ObjectiveWeights, ProductionModel};

/// Min/range pairs used to map raw objective values onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationFactors {
    pub cost_min: f64,
    pub cost_range: f64,
    pub profit_min: f64,
    pub profit_range: f64,
    pub production_min: f64,
    pub production_range: f64,
}

impl Default for NormalizationFactors {
    fn default() -> Self {
        Self {
            cost_min: 0.0,
            cost_range: 1_000_000.0,
            profit_min: 0.0,
            profit_range: 1_000_000.0,
            production_min: 0.0,
            production_range: 10_000.0,
        }
    }
}

impl NormalizationFactors {
    /// Builds factors from observed (total cost, profit, production fitness)
    /// samples. Non-finite samples are skipped; ranges are floored at 1.
    ///
    /// Returns `None` when fewer than two usable samples remain.
    pub fn from_samples(samples: &[(f64, f64, f64)]) -> Option<Self> {
        let usable: Vec<&(f64, f64, f64)> = samples
            .iter()
            .filter(|(c, p, q)| c.is_finite() && p.is_finite() && q.is_finite())
            .collect();
        if usable.len() < 2 {
            return None;
        }
        let bounds = |pick: fn(&(f64, f64, f64)) -> f64| {
            usable
                .iter()
                .map(|s| pick(s))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                })
        };
        let (cost_lo, cost_hi) = bounds(|s| s.0);
        let (profit_lo, profit_hi) = bounds(|s| s.1);
        let (prod_lo, prod_hi) = bounds(|s| s.2);
        Some(Self {
            cost_min: cost_lo,
            cost_range: (cost_hi - cost_lo).max(1.0),
            profit_min: profit_lo,
            profit_range: (profit_hi - profit_lo).max(1.0),
            production_min: prod_lo,
            production_range: (prod_hi - prod_lo).max(1.0),
        })
    }
}

/// Normalized per-objective scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedScores {
    pub cost: f64,
    pub profit: f64,
    pub production: f64,
    pub quality: f64,
}

/// Weighted sum of the four single objectives.
///
/// Each objective is mapped onto [0, 1] with the current
/// [`NormalizationFactors`] (cost inverted so that cheaper scores higher,
/// quality divided by 1000). A score that cannot be computed becomes 0.5.
#[derive(Debug, Clone)]
pub struct CompositeObjective {
    weights: ObjectiveWeights,
    factors: NormalizationFactors,
    cost: CostMinimization,
    profit: ProfitMaximization,
    production: ProductionMaximization,
    quality: QualityOptimization,
}

impl CompositeObjective {
    /// Creates the blend; weights are renormalized to sum to 1.
    pub fn new(weights: ObjectiveWeights, rates: CostRates) -> Self {
        Self {
            weights: weights.normalized(),
            factors: NormalizationFactors::default(),
            cost: CostMinimization::new(rates),
            profit: ProfitMaximization::new(rates),
            production: ProductionMaximization,
            quality: QualityOptimization,
        }
    }

    /// Normalized weights in use.
    pub fn weights(&self) -> &ObjectiveWeights {
        &self.weights
    }

    /// Current normalization factors.
    pub fn factors(&self) -> &NormalizationFactors {
        &self.factors
    }

    /// Replaces the normalization factors.
    pub fn set_factors(&mut self, factors: NormalizationFactors) {
        self.factors = factors;
    }

    /// Recomputes normalization factors from a population. Falls back to
    /// the defaults when the sample is degenerate.
    pub fn calculate_normalization_factors(
        &mut self,
        model: &ProductionModel,
        population: &[Individual],
    ) {
        let samples: Vec<(f64, f64, f64)> = population
            .iter()
            .map(|ind| {
                let (_, cost) = self.cost.evaluate(model, ind);
                let (profit, _) = self.profit.evaluate(model, ind);
                let (production, _) = self.production.evaluate(model, ind);
                (cost.total_cost, profit, production)
            })
            .collect();
        self.factors = NormalizationFactors::from_samples(&samples).unwrap_or_else(|| {
            warn!(
                samples = samples.len(),
                "degenerate normalization sample, using default factors"
            );
            NormalizationFactors::default()
        });
    }

    /// Maps raw objective values onto [0, 1].
    pub fn normalize(
        &self,
        total_cost: f64,
        profit: f64,
        production: f64,
        quality: f64,
    ) -> NormalizedScores {
        let f = &self.factors;
        let unit = |v: f64| if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0) };
        NormalizedScores {
            cost: unit(1.0 - (total_cost - f.cost_min) / f.cost_range),
            profit: unit((profit - f.profit_min) / f.profit_range),
            production: unit((production - f.production_min) / f.production_range),
            quality: unit(quality / 1000.0),
        }
    }
}

impl Objective for CompositeObjective {
    fn name(&self) -> &'static str {
        "multi_objective"
    }

    fn evaluate(&self, model: &ProductionModel, individual: &Individual) -> (f64, ObjectiveComponents) {
        let (_, cost) = self.cost.evaluate(model, individual);
        let (profit_fitness, profit) = self.profit.evaluate(model, individual);
        let (production_fitness, production) = self.production.evaluate(model, individual);
        let (quality_fitness, quality) = self.quality.evaluate(model, individual);

        let mut combined = ObjectiveComponents {
            revenue: profit.revenue,
            production_volume: production.production_volume,
            quality_score: quality.quality_score,
            efficiency_score: production.efficiency_score,
            flexibility_score: quality.flexibility_score,
            ..cost
        };
        combined.calculate_totals();

        let s = self.normalize(
            combined.total_cost,
            profit_fitness,
            production_fitness,
            quality_fitness,
        );
        let w = &self.weights;
        let fitness = w.cost * s.cost
            + w.profit * s.profit
            + w.production * s.production
            + w.quality * s.quality;
        (fitness, combined)
    }

    fn description(&self) -> &'static str {
        "Weighted blend of cost, profit, production and quality"
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

    #[test]
    fn test_factors_from_samples() {
        let f = NormalizationFactors::from_samples(&[
            (100.0, -50.0, 10.0),
            (300.0, 50.0, 10.5),
            (f64::NAN, 0.0, 0.0),
        ])
        .unwrap();
        assert!((f.cost_min - 100.0).abs() < 1e-12);
        assert!((f.cost_range - 200.0).abs() < 1e-12);
        assert!((f.profit_min + 50.0).abs() < 1e-12);
        assert!((f.production_range - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_sample() {
        assert!(NormalizationFactors::from_samples(&[(1.0, 1.0, 1.0)]).is_none());
        assert!(NormalizationFactors::from_samples(&[]).is_none());
    }

    #[test]
    fn test_normalize_clamps_and_guards_nan() {
        let obj = CompositeObjective::new(ObjectiveWeights::default(), CostRates::default());
        let s = obj.normalize(2_000_000.0, f64::NAN, 5_000.0, 1_500.0);
        assert_eq!(s.cost, 0.0);
        assert_eq!(s.profit, 0.5);
        assert!((s.production - 0.5).abs() < 1e-12);
        assert_eq!(s.quality, 1.0);
    }

    #[test]
    fn test_fitness_in_unit_interval() {
        let model = sample_model();
        let layout = Arc::new(GeneLayout::from_model(&model));
        let mut rng = SmallRng::seed_from_u64(42);
        let population: Vec<Individual> = (0..10)
            .map(|_| Individual::random(layout.clone(), &mut rng))
            .collect();

        let mut obj =
            CompositeObjective::new(ObjectiveWeights::new(2.0, 1.0, 1.0, 0.0), CostRates::default());
        assert!((obj.weights().sum() - 1.0).abs() < 1e-12);
        obj.calculate_normalization_factors(&model, &population);
        assert_ne!(*obj.factors(), NormalizationFactors::default());

        for ind in &population {
            let (fitness, c) = obj.evaluate(&model, ind);
            assert!((0.0..=1.0).contains(&fitness));
            assert!(c.total_cost > 0.0);
        }
    }
}
