//! Objective functions.
//!
//! Each objective scores an [`Individual`] along one economic dimension and
//! returns the scalar fitness (higher is better) with an
//! [`ObjectiveComponents`] breakdown.
//!
//! # Variants
//!
//! | Goal | Objective | Fitness |
//! |------|-----------|---------|
//! | minimize cost | [`CostMinimization`] | −total cost |
//! | maximize profit | [`ProfitMaximization`] | revenue − total cost |
//! | maximize production | [`ProductionMaximization`] | effective volume + achievement |
//! | optimize quality | [`QualityOptimization`] | quality, consistency, compliance |
//! | multi-objective | [`CompositeObjective`] | weighted normalized blend |
//!
//! [`ObjectiveFunction`] dispatches over the variants and is built from a
//! goal with [`ObjectiveFunction::for_goal`].

mod components;
mod composite;
mod economic;
mod quality;
mod volume;

pub use components::{CostRates, ObjectiveComponents};
pub use composite::{CompositeObjective, NormalizationFactors, NormalizedScores};
pub use economic::{CostMinimization, ProfitMaximization};
pub use quality::QualityOptimization;
pub use volume::{mean_achievement, ProductionMaximization};

use crate::ga::Individual;
use crate::models::{ObjectiveWeights, OptimizationGoal, ProductionModel};

/// A scoring strategy.
pub trait Objective: Send + Sync {
    /// Short identifier.
    fn name(&self) -> &'static str;

    /// Scores an individual. Higher fitness is better.
    fn evaluate(&self, model: &ProductionModel, individual: &Individual) -> (f64, ObjectiveComponents);

    /// Human-readable description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// The objective selected for a run.
#[derive(Debug, Clone)]
pub enum ObjectiveFunction {
    Cost(CostMinimization),
    Profit(ProfitMaximization),
    Production(ProductionMaximization),
    Quality(QualityOptimization),
    Composite(CompositeObjective),
}

impl ObjectiveFunction {
    /// Builds the objective for a goal. `weights` is only read for
    /// [`OptimizationGoal::MultiObjective`] and defaults to an equal split.
    pub fn for_goal(
        goal: OptimizationGoal,
        weights: Option<ObjectiveWeights>,
        rates: CostRates,
    ) -> Self {
        match goal {
            OptimizationGoal::MinimizeCost => Self::Cost(CostMinimization::new(rates)),
            OptimizationGoal::MaximizeProfit => Self::Profit(ProfitMaximization::new(rates)),
            OptimizationGoal::MaximizeProduction => Self::Production(ProductionMaximization),
            OptimizationGoal::OptimizeQuality => Self::Quality(QualityOptimization),
            OptimizationGoal::MultiObjective => Self::Composite(CompositeObjective::new(
                weights.unwrap_or_default(),
                rates,
            )),
        }
    }

    /// Builds the objective for the model's goal and weights.
    pub fn for_model(model: &ProductionModel, rates: CostRates) -> Self {
        Self::for_goal(model.goal, model.weights, rates)
    }

    fn inner(&self) -> &dyn Objective {
        match self {
            Self::Cost(o) => o,
            Self::Profit(o) => o,
            Self::Production(o) => o,
            Self::Quality(o) => o,
            Self::Composite(o) => o,
        }
    }

    /// Refreshes population-based normalization. No-op except in
    /// multi-objective mode.
    pub fn update_normalization(&mut self, model: &ProductionModel, population: &[Individual]) {
        if let Self::Composite(o) = self {
            o.calculate_normalization_factors(model, population);
        }
    }
}

impl Objective for ObjectiveFunction {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn evaluate(&self, model: &ProductionModel, individual: &Individual) -> (f64, ObjectiveComponents) {
        self.inner().evaluate(model, individual)
    }

    fn description(&self) -> &'static str {
        self.inner().description()
    }
}

/// Defect-adjusted production per product, in model product order.
pub(crate) fn effective_by_product(model: &ProductionModel, individual: &Individual) -> Vec<f64> {
    let layout = individual.layout();
    let mut out = vec![0.0; layout.product_ids().len()];
    for (l, line) in model.lines.values().enumerate() {
        for i in layout.line_span(l) {
            out[layout.slots()[i].product] += individual.genes()[i] * (1.0 - line.defect_rate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GeneLayout;
    use crate::models::production::tests::sample_model;
    use std::sync::Arc;

    #[test]
    fn test_factory_dispatch() {
        let cases = [
            (OptimizationGoal::MinimizeCost, "cost_minimization"),
            (OptimizationGoal::MaximizeProfit, "profit_maximization"),
            (OptimizationGoal::MaximizeProduction, "production_maximization"),
            (OptimizationGoal::OptimizeQuality, "quality_optimization"),
            (OptimizationGoal::MultiObjective, "multi_objective"),
        ];
        for (goal, name) in cases {
            let f = ObjectiveFunction::for_goal(goal, None, CostRates::default());
            assert_eq!(f.name(), name);
        }
    }

    #[test]
    fn test_effective_by_product() {
        let model = sample_model();
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        ind.set_amount("L1", "B", 100.0);
        ind.set_amount("L2", "B", 100.0);
        let eff = effective_by_product(&model, &ind);
        assert!((eff[1] - (97.0 + 95.0)).abs() < 1e-9);
        assert_eq!(eff[0], 0.0);
    }

    #[test]
    fn test_update_normalization_only_composite() {
        let model = sample_model();
        let layout = Arc::new(GeneLayout::from_model(&model));
        let pop = vec![Individual::zeros(layout.clone()), Individual::zeros(layout)];
        let mut f = ObjectiveFunction::for_goal(
            OptimizationGoal::MaximizeProfit,
            None,
            CostRates::default(),
        );
        f.update_normalization(&model, &pop);
        assert!(matches!(f, ObjectiveFunction::Profit(_)));
    }
}
