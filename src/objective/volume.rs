//! Production-volume objective.

use super::{Objective, ObjectiveComponents};
use crate::ga::Individual;
use crate::models::ProductionModel;

/// Maximizes defect-adjusted output while rewarding target achievement.
///
/// ```text
/// fitness = 0.7 × effective production + 0.3 × 1000 × mean achievement
/// achievement(p) = min(1, produced(p) / target(p))    (1 when target is 0)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionMaximization;

/// Mean per-product achievement ratio, each capped at 1.0.
pub fn mean_achievement(model: &ProductionModel, individual: &Individual) -> f64 {
    if model.products.is_empty() {
        return 0.0;
    }
    let sum: f64 = model
        .products
        .values()
        .enumerate()
        .map(|(p, product)| {
            if product.target_production > 0.0 {
                (individual.product_total_at(p) / product.target_production).min(1.0)
            } else {
                1.0
            }
        })
        .sum();
    sum / model.products.len() as f64
}

impl Objective for ProductionMaximization {
    fn name(&self) -> &'static str {
        "production_maximization"
    }

    fn evaluate(&self, model: &ProductionModel, individual: &Individual) -> (f64, ObjectiveComponents) {
        let effective: f64 = model
            .lines
            .values()
            .enumerate()
            .map(|(l, line)| individual.line_production_at(l) * (1.0 - line.defect_rate))
            .sum();
        let achievement = mean_achievement(model, individual);

        let components = ObjectiveComponents {
            production_volume: individual.total_production_amount(),
            efficiency_score: achievement,
            ..Default::default()
        };
        (effective * 0.7 + achievement * 1000.0 * 0.3, components)
    }

    fn description(&self) -> &'static str {
        "Maximize defect-adjusted production volume"
    }
}
