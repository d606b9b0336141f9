//! Quality objective.

use super::{Objective, ObjectiveComponents};
use crate::ga::Individual;
use crate::models::ProductionModel;

/// Maximizes output quality.
///
/// ```text
/// fitness = 1000 × (0.5 × weighted quality
///                 + 0.3 × consistency
///                 + 0.2 × compliance)
/// ```
///
/// - weighted quality: Σ production × (1 − defect) / Σ production, over
///   running lines.
/// - consistency: 1 − population standard deviation of the running lines'
///   (1 − defect), floored at 0; 1 with fewer than two running lines.
/// - compliance: mean over products of min(1, average quality /
///   (1 − max defect rate)); products with no output score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityOptimization;

impl Objective for QualityOptimization {
    fn name(&self) -> &'static str {
        "quality_optimization"
    }

    fn evaluate(&self, model: &ProductionModel, individual: &Individual) -> (f64, ObjectiveComponents) {
        let mut weighted = 0.0;
        let mut total = 0.0;
        let mut line_qualities = Vec::new();
        for (l, line) in model.lines.values().enumerate() {
            let produced = individual.line_production_at(l);
            if produced > 0.0 {
                let q = 1.0 - line.defect_rate;
                weighted += produced * q;
                total += produced;
                line_qualities.push(q);
            }
        }
        let quality_score = if total > 0.0 { weighted / total } else { 0.0 };

        let consistency = if line_qualities.len() > 1 {
            let n = line_qualities.len() as f64;
            let mean = line_qualities.iter().sum::<f64>() / n;
            let var = line_qualities
                .iter()
                .map(|q| (q - mean).powi(2))
                .sum::<f64>()
                / n;
            (1.0 - var.sqrt()).max(0.0)
        } else {
            1.0
        };

        let layout = individual.layout();
        let mut compliance = 0.0;
        for (p, product) in model.products.values().enumerate() {
            let mut good = 0.0;
            let mut made = 0.0;
            for i in layout.product_slots(p) {
                let amount = individual.genes()[i];
                if amount > 0.0 {
                    let line_id = &layout.line_ids()[layout.slots()[i].line];
                    let defect = model.line(line_id).map_or(0.0, |l| l.defect_rate);
                    good += amount * (1.0 - defect);
                    made += amount;
                }
            }
            if made > 0.0 {
                let required = 1.0 - product.max_defect_rate;
                let avg = good / made;
                compliance += if required <= 0.0 || avg >= required {
                    1.0
                } else {
                    avg / required
                };
            }
        }
        if !model.products.is_empty() {
            compliance /= model.products.len() as f64;
        }

        let components = ObjectiveComponents {
            quality_score,
            efficiency_score: consistency,
            flexibility_score: compliance,
            ..Default::default()
        };
        let fitness = (quality_score * 0.5 + consistency * 0.3 + compliance * 0.2) * 1000.0;
        (fitness, components)
    }

    fn description(&self) -> &'static str {
        "Maximize output quality and consistency"
    }
}
