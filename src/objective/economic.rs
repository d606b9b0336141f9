//! Cost and profit objectives.

use super::{effective_by_product, CostRates, Objective, ObjectiveComponents};
use crate::ga::Individual;
use crate::models::ProductionModel;

/// Minimizes total daily cost. Fitness = −total cost.
///
/// Cost terms:
///
/// | Term | Formula |
/// |------|---------|
/// | material | production × unit material cost |
/// | operating | utilization × max hours × hourly rate |
/// | labor | Σ working hours × labor rate |
/// | setup | active (line, product) pairs × flat setup cost |
/// | maintenance | monthly maintenance / 30, for running lines |
/// | quality | expected defective units × handling cost |
/// | inventory | excess over target × 10% of material cost |
/// | opportunity | shortfall below target × 50% of unit profit |
///
/// Utilization is capped at 1.0 for costing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostMinimization {
    pub rates: CostRates,
}

impl CostMinimization {
    pub fn new(rates: CostRates) -> Self {
        Self { rates }
    }

    /// Computes the cost breakdown (revenue left at 0).
    pub fn costs(&self, model: &ProductionModel, individual: &Individual) -> ObjectiveComponents {
        let mut c = ObjectiveComponents::default();

        for (p, product) in model.products.values().enumerate() {
            let produced = individual.product_total_at(p);
            c.material_cost += produced * product.material_cost;

            let excess = (produced - product.target_production).max(0.0);
            c.inventory_cost += excess * product.material_cost * self.rates.inventory_rate;

            let shortage = (product.target_production - produced).max(0.0);
            c.opportunity_cost += shortage * product.unit_profit() * self.rates.opportunity_rate;
        }

        let mut working_hours = 0.0;
        for (l, line) in model.lines.values().enumerate() {
            let utilization = individual.utilization_at(model, l);
            let hours = utilization * line.max_working_hours;
            working_hours += hours;
            c.operating_cost += hours * line.operating_cost;
            if utilization > 0.0 {
                c.maintenance_cost += line.maintenance_cost / 30.0;
            }
            let defective = individual.line_production_at(l) * line.defect_rate;
            c.quality_cost += defective * self.rates.defect_handling_per_unit;
        }
        c.labor_cost = working_hours * self.rates.labor_per_hour;

        let active = individual.genes().iter().filter(|&&g| g > 0.0).count();
        c.setup_cost = active as f64 * self.rates.setup_per_pair;

        c.calculate_totals();
        c
    }
}

impl Objective for CostMinimization {
    fn name(&self) -> &'static str {
        "cost_minimization"
    }

    fn evaluate(&self, model: &ProductionModel, individual: &Individual) -> (f64, ObjectiveComponents) {
        let c = self.costs(model, individual);
        (-c.total_cost, c)
    }

    fn description(&self) -> &'static str {
        "Minimize total daily cost"
    }
}

/// Maximizes daily profit. Fitness = revenue − total cost.
///
/// Costs come from [`CostMinimization`]. Revenue is defect-adjusted
/// production × selling price, plus a per-unit premium for output of lines
/// with a defect rate below 3% and a per-unit bonus for total production
/// beyond 5,000 units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitMaximization {
    pub rates: CostRates,
}

impl ProfitMaximization {
    pub fn new(rates: CostRates) -> Self {
        Self { rates }
    }
}

impl Objective for ProfitMaximization {
    fn name(&self) -> &'static str {
        "profit_maximization"
    }

    fn evaluate(&self, model: &ProductionModel, individual: &Individual) -> (f64, ObjectiveComponents) {
        let mut c = CostMinimization::new(self.rates).costs(model, individual);

        let effective = effective_by_product(model, individual);
        c.revenue = model
            .products
            .values()
            .zip(&effective)
            .map(|(product, &units)| units * product.selling_price)
            .sum();

        for (l, line) in model.lines.values().enumerate() {
            if line.defect_rate < self.rates.quality_premium_threshold {
                c.revenue +=
                    individual.line_production_at(l) * self.rates.quality_premium_per_unit;
            }
        }

        let total = individual.total_production_amount();
        if total > self.rates.volume_bonus_threshold {
            c.revenue +=
                (total - self.rates.volume_bonus_threshold) * self.rates.volume_bonus_per_unit;
        }

        c.calculate_totals();
        (c.total_profit, c)
    }

    fn description(&self) -> &'static str {
        "Maximize daily profit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GeneLayout;
    use crate::models::production::tests::sample_model;
    use std::sync::Arc;

    fn one_pair() -> (ProductionModel, Individual) {
        let model = sample_model();
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        // 16 units of A on L1 = 8 h (half of 16 h)
        ind.set_amount("L1", "A", 16.0);
        (model, ind)
    }

    #[test]
    fn test_cost_breakdown() {
        let (model, ind) = one_pair();
        let (fitness, c) = CostMinimization::default().evaluate(&model, &ind);

        assert!((c.material_cost - 16_000.0).abs() < 1e-6);
        assert!((c.operating_cost - 8.0 * 50_000.0).abs() < 1e-6);
        assert!((c.labor_cost - 8.0 * 30_000.0).abs() < 1e-6);
        assert!((c.setup_cost - 50_000.0).abs() < 1e-6);
        assert!((c.maintenance_cost - 200_000.0 / 30.0).abs() < 1e-6);
        assert!((c.quality_cost - 16.0 * 0.03 * 500.0).abs() < 1e-6);
        assert!((c.inventory_cost - 0.0).abs() < 1e-12);

        // shortfall: A 484 × 1000, B 800 × 500, C 1200 × 300
        let opportunity = 484.0 * 1_000.0 + 800.0 * 500.0 + 1_200.0 * 300.0;
        assert!((c.opportunity_cost - opportunity).abs() < 1e-6);
        assert!((fitness + c.total_cost).abs() < 1e-9);
    }

    #[test]
    fn test_inventory_cost_on_excess() {
        let model = sample_model();
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        ind.set_amount("L2", "C", 1_300.0);
        let c = CostMinimization::default().costs(&model, &ind);
        assert!((c.inventory_cost - 100.0 * 200.0 * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_profit_revenue() {
        let (model, ind) = one_pair();
        let (fitness, c) = ProfitMaximization::default().evaluate(&model, &ind);
        // L1 defect 0.03 is not below the premium threshold
        assert!((c.revenue - 16.0 * 0.97 * 3_000.0).abs() < 1e-6);
        assert!((fitness - (c.revenue - c.total_cost)).abs() < 1e-9);
    }

    #[test]
    fn test_quality_premium_and_volume_bonus() {
        let mut model = sample_model();
        let mut l2 = model.lines["L2"].clone();
        l2.defect_rate = 0.01;
        model.add_line(l2);
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        ind.set_amount("L2", "C", 6_000.0);

        let (_, c) = ProfitMaximization::default().evaluate(&model, &ind);
        let expected = 6_000.0 * 0.99 * 800.0 + 6_000.0 * 100.0 + 1_000.0 * 50.0;
        assert!((c.revenue - expected).abs() < 1e-6);
    }

    #[test]
    fn test_zero_allocation_costs() {
        let model = sample_model();
        let ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        let c = CostMinimization::default().costs(&model, &ind);
        assert_eq!(c.setup_cost, 0.0);
        assert_eq!(c.maintenance_cost, 0.0);
        assert_eq!(c.labor_cost, 0.0);
    }
}
