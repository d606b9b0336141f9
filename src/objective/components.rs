//! Economic breakdown and fixed cost rates.

use serde::{Deserialize, Serialize};

/// Decomposed economics of one individual under one objective.
///
/// Every evaluation starts from zero; fields an objective does not compute
/// stay at 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveComponents {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub operating_cost: f64,
    pub setup_cost: f64,
    pub maintenance_cost: f64,
    pub inventory_cost: f64,
    pub quality_cost: f64,
    pub opportunity_cost: f64,

    pub revenue: f64,
    pub production_volume: f64,
    pub quality_score: f64,
    pub efficiency_score: f64,
    pub flexibility_score: f64,

    pub total_cost: f64,
    pub total_profit: f64,
}

impl ObjectiveComponents {
    /// Recomputes `total_cost` (sum of the eight cost fields) and
    /// `total_profit` (revenue − total cost).
    pub fn calculate_totals(&mut self) {
        self.total_cost = self.material_cost
            + self.labor_cost
            + self.operating_cost
            + self.setup_cost
            + self.maintenance_cost
            + self.inventory_cost
            + self.quality_cost
            + self.opportunity_cost;
        self.total_profit = self.revenue - self.total_cost;
    }
}

/// Fixed economic rates used by the cost and profit objectives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    /// Labor cost per working hour, summed over all lines.
    pub labor_per_hour: f64,
    /// Flat setup cost per active (line, product) pair.
    pub setup_per_pair: f64,
    /// Handling cost per expected defective unit.
    pub defect_handling_per_unit: f64,
    /// Holding cost per excess unit, as a fraction of material cost.
    pub inventory_rate: f64,
    /// Lost profit per missing unit, as a fraction of unit profit.
    pub opportunity_rate: f64,
    /// Revenue premium per unit made on a high-quality line.
    pub quality_premium_per_unit: f64,
    /// Lines with a defect rate strictly below this earn the premium.
    pub quality_premium_threshold: f64,
    /// Revenue bonus per unit beyond `volume_bonus_threshold`.
    pub volume_bonus_per_unit: f64,
    /// Total production above which the volume bonus applies.
    pub volume_bonus_threshold: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            labor_per_hour: 30_000.0,
            setup_per_pair: 50_000.0,
            defect_handling_per_unit: 500.0,
            inventory_rate: 0.1,
            opportunity_rate: 0.5,
            quality_premium_per_unit: 100.0,
            quality_premium_threshold: 0.03,
            volume_bonus_per_unit: 50.0,
            volume_bonus_threshold: 5_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_totals() {
        let mut c = ObjectiveComponents {
            material_cost: 100.0,
            labor_cost: 20.0,
            operating_cost: 30.0,
            setup_cost: 5.0,
            maintenance_cost: 1.0,
            inventory_cost: 2.0,
            quality_cost: 3.0,
            opportunity_cost: 4.0,
            revenue: 500.0,
            ..Default::default()
        };
        c.calculate_totals();
        assert!((c.total_cost - 165.0).abs() < 1e-12);
        assert!((c.total_profit - 335.0).abs() < 1e-12);
    }
}
