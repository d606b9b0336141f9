//! Product model.
//!
//! A product carries its unit economics, its demand targets and, per line,
//! the time and cost needed to make it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rules::is_non_negative;
use super::ValidationRules;
use crate::error::{ModelError, Result};

fn default_max_defect_rate() -> f64 {
    0.1
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Material cost per unit.
    pub material_cost: f64,
    /// Selling price per unit.
    pub selling_price: f64,
    /// Target daily production (units).
    pub target_production: f64,
    /// Minimum demand that must be met (units).
    #[serde(default)]
    pub min_demand: f64,
    /// Highest defect rate customers tolerate (default 0.1).
    #[serde(default = "default_max_defect_rate")]
    pub max_defect_rate: f64,
    /// Daily material-supply ceiling (units). `None` = unbounded.
    #[serde(default)]
    pub material_supply_limit: Option<f64>,
    /// Production time per unit on each line (minutes).
    #[serde(default)]
    pub production_times: BTreeMap<String, f64>,
    /// Setup time on each line (minutes).
    #[serde(default)]
    pub setup_times: BTreeMap<String, f64>,
    /// Setup cost on each line.
    #[serde(default)]
    pub setup_costs: BTreeMap<String, f64>,
}

impl Product {
    /// Creates a product, checking its economics against the default
    /// [`ValidationRules`].
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        material_cost: f64,
        selling_price: f64,
        target_production: f64,
    ) -> Result<Self> {
        Self::with_rules(
            id,
            name,
            material_cost,
            selling_price,
            target_production,
            &ValidationRules::default(),
        )
    }

    /// Creates a product, checking its economics against `rules`.
    pub fn with_rules(
        id: impl Into<String>,
        name: impl Into<String>,
        material_cost: f64,
        selling_price: f64,
        target_production: f64,
        rules: &ValidationRules,
    ) -> Result<Self> {
        let product = Self {
            id: id.into(),
            name: name.into(),
            material_cost,
            selling_price,
            target_production,
            min_demand: 0.0,
            max_defect_rate: default_max_defect_rate(),
            material_supply_limit: None,
            production_times: BTreeMap::new(),
            setup_times: BTreeMap::new(),
            setup_costs: BTreeMap::new(),
        };
        product.check(rules)?;
        Ok(product)
    }

    /// Sets the minimum demand.
    pub fn with_min_demand(mut self, min_demand: f64) -> Self {
        self.min_demand = min_demand;
        self
    }

    /// Sets the maximum tolerable defect rate.
    pub fn with_max_defect_rate(mut self, rate: f64) -> Self {
        self.max_defect_rate = rate;
        self
    }

    /// Sets the daily material-supply ceiling.
    pub fn with_material_supply_limit(mut self, limit: f64) -> Self {
        self.material_supply_limit = Some(limit);
        self
    }

    /// Declares the production time (minutes per unit) on a line.
    pub fn with_production_time(mut self, line_id: impl Into<String>, minutes: f64) -> Self {
        self.production_times.insert(line_id.into(), minutes);
        self
    }

    /// Declares the setup time (minutes) and setup cost on a line.
    pub fn with_setup(mut self, line_id: impl Into<String>, minutes: f64, cost: f64) -> Self {
        let line_id = line_id.into();
        self.setup_times.insert(line_id.clone(), minutes);
        self.setup_costs.insert(line_id, cost);
        self
    }

    /// Re-checks the product economics against `rules`, then every figure
    /// set through the builder methods (see [`Product::check_parameters`]).
    pub fn check(&self, rules: &ValidationRules) -> Result<()> {
        rules
            .material_cost
            .check("material_cost", self.material_cost)?;
        rules
            .selling_price
            .check("selling_price", self.selling_price)?;
        rules
            .target_production
            .check("target_production", self.target_production)?;
        if self.selling_price <= self.material_cost {
            return Err(ModelError::PriceBelowCost {
                product: self.id.clone(),
                price: self.selling_price,
                cost: self.material_cost,
            });
        }
        self.check_parameters()
    }

    /// Checks the figures the builder methods store as given:
    ///
    /// | Field | Accepted |
    /// |-------|----------|
    /// | production time per line | finite, > 0 |
    /// | setup time and cost per line | finite, ≥ 0 |
    /// | min demand | finite, ≥ 0 |
    /// | material supply limit | finite, ≥ 0 |
    /// | max defect rate | 0.0..=1.0 |
    pub fn check_parameters(&self) -> Result<()> {
        let invalid = |field: String, value: f64, expected: &'static str| {
            Err(ModelError::InvalidValue {
                owner: self.id.clone(),
                field,
                value,
                expected,
            })
        };
        for (line_id, &minutes) in &self.production_times {
            if !(minutes.is_finite() && minutes > 0.0) {
                return invalid(
                    format!("production time on '{line_id}'"),
                    minutes,
                    "a positive number of minutes",
                );
            }
        }
        for (line_id, &minutes) in &self.setup_times {
            if !is_non_negative(minutes) {
                return invalid(format!("setup time on '{line_id}'"), minutes, "≥ 0");
            }
        }
        for (line_id, &cost) in &self.setup_costs {
            if !is_non_negative(cost) {
                return invalid(format!("setup cost on '{line_id}'"), cost, "≥ 0");
            }
        }
        if !is_non_negative(self.min_demand) {
            return invalid("min_demand".into(), self.min_demand, "≥ 0");
        }
        if let Some(limit) = self.material_supply_limit {
            if !is_non_negative(limit) {
                return invalid("material_supply_limit".into(), limit, "≥ 0");
            }
        }
        if !(0.0..=1.0).contains(&self.max_defect_rate) {
            return invalid("max_defect_rate".into(), self.max_defect_rate, "0..=1");
        }
        Ok(())
    }

    /// Gross profit per unit.
    #[inline]
    pub fn unit_profit(&self) -> f64 {
        self.selling_price - self.material_cost
    }

    /// Production time on a line (minutes per unit); 0 when undeclared.
    #[inline]
    pub fn production_time(&self, line_id: &str) -> f64 {
        self.production_times.get(line_id).copied().unwrap_or(0.0)
    }

    /// Setup time on a line (minutes); 0 when undeclared.
    #[inline]
    pub fn setup_time(&self, line_id: &str) -> f64 {
        self.setup_times.get(line_id).copied().unwrap_or(0.0)
    }

    /// Setup cost on a line; 0 when undeclared.
    #[inline]
    pub fn setup_cost(&self, line_id: &str) -> f64 {
        self.setup_costs.get(line_id).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_economics() {
        let p = Product::new("P1", "Widget", 1_000.0, 3_000.0, 500.0)
            .unwrap()
            .with_production_time("L1", 30.0)
            .with_setup("L1", 60.0, 50_000.0);
        assert!((p.unit_profit() - 2_000.0).abs() < 1e-9);
        assert!((p.production_time("L1") - 30.0).abs() < 1e-9);
        assert!((p.setup_cost("L1") - 50_000.0).abs() < 1e-9);
        assert!((p.setup_time("L2") - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_must_exceed_cost() {
        let err = Product::new("P1", "Widget", 1_000.0, 1_000.0, 500.0).unwrap_err();
        assert!(matches!(err, ModelError::PriceBelowCost { .. }));
    }

    #[test]
    fn test_target_range() {
        assert!(Product::new("P1", "Widget", 1.0, 2.0, 0.0).is_err());
        assert!(Product::new("P1", "Widget", 1.0, 2.0, 2_000_000.0).is_err());
    }

    #[test]
    fn test_check_parameters_rejects_bad_figures() {
        let base = || Product::new("P1", "Widget", 1.0, 2.0, 10.0).unwrap();
        assert!(base()
            .with_production_time("L1", 0.5)
            .with_setup("L1", 0.0, 0.0)
            .with_material_supply_limit(0.0)
            .check_parameters()
            .is_ok());

        let cases = [
            (base().with_production_time("L1", -5.0), "production time on 'L1'"),
            (base().with_production_time("L1", 0.0), "production time on 'L1'"),
            (base().with_production_time("L1", f64::NAN), "production time on 'L1'"),
            (base().with_production_time("L1", f64::INFINITY), "production time on 'L1'"),
            (base().with_setup("L1", -1.0, 0.0), "setup time on 'L1'"),
            (base().with_setup("L1", 0.0, -100.0), "setup cost on 'L1'"),
            (base().with_min_demand(-10.0), "min_demand"),
            (base().with_material_supply_limit(-1.0), "material_supply_limit"),
            (base().with_max_defect_rate(3.0), "max_defect_rate"),
            (base().with_max_defect_rate(-0.1), "max_defect_rate"),
        ];
        for (product, field) in cases {
            match product.check_parameters() {
                Err(ModelError::InvalidValue { field: f, owner, .. }) => {
                    assert_eq!(f, field);
                    assert_eq!(owner, "P1");
                }
                other => panic!("{field}: expected InvalidValue, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_check_covers_builder_figures() {
        let p = Product::new("P1", "Widget", 1.0, 2.0, 10.0)
            .unwrap()
            .with_production_time("L1", -5.0);
        assert!(matches!(
            p.check(&ValidationRules::default()),
            Err(ModelError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_defaults() {
        let p = Product::new("P1", "Widget", 1.0, 2.0, 10.0).unwrap();
        assert!((p.max_defect_rate - 0.1).abs() < 1e-12);
        assert!(p.material_supply_limit.is_none());
        assert!((p.min_demand - 0.0).abs() < 1e-12);
    }
}
