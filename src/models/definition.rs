//! Serializable problem definition.
//!
//! A [`ProblemDefinition`] is the persisted form of a [`ProductionModel`]:
//! lines, products, global constraints, goal and weights. Loading re-runs
//! the construction-time range checks, so a hand-edited file cannot carry
//! out-of-range values into the optimizer.

use serde::{Deserialize, Serialize};

use super::{
    ObjectiveWeights, OptimizationGoal, Product, ProductionConstraints, ProductionLine,
    ProductionModel, ValidationRules,
};
use crate::error::{ModelError, Result};

/// Persisted problem definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDefinition {
    pub lines: Vec<ProductionLine>,
    pub products: Vec<Product>,
    #[serde(default)]
    pub constraints: ProductionConstraints,
    #[serde(default)]
    pub goal: OptimizationGoal,
    #[serde(default)]
    pub weights: Option<ObjectiveWeights>,
}

impl ProblemDefinition {
    /// Captures a model.
    pub fn from_model(model: &ProductionModel) -> Self {
        Self {
            lines: model.lines.values().cloned().collect(),
            products: model.products.values().cloned().collect(),
            constraints: model.constraints.clone(),
            goal: model.goal,
            weights: model.weights,
        }
    }

    /// Rebuilds a model, checking every line and product against `rules`.
    pub fn into_model(self, rules: &ValidationRules) -> Result<ProductionModel> {
        let mut model = ProductionModel::new();
        for line in self.lines {
            line.check(rules)?;
            model.add_line(line);
        }
        for product in self.products {
            product.check(rules)?;
            model.add_product(product);
        }
        model.set_constraints(self.constraints);
        model.set_goal(self.goal, self.weights);
        Ok(model)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Serialization(e.to_string()))
    }

    /// Parses JSON without range checks. Use [`ProblemDefinition::load`]
    /// to obtain a checked model.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ModelError::Serialization(e.to_string()))
    }

    /// Parses JSON and rebuilds a model checked against the default rules.
    pub fn load(json: &str) -> Result<ProductionModel> {
        Self::from_json(json)?.into_model(&ValidationRules::default())
    }
}

impl From<&ProductionModel> for ProblemDefinition {
    fn from(model: &ProductionModel) -> Self {
        Self::from_model(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::production::tests::sample_model;

    #[test]
    fn test_json_round_trip() {
        let mut model = sample_model();
        model.set_constraints(ProductionConstraints::default().with_budget(5_000_000.0));
        model.set_goal(
            OptimizationGoal::MultiObjective,
            Some(ObjectiveWeights::new(0.4, 0.3, 0.2, 0.1)),
        );
        let json = ProblemDefinition::from_model(&model).to_json().unwrap();
        let loaded = ProblemDefinition::load(&json).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_unbounded_serializes_as_null() {
        let json = ProblemDefinition::from_model(&sample_model())
            .to_json()
            .unwrap();
        assert!(json.contains("\"total_budget\": null"));
        assert!(json.contains("\"goal\": \"maximize_profit\""));
    }

    #[test]
    fn test_load_rechecks_ranges() {
        let mut def = ProblemDefinition::from_model(&sample_model());
        def.lines[0].defect_rate = 0.9;
        let json = def.to_json().unwrap();
        let err = ProblemDefinition::load(&json).unwrap_err();
        assert!(matches!(
            err,
            ModelError::OutOfRange {
                field: "defect_rate",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = ProblemDefinition::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ModelError::Serialization(_)));
    }
}
