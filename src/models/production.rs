//! Production system model.
//!
//! [`ProductionModel`] owns the problem definition: lines, products, global
//! constraints and the optimization goal. It is built incrementally, checked
//! once with [`ProductionModel::validate`], and treated as read-only for the
//! duration of an optimization run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ObjectiveWeights, OptimizationGoal, Product, ProductionLine};
use crate::validation::{validate_model, ValidationResult};

/// Global constraints. Every field defaults to "unbounded".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionConstraints {
    /// Daily budget ceiling. `None` = unbounded.
    #[serde(default)]
    pub total_budget: Option<f64>,
    /// Labor ceiling (head count). `None` = unbounded.
    #[serde(default)]
    pub labor_limit: Option<f64>,
    /// Per-product daily material ceilings (units).
    #[serde(default)]
    pub daily_material_limits: BTreeMap<String, f64>,
    /// Per-product minimum production requirements (units).
    #[serde(default)]
    pub min_production_requirements: BTreeMap<String, f64>,
}

impl ProductionConstraints {
    /// Sets the budget ceiling.
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.total_budget = Some(budget);
        self
    }

    /// Sets the labor ceiling.
    pub fn with_labor_limit(mut self, limit: f64) -> Self {
        self.labor_limit = Some(limit);
        self
    }

    /// Sets a daily material ceiling for a product.
    pub fn with_material_limit(mut self, product_id: impl Into<String>, limit: f64) -> Self {
        self.daily_material_limits.insert(product_id.into(), limit);
        self
    }

    /// Sets a minimum production requirement for a product.
    pub fn with_min_production(mut self, product_id: impl Into<String>, amount: f64) -> Self {
        self.min_production_requirements
            .insert(product_id.into(), amount);
        self
    }
}

/// Line × product compatibility matrix (1 = compatible).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityMatrix {
    /// Row labels (line IDs).
    pub lines: Vec<String>,
    /// Column labels (product IDs).
    pub products: Vec<String>,
    /// `cells[row][col]` is 1 when the line can make the product.
    pub cells: Vec<Vec<u8>>,
}

impl CompatibilityMatrix {
    /// Cell value for a (line, product) pair; `None` if either is unknown.
    pub fn get(&self, line_id: &str, product_id: &str) -> Option<u8> {
        let row = self.lines.iter().position(|l| l == line_id)?;
        let col = self.products.iter().position(|p| p == product_id)?;
        Some(self.cells[row][col])
    }
}

/// Overview of a production model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub num_lines: usize,
    pub num_products: usize,
    pub goal: OptimizationGoal,
    pub total_capacity: f64,
    pub total_effective_capacity: f64,
    pub total_target_production: f64,
    pub compatibility: CompatibilityMatrix,
}

/// The complete problem definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionModel {
    /// Lines keyed by ID.
    pub lines: BTreeMap<String, ProductionLine>,
    /// Products keyed by ID.
    pub products: BTreeMap<String, Product>,
    /// Global constraints.
    pub constraints: ProductionConstraints,
    /// Optimization goal.
    pub goal: OptimizationGoal,
    /// Multi-objective weights (only used with [`OptimizationGoal::MultiObjective`]).
    pub weights: Option<ObjectiveWeights>,
}

impl ProductionModel {
    /// Creates an empty model with the default goal (maximize profit).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line. A line with the same ID is replaced.
    pub fn add_line(&mut self, line: ProductionLine) {
        self.lines.insert(line.id.clone(), line);
    }

    /// Adds a product. A product with the same ID is replaced.
    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Adds a line (builder style).
    pub fn with_line(mut self, line: ProductionLine) -> Self {
        self.add_line(line);
        self
    }

    /// Adds a product (builder style).
    pub fn with_product(mut self, product: Product) -> Self {
        self.add_product(product);
        self
    }

    /// Replaces the global constraints.
    pub fn set_constraints(&mut self, constraints: ProductionConstraints) {
        self.constraints = constraints;
    }

    /// Sets the goal. Weights, when given, replace the current ones.
    pub fn set_goal(&mut self, goal: OptimizationGoal, weights: Option<ObjectiveWeights>) {
        self.goal = goal;
        if weights.is_some() {
            self.weights = weights;
        }
    }

    /// Sets the goal (builder style).
    pub fn with_goal(mut self, goal: OptimizationGoal) -> Self {
        self.goal = goal;
        self
    }

    /// Looks up a line.
    pub fn line(&self, id: &str) -> Option<&ProductionLine> {
        self.lines.get(id)
    }

    /// Looks up a product.
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Lines able to make `product_id`, in ID order.
    pub fn compatible_lines<'a>(
        &'a self,
        product_id: &'a str,
    ) -> impl Iterator<Item = &'a ProductionLine> + 'a {
        self.lines
            .values()
            .filter(move |line| line.is_compatible(product_id))
    }

    /// Daily material ceiling for a product: the tighter of the product's
    /// own supply limit and the global per-product limit.
    pub fn material_ceiling(&self, product_id: &str) -> Option<f64> {
        let own = self
            .products
            .get(product_id)
            .and_then(|p| p.material_supply_limit);
        let global = self
            .constraints
            .daily_material_limits
            .get(product_id)
            .copied();
        match (own, global) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Checks model consistency. See [`validate_model`].
    pub fn validate(&self) -> ValidationResult {
        validate_model(self)
    }

    /// Sum of raw daily capacities (units).
    pub fn total_capacity(&self) -> f64 {
        self.lines.values().map(ProductionLine::daily_capacity).sum()
    }

    /// Sum of defect-adjusted daily capacities (units).
    pub fn total_effective_capacity(&self) -> f64 {
        self.lines
            .values()
            .map(ProductionLine::effective_capacity)
            .sum()
    }

    /// Sum of product targets (units).
    pub fn total_target_production(&self) -> f64 {
        self.products.values().map(|p| p.target_production).sum()
    }

    /// Builds the line × product compatibility matrix.
    pub fn compatibility_matrix(&self) -> CompatibilityMatrix {
        let lines: Vec<String> = self.lines.keys().cloned().collect();
        let products: Vec<String> = self.products.keys().cloned().collect();
        let cells = self
            .lines
            .values()
            .map(|line| {
                products
                    .iter()
                    .map(|p| u8::from(line.is_compatible(p)))
                    .collect()
            })
            .collect();
        CompatibilityMatrix {
            lines,
            products,
            cells,
        }
    }

    /// Overview of the model.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            num_lines: self.lines.len(),
            num_products: self.products.len(),
            goal: self.goal,
            total_capacity: self.total_capacity(),
            total_effective_capacity: self.total_effective_capacity(),
            total_target_production: self.total_target_production(),
            compatibility: self.compatibility_matrix(),
        }
    }

    /// Profit if every target were met, ignoring all constraints.
    pub fn theoretical_max_profit(&self) -> f64 {
        self.products
            .values()
            .map(|p| p.unit_profit() * p.target_production)
            .sum()
    }

    /// Material cost at target plus, per product, the operating cost of
    /// its cheapest compatible line.
    pub fn theoretical_min_cost(&self) -> f64 {
        self.products
            .values()
            .map(|p| {
                let material = p.material_cost * p.target_production;
                let operating = self
                    .compatible_lines(&p.id)
                    .map(|line| {
                        line.operating_cost * p.production_time(&line.id) / 60.0
                            * p.target_production
                    })
                    .fold(f64::INFINITY, f64::min);
                if operating.is_finite() {
                    material + operating
                } else {
                    material
                }
            })
            .sum()
    }
}
