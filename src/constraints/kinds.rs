//! Built-in constraints.
//!
//! Each constraint detects its violation on an individual and can repair
//! the individual in place.
//!
//! | Constraint | Type | Priority | Base penalty weight |
//! |------------|------|----------|---------------------|
//! | capacity | hard | critical | 10,000 |
//! | demand | soft | high | 5,000 |
//! | budget | hard | critical | 8,000 |
//! | quality | soft | high | 3,000 |
//! | material supply | hard | critical | 7,000 |

use serde::{Deserialize, Serialize};

use super::{ConstraintPriority, ConstraintType, ConstraintViolation};
use crate::ga::Individual;
use crate::models::ProductionModel;

/// Tolerance on utilization comparisons. Keeps capacity repair idempotent
/// under floating-point rounding.
const UTILIZATION_EPS: f64 = 1e-9;

/// Upper bound on full budget-repair passes.
const MAX_BUDGET_PASSES: usize = 50;

/// What a constraint checks, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// No line may exceed `1 − safety_margin` utilization.
    Capacity { safety_margin: f64 },
    /// Each product must reach max(min demand, target × rate, minimum
    /// production requirement).
    Demand { min_satisfaction_rate: f64 },
    /// Total cost must not exceed `limit`.
    Budget { limit: f64 },
    /// Production-weighted defect rate must not exceed `max_defect_rate`.
    Quality { max_defect_rate: f64 },
    /// Each product must stay within its material ceiling.
    MaterialSupply,
}

impl ConstraintKind {
    /// Default name.
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Capacity { .. } => "capacity",
            Self::Demand { .. } => "demand",
            Self::Budget { .. } => "budget",
            Self::Quality { .. } => "quality",
            Self::MaterialSupply => "material_supply",
        }
    }

    /// Hard, soft or flexible.
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Self::Demand { .. } | Self::Quality { .. } => ConstraintType::Soft,
            _ => ConstraintType::Hard,
        }
    }

    /// Repair priority.
    pub fn priority(&self) -> ConstraintPriority {
        match self {
            Self::Demand { .. } | Self::Quality { .. } => ConstraintPriority::High,
            _ => ConstraintPriority::Critical,
        }
    }

    /// Base penalty weight.
    pub fn default_penalty_weight(&self) -> f64 {
        match self {
            Self::Capacity { .. } => 10_000.0,
            Self::Demand { .. } => 5_000.0,
            Self::Budget { .. } => 8_000.0,
            Self::Quality { .. } => 3_000.0,
            Self::MaterialSupply => 7_000.0,
        }
    }
}

/// A named, weighted, switchable constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub penalty_weight: f64,
    pub enabled: bool,
}

impl Constraint {
    /// Creates an enabled constraint with its default name and weight.
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            name: kind.default_name().to_string(),
            penalty_weight: kind.default_penalty_weight(),
            kind,
            enabled: true,
        }
    }

    /// Capacity constraint.
    pub fn capacity(safety_margin: f64) -> Self {
        Self::new(ConstraintKind::Capacity { safety_margin })
    }

    /// Demand constraint.
    pub fn demand(min_satisfaction_rate: f64) -> Self {
        Self::new(ConstraintKind::Demand {
            min_satisfaction_rate,
        })
    }

    /// Budget constraint.
    pub fn budget(limit: f64) -> Self {
        Self::new(ConstraintKind::Budget { limit })
    }

    /// Quality constraint.
    pub fn quality(max_defect_rate: f64) -> Self {
        Self::new(ConstraintKind::Quality { max_defect_rate })
    }

    /// Material-supply constraint.
    pub fn material_supply() -> Self {
        Self::new(ConstraintKind::MaterialSupply)
    }

    /// Renames the constraint.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the penalty weight.
    pub fn with_penalty_weight(mut self, weight: f64) -> Self {
        self.penalty_weight = weight;
        self
    }

    /// Repair priority.
    pub fn priority(&self) -> ConstraintPriority {
        self.kind.priority()
    }

    fn violation(
        &self,
        amount: f64,
        percentage: f64,
        penalty: f64,
        description: String,
        suggested_fix: &str,
    ) -> ConstraintViolation {
        ConstraintViolation {
            constraint_name: self.name.clone(),
            constraint_type: self.kind.constraint_type(),
            priority: self.kind.priority(),
            violation_amount: amount,
            violation_percentage: percentage,
            penalty_value: penalty,
            description,
            suggested_fix: suggested_fix.to_string(),
        }
    }

    /// Checks the individual. Returns `None` when satisfied.
    pub fn check_violation(
        &self,
        model: &ProductionModel,
        individual: &Individual,
    ) -> Option<ConstraintViolation> {
        match self.kind {
            ConstraintKind::Capacity { safety_margin } => {
                self.check_capacity(model, individual, safety_margin)
            }
            ConstraintKind::Demand {
                min_satisfaction_rate,
            } => self.check_demand(model, individual, min_satisfaction_rate),
            ConstraintKind::Budget { limit } => self.check_budget(model, individual, limit),
            ConstraintKind::Quality { max_defect_rate } => {
                self.check_quality(model, individual, max_defect_rate)
            }
            ConstraintKind::MaterialSupply => self.check_material(model, individual),
        }
    }

    /// Repairs the individual in place. A no-op when satisfied.
    pub fn repair(&self, model: &ProductionModel, individual: &mut Individual) {
        match self.kind {
            ConstraintKind::Capacity { safety_margin } => {
                repair_capacity(model, individual, safety_margin)
            }
            ConstraintKind::Demand {
                min_satisfaction_rate,
            } => repair_demand(model, individual, min_satisfaction_rate),
            ConstraintKind::Budget { limit } => repair_budget(model, individual, limit),
            ConstraintKind::Quality { max_defect_rate } => {
                repair_quality(model, individual, max_defect_rate)
            }
            ConstraintKind::MaterialSupply => repair_material(model, individual),
        }
    }

    // ======================== Checks ========================

    fn check_capacity(
        &self,
        model: &ProductionModel,
        individual: &Individual,
        safety_margin: f64,
    ) -> Option<ConstraintViolation> {
        let max_util = 1.0 - safety_margin;
        let mut worst = 0.0_f64;
        let mut lines = Vec::new();
        for (l, line) in model.lines.values().enumerate() {
            let util = individual.raw_utilization_at(model, l);
            if util > max_util + UTILIZATION_EPS {
                worst = worst.max(util - max_util);
                lines.push(format!("{} ({:.1}%)", line.name, util * 100.0));
            }
        }
        (worst > 0.0).then(|| {
            self.violation(
                worst,
                worst * 100.0,
                worst * self.penalty_weight,
                format!("Line capacity exceeded: {}", lines.join(", ")),
                "Reduce production or extend working hours",
            )
        })
    }

    fn check_demand(
        &self,
        model: &ProductionModel,
        individual: &Individual,
        rate: f64,
    ) -> Option<ConstraintViolation> {
        let mut shortage_total = 0.0;
        let mut required_total = 0.0;
        let mut products = Vec::new();
        for (p, product) in model.products.values().enumerate() {
            let required = required_production(model, &product.id, rate);
            let produced = individual.product_total_at(p);
            if produced < required {
                let shortage = required - produced;
                shortage_total += shortage;
                products.push(format!("{} ({:.0} units short)", product.name, shortage));
            }
            required_total += required;
        }
        (shortage_total > 0.0).then(|| {
            let pct = if required_total > 0.0 {
                shortage_total / required_total * 100.0
            } else {
                0.0
            };
            self.violation(
                shortage_total,
                pct,
                shortage_total * self.penalty_weight,
                format!("Demand not met: {}", products.join(", ")),
                "Increase production or assign it to more efficient lines",
            )
        })
    }

    fn check_budget(
        &self,
        model: &ProductionModel,
        individual: &Individual,
        limit: f64,
    ) -> Option<ConstraintViolation> {
        let cost = individual.total_cost(model);
        (cost > limit).then(|| {
            let excess = cost - limit;
            let pct = if limit > 0.0 {
                excess / limit * 100.0
            } else {
                100.0
            };
            self.violation(
                excess,
                pct,
                excess * self.penalty_weight,
                format!("Budget exceeded: {cost:.0} > {limit:.0}"),
                "Cut production on high-cost lines or favour low-cost products",
            )
        })
    }

    fn check_quality(
        &self,
        model: &ProductionModel,
        individual: &Individual,
        max_defect_rate: f64,
    ) -> Option<ConstraintViolation> {
        let (total, defects) = production_and_defects(model, individual);
        if total <= 0.0 {
            return None;
        }
        let overall = defects / total;
        (overall > max_defect_rate).then(|| {
            let excess = overall - max_defect_rate;
            self.violation(
                excess,
                excess * 100.0,
                excess * total * self.penalty_weight,
                format!(
                    "Overall defect rate too high: {:.2}% > {:.2}%",
                    overall * 100.0,
                    max_defect_rate * 100.0
                ),
                "Shift production from low-quality to high-quality lines",
            )
        })
    }

    fn check_material(
        &self,
        model: &ProductionModel,
        individual: &Individual,
    ) -> Option<ConstraintViolation> {
        let mut worst = 0.0_f64;
        let mut worst_ceiling = 0.0;
        let mut products = Vec::new();
        for (p, product) in model.products.values().enumerate() {
            let Some(ceiling) = model.material_ceiling(&product.id) else {
                continue;
            };
            let produced = individual.product_total_at(p);
            if produced > ceiling {
                let excess = produced - ceiling;
                if excess > worst {
                    worst = excess;
                    worst_ceiling = ceiling;
                }
                products.push(format!("{} ({:.0} units over)", product.name, excess));
            }
        }
        (worst > 0.0).then(|| {
            let pct = if worst_ceiling > 0.0 {
                worst / worst_ceiling * 100.0
            } else {
                100.0
            };
            self.violation(
                worst,
                pct,
                worst * self.penalty_weight,
                format!("Material supply exceeded: {}", products.join(", ")),
                "Keep production within the material supply limit",
            )
        })
    }
}

/// Minimum production a product must reach under the demand constraint.
pub fn required_production(model: &ProductionModel, product_id: &str, rate: f64) -> f64 {
    let Some(product) = model.product(product_id) else {
        return 0.0;
    };
    let requirement = model
        .constraints
        .min_production_requirements
        .get(product_id)
        .copied()
        .unwrap_or(0.0);
    product
        .min_demand
        .max(product.target_production * rate)
        .max(requirement)
}

fn production_and_defects(model: &ProductionModel, individual: &Individual) -> (f64, f64) {
    model
        .lines
        .values()
        .enumerate()
        .fold((0.0, 0.0), |(total, defects), (l, line)| {
            let made = individual.line_production_at(l);
            (total + made, defects + made * line.defect_rate)
        })
}

// ======================== Repairs ========================

fn scale_line(individual: &mut Individual, line: usize, factor: f64) {
    let span = individual.layout().line_span(line);
    for g in &mut individual.genes_mut()[span] {
        *g *= factor;
    }
}

fn repair_capacity(model: &ProductionModel, individual: &mut Individual, safety_margin: f64) {
    let max_util = 1.0 - safety_margin;
    for l in 0..model.lines.len() {
        let util = individual.raw_utilization_at(model, l);
        if util > max_util + UTILIZATION_EPS {
            scale_line(individual, l, max_util / util);
        }
    }
}

fn repair_demand(model: &ProductionModel, individual: &mut Individual, rate: f64) {
    for (p, product) in model.products.values().enumerate() {
        let required = required_production(model, &product.id, rate);
        let produced = individual.product_total_at(p);
        if produced >= required {
            continue;
        }
        let shortage = required - produced;

        let mut best: Option<(usize, f64)> = None;
        for (l, line) in model.lines.values().enumerate() {
            let Some(slot) = individual.layout().slot_index(l, p) else {
                continue;
            };
            let util = individual.raw_utilization_at(model, l);
            if util < 0.9 {
                let score = (1.0 - line.defect_rate) * (1.0 - util);
                if score > best.map_or(0.0, |(_, s)| s) {
                    best = Some((slot, score));
                }
            }
        }
        if let Some((slot, _)) = best {
            individual.genes_mut()[slot] += shortage;
        }
    }
}

fn repair_budget(model: &ProductionModel, individual: &mut Individual, limit: f64) {
    let mut cost = individual.total_cost(model);
    for _ in 0..MAX_BUDGET_PASSES {
        if cost <= limit {
            return;
        }
        let mut order: Vec<(usize, f64)> = model
            .lines
            .values()
            .enumerate()
            .map(|(l, line)| {
                let hours = individual.utilization_at(model, l) * line.max_working_hours;
                (l, line.operating_cost * hours)
            })
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));

        let before = cost;
        for (l, _) in order {
            if individual.total_cost(model) <= limit {
                break;
            }
            scale_line(individual, l, 0.9);
        }
        cost = individual.total_cost(model);
        if cost >= before {
            return;
        }
    }
}

fn repair_quality(model: &ProductionModel, individual: &mut Individual, max_defect_rate: f64) {
    let (total, defects) = production_and_defects(model, individual);
    if total <= 0.0 || defects / total <= max_defect_rate {
        return;
    }

    let mut ranked: Vec<(usize, f64)> = model
        .lines
        .values()
        .enumerate()
        .map(|(l, line)| (l, line.defect_rate))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    for i in (1..ranked.len()).rev() {
        let low = ranked[i].0;
        for &(high, _) in &ranked[..i] {
            for from in individual.layout().line_span(low) {
                let product = individual.layout().slots()[from].product;
                let Some(to) = individual.layout().slot_index(high, product) else {
                    continue;
                };
                let amount = individual.genes()[from];
                if amount > 0.0 && individual.raw_utilization_at(model, high) < 0.8 {
                    let moved = amount * 0.3;
                    let genes = individual.genes_mut();
                    genes[from] -= moved;
                    genes[to] += moved;
                }
            }
        }
    }
}

fn repair_material(model: &ProductionModel, individual: &mut Individual) {
    for (p, product) in model.products.values().enumerate() {
        let Some(ceiling) = model.material_ceiling(&product.id) else {
            continue;
        };
        let produced = individual.product_total_at(p);
        if produced > ceiling {
            let ratio = ceiling.max(0.0) / produced;
            let slots: Vec<usize> = individual.layout().product_slots(p).collect();
            let genes = individual.genes_mut();
            for i in slots {
                genes[i] *= ratio;
            }
        }
    }
}
