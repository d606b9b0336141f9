//! Constraint set with adaptive penalties and violation history.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use super::{Constraint, ConstraintHandling, ConstraintKind, ConstraintSettings, ConstraintViolation};
use crate::ga::Individual;
use crate::models::ProductionModel;

/// Evaluations kept in the rolling history.
const HISTORY_LIMIT: usize = 100;
/// Violation count after which a constraint's penalty starts escalating.
const ESCALATION_THRESHOLD: u64 = 10;
/// Per-violation growth of the escalation multiplier.
const ESCALATION_RATE: f64 = 1.1;
/// Ceiling of the escalation multiplier.
const ESCALATION_CAP: f64 = 5.0;
/// Violation frequency above which a suggestion is emitted.
const SUGGESTION_FREQUENCY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
struct AdaptivePenalty {
    violation_count: u64,
    multiplier: f64,
}

impl Default for AdaptivePenalty {
    fn default() -> Self {
        Self {
            violation_count: 0,
            multiplier: 1.0,
        }
    }
}

/// Per-constraint statistics over the rolling history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConstraintStatistics {
    /// Fraction of recorded evaluations that violated the constraint.
    pub violation_frequency: f64,
    pub average_violation: f64,
    pub max_violation: f64,
    pub average_penalty: f64,
}

/// The constraint set for one optimization run.
///
/// Checking is split in two so that evaluation can run in parallel:
///
/// 1. [`ConstraintHandler::inspect`] is pure and may run on any thread.
/// 2. [`ConstraintHandler::record`] escalates penalties and appends to the
///    history; it is called sequentially in population order.
///
/// [`ConstraintHandler::check_all_constraints`] does both.
#[derive(Debug, Clone)]
pub struct ConstraintHandler {
    constraints: Vec<Constraint>,
    handling: ConstraintHandling,
    history: VecDeque<Vec<ConstraintViolation>>,
    adaptive: BTreeMap<String, AdaptivePenalty>,
}

impl ConstraintHandler {
    /// Builds the default constraint set for a model: capacity, demand,
    /// quality and material supply, plus budget when a budget is set.
    pub fn new(
        model: &ProductionModel,
        settings: &ConstraintSettings,
        handling: ConstraintHandling,
    ) -> Self {
        let mut constraints = vec![
            Constraint::capacity(settings.capacity_safety_margin),
            Constraint::demand(settings.demand_min_satisfaction),
            Constraint::quality(settings.quality_max_defect_rate),
            Constraint::material_supply(),
        ];
        if let Some(limit) = model.constraints.total_budget.filter(|b| b.is_finite()) {
            constraints.push(Constraint::budget(limit));
        }
        Self::with_constraints(constraints, handling)
    }

    /// Builds a handler over an explicit constraint list.
    pub fn with_constraints(constraints: Vec<Constraint>, handling: ConstraintHandling) -> Self {
        Self {
            constraints,
            handling,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            adaptive: BTreeMap::new(),
        }
    }

    /// Constraint-handling policy.
    pub fn handling(&self) -> ConstraintHandling {
        self.handling
    }

    /// All constraints, enabled or not.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Looks up a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Mutable lookup by name.
    pub fn constraint_mut(&mut self, name: &str) -> Option<&mut Constraint> {
        self.constraints.iter_mut().find(|c| c.name == name)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Removes every constraint with the given name. Returns whether any
    /// was removed.
    pub fn remove_constraint(&mut self, name: &str) -> bool {
        let before = self.constraints.len();
        self.constraints.retain(|c| c.name != name);
        self.constraints.len() != before
    }

    /// Enables or disables a constraint. Returns `false` if unknown.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.constraint_mut(name) {
            Some(c) => {
                c.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Checks every enabled constraint. Does not touch handler state.
    pub fn inspect(&self, model: &ProductionModel, individual: &Individual) -> Vec<ConstraintViolation> {
        self.constraints
            .iter()
            .filter(|c| c.enabled)
            .filter_map(|c| c.check_violation(model, individual))
            .collect()
    }

    /// Applies adaptive escalation to `violations`, appends them to the
    /// history and returns the total escalated penalty.
    pub fn record(&mut self, violations: &[ConstraintViolation]) -> f64 {
        let mut total = 0.0;
        for v in violations {
            let entry = self.adaptive.entry(v.constraint_name.clone()).or_default();
            entry.violation_count += 1;
            if entry.violation_count > ESCALATION_THRESHOLD {
                entry.multiplier = (entry.multiplier * ESCALATION_RATE).min(ESCALATION_CAP);
            }
            total += v.penalty_value * entry.multiplier;
        }

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(violations.to_vec());
        total
    }

    /// Inspects and records in one step.
    ///
    /// # Returns
    /// `(feasible, violations, total_penalty)`.
    pub fn check_all_constraints(
        &mut self,
        model: &ProductionModel,
        individual: &Individual,
    ) -> (bool, Vec<ConstraintViolation>, f64) {
        let violations = self.inspect(model, individual);
        let penalty = self.record(&violations);
        (violations.is_empty(), violations, penalty)
    }

    /// Repairs each violated constraint in priority order (critical first).
    pub fn repair(
        &self,
        model: &ProductionModel,
        individual: &mut Individual,
        violations: &[ConstraintViolation],
    ) {
        let mut ordered: Vec<&ConstraintViolation> = violations.iter().collect();
        ordered.sort_by_key(|v| v.priority);
        for v in ordered {
            if let Some(c) = self.constraint(&v.constraint_name) {
                c.repair(model, individual);
            }
        }
    }

    /// Repairs only under [`ConstraintHandling::RepairAlgorithm`]. Returns
    /// whether a repair was attempted.
    pub fn repair_violations(
        &self,
        model: &ProductionModel,
        individual: &mut Individual,
        violations: &[ConstraintViolation],
    ) -> bool {
        if self.handling != ConstraintHandling::RepairAlgorithm || violations.is_empty() {
            return false;
        }
        self.repair(model, individual, violations);
        true
    }

    /// Current escalation multiplier of a constraint (1.0 if never violated).
    pub fn penalty_multiplier(&self, name: &str) -> f64 {
        self.adaptive.get(name).map_or(1.0, |a| a.multiplier)
    }

    /// Number of evaluations in the rolling history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Most recent recorded violation list.
    pub fn last_violations(&self) -> Option<&[ConstraintViolation]> {
        self.history.back().map(Vec::as_slice)
    }

    /// Per-constraint statistics over the rolling history. Empty when
    /// nothing has been recorded.
    pub fn statistics(&self) -> BTreeMap<String, ConstraintStatistics> {
        let mut stats = BTreeMap::new();
        if self.history.is_empty() {
            return stats;
        }
        let evaluations = self.history.len() as f64;
        for c in &self.constraints {
            let hits: Vec<&ConstraintViolation> = self
                .history
                .iter()
                .flatten()
                .filter(|v| v.constraint_name == c.name)
                .collect();
            let entry = if hits.is_empty() {
                ConstraintStatistics::default()
            } else {
                let n = hits.len() as f64;
                ConstraintStatistics {
                    violation_frequency: n / evaluations,
                    average_violation: hits.iter().map(|v| v.violation_amount).sum::<f64>() / n,
                    max_violation: hits
                        .iter()
                        .map(|v| v.violation_amount)
                        .fold(f64::NEG_INFINITY, f64::max),
                    average_penalty: hits.iter().map(|v| v.penalty_value).sum::<f64>() / n,
                }
            };
            stats.insert(c.name.clone(), entry);
        }
        stats
    }

    /// Remediation advice for constraints violated in more than 70% of
    /// recent evaluations.
    pub fn suggest_parameter_adjustments(&self) -> Vec<String> {
        let stats = self.statistics();
        self.constraints
            .iter()
            .filter(|c| {
                stats
                    .get(&c.name)
                    .is_some_and(|s| s.violation_frequency > SUGGESTION_FREQUENCY)
            })
            .map(|c| {
                match c.kind {
                    ConstraintKind::Capacity { .. } => {
                        "Capacity is insufficient. Add lines or extend working hours."
                    }
                    ConstraintKind::Demand { .. } => {
                        "Demand targets are too high. Lower the targets or improve line efficiency."
                    }
                    ConstraintKind::Budget { .. } => {
                        "The budget is too tight. Raise it or look for lower-cost operation."
                    }
                    ConstraintKind::Quality { .. } => {
                        "The quality standard is strict. Add high-quality lines or invest in quality improvement."
                    }
                    ConstraintKind::MaterialSupply => {
                        "Material supply is limiting. Secure more material or rebalance the product mix."
                    }
                }
                .to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GeneLayout;
    use crate::models::production::tests::sample_model;
    use crate::models::ProductionConstraints;
    use std::sync::Arc;

    fn handler(model: &ProductionModel) -> ConstraintHandler {
        ConstraintHandler::new(
            model,
            &ConstraintSettings::default(),
            ConstraintHandling::PenaltyFunction,
        )
    }

    fn zeros(model: &ProductionModel) -> Individual {
        Individual::zeros(Arc::new(GeneLayout::from_model(model)))
    }

    #[test]
    fn test_budget_only_when_set() {
        let mut model = sample_model();
        assert_eq!(handler(&model).constraints().len(), 4);
        model.set_constraints(ProductionConstraints::default().with_budget(1_000.0));
        let h = handler(&model);
        assert_eq!(h.constraints().len(), 5);
        assert!(h.constraint("budget").is_some());
    }

    #[test]
    fn test_check_all_on_zero_allocation() {
        let model = sample_model();
        let mut h = handler(&model);
        let (feasible, violations, penalty) = h.check_all_constraints(&model, &zeros(&model));
        assert!(!feasible);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint_name, "demand");
        assert!((penalty - violations[0].penalty_value).abs() < 1e-9);
        assert_eq!(h.history_len(), 1);
    }

    #[test]
    fn test_adaptive_escalation() {
        let model = sample_model();
        let mut h = handler(&model);
        let ind = zeros(&model);
        let base = h.inspect(&model, &ind)[0].penalty_value;

        for _ in 0..10 {
            let (_, _, p) = h.check_all_constraints(&model, &ind);
            assert!((p - base).abs() < 1e-9);
        }
        let (_, _, p) = h.check_all_constraints(&model, &ind);
        assert!((p - base * 1.1).abs() < 1e-6);

        for _ in 0..100 {
            h.check_all_constraints(&model, &ind);
        }
        assert!((h.penalty_multiplier("demand") - 5.0).abs() < 1e-12);
        assert_eq!(h.penalty_multiplier("capacity"), 1.0);
    }

    #[test]
    fn test_history_bounded() {
        let model = sample_model();
        let mut h = handler(&model);
        for _ in 0..150 {
            h.record(&[]);
        }
        assert_eq!(h.history_len(), 100);
    }

    #[test]
    fn test_statistics_and_suggestions() {
        let model = sample_model();
        let mut h = handler(&model);
        let ind = zeros(&model);
        for _ in 0..8 {
            h.check_all_constraints(&model, &ind);
        }
        for _ in 0..2 {
            h.record(&[]);
        }
        let stats = h.statistics();
        assert!((stats["demand"].violation_frequency - 0.8).abs() < 1e-12);
        assert_eq!(stats["capacity"].violation_frequency, 0.0);
        assert!(stats["demand"].max_violation > 0.0);

        let suggestions = h.suggest_parameter_adjustments();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains("Demand"));
    }

    #[test]
    fn test_add_remove_enable() {
        let model = sample_model();
        let mut h = handler(&model);
        assert!(h.set_enabled("demand", false));
        assert!(h.inspect(&model, &zeros(&model)).is_empty());
        assert!(!h.set_enabled("unknown", false));

        h.add_constraint(Constraint::budget(0.0).with_name("tight_budget"));
        assert!(h.remove_constraint("tight_budget"));
        assert!(!h.remove_constraint("tight_budget"));
    }

    #[test]
    fn test_repair_only_under_repair_policy() {
        let model = sample_model();
        let mut ind = zeros(&model);
        ind.set_amount("L1", "A", 40.0);

        let penalty = handler(&model);
        let violations = penalty.inspect(&model, &ind);
        assert!(!penalty.repair_violations(&model, &mut ind, &violations));
        assert_eq!(ind.amount("L1", "A"), 40.0);

        let repair = ConstraintHandler::new(
            &model,
            &ConstraintSettings::default(),
            ConstraintHandling::RepairAlgorithm,
        );
        assert!(repair.repair_violations(&model, &mut ind, &violations));
        assert!((ind.raw_line_utilization(&model, "L1") - 0.95).abs() < 1e-9);
    }
}
