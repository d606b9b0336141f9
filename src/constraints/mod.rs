//! Constraint handling.
//!
//! Constraints turn business limits (line capacity, demand, budget, quality,
//! material supply) into violation records, penalties and repairs.
//!
//! - [`Constraint`]: one check with its penalty weight and repair heuristic.
//! - [`ConstraintHandler`]: the set of constraints for a run, with adaptive
//!   penalty escalation and a rolling violation history.
//! - [`ConstraintRelaxation`]: scales penalty weights up or down from the
//!   observed violation frequency.
//!
//! Violations are data, not errors.
//!
//! # Reference
//! Coello Coello (2002), "Theoretical and numerical constraint-handling
//! techniques used with evolutionary algorithms: a survey"

mod handler;
mod kinds;
mod relaxation;

pub use handler::{ConstraintHandler, ConstraintStatistics};
pub use kinds::{required_production, Constraint, ConstraintKind};
pub use relaxation::{Adjustment, ConstraintRelaxation};

use serde::{Deserialize, Serialize};

/// How strictly a constraint binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    /// Must never be violated.
    Hard,
    /// Violation costs a penalty.
    Soft,
    /// May be adjusted at run time.
    Flexible,
}

/// Repair priority. `Critical` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintPriority {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

/// Result of one constraint check against one individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub constraint_name: String,
    pub constraint_type: ConstraintType,
    pub priority: ConstraintPriority,
    /// Raw magnitude (units, currency or rate, depending on the constraint).
    pub violation_amount: f64,
    pub violation_percentage: f64,
    /// Base penalty, before adaptive escalation.
    pub penalty_value: f64,
    pub description: String,
    pub suggested_fix: String,
}

/// Policy for combining objective fitness with constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintHandling {
    /// fitness = objective − penalty.
    #[default]
    PenaltyFunction,
    /// Repair infeasible individuals, then apply a light residual penalty.
    RepairAlgorithm,
    /// Infeasible individuals get a large negative sentinel.
    DeathPenalty,
}

/// Tunable parameters of the default constraint set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSettings {
    /// Capacity headroom kept free on every line.
    pub capacity_safety_margin: f64,
    /// Fraction of target production that must be met.
    pub demand_min_satisfaction: f64,
    /// Ceiling on the production-weighted defect rate.
    pub quality_max_defect_rate: f64,
}

impl Default for ConstraintSettings {
    fn default() -> Self {
        Self {
            capacity_safety_margin: 0.05,
            demand_min_satisfaction: 0.8,
            quality_max_defect_rate: 0.05,
        }
    }
}
