//! Reporting payload derived from a finished run.
//!
//! Everything here is computed from the best allocation and the fitness
//! history alone; nothing feeds back into the optimizer.
//!
//! | Part | Contents |
//! |------|----------|
//! | [`ProductionPlan`] | per-line and per-product amounts, hours, revenue |
//! | [`ProductionSchedule`] | daily run order by unit profit, idle time |
//! | [`ResourceUtilization`] | utilization, efficiency score, status |
//! | [`ProfitabilityAnalysis`] | product ranking, line profit, insights |
//! | [`BottleneckReport`] | capacity, quality and cost hot spots |
//! | [`ExecutiveSummary`] | headline figures, priorities, quick wins |
//! | [`ConvergenceStats`] | improvement and stability of the run |

mod bottleneck;
mod convergence;
mod plan;
mod profitability;
mod schedule;
mod summary;
mod utilization;

pub use bottleneck::{Bottleneck, BottleneckKind, BottleneckReport};
pub use convergence::ConvergenceStats;
pub use plan::{LinePlan, LineProductPlan, ProductLineShare, ProductPlan, ProductionPlan};
pub use profitability::{LineProfitability, ProductProfitability, ProfitabilityAnalysis};
pub use schedule::{LineSchedule, ProductionSchedule, ScheduleBottleneck, ScheduledRun};
pub use summary::{recommendations, ExecutiveSummary};
pub use utilization::{LineEfficiency, LineStatus, ResourceUtilization};

use serde::Serialize;

use crate::ga::Individual;
use crate::models::ProductionModel;

/// Full analysis of a solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedAnalysis {
    pub production_plan: ProductionPlan,
    pub schedule: ProductionSchedule,
    pub resource_utilization: ResourceUtilization,
    pub profitability: ProfitabilityAnalysis,
    pub bottlenecks: BottleneckReport,
    pub recommendations: Vec<String>,
    pub executive_summary: ExecutiveSummary,
    pub convergence: ConvergenceStats,
}

impl DetailedAnalysis {
    /// Analyzes `best` against `model`, with `history` the best fitness per
    /// generation.
    pub fn build(model: &ProductionModel, best: &Individual, history: &[f64]) -> Self {
        let resource_utilization = ResourceUtilization::build(model, best);
        let profitability = ProfitabilityAnalysis::build(model, best);
        Self {
            production_plan: ProductionPlan::build(model, best),
            schedule: ProductionSchedule::build(model, best),
            bottlenecks: BottleneckReport::build(model, best),
            recommendations: recommendations(model, best, &resource_utilization, &profitability),
            executive_summary: ExecutiveSummary::build(
                model,
                best,
                &resource_utilization,
                &profitability,
            ),
            convergence: ConvergenceStats::from_history(history),
            resource_utilization,
            profitability,
        }
    }
}
