//! Executive summary and narrative recommendations.

use serde::Serialize;

use super::{ProfitabilityAnalysis, ResourceUtilization};
use crate::ga::Individual;
use crate::models::ProductionModel;

/// Share of total target below which overall output is flagged.
const LOW_OUTPUT_SHARE: f64 = 0.8;
/// Violations quoted in the recommendations.
const QUOTED_VIOLATIONS: usize = 3;
/// Utilization (percent) under which a line is a quick win.
const QUICK_WIN_UTILIZATION: f64 = 50.0;

/// Headline figures for a solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    /// Profit over revenue in percent (0 without revenue).
    pub profit_margin_pct: f64,
    pub total_production: f64,
    pub feasible: bool,
    pub top_priorities: Vec<String>,
    pub quick_wins: Vec<String>,
}

impl ExecutiveSummary {
    pub fn build(
        model: &ProductionModel,
        individual: &Individual,
        utilization: &ResourceUtilization,
        profitability: &ProfitabilityAnalysis,
    ) -> Self {
        let total_revenue = individual.total_revenue(model);
        let total_cost = individual.total_cost(model);
        let total_profit = total_revenue - total_cost;

        let mut top_priorities = Vec::new();
        if !individual.is_feasible() {
            top_priorities.push("Resolve constraint violations".to_string());
        }
        top_priorities.extend(profitability.insights.iter().take(2).cloned());

        let quick_wins = utilization
            .lines
            .iter()
            .filter(|l| l.utilization_pct < QUICK_WIN_UTILIZATION)
            .map(|l| format!("Raise utilization of {}", l.line_name))
            .collect();

        Self {
            total_revenue,
            total_cost,
            total_profit,
            profit_margin_pct: if total_revenue > 0.0 {
                total_profit / total_revenue * 100.0
            } else {
                0.0
            },
            total_production: individual.total_production_amount(),
            feasible: individual.is_feasible(),
            top_priorities,
            quick_wins,
        }
    }
}

/// Ordered advice: violations first, then output shortfall, then line and
/// product advice.
pub fn recommendations(
    model: &ProductionModel,
    individual: &Individual,
    utilization: &ResourceUtilization,
    profitability: &ProfitabilityAnalysis,
) -> Vec<String> {
    let mut out = Vec::new();

    if !individual.is_feasible() {
        out.push("Resolve constraint violations first".to_string());
        out.extend(
            individual
                .violations()
                .iter()
                .take(QUOTED_VIOLATIONS)
                .map(|v| format!("  - {v}")),
        );
    }

    if individual.total_production_amount() < model.total_target_production() * LOW_OUTPUT_SHARE {
        out.push(
            "Total production is below 80% of target; review capacity expansion".to_string(),
        );
    }

    out.extend(utilization.recommendations.iter().cloned());
    out.extend(profitability.insights.iter().cloned());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::sample_allocation;
    use crate::models::production::tests::sample_model;

    #[test]
    fn test_summary_figures() {
        let model = sample_model();
        let ind = sample_allocation(&model);
        let util = ResourceUtilization::build(&model, &ind);
        let profit = ProfitabilityAnalysis::build(&model, &ind);
        let summary = ExecutiveSummary::build(&model, &ind, &util, &profit);

        assert!((summary.total_revenue - 134_000.0).abs() < 1e-9);
        assert!((summary.total_profit - (summary.total_revenue - summary.total_cost)).abs() < 1e-9);
        assert!((summary.total_production - 92.0).abs() < 1e-9);
        assert!(summary.profit_margin_pct < 0.0);
        assert_eq!(summary.top_priorities[0], "Resolve constraint violations");
        assert_eq!(summary.top_priorities.len(), 3);
        assert!(summary.quick_wins.is_empty());
    }

    #[test]
    fn test_recommendation_order() {
        let model = sample_model();
        let mut ind = sample_allocation(&model);
        ind.violations = vec!["v1".into(), "v2".into(), "v3".into(), "v4".into()];
        let util = ResourceUtilization::build(&model, &ind);
        let profit = ProfitabilityAnalysis::build(&model, &ind);
        let recs = recommendations(&model, &ind, &util, &profit);

        assert_eq!(recs[0], "Resolve constraint violations first");
        assert_eq!(recs[1], "  - v1");
        assert_eq!(recs[3], "  - v3");
        assert!(recs[4].contains("below 80% of target"));
        assert_eq!(recs.len(), 5 + util.recommendations.len() + profit.insights.len());
    }
}
