//! Resource utilization scoring.
//!
//! | Status | Rule |
//! |--------|------|
//! | Efficient | utilization ≥ 80% and efficiency ≥ 150% |
//! | Good | utilization ≥ 60% and efficiency ≥ 100% |
//! | Average | utilization ≥ 40% or efficiency ≥ 50% |
//! | NeedsImprovement | otherwise |
//!
//! Efficiency is `(revenue − operating cost) / operating cost × 100`, with
//! operating cost taken at capped utilization.

use serde::Serialize;

use crate::ga::Individual;
use crate::models::{ProductionLine, ProductionModel};

/// Qualitative line rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStatus {
    Efficient,
    Good,
    Average,
    NeedsImprovement,
}

impl LineStatus {
    /// Rates a line from utilization and efficiency (both percent).
    pub fn rate(utilization_pct: f64, efficiency_score: f64) -> Self {
        if utilization_pct >= 80.0 && efficiency_score >= 150.0 {
            Self::Efficient
        } else if utilization_pct >= 60.0 && efficiency_score >= 100.0 {
            Self::Good
        } else if utilization_pct >= 40.0 || efficiency_score >= 50.0 {
            Self::Average
        } else {
            Self::NeedsImprovement
        }
    }
}

/// Scores of one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineEfficiency {
    pub line_id: String,
    pub line_name: String,
    /// Capped utilization in percent.
    pub utilization_pct: f64,
    pub efficiency_score: f64,
    /// Gross revenue per working hour (0 for an idle line).
    pub revenue_per_hour: f64,
    pub status: LineStatus,
}

/// Per-line utilization analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceUtilization {
    pub lines: Vec<LineEfficiency>,
    pub recommendations: Vec<String>,
}

/// Gross revenue of everything a line makes.
pub(crate) fn line_revenue(
    model: &ProductionModel,
    individual: &Individual,
    line: &ProductionLine,
) -> f64 {
    line.compatible_products
        .iter()
        .filter_map(|pid| model.product(pid))
        .map(|p| individual.amount(&line.id, &p.id) * p.selling_price)
        .sum()
}

/// Operating cost of a line at capped utilization.
pub(crate) fn line_operating_cost(
    model: &ProductionModel,
    individual: &Individual,
    line: &ProductionLine,
) -> f64 {
    individual.line_utilization(model, &line.id) * line.max_working_hours * line.operating_cost
}

impl ResourceUtilization {
    /// Scores every line of an allocation.
    pub fn build(model: &ProductionModel, individual: &Individual) -> Self {
        let mut lines = Vec::with_capacity(model.lines.len());
        let mut recommendations = Vec::new();

        for line in model.lines.values() {
            let utilization = individual.line_utilization(model, &line.id);
            let utilization_pct = utilization * 100.0;
            let revenue = line_revenue(model, individual, line);
            let cost = line_operating_cost(model, individual, line);
            let efficiency_score = if cost > 0.0 {
                (revenue - cost) / cost * 100.0
            } else {
                0.0
            };
            let hours = utilization * line.max_working_hours;
            let revenue_per_hour = if hours > 0.0 { revenue / hours } else { 0.0 };

            if utilization_pct < 50.0 {
                recommendations.push(format!(
                    "{}: low utilization ({utilization_pct:.1}%), output can be increased",
                    line.name
                ));
            } else if utilization_pct > 95.0 {
                recommendations.push(format!(
                    "{}: high utilization ({utilization_pct:.1}%), review capacity expansion",
                    line.name
                ));
            }
            if efficiency_score < 100.0 {
                recommendations.push(format!(
                    "{}: low efficiency ({efficiency_score:.1}%), focus on higher-margin products",
                    line.name
                ));
            }

            lines.push(LineEfficiency {
                line_id: line.id.clone(),
                line_name: line.name.clone(),
                utilization_pct,
                efficiency_score,
                revenue_per_hour,
                status: LineStatus::rate(utilization_pct, efficiency_score),
            });
        }

        Self {
            lines,
            recommendations,
        }
    }

    /// Scores of a line.
    pub fn line(&self, line_id: &str) -> Option<&LineEfficiency> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }
}
