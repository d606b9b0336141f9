//! Capacity, quality and cost bottleneck detection.
//!
//! | Kind | Trigger |
//! |------|---------|
//! | Capacity | highest line utilization > 90% |
//! | Quality | a producing line with defect rate > 5% (worst impact reported) |
//! | Cost | one line carries > 40% of total operating cost |

use serde::Serialize;

use super::utilization::line_operating_cost;
use crate::ga::Individual;
use crate::models::ProductionModel;

const CAPACITY_THRESHOLD: f64 = 0.9;
const DEFECT_THRESHOLD: f64 = 0.05;
const COST_SHARE_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BottleneckKind {
    Capacity,
    Quality,
    Cost,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub kind: BottleneckKind,
    pub line_id: String,
    pub line_name: String,
    /// Utilization, defect rate or cost share (fraction).
    pub severity: f64,
    pub description: String,
}

impl Bottleneck {
    /// Suggested remedy.
    pub fn recommendation(&self) -> String {
        let remedy = match self.kind {
            BottleneckKind::Capacity => "add equipment or extend working hours",
            BottleneckKind::Quality => "introduce a quality program or service the equipment",
            BottleneckKind::Cost => "improve operating efficiency or reduce energy use",
        };
        format!("{}: {remedy}", self.line_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BottleneckReport {
    pub bottlenecks: Vec<Bottleneck>,
    /// Mean severity (0 when there is none).
    pub severity_score: f64,
    pub recommendations: Vec<String>,
}

impl BottleneckReport {
    pub fn build(model: &ProductionModel, individual: &Individual) -> Self {
        let mut bottlenecks = Vec::new();

        let busiest = model
            .lines
            .values()
            .map(|l| (l, individual.line_utilization(model, &l.id)))
            .fold(None, |best: Option<(_, f64)>, (l, u)| match best {
                Some((_, bu)) if bu >= u => best,
                _ => Some((l, u)),
            });
        if let Some((line, utilization)) = busiest {
            if utilization > CAPACITY_THRESHOLD {
                bottlenecks.push(Bottleneck {
                    kind: BottleneckKind::Capacity,
                    line_id: line.id.clone(),
                    line_name: line.name.clone(),
                    severity: utilization,
                    description: format!(
                        "{} runs at {:.1}% utilization",
                        line.name,
                        utilization * 100.0
                    ),
                });
            }
        }

        let worst_quality = model
            .lines
            .values()
            .filter(|l| l.defect_rate > DEFECT_THRESHOLD)
            .map(|l| (l, individual.line_production(&l.id) * l.defect_rate))
            .filter(|(_, impact)| *impact > 0.0)
            .fold(None, |worst: Option<(_, f64)>, (l, impact)| match worst {
                Some((_, wi)) if wi >= impact => worst,
                _ => Some((l, impact)),
            });
        if let Some((line, _)) = worst_quality {
            bottlenecks.push(Bottleneck {
                kind: BottleneckKind::Quality,
                line_id: line.id.clone(),
                line_name: line.name.clone(),
                severity: line.defect_rate,
                description: format!(
                    "{} has a {:.1}% defect rate",
                    line.name,
                    line.defect_rate * 100.0
                ),
            });
        }

        let costs: Vec<_> = model
            .lines
            .values()
            .map(|l| (l, line_operating_cost(model, individual, l)))
            .collect();
        let total_cost: f64 = costs.iter().map(|(_, c)| c).sum();
        let costliest = costs.iter().fold(None, |best: Option<&(_, f64)>, entry| match best {
            Some(b) if b.1 >= entry.1 => best,
            _ => Some(entry),
        });
        if let Some((line, cost)) = costliest {
            let share = if total_cost > 0.0 { cost / total_cost } else { 0.0 };
            if share > COST_SHARE_THRESHOLD {
                bottlenecks.push(Bottleneck {
                    kind: BottleneckKind::Cost,
                    line_id: line.id.clone(),
                    line_name: line.name.clone(),
                    severity: share,
                    description: format!(
                        "{} accounts for {:.1}% of operating cost",
                        line.name,
                        share * 100.0
                    ),
                });
            }
        }

        let severity_score = if bottlenecks.is_empty() {
            0.0
        } else {
            bottlenecks.iter().map(|b| b.severity).sum::<f64>() / bottlenecks.len() as f64
        };
        let recommendations = bottlenecks.iter().map(Bottleneck::recommendation).collect();

        Self {
            bottlenecks,
            severity_score,
            recommendations,
        }
    }

    /// Number of detected bottlenecks.
    pub fn count(&self) -> usize {
        self.bottlenecks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::sample_allocation;
    use crate::ga::GeneLayout;
    use crate::models::production::tests::sample_model;
    use crate::models::ProductionLine;
    use std::sync::Arc;

    #[test]
    fn test_capacity_and_cost() {
        let model = sample_model();
        let ind = sample_allocation(&model);
        let report = BottleneckReport::build(&model, &ind);

        assert_eq!(report.count(), 2);
        assert_eq!(report.bottlenecks[0].kind, BottleneckKind::Capacity);
        assert_eq!(report.bottlenecks[0].line_id, "L2");
        assert_eq!(report.bottlenecks[1].kind, BottleneckKind::Cost);
        assert!((report.bottlenecks[1].severity - 7.0 / 13.0).abs() < 1e-9);
        assert!((report.severity_score - (1.0 + 7.0 / 13.0) / 2.0).abs() < 1e-9);
        assert!(report.recommendations[0].starts_with("Standard Line:"));
    }

    #[test]
    fn test_quality_bottleneck() {
        let mut model = sample_model();
        model.add_line(
            ProductionLine::new("L2", "Standard Line", 80.0, 35_000.0, 20.0, 0.08)
                .unwrap()
                .with_products(["B", "C"]),
        );
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        ind.set_amount("L2", "C", 10.0);
        let report = BottleneckReport::build(&model, &ind);
        let quality: Vec<_> = report
            .bottlenecks
            .iter()
            .filter(|b| b.kind == BottleneckKind::Quality)
            .collect();
        assert_eq!(quality.len(), 1);
        assert!((quality[0].severity - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_idle_has_none() {
        let model = sample_model();
        let ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        let report = BottleneckReport::build(&model, &ind);
        assert_eq!(report.count(), 0);
        assert_eq!(report.severity_score, 0.0);
    }
}
