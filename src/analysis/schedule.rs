//! Daily run sequence per line.
//!
//! Each line runs its products in descending unit-profit order. A product
//! whose run would overrun the line's working-hour budget is left out of
//! the sequence and the next one is tried.

use serde::Serialize;

use crate::ga::Individual;
use crate::models::ProductionModel;

/// Scheduled utilization at or above which a line is flagged.
const BOTTLENECK_PCT: f64 = 90.0;

/// One product run within a line's day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledRun {
    pub product_id: String,
    pub product_name: String,
    pub start_hour: f64,
    pub end_hour: f64,
    pub amount: f64,
    pub unit_profit: f64,
}

/// A line's day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSchedule {
    pub line_id: String,
    pub line_name: String,
    pub max_hours: f64,
    pub sequence: Vec<ScheduledRun>,
    pub scheduled_hours: f64,
    pub idle_hours: f64,
}

/// A line whose scheduled hours reach 90% of its budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleBottleneck {
    pub line_id: String,
    pub line_name: String,
    pub utilization_pct: f64,
}

/// Sequenced schedule for every line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionSchedule {
    pub lines: Vec<LineSchedule>,
    pub bottlenecks: Vec<ScheduleBottleneck>,
}

impl ProductionSchedule {
    /// Sequences an allocation.
    pub fn build(model: &ProductionModel, individual: &Individual) -> Self {
        let mut lines = Vec::with_capacity(model.lines.len());
        let mut bottlenecks = Vec::new();

        for line in model.lines.values() {
            let mut runs: Vec<_> = line
                .compatible_products
                .iter()
                .filter_map(|pid| model.product(pid))
                .map(|p| (p, individual.amount(&line.id, &p.id)))
                .filter(|(_, amount)| *amount > 0.0)
                .collect();
            // stable: equal profits keep ID order
            runs.sort_by(|a, b| b.0.unit_profit().total_cmp(&a.0.unit_profit()));

            let mut clock = 0.0;
            let mut sequence = Vec::with_capacity(runs.len());
            for (product, amount) in runs {
                let hours = amount * product.production_time(&line.id) / 60.0;
                if clock + hours > line.max_working_hours {
                    continue;
                }
                sequence.push(ScheduledRun {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    start_hour: clock,
                    end_hour: clock + hours,
                    amount,
                    unit_profit: product.unit_profit(),
                });
                clock += hours;
            }

            if line.max_working_hours > 0.0 {
                let pct = clock / line.max_working_hours * 100.0;
                if pct >= BOTTLENECK_PCT {
                    bottlenecks.push(ScheduleBottleneck {
                        line_id: line.id.clone(),
                        line_name: line.name.clone(),
                        utilization_pct: pct,
                    });
                }
            }

            lines.push(LineSchedule {
                line_id: line.id.clone(),
                line_name: line.name.clone(),
                max_hours: line.max_working_hours,
                sequence,
                scheduled_hours: clock,
                idle_hours: line.max_working_hours - clock,
            });
        }

        Self { lines, bottlenecks }
    }

    /// Schedule of a line.
    pub fn line(&self, line_id: &str) -> Option<&LineSchedule> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::sample_allocation;
    use crate::models::production::tests::sample_model;

    #[test]
    fn test_sequence_by_unit_profit() {
        let model = sample_model();
        let ind = sample_allocation(&model);
        let schedule = ProductionSchedule::build(&model, &ind);

        let l1 = schedule.line("L1").unwrap();
        let order: Vec<&str> = l1.sequence.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
        assert!((l1.sequence[0].end_hour - 8.0).abs() < 1e-9);
        assert!((l1.sequence[1].start_hour - 8.0).abs() < 1e-9);
        assert!((l1.idle_hours - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_line_is_bottleneck() {
        let model = sample_model();
        let ind = sample_allocation(&model);
        let schedule = ProductionSchedule::build(&model, &ind);
        assert_eq!(schedule.bottlenecks.len(), 1);
        assert_eq!(schedule.bottlenecks[0].line_id, "L2");
        assert!((schedule.bottlenecks[0].utilization_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_overrunning_run_is_skipped() {
        let model = sample_model();
        let mut ind = sample_allocation(&model);
        // A needs 20h on a 16h line; B still fits
        ind.set_amount("L1", "A", 40.0);
        let schedule = ProductionSchedule::build(&model, &ind);
        let l1 = schedule.line("L1").unwrap();
        assert_eq!(l1.sequence.len(), 1);
        assert_eq!(l1.sequence[0].product_id, "B");
        assert!((l1.scheduled_hours - 4.0).abs() < 1e-9);
    }
}
