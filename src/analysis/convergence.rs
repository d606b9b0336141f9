//! Convergence statistics over a best-fitness history.

use serde::Serialize;

/// How the best fitness evolved during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConvergenceStats {
    pub initial_fitness: f64,
    pub final_fitness: f64,
    /// `(final − initial) / |initial| × 100`; 0 when undefined.
    pub improvement_rate: f64,
    /// `100 − CV × 100` over the last tenth of the history, floored at 0.
    pub stability_score: f64,
    /// Position (percent of the history) where half of the total
    /// improvement was reached.
    pub convergence_rate: f64,
}

impl ConvergenceStats {
    /// Fewer than 10 entries yield zero stability and convergence rate.
    pub fn from_history(history: &[f64]) -> Self {
        let (Some(&first), Some(&last)) = (history.first(), history.last()) else {
            return Self::default();
        };

        let improvement_rate = if history.len() < 2 || first == 0.0 {
            0.0
        } else {
            (last - first) / first.abs() * 100.0
        };

        let mut stats = Self {
            initial_fitness: first,
            final_fitness: last,
            improvement_rate,
            ..Self::default()
        };
        if history.len() < 10 {
            return stats;
        }

        let tail = &history[history.len() - history.len() / 10..];
        let mean = tail.iter().sum::<f64>() / tail.len() as f64;
        let var = tail.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / tail.len() as f64;
        stats.stability_score = if mean != 0.0 {
            (100.0 - var.sqrt() / mean.abs() * 100.0).max(0.0)
        } else {
            0.0
        };

        let halfway = first + (last - first) * 0.5;
        let reached = history.iter().position(|&f| f >= halfway).unwrap_or(0);
        stats.convergence_rate = reached as f64 / history.len() as f64 * 100.0;
        stats
    }
}
