//! Outcome of a GA run.

use std::time::Duration;

use serde::Serialize;

use super::Individual;
use crate::analysis::DetailedAnalysis;

/// Result of [`GeneticAlgorithm::run`](super::GeneticAlgorithm::run).
///
/// A failed run still carries the elapsed time and whatever fitness history
/// was collected, but never a best solution.
#[derive(Debug, Clone, Serialize)]
pub struct GaResult {
    /// Best individual found (evaluated; `None` on failure).
    pub best_solution: Option<Individual>,
    /// Fitness of `best_solution` (−∞ on failure).
    pub best_fitness: f64,
    /// Best-so-far fitness: initial population, then one entry per
    /// generation.
    pub fitness_history: Vec<f64>,
    /// Generations completed.
    pub generation_count: usize,
    /// 1-based generation of the last improvement (0 = initial population).
    pub convergence_generation: usize,
    /// Wall-clock time.
    pub execution_time: Duration,
    pub success: bool,
    pub error_message: Option<String>,
    /// Reporting payload for `best_solution`.
    pub detailed_analysis: Option<DetailedAnalysis>,
}

impl GaResult {
    /// Non-success result.
    pub fn failure(message: impl Into<String>, history: Vec<f64>, elapsed: Duration) -> Self {
        Self {
            best_solution: None,
            best_fitness: f64::NEG_INFINITY,
            fitness_history: history,
            generation_count: 0,
            convergence_generation: 0,
            execution_time: elapsed,
            success: false,
            error_message: Some(message.into()),
            detailed_analysis: None,
        }
    }

    /// Whether the best solution satisfies every constraint.
    pub fn is_feasible(&self) -> bool {
        self.best_solution.as_ref().is_some_and(Individual::is_feasible)
    }
}
