//! Optimization goal and multi-objective weights.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Business objective the optimizer pursues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    /// Minimize total daily cost.
    MinimizeCost,
    /// Maximize total daily profit.
    #[default]
    MaximizeProfit,
    /// Maximize defect-adjusted production volume.
    MaximizeProduction,
    /// Maximize output quality.
    OptimizeQuality,
    /// Weighted blend of cost, profit, production and quality.
    MultiObjective,
}

impl OptimizationGoal {
    /// Stable snake_case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinimizeCost => "minimize_cost",
            Self::MaximizeProfit => "maximize_profit",
            Self::MaximizeProduction => "maximize_production",
            Self::OptimizeQuality => "optimize_quality",
            Self::MultiObjective => "multi_objective",
        }
    }
}

impl fmt::Display for OptimizationGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weights of the multi-objective blend.
///
/// Only used when the goal is [`OptimizationGoal::MultiObjective`].
/// Weights need not sum to 1; [`ObjectiveWeights::normalized`] rescales them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub cost: f64,
    pub profit: f64,
    pub production: f64,
    pub quality: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            cost: 0.25,
            profit: 0.25,
            production: 0.25,
            quality: 0.25,
        }
    }
}

impl ObjectiveWeights {
    /// Creates a weight set.
    pub fn new(cost: f64, profit: f64, production: f64, quality: f64) -> Self {
        Self {
            cost,
            profit,
            production,
            quality,
        }
    }

    /// Sum of all four weights.
    pub fn sum(&self) -> f64 {
        self.cost + self.profit + self.production + self.quality
    }

    /// Returns weights rescaled to sum to 1.
    ///
    /// Negative and non-finite weights count as 0. If nothing positive
    /// remains, the equal split of [`ObjectiveWeights::default`] is used.
    pub fn normalized(&self) -> Self {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let w = Self::new(
            clean(self.cost),
            clean(self.profit),
            clean(self.production),
            clean(self.quality),
        );
        let total = w.sum();
        if total <= 0.0 || !total.is_finite() {
            return Self::default();
        }
        Self::new(
            w.cost / total,
            w.profit / total,
            w.production / total,
            w.quality / total,
        )
    }
}
