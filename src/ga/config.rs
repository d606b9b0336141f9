//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use std::time::Duration;

use crate::constraints::{ConstraintHandling, ConstraintSettings};
use crate::error::GaError;
use crate::objective::CostRates;

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Sample `k` individuals, keep the fittest.
    Tournament(usize),
    /// Probability proportional to fitness shifted so the minimum maps to 1.
    RouletteWheel,
    /// Probability proportional to rank (least fit = rank 1).
    RankBased,
}

impl Default for Selection {
    fn default() -> Self {
        Self::Tournament(3)
    }
}

/// Configuration for the production-allocation GA.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | population size | 100 |
/// | generations | 500 |
/// | crossover rate | 0.8 |
/// | mutation rate | 0.05 (per gene) |
/// | elite ratio | 0.1 |
/// | selection | tournament of 3 |
/// | constraint handling | penalty function |
/// | stagnation limit | 100 |
///
/// # Builder Pattern
///
/// ```
/// use u_production::ga::{GaConfig, Selection};
/// use u_production::constraints::ConstraintHandling;
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_selection(Selection::RankBased)
///     .with_constraint_handling(ConstraintHandling::RepairAlgorithm)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Maximum number of generations.
    pub max_generations: usize,

    /// Probability of blending a pair of parents (0.0–1.0).
    ///
    /// When crossover is not applied, the children are copies of the parents.
    pub crossover_rate: f64,

    /// Per-gene probability of Gaussian mutation (0.0–1.0).
    pub mutation_rate: f64,

    /// Fraction of the population carried over unchanged (0.0–1.0).
    pub elite_ratio: f64,

    /// Selection strategy for the mating pool.
    pub selection: Selection,

    /// How constraint violations affect fitness.
    pub constraint_handling: ConstraintHandling,

    /// Parameters of the default constraint set.
    pub constraint_settings: ConstraintSettings,

    /// Fixed rates used by the cost and profit objectives.
    pub cost_rates: CostRates,

    /// Generations without improvement before stopping (0 disables).
    pub stagnation_limit: usize,

    /// Wall-clock budget, checked between generations.
    pub time_limit: Option<Duration>,

    /// Every this many generations, relax or tighten constraint penalty
    /// weights from their violation frequency. `None` disables.
    pub auto_adjust_interval: Option<usize>,

    /// Whether to assess offspring in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            crossover_rate: 0.8,
            mutation_rate: 0.05,
            elite_ratio: 0.1,
            selection: Selection::default(),
            constraint_handling: ConstraintHandling::default(),
            constraint_settings: ConstraintSettings::default(),
            cost_rates: CostRates::default(),
            stagnation_limit: 100,
            time_limit: None,
            auto_adjust_interval: None,
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the constraint-handling policy.
    pub fn with_constraint_handling(mut self, handling: ConstraintHandling) -> Self {
        self.constraint_handling = handling;
        self
    }

    /// Sets the constraint parameters.
    pub fn with_constraint_settings(mut self, settings: ConstraintSettings) -> Self {
        self.constraint_settings = settings;
        self
    }

    /// Sets the cost rates.
    pub fn with_cost_rates(mut self, rates: CostRates) -> Self {
        self.cost_rates = rates;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets a wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Enables periodic penalty-weight adjustment.
    pub fn with_auto_adjust_interval(mut self, generations: usize) -> Self {
        self.auto_adjust_interval = Some(generations);
        self
    }

    /// Enables or disables parallel assessment.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites carried per generation.
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_ratio) as usize
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`GaError::InvalidConfig`] describing the first invalid parameter.
    pub fn validate(&self) -> Result<(), GaError> {
        let invalid =
            |msg: &str| -> Result<(), GaError> { Err(GaError::InvalidConfig(msg.to_string())) };
        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if self.max_generations == 0 {
            return invalid("max_generations must be at least 1");
        }
        if let Selection::Tournament(0) = self.selection {
            return invalid("tournament size must be at least 1");
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("elite_ratio", self.elite_ratio),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(GaError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {rate}"
                )));
            }
        }
        if self.elite_count() >= self.population_size {
            return invalid("elite_ratio too high: elites fill entire population");
        }
        if self.auto_adjust_interval == Some(0) {
            return invalid("auto_adjust_interval must be at least 1");
        }
        let settings = &self.constraint_settings;
        if !(0.0..1.0).contains(&settings.capacity_safety_margin) {
            return Err(GaError::InvalidConfig(format!(
                "capacity_safety_margin must lie in [0, 1), got {}",
                settings.capacity_safety_margin
            )));
        }
        for (name, value) in [
            ("demand_min_satisfaction", settings.demand_min_satisfaction),
            ("quality_max_defect_rate", settings.quality_max_defect_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GaError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 500);
        assert_eq!(config.selection, Selection::Tournament(3));
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert!((config.elite_ratio - 0.1).abs() < 1e-10);
        assert_eq!(config.stagnation_limit, 100);
        assert_eq!(config.constraint_handling, ConstraintHandling::PenaltyFunction);
        assert!(!config.parallel);
        assert!(config.seed.is_none());
        assert_eq!(config.elite_count(), 10);
    }

    #[test]
    fn test_builder_clamps_rates() {
        let config = GaConfig::default()
            .with_crossover_rate(1.5)
            .with_mutation_rate(-0.1)
            .with_elite_ratio(0.2);
        assert_eq!(config.crossover_rate, 1.0);
        assert_eq!(config.mutation_rate, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        assert!(GaConfig::default().with_population_size(1).validate().is_err());
        assert!(GaConfig::default().with_max_generations(0).validate().is_err());
        assert!(GaConfig::default()
            .with_selection(Selection::Tournament(0))
            .validate()
            .is_err());
        assert!(GaConfig::default().with_elite_ratio(1.0).validate().is_err());
        let mut config = GaConfig::default();
        config.mutation_rate = 2.0;
        assert!(matches!(config.validate(), Err(GaError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_constraint_settings() {
        let with = |f: fn(&mut ConstraintSettings)| {
            let mut settings = ConstraintSettings::default();
            f(&mut settings);
            GaConfig::default().with_constraint_settings(settings).validate()
        };
        assert!(with(|_| {}).is_ok());
        assert!(with(|s| s.capacity_safety_margin = 0.0).is_ok());

        let err = with(|s| s.capacity_safety_margin = 1.0).unwrap_err();
        assert!(err.to_string().contains("capacity_safety_margin"));
        assert!(with(|s| s.capacity_safety_margin = -0.1).is_err());
        assert!(with(|s| s.demand_min_satisfaction = 1.2).is_err());
        assert!(with(|s| s.demand_min_satisfaction = -0.5).is_err());
        let err = with(|s| s.quality_max_defect_rate = f64::NAN).unwrap_err();
        assert!(matches!(err, GaError::InvalidConfig(ref m) if m.contains("quality_max_defect_rate")));
    }
}
