//! Fitness evaluation.
//!
//! Combines an [`ObjectiveFunction`] with a [`ConstraintHandler`] according
//! to the handler's [`ConstraintHandling`] policy:
//!
//! | Policy | Fitness |
//! |--------|---------|
//! | penalty function | objective − penalty |
//! | death penalty | objective if feasible, else −1e6 |
//! | repair algorithm | repair, re-evaluate, objective − 0.1 × residual penalty |
//!
//! Evaluation has two phases. [`FitnessEvaluator::assess`] computes the
//! objective and inspects (and, under the repair policy, repairs) one
//! individual without touching evaluator state, so a population can be
//! assessed in parallel. [`FitnessEvaluator::settle`] then escalates
//! penalties, records history and writes the result onto the individual;
//! it runs sequentially in population order.

use rayon::prelude::*;

use crate::constraints::{
    ConstraintHandler, ConstraintHandling, ConstraintSettings, ConstraintViolation,
};
use crate::error::GaError;
use crate::ga::Individual;
use crate::models::ProductionModel;
use crate::objective::{CostRates, Objective, ObjectiveComponents, ObjectiveFunction};

/// Fitness given to infeasible individuals under the death-penalty policy.
pub const DEATH_PENALTY: f64 = -1e6;

/// Share of the residual penalty kept after repair.
pub const REPAIR_RESIDUAL_WEIGHT: f64 = 0.1;

/// Combines objective fitness and constraint penalty under a policy.
///
/// For a fixed objective fitness the result never increases as `penalty`
/// grows.
pub fn apply_policy(
    handling: ConstraintHandling,
    objective_fitness: f64,
    feasible: bool,
    penalty: f64,
) -> f64 {
    match handling {
        ConstraintHandling::PenaltyFunction => objective_fitness - penalty,
        ConstraintHandling::DeathPenalty => {
            if feasible {
                objective_fitness
            } else {
                DEATH_PENALTY
            }
        }
        ConstraintHandling::RepairAlgorithm => {
            objective_fitness - REPAIR_RESIDUAL_WEIGHT * penalty
        }
    }
}

/// Outcome of the pure evaluation phase.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub objective_fitness: f64,
    pub components: ObjectiveComponents,
    pub violations: Vec<ConstraintViolation>,
    pub repaired: bool,
}

/// Objective plus constraint handler for one run.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    objective: ObjectiveFunction,
    handler: ConstraintHandler,
}

impl FitnessEvaluator {
    pub fn new(objective: ObjectiveFunction, handler: ConstraintHandler) -> Self {
        Self { objective, handler }
    }

    /// Builds the objective for the model's goal and the default
    /// constraint set.
    pub fn for_model(
        model: &ProductionModel,
        settings: &ConstraintSettings,
        handling: ConstraintHandling,
        rates: CostRates,
    ) -> Self {
        Self::new(
            ObjectiveFunction::for_model(model, rates),
            ConstraintHandler::new(model, settings, handling),
        )
    }

    pub fn objective(&self) -> &ObjectiveFunction {
        &self.objective
    }

    pub fn handler(&self) -> &ConstraintHandler {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut ConstraintHandler {
        &mut self.handler
    }

    pub fn handling(&self) -> ConstraintHandling {
        self.handler.handling()
    }

    /// Pure phase: objective and violations, repairing first under the
    /// repair policy.
    pub fn assess(&self, model: &ProductionModel, individual: &mut Individual) -> Assessment {
        let (mut fitness, mut components) = self.objective.evaluate(model, individual);
        let mut violations = self.handler.inspect(model, individual);
        let repaired = self
            .handler
            .repair_violations(model, individual, &violations);
        if repaired {
            violations = self.handler.inspect(model, individual);
            (fitness, components) = self.objective.evaluate(model, individual);
        }
        Assessment {
            objective_fitness: fitness,
            components,
            violations,
            repaired,
        }
    }

    /// Bookkeeping phase: escalates penalties, records history, applies the
    /// policy and writes the cache onto `individual`.
    ///
    /// # Errors
    /// [`GaError::Evaluation`] when the resulting fitness is not finite.
    pub fn settle(
        &mut self,
        individual: &mut Individual,
        assessment: Assessment,
    ) -> Result<f64, GaError> {
        let penalty = self.handler.record(&assessment.violations);
        let feasible = assessment.violations.is_empty();
        let fitness = apply_policy(
            self.handler.handling(),
            assessment.objective_fitness,
            feasible,
            penalty,
        );
        if !fitness.is_finite() {
            return Err(GaError::Evaluation(format!(
                "non-finite fitness {fitness} (objective {}, penalty {penalty})",
                assessment.objective_fitness
            )));
        }

        individual.fitness = fitness;
        individual.components = assessment.components;
        individual.feasible = feasible;
        individual.violations = assessment
            .violations
            .into_iter()
            .map(|v| v.description)
            .collect();
        Ok(fitness)
    }

    /// Evaluates one individual.
    pub fn evaluate(
        &mut self,
        model: &ProductionModel,
        individual: &mut Individual,
    ) -> Result<f64, GaError> {
        let assessment = self.assess(model, individual);
        self.settle(individual, assessment)
    }

    /// Evaluates a population; assessment runs on the rayon pool when
    /// `parallel` is set. Results are identical either way.
    pub fn evaluate_population(
        &mut self,
        model: &ProductionModel,
        population: &mut [Individual],
        parallel: bool,
    ) -> Result<(), GaError> {
        let assessments: Vec<Assessment> = if parallel {
            population
                .par_iter_mut()
                .map(|ind| self.assess(model, ind))
                .collect()
        } else {
            population
                .iter_mut()
                .map(|ind| self.assess(model, ind))
                .collect()
        };
        for (ind, assessment) in population.iter_mut().zip(assessments) {
            self.settle(ind, assessment)?;
        }
        Ok(())
    }

    /// Refreshes objective normalization from a population (multi-objective
    /// mode only).
    pub fn update_normalization(&mut self, model: &ProductionModel, population: &[Individual]) {
        self.objective.update_normalization(model, population);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GeneLayout;
    use crate::models::production::tests::sample_model;
    use crate::models::ProductionConstraints;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn evaluator(model: &ProductionModel, handling: ConstraintHandling) -> FitnessEvaluator {
        FitnessEvaluator::for_model(
            model,
            &ConstraintSettings::default(),
            handling,
            CostRates::default(),
        )
    }

    #[test]
    fn test_penalty_monotone() {
        for handling in [
            ConstraintHandling::PenaltyFunction,
            ConstraintHandling::RepairAlgorithm,
            ConstraintHandling::DeathPenalty,
        ] {
            let mut prev = f64::INFINITY;
            for penalty in [0.0, 1.0, 10.0, 1e3, 1e9] {
                let f = apply_policy(handling, 100.0, penalty == 0.0, penalty);
                assert!(f <= prev, "{handling:?} penalty {penalty}");
                prev = f;
            }
        }
    }

    #[test]
    fn test_penalty_function_subtracts() {
        let model = sample_model();
        let mut ev = evaluator(&model, ConstraintHandling::PenaltyFunction);
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));

        let (objective, _) = ev.objective().evaluate(&model, &ind);
        let penalty = ev.handler().inspect(&model, &ind)[0].penalty_value;
        let fitness = ev.evaluate(&model, &mut ind).unwrap();

        assert!((fitness - (objective - penalty)).abs() < 1e-6);
        assert!(!ind.is_feasible());
        assert_eq!(ind.violations().len(), 1);
        assert_eq!(ind.fitness, fitness);
    }

    #[test]
    fn test_death_penalty_sentinel() {
        let mut model = sample_model();
        model.set_constraints(ProductionConstraints::default().with_budget(0.0));
        let mut ev = evaluator(&model, ConstraintHandling::DeathPenalty);
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        ind.set_amount("L1", "A", 1.0);
        assert_eq!(ev.evaluate(&model, &mut ind).unwrap(), DEATH_PENALTY);
    }

    #[test]
    fn test_repair_policy_repairs() {
        let model = sample_model();
        let mut ev = evaluator(&model, ConstraintHandling::RepairAlgorithm);
        let mut ind = Individual::zeros(Arc::new(GeneLayout::from_model(&model)));
        ind.set_amount("L1", "A", 40.0);
        ev.evaluate(&model, &mut ind).unwrap();
        assert!(ind.raw_line_utilization(&model, "L1") <= 0.95 + 1e-9);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = sample_model();
        let layout = Arc::new(GeneLayout::from_model(&model));
        let mut rng = SmallRng::seed_from_u64(42);
        let population: Vec<Individual> = (0..32)
            .map(|_| Individual::random(layout.clone(), &mut rng))
            .collect();

        let mut seq = population.clone();
        let mut par = population;
        let mut ev_seq = evaluator(&model, ConstraintHandling::PenaltyFunction);
        let mut ev_par = evaluator(&model, ConstraintHandling::PenaltyFunction);
        ev_seq.evaluate_population(&model, &mut seq, false).unwrap();
        ev_par.evaluate_population(&model, &mut par, true).unwrap();

        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.fitness, b.fitness);
        }
        assert_eq!(ev_seq.handler().history_len(), 32);
    }
}
