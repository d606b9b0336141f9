//! Generational GA driver.
//!
//! # Algorithm
//!
//! 1. Sample each gene uniformly in `[0, 0.1 × capacity]` and evaluate.
//! 2. Per generation:
//!    - build a selection pool of population size;
//!    - carry the top `elite_ratio` individuals over unchanged;
//!    - draw parent pairs uniformly from the pool, blend and mutate them
//!      until the population is refilled;
//!    - keep the best-so-far individual on strict improvement.
//! 3. Stop at the generation limit, after `stagnation_limit` generations
//!    without improvement, or when the time budget is spent.
//!
//! Any [`GaError`] raised inside the loop ends the run with a non-success
//! [`GaResult`]; `run` itself never fails.

use std::sync::Arc;
use std::time::Instant;

use rand::prelude::IndexedRandom;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::operators::GeneticOperators;
use super::{GaConfig, GaResult, GeneLayout, Individual};
use crate::analysis::DetailedAnalysis;
use crate::constraints::ConstraintRelaxation;
use crate::error::GaError;
use crate::fitness::FitnessEvaluator;
use crate::models::ProductionModel;

/// Production-allocation genetic algorithm over a borrowed model.
///
/// # Example
///
/// ```no_run
/// use u_production::ga::{GaConfig, GeneticAlgorithm};
/// use u_production::models::ProductionModel;
///
/// # fn demo(model: &ProductionModel) -> Result<(), u_production::error::GaError> {
/// let mut ga = GeneticAlgorithm::new(model, GaConfig::default().with_seed(7))?;
/// let result = ga.run();
/// if let Some(best) = &result.best_solution {
///     println!("fitness {} cost {}", best.fitness, best.total_cost(model));
/// }
/// # Ok(())
/// # }
/// ```
pub struct GeneticAlgorithm<'m> {
    model: &'m ProductionModel,
    config: GaConfig,
    layout: Arc<GeneLayout>,
    operators: GeneticOperators,
    evaluator: FitnessEvaluator,
    relaxation: ConstraintRelaxation,
    rng: SmallRng,
    population: Vec<Individual>,
    best: Option<Individual>,
    history: Vec<f64>,
}

/// Loop bookkeeping returned to [`GeneticAlgorithm::run`].
struct Progress {
    generations: usize,
    convergence_generation: usize,
}

impl<'m> GeneticAlgorithm<'m> {
    /// Creates a driver.
    ///
    /// # Errors
    /// - [`GaError::InvalidConfig`] if the configuration is rejected.
    /// - [`GaError::InvalidModel`] if the model fails validation.
    pub fn new(model: &'m ProductionModel, config: GaConfig) -> Result<Self, GaError> {
        config.validate()?;
        if let Err(errors) = model.validate() {
            return Err(GaError::InvalidModel(
                errors.iter().map(ToString::to_string).collect(),
            ));
        }

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            model,
            layout: Arc::new(GeneLayout::from_model(model)),
            operators: GeneticOperators::from_config(&config),
            evaluator: FitnessEvaluator::for_model(
                model,
                &config.constraint_settings,
                config.constraint_handling,
                config.cost_rates,
            ),
            relaxation: ConstraintRelaxation::new(),
            rng,
            population: Vec::new(),
            best: None,
            history: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Evaluator state (constraint history, penalty weights).
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Mutable evaluator, e.g. to add constraints before running.
    pub fn evaluator_mut(&mut self) -> &mut FitnessEvaluator {
        &mut self.evaluator
    }

    /// Current population.
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Best individual so far.
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Runs the full generational loop.
    ///
    /// The population and best-so-far are reset; evaluator state
    /// (violation history, penalty weights) carries over between runs.
    pub fn run(&mut self) -> GaResult {
        let start = Instant::now();
        self.population.clear();
        self.best = None;
        self.history.clear();

        info!(
            goal = ?self.model.goal,
            population = self.config.population_size,
            generations = self.config.max_generations,
            genes = self.layout.len(),
            "starting production GA"
        );

        let progress = match self.evolve(start) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(error = %e, "GA run failed");
                return GaResult::failure(e.to_string(), self.history.clone(), start.elapsed());
            }
        };
        let Some(best) = self.best.clone() else {
            return GaResult::failure(
                "no individual was evaluated",
                self.history.clone(),
                start.elapsed(),
            );
        };

        let detailed_analysis = DetailedAnalysis::build(self.model, &best, &self.history);
        let elapsed = start.elapsed();
        info!(
            best = best.fitness,
            feasible = best.is_feasible(),
            generations = progress.generations,
            elapsed_ms = elapsed.as_millis() as u64,
            "GA finished"
        );

        GaResult {
            best_fitness: best.fitness,
            best_solution: Some(best),
            fitness_history: self.history.clone(),
            generation_count: progress.generations,
            convergence_generation: progress.convergence_generation,
            execution_time: elapsed,
            success: true,
            error_message: None,
            detailed_analysis: Some(detailed_analysis),
        }
    }

    fn evolve(&mut self, start: Instant) -> Result<Progress, GaError> {
        let model = self.model;
        let parallel = self.config.parallel;

        // ---- initial population ----
        let mut population: Vec<Individual> = (0..self.config.population_size)
            .map(|_| Individual::random(self.layout.clone(), &mut self.rng))
            .collect();
        self.evaluator.update_normalization(model, &population);
        self.evaluator
            .evaluate_population(model, &mut population, parallel)?;
        self.population = population;
        self.best = fittest(&self.population).cloned();
        let initial = self.best_fitness();
        self.history.push(initial);

        let mut progress = Progress {
            generations: 0,
            convergence_generation: 0,
        };
        let mut stagnation = 0usize;

        for generation in 1..=self.config.max_generations {
            self.evaluator.update_normalization(model, &self.population);
            self.population = self.next_generation()?;
            progress.generations = generation;

            let current = fittest(&self.population);
            let improved = match (current, &self.best) {
                (Some(c), Some(b)) => c.fitness > b.fitness,
                (Some(_), None) => true,
                _ => false,
            };
            if improved {
                self.best = current.cloned();
                progress.convergence_generation = generation;
                stagnation = 0;
                debug!(generation, best = self.best_fitness(), "new best so far");
            } else {
                stagnation += 1;
            }
            let best = self.best_fitness();
            self.history.push(best);

            debug!(
                generation,
                best,
                mean = mean_fitness(&self.population),
                feasible = self.population.iter().filter(|i| i.is_feasible()).count(),
                "generation complete"
            );

            if let Some(interval) = self.config.auto_adjust_interval {
                if generation % interval == 0 {
                    let applied = self.relaxation.auto_adjust(self.evaluator.handler_mut());
                    if !applied.is_empty() {
                        debug!(generation, adjustments = applied.len(), "penalty weights adjusted");
                    }
                }
            }

            if self.config.stagnation_limit > 0 && stagnation >= self.config.stagnation_limit {
                warn!(generation, stagnation, "no improvement, stopping early");
                break;
            }
            if let Some(limit) = self.config.time_limit {
                if start.elapsed() >= limit {
                    warn!(generation, limit_ms = limit.as_millis() as u64, "time budget spent");
                    break;
                }
            }
        }

        Ok(progress)
    }

    /// Elites plus evaluated offspring, exactly `population_size` long.
    fn next_generation(&mut self) -> Result<Vec<Individual>, GaError> {
        let size = self.config.population_size;
        let fitness: Vec<f64> = self.population.iter().map(|i| i.fitness).collect();
        let pool = self.operators.select_pool(&fitness, size, &mut self.rng);

        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
        let mut next: Vec<Individual> = order
            .iter()
            .take(self.config.elite_count())
            .map(|&i| self.population[i].clone())
            .collect();

        let wanted = size.saturating_sub(next.len());
        let mut children = Vec::with_capacity(wanted + 1);
        while children.len() < wanted {
            let (Some(&a), Some(&b)) = (pool.choose(&mut self.rng), pool.choose(&mut self.rng))
            else {
                return Err(GaError::Evaluation("empty selection pool".into()));
            };
            let (mut c1, mut c2) =
                self.operators
                    .crossover(&self.population[a], &self.population[b], &mut self.rng);
            self.operators.mutate(&mut c1, &mut self.rng);
            self.operators.mutate(&mut c2, &mut self.rng);
            children.push(c1);
            children.push(c2);
        }
        children.truncate(wanted);

        self.evaluator
            .evaluate_population(self.model, &mut children, self.config.parallel)?;
        next.extend(children);
        Ok(next)
    }

    fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(f64::NEG_INFINITY, |b| b.fitness)
    }
}

/// First individual with the highest fitness.
fn fittest(population: &[Individual]) -> Option<&Individual> {
    population.iter().fold(None, |best, ind| match best {
        Some(b) if b.fitness >= ind.fitness => Some(b),
        _ => Some(ind),
    })
}

fn mean_fitness(population: &[Individual]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    population.iter().map(|i| i.fitness).sum::<f64>() / population.len() as f64
}
