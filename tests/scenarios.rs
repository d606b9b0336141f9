//! End-to-end optimizer scenarios.

use u_production::constraints::{ConstraintHandling, ConstraintSettings};
use u_production::fitness::{FitnessEvaluator, DEATH_PENALTY};
use u_production::ga::{GaConfig, GeneLayout, GeneticAlgorithm, Individual};
use u_production::models::{
    OptimizationGoal, ProblemDefinition, Product, ProductionConstraints, ProductionLine,
    ProductionModel,
};

use std::sync::Arc;

fn two_line_model() -> ProductionModel {
    ProductionModel::new()
        .with_line(
            ProductionLine::new("L1", "High-Tech Line", 100.0, 50_000.0, 16.0, 0.03)
                .unwrap()
                .with_products(["A", "B"]),
        )
        .with_line(
            ProductionLine::new("L2", "Standard Line", 80.0, 35_000.0, 20.0, 0.05)
                .unwrap()
                .with_products(["B", "C"]),
        )
        .with_product(
            Product::new("A", "Premium Widget", 1_000.0, 3_000.0, 500.0)
                .unwrap()
                .with_min_demand(400.0)
                .with_production_time("L1", 30.0)
                .with_setup("L1", 60.0, 50_000.0),
        )
        .with_product(
            Product::new("B", "Standard Widget", 500.0, 1_500.0, 800.0)
                .unwrap()
                .with_production_time("L1", 20.0)
                .with_production_time("L2", 25.0),
        )
        .with_product(
            Product::new("C", "Basic Widget", 200.0, 800.0, 1_200.0)
                .unwrap()
                .with_production_time("L2", 15.0)
                .with_material_supply_limit(1_500.0),
        )
}

#[test]
fn production_goal_reaches_target() {
    // 100/h × 16h = 1600 units a day at 0.6 min/unit
    let model = ProductionModel::new()
        .with_line(
            ProductionLine::new("L1", "Line", 100.0, 0.0, 16.0, 0.0)
                .unwrap()
                .with_product("P"),
        )
        .with_product(
            Product::new("P", "Part", 0.0, 1.0, 1_000.0)
                .unwrap()
                .with_production_time("L1", 0.6),
        )
        .with_goal(OptimizationGoal::MaximizeProduction);

    let config = GaConfig::default().with_seed(42);
    let result = GeneticAlgorithm::new(&model, config).unwrap().run();

    assert!(result.success);
    let best = result.best_solution.as_ref().unwrap();
    assert!(best.total_production("P") >= 1_000.0);
    // achievement is capped, so the bonus term is exactly 300
    assert!((best.fitness_components().efficiency_score - 1.0).abs() < 1e-12);
}

#[test]
fn zero_budget_under_death_penalty() {
    let mut model = two_line_model();
    model.set_constraints(ProductionConstraints::default().with_budget(0.0));

    let config = GaConfig::default()
        .with_population_size(30)
        .with_max_generations(20)
        .with_constraint_handling(ConstraintHandling::DeathPenalty)
        .with_seed(42);
    let result = GeneticAlgorithm::new(&model, config).unwrap().run();

    assert!(result.success);
    assert_eq!(result.best_fitness, DEATH_PENALTY);
    assert!(!result.is_feasible());
    // no individual ever escapes the sentinel, so the best never moves
    assert!(result.fitness_history.iter().all(|&f| f == DEATH_PENALTY));
    assert_eq!(result.convergence_generation, 0);
}

#[test]
fn death_penalty_spares_feasible_allocations() {
    // no demand floor, so an idle plant costs nothing and breaks no constraint
    let mut model = ProductionModel::new()
        .with_line(
            ProductionLine::new("L1", "Line", 100.0, 1_000.0, 16.0, 0.0)
                .unwrap()
                .with_product("P"),
        )
        .with_product(
            Product::new("P", "Part", 10.0, 20.0, 1.0)
                .unwrap()
                .with_production_time("L1", 1.0),
        );
    model.set_constraints(ProductionConstraints::default().with_budget(0.0));

    let config = GaConfig::default()
        .with_constraint_handling(ConstraintHandling::DeathPenalty)
        .with_constraint_settings(ConstraintSettings {
            demand_min_satisfaction: 0.0,
            ..ConstraintSettings::default()
        });
    let mut evaluator = FitnessEvaluator::for_model(
        &model,
        &config.constraint_settings,
        config.constraint_handling,
        config.cost_rates,
    );

    let layout = Arc::new(GeneLayout::from_model(&model));
    let mut idle = Individual::zeros(layout.clone());
    evaluator.evaluate(&model, &mut idle).unwrap();
    assert_eq!(idle.total_cost(&model), 0.0);
    assert!(idle.is_feasible(), "{:?}", idle.violations());
    assert!(idle.fitness > DEATH_PENALTY);

    let mut busy = Individual::zeros(layout);
    busy.set_amount("L1", "P", 10.0);
    evaluator.evaluate(&model, &mut busy).unwrap();
    assert_eq!(busy.fitness, DEATH_PENALTY);
}

#[test]
fn zero_budget_drives_cost_down() {
    let mut model = two_line_model();
    model.set_constraints(ProductionConstraints::default().with_budget(0.0));

    let layout = Arc::new(GeneLayout::from_model(&model));
    let midpoint: Vec<f64> = (0..layout.len()).map(|i| 0.05 * layout.capacity(i)).collect();
    let reference = Individual::new(layout, midpoint).total_cost(&model);

    let config = GaConfig::default()
        .with_population_size(40)
        .with_max_generations(150)
        .with_seed(42);
    let result = GeneticAlgorithm::new(&model, config).unwrap().run();

    let best = result.best_solution.as_ref().unwrap();
    assert!(best.total_cost(&model) < reference);
}

#[test]
fn quality_goal_prefers_low_defect_line() {
    let model = ProductionModel::new()
        .with_line(
            ProductionLine::new("GOOD", "Clean Room", 100.0, 10_000.0, 16.0, 0.01)
                .unwrap()
                .with_product("P"),
        )
        .with_line(
            ProductionLine::new("POOR", "Old Line", 100.0, 10_000.0, 16.0, 0.2)
                .unwrap()
                .with_product("P"),
        )
        .with_product(
            Product::new("P", "Part", 10.0, 50.0, 100.0)
                .unwrap()
                .with_production_time("GOOD", 1.0)
                .with_production_time("POOR", 1.0),
        )
        .with_goal(OptimizationGoal::OptimizeQuality);

    let config = GaConfig::default()
        .with_population_size(40)
        .with_max_generations(150)
        .with_seed(42);
    let result = GeneticAlgorithm::new(&model, config).unwrap().run();

    let best = result.best_solution.as_ref().unwrap();
    let good = best.amount("GOOD", "P");
    let total = best.total_production("P");
    assert!(total > 0.0);
    assert!(good / total > 0.5, "good-line share {}", good / total);
}

#[test]
fn fixed_seed_is_reproducible() {
    let model = two_line_model();
    let config = GaConfig::default()
        .with_population_size(30)
        .with_max_generations(40)
        .with_seed(7);

    let a = GeneticAlgorithm::new(&model, config.clone()).unwrap().run();
    let b = GeneticAlgorithm::new(&model, config.clone()).unwrap().run();
    let c = GeneticAlgorithm::new(&model, config.with_parallel(true))
        .unwrap()
        .run();

    assert_eq!(a.fitness_history, b.fitness_history);
    assert_eq!(a.fitness_history, c.fitness_history);
    assert_eq!(
        a.best_solution.unwrap().genes(),
        c.best_solution.unwrap().genes()
    );
}

#[test]
fn problem_definition_json_round_trip() {
    let mut model = two_line_model();
    model.set_constraints(
        ProductionConstraints::default()
            .with_budget(2_000_000.0)
            .with_material_limit("A", 300.0),
    );

    let json = ProblemDefinition::from_model(&model).to_json().unwrap();
    let loaded = ProblemDefinition::load(&json).unwrap();
    assert_eq!(loaded, model);
    assert!(loaded.validate().is_ok());
}

#[test]
fn result_serializes() {
    let model = two_line_model();
    let config = GaConfig::default()
        .with_population_size(10)
        .with_max_generations(5)
        .with_seed(3);
    let result = GeneticAlgorithm::new(&model, config).unwrap().run();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], true);
    assert!(json["best_solution"]["allocation"]["L1"]["A"].is_number());
    assert!(json["detailed_analysis"]["executive_summary"].is_object());
}
