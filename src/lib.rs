//! Production allocation optimizer.
//!
//! Decides how many units of each product every production line makes per
//! day, trading off cost, profit, volume and quality under capacity,
//! demand, budget, quality and material-supply constraints. A real-coded
//! genetic algorithm searches the allocation space.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ProductionLine`, `Product`,
//!   `ProductionConstraints`, `ProductionModel`, `OptimizationGoal`,
//!   `ProblemDefinition`
//! - **`validation`**: Model consistency checks run before optimization
//! - **`objective`**: Cost, profit, production, quality and weighted
//!   multi-objective fitness functions
//! - **`constraints`**: Violation detection, repair, adaptive penalties
//! - **`fitness`**: Objective plus constraint-handling policy
//! - **`ga`**: Gene encoding, operators and the generational driver
//! - **`analysis`**: Reporting payload derived from the best solution
//!
//! # Example
//!
//! ```
//! use u_production::ga::{GaConfig, GeneticAlgorithm};
//! use u_production::models::{OptimizationGoal, Product, ProductionLine, ProductionModel};
//!
//! let model = ProductionModel::new()
//!     .with_line(
//!         ProductionLine::new("L1", "Assembly", 100.0, 10_000.0, 16.0, 0.02)
//!             .unwrap()
//!             .with_product("P1"),
//!     )
//!     .with_product(
//!         Product::new("P1", "Widget", 100.0, 500.0, 800.0)
//!             .unwrap()
//!             .with_production_time("L1", 0.6),
//!     )
//!     .with_goal(OptimizationGoal::MaximizeProduction);
//!
//! let config = GaConfig::default()
//!     .with_population_size(20)
//!     .with_max_generations(10)
//!     .with_seed(1);
//! let result = GeneticAlgorithm::new(&model, config).unwrap().run();
//! assert!(result.success);
//! assert_eq!(result.fitness_history.len(), result.generation_count + 1);
//! ```
//!
//! # References
//!
//! - Michalewicz (1996), "Genetic Algorithms + Data Structures = Evolution
//!   Programs"
//! - Coello Coello (2002), "Theoretical and numerical constraint-handling
//!   techniques used with evolutionary algorithms"
//! - Deb (2001), "Multi-Objective Optimization using Evolutionary Algorithms"

pub mod analysis;
pub mod constraints;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod models;
pub mod objective;
pub mod validation;

pub use error::{GaError, ModelError};
pub use fitness::FitnessEvaluator;
pub use ga::{GaConfig, GaResult, GeneticAlgorithm, Individual};
pub use models::{ProblemDefinition, ProductionModel};
