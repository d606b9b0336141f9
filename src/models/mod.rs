//! Production domain models.
//!
//! Provides the data types describing a production-allocation problem:
//! lines, products, global constraints and the optimization goal.
//!
//! # Domain Mappings
//!
//! | u-production | Manufacturing | Food processing | Electronics |
//! |--------------|---------------|-----------------|-------------|
//! | ProductionLine | Assembly line | Packing line | SMT line |
//! | Product | Part / SKU | Recipe | Board variant |
//! | ProductionConstraints | Budget, supply | Ingredient stock | Component stock |

mod definition;
mod goal;
mod line;
mod product;
pub(crate) mod production;
pub(crate) mod rules;

pub use definition::ProblemDefinition;
pub use goal::{ObjectiveWeights, OptimizationGoal};
pub use line::ProductionLine;
pub use product::Product;
pub use production::{CompatibilityMatrix, ModelSummary, ProductionConstraints, ProductionModel};
pub use rules::{ValidationRules, ValueRange};
