//! Genetic algorithm for production allocation.
//!
//! # Encoding
//!
//! One real-valued gene per compatible (line, product) pair, holding the
//! daily amount to produce. Genes live in a flat vector ordered by a shared
//! [`GeneLayout`]; every gene stays within `[0, capacity]` where capacity is
//! the line's defect-adjusted daily output.
//!
//! # Submodules
//!
//! - [`operators`]: selection, arithmetic crossover, Gaussian mutation
//!
//! # Reference
//! - Michalewicz (1996), "Genetic Algorithms + Data Structures = Evolution
//!   Programs"
//! - Deb (2000), "An efficient constraint handling method for genetic
//!   algorithms"

mod config;
mod individual;
pub mod operators;
mod result;
mod runner;

pub use config::{GaConfig, Selection};
pub use individual::{GeneLayout, Individual, Slot};
pub use operators::{arithmetic_crossover, blend, gaussian_mutation, GeneticOperators};
pub use result::GaResult;
pub use runner::GeneticAlgorithm;
