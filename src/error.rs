//! Error types.
//!
//! Two families of errors exist:
//!
//! - [`ModelError`]: a line or product definition is rejected at
//!   construction or load (out-of-range parameter, selling price not above
//!   cost, negative or non-finite time, cost or demand figure).
//!   Values are never silently clamped.
//! - [`GaError`]: the optimizer cannot start (bad configuration, inconsistent
//!   model) or an evaluation produced an unusable value.
//!
//! Model consistency problems found by [`crate::validation`] and constraint
//! violations found by [`crate::constraints`] are data, not errors.

use thiserror::Error;

/// Definition error raised while building the production model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("selling price {price} of product '{product}' does not exceed material cost {cost}")]
    PriceBelowCost {
        product: String,
        price: f64,
        cost: f64,
    },

    #[error("working hours {requested} exceed the maximum of {max} on line '{line}'")]
    HoursExceeded {
        line: String,
        requested: f64,
        max: f64,
    },

    #[error("{field} of '{owner}' is {value}, expected {expected}")]
    InvalidValue {
        owner: String,
        field: String,
        value: f64,
        expected: &'static str,
    },

    #[error("unknown production line: {0}")]
    UnknownLine(String),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("problem definition could not be (de)serialized: {0}")]
    Serialization(String),
}

/// Result alias for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Error raised by the optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaError {
    #[error("invalid GA configuration: {0}")]
    InvalidConfig(String),

    #[error("production model is inconsistent: {}", .0.join("; "))]
    InvalidModel(Vec<String>),

    #[error("evaluation failed: {0}")]
    Evaluation(String),
}
