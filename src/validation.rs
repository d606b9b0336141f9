//! Consistency checks for production models.
//!
//! Run once before optimization. Detects:
//! - Models with no lines or no products
//! - Products that no line can make
//! - Compatible (line, product) pairs without a declared production time
//! - Map keys that disagree with the entity's own ID
//! - Negative or non-finite figures set through builder methods or global
//!   constraints
//!
//! Problems are reported as data, never as panics: the optimizer refuses to
//! start while any exist.

use crate::models::rules::is_non_negative;
use crate::models::ProductionModel;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The model has no production lines.
    NoLines,
    /// The model has no products.
    NoProducts,
    /// No line lists the product as compatible.
    UnservedProduct,
    /// A line lists the product as compatible but the product declares no
    /// production time on that line.
    MissingProductionTime,
    /// A map key differs from the ID stored in the entity.
    KeyMismatch,
    /// A line, product or global constraint figure is out of range, e.g. a
    /// non-positive production time or a negative setup cost.
    InvalidParameter,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a production model.
///
/// Checks:
/// 1. At least one line
/// 2. At least one product
/// 3. Every product has at least one compatible line
/// 4. Every compatible (line, product) pair has a production time
/// 5. Map keys match entity IDs
/// 6. Builder-set line and product figures pass `check_parameters`, and
///    the global budget, labor, material and minimum-production figures are
///    finite and ≥ 0
///
/// Compatible-product entries naming products that are not in the model are
/// ignored.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_model(model: &ProductionModel) -> ValidationResult {
    let mut errors = Vec::new();

    if model.lines.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoLines,
            "No production lines defined",
        ));
    }
    if model.products.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoProducts,
            "No products defined",
        ));
    }

    for (key, line) in &model.lines {
        if key != &line.id {
            errors.push(ValidationError::new(
                ValidationErrorKind::KeyMismatch,
                format!("Line stored under '{}' has ID '{}'", key, line.id),
            ));
        }
    }
    for (key, product) in &model.products {
        if key != &product.id {
            errors.push(ValidationError::new(
                ValidationErrorKind::KeyMismatch,
                format!("Product stored under '{}' has ID '{}'", key, product.id),
            ));
        }
    }

    for line in model.lines.values() {
        if let Err(e) = line.check_parameters() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                e.to_string(),
            ));
        }
    }
    for product in model.products.values() {
        if let Err(e) = product.check_parameters() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                e.to_string(),
            ));
        }
    }

    let limits = &model.constraints;
    for (name, value) in [
        ("total_budget", limits.total_budget),
        ("labor_limit", limits.labor_limit),
    ] {
        if let Some(v) = value.filter(|v| !is_non_negative(*v)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!("Constraint {} is {}, expected ≥ 0", name, v),
            ));
        }
    }
    for (name, map) in [
        ("daily material limit", &limits.daily_material_limits),
        ("minimum production", &limits.min_production_requirements),
    ] {
        for (product_id, &v) in map {
            if !is_non_negative(v) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidParameter,
                    format!("{} of product '{}' is {}, expected ≥ 0", name, product_id, v),
                ));
            }
        }
    }

    for (product_id, product) in &model.products {
        if model.compatible_lines(product_id).next().is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnservedProduct,
                format!("Product '{}' has no compatible production line", product_id),
            ));
        }
        for line in model.compatible_lines(product_id) {
            if !product.production_times.contains_key(&line.id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingProductionTime,
                    format!(
                        "Product '{}' has no production time on compatible line '{}'",
                        product_id, line.id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
