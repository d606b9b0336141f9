//! Numeric validation ranges for line and product parameters.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Creates a new inclusive range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range. NaN is never contained.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns `Ok(())` if `value` is in range, otherwise an
    /// [`ModelError::OutOfRange`] naming `field`.
    pub fn check(&self, field: &'static str, value: f64) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(ModelError::OutOfRange {
                field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Whether `value` is a finite number ≥ 0.
#[inline]
pub(crate) fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Valid ranges applied when lines and products are constructed.
///
/// # Defaults
///
/// | Field | Range |
/// |-------|-------|
/// | capacity per hour | 1 – 10,000 units |
/// | operating cost per hour | 0 – 1,000,000 |
/// | max working hours | 1 – 24 |
/// | defect rate | 0.0 – 0.5 |
/// | material cost | 0 – 1,000,000 |
/// | selling price | 0 – 1,000,000 |
/// | target production | 1 – 1,000,000 units |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub capacity_per_hour: ValueRange,
    pub operating_cost: ValueRange,
    pub working_hours: ValueRange,
    pub defect_rate: ValueRange,
    pub material_cost: ValueRange,
    pub selling_price: ValueRange,
    pub target_production: ValueRange,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            capacity_per_hour: ValueRange::new(1.0, 10_000.0),
            operating_cost: ValueRange::new(0.0, 1_000_000.0),
            working_hours: ValueRange::new(1.0, 24.0),
            defect_rate: ValueRange::new(0.0, 0.5),
            material_cost: ValueRange::new(0.0, 1_000_000.0),
            selling_price: ValueRange::new(0.0, 1_000_000.0),
            target_production: ValueRange::new(1.0, 1_000_000.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_bounds() {
        let r = ValueRange::new(0.0, 0.5);
        assert!(r.contains(0.0));
        assert!(r.contains(0.5));
        assert!(!r.contains(0.51));
        assert!(!r.contains(f64::NAN));
    }

    #[test]
    fn test_check_reports_field() {
        let rules = ValidationRules::default();
        let err = rules.working_hours.check("max_working_hours", 25.0).unwrap_err();
        assert!(matches!(
            err,
            ModelError::OutOfRange {
                field: "max_working_hours",
                ..
            }
        ));
    }
}
