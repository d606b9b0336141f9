//! Production line model.
//!
//! A line is a manufacturing resource with an hourly throughput, an hourly
//! operating cost, a daily working-hour budget and a defect rate. It lists
//! the products it is able to make.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::rules::is_non_negative;
use super::ValidationRules;
use crate::error::{ModelError, Result};

/// A manufacturing line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    /// Unique line identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Throughput (units per hour).
    pub capacity_per_hour: f64,
    /// Operating cost per hour.
    pub operating_cost: f64,
    /// Maximum working hours per day.
    pub max_working_hours: f64,
    /// Fraction of output that is defective (0.0..=0.5).
    pub defect_rate: f64,
    /// One-off equipment investment.
    #[serde(default)]
    pub investment_cost: f64,
    /// Monthly maintenance cost.
    #[serde(default)]
    pub maintenance_cost: f64,
    /// Identifiers of products this line can make.
    #[serde(default)]
    pub compatible_products: BTreeSet<String>,
}

impl ProductionLine {
    /// Creates a line, checking every numeric field against the default
    /// [`ValidationRules`].
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        capacity_per_hour: f64,
        operating_cost: f64,
        max_working_hours: f64,
        defect_rate: f64,
    ) -> Result<Self> {
        Self::with_rules(
            id,
            name,
            capacity_per_hour,
            operating_cost,
            max_working_hours,
            defect_rate,
            &ValidationRules::default(),
        )
    }

    /// Creates a line, checking every numeric field against `rules`.
    pub fn with_rules(
        id: impl Into<String>,
        name: impl Into<String>,
        capacity_per_hour: f64,
        operating_cost: f64,
        max_working_hours: f64,
        defect_rate: f64,
        rules: &ValidationRules,
    ) -> Result<Self> {
        let line = Self {
            id: id.into(),
            name: name.into(),
            capacity_per_hour,
            operating_cost,
            max_working_hours,
            defect_rate,
            investment_cost: 0.0,
            maintenance_cost: 0.0,
            compatible_products: BTreeSet::new(),
        };
        line.check(rules)?;
        Ok(line)
    }

    /// Sets the equipment investment cost.
    pub fn with_investment_cost(mut self, cost: f64) -> Self {
        self.investment_cost = cost;
        self
    }

    /// Sets the monthly maintenance cost.
    pub fn with_maintenance_cost(mut self, cost: f64) -> Self {
        self.maintenance_cost = cost;
        self
    }

    /// Adds a compatible product.
    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.compatible_products.insert(product_id.into());
        self
    }

    /// Adds several compatible products.
    pub fn with_products<I, S>(mut self, product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible_products
            .extend(product_ids.into_iter().map(Into::into));
        self
    }

    /// Re-checks every numeric field against `rules`.
    ///
    /// Used on construction and when a line is loaded from a
    /// [`super::ProblemDefinition`].
    pub fn check(&self, rules: &ValidationRules) -> Result<()> {
        rules
            .capacity_per_hour
            .check("capacity_per_hour", self.capacity_per_hour)?;
        rules
            .operating_cost
            .check("operating_cost", self.operating_cost)?;
        rules
            .working_hours
            .check("max_working_hours", self.max_working_hours)?;
        rules.defect_rate.check("defect_rate", self.defect_rate)?;
        self.check_parameters()
    }

    /// Checks the investment and maintenance costs, which the builder
    /// methods store as given. Both must be finite and ≥ 0.
    pub fn check_parameters(&self) -> Result<()> {
        for (field, value) in [
            ("investment_cost", self.investment_cost),
            ("maintenance_cost", self.maintenance_cost),
        ] {
            if !is_non_negative(value) {
                return Err(ModelError::InvalidValue {
                    owner: self.id.clone(),
                    field: field.to_string(),
                    value,
                    expected: "≥ 0",
                });
            }
        }
        Ok(())
    }

    /// Whether the line can make `product_id`.
    #[inline]
    pub fn is_compatible(&self, product_id: &str) -> bool {
        self.compatible_products.contains(product_id)
    }

    /// Maximum daily output (units), ignoring defects.
    #[inline]
    pub fn daily_capacity(&self) -> f64 {
        self.capacity_per_hour * self.max_working_hours
    }

    /// Maximum daily good output (units).
    #[inline]
    pub fn effective_capacity(&self) -> f64 {
        self.daily_capacity() * (1.0 - self.defect_rate)
    }

    /// Operating cost for running `working_hours` in one day.
    pub fn daily_operating_cost(&self, working_hours: f64) -> Result<f64> {
        if working_hours > self.max_working_hours {
            return Err(ModelError::HoursExceeded {
                line: self.id.clone(),
                requested: working_hours,
                max: self.max_working_hours,
            });
        }
        Ok(self.operating_cost * working_hours)
    }
}
