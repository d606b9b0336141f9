//! Line-by-line and product-by-product breakdown of an allocation.

use serde::Serialize;

use crate::ga::Individual;
use crate::models::ProductionModel;

/// One product on one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineProductPlan {
    pub product_id: String,
    pub product_name: String,
    pub amount: f64,
    pub minutes_per_unit: f64,
    pub hours: f64,
    pub revenue: f64,
    pub material_cost: f64,
    /// Revenue minus material cost.
    pub profit: f64,
}

/// Everything a line produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePlan {
    pub line_id: String,
    pub line_name: String,
    /// Products with a positive amount, in ID order.
    pub products: Vec<LineProductPlan>,
    pub working_hours: f64,
    pub production: f64,
    pub revenue: f64,
    /// Working hours × hourly operating cost.
    pub operating_cost: f64,
    /// Working hours / maximum hours, in percent (uncapped).
    pub utilization_pct: f64,
}

/// One line's contribution to a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLineShare {
    pub line_id: String,
    pub line_name: String,
    pub amount: f64,
    pub minutes_per_unit: f64,
    pub hours: f64,
    /// Units per hour on this line.
    pub efficiency: f64,
    /// Share of the product's total, in percent.
    pub share_pct: f64,
}

/// Where and how much of a product is made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPlan {
    pub product_id: String,
    pub product_name: String,
    pub target: f64,
    pub lines: Vec<ProductLineShare>,
    pub total_production: f64,
    /// Production / target in percent; 100 for a zero target.
    pub achievement_pct: f64,
    pub revenue: f64,
    pub profit: f64,
    /// Line with the largest amount, if anything is produced.
    pub best_line: Option<String>,
}

/// Detailed production plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionPlan {
    pub lines: Vec<LinePlan>,
    pub products: Vec<ProductPlan>,
}

impl ProductionPlan {
    /// Builds the plan for an allocation.
    pub fn build(model: &ProductionModel, individual: &Individual) -> Self {
        let lines = model
            .lines
            .values()
            .map(|line| {
                let products: Vec<LineProductPlan> = line
                    .compatible_products
                    .iter()
                    .filter_map(|pid| {
                        let product = model.product(pid)?;
                        let amount = individual.amount(&line.id, pid);
                        if amount <= 0.0 {
                            return None;
                        }
                        let minutes = product.production_time(&line.id);
                        Some(LineProductPlan {
                            product_id: product.id.clone(),
                            product_name: product.name.clone(),
                            amount,
                            minutes_per_unit: minutes,
                            hours: amount * minutes / 60.0,
                            revenue: amount * product.selling_price,
                            material_cost: amount * product.material_cost,
                            profit: amount * product.unit_profit(),
                        })
                    })
                    .collect();

                let working_hours: f64 = products.iter().map(|p| p.hours).sum();
                let utilization_pct = if line.max_working_hours > 0.0 {
                    working_hours / line.max_working_hours * 100.0
                } else {
                    0.0
                };
                LinePlan {
                    line_id: line.id.clone(),
                    line_name: line.name.clone(),
                    working_hours,
                    production: products.iter().map(|p| p.amount).sum(),
                    revenue: products.iter().map(|p| p.revenue).sum(),
                    operating_cost: working_hours * line.operating_cost,
                    utilization_pct,
                    products,
                }
            })
            .collect();

        let products = model
            .products
            .values()
            .map(|product| {
                let total = individual.total_production(&product.id);
                let shares: Vec<ProductLineShare> = model
                    .compatible_lines(&product.id)
                    .filter_map(|line| {
                        let amount = individual.amount(&line.id, &product.id);
                        if amount <= 0.0 {
                            return None;
                        }
                        let minutes = product.production_time(&line.id);
                        Some(ProductLineShare {
                            line_id: line.id.clone(),
                            line_name: line.name.clone(),
                            amount,
                            minutes_per_unit: minutes,
                            hours: amount * minutes / 60.0,
                            efficiency: if minutes > 0.0 { 60.0 / minutes } else { 0.0 },
                            share_pct: amount / total * 100.0,
                        })
                    })
                    .collect();

                let best_line = shares
                    .iter()
                    .fold(None::<&ProductLineShare>, |best, s| match best {
                        Some(b) if b.amount >= s.amount => Some(b),
                        _ => Some(s),
                    })
                    .map(|s| s.line_id.clone());

                ProductPlan {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    target: product.target_production,
                    lines: shares,
                    total_production: total,
                    achievement_pct: achievement_pct(total, product.target_production),
                    revenue: total * product.selling_price,
                    profit: total * product.unit_profit(),
                    best_line,
                }
            })
            .collect();

        Self { lines, products }
    }

    /// Plan for a line.
    pub fn line(&self, line_id: &str) -> Option<&LinePlan> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    /// Plan for a product.
    pub fn product(&self, product_id: &str) -> Option<&ProductPlan> {
        self.products.iter().find(|p| p.product_id == product_id)
    }
}

/// Production over target in percent; a zero target counts as met.
pub(crate) fn achievement_pct(production: f64, target: f64) -> f64 {
    if target > 0.0 {
        production / target * 100.0
    } else {
        100.0
    }
}
