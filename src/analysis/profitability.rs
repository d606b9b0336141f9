//! Product and line profitability ranking.

use serde::Serialize;

use super::utilization::{line_operating_cost, line_revenue};
use crate::ga::Individual;
use crate::models::ProductionModel;

/// Share of total product profit above which focusing on the top product
/// is advised.
const FOCUS_SHARE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductProfitability {
    pub product_id: String,
    pub product_name: String,
    pub unit_profit: f64,
    pub total_production: f64,
    pub total_profit: f64,
    /// Unit profit / selling price in percent.
    pub margin_pct: f64,
    /// 1 = highest total profit.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineProfitability {
    pub line_id: String,
    pub line_name: String,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
}

/// Profitability by product and by line, plus short insights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitabilityAnalysis {
    /// Products in ID order.
    pub products: Vec<ProductProfitability>,
    pub lines: Vec<LineProfitability>,
    pub insights: Vec<String>,
}

impl ProfitabilityAnalysis {
    pub fn build(model: &ProductionModel, individual: &Individual) -> Self {
        let mut products: Vec<ProductProfitability> = model
            .products
            .values()
            .map(|p| {
                let total = individual.total_production(&p.id);
                let unit_profit = p.unit_profit();
                ProductProfitability {
                    product_id: p.id.clone(),
                    product_name: p.name.clone(),
                    unit_profit,
                    total_production: total,
                    total_profit: total * unit_profit,
                    margin_pct: if p.selling_price > 0.0 {
                        unit_profit / p.selling_price * 100.0
                    } else {
                        0.0
                    },
                    rank: 0,
                }
            })
            .collect();

        let mut ranking: Vec<usize> = (0..products.len()).collect();
        ranking.sort_by(|&a, &b| products[b].total_profit.total_cmp(&products[a].total_profit));
        for (rank, &i) in ranking.iter().enumerate() {
            products[i].rank = rank + 1;
        }

        let lines = model
            .lines
            .values()
            .map(|line| {
                let revenue = line_revenue(model, individual, line);
                let cost = line_operating_cost(model, individual, line);
                LineProfitability {
                    line_id: line.id.clone(),
                    line_name: line.name.clone(),
                    revenue,
                    cost,
                    profit: revenue - cost,
                }
            })
            .collect();

        let mut insights = Vec::new();
        if let (Some(&best), Some(&worst)) = (ranking.first(), ranking.last()) {
            let best = &products[best];
            let worst = &products[worst];
            insights.push(format!("Top earning product: {}", best.product_name));
            insights.push(format!("Product needing improvement: {}", worst.product_name));

            let total: f64 = products.iter().map(|p| p.total_profit).sum();
            if total > 0.0 && best.total_profit / total > FOCUS_SHARE {
                insights.push(format!("Concentrate production on {}", best.product_name));
            } else {
                insights.push("Keep a diversified product portfolio".to_string());
            }
        }

        Self {
            products,
            lines,
            insights,
        }
    }

    /// Entry of a product.
    pub fn product(&self, product_id: &str) -> Option<&ProductProfitability> {
        self.products.iter().find(|p| p.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::sample_allocation;
    use crate::models::production::tests::sample_model;

    #[test]
    fn test_ranking() {
        let model = sample_model();
        let ind = sample_allocation(&model);
        let analysis = ProfitabilityAnalysis::build(&model, &ind);

        assert_eq!(analysis.product("B").unwrap().rank, 1);
        assert_eq!(analysis.product("A").unwrap().rank, 2);
        assert_eq!(analysis.product("C").unwrap().rank, 3);
        assert!((analysis.product("C").unwrap().margin_pct - 75.0).abs() < 1e-9);
        assert!((analysis.product("A").unwrap().total_profit - 32_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_insights() {
        let model = sample_model();
        let ind = sample_allocation(&model);
        let analysis = ProfitabilityAnalysis::build(&model, &ind);
        assert_eq!(
            analysis.insights,
            vec![
                "Top earning product: Standard Widget".to_string(),
                "Product needing improvement: Basic Widget".to_string(),
                "Keep a diversified product portfolio".to_string(),
            ]
        );

        let mut focused = ind.clone();
        focused.set_amount("L1", "A", 200.0);
        let analysis = ProfitabilityAnalysis::build(&model, &focused);
        assert_eq!(analysis.insights[2], "Concentrate production on Premium Widget");
    }

    #[test]
    fn test_line_profit() {
        let model = sample_model();
        let ind = sample_allocation(&model);
        let analysis = ProfitabilityAnalysis::build(&model, &ind);
        let l2 = &analysis.lines[1];
        assert_eq!(l2.line_id, "L2");
        assert!((l2.revenue - 68_000.0).abs() < 1e-9);
        assert!((l2.cost - 700_000.0).abs() < 1e-9);
        assert!((l2.profit - (-632_000.0)).abs() < 1e-9);
    }
}
