//! Candidate solution encoding.
//!
//! An allocation assigns a non-negative production amount to every
//! compatible (line, product) pair. Genes are stored in one flat `Vec<f64>`
//! whose slot order is fixed by a shared [`GeneLayout`]: lines in ID order,
//! and within each line its compatible products in ID order.
//!
//! ```text
//! slot:   0        1        2        3
//!       (L1,A)   (L1,B)   (L2,B)   (L2,C)
//!       └── L1 ──┘        └── L2 ──┘
//! ```
//!
//! Copying an individual copies that vector; the layout is shared through an
//! `Arc`.

use rand::Rng;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use crate::models::ProductionModel;
use crate::objective::ObjectiveComponents;

/// One (line, product) gene slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Index into [`GeneLayout::line_ids`].
    pub line: usize,
    /// Index into [`GeneLayout::product_ids`].
    pub product: usize,
}

/// Fixed mapping between gene positions and (line, product) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneLayout {
    line_ids: Vec<String>,
    product_ids: Vec<String>,
    slots: Vec<Slot>,
    line_spans: Vec<Range<usize>>,
    /// Minutes per unit for each slot.
    minutes: Vec<f64>,
    /// Defect-adjusted daily capacity of the slot's line.
    capacity: Vec<f64>,
}

impl GeneLayout {
    /// Builds the layout for a model.
    ///
    /// Compatible-product entries that name unknown products get no slot.
    pub fn from_model(model: &ProductionModel) -> Self {
        let line_ids: Vec<String> = model.lines.keys().cloned().collect();
        let product_ids: Vec<String> = model.products.keys().cloned().collect();
        let mut slots = Vec::new();
        let mut line_spans = Vec::with_capacity(line_ids.len());
        let mut minutes = Vec::new();
        let mut capacity = Vec::new();

        for (li, line) in model.lines.values().enumerate() {
            let start = slots.len();
            for product_id in &line.compatible_products {
                let Some(pi) = product_ids.iter().position(|p| p == product_id) else {
                    continue;
                };
                slots.push(Slot {
                    line: li,
                    product: pi,
                });
                minutes.push(model.products[product_id].production_time(&line.id));
                capacity.push(line.effective_capacity());
            }
            line_spans.push(start..slots.len());
        }

        Self {
            line_ids,
            product_ids,
            slots,
            line_spans,
            minutes,
            capacity,
        }
    }

    /// Number of gene slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the layout has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Line IDs in layout order.
    pub fn line_ids(&self) -> &[String] {
        &self.line_ids
    }

    /// Product IDs in layout order.
    pub fn product_ids(&self) -> &[String] {
        &self.product_ids
    }

    /// All slots.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot range owned by a line.
    pub fn line_span(&self, line: usize) -> Range<usize> {
        self.line_spans[line].clone()
    }

    /// Position of a line ID.
    pub fn line_index(&self, line_id: &str) -> Option<usize> {
        self.line_ids.iter().position(|l| l == line_id)
    }

    /// Position of a product ID.
    pub fn product_index(&self, product_id: &str) -> Option<usize> {
        self.product_ids.iter().position(|p| p == product_id)
    }

    /// Gene position of a (line, product) pair, if compatible.
    pub fn slot_index(&self, line: usize, product: usize) -> Option<usize> {
        self.line_spans
            .get(line)?
            .clone()
            .find(|&i| self.slots[i].product == product)
    }

    /// Gene positions holding a product, in line order.
    pub fn product_slots(&self, product: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.slots.len()).filter(move |&i| self.slots[i].product == product)
    }

    /// Minutes per unit for a slot.
    #[inline]
    pub fn minutes(&self, slot: usize) -> f64 {
        self.minutes[slot]
    }

    /// Upper gene bound for a slot: its line's defect-adjusted daily capacity.
    #[inline]
    pub fn capacity(&self, slot: usize) -> f64 {
        self.capacity[slot]
    }
}

/// A candidate production allocation.
///
/// Fitness, components, feasibility and violation descriptions are a cache
/// written once per evaluation.
#[derive(Debug, Clone)]
pub struct Individual {
    layout: Arc<GeneLayout>,
    genes: Vec<f64>,
    /// Scalar fitness (higher is better).
    pub fitness: f64,
    /// Economic breakdown from the last evaluation.
    pub components: ObjectiveComponents,
    /// Whether the last evaluation found no violation.
    pub feasible: bool,
    /// Violation descriptions from the last evaluation.
    pub violations: Vec<String>,
}

impl Individual {
    /// Creates an unevaluated individual with the given genes.
    ///
    /// # Panics
    /// Panics if `genes.len()` differs from the layout length.
    pub fn new(layout: Arc<GeneLayout>, genes: Vec<f64>) -> Self {
        assert_eq!(genes.len(), layout.len(), "gene count must match layout");
        Self {
            layout,
            genes,
            fitness: f64::NEG_INFINITY,
            components: ObjectiveComponents::default(),
            feasible: false,
            violations: Vec::new(),
        }
    }

    /// All-zero allocation.
    pub fn zeros(layout: Arc<GeneLayout>) -> Self {
        let n = layout.len();
        Self::new(layout, vec![0.0; n])
    }

    /// Random allocation: each gene uniform in [0, 10% of its line's
    /// defect-adjusted capacity].
    pub fn random<R: Rng>(layout: Arc<GeneLayout>, rng: &mut R) -> Self {
        let genes = (0..layout.len())
            .map(|i| rng.random::<f64>() * 0.1 * layout.capacity(i))
            .collect();
        Self::new(layout, genes)
    }

    /// The shared layout.
    pub fn layout(&self) -> &GeneLayout {
        &self.layout
    }

    /// Shared handle to the layout.
    pub fn layout_arc(&self) -> &Arc<GeneLayout> {
        &self.layout
    }

    /// Gene values in layout order.
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    /// Mutable gene values in layout order.
    pub fn genes_mut(&mut self) -> &mut [f64] {
        &mut self.genes
    }

    /// Amount for a (line, product) pair; 0 when incompatible or unknown.
    pub fn amount(&self, line_id: &str, product_id: &str) -> f64 {
        self.position(line_id, product_id)
            .map_or(0.0, |i| self.genes[i])
    }

    /// Sets the amount for a compatible (line, product) pair. Returns
    /// `false` when the pair has no slot.
    pub fn set_amount(&mut self, line_id: &str, product_id: &str, value: f64) -> bool {
        match self.position(line_id, product_id) {
            Some(i) => {
                self.genes[i] = value;
                true
            }
            None => false,
        }
    }

    fn position(&self, line_id: &str, product_id: &str) -> Option<usize> {
        let line = self.layout.line_index(line_id)?;
        let product = self.layout.product_index(product_id)?;
        self.layout.slot_index(line, product)
    }

    /// Gene values owned by a line.
    pub fn line_amounts(&self, line: usize) -> &[f64] {
        &self.genes[self.layout.line_span(line)]
    }

    /// Nested `line → product → amount` view.
    pub fn allocation(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut out: BTreeMap<String, BTreeMap<String, f64>> = self
            .layout
            .line_ids
            .iter()
            .map(|l| (l.clone(), BTreeMap::new()))
            .collect();
        for (i, slot) in self.layout.slots.iter().enumerate() {
            if let Some(products) = out.get_mut(&self.layout.line_ids[slot.line]) {
                products.insert(self.layout.product_ids[slot.product].clone(), self.genes[i]);
            }
        }
        out
    }

    // ======================== Derived metrics ========================

    /// Working hours consumed on a line (by index).
    pub fn line_hours_at(&self, line: usize) -> f64 {
        self.layout
            .line_span(line)
            .map(|i| self.genes[i] * self.layout.minutes(i) / 60.0)
            .sum()
    }

    /// Uncapped utilization of a line (by index): hours / max hours.
    pub fn raw_utilization_at(&self, model: &ProductionModel, line: usize) -> f64 {
        let max_hours = model
            .line(&self.layout.line_ids[line])
            .map_or(0.0, |l| l.max_working_hours);
        if max_hours > 0.0 {
            self.line_hours_at(line) / max_hours
        } else {
            0.0
        }
    }

    /// Utilization of a line (by index), capped at 1.0.
    pub fn utilization_at(&self, model: &ProductionModel, line: usize) -> f64 {
        self.raw_utilization_at(model, line).min(1.0)
    }

    /// Total amount produced on a line (by index).
    pub fn line_production_at(&self, line: usize) -> f64 {
        self.line_amounts(line).iter().sum()
    }

    /// Total amount of a product (by index) across all lines.
    pub fn product_total_at(&self, product: usize) -> f64 {
        self.layout
            .product_slots(product)
            .map(|i| self.genes[i])
            .sum()
    }

    /// Total production of a product across all lines.
    pub fn total_production(&self, product_id: &str) -> f64 {
        self.layout
            .product_index(product_id)
            .map_or(0.0, |p| self.product_total_at(p))
    }

    /// Utilization of a line, capped at 1.0. Unknown lines report 0.
    pub fn line_utilization(&self, model: &ProductionModel, line_id: &str) -> f64 {
        self.layout
            .line_index(line_id)
            .map_or(0.0, |l| self.utilization_at(model, l))
    }

    /// Uncapped utilization of a line. Unknown lines report 0.
    pub fn raw_line_utilization(&self, model: &ProductionModel, line_id: &str) -> f64 {
        self.layout
            .line_index(line_id)
            .map_or(0.0, |l| self.raw_utilization_at(model, l))
    }

    /// Total amount produced on a line.
    pub fn line_production(&self, line_id: &str) -> f64 {
        self.layout
            .line_index(line_id)
            .map_or(0.0, |l| self.line_production_at(l))
    }

    /// Sum of all genes.
    pub fn total_production_amount(&self) -> f64 {
        self.genes.iter().sum()
    }

    /// Material cost, operating cost at capped utilization, and the declared
    /// setup cost of every active (line, product) pair.
    pub fn total_cost(&self, model: &ProductionModel) -> f64 {
        let material: f64 = model
            .products
            .values()
            .enumerate()
            .map(|(p, product)| self.product_total_at(p) * product.material_cost)
            .sum();

        let mut operating = 0.0;
        for (l, line) in model.lines.values().enumerate() {
            operating +=
                self.utilization_at(model, l) * line.max_working_hours * line.operating_cost;
        }

        let setup: f64 = self
            .layout
            .slots
            .iter()
            .enumerate()
            .filter(|(i, _)| self.genes[*i] > 0.0)
            .filter_map(|(_, slot)| {
                let product = model.product(&self.layout.product_ids[slot.product])?;
                Some(product.setup_cost(&self.layout.line_ids[slot.line]))
            })
            .sum();

        material + operating + setup
    }

    /// Gross revenue: production × selling price.
    pub fn total_revenue(&self, model: &ProductionModel) -> f64 {
        model
            .products
            .values()
            .enumerate()
            .map(|(p, product)| self.product_total_at(p) * product.selling_price)
            .sum()
    }

    /// Cached fitness-component breakdown.
    pub fn fitness_components(&self) -> &ObjectiveComponents {
        &self.components
    }

    /// Cached feasibility flag.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Cached violation descriptions.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl Serialize for Individual {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Individual", 5)?;
        s.serialize_field("allocation", &self.allocation())?;
        s.serialize_field("fitness", &self.fitness)?;
        s.serialize_field("feasible", &self.feasible)?;
        s.serialize_field("violations", &self.violations)?;
        s.serialize_field("components", &self.components)?;
        s.end()
    }
}
