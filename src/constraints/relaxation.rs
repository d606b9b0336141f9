//! Run-time relaxation and tightening of constraint penalty weights.

use std::collections::BTreeMap;

use super::ConstraintHandler;

/// Frequency above which a constraint is relaxed.
const RELAX_ABOVE: f64 = 0.8;
/// Frequency below which a constraint is tightened.
const TIGHTEN_BELOW: f64 = 0.1;
/// Step applied by [`ConstraintRelaxation::auto_adjust`].
const AUTO_STEP: f64 = 0.1;

/// Direction of an applied adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Relaxed,
    Tightened,
}

/// Scales constraint penalty weights and remembers relaxation levels.
#[derive(Debug, Clone, Default)]
pub struct ConstraintRelaxation {
    levels: BTreeMap<String, f64>,
}

impl ConstraintRelaxation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last relaxation factor applied per constraint.
    pub fn levels(&self) -> &BTreeMap<String, f64> {
        &self.levels
    }

    /// Multiplies a constraint's penalty weight by `1 − factor`
    /// (`factor` clamped to [0, 1]). Returns `false` if unknown.
    pub fn relax(&mut self, handler: &mut ConstraintHandler, name: &str, factor: f64) -> bool {
        let factor = factor.clamp(0.0, 1.0);
        let Some(c) = handler.constraint_mut(name) else {
            return false;
        };
        c.penalty_weight *= 1.0 - factor;
        self.levels.insert(name.to_string(), factor);
        true
    }

    /// Multiplies a constraint's penalty weight by `1 + factor`
    /// (`factor` floored at 0). Returns `false` if unknown.
    pub fn tighten(&mut self, handler: &mut ConstraintHandler, name: &str, factor: f64) -> bool {
        let factor = factor.max(0.0);
        match handler.constraint_mut(name) {
            Some(c) => {
                c.penalty_weight *= 1.0 + factor;
                true
            }
            None => false,
        }
    }

    /// Relaxes constraints violated in more than 80% of recent evaluations
    /// and tightens those violated in fewer than 10%, each by 10%.
    pub fn auto_adjust(&mut self, handler: &mut ConstraintHandler) -> Vec<(String, Adjustment)> {
        let mut applied = Vec::new();
        for (name, stat) in handler.statistics() {
            if stat.violation_frequency > RELAX_ABOVE {
                self.relax(handler, &name, AUTO_STEP);
                applied.push((name, Adjustment::Relaxed));
            } else if stat.violation_frequency < TIGHTEN_BELOW {
                self.tighten(handler, &name, AUTO_STEP);
                applied.push((name, Adjustment::Tightened));
            }
        }
        applied
    }
}
