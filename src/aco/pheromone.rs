//! Pheromone trail.
//!
//! Cell `(i, l)` holds the learned desirability of giving item `i` the
//! literal label value `l`. Label values index columns directly, so the
//! trail depends on the raw labels ants end up with, not on which items
//! are grouped together.

/// Stand-in for `1 / 0` when a partition has no violations.
///
/// Used for both the heuristic term of candidate weights and the deposit of
/// a perfect ant, so perfect partitions are strongly preferred without
/// letting infinities or NaNs into the arithmetic.
pub const ZERO_COST_RECIPROCAL: f64 = 1.0e6;

/// `1 / cost`, with [`ZERO_COST_RECIPROCAL`] for a zero cost.
#[inline]
pub fn reciprocal(cost: usize) -> f64 {
    if cost == 0 {
        ZERO_COST_RECIPROCAL
    } else {
        1.0 / cost as f64
    }
}

/// Dense `N × N` pheromone matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    size: usize,
    values: Vec<f64>,
}

impl PheromoneMatrix {
    /// Creates a matrix with every cell, the diagonal included, set to `initial`.
    pub fn new(size: usize, initial: f64) -> Self {
        Self {
            size,
            values: vec![initial; size * size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Trail for giving item `item` the label `label`.
    #[inline]
    pub fn get(&self, item: usize, label: usize) -> f64 {
        self.values[item * self.size + label]
    }

    /// Smallest cell value.
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest cell value.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Multiplies every cell by `1 - rho`.
    pub fn evaporate(&mut self, rho: f64) {
        let keep = 1.0 - rho;
        for value in &mut self.values {
            *value *= keep;
        }
    }

    /// Adds `1 / cost` to cell `(i, labels[i])` for every item.
    ///
    /// # Panics
    /// Panics if a label is not below the matrix size.
    pub fn deposit(&mut self, labels: &[usize], cost: usize) {
        let amount = reciprocal(cost);
        for (item, &label) in labels.iter().enumerate() {
            assert!(label < self.size, "label {label} out of range");
            self.values[item * self.size + label] += amount;
        }
    }

    /// One end-of-iteration update: evaporation, then one deposit per
    /// solution in the given order.
    ///
    /// Each cell ends up as `old * (1 - rho)` plus the deposits of every
    /// solution assigning that label to that item, summed in solution order.
    pub fn update<'a, I>(&mut self, rho: f64, solutions: I)
    where
        I: IntoIterator<Item = (&'a [usize], usize)>,
    {
        self.evaporate(rho);
        for (labels, cost) in solutions {
            self.deposit(labels, cost);
        }
    }
}
