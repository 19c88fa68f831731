//! Construction agent.

use super::config::{AcoConfig, Construction, Scoring};
use super::pheromone::{reciprocal, PheromoneMatrix};
use crate::partition::Partition;
use crate::relation::RelationMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// An ant: owns one live [`Partition`] and its own random generator.
///
/// Each call to [`construct`](Ant::construct) walks the items in index order
/// and relabels every item with the most desirable candidate label, where
/// the desirability of label `l` for item `i` is
///
/// ```text
/// w(l) = tau[i][l]^alpha * (1 / v(l))^beta
/// ```
///
/// and `v(l)` is the objective the partition would have with item `i`
/// relabeled to `l`. Every decision is written back immediately, so later
/// items see earlier choices.
#[derive(Debug, Clone)]
pub struct Ant {
    partition: Partition,
    cost: usize,
    rng: StdRng,
}

impl Ant {
    /// Creates an ant holding a random partition of `matrix.size()` items.
    pub fn new(matrix: &RelationMatrix, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut partition = Partition::random(matrix.size(), &mut rng);
        let cost = partition.compute_objective(matrix);
        Self {
            partition,
            cost,
            rng,
        }
    }

    /// The partition built by the last construction (or the random draw).
    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Objective of [`partition`](Ant::partition).
    #[inline]
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// Replaces the partition with a fresh random draw.
    pub fn reset_random(&mut self, matrix: &RelationMatrix) {
        self.partition.randomize(&mut self.rng);
        self.cost = self.partition.compute_objective(matrix);
    }

    /// Rebuilds the partition against the given pheromone snapshot, then
    /// normalizes it and records its objective.
    pub fn construct(
        &mut self,
        matrix: &RelationMatrix,
        pheromone: &PheromoneMatrix,
        config: &AcoConfig,
    ) {
        let n = self.partition.len();
        let global: Vec<usize> = match config.construction {
            Construction::Global => (0..n).collect(),
            Construction::Local => Vec::new(),
        };

        for item in 0..n {
            let label = match config.construction {
                Construction::Global => self.select_label(matrix, pheromone, config, item, &global),
                Construction::Local => {
                    let candidates = self.partition.neighbor_labels(item);
                    self.select_label(matrix, pheromone, config, item, &candidates)
                }
            };

            match config.scoring {
                Scoring::Naive => self.partition.set(item, label),
                Scoring::Incremental => {
                    self.partition.set_and_rescore(item, label, matrix);
                }
            }
        }

        self.partition.normalize();
        self.cost = self.partition.compute_objective(matrix);
    }

    /// Picks the candidate with the largest selection probability.
    ///
    /// Candidates are scanned in order with `>=`, so on ties the last one
    /// wins. If every weight is zero the probabilities are NaN, nothing
    /// compares, and the item keeps its current label.
    ///
    /// Large `alpha` or `beta` can overflow weights to `+inf`. Overflowed
    /// candidates then share the whole probability mass equally and every
    /// finite candidate gets 0. If only the sum overflows, probabilities are
    /// taken relative to the largest weight.
    fn select_label(
        &self,
        matrix: &RelationMatrix,
        pheromone: &PheromoneMatrix,
        config: &AcoConfig,
        item: usize,
        candidates: &[usize],
    ) -> usize {
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&label| {
                let cost = match config.scoring {
                    Scoring::Naive => self.partition.objective_if_naive(item, label, matrix),
                    Scoring::Incremental => self.partition.objective_if(item, label, matrix),
                };
                pheromone.get(item, label).powf(config.alpha) * reciprocal(cost).powf(config.beta)
            })
            .collect();
        let total: f64 = weights.iter().sum();
        let overflowed = weights.iter().filter(|&&w| w == f64::INFINITY).count();
        let scale = if total == f64::INFINITY && overflowed == 0 {
            weights.iter().copied().fold(0.0, f64::max)
        } else {
            total
        };

        let mut best = self.partition.get(item);
        let mut most = 0.0;
        for (&label, &weight) in candidates.iter().zip(&weights) {
            let probability = match overflowed {
                0 => weight / scale,
                _ if weight == f64::INFINITY => 1.0 / overflowed as f64,
                _ => 0.0,
            };
            if probability >= most {
                best = label;
                most = probability;
            }
        }
        best
    }
}
