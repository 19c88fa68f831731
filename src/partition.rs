//! Candidate clusterings.
//!
//! A [`Partition`] assigns every item a label; items sharing a label form a
//! group. Its objective is the number of violated relations (see
//! [`Relation::is_violated`]) over all unordered item pairs. The objective
//! is cached and kept current by incremental rescoring when a single label
//! changes.

use crate::relation::{Relation, RelationMatrix};
use rand::Rng;

/// A label assignment over `N` items with a cached objective.
///
/// Labels are plain `usize` values in `[0, N)`. They need not be contiguous
/// until [`normalize`](Partition::normalize) is called.
///
/// # Examples
///
/// ```
/// use u_corrclust::partition::Partition;
/// use u_corrclust::relation::RelationMatrix;
///
/// let matrix = RelationMatrix::from_rows(&[
///     vec![0, 1, -1],
///     vec![1, 0, -1],
///     vec![-1, -1, 0],
/// ]).unwrap();
///
/// let mut partition = Partition::from_labels(vec![4, 4, 1]);
/// assert_eq!(partition.compute_objective(&matrix), 0);
///
/// partition.normalize();
/// assert_eq!(partition.labels(), &[0, 0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    labels: Vec<usize>,
    objective: Option<usize>,
    normalized: bool,
}

impl Partition {
    /// Creates the all-singleton partition: item `i` gets label `i`.
    pub fn new(size: usize) -> Self {
        Self {
            labels: (0..size).collect(),
            objective: None,
            normalized: false,
        }
    }

    /// Creates a partition from explicit labels.
    pub fn from_labels(labels: Vec<usize>) -> Self {
        Self {
            labels,
            objective: None,
            normalized: false,
        }
    }

    /// Draws a partition with independent uniform labels in `[0, size)`.
    pub fn random<R: Rng>(size: usize, rng: &mut R) -> Self {
        let mut partition = Self::new(size);
        partition.randomize(rng);
        partition
    }

    /// Redraws every label uniformly from `[0, N)` and drops the cache.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        let n = self.labels.len();
        for label in &mut self.labels {
            *label = rng.random_range(0..n);
        }
        self.invalidate();
    }

    /// Number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of item `i`.
    #[inline]
    pub fn get(&self, i: usize) -> usize {
        self.labels[i]
    }

    #[inline]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Overwrites the label of item `i` and drops the cache.
    pub fn set(&mut self, i: usize, label: usize) {
        self.labels[i] = label;
        self.invalidate();
    }

    /// Replaces every label and drops the cache.
    ///
    /// # Panics
    /// Panics if the length differs from the current one.
    pub fn set_labels(&mut self, labels: Vec<usize>) {
        assert_eq!(labels.len(), self.labels.len(), "label count must not change");
        self.labels = labels;
        self.invalidate();
    }

    /// Cached objective, or `None` when it has not been computed since the
    /// last mutation.
    #[inline]
    pub fn objective(&self) -> Option<usize> {
        self.objective
    }

    /// Whether labels are currently in first-appearance order.
    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Returns the objective, computing and caching it if needed.
    ///
    /// Full computation is `O(N²)`.
    pub fn compute_objective(&mut self, matrix: &RelationMatrix) -> usize {
        if let Some(value) = self.objective {
            return value;
        }
        let value = full_objective(&self.labels, matrix);
        self.objective = Some(value);
        value
    }

    /// Sets item `pos` to `label` and returns the updated objective.
    ///
    /// With a cached objective the update is `O(N)`: only the pairs that
    /// involve `pos` are rescored. Without one it falls back to a full
    /// computation. Relabeling to the current label is a no-op.
    pub fn set_and_rescore(&mut self, pos: usize, label: usize, matrix: &RelationMatrix) -> usize {
        match self.objective {
            Some(value) if self.labels[pos] == label => value,
            Some(value) => {
                let updated = rescored(&self.labels, value, pos, label, matrix);
                self.labels[pos] = label;
                self.objective = Some(updated);
                self.normalized = false;
                updated
            }
            None => {
                self.labels[pos] = label;
                self.normalized = false;
                self.compute_objective(matrix)
            }
        }
    }

    /// Objective the partition would have with item `pos` relabeled to
    /// `label`, computed from scratch. Does not mutate `self`.
    pub fn objective_if_naive(&self, pos: usize, label: usize, matrix: &RelationMatrix) -> usize {
        let n = self.labels.len();
        let label_of = |k: usize| if k == pos { label } else { self.labels[k] };

        let mut value = 0;
        for i in 0..n {
            let li = label_of(i);
            let row = matrix.row(i);
            for (j, relation) in row.iter().enumerate().skip(i + 1) {
                if relation.is_violated(li == label_of(j)) {
                    value += 1;
                }
            }
        }
        value
    }

    /// Objective the partition would have with item `pos` relabeled to
    /// `label`, derived from the cached objective in `O(N)`.
    ///
    /// Falls back to [`objective_if_naive`](Self::objective_if_naive) when
    /// nothing is cached. Does not mutate `self`.
    pub fn objective_if(&self, pos: usize, label: usize, matrix: &RelationMatrix) -> usize {
        match self.objective {
            Some(value) if self.labels[pos] == label => value,
            Some(value) => rescored(&self.labels, value, pos, label, matrix),
            None => self.objective_if_naive(pos, label, matrix),
        }
    }

    /// Relabels groups to `0, 1, 2, ...` in order of first appearance.
    ///
    /// Group structure and the cached objective are preserved.
    pub fn normalize(&mut self) {
        if self.normalized {
            return;
        }
        let n = self.labels.len();
        let upper = self.labels.iter().copied().max().map_or(0, |m| m + 1);
        let mut mapping: Vec<Option<usize>> = vec![None; upper.max(n)];
        let mut next = 0;
        for label in &mut self.labels {
            let new = *mapping[*label].get_or_insert_with(|| {
                next += 1;
                next - 1
            });
            *label = new;
        }
        self.normalized = true;
    }

    /// Number of distinct groups.
    pub fn group_count(&self) -> usize {
        let mut labels = self.labels.clone();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }

    /// Size of the most populous group. Normalizes first.
    ///
    /// Returns 0 only for an empty partition.
    pub fn largest_group_size(&mut self) -> usize {
        self.normalize();
        let mut counts = vec![0usize; self.group_count()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts.into_iter().max().unwrap_or(0)
    }

    /// Candidate labels around the label of item `element`.
    ///
    /// The current label is the pivot. With fewer than 5 items the result is
    /// `[lower, current, higher]`; otherwise
    /// `[second lower, lower, current, higher, second higher]`, where
    /// "lower"/"higher" are the nearest distinct labels present in the
    /// partition. Missing lower slots wrap to the largest labels present and
    /// missing higher slots wrap to the smallest ones, so candidates are
    /// always labels that occur in the partition.
    pub fn neighbor_labels(&self, element: usize) -> Vec<usize> {
        let pivot = self.labels[element];
        let mut distinct = self.labels.clone();
        distinct.sort_unstable();
        distinct.dedup();

        // `distinct` is non-empty: it contains `pivot`.
        let at = distinct.partition_point(|&l| l < pivot);
        let below = &distinct[..at];
        let above = &distinct[at + 1..];

        let max = distinct[distinct.len() - 1];
        let max2 = if distinct.len() > 1 {
            distinct[distinct.len() - 2]
        } else {
            max
        };
        let min = distinct[0];
        let min2 = distinct.get(1).copied().unwrap_or(min);

        if self.labels.len() < 5 {
            let lower = below.last().copied().unwrap_or(max);
            let higher = above.first().copied().unwrap_or(min);
            return vec![lower, pivot, higher];
        }

        let (lower2, lower1) = match below {
            [] => (max2, max),
            [only] => (max, *only),
            [.., second, first] => (*second, *first),
        };
        let (higher1, higher2) = match above {
            [] => (min, min2),
            [only] => (*only, min),
            [first, second, ..] => (*first, *second),
        };
        vec![lower2, lower1, pivot, higher1, higher2]
    }

    fn invalidate(&mut self) {
        self.objective = None;
        self.normalized = false;
    }
}

/// Full `O(N²)` objective over unordered pairs.
fn full_objective(labels: &[usize], matrix: &RelationMatrix) -> usize {
    let mut value = 0;
    for (i, &li) in labels.iter().enumerate() {
        let row = matrix.row(i);
        for (j, &lj) in labels.iter().enumerate().skip(i + 1) {
            if row[j].is_violated(li == lj) {
                value += 1;
            }
        }
    }
    value
}

/// Objective after moving `pos` to `label`, given the current `value`.
///
/// Removes the contribution of every pair `(pos, k)` under the old label
/// and adds it back under the new one. `k == pos` is neutral on both sides.
fn rescored(
    labels: &[usize],
    value: usize,
    pos: usize,
    label: usize,
    matrix: &RelationMatrix,
) -> usize {
    let old = labels[pos];
    let row = matrix.row(pos);
    let mut removed = 0;
    let mut added = 0;
    for (k, (&lk, &relation)) in labels.iter().zip(row).enumerate() {
        if k == pos || relation == Relation::Neutral {
            continue;
        }
        if relation.is_violated(old == lk) {
            removed += 1;
        }
        if relation.is_violated(label == lk) {
            added += 1;
        }
    }
    value + added - removed
}
