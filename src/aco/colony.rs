//! Colony execution loop.
//!
//! Each iteration every ant constructs a partition against the same
//! pheromone snapshot, the incumbent is replaced by any strictly better
//! ant, the trail is evaporated and reinforced from this iteration's
//! partitions, and all ants restart from fresh random partitions.

use super::ant::Ant;
use super::config::AcoConfig;
use super::pheromone::PheromoneMatrix;
use crate::error::{ClusterError, Result};
use crate::partition::Partition;
use crate::relation::{RelationDensity, RelationMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Initial value of every pheromone cell.
const INITIAL_PHEROMONE: f64 = 1.0;

/// Lifecycle of a [`Colony`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColonyState {
    /// Constructed, never run.
    Idle,
    /// Inside [`Colony::run`].
    Running,
    /// At least one run has completed; a best solution is stored.
    Solved,
}

/// Result of a colony run.
#[derive(Debug, Clone)]
pub struct AcoResult {
    /// Best partition found, normalized.
    pub best: Partition,

    /// Objective of `best`.
    pub best_cost: usize,

    /// Number of completed iterations.
    pub iterations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Incumbent cost before the first iteration, then after each one.
    pub cost_history: Vec<usize>,
}

/// Ant System for correlation clustering.
///
/// # Examples
///
/// ```
/// use u_corrclust::aco::{AcoConfig, Colony};
/// use u_corrclust::relation::{Relation, RelationMatrix};
///
/// let mut matrix = RelationMatrix::new(4);
/// matrix.set(0, 1, Relation::Attractive);
/// matrix.set(2, 3, Relation::Attractive);
/// matrix.set(0, 2, Relation::Repulsive);
///
/// let config = AcoConfig::default()
///     .with_beta(2.0)
///     .with_max_iterations(20)
///     .with_seed(42);
/// let mut colony = Colony::new(matrix, config).unwrap();
/// let result = colony.run();
/// assert_eq!(result.best_cost, 0);
/// ```
pub struct Colony {
    matrix: RelationMatrix,
    pheromone: PheromoneMatrix,
    ants: Vec<Ant>,
    config: AcoConfig,
    rng: StdRng,
    state: ColonyState,
    solution: Option<Partition>,
}

impl Colony {
    /// Creates a colony over an existing relation matrix.
    ///
    /// Fails with [`ClusterError::InvalidConfiguration`] for an empty matrix
    /// or an invalid configuration.
    pub fn new(matrix: RelationMatrix, config: AcoConfig) -> Result<Self> {
        config.validate()?;
        let rng = create_rng(config.seed);
        Self::with_rng(matrix, config, rng)
    }

    /// Creates a colony over a random matrix of `size` items.
    ///
    /// The matrix is drawn from the colony's own generator, so a seeded
    /// config reproduces the instance as well as the run.
    pub fn generate(size: usize, density: &RelationDensity, config: AcoConfig) -> Result<Self> {
        config.validate()?;
        if size == 0 {
            return Err(ClusterError::config("problem size must be at least 1"));
        }
        let mut rng = create_rng(config.seed);
        let matrix = RelationMatrix::from_generator(size, density, &mut rng)?;
        Self::with_rng(matrix, config, rng)
    }

    /// Creates a colony over a matrix file.
    /// See [`RelationMatrix::from_text`] for the format.
    pub fn from_file(path: impl AsRef<Path>, config: AcoConfig) -> Result<Self> {
        config.validate()?;
        let matrix = RelationMatrix::from_file(path)?;
        Self::new(matrix, config)
    }

    fn with_rng(matrix: RelationMatrix, config: AcoConfig, mut rng: StdRng) -> Result<Self> {
        let size = matrix.size();
        if size == 0 {
            return Err(ClusterError::config("problem size must be at least 1"));
        }

        let ants = (0..config.num_ants)
            .map(|_| Ant::new(&matrix, rng.random()))
            .collect();

        Ok(Self {
            pheromone: PheromoneMatrix::new(size, INITIAL_PHEROMONE),
            matrix,
            ants,
            config,
            rng,
            state: ColonyState::Idle,
            solution: None,
        })
    }

    /// Runs the full iteration budget and returns the best partition found.
    ///
    /// Running an already solved colony performs another run that continues
    /// from the current pheromone trail.
    pub fn run(&mut self) -> AcoResult {
        self.run_with_cancel(None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is checked before each iteration. A cancelled run still
    /// stores its incumbent and leaves the colony [`Solved`](ColonyState::Solved).
    pub fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> AcoResult {
        self.state = ColonyState::Running;
        let config = &self.config;

        info!(
            size = self.matrix.size(),
            ants = config.num_ants,
            alpha = config.alpha,
            beta = config.beta,
            rho = config.rho,
            iterations = config.max_iterations,
            construction = ?config.construction,
            scoring = ?config.scoring,
            "starting ant colony run"
        );

        let mut best = Partition::random(self.matrix.size(), &mut self.rng);
        let mut best_cost = best.compute_objective(&self.matrix);

        let mut cost_history = Vec::with_capacity(config.max_iterations + 1);
        cost_history.push(best_cost);
        let mut iterations = 0usize;
        let mut cancelled = false;

        for iteration in 0..config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            construct_generation(&mut self.ants, &self.matrix, &self.pheromone, config);

            let mut improved = false;
            for (index, ant) in self.ants.iter().enumerate() {
                trace!(iteration, ant = index, cost = ant.cost(), "ant constructed");
                if ant.cost() < best_cost {
                    best = ant.partition().clone();
                    best_cost = ant.cost();
                    improved = true;
                }
            }

            self.pheromone.update(
                config.rho,
                self.ants
                    .iter()
                    .map(|ant| (ant.partition().labels(), ant.cost())),
            );

            for ant in &mut self.ants {
                ant.reset_random(&self.matrix);
            }

            iterations += 1;
            cost_history.push(best_cost);
            debug!(iteration, best_cost, improved, "iteration complete");
        }

        best.normalize();
        info!(best_cost, iterations, cancelled, "ant colony run finished");

        self.solution = Some(best.clone());
        self.state = ColonyState::Solved;

        AcoResult {
            best,
            best_cost,
            iterations,
            cancelled,
            cost_history,
        }
    }

    /// Best partition, running the colony first if it has never been run.
    pub fn best_solution(&mut self) -> Partition {
        match &self.solution {
            Some(solution) => solution.clone(),
            None => self.run().best,
        }
    }

    /// Best partition of the last completed run, if any.
    pub fn solution(&self) -> Option<&Partition> {
        self.solution.as_ref()
    }

    pub fn state(&self) -> ColonyState {
        self.state
    }

    pub fn relation_matrix(&self) -> &RelationMatrix {
        &self.matrix
    }

    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }
}

fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random()),
    }
}

/// Lets every ant construct against the same pheromone snapshot.
#[cfg(feature = "parallel")]
fn construct_generation(
    ants: &mut [Ant],
    matrix: &RelationMatrix,
    pheromone: &PheromoneMatrix,
    config: &AcoConfig,
) {
    use rayon::prelude::*;

    if config.parallel {
        ants.par_iter_mut()
            .for_each(|ant| ant.construct(matrix, pheromone, config));
    } else {
        for ant in ants.iter_mut() {
            ant.construct(matrix, pheromone, config);
        }
    }
}

/// Lets every ant construct against the same pheromone snapshot.
#[cfg(not(feature = "parallel"))]
fn construct_generation(
    ants: &mut [Ant],
    matrix: &RelationMatrix,
    pheromone: &PheromoneMatrix,
    config: &AcoConfig,
) {
    for ant in ants.iter_mut() {
        ant.construct(matrix, pheromone, config);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aco::{Construction, Scoring};
    use crate::relation::Relation;

    /// {0, 1} together, {2, 3} together, 0 and 2 apart.
    fn two_pairs() -> RelationMatrix {
        let mut m = RelationMatrix::new(4);
        m.set(0, 1, Relation::Attractive);
        m.set(2, 3, Relation::Attractive);
        m.set(0, 2, Relation::Repulsive);
        m
    }

    fn two_pairs_config(seed: u64) -> AcoConfig {
        AcoConfig::default()
            .with_num_ants(5)
            .with_alpha(1.0)
            .with_beta(2.0)
            .with_rho(0.5)
            .with_max_iterations(20)
            .with_seed(seed)
    }

    #[test]
    fn test_two_pairs_converges_global() {
        for seed in 0..10 {
            let mut colony = Colony::new(two_pairs(), two_pairs_config(seed)).unwrap();
            let result = colony.run();
            assert_eq!(result.best_cost, 0, "seed {seed} did not reach 0");

            let labels = result.best.labels();
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);
        }
    }

    #[test]
    fn test_two_pairs_converges_local() {
        for seed in 0..10 {
            let config = two_pairs_config(seed).with_construction(Construction::Local);
            let mut colony = Colony::new(two_pairs(), config).unwrap();
            assert_eq!(colony.run().best_cost, 0, "seed {seed} did not reach 0");
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut colony = Colony::new(two_pairs(), two_pairs_config(1)).unwrap();
        assert_eq!(colony.state(), ColonyState::Idle);
        assert!(colony.solution().is_none());

        let best = colony.best_solution();
        assert_eq!(colony.state(), ColonyState::Solved);
        assert_eq!(colony.solution(), Some(&best));

        // Already solved: no new run, same answer.
        assert_eq!(colony.best_solution(), best);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let result = Colony::new(RelationMatrix::new(0), AcoConfig::default());
        assert!(matches!(result, Err(ClusterError::InvalidConfiguration(_))));

        let result = Colony::generate(0, &RelationDensity::default(), AcoConfig::default());
        assert!(matches!(result, Err(ClusterError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Colony::new(two_pairs(), AcoConfig::default().with_num_ants(0));
        assert!(result.is_err());
        let result = Colony::new(two_pairs(), AcoConfig::default().with_max_iterations(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_single_item() {
        let config = AcoConfig::default().with_max_iterations(5).with_seed(3);
        for construction in [Construction::Global, Construction::Local] {
            let mut colony =
                Colony::new(RelationMatrix::new(1), config.clone().with_construction(construction))
                    .unwrap();
            let mut result = colony.run();
            assert_eq!(result.best_cost, 0);
            assert_eq!(result.best.largest_group_size(), 1);
            assert!(colony.pheromone().max().is_finite());
        }
    }

    #[test]
    fn test_history_non_increasing() {
        let config = AcoConfig::default().with_max_iterations(15).with_seed(11);
        let mut colony = Colony::generate(20, &RelationDensity::default(), config).unwrap();
        let result = colony.run();

        assert_eq!(result.iterations, 15);
        assert_eq!(result.cost_history.len(), 16);
        for window in result.cost_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best cost history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
        assert_eq!(result.cost_history.last(), Some(&result.best_cost));
    }

    #[test]
    fn test_improves_on_random_start() {
        for construction in [Construction::Global, Construction::Local] {
            let config = AcoConfig::default()
                .with_construction(construction)
                .with_seed(5);
            let mut colony = Colony::generate(20, &RelationDensity::default(), config).unwrap();
            let result = colony.run();
            assert!(
                result.best_cost < result.cost_history[0],
                "{construction:?}: expected improvement over {}, got {}",
                result.cost_history[0],
                result.best_cost
            );
        }
    }

    #[test]
    fn test_best_matches_matrix() {
        let config = AcoConfig::default().with_seed(8);
        let mut colony = Colony::generate(15, &RelationDensity::new(0.5, 0.3), config).unwrap();
        let result = colony.run();

        assert!(result.best.is_normalized());
        let mut copy = Partition::from_labels(result.best.labels().to_vec());
        assert_eq!(copy.compute_objective(colony.relation_matrix()), result.best_cost);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let config = AcoConfig::default().with_seed(1234);
        let mut a = Colony::generate(12, &RelationDensity::default(), config.clone()).unwrap();
        let mut b = Colony::generate(12, &RelationDensity::default(), config).unwrap();
        assert_eq!(a.relation_matrix(), b.relation_matrix());

        let ra = a.run();
        let rb = b.run();
        assert_eq!(ra.best, rb.best);
        assert_eq!(ra.cost_history, rb.cost_history);
        assert_eq!(a.pheromone(), b.pheromone());
    }

    #[test]
    fn test_naive_scoring_matches_incremental() {
        let base = AcoConfig::default().with_max_iterations(5).with_seed(77);
        for construction in [Construction::Global, Construction::Local] {
            let naive = base
                .clone()
                .with_construction(construction)
                .with_scoring(Scoring::Naive);
            let incremental = naive.clone().with_scoring(Scoring::Incremental);

            let mut a = Colony::generate(10, &RelationDensity::default(), naive).unwrap();
            let mut b = Colony::generate(10, &RelationDensity::default(), incremental).unwrap();
            let ra = a.run();
            let rb = b.run();
            assert_eq!(ra.best, rb.best);
            assert_eq!(ra.cost_history, rb.cost_history);
        }
    }

    #[test]
    fn test_pheromone_stays_positive() {
        let config = AcoConfig::default()
            .with_rho(0.9)
            .with_max_iterations(30)
            .with_seed(2);
        let mut colony = Colony::generate(10, &RelationDensity::default(), config).unwrap();
        colony.run();
        assert!(colony.pheromone().min() > 0.0);
        assert!(colony.pheromone().max().is_finite());
    }

    #[test]
    fn test_full_evaporation_completes() {
        let config = AcoConfig::default()
            .with_rho(1.0)
            .with_max_iterations(10)
            .with_seed(4);
        let mut colony = Colony::generate(8, &RelationDensity::default(), config).unwrap();
        let result = colony.run();
        assert!(result.best.labels().iter().all(|&l| l < 8));
        assert!(colony.pheromone().min() >= 0.0);
    }

    #[test]
    fn test_pheromone_reinforced_from_constructed_partitions() {
        // rho = 1 wipes the initial trail, leaving only this iteration's deposits.
        let config = AcoConfig::default()
            .with_rho(1.0)
            .with_max_iterations(1)
            .with_seed(19);
        let mut colony = Colony::generate(10, &RelationDensity::default(), config).unwrap();
        colony.run();
        let trail = colony.pheromone();

        let row_total = |i: usize| (0..10).map(|l| trail.get(i, l)).sum::<f64>();
        let total = row_total(0);
        assert!(total > 0.0);
        for i in 1..10 {
            assert!(
                (row_total(i) - total).abs() <= 1e-9 * total,
                "row {i} total {} differs from {total}",
                row_total(i)
            );
        }

        // Constructed partitions are normalized: item 0 always carries label 0
        // and item 1 carries label 0 or 1.
        assert!(
            (trail.get(0, 0) - total).abs() <= 1e-9 * total,
            "item 0 deposits landed outside label 0"
        );
        for label in 2..10 {
            assert_eq!(trail.get(1, label), 0.0, "item 1 reinforced at label {label}");
        }
    }

    #[test]
    fn test_rerun_continues() {
        let config = AcoConfig::default().with_max_iterations(5).with_seed(6);
        let mut colony = Colony::generate(10, &RelationDensity::default(), config).unwrap();
        let first = colony.run();
        let trail = colony.pheromone().clone();
        let second = colony.run();
        assert_eq!(second.iterations, 5);
        assert_ne!(colony.pheromone(), &trail);
        assert_eq!(colony.solution(), Some(&second.best));
        assert_eq!(first.iterations, 5);
    }

    #[test]
    fn test_cancellation() {
        let config = AcoConfig::default().with_max_iterations(1000).with_seed(42);
        let mut colony = Colony::generate(10, &RelationDensity::default(), config).unwrap();

        // Set the flag up front so cancellation is deterministic.
        let cancel = Arc::new(AtomicBool::new(true));
        let result = colony.run_with_cancel(Some(cancel));

        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.cost_history.len(), 1);
        assert_eq!(colony.state(), ColonyState::Solved);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!(
            "u_corrclust_colony_{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, two_pairs().to_text()).unwrap();
        let colony = Colony::from_file(&path, two_pairs_config(0));
        std::fs::remove_file(&path).ok();

        let mut colony = colony.unwrap();
        assert_eq!(colony.relation_matrix(), &two_pairs());
        assert_eq!(colony.run().best_cost, 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let config = AcoConfig::default().with_max_iterations(8).with_seed(31);
        let mut seq = Colony::generate(16, &RelationDensity::default(), config.clone()).unwrap();
        let mut par =
            Colony::generate(16, &RelationDensity::default(), config.with_parallel(true)).unwrap();
        let rs = seq.run();
        let rp = par.run();
        assert_eq!(rs.best, rp.best);
        assert_eq!(rs.cost_history, rp.cost_history);
        assert_eq!(seq.pheromone(), par.pheromone());
    }
}
