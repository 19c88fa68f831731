//! ACO configuration.

use crate::error::{ClusterError, Result};

/// Which labels an ant considers for each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Construction {
    /// Every label in `[0, N)` is a candidate.
    #[default]
    Global,

    /// Only the labels next to the item's current label are candidates:
    /// 3 of them when `N < 5`, otherwise 5.
    /// See [`Partition::neighbor_labels`](crate::partition::Partition::neighbor_labels).
    Local,
}

/// How candidate objectives are computed during construction.
///
/// Both variants produce identical partitions; they only differ in cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scoring {
    /// Full `O(N²)` recomputation per candidate.
    Naive,

    /// `O(N)` delta against the cached objective.
    #[default]
    Incremental,
}

/// Configuration for the ant colony.
///
/// # Examples
///
/// ```
/// use u_corrclust::aco::{AcoConfig, Construction};
///
/// let config = AcoConfig::default()
///     .with_num_ants(10)
///     .with_alpha(1.0)
///     .with_beta(2.0)
///     .with_rho(0.3)
///     .with_construction(Construction::Local)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoConfig {
    /// Number of ants constructing a partition per iteration.
    pub num_ants: usize,

    /// Number of construct/reinforce/evaporate rounds.
    pub max_iterations: usize,

    /// Pheromone weight. `0` ignores the pheromone trail entirely.
    pub alpha: f64,

    /// Heuristic weight applied to `1 / objective`.
    pub beta: f64,

    /// Evaporation rate in `[0, 1]`. Each round keeps `1 - rho` of the trail.
    pub rho: f64,

    /// Candidate label policy.
    pub construction: Construction,

    /// Candidate scoring policy.
    pub scoring: Scoring,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,

    /// Construct the ants of one iteration concurrently.
    ///
    /// Only honored with the `parallel` feature. Results are identical to
    /// sequential construction.
    pub parallel: bool,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            num_ants: 5,
            max_iterations: 10,
            alpha: 1.0,
            beta: 2.5,
            rho: 0.5,
            construction: Construction::default(),
            scoring: Scoring::default(),
            seed: None,
            parallel: false,
        }
    }
}

impl AcoConfig {
    pub fn with_num_ants(mut self, n: usize) -> Self {
        self.num_ants = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.num_ants == 0 {
            return Err(ClusterError::config("num_ants must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::config("max_iterations must be at least 1"));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ClusterError::config(format!(
                "alpha must be finite and non-negative, got {}",
                self.alpha
            )));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(ClusterError::config(format!(
                "beta must be finite and non-negative, got {}",
                self.beta
            )));
        }
        if !(0.0..=1.0).contains(&self.rho) {
            return Err(ClusterError::config(format!(
                "rho must be in [0, 1], got {}",
                self.rho
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AcoConfig::default();
        assert_eq!(config.num_ants, 5);
        assert_eq!(config.max_iterations, 10);
        assert!((config.alpha - 1.0).abs() < 1e-10);
        assert!((config.beta - 2.5).abs() < 1e-10);
        assert!((config.rho - 0.5).abs() < 1e-10);
        assert_eq!(config.construction, Construction::Global);
        assert_eq!(config.scoring, Scoring::Incremental);
        assert!(config.seed.is_none());
        assert!(!config.parallel);
    }

    #[test]
    fn test_builder_pattern() {
        let config = AcoConfig::default()
            .with_num_ants(8)
            .with_max_iterations(40)
            .with_alpha(0.625)
            .with_beta(2.0)
            .with_rho(0.25)
            .with_construction(Construction::Local)
            .with_scoring(Scoring::Naive)
            .with_seed(7)
            .with_parallel(true);

        assert_eq!(config.num_ants, 8);
        assert_eq!(config.max_iterations, 40);
        assert!((config.alpha - 0.625).abs() < 1e-10);
        assert!((config.beta - 2.0).abs() < 1e-10);
        assert!((config.rho - 0.25).abs() < 1e-10);
        assert_eq!(config.construction, Construction::Local);
        assert_eq!(config.scoring, Scoring::Naive);
        assert_eq!(config.seed, Some(7));
        assert!(config.parallel);
    }

    #[test]
    fn test_validate_ok() {
        assert!(AcoConfig::default().validate().is_ok());
        // Boundary values used by the parameter sweep.
        let config = AcoConfig::default().with_alpha(0.0).with_beta(0.0).with_rho(1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ants() {
        let config = AcoConfig::default().with_num_ants(0);
        assert!(matches!(
            config.validate(),
            Err(ClusterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_zero_iterations() {
        let config = AcoConfig::default().with_max_iterations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_weights() {
        assert!(AcoConfig::default().with_alpha(-1.0).validate().is_err());
        assert!(AcoConfig::default().with_beta(f64::NAN).validate().is_err());
        assert!(AcoConfig::default().with_beta(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_validate_bad_rho() {
        assert!(AcoConfig::default().with_rho(1.5).validate().is_err());
        assert!(AcoConfig::default().with_rho(-0.1).validate().is_err());
    }
}
