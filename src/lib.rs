//! Correlation clustering with an Ant Colony Optimization metaheuristic.
//!
//! Items are related pairwise by a symmetric [`RelationMatrix`](relation::RelationMatrix)
//! of attractive, repulsive or neutral relations. A [`Partition`](partition::Partition)
//! assigns every item a group label; its objective counts the attractive
//! pairs it separates plus the repulsive pairs it keeps together. The
//! colony searches for low-objective partitions:
//!
//! - **Relation**: relation values, random instance generation and the
//!   plain-text matrix format.
//! - **Partition**: labels, full and incremental objective evaluation,
//!   normalization and the local candidate neighbourhood.
//! - **ACO**: the Ant System (config, pheromone trail, ants, colony loop).
//! - **Sweep**: grid search over `alpha`, `beta`, `rho` and relation
//!   density with semicolon-separated reports.
//!
//! # Example
//!
//! ```
//! use u_corrclust::aco::{AcoConfig, Colony};
//! use u_corrclust::relation::RelationDensity;
//!
//! let config = AcoConfig::default().with_seed(7);
//! let mut colony = Colony::generate(30, &RelationDensity::default(), config).unwrap();
//! let result = colony.run();
//! assert!(result.best_cost <= result.cost_history[0]);
//! ```

pub mod aco;
pub mod error;
pub mod partition;
pub mod relation;
pub mod sweep;

pub use error::{ClusterError, Result};
