//! Ant Colony Optimization (ACO) for correlation clustering.
//!
//! A fixed population of ants repeatedly builds partitions of the items.
//! Each ant relabels items one at a time, weighing every candidate label by
//! the pheromone trail (learned from earlier iterations) and by the inverse
//! objective the partition would have with that label (heuristic
//! desirability). After all ants have built their partitions the trail
//! evaporates and is reinforced by `1 / objective` of every ant on the
//! `(item, label)` cells it used.
//!
//! # Key Types
//!
//! - [`AcoConfig`]: population size, `alpha`, `beta`, `rho`, iterations and
//!   construction/scoring policies
//! - [`Colony`]: owns the relation matrix, the trail and the ants; runs the loop
//! - [`Ant`]: one construction agent
//! - [`PheromoneMatrix`]: the shared trail
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a
//!   Colony of Cooperating Agents", *IEEE Trans. SMC-B* 26(1), 29–41
//! - Bansal, Blum & Chawla (2004), "Correlation Clustering",
//!   *Machine Learning* 56, 89–113

mod ant;
mod colony;
mod config;
mod pheromone;

pub use ant::Ant;
pub use colony::{AcoResult, Colony, ColonyState};
pub use config::{AcoConfig, Construction, Scoring};
pub use pheromone::{reciprocal, PheromoneMatrix, ZERO_COST_RECIPROCAL};
