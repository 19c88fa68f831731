//! Parameter sweeps.
//!
//! Runs the colony over a grid of `alpha × beta × rho × ratio` values on
//! freshly generated instances and averages, per grid cell, the size of the
//! largest group and the objective of the best partition. Reports are
//! semicolon-separated:
//!
//! ```text
//! # Created on <timestamp>
//! # Size of the problem: <size>
//! ratio;alpha;beta;rho;avgsize;error
//! 0.70;1.0;2.5;0.5;3.2;57.4
//! ```

use crate::aco::{AcoConfig, Colony, Construction};
use crate::error::{ClusterError, Result};
use crate::relation::RelationDensity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tracing::{debug, info};

/// Grid and fixed parameters of a sweep.
///
/// The default grid is `alpha ∈ {0, 0.625, …, 2.5}`, `beta ∈ {0, 0.5, …, 2}`,
/// `rho ∈ {0, 0.25, …, 1}` and `ratio ∈ {0, 0.05, …, 1}` with 10 trials per
/// cell on 200-item instances.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepConfig {
    /// Number of items per generated instance.
    pub size: usize,
    /// Probability of a neutral relation in generated instances.
    pub zero_ratio: f64,
    /// Independent runs averaged per grid cell.
    pub trials: usize,
    pub num_ants: usize,
    pub max_iterations: usize,
    pub construction: Construction,
    pub alphas: Vec<f64>,
    pub betas: Vec<f64>,
    pub rhos: Vec<f64>,
    /// Positive ratios of the generated instances.
    pub ratios: Vec<f64>,
    /// Seed for the per-trial seeds. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            size: 200,
            zero_ratio: 0.0,
            trials: 10,
            num_ants: 5,
            max_iterations: 10,
            construction: Construction::Global,
            alphas: steps(5, 0.625),
            betas: steps(5, 0.5),
            rhos: steps(5, 0.25),
            ratios: steps(21, 0.05),
            seed: None,
        }
    }
}

fn steps(count: usize, step: f64) -> Vec<f64> {
    (0..count).map(|i| i as f64 * step).collect()
}

impl SweepConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_zero_ratio(mut self, zero_ratio: f64) -> Self {
        self.zero_ratio = zero_ratio;
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_num_ants(mut self, n: usize) -> Self {
        self.num_ants = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    pub fn with_alphas(mut self, alphas: Vec<f64>) -> Self {
        self.alphas = alphas;
        self
    }

    pub fn with_betas(mut self, betas: Vec<f64>) -> Self {
        self.betas = betas;
        self
    }

    pub fn with_rhos(mut self, rhos: Vec<f64>) -> Self {
        self.rhos = rhos;
        self
    }

    pub fn with_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.ratios = ratios;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of grid cells.
    pub fn cell_count(&self) -> usize {
        self.alphas.len() * self.betas.len() * self.rhos.len() * self.ratios.len()
    }

    /// Validates the grid and every colony configuration it produces.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(ClusterError::config("size must be at least 1"));
        }
        if self.trials == 0 {
            return Err(ClusterError::config("trials must be at least 1"));
        }
        if self.cell_count() == 0 {
            return Err(ClusterError::config("sweep grid is empty"));
        }
        for &ratio in &self.ratios {
            RelationDensity::new(ratio, self.zero_ratio).validate()?;
        }
        for &alpha in &self.alphas {
            for &beta in &self.betas {
                for &rho in &self.rhos {
                    self.colony_config(alpha, beta, rho, 0).validate()?;
                }
            }
        }
        Ok(())
    }

    fn colony_config(&self, alpha: f64, beta: f64, rho: f64, seed: u64) -> AcoConfig {
        AcoConfig::default()
            .with_num_ants(self.num_ants)
            .with_max_iterations(self.max_iterations)
            .with_alpha(alpha)
            .with_beta(beta)
            .with_rho(rho)
            .with_construction(self.construction)
            .with_seed(seed)
    }
}

/// Averages for one grid cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepRow {
    pub ratio: f64,
    pub alpha: f64,
    pub beta: f64,
    pub rho: f64,
    /// Mean size of the largest group of the best partition.
    pub avg_size: f64,
    /// Mean objective of the best partition.
    pub avg_error: f64,
}

/// Runs the sweep. Rows come out in `alpha`, `beta`, `rho`, `ratio` order,
/// `ratio` varying fastest.
pub fn run_sweep(config: &SweepConfig) -> Result<Vec<SweepRow>> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random()),
    };

    info!(
        cells = config.cell_count(),
        trials = config.trials,
        size = config.size,
        "starting parameter sweep"
    );

    let mut rows = Vec::with_capacity(config.cell_count());
    for &alpha in &config.alphas {
        for &beta in &config.betas {
            for &rho in &config.rhos {
                for &ratio in &config.ratios {
                    let density = RelationDensity::new(ratio, config.zero_ratio);
                    let mut size_sum = 0.0;
                    let mut error_sum = 0.0;

                    for _ in 0..config.trials {
                        let aco = config.colony_config(alpha, beta, rho, rng.random());
                        let mut colony = Colony::generate(config.size, &density, aco)?;
                        let mut result = colony.run();
                        size_sum += result.best.largest_group_size() as f64;
                        error_sum += result.best_cost as f64;
                    }

                    let row = SweepRow {
                        ratio,
                        alpha,
                        beta,
                        rho,
                        avg_size: size_sum / config.trials as f64,
                        avg_error: error_sum / config.trials as f64,
                    };
                    debug!(?row, "sweep cell done");
                    rows.push(row);
                }
            }
        }
    }

    info!(rows = rows.len(), "parameter sweep finished");
    Ok(rows)
}

/// Writes a sweep report.
///
/// `created` is written verbatim into the first comment line.
pub fn write_report<W: Write>(
    writer: &mut W,
    size: usize,
    created: &str,
    rows: &[SweepRow],
) -> Result<()> {
    writeln!(writer, "# Created on {created}")?;
    writeln!(writer, "# Size of the problem: {size}")?;
    writeln!(writer, "ratio;alpha;beta;rho;avgsize;error")?;
    for row in rows {
        writeln!(
            writer,
            "{:.2};{:?};{:?};{:?};{:?};{:?}",
            row.ratio, row.alpha, row.beta, row.rho, row.avg_size, row.avg_error
        )?;
    }
    writer.flush()?;
    Ok(())
}
