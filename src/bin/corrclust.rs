//! # corrclust
//!
//! Command-line driver for the correlation clustering colony.
//!
//! - `corrclust solve` - generate or load a relation matrix and cluster it
//! - `corrclust sweep` - run a parameter sweep and write a report

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use u_corrclust::aco::{AcoConfig, Colony, Construction, Scoring};
use u_corrclust::relation::RelationDensity;
use u_corrclust::sweep::{run_sweep, write_report, SweepConfig};

/// Correlation clustering with Ant Colony Optimization
#[derive(Parser)]
#[command(name = "corrclust")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster one generated or loaded instance
    #[command(name = "solve")]
    Solve(SolveArgs),

    /// Sweep alpha, beta, rho and the positive ratio over generated instances
    #[command(name = "sweep")]
    Sweep(SweepArgs),
}

/// Colony parameters shared by both commands.
#[derive(Args)]
struct ColonyArgs {
    /// Number of ants
    #[arg(long, default_value_t = 5)]
    ants: usize,

    /// Number of iterations
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Restrict candidate labels to the neighbourhood of the current label
    #[arg(long)]
    local: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl ColonyArgs {
    fn construction(&self) -> Construction {
        if self.local {
            Construction::Local
        } else {
            Construction::Global
        }
    }
}

#[derive(Args)]
struct SolveArgs {
    /// Relation matrix file; a random instance is generated when omitted
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["size", "ratio", "zeros"])]
    input: Option<PathBuf>,

    /// Number of items of the generated instance
    #[arg(long, default_value_t = 200)]
    size: usize,

    /// Probability of an attractive relation among non-neutral pairs
    #[arg(long, default_value_t = 0.7)]
    ratio: f64,

    /// Probability of a neutral relation
    #[arg(long, default_value_t = 0.0)]
    zeros: f64,

    #[command(flatten)]
    colony: ColonyArgs,

    /// Pheromone weight
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Heuristic weight
    #[arg(long, default_value_t = 2.5)]
    beta: f64,

    /// Evaporation rate
    #[arg(long, default_value_t = 0.5)]
    rho: f64,

    /// Recompute the full objective for every candidate
    #[arg(long)]
    naive: bool,

    /// Construct the ants of one iteration on multiple threads
    #[cfg(feature = "parallel")]
    #[arg(long)]
    parallel: bool,

    /// Print the label of every item
    #[arg(long)]
    print_labels: bool,
}

#[derive(Args)]
struct SweepArgs {
    /// Report file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Runs averaged per grid cell
    #[arg(long, default_value_t = 10)]
    trials: usize,

    /// Number of items per generated instance
    #[arg(long, default_value_t = 200)]
    size: usize,

    /// Probability of a neutral relation
    #[arg(long, default_value_t = 0.0)]
    zeros: f64,

    #[command(flatten)]
    colony: ColonyArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Solve(args) => solve(args),
        Commands::Sweep(args) => sweep(args),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}

fn solve(args: SolveArgs) -> Result<()> {
    let mut config = AcoConfig::default()
        .with_num_ants(args.colony.ants)
        .with_max_iterations(args.colony.iterations)
        .with_alpha(args.alpha)
        .with_beta(args.beta)
        .with_rho(args.rho)
        .with_construction(args.colony.construction())
        .with_scoring(if args.naive {
            Scoring::Naive
        } else {
            Scoring::Incremental
        });
    if let Some(seed) = args.colony.seed {
        config = config.with_seed(seed);
    }
    #[cfg(feature = "parallel")]
    {
        config = config.with_parallel(args.parallel);
    }

    let mut colony = match &args.input {
        Some(path) => Colony::from_file(path, config)
            .with_context(|| format!("Failed to load relation matrix from {}", path.display()))?,
        None => {
            let density = RelationDensity::new(args.ratio, args.zeros);
            Colony::generate(args.size, &density, config)
                .context("Failed to generate relation matrix")?
        }
    };

    let start = Instant::now();
    let mut result = colony.run();
    let elapsed = start.elapsed();

    println!("Error: {}", result.best_cost);
    println!("Largest group: {}", result.best.largest_group_size());
    println!("Groups: {}", result.best.group_count());
    println!("Time: {} ms", elapsed.as_millis());

    if args.print_labels {
        let labels: Vec<String> = result.best.labels().iter().map(|l| l.to_string()).collect();
        println!("{}", labels.join(","));
    }

    Ok(())
}

fn sweep(args: SweepArgs) -> Result<()> {
    let mut config = SweepConfig::default()
        .with_size(args.size)
        .with_zero_ratio(args.zeros)
        .with_trials(args.trials)
        .with_num_ants(args.colony.ants)
        .with_max_iterations(args.colony.iterations)
        .with_construction(args.colony.construction());
    if let Some(seed) = args.colony.seed {
        config = config.with_seed(seed);
    }

    let created = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let start = Instant::now();
    let rows = run_sweep(&config).context("Parameter sweep failed")?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    write_report(&mut writer, config.size, &created, &rows)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        rows = rows.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        output = %args.output.display(),
        "sweep report written"
    );
    println!("Wrote {} rows to {}", rows.len(), args.output.display());

    Ok(())
}
