use archopt::experiments::{
    plot_goldstein, plot_goldstein_levels, run_effectiveness, run_effectiveness_analytical,
    run_effectiveness_analytical_mo, BenchmarkProblem, EffectivenessConfig, DEFAULT_RESULTS_DIR,
};
use archopt::algos::{ConstraintStrategy, SurrogateKind};
use archopt::problems::GOLDSTEIN_GRID_SIZE;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compares the registered algorithms on a benchmark problem
    Effectiveness {
        /// Benchmark problem, the predefined analytical experiments are run when omitted
        #[arg(short, long, value_enum)]
        problem: Option<BenchmarkProblem>,
        /// Number of infill points per iteration
        #[arg(long, default_value_t = 1)]
        n_infill: usize,
        /// Number of repetitions per algorithm
        #[arg(long, default_value_t = 8)]
        n_repeat: usize,
        /// Number of worker threads
        #[arg(long, default_value_t = 1)]
        n_workers: usize,
        /// Evaluation budget of each trial
        #[arg(long)]
        n_eval_max: Option<usize>,
        /// Compared algorithms, all the registered ones when omitted
        #[arg(short, long)]
        algorithms: Vec<String>,
        /// Surrogate model of the surrogate based algorithms: KRG, KRG-M52 or KRG-Q
        #[arg(long, default_value = "KRG")]
        surrogate: String,
        /// Minimum probability of feasibility of the infill candidates
        #[arg(long)]
        min_pof: Option<f64>,
        /// Uses the predicted constraint mean values instead of the probability of feasibility
        #[arg(long, conflicts_with = "min_pof")]
        mean_constraints: bool,
        /// Only reports previously stored results
        #[arg(long)]
        no_run: bool,
        /// Results folder
        #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
        results_dir: PathBuf,
    },
    /// Plots the Goldstein function at given discrete levels, all levels when omitted
    Goldstein {
        #[arg(long, requires = "z2")]
        z1: Option<usize>,
        #[arg(long, requires = "z1")]
        z2: Option<usize>,
        /// Grid size
        #[arg(short, long, default_value_t = GOLDSTEIN_GRID_SIZE)]
        n: usize,
        #[arg(short, long, default_value = DEFAULT_RESULTS_DIR)]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Effectiveness {
            problem,
            n_infill,
            n_repeat,
            n_workers,
            n_eval_max,
            algorithms,
            surrogate,
            min_pof,
            mean_constraints,
            no_run,
            results_dir,
        } => {
            let constraint_strategy = match (mean_constraints, min_pof) {
                (true, _) => ConstraintStrategy::MeanValue,
                (false, Some(min_pof)) => ConstraintStrategy::ProbabilityOfFeasibility { min_pof },
                (false, None) => ConstraintStrategy::default(),
            };
            let config = EffectivenessConfig {
                results_dir,
                n_repeat,
                n_workers,
                algorithms,
                n_eval_max,
                surrogate: surrogate.parse::<SurrogateKind>()?,
                constraint_strategy,
                ..Default::default()
            };
            let do_run = !no_run;
            let figures = match problem {
                Some(problem) => {
                    let key = format!("eff_{}_{n_infill}", problem.key());
                    run_effectiveness(problem.instance(), &key, n_infill, do_run, &config)?
                }
                None => {
                    let mut figures = run_effectiveness_analytical(&config, do_run)?;
                    figures.extend(run_effectiveness_analytical_mo(&config, do_run)?);
                    figures
                }
            };
            info!("{} figures generated", figures.len());
        }
        Command::Goldstein { z1, z2, n, out } => match (z1, z2) {
            (Some(z1), Some(z2)) => {
                plot_goldstein(z1, z2, n, &out)?;
            }
            _ => {
                plot_goldstein_levels(n, &out)?;
            }
        },
    }
    Ok(())
}
