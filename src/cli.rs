use std::{ffi::OsString, num::NonZeroUsize, path::PathBuf};

use clap::{Parser, ValueEnum};
use knn::{DEFAULT_DIM, DistanceMetric, MAX_DIM, check_dim};
use orchestrator::configs::{Isolation, ProcessSpec, RunConfig};

#[derive(Debug, Parser)]
#[command(name = "knn-classify")]
#[command(about = "Classify a labeled test set against a training set with parallel k-nearest-neighbor workers")]
#[command(version)]
pub struct Cli {
    /// Log debug diagnostics and the accuracy of the run to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of neighbors that vote on each label
    #[arg(short = 'K', default_value = "1")]
    pub k: NonZeroUsize,

    /// Distance metric, any prefix of `euclidean` or `cosine`
    #[arg(short = 'd', default_value = "euclidean")]
    pub metric: DistanceMetric,

    /// Number of workers the test set is split across
    #[arg(short = 'p', default_value = "1")]
    pub workers: NonZeroUsize,

    /// Features per item in both datasets
    #[arg(long, default_value_t = DEFAULT_DIM, value_parser = parse_dim)]
    pub dim: usize,

    /// How workers are isolated from the coordinator
    #[arg(long, value_enum, default_value_t = IsolationArg::Task)]
    pub isolation: IsolationArg,

    /// Run as a single worker process talking over stdin and stdout
    #[arg(long, hide = true)]
    pub worker: bool,

    /// Training dataset file
    pub training: PathBuf,

    /// Testing dataset file
    pub testing: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IsolationArg {
    /// Workers are tasks inside this process
    Task,
    /// Workers are child processes
    Process,
}

fn parse_dim(value: &str) -> Result<usize, String> {
    let dim = value
        .parse()
        .map_err(|_| format!("expected an integer between 1 and {MAX_DIM}"))?;
    check_dim(dim).map_err(|e| e.to_string())
}

impl Cli {
    /// The default log filter, `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }

    /// Builds the run configuration, `program` is re-invoked for process workers.
    pub fn run_config(&self, program: PathBuf) -> RunConfig {
        let isolation = match self.isolation {
            IsolationArg::Task => Isolation::Task,
            IsolationArg::Process => {
                Isolation::Process(ProcessSpec::new(program).args(self.worker_args()))
            }
        };

        RunConfig {
            k: self.k,
            metric: self.metric,
            workers: self.workers,
            isolation,
        }
    }

    /// Arguments that start a worker process with this run's parameters.
    fn worker_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--worker".into(),
            "-K".into(),
            self.k.to_string().into(),
            "-d".into(),
            self.metric.to_string().into(),
            "--dim".into(),
            self.dim.to_string().into(),
        ];

        if self.verbose {
            args.push("-v".into());
        }

        args.push(self.training.clone().into());
        args.push(self.testing.clone().into());
        args
    }
}
