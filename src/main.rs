mod cli;

use std::{env, error::Error, process::ExitCode, sync::Arc};

use clap::Parser;
use knn::Classifier;
use log::{debug, info};
use orchestrator::configs::WORKER_ID_ENV;
use worker::Worker;

use crate::cli::Cli;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let result = if cli.worker {
        run_worker(cli).await
    } else {
        run_coordinator(cli).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("knn-classify: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Classifies the whole test set and prints the amount of correct predictions.
async fn run_coordinator(cli: Cli) -> Result<(), BoxError> {
    let training = orchestrator::load_dataset(&cli.training, cli.dim)?;
    let testing = orchestrator::load_dataset(&cli.testing, cli.dim)?;

    let program = env::current_exe()?;
    let config = cli.run_config(program);
    debug!("run config: {config:?}");

    let summary = orchestrator::classify(config, Arc::new(training), Arc::new(testing)).await?;

    println!("{}", summary.total_correct);
    if let Some(accuracy) = summary.accuracy() {
        info!(
            "accuracy {:.2}% ({} of {})",
            accuracy * 100.0,
            summary.total_correct,
            summary.test_count
        );
    }

    Ok(())
}

/// Serves one partition over stdin and stdout, the datasets are loaded from disk.
async fn run_worker(cli: Cli) -> Result<(), BoxError> {
    let worker_id: usize = match env::var(WORKER_ID_ENV) {
        Ok(id) => id.parse()?,
        Err(_) => 0,
    };

    let training = orchestrator::load_dataset(&cli.training, cli.dim)?;
    let testing = orchestrator::load_dataset(&cli.testing, cli.dim)?;
    debug!(worker_id = worker_id; "datasets loaded");

    let (rx, tx) = comms::channel(tokio::io::stdin(), tokio::io::stdout());
    let worker = Worker::new(
        worker_id,
        Classifier::new(cli.k, cli.metric),
        Arc::new(training),
        Arc::new(testing),
    );

    worker.run(rx, tx).await?;
    Ok(())
}
