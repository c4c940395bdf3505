use std::sync::Arc;

use futures::future::join_all;
use knn::Dataset;
use log::{debug, info, warn};
use worker::Worker;

use crate::{
    OrchestratorError,
    configs::{Isolation, RunConfig},
    handle::WorkerHandle,
    planner,
};

type Result<T> = std::result::Result<T, OrchestratorError>;

/// The steps a run goes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Planning,
    Dispatching,
    Collecting,
    Reducing,
    Done,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_correct: u64,
    pub test_count: usize,
    /// Correct counts in worker creation order.
    pub per_worker: Vec<u64>,
}

impl RunSummary {
    /// Fraction of test items classified correctly, `None` for an empty test set.
    pub fn accuracy(&self) -> Option<f64> {
        (self.test_count > 0).then(|| self.total_correct as f64 / self.test_count as f64)
    }
}

/// Coordinates one classification run over a fixed pool of workers.
///
/// Every worker gets exactly one partition of the test set and answers with
/// exactly one result. No partial totals are reported: the run either
/// accounts for every worker or fails.
pub struct Session {
    config: RunConfig,
    reference: Arc<Dataset>,
    queries: Arc<Dataset>,
    phase: Phase,
}

impl Session {
    /// Creates a new `Session`.
    ///
    /// # Args
    /// * `config` - The run parameters.
    /// * `reference` - The labeled training set.
    /// * `queries` - The labeled test set.
    ///
    /// # Errors
    /// Returns `OrchestratorError::InvalidConfig` if the datasets cannot be
    /// classified against each other.
    pub fn new(config: RunConfig, reference: Arc<Dataset>, queries: Arc<Dataset>) -> Result<Self> {
        if reference.is_empty() && !queries.is_empty() {
            return Err(OrchestratorError::InvalidConfig(
                "the training set is empty but the test set is not".into(),
            ));
        }

        if reference.dim() != queries.dim() {
            return Err(OrchestratorError::InvalidConfig(format!(
                "training items have {} features but test items have {}",
                reference.dim(),
                queries.dim()
            )));
        }

        Ok(Self {
            config,
            reference,
            queries,
            phase: Phase::Init,
        })
    }

    /// Runs the whole classification and returns its summary.
    ///
    /// # Errors
    /// Returns an `OrchestratorError` if any worker fails to start, its
    /// channel fails or it terminates abnormally.
    pub async fn run(mut self) -> Result<RunSummary> {
        let test_count = self.queries.count();

        self.enter(Phase::Planning);
        let partitions = planner::plan(test_count, self.config.workers);

        self.enter(Phase::Dispatching);
        let mut handles = Vec::with_capacity(partitions.len());
        for (worker_id, partition) in partitions.into_iter().enumerate() {
            let mut handle = match self.spawn_worker(worker_id) {
                Ok(handle) => handle,
                Err(e) => {
                    abort_all(&mut handles);
                    return Err(e);
                }
            };
            debug!(worker_id = worker_id, start = partition.start, len = partition.len; "dispatching partition");

            if let Err(e) = handle.dispatch(partition).await {
                let err = classify_fault(&mut handle, e).await;
                abort_all(&mut handles);
                return Err(err);
            }
            handles.push(handle);
        }

        self.enter(Phase::Collecting);
        let mut per_worker = Vec::with_capacity(handles.len());
        for idx in 0..handles.len() {
            let handle = &mut handles[idx];
            match handle.collect().await {
                Ok(result) => {
                    debug!(worker_id = handle.worker_id(), correct = result.correct_count; "collected result");
                    per_worker.push(result.correct_count);
                }
                Err(e) => {
                    let err = classify_fault(handle, e).await;
                    abort_all(&mut handles);
                    return Err(err);
                }
            }
        }

        self.enter(Phase::Reducing);
        let total_correct: u64 = per_worker.iter().sum();

        self.enter(Phase::Done);
        let statuses = join_all(handles.iter_mut().map(|h| h.wait())).await;
        for (handle, status) in handles.iter().zip(statuses) {
            if let Err(reason) = status {
                return Err(OrchestratorError::WorkerAbnormalTermination {
                    worker_id: handle.worker_id(),
                    reason,
                });
            }
        }

        info!(total_correct = total_correct, test_count = test_count; "run finished");
        Ok(RunSummary {
            total_correct,
            test_count,
            per_worker,
        })
    }

    fn enter(&mut self, phase: Phase) {
        debug!("session phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn spawn_worker(&self, worker_id: usize) -> Result<WorkerHandle> {
        match &self.config.isolation {
            Isolation::Task => {
                let worker = Worker::new(
                    worker_id,
                    self.config.classifier(),
                    Arc::clone(&self.reference),
                    Arc::clone(&self.queries),
                );
                Ok(WorkerHandle::spawn_task(worker_id, worker))
            }
            Isolation::Process(spec) => WorkerHandle::spawn_process(worker_id, spec)
                .map_err(|source| OrchestratorError::Spawn { worker_id, source }),
        }
    }
}

/// Stops every worker still running.
fn abort_all(handles: &mut [WorkerHandle]) {
    for handle in handles {
        handle.abort();
    }
}

/// Tells a dead worker apart from a broken channel by the worker's termination status.
async fn classify_fault(handle: &mut WorkerHandle, source: std::io::Error) -> OrchestratorError {
    let worker_id = handle.worker_id();
    warn!(worker_id = worker_id; "channel fault: {source}");

    match handle.wait().await {
        Err(reason) => OrchestratorError::WorkerAbnormalTermination { worker_id, reason },
        Ok(()) => OrchestratorError::ChannelFault { worker_id, source },
    }
}

#[cfg(test)]
mod tests {
    use std::{io, num::NonZeroUsize};

    use comms::Partition;
    use knn::{Classifier, DistanceMetric};

    use super::*;

    fn failing_task_worker(worker_id: usize) -> WorkerHandle {
        let reference = Dataset::from_items(2, [(0, [0.0_f32, 0.0])]).unwrap();
        let queries = Dataset::from_items(1, [(0, [0.0_f32])]).unwrap();
        let classifier = Classifier::new(NonZeroUsize::MIN, DistanceMetric::Euclidean);
        let worker = Worker::new(worker_id, classifier, Arc::new(reference), Arc::new(queries));
        WorkerHandle::spawn_task(worker_id, worker)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_task_worker_is_abnormal_termination() {
        let mut handle = failing_task_worker(5);
        handle.dispatch(Partition::new(0, 1)).await.unwrap();
        let source = handle.collect().await.unwrap_err();

        match classify_fault(&mut handle, source).await {
            OrchestratorError::WorkerAbnormalTermination { worker_id, reason } => {
                assert_eq!(worker_id, 5);
                assert!(reason.contains("classification failed"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn aborted_task_worker_is_abnormal_termination() {
        let mut handles = vec![failing_task_worker(0), failing_task_worker(1)];
        abort_all(&mut handles);

        let source = io::Error::from(io::ErrorKind::UnexpectedEof);
        let err = classify_fault(&mut handles[1], source).await;
        assert!(
            matches!(err, OrchestratorError::WorkerAbnormalTermination { worker_id: 1, .. }),
            "{err}"
        );
    }

    #[test]
    fn accuracy_of_empty_run_is_undefined() {
        let summary = RunSummary {
            total_correct: 0,
            test_count: 0,
            per_worker: vec![0, 0],
        };
        assert_eq!(summary.accuracy(), None);
    }

    #[test]
    fn accuracy_is_the_correct_fraction() {
        let summary = RunSummary {
            total_correct: 3,
            test_count: 4,
            per_worker: vec![2, 1],
        };
        assert_eq!(summary.accuracy(), Some(0.75));
    }
}
