use std::sync::Arc;

use comms::{OnoReceiver, OnoSender, Partition, WorkerResult};
use knn::{Classifier, Dataset};
use log::{debug, info};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    task,
};

use crate::{Result, WorkerErr};

/// Test items classified per blocking call.
const CLASSIFY_CHUNK: usize = 256;

/// Classifies one partition of the test set and reports how many predictions were right.
///
/// A worker serves exactly one assignment: it waits for a single `Partition`,
/// answers with a single `WorkerResult` and then closes its channel.
pub struct Worker {
    worker_id: usize,
    classifier: Classifier,
    reference: Arc<Dataset>,
    queries: Arc<Dataset>,
}

impl Worker {
    /// Creates a new worker.
    ///
    /// # Args
    /// * `worker_id` - Identifier used for observability.
    /// * `classifier` - The k and metric to classify with.
    /// * `reference` - The labeled training set.
    /// * `queries` - The full labeled test set, the partition indexes into it.
    pub fn new(
        worker_id: usize,
        classifier: Classifier,
        reference: Arc<Dataset>,
        queries: Arc<Dataset>,
    ) -> Self {
        Self {
            worker_id,
            classifier,
            reference,
            queries,
        }
    }

    /// Receives a partition, classifies it and sends back the correct count.
    ///
    /// # Args
    /// * `rx` - Receiving end of the coordinator channel.
    /// * `tx` - Sending end of the coordinator channel.
    ///
    /// # Returns
    /// The result that was sent to the coordinator.
    ///
    /// # Errors
    /// Returns `WorkerErr` on channel faults, an out of range partition or a
    /// classification failure. No result is sent in that case.
    pub async fn run<R, W>(self, mut rx: OnoReceiver<R>, mut tx: OnoSender<W>) -> Result<WorkerResult>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let worker_id = self.worker_id;

        let partition: Partition = rx.recv().await?;
        debug!(worker_id = worker_id, start = partition.start, len = partition.len; "received partition");
        drop(rx);

        let result = self.classify_partition(partition).await?;

        tx.send(&result).await?;
        tx.close().await?;
        info!(worker_id = worker_id, correct = result.correct_count; "result sent");

        Ok(result)
    }

    /// Classifies every test item in `partition` on blocking threads.
    ///
    /// The partition is classified in chunks of `CLASSIFY_CHUNK` items, so
    /// aborting the task stops the work at the next chunk boundary.
    ///
    /// # Errors
    /// Returns `WorkerErr::PartitionOutOfRange` if `partition` reaches past the test set.
    pub async fn classify_partition(&self, partition: Partition) -> Result<WorkerResult> {
        let count = self.queries.count();
        if partition.end() > count {
            return Err(WorkerErr::PartitionOutOfRange { partition, count });
        }

        if partition.is_empty() {
            return Ok(WorkerResult::new(0));
        }

        let mut correct_count = 0;
        for start in partition.range().step_by(CLASSIFY_CHUNK) {
            let chunk = start..partition.end().min(start + CLASSIFY_CHUNK);
            let classifier = self.classifier;
            let reference = Arc::clone(&self.reference);
            let queries = Arc::clone(&self.queries);

            correct_count += task::spawn_blocking(move || {
                classifier.count_correct(&queries, chunk, &reference)
            })
            .await
            .map_err(|e| WorkerErr::Panicked(e.to_string()))??;
        }

        Ok(WorkerResult::new(correct_count))
    }
}
