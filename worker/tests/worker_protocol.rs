use std::{io, num::NonZeroUsize, sync::Arc};

use comms::{OnoReceiver, OnoSender, Partition, WorkerResult};
use knn::{Classifier, Dataset, DistanceMetric, KnnErr};
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use worker::{Worker, WorkerErr};

type End = (
    OnoReceiver<ReadHalf<DuplexStream>>,
    OnoSender<WriteHalf<DuplexStream>>,
);

fn channel_pair() -> (End, End) {
    let (stream1, stream2) = tokio::io::duplex(4096);
    let (rx1, tx1) = tokio::io::split(stream1);
    let (rx2, tx2) = tokio::io::split(stream2);
    (comms::channel(rx1, tx1), comms::channel(rx2, tx2))
}

fn mk_worker(k: usize) -> Worker {
    let reference = Dataset::from_items(
        2,
        [
            (0, [0.0_f32, 0.0]),
            (0, [1.0, 0.0]),
            (1, [10.0, 10.0]),
            (1, [11.0, 10.0]),
        ],
    )
    .unwrap();

    // The last item is deliberately mislabeled.
    let queries = Dataset::from_items(
        2,
        [
            (0, [0.5_f32, 0.5]),
            (1, [9.0, 9.0]),
            (0, [0.0, 1.0]),
            (0, [10.0, 11.0]),
        ],
    )
    .unwrap();

    let classifier = Classifier::new(NonZeroUsize::new(k).unwrap(), DistanceMetric::Euclidean);
    Worker::new(0, classifier, Arc::new(reference), Arc::new(queries))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_reports_correct_count_for_its_partition() -> io::Result<()> {
    let ((mut coord_rx, mut coord_tx), (wk_rx, wk_tx)) = channel_pair();

    let worker_task = tokio::spawn(mk_worker(1).run(wk_rx, wk_tx));

    coord_tx.send(&Partition::new(1, 3)).await?;
    let result: WorkerResult = coord_rx.recv().await?;
    assert_eq!(result.correct_count, 2);

    let returned = worker_task.await.unwrap().unwrap();
    assert_eq!(returned, result);

    // The worker closes its side once the result is out.
    let err = coord_rx.recv::<WorkerResult>().await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_partition_reports_zero() -> io::Result<()> {
    let ((mut coord_rx, mut coord_tx), (wk_rx, wk_tx)) = channel_pair();

    let worker_task = tokio::spawn(mk_worker(3).run(wk_rx, wk_tx));

    coord_tx.send(&Partition::new(4, 0)).await?;
    let result: WorkerResult = coord_rx.recv().await?;
    assert_eq!(result.correct_count, 0);

    worker_task.await.unwrap().unwrap();
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_rejects_out_of_range_partition() -> io::Result<()> {
    let ((mut coord_rx, mut coord_tx), (wk_rx, wk_tx)) = channel_pair();

    let worker_task = tokio::spawn(mk_worker(1).run(wk_rx, wk_tx));

    coord_tx.send(&Partition::new(2, 3)).await?;

    let res = worker_task.await.unwrap();
    assert!(matches!(
        res,
        Err(WorkerErr::PartitionOutOfRange { count: 4, .. })
    ));

    // No result was emitted before the worker went away.
    assert!(coord_rx.recv::<WorkerResult>().await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_fails_when_coordinator_hangs_up() {
    let ((coord_rx, coord_tx), (wk_rx, wk_tx)) = channel_pair();
    drop((coord_rx, coord_tx));

    let res = mk_worker(1).run(wk_rx, wk_tx).await;
    match res {
        Err(WorkerErr::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn classification_errors_surface_as_worker_errors() {
    let reference = Dataset::from_items(3, [(0, [0.0_f32, 0.0, 0.0])]).unwrap();
    let queries = Dataset::from_items(2, [(0, [0.0_f32, 0.0])]).unwrap();
    let classifier = Classifier::new(NonZeroUsize::MIN, DistanceMetric::Cosine);
    let worker = Worker::new(7, classifier, Arc::new(reference), Arc::new(queries));

    let res = worker.classify_partition(Partition::new(0, 1)).await;
    assert!(matches!(
        res,
        Err(WorkerErr::Knn(KnnErr::DimensionMismatch { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn long_partition_counts_every_item() {
    // Labels alternate between the two clusters, every third one is wrong.
    let reference = Dataset::from_items(1, [(0, [0.0_f32]), (1, [100.0])]).unwrap();
    let queries: Vec<_> = (0..1000u32)
        .map(|i| {
            let cluster = i % 2;
            let label = if i % 3 == 0 { 1 - cluster } else { cluster };
            (label, [cluster as f32 * 100.0 + 1.0])
        })
        .collect();
    let queries = Dataset::from_items(1, queries).unwrap();

    let expected = (3..997u32).filter(|i| i % 3 != 0).count() as u64;
    let classifier = Classifier::new(NonZeroUsize::MIN, DistanceMetric::Euclidean);
    let worker = Worker::new(1, classifier, Arc::new(reference), Arc::new(queries));

    let result = worker.classify_partition(Partition::new(3, 994)).await.unwrap();
    assert_eq!(result.correct_count, expected);
}
