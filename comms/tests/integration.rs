use comms::{MAX_FRAME_LEN, Partition, WorkerResult};
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn frames_are_length_prefixed_big_endian_words() {
    let (coord, mut worker) = io::duplex(64);

    let (rx, tx) = io::split(coord);
    let (_, mut coord_tx) = comms::channel(rx, tx);

    coord_tx.send(&Partition::new(2, 258)).await.unwrap();
    coord_tx.close().await.unwrap();

    let mut wire = Vec::new();
    worker.read_to_end(&mut wire).await.unwrap();

    let mut expected = 16u64.to_be_bytes().to_vec();
    expected.extend_from_slice(&2u64.to_be_bytes());
    expected.extend_from_slice(&258u64.to_be_bytes());
    assert_eq!(wire, expected);
}

#[tokio::test]
async fn result_frame_sent_by_hand_is_understood() {
    let (coord, mut worker) = io::duplex(64);

    let (rx, tx) = io::split(coord);
    let (mut coord_rx, _) = comms::channel(rx, tx);

    worker.write_all(&8u64.to_be_bytes()).await.unwrap();
    worker.write_all(&7u64.to_be_bytes()).await.unwrap();

    let result: WorkerResult = coord_rx.recv().await.unwrap();
    assert_eq!(result, WorkerResult::new(7));
}

#[tokio::test]
async fn partition_then_result_over_one_duplex() {
    let (coord, worker) = io::duplex(64);

    let (rx, tx) = io::split(coord);
    let (mut coord_rx, mut coord_tx) = comms::channel(rx, tx);
    let (rx, tx) = io::split(worker);
    let (mut worker_rx, mut worker_tx) = comms::channel(rx, tx);

    coord_tx.send(&Partition::new(10, 5)).await.unwrap();
    let partition: Partition = worker_rx.recv().await.unwrap();
    assert_eq!(partition.range(), 10..15);

    worker_tx.send(&WorkerResult::new(4)).await.unwrap();
    let result: WorkerResult = coord_rx.recv().await.unwrap();
    assert_eq!(result.correct_count, 4);
}

#[tokio::test]
async fn closed_peer_is_unexpected_eof() {
    let (coord, worker) = io::duplex(64);

    let (rx, tx) = io::split(coord);
    let (mut coord_rx, _coord_tx) = comms::channel(rx, tx);
    drop(worker);

    let err = coord_rx.recv::<WorkerResult>().await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[tokio::test]
async fn mismatched_message_shape_is_rejected() {
    let (coord, worker) = io::duplex(64);

    let (rx, tx) = io::split(coord);
    let (mut coord_rx, _) = comms::channel(rx, tx);
    let (rx, tx) = io::split(worker);
    let (_, mut worker_tx) = comms::channel(rx, tx);

    // A partition sent where a result is expected.
    worker_tx.send(&Partition::new(1, 2)).await.unwrap();

    let err = coord_rx.recv::<WorkerResult>().await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_reading_payload() {
    let (coord, mut worker) = io::duplex(64);

    let (rx, tx) = io::split(coord);
    let (mut coord_rx, _) = comms::channel(rx, tx);

    let len = (MAX_FRAME_LEN as u64 + 1).to_be_bytes();
    worker.write_all(&len).await.unwrap();

    let err = coord_rx.recv::<WorkerResult>().await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}
