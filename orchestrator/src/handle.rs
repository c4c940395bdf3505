use std::{io, process::Stdio};

use comms::{OnoReceiver, OnoSender, Partition, WorkerResult};
use log::debug;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    process::{Child, Command},
    task::JoinHandle,
};
use worker::Worker;

use crate::configs::{ProcessSpec, WORKER_ID_ENV};

type BoxedRead = Box<dyn AsyncRead + Unpin + Send>;
type BoxedWrite = Box<dyn AsyncWrite + Unpin + Send>;

/// Per-direction buffer of an in-process channel, it holds any protocol frame
/// so neither side ever waits on the other to send.
const CHANNEL_CAPACITY: usize = 64;

/// How the coordinator learns that a worker is gone.
enum Termination {
    Task(JoinHandle<worker::Result<WorkerResult>>),
    Process(Child),
}

/// The coordinator's side of one worker: its private channel and its termination status.
pub(crate) struct WorkerHandle {
    worker_id: usize,
    rx: Option<OnoReceiver<BoxedRead>>,
    tx: Option<OnoSender<BoxedWrite>>,
    termination: Termination,
}

impl WorkerHandle {
    /// Starts `worker` as a task connected through an in-memory pipe.
    pub(crate) fn spawn_task(worker_id: usize, worker: Worker) -> Self {
        let (coord, wk) = tokio::io::duplex(CHANNEL_CAPACITY);

        let (wk_rx, wk_tx) = tokio::io::split(wk);
        let (wk_rx, wk_tx) = comms::channel(wk_rx, wk_tx);
        let join = tokio::spawn(worker.run(wk_rx, wk_tx));

        let (rx, tx) = tokio::io::split(coord);
        Self::new(worker_id, Box::new(rx), Box::new(tx), Termination::Task(join))
    }

    /// Starts a worker process talking through its stdin and stdout.
    ///
    /// # Errors
    /// Returns an io error if the process could not be started.
    pub(crate) fn spawn_process(worker_id: usize, spec: &ProcessSpec) -> io::Result<Self> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .env(WORKER_ID_ENV, worker_id.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("worker stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("worker stdout was not captured"))?;

        debug!(worker_id = worker_id, pid = child.id().unwrap_or_default(); "worker process started");
        Ok(Self::new(
            worker_id,
            Box::new(stdout),
            Box::new(stdin),
            Termination::Process(child),
        ))
    }

    fn new(worker_id: usize, rx: BoxedRead, tx: BoxedWrite, termination: Termination) -> Self {
        let (rx, tx) = comms::channel(rx, tx);
        Self {
            worker_id,
            rx: Some(rx),
            tx: Some(tx),
            termination,
        }
    }

    #[inline]
    pub(crate) fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Sends the worker its partition and closes the sending direction.
    pub(crate) async fn dispatch(&mut self, partition: Partition) -> io::Result<()> {
        let mut tx = self.tx.take().ok_or_else(|| already_used("partition"))?;
        tx.send(&partition).await?;
        tx.close().await
    }

    /// Waits for the worker's single result and releases the receiving direction.
    pub(crate) async fn collect(&mut self) -> io::Result<WorkerResult> {
        let mut rx = self.rx.take().ok_or_else(|| already_used("result"))?;
        rx.recv().await
    }

    /// Waits until the worker is gone.
    ///
    /// # Returns
    /// `Err` with a description when the worker failed, panicked or exited unsuccessfully.
    pub(crate) async fn wait(&mut self) -> Result<(), String> {
        match &mut self.termination {
            Termination::Task(join) => match join.await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Termination::Process(child) => match child.wait().await {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(format!("worker process {status}")),
                Err(e) => Err(format!("failed to wait for worker process: {e}")),
            },
        }
    }

    /// Stops the worker without waiting for it.
    ///
    /// A task worker stops at its next suspension point, a worker process is killed.
    pub(crate) fn abort(&mut self) {
        match &mut self.termination {
            Termination::Task(join) => join.abort(),
            Termination::Process(child) => {
                if let Err(e) = child.start_kill() {
                    debug!(worker_id = self.worker_id; "worker process not killed: {e}");
                }
            }
        }
    }
}

fn already_used(what: &str) -> io::Error {
    io::Error::other(format!("the {what} direction of this channel was already used"))
}
