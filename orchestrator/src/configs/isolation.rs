use std::{ffi::OsString, path::PathBuf};

/// Environment variable carrying the worker's id into a worker process.
pub const WORKER_ID_ENV: &str = "KNN_WORKER_ID";

/// How workers are isolated from the coordinator.
#[derive(Debug, Clone, Default)]
pub enum Isolation {
    /// Workers are tasks on the coordinator's runtime, sharing the datasets read-only.
    #[default]
    Task,
    /// Workers are child processes that load the datasets on their own and talk
    /// through their stdin and stdout.
    Process(ProcessSpec),
}

/// The command line used to start one worker process.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ProcessSpec {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}
