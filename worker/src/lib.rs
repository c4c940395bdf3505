pub mod error;
pub mod worker;

pub use error::{Result, WorkerErr};
pub use worker::Worker;
