mod isolation;
mod run;

pub use isolation::{Isolation, ProcessSpec, WORKER_ID_ENV};
pub use run::RunConfig;
