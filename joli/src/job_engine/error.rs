// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use thiserror::Error;

/// Errors raised by the processor itself.
///
/// Lifecycle misuse is returned to the caller. Worker-level failures
/// (`JobPanicked`, `WorkerSpawn`) never reach the caller directly, they are
/// passed to the job error handler like any failed job.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("maximum number of workers must be at least 1")]
    InvalidConcurrency,

    #[error("processor has already been started")]
    AlreadyStarted,

    #[error("processor has been stopped")]
    Stopped,

    #[error("failed to spawn dispatcher thread: {0}")]
    DispatcherSpawn(#[source] std::io::Error),

    #[error("failed to spawn worker for job '{job}': {source}")]
    WorkerSpawn {
        job: String,
        #[source]
        source: std::io::Error,
    },

    #[error("job '{job}' panicked: {message}")]
    JobPanicked { job: String, message: String },
}
