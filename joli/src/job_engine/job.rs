// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use async_channel::{Receiver, Sender};

/// A unit of work handed to the processor.
///
/// The processor calls [`Job::run`] exactly once, on a worker thread, and only
/// looks at whether it succeeded. A job must not hold on to anything owned by
/// the processor.
pub trait Job: Send + 'static {
    /// Free-form description, used for logging or debugging
    fn desc(&self) -> &str {
        "job"
    }

    /// Runs the job to completion. Blocking is fine, the worker thread belongs
    /// to this job alone.
    fn run(self: Box<Self>) -> anyhow::Result<()>;
}

impl std::fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("desc", &self.desc()).finish()
    }
}

/// Producer side of a job queue. Cheap to clone, one per producer if needed.
pub type JobSender = Sender<Box<dyn Job>>;

/// Consumer side of a job queue, handed to the [`Processor`](super::processor::Processor).
pub type JobReceiver = Receiver<Box<dyn Job>>;

/// Creates a bounded FIFO job queue.
///
/// The queue belongs to the caller: closing it (`JobSender::close`) lets the
/// processor shut down once the remaining jobs have been pulled.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn job_queue(capacity: usize) -> (JobSender, JobReceiver) {
    async_channel::bounded(capacity)
}
