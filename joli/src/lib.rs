// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! joli: a small bounded-concurrency job processor.
//!
//! Jobs are pushed into a bounded queue owned by the caller. A [`Processor`]
//! pulls them one at a time and runs each on its own worker thread, never
//! letting more than `max_workers` jobs run at once.
//!
//! ```rust,no_run
//! use joli::{job_queue, ClosureJob, Processor};
//!
//! let (queue, receiver) = job_queue(1024);
//! let processor = Processor::new(
//!     receiver,
//!     |err| log::error!("Job failed: {err}"),
//!     4,
//! )
//! .expect("at least one worker");
//! processor.start().expect("fresh processor");
//!
//! // Blocks only while the queue is full.
//! queue
//!     .send_blocking(Box::new(ClosureJob::new("say hello", || {
//!         println!("hello");
//!         Ok(())
//!     })))
//!     .expect("queue is open");
//!
//! queue.close();
//! processor.wait_idle();
//! ```

pub mod job_engine;

pub use job_engine::closure_job::ClosureJob;
pub use job_engine::error::ProcessorError;
pub use job_engine::job::{job_queue, Job, JobReceiver, JobSender};
pub use job_engine::limiter::{Limiter, Permit};
pub use job_engine::processor::{JobErrorHandler, Processor, ProcessorState};
