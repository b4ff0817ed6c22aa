// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>
//! # Design: Bounded Job Processor
//!
//! ## Overview
//! A single dispatcher feeding a capped number of concurrently running jobs.
//!
//! - The job queue is a bounded `async_channel` owned by the caller.
//! - One dispatcher thread pulls jobs in FIFO order.
//! - Before launching a job the dispatcher takes a permit from the [`Limiter`].
//!   While all permits are taken it stops pulling, so producers only block once
//!   the queue itself is full.
//! - Every job runs on its own detached worker thread which owns the permit;
//!   dropping the permit (on success, error or panic) frees the slot.
//! - Failed jobs are handed to the error handler, the dispatcher never sees them.
//! - Stop signal or queue closure ends the dispatcher. Running jobs finish.
//!
//! ```text
//!     producers ──send──> +---------------------+
//!                         |  bounded job queue  |
//!                         +----------+----------+
//!                                    | recv (FIFO)
//!                         +----------v----------+   stop()
//!                         |  dispatcher loop()  | <────────
//!                         +----------+----------+
//!                                    | limiter.acquire()
//!                  +-----------------+-----------------+
//!                  |                 |                 |
//!             +----v----+       +----v----+       +----v----+
//!             | worker  |       | worker  |  ...  | worker  |   (≤ K)
//!             | job.run |       | job.run |       | job.run |
//!             +---------+       +---------+       +---------+
//! ```
//!
//! [`Limiter`]: limiter::Limiter

pub mod closure_job;
pub mod error;
pub mod job;
pub mod limiter;
pub mod processor;
