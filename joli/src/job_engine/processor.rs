// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use async_channel::{Receiver, Sender};
use futures::executor::block_on;
use futures::{select_biased, FutureExt};
use log::{debug, info, warn};

use crate::job_engine::error::ProcessorError;
use crate::job_engine::job::{Job, JobReceiver};
use crate::job_engine::limiter::{Limiter, Permit};

/// Called once for every job that fails, on the worker thread of that job.
///
/// The handler must not fail itself. If it panics, only the worker it runs on
/// unwinds; the slot of that worker is still released.
pub type JobErrorHandler = Arc<dyn Fn(anyhow::Error) + Send + Sync>;

/// Lifecycle of a [`Processor`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Created,
    Running,
    Stopped,
}

/// Pulls jobs from a caller-owned queue and runs at most `max_workers` of them
/// at the same time.
///
/// Dropping the processor raises the stop signal as well; jobs that are
/// already running are not affected.
pub struct Processor {
    queue: JobReceiver,
    error_handler: JobErrorHandler,
    limiter: Arc<Limiter>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    state: Arc<Mutex<ProcessorState>>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("state", &self.state())
            .field("num_workers", &self.num_workers())
            .field("max_workers", &self.max_workers())
            .field("queue_len", &self.queue_len())
            .field("error_handler", &"<JobErrorHandler>")
            .finish()
    }
}

impl Processor {
    /// Creates a processor in the `Created` state. Nothing runs until
    /// [`Processor::start`] is called.
    pub fn new<H>(
        queue: JobReceiver,
        error_handler: H,
        max_workers: usize,
    ) -> Result<Self, ProcessorError>
    where
        H: Fn(anyhow::Error) + Send + Sync + 'static,
    {
        if max_workers == 0 {
            return Err(ProcessorError::InvalidConcurrency);
        }
        let (stop_tx, stop_rx) = async_channel::bounded(1);

        Ok(Self {
            queue,
            error_handler: Arc::new(error_handler),
            limiter: Arc::new(Limiter::new(max_workers)),
            stop_tx,
            stop_rx,
            state: Arc::new(Mutex::new(ProcessorState::Created)),
            thread_handle: Mutex::new(None),
        })
    }

    /// Starts the dispatcher on its own thread and returns immediately.
    ///
    /// A processor can be started once. Starting it again returns
    /// [`ProcessorError::AlreadyStarted`], starting it after [`Processor::stop`]
    /// returns [`ProcessorError::Stopped`].
    pub fn start(&self) -> Result<(), ProcessorError> {
        let mut state = lock(&self.state);
        match *state {
            ProcessorState::Created => {}
            ProcessorState::Running => return Err(ProcessorError::AlreadyStarted),
            ProcessorState::Stopped => return Err(ProcessorError::Stopped),
        }

        let queue = self.queue.clone();
        let stop_rx = self.stop_rx.clone();
        let limiter = Arc::clone(&self.limiter);
        let error_handler = Arc::clone(&self.error_handler);
        let state_for_thread = Arc::clone(&self.state);

        // run dispatcher in a dedicated thread
        let handle = thread::Builder::new()
            .name("joli-dispatcher".into())
            .spawn(move || {
                info!(
                    "Dispatcher started with up to {} workers",
                    limiter.capacity()
                );
                block_on(dispatcher_loop(queue, stop_rx, limiter, error_handler));
                *lock(&state_for_thread) = ProcessorState::Stopped;
                info!("Dispatcher shutting down gracefully");
            })
            .map_err(ProcessorError::DispatcherSpawn)?;

        *state = ProcessorState::Running;
        *lock(&self.thread_handle) = Some(handle);
        Ok(())
    }

    /// Raises the stop signal. The dispatcher stops pulling jobs; running jobs
    /// finish on their own and queued jobs stay in the queue.
    ///
    /// Returns `true` for the call that raised the signal. Later calls are
    /// no-ops and return `false`.
    pub fn stop(&self) -> bool {
        if !self.stop_tx.close() {
            debug!("Stop signal already raised, ignoring");
            return false;
        }
        let mut state = lock(&self.state);
        if *state == ProcessorState::Created {
            *state = ProcessorState::Stopped;
        }
        info!("Stop signal raised");
        true
    }

    /// Number of jobs running right now. A snapshot for monitoring only.
    pub fn num_workers(&self) -> usize {
        self.limiter.in_use()
    }

    pub fn max_workers(&self) -> usize {
        self.limiter.capacity()
    }

    /// Number of jobs waiting in the queue. A snapshot for monitoring only.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn state(&self) -> ProcessorState {
        *lock(&self.state)
    }

    /// Blocks until the dispatcher has terminated, through the stop signal or
    /// through the queue being closed and drained. Returns immediately if the
    /// processor was never started. Does not wait for running jobs.
    pub fn wait_until_finished(&self) {
        let handle = lock(&self.thread_handle).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("Dispatcher thread panicked");
            }
        }
    }

    /// Blocks until the dispatcher has terminated and every running job has
    /// released its slot.
    pub fn wait_idle(&self) {
        self.wait_until_finished();
        self.limiter.wait_idle();
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        self.stop_tx.close();
    }
}

/// Pulls one job at a time, waits for a free slot and hands the job to a worker.
async fn dispatcher_loop(
    queue: JobReceiver,
    stop_rx: Receiver<()>,
    limiter: Arc<Limiter>,
    error_handler: JobErrorHandler,
) {
    loop {
        // the stop channel never carries values, it only gets closed
        if stop_rx.is_closed() {
            info!("Stop signal observed");
            break;
        }

        let job = select_biased! {
            _ = stop_rx.recv().fuse() => {
                info!("Stop signal observed");
                break;
            }
            received = queue.recv().fuse() => match received {
                Ok(job) => job,
                Err(_) => {
                    info!("Job queue has been closed and drained");
                    break;
                }
            },
        };

        let permit = select_biased! {
            _ = stop_rx.recv().fuse() => {
                warn!("Stop signal observed while waiting for a worker slot, dropping job: {}", job.desc());
                break;
            }
            permit = limiter.acquire().fuse() => permit,
        };

        spawn_worker(job, permit, &error_handler);
    }
}

fn spawn_worker(job: Box<dyn Job>, permit: Permit, error_handler: &JobErrorHandler) {
    let desc = job.desc().to_owned();
    debug!("Dispatching job: {desc}");

    let handler = Arc::clone(error_handler);
    let spawned = thread::Builder::new()
        .name("joli-worker".into())
        .spawn(move || run_job(job, permit, handler));

    // on failure the closure, and with it the permit, has already been dropped
    if let Err(source) = spawned {
        error_handler(ProcessorError::WorkerSpawn { job: desc, source }.into());
    }
}

fn run_job(job: Box<dyn Job>, permit: Permit, error_handler: JobErrorHandler) {
    let _permit = permit;
    let desc = job.desc().to_owned();
    debug!("Executing job: {desc}");

    match panic::catch_unwind(AssertUnwindSafe(move || job.run())) {
        Ok(Ok(())) => debug!("Job finished: {desc}"),
        Ok(Err(err)) => {
            debug!("Job failed: {desc}");
            error_handler(err);
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            debug!("Job panicked: {desc}");
            error_handler(ProcessorError::JobPanicked { job: desc, message }.into());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
