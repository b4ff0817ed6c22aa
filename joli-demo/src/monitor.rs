// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use joli::Processor;
use log::info;

/// Periodically logs how many workers are busy and how many jobs are waiting.
/// Read-only: the processor does not depend on it.
pub struct Monitor {
    stop_tx: mpsc::Sender<()>,
    thread_handle: JoinHandle<()>,
}

impl Monitor {
    pub fn spawn(processor: Arc<Processor>, period: Duration) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread_handle = thread::Builder::new()
            .name("joli-monitor".into())
            .spawn(move || loop {
                info!("[PRCSSR] Number of workers: {}", processor.num_workers());
                info!("[QUEUE ] Size of job queue: {}", processor.queue_len());
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop_tx,
            thread_handle,
        })
    }

    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.thread_handle.join().is_err() {
            log::warn!("Monitor thread panicked");
        }
    }
}
