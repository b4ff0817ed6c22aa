// SPDX-License-Identifier: MIT
// joli-demo: feeds random sleep-and-log jobs into a bounded joli processor
//
// - A sender thread pushes one job per interval into a bounded queue.
// - The processor runs at most --workers of them at once.
// - A monitor reports busy workers and queue length.
// - SIGINT / SIGTERM stop everything and wait for running jobs.
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use clap::Parser;
use joli::{job_queue, JobSender, Processor};
use log::{error, info};
use nix::sys::signal::{SigSet, Signal};

pub mod config;
pub mod monitor;
pub mod printer_job;

use crate::config::{validate_args, Args, DemoConfig};
use crate::monitor::Monitor;
use crate::printer_job::PrinterJob;

fn spawn_sender(queue: JobSender, config: DemoConfig) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("joli-sender".into())
        .spawn(move || {
            let mut rng = rand::thread_rng();
            for number in 0..config.jobs {
                info!("[SENDER ] Sending job {number} ...");
                thread::sleep(config.send_interval);

                let job = PrinterJob::random(
                    &mut rng,
                    number,
                    config.max_job_duration,
                    config.failure_rate,
                );
                if queue.send_blocking(Box::new(job)).is_err() {
                    info!("[SENDER ] Queue closed, no more jobs");
                    return;
                }

                info!("[SENDER ] Job sent!");
            }
            info!("[SENDER ] All {} jobs sent", config.jobs);
        })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }
    let config = DemoConfig::from(&args);

    // Block the shutdown signals before any other thread exists, so that every
    // thread inherits the mask and only the wait below receives them.
    let mut shutdown_signals = SigSet::empty();
    shutdown_signals.add(Signal::SIGINT);
    shutdown_signals.add(Signal::SIGTERM);
    shutdown_signals
        .thread_block()
        .context("failed to block SIGINT/SIGTERM")?;

    let (queue, receiver) = job_queue(config.queue_size);
    let processor = Arc::new(Processor::new(
        receiver,
        |err| error!("Job failed: {err:#}"),
        config.workers,
    )?);
    processor.start()?;

    let monitor = Monitor::spawn(processor.clone(), config.monitor_interval)
        .context("failed to start the monitor")?;
    let sender = spawn_sender(queue.clone(), config.clone())
        .context("failed to start the sender")?;

    info!(
        "Starting joli-demo with {} workers and a queue of {}",
        config.workers, config.queue_size
    );

    let signal = shutdown_signals
        .wait()
        .context("failed to wait for a shutdown signal")?;
    info!("Received {signal:?}, stopping joli-demo");

    processor.stop();
    queue.close();
    if sender.join().is_err() {
        error!("Sender thread panicked");
    }
    monitor.stop();

    info!("Waiting for {} running jobs", processor.num_workers());
    processor.wait_idle();
    info!("Stopped joli-demo, {} jobs left in the queue", processor.queue_len());

    Ok(())
}
