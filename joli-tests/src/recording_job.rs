// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use joli::Job;

use crate::run_log::{LoggedRun, RunLog};

#[derive(Debug, Default)]
struct TimelineState {
    runs: Vec<LoggedRun>,
    running: usize,
    peak: usize,
}

/// Shared record of when jobs started and finished, relative to one origin.
#[derive(Debug, Clone)]
pub struct Timeline {
    origin: Instant,
    state: Arc<Mutex<TimelineState>>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Arc::new(Mutex::new(TimelineState::default())),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn record_start(&self, job: usize) {
        let mut state = self.state.lock().unwrap();
        let start_seq = state.runs.len();
        let started_ms = self.elapsed_ms();
        state.runs.push(LoggedRun {
            job,
            start_seq,
            started_ms,
            finished_ms: None,
            failed: false,
        });
        state.running += 1;
        state.peak = state.peak.max(state.running);
    }

    fn record_finish(&self, job: usize, failed: bool) {
        let mut state = self.state.lock().unwrap();
        let finished_ms = self.elapsed_ms();
        if let Some(run) = state.runs.iter_mut().find(|run| run.job == job) {
            run.finished_ms = Some(finished_ms);
            run.failed = failed;
        }
        state.running -= 1;
    }

    /// Jobs inside `run` right now, as seen by the jobs themselves.
    pub fn running(&self) -> usize {
        self.state.lock().unwrap().running
    }

    /// Highest number of jobs that were inside `run` at the same time.
    pub fn peak(&self) -> usize {
        self.state.lock().unwrap().peak
    }

    pub fn run_log(&self) -> RunLog {
        RunLog {
            runs: self.state.lock().unwrap().runs.clone(),
        }
    }
}

/// A job that sleeps for a fixed duration and records itself in a [`Timeline`].
#[derive(Debug)]
pub struct RecordingJob {
    id: usize,
    desc: String,
    duration: Duration,
    failure: Option<String>,
    timeline: Timeline,
}

impl RecordingJob {
    pub fn new(id: usize, duration: Duration, timeline: &Timeline) -> Self {
        Self {
            id,
            desc: format!("recording job #{id}"),
            duration,
            failure: None,
            timeline: timeline.clone(),
        }
    }

    /// Makes the job fail with `message` after sleeping.
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn boxed(self) -> Box<dyn Job> {
        Box::new(self)
    }
}

impl Job for RecordingJob {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn run(self: Box<Self>) -> anyhow::Result<()> {
        self.timeline.record_start(self.id);
        thread::sleep(self.duration);
        self.timeline.record_finish(self.id, self.failure.is_some());
        match self.failure {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => Ok(()),
        }
    }
}

/// Sleeps until `offset` after `origin` (no-op if that point already passed).
pub fn sleep_until(origin: Instant, offset: Duration) {
    let target = origin + offset;
    let now = Instant::now();
    if target > now {
        thread::sleep(target - now);
    }
}
