// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use crate::job_engine::job::Job;

/// A job made from a description and a closure.
pub struct ClosureJob {
    desc: String,
    task: Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>,
}

impl ClosureJob {
    pub fn new<F>(desc: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            desc: desc.into(),
            task: Box::new(f),
        }
    }
}

impl std::fmt::Debug for ClosureJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureJob")
            .field("desc", &self.desc)
            .finish_non_exhaustive()
    }
}

impl Job for ClosureJob {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn run(self: Box<Self>) -> anyhow::Result<()> {
        (self.task)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn closure_job_runs_its_closure_once() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let job: Box<dyn Job> = Box::new(ClosureJob::new("flip flag", move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }));

        assert_eq!(job.desc(), "flip flag");
        job.run().unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn closure_job_returns_the_closure_error() {
        let job: Box<dyn Job> =
            Box::new(ClosureJob::new("fail", || Err(anyhow::anyhow!("disk full"))));

        let err = job.run().unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }
}
