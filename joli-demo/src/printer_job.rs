// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::thread;
use std::time::Duration;

use joli::Job;
use log::info;
use rand::Rng;

/// Sleeps for a while and logs before and after.
#[derive(Debug, Clone)]
pub struct PrinterJob {
    number: usize,
    desc: String,
    duration: Duration,
    fail: bool,
}

impl PrinterJob {
    pub fn new(number: usize, duration: Duration, fail: bool) -> Self {
        Self {
            number,
            desc: format!("printer job #{number}"),
            duration,
            fail,
        }
    }

    /// A job with a duration that is a random multiple of 100 ms below
    /// `max_duration`, failing with probability `failure_rate`.
    pub fn random<R: Rng>(
        rng: &mut R,
        number: usize,
        max_duration: Duration,
        failure_rate: f64,
    ) -> Self {
        let steps = (max_duration.as_millis() / 100).max(1) as u64;
        let duration = Duration::from_millis(100 * rng.gen_range(0..steps));
        let fail = rng.gen_bool(failure_rate);
        Self::new(number, duration, fail)
    }
}

impl Job for PrinterJob {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn run(self: Box<Self>) -> anyhow::Result<()> {
        info!("[JOB #{:2}] Doing job for {:?}...", self.number, self.duration);
        thread::sleep(self.duration);
        if self.fail {
            anyhow::bail!("job #{} failed after {:?}", self.number, self.duration);
        }
        info!("[JOB #{:2}] Done job!", self.number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_durations_are_multiples_of_100ms_below_max() {
        let mut rng = StdRng::seed_from_u64(7);
        for number in 0..200 {
            let job = PrinterJob::random(&mut rng, number, Duration::from_millis(3000), 0.0);
            let millis = job.duration.as_millis();
            assert_eq!(millis % 100, 0);
            assert!(millis < 3000);
        }
    }

    #[test]
    fn short_max_duration_yields_instant_jobs() {
        let mut rng = StdRng::seed_from_u64(7);
        let job = PrinterJob::random(&mut rng, 0, Duration::from_millis(50), 0.0);
        assert_eq!(job.duration, Duration::ZERO);
    }

    #[test]
    fn failing_job_reports_its_number() {
        let job: Box<dyn Job> = Box::new(PrinterJob::new(12, Duration::ZERO, true));
        let err = job.run().unwrap_err();
        assert!(err.to_string().contains("job #12 failed"));
    }

    #[test]
    fn healthy_job_succeeds() {
        let job: Box<dyn Job> = Box::new(PrinterJob::new(3, Duration::from_millis(1), false));
        assert!(job.run().is_ok());
    }
}
