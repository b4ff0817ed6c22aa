// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Capacity of the job queue
    #[arg(long, default_value_t = 1024)]
    pub queue_size: usize,

    /// Maximum number of jobs running at the same time
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Number of jobs the sender produces before it stops
    #[arg(long, default_value_t = 4096)]
    pub jobs: usize,

    /// Pause before each job is sent
    #[arg(long, value_name = "MS", default_value_t = 200)]
    pub send_interval_ms: u64,

    /// Period of the worker and queue report
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub monitor_interval_ms: u64,

    /// Upper bound for the random job duration. Durations are multiples of 100 ms below it.
    #[arg(long, value_name = "MS", default_value_t = 3000)]
    pub max_job_duration_ms: u64,

    /// Probability that a job fails instead of succeeding
    #[arg(long, value_name = "P", default_value_t = 0.0)]
    pub failure_rate: f64,
}

pub fn validate_args(args: &Args) -> Result<(), String> {
    if args.queue_size == 0 {
        return Err("--queue-size must be at least 1".into());
    }

    if args.workers == 0 {
        return Err("--workers must be at least 1".into());
    }

    if args.monitor_interval_ms == 0 {
        return Err("--monitor-interval-ms must be at least 1".into());
    }

    if !(0.0..=1.0).contains(&args.failure_rate) {
        return Err(format!(
            "--failure-rate must be between 0 and 1, got {}",
            args.failure_rate
        ));
    }

    Ok(())
}

/// Settings shared by the sender and the monitor.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub queue_size: usize,
    pub workers: usize,
    pub jobs: usize,
    pub send_interval: Duration,
    pub monitor_interval: Duration,
    pub max_job_duration: Duration,
    pub failure_rate: f64,
}

impl From<&Args> for DemoConfig {
    fn from(args: &Args) -> Self {
        Self {
            queue_size: args.queue_size,
            workers: args.workers,
            jobs: args.jobs,
            send_interval: Duration::from_millis(args.send_interval_ms),
            monitor_interval: Duration::from_millis(args.monitor_interval_ms),
            max_job_duration: Duration::from_millis(args.max_job_duration_ms),
            failure_rate: args.failure_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("joli-demo").chain(argv.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn defaults_match_the_reference_setup() {
        let args = parse(&[]);
        assert!(validate_args(&args).is_ok());

        let config = DemoConfig::from(&args);
        assert_eq!(config.queue_size, 1024);
        assert_eq!(config.workers, 4);
        assert_eq!(config.jobs, 4096);
        assert_eq!(config.send_interval, Duration::from_millis(200));
        assert_eq!(config.monitor_interval, Duration::from_millis(500));
        assert_eq!(config.max_job_duration, Duration::from_millis(3000));
        assert_eq!(config.failure_rate, 0.0);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let args = parse(&["--workers", "0"]);
        assert!(validate_args(&args).unwrap_err().contains("--workers"));
    }

    #[test]
    fn zero_queue_size_is_rejected() {
        let args = parse(&["--queue-size", "0"]);
        assert!(validate_args(&args).unwrap_err().contains("--queue-size"));
    }

    #[test]
    fn failure_rate_out_of_range_is_rejected() {
        let args = parse(&["--failure-rate", "1.5"]);
        assert!(validate_args(&args).unwrap_err().contains("--failure-rate"));

        let args = parse(&["--failure-rate", "0.25"]);
        assert!(validate_args(&args).is_ok());
    }
}
