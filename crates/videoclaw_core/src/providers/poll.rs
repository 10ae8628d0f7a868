//! Fixed-interval polling for asynchronous generation jobs.
//!
//! The calling thread sleeps between checks. There is no cancellation; a
//! job ends in success, explicit failure or timeout.

use std::thread;
use std::time::{Duration, Instant};

use super::types::{ProviderError, ProviderResult};

/// Polling limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Wall-clock limit for the whole job.
    pub timeout: Duration,
    /// Pause between status checks.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(5),
        }
    }
}

impl PollConfig {
    pub fn from_secs(timeout_secs: u64, interval_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_secs(interval_secs),
        }
    }
}

/// State of a job reported by one status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPoll<T> {
    /// Still running.
    Pending,
    /// Finished with a result.
    Ready(T),
    /// Finished without a result.
    Failed(String),
}

/// Poll `check` until the job is ready, failed, or `config.timeout` elapses.
///
/// `check` runs once immediately, then after every `config.interval`. Errors
/// returned by `check` itself abort polling.
pub fn poll_until_ready<T, F>(provider: &str, config: PollConfig, mut check: F) -> ProviderResult<T>
where
    F: FnMut() -> ProviderResult<JobPoll<T>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match check()? {
            JobPoll::Ready(value) => {
                tracing::debug!("{} job ready after {} checks", provider, attempts);
                return Ok(value);
            }
            JobPoll::Failed(message) => return Err(ProviderError::job_failed(provider, message)),
            JobPoll::Pending => {}
        }

        if start.elapsed() + config.interval > config.timeout {
            return Err(ProviderError::Timeout {
                provider: provider.to_string(),
                timeout_secs: config.timeout.as_secs(),
            });
        }
        thread::sleep(config.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> PollConfig {
        PollConfig {
            timeout: Duration::from_millis(200),
            interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn returns_when_ready() {
        let mut remaining = 3;
        let value = poll_until_ready("mock", quick(), || {
            remaining -= 1;
            Ok(if remaining == 0 {
                JobPoll::Ready("done")
            } else {
                JobPoll::Pending
            })
        })
        .unwrap();
        assert_eq!(value, "done");
        assert_eq!(remaining, 0);
    }

    #[test]
    fn job_failure_is_reported() {
        let err = poll_until_ready::<(), _>("mock", quick(), || {
            Ok(JobPoll::Failed("content rejected".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, ProviderError::JobFailed { .. }));
        assert!(err.to_string().contains("content rejected"));
    }

    #[test]
    fn times_out_on_stuck_job() {
        let config = PollConfig {
            timeout: Duration::from_millis(20),
            interval: Duration::from_millis(5),
        };
        let err = poll_until_ready::<(), _>("mock", config, || Ok(JobPoll::Pending)).unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { .. }));
    }

    #[test]
    fn check_errors_abort() {
        let mut calls = 0;
        let err = poll_until_ready::<(), _>("mock", quick(), || {
            calls += 1;
            Err(ProviderError::InvalidInput("bad job id".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidInput(_)));
        assert_eq!(calls, 1);
    }
}
