//! Bounded fixed-interval polling.
//!
//! The cluster scheduler is external and slow-changing, so the pipeline
//! waits on it with a plain busy-wait: probe, sleep, repeat until the
//! condition holds or the deadline passes. Callers decide what a timeout
//! means; most proceed with a warning.

use anyhow::Result;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Satisfied,
    TimedOut,
}

impl PollOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied)
    }
}

/// Probe `condition` every `interval` until it returns `Ok(true)` or
/// `timeout` elapses. Probe errors abort the wait.
pub async fn poll_until<F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut condition: F,
) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        if condition().await? {
            debug!("{} satisfied after {} probe(s)", what, attempt);
            return Ok(PollOutcome::Satisfied);
        }

        if Instant::now() >= deadline {
            warn!(
                "⚠️ Timed out waiting for {} after {} probe(s) ({}s)",
                what,
                attempt,
                timeout.as_secs()
            );
            return Ok(PollOutcome::TimedOut);
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_satisfied_on_first_probe() {
        let outcome = poll_until(
            "immediate condition",
            Duration::from_millis(10),
            Duration::from_millis(100),
            || async { Ok(true) },
        )
        .await
        .unwrap();
        assert!(outcome.is_satisfied());
    }

    #[tokio::test]
    async fn test_never_satisfied_runs_to_timeout() {
        let probes = AtomicU32::new(0);
        let outcome = poll_until(
            "unreachable condition",
            Duration::from_millis(5),
            Duration::from_millis(30),
            || {
                probes.fetch_add(1, Ordering::SeqCst);
                async { Ok(false) }
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert!(probes.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_satisfied_after_a_few_probes() {
        let probes = AtomicU32::new(0);
        let outcome = poll_until(
            "third probe",
            Duration::from_millis(1),
            Duration::from_secs(5),
            || {
                let n = probes.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 2) }
            },
        )
        .await
        .unwrap();
        assert!(outcome.is_satisfied());
        assert_eq!(probes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_probe_error_aborts_the_wait() {
        let result = poll_until(
            "failing probe",
            Duration::from_millis(1),
            Duration::from_millis(50),
            || async { anyhow::bail!("listing failed") },
        )
        .await;
        assert!(result.is_err());
    }
}
