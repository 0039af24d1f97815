//! Waiting for the restarted workload to pass its health checks.

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

use crate::kubectl::{Kubectl, Pod};
use crate::poll::{poll_until, PollOutcome};

/// Poll until every pod is running and ready. On timeout the harvest still
/// proceeds when at least one pod is ready; none ready at all is fatal.
pub async fn wait_for_ready(
    kubectl: &Kubectl,
    selector: &str,
    interval: Duration,
    timeout: Duration,
) -> Result<()> {
    let outcome = poll_until("all pods ready", interval, timeout, || async move {
        let pods = kubectl.list_pods(selector)?;
        Ok(all_ready(&pods))
    })
    .await?;

    match outcome {
        PollOutcome::Satisfied => {
            info!("✅ All pods are running and ready");
            Ok(())
        }
        PollOutcome::TimedOut => {
            let pods = kubectl.list_pods(selector)?;
            let ready = ready_count(&pods);
            if ready > 0 {
                warn!(
                    "⚠️ Only {}/{} pod(s) ready after {}s, proceeding in degraded mode",
                    ready,
                    pods.len(),
                    timeout.as_secs()
                );
                Ok(())
            } else {
                anyhow::bail!("no pods became ready within {}s", timeout.as_secs())
            }
        }
    }
}

pub fn all_ready(pods: &[Pod]) -> bool {
    !pods.is_empty() && pods.iter().all(Pod::is_ready)
}

pub fn ready_count(pods: &[Pod]) -> usize {
    pods.iter().filter(|pod| pod.is_ready()).count()
}
