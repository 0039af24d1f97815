//! Coverage flush signalling.
//!
//! The instrumented process writes its counter files on termination, so the
//! dump is triggered by delivering SIGTERM inside each pod's container. The
//! scheduler restarts the container afterwards. Delivery is best-effort per
//! pod; only an empty pod listing fails the step.

use anyhow::Result;
use tracing::{info, warn};

use crate::kubectl::{Kubectl, Pod};

pub fn trigger_coverage_dump(
    kubectl: &Kubectl,
    selector: &str,
    container: &str,
    process_name: &str,
) -> Result<usize> {
    let pods = kubectl.list_pods(selector)?;
    let (eligible, skipped) = signal_targets(&pods)?;

    for pod in &skipped {
        warn!(
            "⚠️ Skipping pod {} (phase {}, node {})",
            pod.name(),
            pod.phase(),
            pod.node_name().unwrap_or("<unassigned>")
        );
    }

    let mut signalled = 0;
    for pod in &eligible {
        match kubectl.exec(pod.name(), container, &["pkill", "-TERM", process_name]) {
            Ok(_) => {
                info!("Signalled {} in pod {}", process_name, pod.name());
                signalled += 1;
            }
            // Best-effort, but keep the stderr visible: a permission or
            // connectivity problem looks exactly like a flaky pod otherwise.
            Err(e) => warn!("⚠️ Could not signal {}: {:#}", pod.name(), e),
        }
    }

    info!(
        "✅ Coverage flush triggered on {}/{} pod(s)",
        signalled,
        pods.len()
    );
    Ok(signalled)
}

/// Split the listing into pods that can take the signal and pods to skip.
/// Fails when there is nothing to signal at all.
pub fn signal_targets(pods: &[Pod]) -> Result<(Vec<&Pod>, Vec<&Pod>)> {
    if pods.is_empty() {
        anyhow::bail!("no pods found to trigger a coverage dump on");
    }
    Ok(pods.iter().partition(|pod| is_triggerable(pod)))
}

/// Running and scheduled onto a node
pub fn is_triggerable(pod: &Pod) -> bool {
    pod.is_running() && pod.node_name().is_some()
}
