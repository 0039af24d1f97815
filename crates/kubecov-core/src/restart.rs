//! Rolling restart of the instrumented deployment.
//!
//! After issuing the restart the pipeline waits for the previous pod
//! generation to leave, then wipes the counter directory so the next dump
//! only holds counters from the fresh generation. A wait that times out is
//! not fatal; the scheduler owns the rollout and the harvest proceeds with
//! a warning.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::kubectl::Kubectl;
use crate::poll::{poll_until, PollOutcome};

pub async fn restart_deployment(
    kubectl: &Kubectl,
    deployment: &str,
    selector: &str,
    interval: Duration,
    timeout: Duration,
) -> Result<()> {
    let original: BTreeSet<String> = kubectl
        .list_pods(selector)?
        .iter()
        .map(|pod| pod.name().to_string())
        .collect();

    info!(
        "Restarting deployment {} ({} pod(s) in the current generation)",
        deployment,
        original.len()
    );
    kubectl.rollout_restart(deployment)?;

    let outcome = poll_until("old pods to terminate", interval, timeout, || {
        let original = &original;
        async move { old_generation_gone(kubectl, selector, original) }
    })
    .await?;

    match outcome {
        PollOutcome::Satisfied => info!("✅ Old pod generation has left"),
        PollOutcome::TimedOut => warn!(
            "⚠️ Old pods still present after {}s, proceeding anyway",
            timeout.as_secs()
        ),
    }
    Ok(())
}

fn old_generation_gone(
    kubectl: &Kubectl,
    selector: &str,
    original: &BTreeSet<String>,
) -> Result<bool> {
    if original.is_empty() {
        return Ok(true);
    }

    let current: BTreeSet<String> = kubectl
        .list_pods(selector)?
        .iter()
        .map(|pod| pod.name().to_string())
        .collect();
    if pods_replaced(original, &current) {
        return Ok(true);
    }

    // The listing can lag; check each original pod directly
    for name in original {
        match kubectl.get_pod(name)? {
            None => continue,
            Some(pod) if pod.is_terminating() => continue,
            Some(_) => return Ok(false),
        }
    }
    Ok(true)
}

/// True once no pod of the original generation is listed any more
pub fn pods_replaced(original: &BTreeSet<String>, current: &BTreeSet<String>) -> bool {
    original.is_disjoint(current)
}

/// Drop counters left behind by the previous generation and start from an
/// empty directory. A missing directory is not an error.
pub fn clean_counter_dir(dir: &Path) -> Result<()> {
    use anyhow::Context;

    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("removing stale counter directory {}", dir.display()))?;
        info!("Removed stale counters under {}", dir.display());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating counter directory {}", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unchanged_pod_set_is_not_replaced() {
        let original = names(&["pod-a", "pod-b"]);
        assert!(!pods_replaced(&original, &original.clone()));
    }

    #[test]
    fn test_disjoint_pod_set_is_replaced() {
        let original = names(&["pod-a", "pod-b"]);
        let current = names(&["pod-c", "pod-d"]);
        assert!(pods_replaced(&original, &current));
    }

    #[test]
    fn test_partial_overlap_is_not_replaced() {
        let original = names(&["pod-a", "pod-b"]);
        let current = names(&["pod-b", "pod-c"]);
        assert!(!pods_replaced(&original, &current));
    }

    #[test]
    fn test_cleanup_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("coverage");
        assert!(!dir.exists());

        clean_counter_dir(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_cleanup_empties_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("coverage");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("covcounters.deadbeef.42.1"), b"stale").unwrap();
        std::fs::write(dir.join("covmeta.deadbeef"), b"stale").unwrap();

        clean_counter_dir(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }
}
