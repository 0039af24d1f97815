//! Thin wrapper around the `kubectl` CLI.
//!
//! The cluster is only ever reached through the CLI client; listings are
//! requested as `-o json` and decoded into the structs below. Only the
//! fields the pipeline reads are modelled.

use anyhow::{Context, Result};
use kubecov_execution::{run, run_checked, ExecutionResult};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Kubectl {
    bin: String,
    namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Pod {
    #[serde(default)]
    pub metadata: PodMetadata,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PodMetadata {
    #[serde(default)]
    pub name: String,
    /// Set once the pod has been marked for deletion
    pub deletion_timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub node_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PodStatus {
    pub phase: Option<String>,
    #[serde(default)]
    pub conditions: Vec<PodCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
}

impl Pod {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn phase(&self) -> &str {
        self.status.phase.as_deref().unwrap_or("Unknown")
    }

    /// Node the pod is scheduled on; `None` when unassigned or blank
    pub fn node_name(&self) -> Option<&str> {
        self.spec.node_name.as_deref().filter(|node| !node.is_empty())
    }

    pub fn is_running(&self) -> bool {
        self.phase() == "Running"
    }

    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Running with a `Ready` condition reported `True`
    pub fn is_ready(&self) -> bool {
        self.is_running()
            && self
                .status
                .conditions
                .iter()
                .any(|c| c.condition_type == "Ready" && c.status == "True")
    }
}

impl Kubectl {
    pub fn new(bin: &str, namespace: &str) -> Self {
        Self {
            bin: bin.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// List pods matching a label selector
    pub fn list_pods(&self, selector: &str) -> Result<Vec<Pod>> {
        let result = run_checked(
            &self.bin,
            &[
                "get",
                "pods",
                "-n",
                &self.namespace,
                "-l",
                selector,
                "-o",
                "json",
            ],
        )?;

        let list: PodList = serde_json::from_str(&result.stdout)
            .context("decoding pod listing from kubectl")?;
        debug!(
            "Listed {} pod(s) for selector `{}` in {}",
            list.items.len(),
            selector,
            self.namespace
        );
        Ok(list.items)
    }

    /// Fetch a single pod; `Ok(None)` when the pod no longer exists
    pub fn get_pod(&self, name: &str) -> Result<Option<Pod>> {
        let result = run(
            &self.bin,
            &["get", "pod", name, "-n", &self.namespace, "-o", "json"],
        )?;

        if !result.success {
            if result.stderr.contains("NotFound") || result.stderr.contains("not found") {
                return Ok(None);
            }
            anyhow::bail!(
                "`kubectl get pod {}` failed: {}",
                name,
                result.stderr.trim()
            );
        }

        let pod: Pod =
            serde_json::from_str(&result.stdout).context("decoding pod from kubectl")?;
        Ok(Some(pod))
    }

    /// Rolling restart of a deployment
    pub fn rollout_restart(&self, deployment: &str) -> Result<()> {
        run_checked(
            &self.bin,
            &[
                "rollout",
                "restart",
                &format!("deployment/{}", deployment),
                "-n",
                &self.namespace,
            ],
        )
        .with_context(|| format!("restarting deployment {}", deployment))?;
        Ok(())
    }

    /// Run a command inside a pod's container
    pub fn exec(&self, pod: &str, container: &str, command: &[&str]) -> Result<ExecutionResult> {
        let mut args: Vec<&str> = vec!["exec", "-n", &self.namespace, pod, "-c", container, "--"];
        args.extend_from_slice(command);
        Ok(run_checked(&self.bin, &args)?)
    }
}
