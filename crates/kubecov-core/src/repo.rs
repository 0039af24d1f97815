//! Source checkout for the coverage toolchain.

use anyhow::{Context, Result};
use kubecov_config::RepoConfig;
use kubecov_execution::run_checked;
use std::path::Path;
use tracing::info;

/// Shallow-clone the configured repository, skipping when the checkout is
/// already on disk.
pub fn fetch_repo(repo: &RepoConfig, dest: &Path) -> Result<()> {
    if dest.exists() {
        info!(
            "Checkout already present at {}, skipping clone",
            dest.display()
        );
        return Ok(());
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let dest_str = dest
        .to_str()
        .context("checkout path is not valid UTF-8")?;
    let depth = repo.depth.to_string();

    info!(
        "Cloning {} (depth {}) into {}",
        repo.url,
        repo.depth,
        dest.display()
    );
    run_checked("git", &["clone", "--depth", &depth, &repo.url, dest_str])
        .with_context(|| format!("cloning {}", repo.url))?;
    info!("✅ Clone complete");
    Ok(())
}
