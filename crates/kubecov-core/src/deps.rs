//! Build-tool provisioning.
//!
//! The coverage toolchain needs git, make, wget and a Go toolchain on the
//! harvesting host. Each tool is probed first so reruns are cheap; missing
//! ones are installed through the configured package manager. The step
//! aborts on the first failed install.

use anyhow::{Context, Result};
use kubecov_config::InstallConfig;
use kubecov_execution::{install_package, is_tool_installed};
use tracing::info;

struct Tool<'a> {
    bin: &'a str,
    probe: &'a [&'a str],
    package: &'a str,
}

pub fn ensure_dependencies(install: &InstallConfig) -> Result<()> {
    let tools = [
        Tool {
            bin: "git",
            probe: &["--version"],
            package: &install.git_package,
        },
        Tool {
            bin: "make",
            probe: &["--version"],
            package: &install.make_package,
        },
        Tool {
            bin: "wget",
            probe: &["--version"],
            package: &install.wget_package,
        },
        // `go --version` is not a thing; the toolchain answers `go version`
        Tool {
            bin: "go",
            probe: &["version"],
            package: &install.go_package,
        },
    ];

    for tool in &tools {
        if is_tool_installed(tool.bin, tool.probe) {
            info!("✅ {} is already installed", tool.bin);
            continue;
        }

        info!(
            "{} not found, installing {} via {}...",
            tool.bin, tool.package, install.package_manager
        );
        install_package(&install.package_manager, tool.package).with_context(|| {
            format!(
                "installing {} via {}",
                tool.package, install.package_manager
            )
        })?;
        info!("✅ {} installed", tool.package);
    }

    Ok(())
}
