use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(test)]
mod tests;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub repo: RepoConfig,
    #[serde(default)]
    pub coverage: CoverageConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub install: InstallConfig,
}

/// Target workload and how to reach it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// kubectl binary to invoke (must be on PATH or absolute)
    pub kubectl_bin: String,

    /// Namespace holding the instrumented workload
    pub namespace: String,

    /// Deployment to rolling-restart before a harvest
    pub deployment: String,

    /// Label selector matching the workload's pods
    pub selector: String,

    /// Container inside each pod that runs the instrumented process
    pub container: String,

    /// Process name the coverage flush signal is delivered to
    pub process_name: String,
}

/// Source checkout used by the coverage toolchain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Remote to clone
    pub url: String,

    /// Local checkout path (tilde is expanded)
    pub path: String,

    /// Clone depth; 1 keeps the checkout shallow
    pub depth: u32,
}

/// Counter directories and report destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Directory the instrumented pods dump raw counter files into
    pub raw_dir: String,

    /// Directory the merged counter set is written to
    pub merged_dir: String,

    /// Text report destination
    pub report_file: String,

    /// Go binary used for `go tool covdata`
    pub go_bin: String,
}

/// Polling cadence and deadlines, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    pub poll_interval_secs: u64,
    pub restart_timeout_secs: u64,
    pub ready_timeout_secs: u64,
}

/// Build-tool provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Package manager invoked as `<package_manager> install -y <package>`
    pub package_manager: String,

    pub git_package: String,
    pub make_package: String,
    pub wget_package: String,
    pub go_package: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubectl_bin: "kubectl".to_string(),
            namespace: "demo".to_string(),
            deployment: "demo-server".to_string(),
            selector: "app=demo-server".to_string(),
            container: "server".to_string(),
            process_name: "demo-server".to_string(),
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/example/demo-server.git".to_string(),
            path: "~/kubecov/src/demo-server".to_string(),
            depth: 1,
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            raw_dir: "/tmp/coverage".to_string(),
            merged_dir: "~/kubecov/merged".to_string(),
            report_file: "~/kubecov/coverage.txt".to_string(),
            go_bin: "go".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            restart_timeout_secs: 120,
            ready_timeout_secs: 180,
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            package_manager: "yum".to_string(),
            git_package: "git".to_string(),
            make_package: "make".to_string(),
            wget_package: "wget".to_string(),
            go_package: "golang".to_string(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Check if any config file exists
        let config_exists = if let Some(path) = config_path {
            Path::new(path).exists()
        } else {
            default_config_paths().iter().any(|path| {
                let expanded_path = shellexpand::tilde(path);
                Path::new(expanded_path.as_ref()).exists()
            })
        };

        // If no config exists, create and save a default config
        if !config_exists {
            let default_config = Self::default();

            let config_dir = dirs::home_dir()
                .map(|mut path| {
                    path.push(".config");
                    path.push("kubecov");
                    path
                })
                .unwrap_or_else(|| PathBuf::from("."));

            std::fs::create_dir_all(&config_dir).ok();

            let config_file = config_dir.join("config.toml");
            match config_file.to_str() {
                Some(path) => {
                    if let Err(e) = default_config.save(path) {
                        eprintln!("Warning: Could not save default config: {}", e);
                    } else {
                        println!(
                            "Created default configuration at: {}",
                            config_file.display()
                        );
                    }
                }
                None => eprintln!("Warning: config directory path is not valid UTF-8"),
            }

            return Ok(default_config);
        }

        // Load config from file
        let config_path_to_load = if let Some(path) = config_path {
            Some(path.to_string())
        } else {
            default_config_paths().iter().find_map(|path| {
                let expanded_path = shellexpand::tilde(path);
                if Path::new(expanded_path.as_ref()).exists() {
                    Some(expanded_path.to_string())
                } else {
                    None
                }
            })
        };

        if let Some(path) = config_path_to_load {
            let config_content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&config_content)?;
            config.validate()?;
            return Ok(config);
        }

        Ok(Self::default())
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.cluster.namespace.is_empty() {
            anyhow::bail!("cluster.namespace must not be empty");
        }
        if self.cluster.deployment.is_empty() {
            anyhow::bail!("cluster.deployment must not be empty");
        }
        if self.cluster.process_name.is_empty() {
            anyhow::bail!("cluster.process_name must not be empty");
        }
        if self.timing.poll_interval_secs == 0 {
            anyhow::bail!("timing.poll_interval_secs must be at least 1");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.timing.poll_interval_secs)
    }

    pub fn restart_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.restart_timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.ready_timeout_secs)
    }

    /// Checkout path with tilde expanded
    pub fn repo_path(&self) -> PathBuf {
        expand_path(&self.repo.path)
    }

    /// Raw counter directory with tilde expanded
    pub fn raw_dir(&self) -> PathBuf {
        expand_path(&self.coverage.raw_dir)
    }

    /// Merged counter directory with tilde expanded
    pub fn merged_dir(&self) -> PathBuf {
        expand_path(&self.coverage.merged_dir)
    }

    /// Report destination with tilde expanded
    pub fn report_file(&self) -> PathBuf {
        expand_path(&self.coverage.report_file)
    }
}

fn default_config_paths() -> [&'static str; 3] {
    [
        "./kubecov.toml",
        "~/.config/kubecov/config.toml",
        "~/.kubecov.toml",
    ]
}

/// Expand a leading tilde into the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
