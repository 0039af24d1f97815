//! CLI argument parsing for kubecov.

use clap::Parser;

#[derive(Parser, Clone)]
#[command(name = "kubecov")]
#[command(about = "Harvests Go coverage counters from instrumented pods in a Kubernetes cluster")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Skip the interactive pause before the coverage dump is triggered
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Skip build-tool provisioning (the tools must already be present)
    #[arg(long)]
    pub skip_install: bool,
}
