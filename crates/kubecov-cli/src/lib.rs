//! Kubecov CLI - harvests coverage counters from instrumented cluster pods.
//!
//! The pipeline is strictly sequential: provision build tools, fetch the
//! source checkout, restart the instrumented deployment and wipe stale
//! counters, pause for the operator to exercise the workload, signal the
//! pods to flush their counters, wait for the workload to recover, then
//! merge everything into the text report. A fatal failure in any step exits
//! the process non-zero.

mod cli_args;

use anyhow::Result;
use clap::Parser;
use std::io::Read;
use tracing::{info, warn};

use kubecov_config::Config;
use kubecov_core::kubectl::Kubectl;
use kubecov_core::{deps, readiness, repo, report, restart, trigger};

pub use cli_args::Cli;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli);

    let config = Config::load(cli.config.as_deref())?;
    let kubectl = Kubectl::new(&config.cluster.kubectl_bin, &config.cluster.namespace);

    info!("Step 1/6: provisioning build tools");
    if cli.skip_install {
        warn!("⚠️ --skip-install given, assuming build tools are present");
    } else {
        deps::ensure_dependencies(&config.install)?;
    }

    info!("Step 2/6: fetching source checkout");
    repo::fetch_repo(&config.repo, &config.repo_path())?;

    info!(
        "Step 3/6: restarting deployment {} in {}",
        config.cluster.deployment, config.cluster.namespace
    );
    restart::restart_deployment(
        &kubectl,
        &config.cluster.deployment,
        &config.cluster.selector,
        config.poll_interval(),
        config.restart_timeout(),
    )
    .await?;
    restart::clean_counter_dir(&config.raw_dir())?;

    if cli.yes {
        info!("Skipping interactive pause (--yes)");
    } else {
        pause_for_operator()?;
    }

    info!("Step 4/6: triggering coverage dump");
    trigger::trigger_coverage_dump(
        &kubectl,
        &config.cluster.selector,
        &config.cluster.container,
        &config.cluster.process_name,
    )?;

    info!("Step 5/6: waiting for pods to become ready");
    readiness::wait_for_ready(
        &kubectl,
        &config.cluster.selector,
        config.poll_interval(),
        config.ready_timeout(),
    )
    .await?;

    info!("Step 6/6: merging counters and rendering the report");
    report::process_coverage(
        &config.coverage.go_bin,
        &config.raw_dir(),
        &config.merged_dir(),
        &config.report_file(),
    )?;

    info!("✅ Coverage harvest complete");
    Ok(())
}

/// Block until the operator signals end of input. The workload must be
/// exercised while the fresh pod generation is running, before the flush.
fn pause_for_operator() -> Result<()> {
    println!("Exercise the workload now; press Ctrl-D when finished to trigger the coverage dump.");
    let mut sink = String::new();
    std::io::stdin().read_to_string(&mut sink)?;
    Ok(())
}

fn initialize_logging(cli: &Cli) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("kubecov={}", level).parse().unwrap())
        .add_directive(format!("kubecov_cli={}", level).parse().unwrap())
        .add_directive(format!("kubecov_core={}", level).parse().unwrap())
        .add_directive(format!("kubecov_config={}", level).parse().unwrap())
        .add_directive(format!("kubecov_execution={}", level).parse().unwrap());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
