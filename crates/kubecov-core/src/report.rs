//! Merging dumped counters into the coverage report.
//!
//! The counter format is opaque here; merging, text conversion and the
//! function-level summary are all delegated to `go tool covdata`. This step
//! only validates that the pods actually dumped something and wires the
//! three tool invocations together.

use anyhow::{Context, Result};
use kubecov_execution::run_checked;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// What a scan of the raw counter directory found
#[derive(Debug, Default)]
pub struct CounterScan {
    pub counter_files: usize,
    pub meta_files: usize,
    /// Process ids embedded in the counter filenames
    pub process_ids: BTreeSet<u32>,
}

pub fn process_coverage(
    go_bin: &str,
    raw_dir: &Path,
    merged_dir: &Path,
    report_file: &Path,
) -> Result<()> {
    let scan = scan_counters(raw_dir)?;
    if scan.counter_files == 0 {
        anyhow::bail!(
            "no counter files found in {}; directory contains: [{}]",
            raw_dir.display(),
            list_dir_entries(raw_dir).join(", ")
        );
    }
    info!(
        "Found {} counter file(s) from {} process(es) in {}",
        scan.counter_files,
        scan.process_ids.len(),
        raw_dir.display()
    );

    if merged_dir.exists() {
        std::fs::remove_dir_all(merged_dir)
            .with_context(|| format!("removing {}", merged_dir.display()))?;
    }
    std::fs::create_dir_all(merged_dir)
        .with_context(|| format!("creating {}", merged_dir.display()))?;

    let raw = path_str(raw_dir)?;
    let merged = path_str(merged_dir)?;
    let report = path_str(report_file)?;

    let merge_in = format!("-i={}", raw);
    let merge_out = format!("-o={}", merged);
    run_checked(
        go_bin,
        &["tool", "covdata", "merge", merge_in.as_str(), merge_out.as_str()],
    )
    .context("merging counter data")?;

    let text_in = format!("-i={}", merged);
    let text_out = format!("-o={}", report);
    run_checked(
        go_bin,
        &["tool", "covdata", "textfmt", text_in.as_str(), text_out.as_str()],
    )
    .context("converting merged counters to text")?;
    info!("✅ Wrote text report to {}", report_file.display());

    let func_in = format!("-i={}", merged);
    let func = run_checked(go_bin, &["tool", "covdata", "func", func_in.as_str()])
        .context("rendering function-level coverage")?;

    println!(
        "Function coverage as of {}:",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", func.stdout.trim_end());
    Ok(())
}

/// Inventory the raw counter directory. Counter files are named
/// `covcounters.<meta-hash>.<pid>.<nanotime>`; the pid is the only part the
/// scan interprets.
pub fn scan_counters(dir: &Path) -> Result<CounterScan> {
    if !dir.is_dir() {
        anyhow::bail!("counter directory {} does not exist", dir.display());
    }

    let counter_re = Regex::new(r"^covcounters\.[0-9a-fA-F]+\.(\d+)\.\d+$")?;
    let mut scan = CounterScan::default();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(captures) = counter_re.captures(&name) {
            scan.counter_files += 1;
            if let Ok(pid) = captures[1].parse::<u32>() {
                scan.process_ids.insert(pid);
            }
        } else if name.starts_with("covmeta.") {
            scan.meta_files += 1;
        }
    }

    Ok(scan)
}

fn list_dir_entries(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().to_string())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("path {} is not valid UTF-8", path.display()))
}
