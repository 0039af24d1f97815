//! External command execution for kubecov.
//!
//! Every interaction with the outside world (package manager, git, kubectl,
//! the Go coverage toolchain) goes through this crate so callers get one
//! result shape and one failure shape.

use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Outcome of a finished external command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// Run a command to completion, capturing output.
///
/// Returns `Err` only when the command cannot be spawned; a non-zero exit
/// is reported through the result so callers can decide what failure means.
pub fn run(program: &str, args: &[&str]) -> Result<ExecutionResult, ExecutionError> {
    let command_line = display_command(program, args);
    debug!("Running `{}`", command_line);

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ExecutionError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    let result = ExecutionResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
        success: output.status.success(),
    };

    debug!(
        "`{}` finished with code {} (stdout {} bytes, stderr {} bytes)",
        command_line,
        result.exit_code,
        result.stdout.len(),
        result.stderr.len()
    );

    Ok(result)
}

/// Run a command and treat a non-zero exit as an error
pub fn run_checked(program: &str, args: &[&str]) -> Result<ExecutionResult, ExecutionError> {
    let result = run(program, args)?;
    if !result.success {
        return Err(ExecutionError::Failed {
            command: display_command(program, args),
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        });
    }
    Ok(result)
}

/// Check whether a tool answers its version probe
pub fn is_tool_installed(tool: &str, probe_args: &[&str]) -> bool {
    match run(tool, probe_args) {
        Ok(result) => result.success,
        Err(_) => false,
    }
}

/// Install a package via the configured package manager
pub fn install_package(
    package_manager: &str,
    package: &str,
) -> Result<ExecutionResult, ExecutionError> {
    run_checked(package_manager, &["install", "-y", package])
}

fn display_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
