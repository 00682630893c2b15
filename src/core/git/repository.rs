use crate::utils::error::{GroombaError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// A working tree git commands run in.
#[derive(Debug, Clone)]
pub struct GitRepository {
    pub root: PathBuf,
}

impl GitRepository {
    /// Resolves the top of the working tree containing `path`.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let start = Self {
            root: path.to_path_buf(),
        };
        let root = execute_git_command(&start, &["rev-parse", "--show-toplevel"]).map_err(|e| {
            GroombaError::git_operation(format!(
                "{} is not inside a git working tree: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    pub fn remote_url(&self, remote: &str) -> Result<String> {
        execute_git_command(self, &["remote", "get-url", remote]).map_err(|e| {
            GroombaError::git_operation(format!("Remote '{}' is not configured: {}", remote, e))
        })
    }
}

/// Runs git in the repository root and hands back the raw output, whatever
/// the exit status. `envs` is applied on top of the inherited environment.
pub fn run_git(repo: &GitRepository, args: &[&str], envs: &[(String, String)]) -> Result<Output> {
    debug!(args = %args.join(" "), "running git");
    let mut command = Command::new("git");
    command.current_dir(&repo.root).args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    command
        .output()
        .map_err(|e| GroombaError::git_operation(format!("Failed to execute git: {}", e)))
}

pub fn execute_git_command(repo: &GitRepository, args: &[&str]) -> Result<String> {
    execute_git_command_with_env(repo, args, &[])
}

pub fn execute_git_command_with_env(
    repo: &GitRepository,
    args: &[&str],
    envs: &[(String, String)],
) -> Result<String> {
    let output = run_git(repo, args, envs)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GroombaError::git_operation(format!(
            "Git command failed ({}): {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.trim().to_string())
}
