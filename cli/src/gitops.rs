//! Shallow clone/update of repositories via the `git` binary, with a
//! per-command timeout.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

async fn run_git(dir: Option<&Path>, timeout: Duration, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .with_context(|| format!("git {} timed out", args.join(" ")))?
        .with_context(|| format!("git {} failed to start", args.join(" ")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {}: {}", args.join(" "), stderr.trim());
    }
    Ok(stdout)
}

/// Clone a repository at the given branch with limited history depth.
pub async fn shallow_clone(
    repo_url: &str,
    dest_dir: &Path,
    branch: &str,
    depth: u32,
    timeout: Duration,
) -> Result<()> {
    let branch = if branch.is_empty() { "main" } else { branch };
    let depth_str = depth.to_string();
    let dest = dest_dir.display().to_string();
    run_git(
        None,
        timeout,
        &[
            "clone",
            "--depth",
            &depth_str,
            "--single-branch",
            "--branch",
            branch,
            repo_url,
            &dest,
        ],
    )
    .await?;
    Ok(())
}

/// Update an existing repository to the latest commit on the branch.
pub async fn fetch_and_checkout_latest(
    repo_dir: &Path,
    branch: &str,
    depth: u32,
    timeout: Duration,
) -> Result<()> {
    let branch = if branch.is_empty() { "main" } else { branch };
    let depth_str = depth.to_string();

    let _ = run_git(
        Some(repo_dir),
        timeout,
        &["fetch", "--depth", &depth_str, "origin", branch],
    )
    .await;

    // Check out the branch, creating it from origin if needed.
    if run_git(Some(repo_dir), timeout, &["checkout", branch])
        .await
        .is_err()
    {
        let tracking = format!("origin/{branch}");
        let _ = run_git(
            Some(repo_dir),
            timeout,
            &["checkout", "-B", branch, &tracking],
        )
        .await;
    }

    let target = format!("origin/{branch}");
    run_git(Some(repo_dir), timeout, &["reset", "--hard", &target]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_git_reports_failures() {
        let err = run_git(
            None,
            Duration::from_secs(30),
            &["clone", "/definitely/not/a/repo", "/tmp/kubeaudit-nonexistent-clone"],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("git clone"));
    }

    #[tokio::test]
    async fn run_git_captures_stdout() {
        let out = run_git(None, Duration::from_secs(30), &["--version"])
            .await
            .unwrap();
        assert!(out.contains("git version"));
    }
}
