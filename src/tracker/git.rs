use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Commits an archived day file and pushes it. `repo` is the git working tree, `file` a path
/// relative to it.
pub async fn commit_and_push(repo: &Path, file: &Path) -> Result<()> {
    let file = file.to_string_lossy();
    let message = format!("archive: add {file}");
    run_git(repo, &["add", &file]).await?;
    run_git(repo, &["commit", "-m", &message]).await?;
    run_git(repo, &["push"]).await?;
    info!("Pushed {file}");
    Ok(())
}

async fn run_git(repo: &Path, args: &[&str]) -> Result<()> {
    debug!("Running git {args:?} in {repo:?}");
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .await
        .context("Failed to run git")?;
    if !output.status.success() {
        bail!(
            "git {} failed with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
