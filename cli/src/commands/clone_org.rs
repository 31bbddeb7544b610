//! The `clone-org` command: mirror every repository of a GitHub organization
//! into a destination directory, shallow-cloning new repositories and
//! updating existing ones. Per-repo failures are counted, not fatal.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::exit_codes::*;
use crate::github::GithubClient;
use crate::gitops;

pub struct CloneOrgArgs {
    pub org: String,
    pub dest: String,
    pub depth: u32,
    pub timeout_secs: u64,
    pub skip_clone: bool,
}

pub async fn execute(args: CloneOrgArgs) -> Result<i32> {
    if args.org.is_empty() {
        bail!("org must not be empty");
    }
    if args.dest.is_empty() {
        bail!("dest must not be empty");
    }
    std::fs::create_dir_all(&args.dest).context("create dest dir")?;

    let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    let client = GithubClient::new(token);
    let repos = client
        .list_org_repos(&args.org)
        .await
        .context("list org repos")?;
    info!("found {} repositories in {}", repos.len(), args.org);

    if args.skip_clone {
        info!("skipping clone/update; assuming sources exist in {}", args.dest);
        return Ok(EXIT_OK);
    }

    let timeout = Duration::from_secs(args.timeout_secs);
    let mut cloned = 0usize;
    let mut updated = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;

    for repo in &repos {
        let Some(url) = repo.preferred_url() else {
            warn!("no clone URL for {}; skipping", repo.name);
            skipped += 1;
            continue;
        };
        let repo_dir = Path::new(&args.dest).join(&repo.name);

        if repo_dir.exists() {
            info!("updating {} ({})", repo.name, repo.default_branch);
            match gitops::fetch_and_checkout_latest(
                &repo_dir,
                &repo.default_branch,
                args.depth,
                timeout,
            )
            .await
            {
                Ok(()) => updated += 1,
                Err(e) => {
                    warn!("update {} failed: {e}", repo.name);
                    failed += 1;
                }
            }
        } else {
            info!("cloning {} ({})", repo.name, repo.default_branch);
            match gitops::shallow_clone(url, &repo_dir, &repo.default_branch, args.depth, timeout)
                .await
            {
                Ok(()) => cloned += 1,
                Err(e) => {
                    warn!("clone {} failed: {e}", repo.name);
                    failed += 1;
                }
            }
        }
    }

    info!(
        "clone summary: {cloned} cloned, {updated} updated, {failed} failed, {skipped} skipped"
    );
    Ok(if failed == 0 { EXIT_OK } else { EXIT_ERROR })
}
