//! Gather the release state of every module

use crate::config::Config;
use crate::error::{PlanningError, Result};
use crate::metadata::{DownloadRegistry, HostingApi};
use crate::types::{CollectionOutcome, Commit, ModuleRecord, ReleaseCandidate, RepositoryFailure};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

/// Collect a [`ReleaseCandidate`] for each module, one module at a time.
///
/// A module that fails at any step lands in `failures` and never affects the others.
pub async fn collect_release_state<H, R>(
    modules: &[ModuleRecord],
    config: &Config,
    hosting: &H,
    registry: &R,
) -> CollectionOutcome
where
    H: HostingApi,
    R: DownloadRegistry,
{
    let mut outcome = CollectionOutcome::default();

    for module in modules {
        let repo = module.full_name();
        match process_module(module, config, hosting, registry).await {
            Ok(candidate) => outcome.candidates.push(candidate),
            Err(e) => {
                debug!("Skipping {}: {}", repo, e);
                outcome.failures.push(RepositoryFailure {
                    repo,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Collected {} modules, skipped {}",
        outcome.candidates.len(),
        outcome.failures.len()
    );

    outcome
}

/// Process a single module
async fn process_module<H, R>(
    module: &ModuleRecord,
    config: &Config,
    hosting: &H,
    registry: &R,
) -> Result<ReleaseCandidate>
where
    H: HostingApi,
    R: DownloadRegistry,
{
    let repo = module.full_name();
    debug!("Processing {}", repo);

    let latest_tag = hosting
        .fetch_tags(&repo, &config.tag_filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| PlanningError::NoMatchingTag(repo.clone()))?;

    let date = hosting.date_of_ref(&repo, latest_tag.commit_ref()).await?;
    let commits = hosting.commits_since_date(&repo, date).await?;

    debug!(
        "{}: latest tag {} on {}, {} commits since",
        repo,
        latest_tag.name,
        date,
        commits.len()
    );

    let maintenance_commits = match &config.maintenance_label {
        Some(label) => {
            Some(count_maintenance_commits(hosting, &repo, date, &commits, label).await?)
        }
        None => None,
    };

    let downloads = if config.fetch_downloads {
        Some(registry.download_count(&module.forge_name).await?)
    } else {
        None
    };

    Ok(ReleaseCandidate {
        repo,
        date,
        commits: commits.len(),
        maintenance_commits,
        downloads,
    })
}

/// Count the commits since the tag that belong to a merged pull request carrying `label`.
///
/// Commits are matched by hash; a commit shared by several labelled pull requests counts once.
async fn count_maintenance_commits<H: HostingApi>(
    hosting: &H,
    repo: &str,
    since: DateTime<Utc>,
    commits: &[Commit],
    label: &str,
) -> Result<usize> {
    let since_tag: HashSet<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
    let mut matched = HashSet::new();

    let pulls = hosting.closed_pull_requests_since(repo, since).await?;
    for pull in pulls.iter().filter(|p| p.is_merged() && p.has_label(label)) {
        for commit in hosting.pull_request_commits(repo, pull.number).await? {
            if since_tag.contains(commit.sha.as_str()) {
                matched.insert(commit.sha);
            }
        }
    }

    Ok(matched.len())
}
