//! Clients for the remote services a run talks to

pub mod forge;
pub mod github;

pub use forge::ForgeClient;
pub use github::GitHubClient;

use crate::error::Result;
use crate::types::{Commit, PullRequest, Tag};
use chrono::{DateTime, Utc};
use regex::Regex;

/// Repository hosting API used to survey release state
#[allow(async_fn_in_trait)]
pub trait HostingApi {
    /// Names of the repositories under `namespace` that match `repo_filter`
    async fn list_repos(&self, namespace: &str, repo_filter: &Regex) -> Result<Vec<String>>;

    /// Tags of `repo` (`namespace/name`) matching `tag_filter`, newest first
    async fn fetch_tags(&self, repo: &str, tag_filter: &Regex) -> Result<Vec<Tag>>;

    /// Commit date of `commit_ref`
    async fn date_of_ref(&self, repo: &str, commit_ref: &str) -> Result<DateTime<Utc>>;

    /// Commits on the default branch strictly after `since`
    async fn commits_since_date(&self, repo: &str, since: DateTime<Utc>) -> Result<Vec<Commit>>;

    /// Closed pull requests updated strictly after `since`
    async fn closed_pull_requests_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>>;

    /// Commits that make up pull request `number`
    async fn pull_request_commits(&self, repo: &str, number: u64) -> Result<Vec<Commit>>;
}

/// Package registry that knows how often a module was downloaded
#[allow(async_fn_in_trait)]
pub trait DownloadRegistry {
    async fn download_count(&self, module_name: &str) -> Result<u64>;
}
