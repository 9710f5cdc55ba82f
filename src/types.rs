//! Core data types for release planning

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A module to examine, as listed in a module file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Namespace (owner) on GitHub
    pub github_namespace: String,
    /// Repository name
    pub repo_name: String,
    /// Name the module is published under on the Forge
    pub forge_name: String,
}

impl ModuleRecord {
    /// Record for a repository discovered by namespace listing.
    /// The Forge name is assumed to follow the repository name.
    pub fn from_repo(namespace: &str, repo_name: &str) -> Self {
        Self {
            github_namespace: namespace.to_string(),
            repo_name: repo_name.to_string(),
            forge_name: repo_name.to_string(),
        }
    }

    /// `namespace/name` as used by the GitHub API
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.github_namespace, self.repo_name)
    }
}

/// Release state of one repository, one row of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCandidate {
    /// `namespace/name`
    pub repo: String,
    /// Commit date of the latest release tag
    pub date: DateTime<Utc>,
    /// Commits on the default branch since the tag
    pub commits: usize,
    /// Commits since the tag that came from maintenance pull requests
    #[serde(
        rename = "number_maintenance_commits",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub maintenance_commits: Option<usize>,
    /// Forge download count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
}

/// A repository that was skipped and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFailure {
    pub repo: String,
    pub reason: String,
}

/// What the collector produced for a batch of repositories
#[derive(Debug, Clone, Default)]
pub struct CollectionOutcome {
    /// Repositories processed end to end, in input order
    pub candidates: Vec<ReleaseCandidate>,
    /// Repositories that were skipped
    pub failures: Vec<RepositoryFailure>,
}

/// A git tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

impl Tag {
    /// Commit reference the tag resolves to
    pub fn commit_ref(&self) -> &str {
        &self.commit.sha
    }
}

/// A commit with the date it was committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub date: DateTime<Utc>,
}

/// A closed pull request and its label names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

impl PullRequest {
    /// Whether the pull request was merged rather than just closed
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Exact, case-sensitive label name match
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}
