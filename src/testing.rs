//! In-memory hosting and registry fakes for unit tests

use crate::error::{PlanningError, Result};
use crate::metadata::{DownloadRegistry, HostingApi};
use crate::types::{Commit, CommitRef, PullRequest, Tag};
use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn tag(name: &str, sha: &str) -> Tag {
    Tag {
        name: name.to_string(),
        commit: CommitRef {
            sha: sha.to_string(),
        },
    }
}

pub fn commit(sha: &str, at: DateTime<Utc>) -> Commit {
    Commit {
        sha: sha.to_string(),
        date: at,
    }
}

/// A pull request closed without being merged
pub fn unmerged(number: u64, updated_at: DateTime<Utc>, labels: &[&str]) -> PullRequest {
    PullRequest {
        merged_at: None,
        ..pull(number, updated_at, labels)
    }
}

pub fn pull(number: u64, updated_at: DateTime<Utc>, labels: &[&str]) -> PullRequest {
    PullRequest {
        number,
        updated_at,
        merged_at: Some(updated_at),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeRepo {
    pub tags: Vec<Tag>,
    pub ref_dates: HashMap<String, DateTime<Utc>>,
    pub commits: Vec<Commit>,
    pub pulls: Vec<PullRequest>,
    pub pull_commits: HashMap<u64, Vec<Commit>>,
}

#[derive(Debug, Default)]
pub struct FakeHosting {
    pub namespaces: HashMap<String, Vec<String>>,
    pub repos: HashMap<String, FakeRepo>,
}

impl FakeHosting {
    fn repo(&self, repo: &str) -> Result<&FakeRepo> {
        self.repos
            .get(repo)
            .ok_or_else(|| PlanningError::api("GitHub", format!("Not found: {}", repo)))
    }
}

impl HostingApi for FakeHosting {
    async fn list_repos(&self, namespace: &str, repo_filter: &Regex) -> Result<Vec<String>> {
        let names = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| PlanningError::api("GitHub", format!("Not found: {}", namespace)))?;
        Ok(names
            .iter()
            .filter(|n| repo_filter.is_match(n))
            .cloned()
            .collect())
    }

    async fn fetch_tags(&self, repo: &str, tag_filter: &Regex) -> Result<Vec<Tag>> {
        Ok(self
            .repo(repo)?
            .tags
            .iter()
            .filter(|t| tag_filter.is_match(&t.name))
            .cloned()
            .collect())
    }

    async fn date_of_ref(&self, repo: &str, commit_ref: &str) -> Result<DateTime<Utc>> {
        self.repo(repo)?
            .ref_dates
            .get(commit_ref)
            .copied()
            .ok_or_else(|| PlanningError::api("GitHub", format!("No commit {}", commit_ref)))
    }

    async fn commits_since_date(&self, repo: &str, since: DateTime<Utc>) -> Result<Vec<Commit>> {
        Ok(self
            .repo(repo)?
            .commits
            .iter()
            .filter(|c| c.date > since)
            .cloned()
            .collect())
    }

    async fn closed_pull_requests_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>> {
        Ok(self
            .repo(repo)?
            .pulls
            .iter()
            .filter(|p| p.updated_at > since)
            .cloned()
            .collect())
    }

    async fn pull_request_commits(&self, repo: &str, number: u64) -> Result<Vec<Commit>> {
        self.repo(repo)?
            .pull_commits
            .get(&number)
            .cloned()
            .ok_or_else(|| PlanningError::api("GitHub", format!("No pull request {}", number)))
    }
}

#[derive(Debug, Default)]
pub struct FakeRegistry {
    pub downloads: HashMap<String, u64>,
}

impl DownloadRegistry for FakeRegistry {
    async fn download_count(&self, module_name: &str) -> Result<u64> {
        self.downloads
            .get(module_name)
            .copied()
            .ok_or_else(|| {
                PlanningError::api("Puppet Forge", format!("Module not found: {}", module_name))
            })
    }
}
