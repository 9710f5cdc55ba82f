//! GitHub REST client for tags, commits and pull requests

use super::HostingApi;
use crate::config::NetworkConfig;
use crate::error::{PlanningError, Result};
use crate::types::{Commit, PullRequest, Tag};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitDetail,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitDetail {
    committer: Option<GitHubSignature>,
    author: Option<GitHubSignature>,
}

#[derive(Debug, Deserialize)]
struct GitHubSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GitHubPull {
    number: u64,
    updated_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    labels: Vec<GitHubLabel>,
}

#[derive(Debug, Deserialize)]
struct GitHubLabel {
    name: String,
}

impl TryFrom<GitHubCommit> for Commit {
    type Error = PlanningError;

    fn try_from(value: GitHubCommit) -> Result<Self> {
        let date = value
            .commit
            .committer
            .or(value.commit.author)
            .map(|s| s.date)
            .ok_or_else(|| {
                PlanningError::api("GitHub", format!("Commit {} has no date", value.sha))
            })?;
        Ok(Commit {
            sha: value.sha,
            date,
        })
    }
}

impl From<GitHubPull> for PullRequest {
    fn from(value: GitHubPull) -> Self {
        PullRequest {
            number: value.number,
            updated_at: value.updated_at,
            merged_at: value.merged_at,
            labels: value.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

/// Authenticated GitHub API client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    config: NetworkConfig,
}

impl GitHubClient {
    /// Build a client that authenticates with `token`
    pub fn new(token: &str, config: &NetworkConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|e| PlanningError::config(format!("Invalid OAuth token: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| PlanningError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.github_api_url.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    /// Send a GET request, retrying transport failures with exponential backoff
    async fn send(&self, url: &str) -> Result<Response> {
        let mut attempts = 0;
        let mut delay = self.config.request_delay();

        loop {
            match self.client.get(url).send().await {
                Ok(response) => return check_status(response),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        return Err(PlanningError::network(format!("GitHub request failed: {}", e)));
                    }
                    warn!("GitHub request failed, retrying: {}", e);
                    tokio::time::sleep(delay).await;
                    attempts += 1;
                    delay *= 2;
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        Ok(self.send(url).await?.json().await?)
    }

    /// Follow `Link: rel="next"` headers until exhausted or `keep_going`
    /// returns false for the page just read.
    async fn get_pages<T, F>(&self, url: String, mut keep_going: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnMut(&[T]) -> bool,
    {
        let mut items = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            debug!("GET {}", url);
            let response = self.send(&url).await?;
            let next_link = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .and_then(extract_next_link);

            let page: Vec<T> = response.json().await?;
            let more = !page.is_empty() && keep_going(&page);
            items.extend(page);

            if more {
                next = next_link;
            }
        }

        Ok(items)
    }
}

impl HostingApi for GitHubClient {
    async fn list_repos(&self, namespace: &str, repo_filter: &Regex) -> Result<Vec<String>> {
        let url = format!(
            "{}/users/{}/repos?per_page={}",
            self.base_url, namespace, self.config.per_page
        );
        let repos: Vec<GitHubRepo> = self.get_pages(url, |_| true).await?;
        Ok(repos
            .into_iter()
            .map(|r| r.name)
            .filter(|name| repo_filter.is_match(name))
            .collect())
    }

    async fn fetch_tags(&self, repo: &str, tag_filter: &Regex) -> Result<Vec<Tag>> {
        let url = format!(
            "{}/repos/{}/tags?per_page={}",
            self.base_url, repo, self.config.per_page
        );
        let tags: Vec<Tag> = self.get_pages(url, |_| true).await?;
        Ok(tags
            .into_iter()
            .filter(|t| tag_filter.is_match(&t.name))
            .collect())
    }

    async fn date_of_ref(&self, repo: &str, commit_ref: &str) -> Result<DateTime<Utc>> {
        let url = format!("{}/repos/{}/commits/{}", self.base_url, repo, commit_ref);
        let commit: GitHubCommit = self.get_json(&url).await?;
        Ok(Commit::try_from(commit)?.date)
    }

    async fn commits_since_date(&self, repo: &str, since: DateTime<Utc>) -> Result<Vec<Commit>> {
        let url = format!(
            "{}/repos/{}/commits?since={}&per_page={}",
            self.base_url,
            repo,
            since.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.config.per_page
        );
        let commits: Vec<GitHubCommit> = self.get_pages(url, |_| true).await?;

        // `since` is inclusive on GitHub's side; the tagged commit itself must not count.
        let mut result = Vec::with_capacity(commits.len());
        for commit in commits {
            let commit = Commit::try_from(commit)?;
            if commit.date > since {
                result.push(commit);
            }
        }
        Ok(result)
    }

    async fn closed_pull_requests_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>> {
        let url = format!(
            "{}/repos/{}/pulls?state=closed&sort=updated&direction=desc&per_page={}",
            self.base_url, repo, self.config.per_page
        );
        let pulls: Vec<GitHubPull> = self
            .get_pages(url, |page: &[GitHubPull]| {
                page.last().map_or(false, |pr| pr.updated_at > since)
            })
            .await?;
        Ok(pulls
            .into_iter()
            .filter(|pr| pr.updated_at > since)
            .map(PullRequest::from)
            .collect())
    }

    async fn pull_request_commits(&self, repo: &str, number: u64) -> Result<Vec<Commit>> {
        let url = format!(
            "{}/repos/{}/pulls/{}/commits?per_page={}",
            self.base_url, repo, number, self.config.per_page
        );
        let commits: Vec<GitHubCommit> = self.get_pages(url, |_| true).await?;
        commits.into_iter().map(Commit::try_from).collect()
    }
}

/// Map error statuses to errors, passing successful responses through
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 403 || status.as_u16() == 429 {
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok());
        if status.as_u16() == 429 || remaining == Some("0") {
            let retry_after = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<i64>().ok())
                .map(|reset| {
                    let wait = reset.saturating_sub(Utc::now().timestamp()).max(0);
                    Duration::from_secs(wait as u64)
                });
            return Err(PlanningError::RateLimitExceeded {
                service: "GitHub".to_string(),
                retry_after,
            });
        }
    }

    if status.as_u16() == 404 {
        return Err(PlanningError::api("GitHub", format!("Not found: {}", response.url().path())));
    }

    Err(PlanningError::api("GitHub", format!("HTTP {}", status)))
}

/// Extract the `rel="next"` target from a Link header
fn extract_next_link(link_header: &str) -> Option<String> {
    link_header
        .split(',')
        .find(|link| link.contains("rel=\"next\""))
        .and_then(|link| {
            let start = link.find('<')? + 1;
            let end = link.find('>')?;
            link.get(start..end).map(str::to_string)
        })
}
