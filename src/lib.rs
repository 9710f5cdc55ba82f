//! # release_planning
//!
//! Survey the repositories of a GitHub namespace (or a list of modules) and work out which
//! ones are due for a release:
//! - **Release state**: latest matching tag, its date, and the commits that landed since
//! - **Maintenance share**: how many of those commits came from maintenance pull requests
//! - **Popularity**: Puppet Forge download counts
//! - **Reports**: terminal summary, sortable HTML table, and JSON dump
//!
//! ## Quick Start
//!
//! ```no_run
//! use release_planning::{plan_releases, ForgeClient, GitHubClient, Options};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Options {
//!     namespace: Some("puppetlabs".to_string()),
//!     oauth_token: std::env::var("GITHUB_COMMUNITY_TOKEN").ok(),
//!     commit_threshold: Some(10),
//!     ..Options::default()
//! }
//! .resolve()?;
//!
//! let github = GitHubClient::new(&config.oauth_token, &config.network)?;
//! let forge = ForgeClient::new(&config.network)?;
//! let plan = plan_releases(&config, &github, &forge, chrono::Utc::now()).await?;
//!
//! for module in plan.due {
//!     println!("{}: {} commits since {}", module.repo, module.commits, module.date);
//! }
//! # Ok(())
//! # }
//! ```

mod collector;
mod config;
mod error;
mod filter;
mod metadata;
mod plan;
mod report;
mod source;
mod types;

#[cfg(test)]
mod testing;

// Re-export public API
pub use collector::collect_release_state;
pub use config::{
    Config, ModuleSource, NetworkConfig, Options, Thresholds, DEFAULT_MAINTENANCE_LABEL,
    DEFAULT_MODULE_FILE, SUPPORTED_MODULES_REGEX, SUPPORTED_NAMESPACE, TOKEN_ENV_VAR,
};
pub use error::{PlanningError, Result};
pub use filter::{due_by_commits, due_by_time, due_for_release, time_cutoff};
pub use metadata::{DownloadRegistry, ForgeClient, GitHubClient, HostingApi};
pub use plan::{plan_releases, ReleasePlan};
pub use report::{
    render_html, render_json, summary_lines, write_reports, WrittenReport, HTML_REPORT,
    JSON_REPORT,
};
pub use source::{load_modules, read_module_file};
pub use types::{
    CollectionOutcome, Commit, CommitRef, ModuleRecord, PullRequest, ReleaseCandidate,
    RepositoryFailure, Tag,
};
