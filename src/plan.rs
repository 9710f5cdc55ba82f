//! Run the whole pipeline: load modules, collect their state, filter

use crate::collector::collect_release_state;
use crate::config::Config;
use crate::error::Result;
use crate::filter::due_for_release;
use crate::metadata::{DownloadRegistry, HostingApi};
use crate::source::load_modules;
use crate::types::{ReleaseCandidate, RepositoryFailure};
use chrono::{DateTime, Utc};
use tracing::info;

/// Everything one run found out
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    /// Every module processed end to end
    pub candidates: Vec<ReleaseCandidate>,
    /// Modules that were skipped
    pub failures: Vec<RepositoryFailure>,
    /// Modules that satisfy the active thresholds
    pub due: Vec<ReleaseCandidate>,
}

/// Work out which modules are due for a release as of `now`
pub async fn plan_releases<H, R>(
    config: &Config,
    hosting: &H,
    registry: &R,
    now: DateTime<Utc>,
) -> Result<ReleasePlan>
where
    H: HostingApi,
    R: DownloadRegistry,
{
    let modules = load_modules(&config.source, hosting).await?;
    let outcome = collect_release_state(&modules, config, hosting, registry).await;
    let due = due_for_release(&outcome.candidates, &config.thresholds, now);

    info!(
        "{} of {} modules are due for release",
        due.len(),
        outcome.candidates.len()
    );

    Ok(ReleasePlan {
        candidates: outcome.candidates,
        failures: outcome.failures,
        due,
    })
}
