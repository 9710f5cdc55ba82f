//! Decide which modules are due for a release

use crate::config::Thresholds;
use crate::types::ReleaseCandidate;
use chrono::{DateTime, Duration, Utc};

/// Candidates with strictly more than `threshold` commits since their tag
pub fn due_by_commits(candidates: &[ReleaseCandidate], threshold: u64) -> Vec<ReleaseCandidate> {
    candidates
        .iter()
        .filter(|c| c.commits as u64 > threshold)
        .cloned()
        .collect()
}

/// Candidates tagged strictly before `now - days`
pub fn due_by_time(
    candidates: &[ReleaseCandidate],
    days: u64,
    now: DateTime<Utc>,
) -> Vec<ReleaseCandidate> {
    let cutoff = time_cutoff(days, now);
    candidates
        .iter()
        .filter(|c| c.date < cutoff)
        .cloned()
        .collect()
}

/// Oldest tag date that is still considered recent
pub fn time_cutoff(days: u64, now: DateTime<Utc>) -> DateTime<Utc> {
    let days = i64::try_from(days).unwrap_or(i64::MAX);
    Duration::try_days(days)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Apply the active thresholds. With both set, a module must satisfy both.
///
/// Order follows `candidates`.
pub fn due_for_release(
    candidates: &[ReleaseCandidate],
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> Vec<ReleaseCandidate> {
    let by_commits = thresholds.commits.map(|t| due_by_commits(candidates, t));
    let by_time = thresholds.days.map(|d| due_by_time(candidates, d, now));

    match (by_commits, by_time) {
        (Some(by_commits), Some(by_time)) => by_commits
            .into_iter()
            .filter(|c| by_time.contains(c))
            .collect(),
        (Some(due), None) | (None, Some(due)) => due,
        (None, None) => Vec::new(),
    }
}
