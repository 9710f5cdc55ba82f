//! Resolve the list of modules to examine

use crate::config::ModuleSource;
use crate::error::{PlanningError, Result};
use crate::metadata::HostingApi;
use crate::types::ModuleRecord;
use std::path::Path;
use tracing::info;

/// Produce the modules for this run from either a namespace listing or a module file.
///
/// Any failure here is fatal: no partial list is ever returned.
pub async fn load_modules<H: HostingApi>(
    source: &ModuleSource,
    client: &H,
) -> Result<Vec<ModuleRecord>> {
    let modules = match source {
        ModuleSource::Namespace {
            namespace,
            repo_filter,
        } => client
            .list_repos(namespace, repo_filter)
            .await
            .map_err(|e| {
                PlanningError::SourceUnavailable(format!(
                    "listing repositories of {} failed: {}",
                    namespace, e
                ))
            })?
            .iter()
            .map(|name| ModuleRecord::from_repo(namespace, name))
            .collect(),
        ModuleSource::File { path } => read_module_file(path)?,
    };

    info!("{} modules to examine", modules.len());
    Ok(modules)
}

/// Read a JSON array of module records
pub fn read_module_file(path: &Path) -> Result<Vec<ModuleRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PlanningError::SourceUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        PlanningError::SourceUnavailable(format!("cannot parse {}: {}", path.display(), e))
    })
}
