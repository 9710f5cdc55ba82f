//! Run options, their validation, and network settings

use crate::error::{PlanningError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Namespace selected by the `--puppetlabs-supported` shortcut
pub const SUPPORTED_NAMESPACE: &str = "puppetlabs";

/// Repositories of the supported Puppet modules
pub const SUPPORTED_MODULES_REGEX: &str = "^puppetlabs-(accounts|acl|apache|apt|bootstrap|chocolatey|concat|docker|dsc_lite|exec|facter_task|firewall|haproxy|iis|inifile|java|java_ks|kubernetes|motd|mysql|ntp|package|postgresql|powershell|puppet_agent|puppet_conf|reboot|registry|satellite_pe_tools|scheduled_task|service|sqlserver|stdlib|tomcat|vcsrepo|wsus_client)$";

/// File read in file mode when `-f` is given without a name
pub const DEFAULT_MODULE_FILE: &str = "modules.json";

/// Label that marks a pull request as maintenance work
pub const DEFAULT_MAINTENANCE_LABEL: &str = "maintenance";

/// Environment variable the token falls back to
pub const TOKEN_ENV_VAR: &str = "GITHUB_COMMUNITY_TOKEN";

const MATCH_ALL: &str = ".*";

/// Raw, unvalidated run options as collected from the command line
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub namespace: Option<String>,
    pub file: Option<PathBuf>,
    pub repo_regex: Option<String>,
    pub tag_regex: Option<String>,
    pub commit_threshold: Option<u64>,
    pub time_threshold: Option<u64>,
    pub oauth_token: Option<String>,
    pub verbose: bool,
    pub output: bool,
    pub output_dir: Option<PathBuf>,
    pub puppetlabs_supported: bool,
    pub track_maintenance: bool,
    pub maintenance_label: Option<String>,
    pub downloads: bool,
    pub network: NetworkConfig,
}

/// Where the list of repositories comes from
#[derive(Debug, Clone)]
pub enum ModuleSource {
    /// Every repository of a namespace whose name matches the filter
    Namespace { namespace: String, repo_filter: Regex },
    /// A JSON list of module records
    File { path: PathBuf },
}

/// Active due-for-release predicates. At least one is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Due when more than this many commits landed since the last tag
    pub commits: Option<u64>,
    /// Due when the last tag is older than this many days
    pub days: Option<u64>,
}

/// Validated configuration for one run
#[derive(Clone)]
pub struct Config {
    pub source: ModuleSource,
    pub tag_filter: Regex,
    pub thresholds: Thresholds,
    pub oauth_token: String,
    pub verbose: bool,
    pub output: bool,
    pub output_dir: PathBuf,
    /// Set when maintenance commits should be counted
    pub maintenance_label: Option<String>,
    pub fetch_downloads: bool,
    pub network: NetworkConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("source", &self.source)
            .field("tag_filter", &self.tag_filter.as_str())
            .field("thresholds", &self.thresholds)
            .field("oauth_token", &"<redacted>")
            .field("verbose", &self.verbose)
            .field("output", &self.output)
            .field("output_dir", &self.output_dir)
            .field("maintenance_label", &self.maintenance_label)
            .field("fetch_downloads", &self.fetch_downloads)
            .finish()
    }
}

impl Options {
    /// Validate the options into a [`Config`].
    ///
    /// Every missing required option is reported at once, before any regex is compiled.
    pub fn resolve(self) -> Result<Config> {
        let mut namespace = self.namespace;
        let mut repo_regex = self.repo_regex;
        if self.puppetlabs_supported {
            namespace = Some(SUPPORTED_NAMESPACE.to_string());
            repo_regex = Some(SUPPORTED_MODULES_REGEX.to_string());
        }

        let token = self.oauth_token.filter(|t| !t.trim().is_empty());

        let mut missing = Vec::new();
        if namespace.is_none() && self.file.is_none() {
            missing.push("-n or -f".to_string());
        }
        if token.is_none() {
            missing.push("-t".to_string());
        }
        if self.commit_threshold.is_none() && self.time_threshold.is_none() {
            missing.push("-m or -c".to_string());
        }

        let (Some(oauth_token), true) = (token, missing.is_empty()) else {
            return Err(PlanningError::MissingRequiredOption(missing));
        };

        let source = match (namespace, self.file) {
            (Some(_), Some(_)) => {
                return Err(PlanningError::config(
                    "a namespace and a module file cannot be used together",
                ))
            }
            (Some(namespace), None) => ModuleSource::Namespace {
                namespace,
                repo_filter: Regex::new(repo_regex.as_deref().unwrap_or(MATCH_ALL))?,
            },
            (None, Some(path)) => ModuleSource::File { path },
            (None, None) => {
                return Err(PlanningError::MissingRequiredOption(vec!["-n or -f".to_string()]))
            }
        };

        let tag_filter = Regex::new(self.tag_regex.as_deref().unwrap_or(MATCH_ALL))?;

        let maintenance_label = self.track_maintenance.then(|| {
            self.maintenance_label
                .unwrap_or_else(|| DEFAULT_MAINTENANCE_LABEL.to_string())
        });

        Ok(Config {
            source,
            tag_filter,
            thresholds: Thresholds {
                commits: self.commit_threshold,
                days: self.time_threshold,
            },
            oauth_token,
            verbose: self.verbose,
            output: self.output,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            maintenance_label,
            fetch_downloads: self.downloads,
            network: self.network,
        })
    }
}

/// Network configuration for API calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
    /// Delay before the first retry (milliseconds), doubled on every attempt
    pub request_delay_ms: u64,
    /// GitHub REST API base URL
    pub github_api_url: String,
    /// Puppet Forge API base URL
    pub forge_api_url: String,
    /// Page size for paginated listings
    pub per_page: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            request_delay_ms: 100,
            github_api_url: "https://api.github.com".to_string(),
            forge_api_url: "https://forgeapi.puppet.com".to_string(),
            per_page: 100,
        }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get request delay as Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Options {
        Options {
            namespace: Some("puppetlabs".to_string()),
            oauth_token: Some("secret".to_string()),
            commit_threshold: Some(5),
            ..Options::default()
        }
    }

    #[test]
    fn test_reports_every_missing_option() {
        let err = Options::default().resolve().unwrap_err();
        match err {
            PlanningError::MissingRequiredOption(missing) => {
                assert_eq!(missing, vec!["-n or -f", "-t", "-m or -c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reports_only_missing_thresholds() {
        let options = Options {
            commit_threshold: None,
            ..complete()
        };
        match options.resolve().unwrap_err() {
            PlanningError::MissingRequiredOption(missing) => assert_eq!(missing, vec!["-m or -c"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let options = Options {
            oauth_token: Some("  ".to_string()),
            ..complete()
        };
        match options.resolve().unwrap_err() {
            PlanningError::MissingRequiredOption(missing) => assert_eq!(missing, vec!["-t"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filters_default_to_match_everything() {
        let config = complete().resolve().unwrap();
        assert_eq!(config.tag_filter.as_str(), ".*");
        match config.source {
            ModuleSource::Namespace { namespace, repo_filter } => {
                assert_eq!(namespace, "puppetlabs");
                assert!(repo_filter.is_match("anything-at-all"));
            }
            ModuleSource::File { .. } => panic!("expected namespace source"),
        }
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.maintenance_label.is_none());
    }

    #[test]
    fn test_puppetlabs_supported_shortcut() {
        let options = Options {
            namespace: None,
            repo_regex: Some("ignored".to_string()),
            puppetlabs_supported: true,
            ..complete()
        };
        let config = options.resolve().unwrap();
        match config.source {
            ModuleSource::Namespace { namespace, repo_filter } => {
                assert_eq!(namespace, SUPPORTED_NAMESPACE);
                assert!(repo_filter.is_match("puppetlabs-stdlib"));
                assert!(!repo_filter.is_match("puppetlabs-stdlib-fork"));
                assert!(!repo_filter.is_match("ignored"));
            }
            ModuleSource::File { .. } => panic!("expected namespace source"),
        }
    }

    #[test]
    fn test_file_source() {
        let options = Options {
            namespace: None,
            file: Some(PathBuf::from(DEFAULT_MODULE_FILE)),
            time_threshold: Some(90),
            commit_threshold: None,
            ..complete()
        };
        let config = options.resolve().unwrap();
        assert!(matches!(
            config.source,
            ModuleSource::File { ref path } if path == &PathBuf::from("modules.json")
        ));
        assert_eq!(config.thresholds, Thresholds { commits: None, days: Some(90) });
    }

    #[test]
    fn test_namespace_and_file_conflict() {
        let options = Options {
            file: Some(PathBuf::from("modules.json")),
            ..complete()
        };
        assert!(matches!(options.resolve(), Err(PlanningError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let options = Options {
            tag_regex: Some("v(".to_string()),
            ..complete()
        };
        assert!(matches!(options.resolve(), Err(PlanningError::InvalidRegex(_))));
    }

    #[test]
    fn test_maintenance_label_defaults() {
        let options = Options {
            track_maintenance: true,
            ..complete()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.maintenance_label.as_deref(), Some("maintenance"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = complete().resolve().unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_partial_network_config() {
        let network: NetworkConfig = toml::from_str("timeout_secs = 5\n").unwrap();
        assert_eq!(network.timeout(), Duration::from_secs(5));
        assert_eq!(network.max_retries, 3);
        assert_eq!(network.github_api_url, "https://api.github.com");
    }
}
