//! Download counts from the Puppet Forge

use super::DownloadRegistry;
use crate::config::NetworkConfig;
use crate::error::{PlanningError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION")
);

/// Response from the Forge API for a module
#[derive(Debug, Deserialize)]
struct ForgeModule {
    downloads: u64,
}

/// Puppet Forge v3 API client
#[derive(Debug, Clone)]
pub struct ForgeClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl ForgeClient {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| PlanningError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.forge_api_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            base_delay: config.request_delay(),
        })
    }

    /// Retry a request with exponential backoff
    async fn retry_request(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempts = 0;
        let mut delay = self.base_delay;

        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status().as_u16() == 429 {
                        if attempts >= self.max_retries {
                            return Err(PlanningError::RateLimitExceeded {
                                service: "Puppet Forge".to_string(),
                                retry_after: Some(delay),
                            });
                        }
                        warn!("Rate limited by the Forge, retrying after {:?}", delay);
                        tokio::time::sleep(delay).await;
                        attempts += 1;
                        delay *= 2;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if attempts >= self.max_retries {
                        return Err(PlanningError::network(format!("Request failed: {}", e)));
                    }
                    warn!("Request failed, retrying: {}", e);
                    tokio::time::sleep(delay).await;
                    attempts += 1;
                    delay *= 2;
                }
            }
        }
    }
}

impl DownloadRegistry for ForgeClient {
    async fn download_count(&self, module_name: &str) -> Result<u64> {
        let slug = module_slug(module_name);
        debug!("Fetching Forge downloads for {}", slug);

        let url = format!("{}/v3/modules/{}", self.base_url, slug);
        let response = self.retry_request(&url).await?;

        if !response.status().is_success() {
            if response.status().as_u16() == 404 {
                return Err(PlanningError::api(
                    "Puppet Forge",
                    format!("Module not found: {}", slug),
                ));
            }
            return Err(PlanningError::api(
                "Puppet Forge",
                format!("HTTP {}: {}", response.status(), slug),
            ));
        }

        let module: ForgeModule = response.json().await?;
        Ok(module.downloads)
    }
}

/// Forge slugs are `owner-name`; module files sometimes use `owner/name`
fn module_slug(module_name: &str) -> String {
    module_name.trim().replace('/', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_module_slug() {
        assert_eq!(module_slug("puppetlabs/apt"), "puppetlabs-apt");
        assert_eq!(module_slug("puppetlabs-apt"), "puppetlabs-apt");
    }

    #[tokio::test]
    async fn test_download_count() {
        let mut server = Server::new_async().await;
        let _module = server
            .mock("GET", "/v3/modules/puppetlabs-apt")
            .with_header("content-type", "application/json")
            .with_body(r#"{"slug":"puppetlabs-apt","downloads":123456,"feedback_score":98}"#)
            .create_async()
            .await;

        let config = NetworkConfig {
            forge_api_url: server.url(),
            ..NetworkConfig::default()
        };
        let client = ForgeClient::new(&config).unwrap();
        assert_eq!(client.download_count("puppetlabs/apt").await.unwrap(), 123456);
    }

    #[tokio::test]
    async fn test_unknown_module() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", "/v3/modules/puppetlabs-nope")
            .with_status(404)
            .create_async()
            .await;

        let config = NetworkConfig {
            forge_api_url: server.url(),
            max_retries: 0,
            ..NetworkConfig::default()
        };
        let client = ForgeClient::new(&config).unwrap();
        let err = client.download_count("puppetlabs-nope").await.unwrap_err();
        assert!(err.to_string().contains("Module not found"));
    }
}
