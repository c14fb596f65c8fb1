use anyhow::{anyhow, Result};
use reqwest::{Client as ReqwestClient, Response, StatusCode, Url};
use serde::Serialize;
use shared_types::{Config, Group, Properties};
use std::time::Duration;
use tracing::debug;

/// Client for the ki config service HTTP API
pub struct KiClient {
    client: ReqwestClient,
    base_url: String,
}

impl KiClient {
    /// Create a new client instance
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create an empty group. Fails if the group already exists.
    pub async fn create_group(&self, group: &str) -> Result<Group> {
        let url = self.url(&["config", group])?;
        debug!("PUT {}", url);

        let response = self.client.put(url).send().await?;

        if response.status() == StatusCode::CONFLICT {
            anyhow::bail!("Group already exists: {}", group);
        }

        Ok(ensure_success(response).await?.json().await?)
    }

    pub async fn get_group(&self, group: &str) -> Result<Group> {
        let url = self.url(&["config", group])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            anyhow::bail!("Group not found: {}", group);
        }

        Ok(ensure_success(response).await?.json().await?)
    }

    /// Create or replace a config in an existing group. The stored config,
    /// with its server-assigned modification time, is returned.
    pub async fn put_config(
        &self,
        group: &str,
        id: &str,
        name: &str,
        version: i64,
        properties: &Properties,
    ) -> Result<Config> {
        let url = self.url(&["config", group, id])?;
        debug!("PUT {}", url);

        let body = PutConfigBody {
            name,
            version,
            properties,
        };

        let response = self.client.put(url).json(&body).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            anyhow::bail!("Group not found: {}", group);
        }

        Ok(ensure_success(response).await?.json().await?)
    }

    pub async fn get_config(&self, group: &str, id: &str) -> Result<Config> {
        let url = self.url(&["config", group, id])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            anyhow::bail!("Config not found: {}/{}", group, id);
        }

        Ok(ensure_success(response).await?.json().await?)
    }

    /// Append percent-encoded path segments to the base url, so ids holding
    /// `/`, `?`, `#` or spaces still address a single resource.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("Base url cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check if the service is healthy
    pub async fn health_check(&self) -> Result<bool> {
        let url = self.url(&["health"])?;

        let response = self.client.get(url).send().await?;

        Ok(response.status() == StatusCode::OK)
    }
}

#[derive(Serialize)]
struct PutConfigBody<'a> {
    name: &'a str,
    version: i64,
    properties: &'a Properties,
}

/// Turn a non-success response into an error carrying the server's
/// `details` message when it sent one.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: serde_json::Value = response.json().await.unwrap_or_default();
    match body["details"].as_str().or_else(|| body["error"].as_str()) {
        Some(message) => anyhow::bail!("Request failed with {}: {}", status, message),
        None => anyhow::bail!("Request failed with {}", status),
    }
}
