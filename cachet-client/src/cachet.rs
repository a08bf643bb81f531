//! Cachet client using the REST API (v1).
//!
//! ## Endpoints Used
//!
//! - `GET /ping` - liveness check, answers `{"data": "Pong!"}`
//! - `GET /components/groups` - groups with their `enabled_components`
//! - `GET /incidents?status=N` - incidents at a given status
//!
//! List endpoints are paginated; every page is fetched before returning.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cachet_client::{CachetClient, IncidentStatus, StatusSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CachetClient::builder()
//!         .endpoint("https://status.example.com/api/v1")
//!         .build()?;
//!
//!     for incident in client.fetch_incidents_by_status(IncidentStatus::Investigating).await? {
//!         println!("Incident {} on component {}", incident.id, incident.component_id);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use cachet_types::{Component, ComponentGroup, ComponentStatus, Incident, IncidentStatus};

use crate::{ClientError, StatusSource};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_PER_PAGE: u32 = 100;
const PONG: &str = "Pong!";

/// Cachet API client.
#[derive(Debug, Clone)]
pub struct CachetClient {
    client: Client,
    endpoint: String,
    per_page: u32,
}

impl CachetClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> CachetClientBuilder {
        CachetClientBuilder::default()
    }

    /// The normalized API base URL (no trailing slash).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(url = %url, ?query, "requesting Cachet API");

        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Http(format!(
                "API returned status {} for {}",
                response.status(),
                path
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Parse(format!("{}: {}", path, e)))
    }

    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("page", page.to_string()));
            page_query.push(("per_page", self.per_page.to_string()));

            let envelope: Envelope<Vec<T>> = self.get_json(path, &page_query).await?;
            items.extend(envelope.data);

            match next_page(envelope.meta.as_ref(), page) {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl StatusSource for CachetClient {
    async fn fetch_component_groups(&self) -> Result<Vec<ComponentGroup>, ClientError> {
        let groups: Vec<GroupInfo> = self.get_all_pages("/components/groups", &[]).await?;
        Ok(groups.into_iter().map(GroupInfo::into_group).collect())
    }

    async fn fetch_incidents_by_status(
        &self,
        status: IncidentStatus,
    ) -> Result<Vec<Incident>, ClientError> {
        let incidents: Vec<IncidentInfo> = self
            .get_all_pages("/incidents", &[("status", status.code().to_string())])
            .await?;
        Ok(incidents
            .into_iter()
            .map(IncidentInfo::into_incident)
            .collect())
    }

    async fn ping_health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/ping", self.endpoint);
        debug!(url = %url, "pinging Cachet API");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "ping answered with non-success status");
            return Ok(false);
        }

        let envelope: Envelope<String> = response.json().await?;
        Ok(envelope.data == PONG)
    }
}

/// Builder for CachetClient.
#[derive(Debug, Default)]
pub struct CachetClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    per_page: Option<u32>,
}

impl CachetClientBuilder {
    /// Set the API base URL (e.g., "https://status.example.com/api/v1").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the page size used for list endpoints (default: 100).
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CachetClient, ClientError> {
        let endpoint = normalize_endpoint(self.endpoint.as_deref().unwrap_or_default())?;
        let per_page = match self.per_page {
            Some(0) => {
                return Err(ClientError::InvalidEndpoint(
                    "per_page must be greater than zero".to_string(),
                ))
            }
            Some(n) => n,
            None => DEFAULT_PER_PAGE,
        };

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(concat!("cachet-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(CachetClient {
            client,
            endpoint,
            per_page,
        })
    }
}

fn normalize_endpoint(endpoint: &str) -> Result<String, ClientError> {
    let endpoint = endpoint.trim().trim_end_matches('/');

    if endpoint.is_empty() {
        return Err(ClientError::InvalidEndpoint(
            "API URL must not be empty".to_string(),
        ));
    }

    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ClientError::InvalidEndpoint(format!(
            "'{}' is not an http(s) URL",
            endpoint
        )));
    }

    Ok(endpoint.to_string())
}

// The page we just requested, not the one the server echoes back, drives the
// loop so a server that ignores `page` cannot make it spin forever.
fn next_page(meta: Option<&Meta>, requested: u32) -> Option<u32> {
    let pagination = meta?.pagination.as_ref()?;
    (requested < pagination.total_pages).then_some(requested + 1)
}

/// Response envelope shared by all Cachet endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    meta: Option<Meta>,
    data: T,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    total_pages: u32,
}

/// Component group as returned by `/components/groups`.
#[derive(Debug, Deserialize)]
struct GroupInfo {
    id: u64,
    name: String,
    #[serde(default)]
    enabled_components: Vec<ComponentInfo>,
}

impl GroupInfo {
    fn into_group(self) -> ComponentGroup {
        ComponentGroup {
            id: self.id,
            name: self.name,
            components: self
                .enabled_components
                .into_iter()
                .map(|c| Component::new(c.id, c.name, c.status))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComponentInfo {
    id: u64,
    name: String,
    status: ComponentStatus,
}

/// Incident as returned by `/incidents`.
#[derive(Debug, Deserialize)]
struct IncidentInfo {
    id: u64,
    #[serde(default)]
    component_id: Option<u64>,
    status: IncidentStatus,
}

impl IncidentInfo {
    fn into_incident(self) -> Incident {
        Incident::new(self.id, self.component_id.unwrap_or(0), self.status)
    }
}
