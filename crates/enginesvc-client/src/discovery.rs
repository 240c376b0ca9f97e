use std::future::Future;
use std::time::Duration;

use enginesvc_core::ServiceInstance;
use reqwest::{Client, StatusCode};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("invalid discovery address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("discovery backend unreachable: {0}")]
    Unreachable(String),

    #[error("discovery lookup failed: {0}")]
    Lookup(String),
}

/// What the watcher asks the backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceQuery {
    pub service: String,
    pub tags: Vec<String>,
    pub passing_only: bool,
}

impl InstanceQuery {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            tags: Vec::new(),
            passing_only: false,
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn passing_only(mut self, passing_only: bool) -> Self {
        self.passing_only = passing_only;
        self
    }

    /// Addresses of the listed instances that satisfy this query, sorted
    /// and de-duplicated.
    pub fn select(&self, instances: &[ServiceInstance]) -> Vec<String> {
        let mut addresses: Vec<String> = instances
            .iter()
            .filter(|instance| instance.service_name == self.service)
            .filter(|instance| instance.matches(&self.tags, self.passing_only))
            .map(|instance| instance.address.clone())
            .collect();
        addresses.sort();
        addresses.dedup();
        addresses
    }
}

/// A source of service instances.
///
/// Backends may pre-filter; the watcher applies [`InstanceQuery::select`]
/// to whatever they return.
pub trait Discovery: Send + Sync + 'static {
    fn instances(
        &self,
        query: &InstanceQuery,
    ) -> impl Future<Output = Result<Vec<ServiceInstance>, DiscoveryError>> + Send;
}

/// Upper bound on a single registry request. Kept below the client's refresh
/// interval so a hung registry cannot stall the watcher.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Discovery through a service registry's HTTP API.
///
/// Lookups call `GET /api/discover/{service}`, which answers with a JSON
/// array of instances; a 404 means the service has none registered.
///
/// LogPose registrations carry no `tags` field. Such instances are matched
/// on a comma-separated `tags` entry in their metadata instead, so enginesvc
/// servers must register with `metadata.tags` containing `prod` to be picked
/// up by [`EngineClient`](crate::EngineClient).
#[derive(Debug, Clone)]
pub struct RegistryDiscovery {
    client: Client,
    base: Url,
}

impl RegistryDiscovery {
    /// Validates the address and checks `GET /health`. Any failure here is
    /// final: the caller has no registry to watch.
    pub async fn connect(address: &str) -> Result<Self, DiscoveryError> {
        Self::connect_with_timeout(address, LOOKUP_TIMEOUT).await
    }

    /// Like [`connect`](Self::connect), bounding every registry request by
    /// `timeout`.
    pub async fn connect_with_timeout(
        address: &str,
        timeout: Duration,
    ) -> Result<Self, DiscoveryError> {
        let base = Url::parse(address).map_err(|source| DiscoveryError::InvalidAddress {
            address: address.to_string(),
            source,
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::Unreachable(e.to_string()))?;
        let discovery = Self { client, base };

        let url = discovery.url(&["health"])?;
        let res = discovery
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Unreachable(e.to_string()))?;
        if !res.status().is_success() {
            return Err(DiscoveryError::Unreachable(format!(
                "health check answered {}",
                res.status()
            )));
        }

        tracing::info!(registry = %discovery.base, "connected to discovery backend");
        Ok(discovery)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, DiscoveryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| DiscoveryError::Lookup(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl Discovery for RegistryDiscovery {
    async fn instances(
        &self,
        query: &InstanceQuery,
    ) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        let url = self.url(&["api", "discover", query.service.as_str()])?;
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Lookup(e.to_string()))?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => res
                .json::<Vec<ServiceInstance>>()
                .await
                .map_err(|e| DiscoveryError::Lookup(e.to_string())),
            status => Err(DiscoveryError::Lookup(format!(
                "registry answered {status} for service {}",
                query.service
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enginesvc_core::HealthStatus;

    fn instance(service: &str, address: &str, tags: &[&str], health: HealthStatus) -> ServiceInstance {
        let mut instance = ServiceInstance::new(service, address).with_tags(tags.iter().copied());
        instance.set_health(health);
        instance
    }

    #[test]
    fn select_filters_tags_health_and_service() {
        let query = InstanceQuery::new("enginesvc")
            .with_tags(["prod"])
            .passing_only(true);
        let listed = vec![
            instance("enginesvc", "10.0.0.2:8080", &["prod"], HealthStatus::Healthy),
            instance("enginesvc", "10.0.0.1:8080", &["prod", "eu"], HealthStatus::Healthy),
            instance("enginesvc", "10.0.0.3:8080", &["staging"], HealthStatus::Healthy),
            instance("enginesvc", "10.0.0.4:8080", &["prod"], HealthStatus::Unhealthy),
            instance("othersvc", "10.0.0.5:8080", &["prod"], HealthStatus::Healthy),
            instance("enginesvc", "10.0.0.2:8080", &["prod"], HealthStatus::Healthy),
        ];

        assert_eq!(
            query.select(&listed),
            vec!["10.0.0.1:8080".to_string(), "10.0.0.2:8080".to_string()]
        );
    }

    #[test]
    fn select_without_health_filter_keeps_unknown() {
        let query = InstanceQuery::new("enginesvc");
        let listed = vec![instance("enginesvc", "10.0.0.9:8080", &[], HealthStatus::Unknown)];
        assert_eq!(query.select(&listed), vec!["10.0.0.9:8080".to_string()]);
    }

    #[tokio::test]
    async fn connect_rejects_invalid_address() {
        let err = RegistryDiscovery::connect("not a url").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn connect_fails_when_backend_is_down() {
        // bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = RegistryDiscovery::connect(&format!("http://{addr}"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Unreachable(_)));
    }
}
