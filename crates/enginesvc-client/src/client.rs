use std::time::Duration;

use enginesvc_core::transport::{GetEngineRequest, RegisterEngineRequest};
use enginesvc_core::{Engine, EngineError, EngineService, GetEngine, RegisterEngine};
use reqwest::Client;

use crate::balancer::RoundRobin;
use crate::discovery::{Discovery, DiscoveryError, InstanceQuery, RegistryDiscovery};
use crate::endpoint::Endpoint;
use crate::endpointer::Endpointer;
use crate::http::HttpEndpoint;
use crate::instancer::Instancer;
use crate::retry::Retry;

// Every consumer of enginesvc uses the same lookup and dispatch policy.
pub const SERVICE_NAME: &str = "enginesvc";
pub const SERVICE_TAGS: &[&str] = &["prod"];
pub const PASSING_ONLY: bool = true;
pub const RETRY_MAX: usize = 3;
pub const RETRY_TIMEOUT: Duration = Duration::from_millis(500);
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Remote [`EngineService`] load-balanced over every live enginesvc
/// instance.
pub struct EngineClient {
    register: Retry<HttpEndpoint<RegisterEngine>>,
    get_engine: Retry<HttpEndpoint<GetEngine>>,
}

impl EngineClient {
    /// Connects to the discovery registry at `discovery_addr` and watches it
    /// for enginesvc instances.
    pub async fn connect(discovery_addr: &str) -> Result<Self, DiscoveryError> {
        let discovery = RegistryDiscovery::connect(discovery_addr).await?;
        Self::discover(discovery).await
    }

    /// Watches `discovery` for enginesvc instances.
    pub async fn discover<D: Discovery>(discovery: D) -> Result<Self, DiscoveryError> {
        let instancer = Instancer::spawn(discovery, instance_query(), REFRESH_INTERVAL).await?;
        Ok(Self::from_instancer(instancer))
    }

    /// Dispatches over an already-built instance view.
    pub fn from_instancer(instancer: Instancer) -> Self {
        let http = Client::new();
        Self {
            register: dispatcher(instancer.clone(), http.clone()),
            get_engine: dispatcher(instancer, http),
        }
    }
}

pub fn instance_query() -> InstanceQuery {
    InstanceQuery::new(SERVICE_NAME)
        .with_tags(SERVICE_TAGS.iter().copied())
        .passing_only(PASSING_ONLY)
}

fn dispatcher<O: enginesvc_core::Operation>(
    instancer: Instancer,
    http: Client,
) -> Retry<HttpEndpoint<O>> {
    let endpointer = Endpointer::new(instancer, HttpEndpoint::<O>::factory(http));
    Retry::new(RoundRobin::new(endpointer), RETRY_MAX, RETRY_TIMEOUT)
}

impl EngineService for EngineClient {
    async fn register(&self, engine: Engine) -> Result<(), EngineError> {
        self.register
            .call(RegisterEngineRequest { engine })
            .await?
            .into_result()
    }

    async fn get_engine(&self, id: &str) -> Result<Engine, EngineError> {
        self.get_engine
            .call(GetEngineRequest { id: id.to_string() })
            .await?
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_targets_prod_passing_instances() {
        let query = instance_query();
        assert_eq!(query.service, "enginesvc");
        assert_eq!(query.tags, vec!["prod".to_string()]);
        assert!(query.passing_only);
    }

    #[test]
    fn registry_requests_finish_within_one_refresh() {
        assert!(crate::discovery::LOOKUP_TIMEOUT < REFRESH_INTERVAL);
    }

    #[tokio::test]
    async fn empty_instance_set_fails_fast() {
        let client = EngineClient::from_instancer(Instancer::fixed(Vec::<String>::new()));

        assert_eq!(
            client.get_engine("e1").await,
            Err(EngineError::NoInstancesAvailable)
        );
        assert_eq!(
            client.register(Engine::new("e1", "f1")).await,
            Err(EngineError::NoInstancesAvailable)
        );
    }
}
