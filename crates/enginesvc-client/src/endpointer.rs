use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::endpoint::{Endpoint, Factory};
use crate::instancer::Instancer;

/// Turns the live instance set into one endpoint per address.
///
/// Endpoints are cached and only rebuilt when the set changes; an address
/// that stays in the set keeps its endpoint.
pub struct Endpointer<E> {
    instancer: Instancer,
    factory: Factory<E>,
    cache: Mutex<Cache<E>>,
}

struct Cache<E> {
    addresses: Option<Vec<String>>,
    by_address: HashMap<String, Arc<E>>,
    endpoints: Vec<Arc<E>>,
}

impl<E: Endpoint> Endpointer<E> {
    pub fn new(instancer: Instancer, factory: Factory<E>) -> Self {
        Self {
            instancer,
            factory,
            cache: Mutex::new(Cache {
                addresses: None,
                by_address: HashMap::new(),
                endpoints: Vec::new(),
            }),
        }
    }

    /// Endpoints for the current instance set, in address order.
    pub fn endpoints(&self) -> Vec<Arc<E>> {
        let addresses = self.instancer.addresses();
        let mut cache = self.cache.lock();
        if cache.addresses.as_ref() != Some(&addresses) {
            self.rebuild(&mut cache, addresses);
        }
        cache.endpoints.clone()
    }

    fn rebuild(&self, cache: &mut Cache<E>, addresses: Vec<String>) {
        let mut by_address = HashMap::with_capacity(addresses.len());
        let mut endpoints = Vec::with_capacity(addresses.len());

        for address in &addresses {
            let endpoint = match cache.by_address.remove(address) {
                Some(existing) => existing,
                None => match (self.factory)(address) {
                    Ok(endpoint) => Arc::new(endpoint),
                    Err(err) => {
                        tracing::warn!(instance = %address, error = %err, "skipping instance");
                        continue;
                    }
                },
            };
            by_address.insert(address.clone(), endpoint.clone());
            endpoints.push(endpoint);
        }

        tracing::debug!(instances = endpoints.len(), "endpoints rebuilt");
        cache.by_address = by_address;
        cache.endpoints = endpoints;
        cache.addresses = Some(addresses);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEndpoint;
    use enginesvc_core::EngineError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::watch;

    fn counting_factory(built: Arc<AtomicUsize>) -> Factory<FakeEndpoint> {
        Box::new(move |address| {
            built.fetch_add(1, Ordering::SeqCst);
            Ok(FakeEndpoint::succeeding(address))
        })
    }

    #[test]
    fn test_one_endpoint_per_address() {
        let built = Arc::new(AtomicUsize::new(0));
        let endpointer = Endpointer::new(
            Instancer::fixed(["a:1", "b:1", "c:1"]),
            counting_factory(built.clone()),
        );

        let endpoints = endpointer.endpoints();
        let names: Vec<&str> = endpoints.iter().map(|e| e.address()).collect();
        assert_eq!(names, vec!["a:1", "b:1", "c:1"]);

        endpointer.endpoints();
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_changes_reuse_surviving_endpoints() {
        let built = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(vec!["a:1".to_string(), "b:1".to_string()]);
        let endpointer = Endpointer::new(Instancer::from_receiver(rx), counting_factory(built.clone()));

        let before = endpointer.endpoints();
        tx.send(vec!["b:1".to_string(), "c:1".to_string()]).unwrap();
        let after = endpointer.endpoints();

        assert_eq!(after.len(), 2);
        assert!(Arc::ptr_eq(&before[1], &after[0]));
        assert_eq!(after[1].address(), "c:1");
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_empty_set_yields_no_endpoints() {
        let endpointer: Endpointer<FakeEndpoint> = Endpointer::new(
            Instancer::fixed(Vec::<String>::new()),
            counting_factory(Arc::new(AtomicUsize::new(0))),
        );
        assert!(endpointer.endpoints().is_empty());
    }

    #[test]
    fn test_factory_failure_skips_instance() {
        let factory: Factory<FakeEndpoint> = Box::new(|address| {
            if address == "bad:1" {
                Err(EngineError::Transport("unparseable".into()))
            } else {
                Ok(FakeEndpoint::succeeding(address))
            }
        });
        let endpointer = Endpointer::new(Instancer::fixed(["bad:1", "good:1"]), factory);

        let endpoints = endpointer.endpoints();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].address(), "good:1");
    }
}
