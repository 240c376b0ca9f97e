use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::RwLock;

use crate::{Engine, EngineError, EngineService};

/// In-memory engine store.
///
/// Lookups share a read lock; registration takes the write lock only for
/// the check-and-insert, so concurrent registrations of one id resolve to
/// exactly one winner.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: RwLock<HashMap<String, Engine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.engines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.read().is_empty()
    }
}

impl EngineService for EngineRegistry {
    async fn register(&self, engine: Engine) -> Result<(), EngineError> {
        let mut engines = self.engines.write();
        match engines.entry(engine.id.clone()) {
            // POST creates, it never overwrites
            Entry::Occupied(_) => Err(EngineError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(engine);
                Ok(())
            }
        }
    }

    async fn get_engine(&self, id: &str) -> Result<Engine, EngineError> {
        self.engines
            .read()
            .get(id)
            .cloned()
            .ok_or(EngineError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn engine(id: &str) -> Engine {
        Engine {
            id: id.to_string(),
            factory_id: "f1".to_string(),
            engine_config: "inline-4".to_string(),
            engine_capacity: 2.0,
            fuel_capacity: 55.5,
            fuel_range: 700.0,
            engine_hp: 180.0,
            engine_torque: 250.0,
        }
    }

    #[tokio::test]
    async fn test_register_then_get_round_trips() {
        let registry = EngineRegistry::new();
        registry.register(engine("e1")).await.unwrap();

        let stored = registry.get_engine("e1").await.unwrap();
        assert_eq!(stored, engine("e1"));
    }

    #[tokio::test]
    async fn test_duplicate_register_keeps_first_value() {
        let registry = EngineRegistry::new();
        registry.register(engine("e1")).await.unwrap();

        let mut second = engine("e1");
        second.factory_id = "f2".to_string();
        let err = registry.register(second).await.unwrap_err();

        assert_eq!(err, EngineError::AlreadyExists);
        assert_eq!(registry.get_engine("e1").await.unwrap().factory_id, "f1");
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registry = EngineRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.get_engine("missing").await.unwrap_err(),
            EngineError::NotFound
        );
    }

    #[tokio::test]
    async fn test_returned_engine_is_a_copy() {
        let registry = EngineRegistry::new();
        registry.register(engine("e1")).await.unwrap();

        let mut copy = registry.get_engine("e1").await.unwrap();
        copy.engine_hp = 9999.0;

        assert_eq!(registry.get_engine("e1").await.unwrap().engine_hp, 180.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_registrations_all_succeed() {
        let registry = Arc::new(EngineRegistry::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.register(engine(&format!("e{i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(registry.len(), 64);
        for i in 0..64 {
            assert!(registry.get_engine(&format!("e{i}")).await.is_ok());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_id_has_one_winner() {
        let registry = Arc::new(EngineRegistry::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let mut candidate = engine("shared");
                    candidate.factory_id = format!("f{i}");
                    registry.register(candidate).await
                })
            })
            .collect();

        let mut successes = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(EngineError::AlreadyExists) => rejected += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(rejected, 63);
        assert_eq!(registry.len(), 1);
    }
}
