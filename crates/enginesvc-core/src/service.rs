use std::future::Future;

use crate::{Engine, EngineError};

/// The operations every engine registry supports, whether it is the
/// in-memory store or a remote client.
pub trait EngineService: Send + Sync {
    /// Registers a new engine. Fails with [`EngineError::AlreadyExists`]
    /// when the id is taken; the stored record is never overwritten.
    fn register(&self, engine: Engine) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Looks up an engine by id, returning an owned copy.
    fn get_engine(&self, id: &str) -> impl Future<Output = Result<Engine, EngineError>> + Send;
}
