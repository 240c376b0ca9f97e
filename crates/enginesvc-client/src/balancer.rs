use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use enginesvc_core::EngineError;

use crate::endpoint::Endpoint;
use crate::endpointer::Endpointer;

/// Round-robin selection over the endpointer's current endpoints.
///
/// The cursor is shared by every caller, so concurrent calls spread across
/// instances as well.
pub struct RoundRobin<E> {
    endpointer: Endpointer<E>,
    next: AtomicUsize,
}

impl<E: Endpoint> RoundRobin<E> {
    pub fn new(endpointer: Endpointer<E>) -> Self {
        Self {
            endpointer,
            next: AtomicUsize::new(0),
        }
    }

    /// Next endpoint in rotation, or `NoInstancesAvailable` when the set
    /// is empty.
    pub fn endpoint(&self) -> Result<Arc<E>, EngineError> {
        let endpoints = self.endpointer.endpoints();
        if endpoints.is_empty() {
            return Err(EngineError::NoInstancesAvailable);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % endpoints.len();
        Ok(endpoints[index].clone())
    }
}
