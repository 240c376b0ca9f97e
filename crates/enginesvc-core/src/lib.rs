pub mod engine;
pub mod errors;
pub mod health;
pub mod instance;
pub mod middleware;
pub mod registry;
pub mod service;
pub mod transport;

pub use engine::Engine;
pub use errors::EngineError;
pub use health::HealthStatus;
pub use instance::ServiceInstance;
pub use middleware::{Logging, LoggingLayer};
pub use registry::EngineRegistry;
pub use service::EngineService;
pub use transport::{GetEngine, Operation, RegisterEngine};
