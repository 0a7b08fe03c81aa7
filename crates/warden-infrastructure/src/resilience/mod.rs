//! Resilience Layer (§4.7): retry -> circuit-breaker -> timeout pipelines,
//! named per external dependency. Each pipeline is composed at
//! construction time; callers never subclass or decorate across layers.

mod breaker;
mod pipeline;
mod retry;
mod timeout;

pub use breaker::{BreakerState, CircuitBreaker, CircuitBreakerSettings};
pub use pipeline::{NamedPipeline, PipelineSettings};
pub use retry::RetrySettings;
pub use timeout::AdaptiveTimeout;
