//! Tool gateway adapters
//!
//! Workers reach telemetry backends through [`HttpToolGateway`], normally
//! decorated by [`CircuitBreakerToolGateway`]. [`DisabledToolGateway`] stands
//! in when no endpoint is configured.

mod circuit_breaker;
mod http_gateway;

pub use circuit_breaker::{CircuitBreakerToolGateway, CircuitState};
pub use http_gateway::{DisabledToolGateway, HttpToolGateway};
