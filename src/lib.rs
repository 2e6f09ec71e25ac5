//! Round-robin TCP load balancer library.

pub mod config;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use lifecycle::{start, Proxy};
pub use load_balancer::{BackendEndpoint, BackendPool};
