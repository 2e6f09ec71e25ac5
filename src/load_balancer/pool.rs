//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the ordered, non-empty set of backends
//! - Apply the load balancing algorithm to select the next backend

use thiserror::Error;

use crate::load_balancer::{backend::BackendEndpoint, round_robin::RoundRobin, LoadBalancer};

/// Error type for pool construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("backend pool must contain at least one endpoint")]
    Empty,
}

/// Fixed, ordered pool of backends with a round-robin cursor.
#[derive(Debug)]
pub struct BackendPool {
    endpoints: Vec<BackendEndpoint>,
    balancer: Box<dyn LoadBalancer>,
}

impl BackendPool {
    /// Create a round-robin pool. An empty endpoint list is a configuration
    /// error and is rejected here rather than at selection time.
    pub fn new(endpoints: Vec<BackendEndpoint>) -> Result<Self, PoolError> {
        Self::with_balancer(endpoints, Box::new(RoundRobin::new()))
    }

    fn with_balancer(
        endpoints: Vec<BackendEndpoint>,
        balancer: Box<dyn LoadBalancer>,
    ) -> Result<Self, PoolError> {
        if endpoints.is_empty() {
            return Err(PoolError::Empty);
        }

        tracing::debug!(
            backend_count = endpoints.len(),
            backends = ?endpoints.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Backend pool ready"
        );

        Ok(Self {
            endpoints,
            balancer,
        })
    }

    /// Select the next backend and advance the cursor.
    pub fn select_next(&self) -> &BackendEndpoint {
        let index = self.balancer.next_index(self.endpoints.len());
        &self.endpoints[index]
    }

    /// All endpoints in selection order.
    pub fn endpoints(&self) -> &[BackendEndpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
