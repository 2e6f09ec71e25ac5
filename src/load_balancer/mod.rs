//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Connection accepted
//!     → pool.rs (fixed, ordered endpoints)
//!     → round_robin.rs (atomic select-and-advance)
//!     → backend.rs (endpoint handed to the relay)
//! ```
//!
//! # Design Decisions
//! - The cursor is the only state shared between sessions
//! - Selection never fails: an empty pool is refused at construction
//! - No health filtering; an unreachable backend still consumes its turn

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::BackendEndpoint;
pub use pool::{BackendPool, PoolError};
pub use round_robin::RoundRobin;

/// Strategy that picks a slot in a pool of `len` backends.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Return the next slot in `0..len`. `len` is never zero.
    fn next_index(&self, len: usize) -> usize;
}
