//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, optional connection cap)
//!     → load_balancer (next backend)
//!     → connection.rs (session id, live-session tracking)
//!     → relay.rs (dial backend, pump bytes, close both sockets)
//!
//! Listener states:
//!     Initializing → Listening → (Accepting ⇄ Dispatching)*
//! ```
//!
//! # Design Decisions
//! - One spawned task per session; the accept loop never awaits a relay
//! - Accept errors are logged and skipped; setup errors are fatal
//! - Each session owns its two sockets exclusively

pub mod connection;
pub mod listener;
pub mod relay;

pub use listener::{Listener, ListenerError};
pub use relay::{RelayError, RelayPolicy, RelayStats};
