//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Build pool → Bind listener → Serve forever
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then pool, then listener
//! - There is no shutdown path; the process is stopped externally

pub mod startup;

pub use startup::{start, Proxy, StartupError};
