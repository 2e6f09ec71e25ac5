//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → a `session` span per client (id, peer, backend)
//!
//! Consumers:
//!     → logging.rs (fmt layer to stdout, filtered by level)
//! ```

pub mod logging;
