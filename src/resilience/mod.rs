//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Backend dial / socket read:
//!     → timeouts.rs (optional deadline)
//!     → On failure: the session decides (dial and client read are terminal,
//!       backend read is not)
//! ```
//!
//! # Design Decisions
//! - No retries and no fallback backend anywhere
//! - Deadlines are opt-in; the default is to wait indefinitely

pub mod timeouts;
