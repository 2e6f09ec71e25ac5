//! Optional deadline enforcement.
//!
//! # Responsibilities
//! - Wrap dial and read futures with an optional deadline
//! - Report an elapsed deadline as `io::ErrorKind::TimedOut`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `None` waits forever, which is the default policy

use std::future::Future;
use std::io;
use std::time::Duration;

/// Await `fut`, failing with `TimedOut` if `deadline` elapses first.
pub async fn with_deadline<F, T>(deadline: Option<Duration>, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match deadline {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("deadline of {limit:?} elapsed"),
            )),
        },
    }
}
