//! Deadline for a single request/response exchange.
//!
//! When the deadline passes the in-flight future is dropped, which aborts
//! the underlying connection (native) or fetch (wasm).

use std::future::Future;
use std::time::Duration;

/// Returned when the deadline passes first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed;

#[cfg(not(target_arch = "wasm32"))]
pub async fn with_timeout<F: Future>(after: Duration, future: F) -> Result<F::Output, Elapsed> {
    tokio::time::timeout(after, future).await.map_err(|_| Elapsed)
}

#[cfg(target_arch = "wasm32")]
pub async fn with_timeout<F: Future>(after: Duration, future: F) -> Result<F::Output, Elapsed> {
    use futures::future::{Either, select};

    let millis = u32::try_from(after.as_millis()).unwrap_or(u32::MAX);
    let sleep = std::pin::pin!(gloo_timers::future::TimeoutFuture::new(millis));
    let future = std::pin::pin!(future);

    match select(future, sleep).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(_) => Err(Elapsed),
    }
}
