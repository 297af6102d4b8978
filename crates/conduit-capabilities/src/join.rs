//! ---
//! conduit_section: "09-integration-interoperability"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Provider registration across routing, discovery and managers."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
//! Fan-out and fan-in of concurrent collaborator calls.

use std::future::Future;
use std::pin::pin;
use std::task::Poll;

use futures::future::{self, Either, FutureExt, Ready};

/// Issue `call` now by polling it once.
///
/// The collaborator runs up to its first suspension point before this
/// returns; the result is a future yielding the call's output either way.
pub async fn start<F>(mut call: F) -> Either<Ready<F::Output>, F>
where
    F: Future + Unpin,
{
    match future::poll_fn(|cx| Poll::Ready(call.poll_unpin(cx))).await {
        Poll::Ready(output) => Either::Left(future::ready(output)),
        Poll::Pending => Either::Right(call),
    }
}

/// Drive both futures to completion and report the first failure to settle.
///
/// The remaining future is always awaited, so neither call is cancelled by
/// the other's failure.
pub async fn settle_both<A, B, E>(first: A, second: B) -> Result<(), E>
where
    A: Future<Output = Result<(), E>>,
    B: Future<Output = Result<(), E>>,
{
    let first = pin!(first);
    let second = pin!(second);
    match future::select(first, second).await {
        Either::Left((settled, remaining)) => {
            let later = remaining.await;
            settled.and(later)
        }
        Either::Right((settled, remaining)) => {
            let later = remaining.await;
            settled.and(later)
        }
    }
}
