//! Callback Adapter
//!
//! Turns one callback-style transport call into a future. A failed call
//! either propagates its error or settles with a caller-chosen substitute.

use std::time::Duration;
use tokio::sync::oneshot;

use crate::domain::TransportError;
use crate::ports::Callback;

/// What to do when the call fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OnError<T> {
    /// Fail with the reported error.
    Propagate,
    /// Settle with this value instead.
    Substitute(T),
}

/// A settled call: the transport's value, or the substitute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settled<T> {
    /// The transport reported success.
    Value(T),
    /// The transport failed and the substitute was used.
    Fallback(T),
}

impl<T> Settled<T> {
    /// The carried value, whichever way it was obtained.
    pub fn into_inner(self) -> T {
        match self {
            Settled::Value(v) | Settled::Fallback(v) => v,
        }
    }

    /// True if the substitute was used.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Settled::Fallback(_))
    }
}

/// Issue `call` and wait for its callback.
///
/// A synchronous refusal and a callback error are treated alike.
pub async fn settle<T, F>(call: F, on_error: OnError<T>) -> Result<Settled<T>, TransportError>
where
    T: Send + 'static,
    F: FnOnce(Callback<T>) -> Result<(), TransportError>,
{
    settle_within(call, on_error, None).await
}

/// [`settle`] with an optional deadline on the callback. A missed deadline
/// counts as a failure.
pub async fn settle_within<T, F>(
    call: F,
    on_error: OnError<T>,
    timeout: Option<Duration>,
) -> Result<Settled<T>, TransportError>
where
    T: Send + 'static,
    F: FnOnce(Callback<T>) -> Result<(), TransportError>,
{
    let (tx, rx) = oneshot::channel();
    let done: Callback<T> = Box::new(move |result| {
        // Receiver gone means the caller stopped waiting.
        let _ = tx.send(result);
    });

    let outcome = match call(done) {
        Err(refused) => Err(refused),
        Ok(()) => match timeout {
            None => rx.await.unwrap_or(Err(TransportError::CallbackDropped)),
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received.unwrap_or(Err(TransportError::CallbackDropped)),
                Err(_) => Err(TransportError::TimedOut(limit.as_millis() as u64)),
            },
        },
    };

    match (outcome, on_error) {
        (Ok(value), _) => Ok(Settled::Value(value)),
        (Err(_), OnError::Substitute(fallback)) => Ok(Settled::Fallback(fallback)),
        (Err(error), OnError::Propagate) => Err(error),
    }
}
