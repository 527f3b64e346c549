//! Awaitable outcomes of signing and verification
//!
//! `JwsBuilder::sign_async` and `JwsBuilder::verify_async` run on a spawned task, and a stream's
//! `completion()` resolves once both of its inputs close. Either way the outcome
//! arrives over a oneshot channel and is awaited as an [`AsyncJwsResult`].

use crate::error::{JwsError, JwsResult};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::oneshot;

/// Future resolving to a signed token, a verification verdict or the error that ended
/// the operation
pub struct AsyncJwsResult<T> {
    receiver: oneshot::Receiver<JwsResult<T>>,
}

impl<T> AsyncJwsResult<T> {
    pub(crate) fn new(receiver: oneshot::Receiver<JwsResult<T>>) -> Self {
        Self { receiver }
    }
}

impl<T> Future for AsyncJwsResult<T> {
    type Output = JwsResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(JwsError::internal("Channel closed"))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_sent_result() {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(7u8));
        assert_eq!(AsyncJwsResult::new(rx).await, Ok(7));
    }

    #[tokio::test]
    async fn dropped_sender_is_an_internal_error() {
        let (tx, rx) = oneshot::channel::<JwsResult<u8>>();
        drop(tx);
        assert_eq!(
            AsyncJwsResult::new(rx).await,
            Err(JwsError::Internal("Channel closed".to_string()))
        );
    }
}
