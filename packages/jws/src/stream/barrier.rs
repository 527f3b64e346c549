//! Two-input completion barrier
//!
//! Finalization runs exactly once, on whichever close leaves both inputs closed
//! while the barrier is still waiting. Its outcome is broadcast to event listeners
//! and to every pending [`AsyncJwsResult`].

use super::cell::{CellValue, InputCell};
use crate::api::AsyncJwsResult;
use crate::error::{JwsError, JwsResult};
use tokio::sync::oneshot;

/// Barrier lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// At least one input is still open
    Waiting,
    /// Finalized with a result
    Done,
    /// Finalized with an error
    Failed,
}

/// Notification emitted on finalization
///
/// Success emits `Done`, `Data`, `End`; failure emits `Error`, `Close`.
#[derive(Debug)]
pub enum StreamEvent<'a, R> {
    /// Finalize succeeded
    Done(&'a R),
    /// The result, for consumers reading the stream as data
    Data(&'a R),
    /// No further events after a success
    End,
    /// Finalize failed
    Error(&'a JwsError),
    /// No further events after a failure
    Close,
}

/// Event callback
pub type Listener<R> = Box<dyn FnMut(&StreamEvent<'_, R>) + Send>;

pub(crate) struct CompletionBarrier<A, B, R> {
    first: InputCell<A>,
    second: InputCell<B>,
    state: StreamState,
    outcome: Option<JwsResult<R>>,
    listeners: Vec<Listener<R>>,
    waiters: Vec<oneshot::Sender<JwsResult<R>>>,
}

impl<A: CellValue, B: CellValue, R: Clone> CompletionBarrier<A, B, R> {
    pub(crate) fn new(first: &'static str, second: &'static str) -> Self {
        Self {
            first: InputCell::new(first),
            second: InputCell::new(second),
            state: StreamState::Waiting,
            outcome: None,
            listeners: Vec::new(),
            waiters: Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> StreamState {
        self.state
    }

    pub(crate) fn is_readable(&self) -> bool {
        self.state == StreamState::Waiting
    }

    pub(crate) fn subscribe(
        &mut self,
        listener: impl FnMut(&StreamEvent<'_, R>) + Send + 'static,
    ) {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn completion(&mut self) -> AsyncJwsResult<R> {
        let (tx, rx) = oneshot::channel();
        match &self.outcome {
            Some(outcome) => {
                let _ = tx.send(outcome.clone());
            }
            None => self.waiters.push(tx),
        }
        AsyncJwsResult::new(rx)
    }

    pub(crate) fn write_first(&mut self, chunk: &[u8]) -> JwsResult<()> {
        self.first.write(chunk)
    }

    pub(crate) fn write_second(&mut self, chunk: &[u8]) -> JwsResult<()> {
        self.second.write(chunk)
    }

    pub(crate) fn close_first(
        &mut self,
        finalize: impl FnOnce(A, B) -> JwsResult<R>,
    ) -> JwsResult<()> {
        self.first.close()?;
        self.settle(finalize);
        Ok(())
    }

    pub(crate) fn close_second(
        &mut self,
        finalize: impl FnOnce(A, B) -> JwsResult<R>,
    ) -> JwsResult<()> {
        self.second.close()?;
        self.settle(finalize);
        Ok(())
    }

    pub(crate) fn fill_first(
        &mut self,
        value: A,
        finalize: impl FnOnce(A, B) -> JwsResult<R>,
    ) -> JwsResult<()> {
        self.first.fill(value)?;
        self.settle(finalize);
        Ok(())
    }

    pub(crate) fn fill_second(
        &mut self,
        value: B,
        finalize: impl FnOnce(A, B) -> JwsResult<R>,
    ) -> JwsResult<()> {
        self.second.fill(value)?;
        self.settle(finalize);
        Ok(())
    }

    fn settle(&mut self, finalize: impl FnOnce(A, B) -> JwsResult<R>) {
        if self.first.is_writable() || self.second.is_writable() || !self.is_readable() {
            return;
        }

        let outcome = finalize(self.first.take(), self.second.take());
        self.state = match outcome {
            Ok(_) => StreamState::Done,
            Err(_) => StreamState::Failed,
        };
        tracing::debug!(
            first = self.first.name(),
            second = self.second.name(),
            state = ?self.state,
            "stream finalized"
        );

        match &outcome {
            Ok(result) => {
                for event in [
                    StreamEvent::Done(result),
                    StreamEvent::Data(result),
                    StreamEvent::End,
                ] {
                    for listener in &mut self.listeners {
                        listener(&event);
                    }
                }
            }
            Err(error) => {
                for event in [StreamEvent::Error(error), StreamEvent::Close] {
                    for listener in &mut self.listeners {
                        listener(&event);
                    }
                }
            }
        }

        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Concat = CompletionBarrier<String, String, String>;

    fn concat(a: String, b: String) -> JwsResult<String> {
        Ok(format!("{a}+{b}"))
    }

    fn recorder(barrier: &mut Concat) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        barrier.subscribe(move |event| {
            let label = match event {
                StreamEvent::Done(r) => format!("done:{r}"),
                StreamEvent::Data(r) => format!("data:{r}"),
                StreamEvent::End => "end".to_string(),
                StreamEvent::Error(e) => format!("error:{e}"),
                StreamEvent::Close => "close".to_string(),
            };
            sink.lock().expect("lock").push(label);
        });
        seen
    }

    #[test]
    fn finalizes_once_after_both_close() {
        let mut barrier = Concat::new("a", "b");
        let seen = recorder(&mut barrier);

        barrier.write_second(b"y").expect("write");
        barrier.close_second(concat).expect("close");
        assert_eq!(barrier.state(), StreamState::Waiting);
        assert!(seen.lock().expect("lock").is_empty());

        barrier.write_first(b"x").expect("write");
        barrier.close_first(concat).expect("close");
        assert_eq!(barrier.state(), StreamState::Done);
        assert_eq!(*seen.lock().expect("lock"), ["done:x+y", "data:x+y", "end"]);
    }

    #[test]
    fn failure_emits_error_then_close() {
        let mut barrier = Concat::new("a", "b");
        let seen = recorder(&mut barrier);
        barrier.fill_first("x".into(), concat).expect("fill");
        barrier
            .fill_second("y".into(), |_, _| Err(JwsError::MissingAlgorithm))
            .expect("fill");
        assert_eq!(barrier.state(), StreamState::Failed);
        assert!(!barrier.is_readable());
        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("error:"));
        assert_eq!(seen[1], "close");
    }

    #[test]
    fn closed_inputs_reject_further_use() {
        let mut barrier = Concat::new("a", "b");
        barrier.close_first(concat).expect("close");
        assert_eq!(
            barrier.write_first(b"late"),
            Err(JwsError::InputClosed("a")),
        );
        assert_eq!(barrier.close_first(concat), Err(JwsError::InputClosed("a")));
    }

    #[tokio::test]
    async fn completion_resolves_before_and_after_finalize() {
        let mut barrier = Concat::new("a", "b");
        let early = barrier.completion();
        barrier.fill_first("x".into(), concat).expect("fill");
        barrier.fill_second("y".into(), concat).expect("fill");
        let late = barrier.completion();
        assert_eq!(early.await, Ok("x+y".to_string()));
        assert_eq!(late.await, Ok("x+y".to_string()));
    }
}
