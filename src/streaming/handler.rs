//! Callback-style stream consumption
//!
//! [`drive_stream`] runs the streaming state machine
//! `Idle → Connecting → Streaming → {Completed | Failed | Cancelled}` and
//! feeds a [`StreamingResponseHandler`]. `on_next` fires once per delta in
//! arrival order; exactly one of `on_complete` / `on_error` fires at the
//! end, unless the caller cancels, in which case neither does.

use futures_util::StreamExt;
use std::future::Future;
use tracing::{debug, trace};

use super::cancel::CancelHandle;
use super::events::{CompletionStream, StreamEvent};
use crate::error::LlmError;
use crate::types::Response;

/// Receives the output of a streaming completion.
pub trait StreamingResponseHandler: Send {
    /// A new piece of generated text.
    fn on_next(&mut self, token: &str);

    /// The stream finished; `response` holds the full text.
    fn on_complete(&mut self, response: Response<String>);

    /// The stream failed. No other callback follows.
    fn on_error(&mut self, error: LlmError);
}

/// Lifecycle of one streaming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    fn can_transition_to(self, next: StreamState) -> bool {
        use StreamState::*;
        match (self, next) {
            (Idle, Connecting) => true,
            (Connecting, Streaming) => true,
            (Streaming, Streaming) => true,
            (Connecting | Streaming, Completed | Failed | Cancelled) => true,
            _ => false,
        }
    }
}

struct StateMachine {
    state: StreamState,
}

impl StateMachine {
    fn new() -> Self {
        Self {
            state: StreamState::Idle,
        }
    }

    fn advance(&mut self, next: StreamState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid stream transition {:?} -> {:?}",
            self.state,
            next
        );
        trace!(from = ?self.state, to = ?next, "stream state");
        self.state = next;
    }
}

/// Closure-based [`StreamingResponseHandler`].
pub struct StreamCallbacks<'a> {
    on_next: Box<dyn FnMut(&str) + Send + 'a>,
    on_complete: Box<dyn FnMut(Response<String>) + Send + 'a>,
    on_error: Box<dyn FnMut(LlmError) + Send + 'a>,
}

impl<'a> StreamCallbacks<'a> {
    pub fn new(on_next: impl FnMut(&str) + Send + 'a) -> Self {
        Self {
            on_next: Box::new(on_next),
            on_complete: Box::new(|_| {}),
            on_error: Box::new(|_| {}),
        }
    }

    pub fn on_complete(mut self, f: impl FnMut(Response<String>) + Send + 'a) -> Self {
        self.on_complete = Box::new(f);
        self
    }

    pub fn on_error(mut self, f: impl FnMut(LlmError) + Send + 'a) -> Self {
        self.on_error = Box::new(f);
        self
    }
}

impl StreamingResponseHandler for StreamCallbacks<'_> {
    fn on_next(&mut self, token: &str) {
        (self.on_next)(token)
    }

    fn on_complete(&mut self, response: Response<String>) {
        (self.on_complete)(response)
    }

    fn on_error(&mut self, error: LlmError) {
        (self.on_error)(error)
    }
}

async fn wait_cancelled(cancel: Option<&CancelHandle>) {
    match cancel {
        Some(handle) => handle.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Open a stream with `connect` and deliver it to `handler`.
///
/// Returns the terminal state reached. Cancellation through `cancel` drops
/// the connection and suppresses every further callback.
pub async fn drive_stream<F, H>(
    connect: F,
    handler: &mut H,
    cancel: Option<&CancelHandle>,
) -> StreamState
where
    F: Future<Output = Result<CompletionStream, LlmError>>,
    H: StreamingResponseHandler + ?Sized,
{
    let mut machine = StateMachine::new();
    machine.advance(StreamState::Connecting);

    let connected = tokio::select! {
        biased;
        _ = wait_cancelled(cancel) => None,
        result = connect => Some(result),
    };

    let mut stream = match connected {
        None => {
            machine.advance(StreamState::Cancelled);
            debug!("stream cancelled while connecting");
            return machine.state;
        }
        Some(Err(error)) => {
            machine.advance(StreamState::Failed);
            handler.on_error(error);
            return machine.state;
        }
        Some(Ok(stream)) => stream,
    };

    loop {
        let next = tokio::select! {
            biased;
            _ = wait_cancelled(cancel) => {
                machine.advance(StreamState::Cancelled);
                debug!("stream cancelled by caller");
                return machine.state;
            }
            item = stream.next() => item,
        };

        match next {
            Some(Ok(StreamEvent::Delta(token))) => {
                machine.advance(StreamState::Streaming);
                handler.on_next(&token);
            }
            Some(Ok(StreamEvent::Completed(response))) => {
                machine.advance(StreamState::Completed);
                handler.on_complete(response);
                return machine.state;
            }
            Some(Err(error)) => {
                machine.advance(StreamState::Failed);
                handler.on_error(error);
                return machine.state;
            }
            None => {
                machine.advance(StreamState::Failed);
                handler.on_error(LlmError::StreamError(
                    "stream ended without a terminal event".to_string(),
                ));
                return machine.state;
            }
        }
    }
}
