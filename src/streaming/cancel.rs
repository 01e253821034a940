//! Cancellation utilities
//!
//! Provides first-class cancellation handles for streams.

use tokio_util::sync::CancellationToken;

use super::events::CompletionStream;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Streams observing this handle stop at the next
    /// await point and drop their body, closing the HTTP connection.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Make a `CompletionStream` cancellable and return its cancel handle.
///
/// A cancelled stream simply ends: it yields neither a `Completed` event nor
/// an error.
pub fn make_cancellable_stream(stream: CompletionStream) -> (CompletionStream, CancelHandle) {
    let handle = CancelHandle::new();
    let token = handle.token.clone();
    let mut inner = stream;
    let s = async_stream::stream! {
        use futures_util::StreamExt;
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                item = inner.next() => item,
            };
            match next {
                Some(item) => yield item,
                None => break,
            }
        }
    };
    (Box::pin(s), handle)
}
