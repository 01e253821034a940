//! SSE decoding on top of `eventsource-stream`.
//!
//! Handles UTF-8 boundaries, line buffering and multi-line `data:` fields so
//! callers only see complete events.

use eventsource_stream::{Event, Eventsource};
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;

use crate::error::LlmError;

pub type SseStream = Pin<Box<dyn Stream<Item = Result<Event, LlmError>> + Send>>;

/// Turn a byte stream into a stream of SSE events.
pub trait SseStreamExt {
    fn into_sse_stream(self) -> SseStream;
}

impl<S, B, E> SseStreamExt for S
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    fn into_sse_stream(self) -> SseStream {
        Box::pin(
            self.eventsource()
                .map(|item| item.map_err(|e| LlmError::StreamError(format!("SSE error: {e}")))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reassembles_events_split_across_chunks() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"a\":".to_vec()),
            Ok(b"1}\n\n: keep-alive\n\ndata: [DO".to_vec()),
            Ok(b"NE]\n\n".to_vec()),
        ];
        let events: Vec<Event> = futures_util::stream::iter(chunks)
            .into_sse_stream()
            .map(|e| e.expect("event"))
            .collect()
            .await;

        let data: Vec<&str> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["{\"a\":1}", "[DONE]"]);
    }

    #[tokio::test]
    async fn transport_errors_surface_as_stream_errors() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ))];
        let mut stream = futures_util::stream::iter(chunks).into_sse_stream();
        let err = stream.next().await.expect("item").expect_err("error");
        assert!(matches!(err, LlmError::StreamError(msg) if msg.contains("reset")));
    }
}
