//! Completion stream events and the accumulator that produces them.

use futures_util::{Stream, StreamExt};
use std::pin::Pin;

use super::decoder::{FrameStream, SseFrame};
use crate::error::LlmError;
use crate::mapper::{StreamFrame, stream_frame_from};
use crate::types::{FinishReason, Response, Usage};

/// One incremental unit of a streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Newly generated text, in arrival order.
    Delta(String),
    /// Terminal event: the full text plus final usage and finish reason.
    Completed(Response<String>),
}

pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Collects deltas and remembers the last usage/finish reason seen.
#[derive(Debug, Clone, Default)]
pub struct StreamAccumulator {
    content: String,
    usage: Option<Usage>,
    finish_reason: Option<FinishReason>,
    frames: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame; returns the delta to forward, if any.
    pub fn push(&mut self, frame: StreamFrame) -> Option<String> {
        self.frames += 1;
        if frame.usage.is_some() {
            self.usage = frame.usage;
        }
        if frame.finish_reason.is_some() {
            self.finish_reason = frame.finish_reason;
        }
        let delta = frame.delta?;
        self.content.push_str(&delta);
        Some(delta)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Whether a frame carrying a finish reason has been seen.
    pub fn saw_finish_reason(&self) -> bool {
        self.finish_reason.is_some()
    }

    pub fn finish(self) -> Response<String> {
        Response::new(self.content)
            .with_usage(self.usage)
            .with_finish_reason(self.finish_reason)
    }
}

/// Turn decoded frames into `Delta`s followed by exactly one terminal item:
/// a `Completed` event or an error.
///
/// The stream completes on `[DONE]`, or on close after a frame that carried
/// a finish reason. Closing before either is an error.
pub fn completion_events(mut frames: FrameStream) -> CompletionStream {
    let out = async_stream::stream! {
        let mut acc = StreamAccumulator::new();

        loop {
            match frames.next().await {
                Some(Ok(SseFrame::Chunk(chunk))) => {
                    if let Some(delta) = acc.push(stream_frame_from(&chunk)) {
                        yield Ok(StreamEvent::Delta(delta));
                    }
                }
                Some(Ok(SseFrame::Done)) => {
                    yield Ok(StreamEvent::Completed(acc.finish()));
                    return;
                }
                Some(Err(e)) => {
                    yield Err(e);
                    return;
                }
                None => {
                    if acc.saw_finish_reason() {
                        yield Ok(StreamEvent::Completed(acc.finish()));
                    } else {
                        yield Err(LlmError::StreamError(format!(
                            "stream closed before a terminal frame ({} frames received)",
                            acc.frames()
                        )));
                    }
                    return;
                }
            }
        }
    };

    Box::pin(out)
}
