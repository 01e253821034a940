//! Streaming Module
//!
//! Pipeline for streamed completions:
//!
//! ```text
//! bytes ─► SSE events ─► frames (chunk | [DONE]) ─► StreamEvent ─► handler
//! ```
//!
//! [`CompletionStream`] is the pull-based surface; [`drive_stream`] pushes
//! the same events into a [`StreamingResponseHandler`].

mod cancel;
mod decoder;
mod events;
mod handler;
mod sse;

pub use cancel::{CancelHandle, make_cancellable_stream};
pub use decoder::{DONE_MARKER, FrameStream, SseFrame, decode_frames};
pub use events::{CompletionStream, StreamAccumulator, StreamEvent, completion_events};
pub use handler::{StreamCallbacks, StreamState, StreamingResponseHandler, drive_stream};
pub use sse::{SseStream, SseStreamExt};
