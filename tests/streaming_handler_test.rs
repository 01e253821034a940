//! Handler-driven streaming against scripted SSE bodies.

mod support;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use mistralai::prelude::*;
use support::scripted_config;
use support::scripted_transport::{Scripted, ScriptedTransport};
use support::stream_fixture::load_sse_fixture_as_chunks;

#[derive(Default)]
struct Recorder {
    tokens: Vec<String>,
    completed: Vec<Response<String>>,
    errors: Vec<LlmError>,
}

impl StreamingResponseHandler for Recorder {
    fn on_next(&mut self, token: &str) {
        self.tokens.push(token.to_string());
    }

    fn on_complete(&mut self, response: Response<String>) {
        self.completed.push(response);
    }

    fn on_error(&mut self, error: LlmError) {
        self.errors.push(error);
    }
}

fn model_with(transport: Arc<ScriptedTransport>) -> StreamingCompletionModel {
    let client = MistralClient::with_transport(scripted_config(3), transport).unwrap();
    StreamingCompletionModel::new(client)
}

#[tokio::test]
async fn deltas_arrive_in_order_then_one_completion() {
    let chunks = load_sse_fixture_as_chunks("fim_stream.sse").unwrap();
    let transport = Arc::new(ScriptedTransport::always(Scripted::Chunks(chunks)));
    let model = model_with(transport.clone());

    let mut recorder = Recorder::default();
    let state = model
        .generate_with_suffix("def add(a, b):", "", &mut recorder)
        .await;

    assert_eq!(state, StreamState::Completed);
    assert_eq!(recorder.tokens, vec!["\n    ", "return", " a + b"]);
    assert_eq!(recorder.completed.len(), 1);
    assert_eq!(recorder.completed[0].content, recorder.tokens.concat());
    assert!(recorder.errors.is_empty());

    let request = &transport.requests()[0];
    assert!(request.ctx.stream);
    assert_eq!(request.body.as_ref().unwrap()["stream"], true);
    assert_eq!(request.headers["accept"], "text/event-stream");
}

#[tokio::test]
async fn byte_level_fragmentation_does_not_change_the_result() {
    let whole: Vec<u8> = load_sse_fixture_as_chunks("fim_stream.sse")
        .unwrap()
        .concat();
    let fragments: Vec<Vec<u8>> = whole.chunks(7).map(<[u8]>::to_vec).collect();
    let transport = Arc::new(ScriptedTransport::always(Scripted::Chunks(fragments)));

    let mut recorder = Recorder::default();
    model_with(transport)
        .generate("def add(a, b):", &mut recorder)
        .await;

    assert_eq!(recorder.tokens.concat(), "\n    return a + b");
    assert_eq!(recorder.completed.len(), 1);
}

#[tokio::test]
async fn premature_close_reports_one_error_and_no_completion() {
    let chunks = load_sse_fixture_as_chunks("fim_stream_truncated.sse").unwrap();
    let transport = Arc::new(ScriptedTransport::always(Scripted::Chunks(chunks)));

    let mut recorder = Recorder::default();
    let state = model_with(transport)
        .generate("def add(a, b):", &mut recorder)
        .await;

    assert_eq!(state, StreamState::Failed);
    assert_eq!(recorder.tokens, vec!["\n    ", "return"]);
    assert!(recorder.completed.is_empty());
    assert_eq!(recorder.errors.len(), 1);
    assert!(matches!(recorder.errors[0], LlmError::StreamError(_)));
}

#[tokio::test]
async fn malformed_frame_fails_the_stream() {
    let chunks = vec![
        b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"a\"}}]}\n\n".to_vec(),
        b"data: {not json\n\n".to_vec(),
        b"data: [DONE]\n\n".to_vec(),
    ];
    let transport = Arc::new(ScriptedTransport::always(Scripted::Chunks(chunks)));

    let mut recorder = Recorder::default();
    let state = model_with(transport).generate("x", &mut recorder).await;

    assert_eq!(state, StreamState::Failed);
    assert_eq!(recorder.tokens, vec!["a"]);
    assert_eq!(recorder.errors.len(), 1);
    assert_eq!(recorder.errors[0].category(), ErrorCategory::Decode);
    assert!(recorder.completed.is_empty());
}

#[tokio::test]
async fn streaming_is_never_retried() {
    let transport = Arc::new(ScriptedTransport::always(Scripted::Fail(
        LlmError::ConnectionError("refused".into()),
    )));

    let mut recorder = Recorder::default();
    let state = model_with(transport.clone()).generate("x", &mut recorder).await;

    assert_eq!(state, StreamState::Failed);
    assert_eq!(transport.calls(), 1);
    assert_eq!(recorder.errors.len(), 1);
}

#[tokio::test]
async fn handshake_status_error_goes_to_on_error() {
    let transport = Arc::new(ScriptedTransport::always(Scripted::Body(
        400,
        r#"{"object":"error","message":"Prompt is too long","type":"invalid_request_error"}"#.into(),
    )));

    let mut recorder = Recorder::default();
    model_with(transport).generate("x", &mut recorder).await;

    assert!(recorder.completed.is_empty());
    match &recorder.errors[..] {
        [LlmError::ProviderError { status, message, .. }] => {
            assert_eq!(*status, 400);
            assert_eq!(message, "Prompt is too long");
        }
        other => panic!("unexpected errors: {other:?}"),
    }
}

#[tokio::test]
async fn blank_prompt_fails_through_the_handler_without_a_call() {
    let transport = Arc::new(ScriptedTransport::always(Scripted::Chunks(Vec::new())));

    let mut recorder = Recorder::default();
    let state = model_with(transport.clone()).generate("", &mut recorder).await;

    assert_eq!(state, StreamState::Failed);
    assert!(matches!(recorder.errors[..], [LlmError::ValidationError(_)]));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn cancellation_fires_no_terminal_callback() {
    let chunks = load_sse_fixture_as_chunks("fim_stream_truncated.sse").unwrap();
    let transport = Arc::new(ScriptedTransport::always(Scripted::ChunksThenHang(chunks)));
    let model = model_with(transport);

    let cancel = CancelHandle::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let mut recorder = Recorder::default();
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        model.generate_cancellable("def add(a, b):", None, &mut recorder, &cancel),
    )
    .await
    .expect("cancellation should end the stream");

    assert_eq!(state, StreamState::Cancelled);
    assert_eq!(recorder.tokens, vec!["\n    ", "return"]);
    assert!(recorder.completed.is_empty());
    assert!(recorder.errors.is_empty());
}

#[tokio::test]
async fn chat_stream_can_be_pulled() {
    let chunks = load_sse_fixture_as_chunks("chat_stream.sse").unwrap();
    let transport = Arc::new(ScriptedTransport::always(Scripted::Chunks(chunks)));
    let client = MistralClient::with_transport(scripted_config(0), transport).unwrap();
    let request = ChatRequest::builder(ChatModelName::MistralSmallLatest)
        .message(ChatMessage::user("Say hello in French"))
        .build();

    let events: Vec<StreamEvent> = client
        .chat_stream(&request)
        .await
        .unwrap_or_else(|e| panic!("stream failed to open: {e}"))
        .map(|e| e.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], StreamEvent::Delta("Bonjour".into()));
    assert_eq!(events[1], StreamEvent::Delta(" !".into()));
    match &events[2] {
        StreamEvent::Completed(response) => {
            assert_eq!(response.content, "Bonjour !");
            assert_eq!(response.usage, Some(Usage::new(7, 2)));
        }
        other => panic!("unexpected terminal event: {other:?}"),
    }
}
