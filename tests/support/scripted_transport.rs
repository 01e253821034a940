//! A scripted `HttpTransport` that records every call.

use async_trait::async_trait;
use bytes::Bytes;
use mistralai::LlmError;
use mistralai::transport::{
    HttpTransport, HttpTransportRequest, HttpTransportResponse, HttpTransportStreamBody,
    HttpTransportStreamResponse,
};
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Respond with a status and a complete body.
    Body(u16, String),
    /// Respond 200 with these body chunks, then close.
    Chunks(Vec<Vec<u8>>),
    /// Respond 200 with these body chunks, then never yield again.
    ChunksThenHang(Vec<Vec<u8>>),
    /// Fail before any response arrives.
    Fail(LlmError),
}

/// Replays `Scripted` replies in order. The last reply repeats once the
/// script is exhausted.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpTransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: Scripted) -> Self {
        Self::new([reply])
    }

    /// `failures` transport errors, then a successful JSON body.
    pub fn failing_then(failures: usize, success_body: &str) -> Self {
        let mut script: Vec<Scripted> = (0..failures)
            .map(|i| Scripted::Fail(LlmError::ConnectionError(format!("connection reset #{i}"))))
            .collect();
        script.push(Scripted::Body(200, success_body.to_string()));
        Self::new(script)
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpTransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: HttpTransportRequest) -> Scripted {
        self.requests.lock().unwrap().push(request);
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().expect("script must not be empty")
        }
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", "application/json".parse().unwrap());
    headers
}

fn chunk_stream(
    chunks: Vec<Vec<u8>>,
) -> impl futures_util::Stream<Item = Result<Bytes, LlmError>> + Send + 'static {
    futures_util::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, LlmError> {
        match self.next(request) {
            Scripted::Body(status, body) => Ok(HttpTransportResponse {
                status,
                headers: json_headers(),
                body: body.into_bytes(),
            }),
            Scripted::Fail(error) => Err(error),
            other => panic!("streaming reply scripted for a blocking call: {other:?}"),
        }
    }

    async fn execute_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportStreamResponse, LlmError> {
        use futures_util::StreamExt;

        let (status, body) = match self.next(request) {
            Scripted::Body(status, body) => (status, HttpTransportStreamBody::from_bytes(body)),
            Scripted::Chunks(chunks) => (200, HttpTransportStreamBody::from_stream(chunk_stream(chunks))),
            Scripted::ChunksThenHang(chunks) => (
                200,
                HttpTransportStreamBody::from_stream(
                    chunk_stream(chunks).chain(futures_util::stream::pending()),
                ),
            ),
            Scripted::Fail(error) => return Err(error),
        };
        Ok(HttpTransportStreamResponse {
            status,
            headers: HeaderMap::new(),
            body,
        })
    }
}
