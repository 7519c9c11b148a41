use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api::{
    Candidate, Content, GenerateContentResponse, GroundingChunk, GroundingMetadata, ROLE_MODEL,
};
use crate::core::error::{ConfigurationError, ExchangeError};
use crate::core::session::{ChatSession, SessionFactory};

pub fn grounded_response(text: &str, chunks: Vec<GroundingChunk>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some(ROLE_MODEL.to_string()),
                parts: vec![crate::api::Part::text(text)],
            }),
            finish_reason: Some("STOP".to_string()),
            grounding_metadata: Some(GroundingMetadata {
                web_search_queries: Vec::new(),
                grounding_chunks: chunks,
            }),
        }],
        prompt_feedback: None,
    }
}

/// Session that replays queued outcomes and records what it was sent.
#[derive(Default)]
pub struct ScriptedSession {
    outcomes: Mutex<VecDeque<Result<GenerateContentResponse, ExchangeError>>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub fn new(outcomes: Vec<Result<GenerateContentResponse, ExchangeError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_message(&self, message: &str) -> Result<GenerateContentResponse, ExchangeError> {
        self.sent.lock().unwrap().push(message.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::malformed("no scripted outcome left")))
    }
}

/// Factory handing out one shared scripted session, or failing when built
/// without one.
pub struct ScriptedFactory {
    session: Option<Arc<ScriptedSession>>,
    created: AtomicUsize,
}

impl ScriptedFactory {
    pub fn with_session(session: Arc<ScriptedSession>) -> Self {
        Self {
            session: Some(session),
            created: AtomicUsize::new(0),
        }
    }

    pub fn without_credential() -> Self {
        Self {
            session: None,
            created: AtomicUsize::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl SessionFactory for ScriptedFactory {
    fn create_session(&self) -> Result<Arc<dyn ChatSession>, ConfigurationError> {
        let session: Arc<dyn ChatSession> = self
            .session
            .clone()
            .ok_or(ConfigurationError::MissingCredential)?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(session)
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serve each canned `(status, body)` pair to one incoming request, in
/// order, and return what was received once all have been answered.
pub async fn spawn_http_server(
    responses: Vec<(u16, String)>,
) -> (String, JoinHandle<Result<Vec<CapturedRequest>, String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
            let (request_line, headers, raw_body) = read_http_request(&mut stream).await?;
            let body_json = serde_json::from_slice(&raw_body).map_err(|err| err.to_string())?;
            captured.push(CapturedRequest {
                request_line,
                headers,
                body: body_json,
            });

            let response = format!(
                "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{}",
                reason_phrase(status),
                body.len(),
                body
            );
            stream
                .write_all(response.as_bytes())
                .await
                .map_err(|err| err.to_string())?;
            stream.shutdown().await.map_err(|err| err.to_string())?;
        }
        Ok(captured)
    });

    (format!("http://{addr}/v1beta"), handle)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

async fn read_http_request(
    stream: &mut tokio::net::TcpStream,
) -> Result<(String, Vec<(String, String)>, Vec<u8>), String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.expect("header end should exist");
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length - body.len()];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok((request_line, headers, body))
}
