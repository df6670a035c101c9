// file: src/llm/client.rs
// description: OpenAI-compatible chat completions client with SSE streaming
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::config::OpenAiConfig;
use crate::error::{AppError, Result};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// Content deltas as they arrive from the upstream stream.
pub type ContentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig, api_key: String) -> Result<Self> {
        // Connect timeout only on the shared client: a full-request timeout
        // would cut off long-lived streams.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            request_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Non-streaming completion, used for tag inference.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages(system, user),
            max_tokens,
            temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let response = check_status(response).await?;
        let body: ChatResponse = response.json().await.map_err(map_send_error)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Upstream("response contained no content".to_string()))
    }

    /// Streaming completion. Yields content deltas; the caller accumulates
    /// the full snapshot and feeds it to the parser.
    pub async fn chat_stream(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<ContentStream> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages(system, user),
            max_tokens,
            temperature,
            stream: true,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let response = check_status(response).await?;
        debug!("Upstream stream opened for model {}", self.model);

        let deltas = decode_sse(Box::pin(response.bytes_stream())).filter_map(|frame| async move {
            match frame {
                Ok(data) => delta_content(&data).map(Ok),
                Err(err) => Some(Err(err)),
            }
        });

        Ok(Box::pin(deltas))
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn messages<'a>(system: &'a str, user: &'a str) -> Vec<ChatMessage<'a>> {
    vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

fn map_send_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::UpstreamTimeout
    } else {
        AppError::Upstream(err.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::RateLimited);
    }

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(AppError::Upstream(format!(
            "request failed with status {status}: {body}"
        )));
    }

    Ok(response)
}

/// Extract the content delta from one SSE data payload, if any.
fn delta_content(data: &str) -> Option<String> {
    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(err) => {
            debug!("Skipping undecodable stream chunk: {}", err);
            return None;
        }
    };

    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
}

struct SseDecoder<S> {
    upstream: S,
    buffer: String,
    events: VecDeque<String>,
    done: bool,
}

impl<S> SseDecoder<S> {
    /// Split complete `data: ...\n\n` frames out of the buffer. Frames may
    /// arrive split at arbitrary byte boundaries.
    fn drain_frames(&mut self) {
        while !self.done {
            let Some(pos) = self.buffer.find("\n\n") else {
                break;
            };
            let frame: String = self.buffer.drain(..pos + 2).collect();
            self.queue_frame(&frame);
        }
    }

    fn flush_tail(&mut self) {
        let tail = std::mem::take(&mut self.buffer);
        if !tail.is_empty() {
            self.queue_frame(&tail);
        }
    }

    fn queue_frame(&mut self, frame: &str) {
        for line in frame.lines() {
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if data == "[DONE]" {
                self.done = true;
                return;
            }
            if !data.is_empty() {
                self.events.push_back(data.to_string());
            }
        }
    }
}

/// Decode an SSE byte stream into its `data:` payloads, stopping at `[DONE]`.
fn decode_sse<S, B, E>(upstream: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let decoder = SseDecoder {
        upstream,
        buffer: String::new(),
        events: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(decoder, |mut decoder| async move {
        loop {
            if let Some(event) = decoder.events.pop_front() {
                return Some((Ok(event), decoder));
            }
            if decoder.done {
                return None;
            }

            match decoder.upstream.next().await {
                Some(Ok(bytes)) => {
                    decoder
                        .buffer
                        .push_str(&String::from_utf8_lossy(bytes.as_ref()));
                    decoder.drain_frames();
                }
                Some(Err(err)) => {
                    decoder.done = true;
                    return Some((Err(AppError::Upstream(err.to_string())), decoder));
                }
                None => {
                    decoder.done = true;
                    decoder.flush_tail();
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pretty_assertions::assert_eq;

    type ChunkResult = std::result::Result<Vec<u8>, std::io::Error>;

    fn chunks(parts: &[&str]) -> Vec<ChunkResult> {
        parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect()
    }

    async fn collect_events(parts: &[&str]) -> Vec<String> {
        decode_sse(stream::iter(chunks(parts)))
            .map(|event| event.unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_decode_sse_basic_frames() {
        let events =
            collect_events(&["data: {\"a\":1}\n\ndata: {\"b\":2}\n\ndata: [DONE]\n\n"]).await;
        assert_eq!(events, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[tokio::test]
    async fn test_decode_sse_split_across_chunks() {
        let events = collect_events(&["data: {\"a\"", ":1}\n\nda", "ta: {\"b\":2}\n\n"]).await;
        assert_eq!(events, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[tokio::test]
    async fn test_decode_sse_flushes_unterminated_tail() {
        let events = collect_events(&["data: {\"a\":1}"]).await;
        assert_eq!(events, vec!["{\"a\":1}"]);
    }

    #[tokio::test]
    async fn test_decode_sse_stops_after_done() {
        let events = collect_events(&["data: [DONE]\n\ndata: {\"late\":1}\n\n"]).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_decode_sse_ignores_comment_lines() {
        let events = collect_events(&[": keep-alive\n\ndata: {\"a\":1}\n\n"]).await;
        assert_eq!(events, vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_delta_content_extracts_text() {
        let data = r#"{"choices":[{"delta":{"content":"1. Dune"}}]}"#;
        assert_eq!(delta_content(data).as_deref(), Some("1. Dune"));
    }

    #[test]
    fn test_delta_content_skips_empty_and_missing() {
        assert_eq!(delta_content(r#"{"choices":[{"delta":{}}]}"#), None);
        assert_eq!(
            delta_content(r#"{"choices":[{"delta":{"content":""}}]}"#),
            None
        );
        assert_eq!(delta_content(r#"{"choices":[]}"#), None);
        assert_eq!(delta_content("not json"), None);
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: messages("sys", "user"),
            max_tokens: 100,
            temperature: None,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert!(json.get("temperature").is_none());
        assert!(json.get("stream").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
