use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::chat::ChatMessage;
use super::prompt::PromptTemplate;
use crate::config::settings::LLMConfig;

/// Text chunks of one model invocation, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<String>>;

/// A hosted model that can stream a completion for a prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Start one streamed invocation. `input` fills the prompt's `{input}`
    /// variable. The returned stream is finite and not restartable.
    async fn stream_complete(&self, prompt: &PromptTemplate, input: &str) -> Result<ChunkStream>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Client for an OpenAI-style `/chat/completions` endpoint (Mistral by default).
pub struct LLMClient {
    client: Client,
    api_key: String,
    config: LLMConfig,
}

impl LLMClient {
    pub fn new(api_key: String, config: LLMConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    pub async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<ChunkStream> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: true,
        };

        tracing::debug!(
            "[LLMClient] Streaming {} messages to model '{}'",
            request.messages.len(),
            request.model
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                "[LLMClient] API returned error status {}: {}",
                status,
                error_text
            );
            anyhow::bail!("API error {}: {}", status, error_text);
        }

        Ok(parse_event_stream(response.bytes_stream()))
    }
}

#[async_trait]
impl CompletionProvider for LLMClient {
    async fn stream_complete(&self, prompt: &PromptTemplate, input: &str) -> Result<ChunkStream> {
        self.stream_chat(prompt.render(input)).await
    }
}

enum EventLine {
    Content(String),
    Done,
    Skip,
}

fn parse_line(line: &[u8]) -> Result<EventLine> {
    let line = std::str::from_utf8(line).context("Stream line is not valid UTF-8")?;
    let Some(data) = line.trim_end().strip_prefix("data:") else {
        return Ok(EventLine::Skip);
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return Ok(EventLine::Done);
    }

    // serde messages can quote values from the payload, so only the position is reported
    let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| {
        tracing::trace!("[LLMClient] Unparseable chunk: {}", data);
        anyhow::anyhow!(
            "Malformed stream chunk ({:?} at line {} column {})",
            e.classify(),
            e.line(),
            e.column()
        )
    })?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|content| !content.is_empty())
        .map(EventLine::Content)
        .unwrap_or(EventLine::Skip))
}

/// Turn a server-sent-event byte stream into content deltas. Lines may be
/// split across reads; they are buffered until a newline arrives.
fn parse_event_stream<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        let mut done = false;

        while !done {
            let Some(read) = bytes.next().await else {
                break;
            };
            let read = read.context("Stream read failed")?;
            buffer.extend_from_slice(read.as_ref());

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                match parse_line(&line)? {
                    EventLine::Content(content) => {
                        tracing::trace!("[LLMClient] Received chunk of {} bytes", content.len());
                        yield content;
                    }
                    EventLine::Done => {
                        done = true;
                        break;
                    }
                    EventLine::Skip => {}
                }
            }
        }

        // A final event without a trailing newline.
        if !done && !buffer.is_empty() {
            if let EventLine::Content(content) = parse_line(&buffer)? {
                yield content;
            }
        }
    })
}
