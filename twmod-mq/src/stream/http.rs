//! HTTP newline-delimited JSON stream provider
//!
//! Issues `GET <endpoint>?track=<topic>[&language=<code>]` and reads the body
//! as one JSON object per line. Blank lines are keep-alives. Lines that are
//! not tweets are skipped.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tracing::{debug, info};

use super::{RawTweet, StreamError, StreamProvider, TrackFilter, TweetStream};

const USER_AGENT: &str = concat!("twmod-mq/", env!("CARGO_PKG_VERSION"));

/// Longest line accepted before the connection is treated as broken
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Streaming HTTP provider
#[derive(Clone)]
pub struct HttpStreamProvider {
    client: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl HttpStreamProvider {
    pub fn new(
        endpoint: impl Into<String>,
        bearer_token: Option<String>,
        connect_timeout: Duration,
    ) -> Result<Self, StreamError> {
        // No overall request timeout: the body is an unbounded stream.
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            bearer_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpStreamProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStreamProvider")
            .field("endpoint", &self.endpoint)
            .field("authenticated", &self.bearer_token.is_some())
            .finish()
    }
}

impl StreamProvider for HttpStreamProvider {
    fn subscribe(&self, filter: &TrackFilter) -> TweetStream {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("track", filter.topic.as_str())]);
        if let Some(language) = filter.language {
            request = request.query(&[("language", language.code())]);
        }
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        read_lines(request, self.endpoint.clone()).boxed()
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Connect and yield every tweet line until the body ends or fails
fn read_lines(
    request: reqwest::RequestBuilder,
    endpoint: String,
) -> impl Stream<Item = Result<RawTweet, StreamError>> {
    async_stream::try_stream! {
        info!("Connecting to upstream stream at {}", endpoint);
        let response = request
            .send()
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            Err::<(), _>(StreamError::Status(status.as_u16()))?;
        }
        info!("Upstream stream connected ({})", status);

        let mut body = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| StreamError::Transport(e.to_string()))?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                if let Some(raw) = parse_line(&line) {
                    yield raw;
                }
            }

            if buffer.len() > MAX_LINE_BYTES {
                Err::<(), _>(StreamError::Transport(format!(
                    "stream line exceeds {} bytes",
                    MAX_LINE_BYTES
                )))?;
            }
        }

        Err::<(), _>(StreamError::Closed("upstream ended the response".to_string()))?;
    }
}

/// Parse one stream line, returning `None` for keep-alives and non-tweets
fn parse_line(line: &[u8]) -> Option<RawTweet> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<RawTweet>(trimmed) {
        Ok(raw) => Some(raw),
        Err(e) => {
            debug!("Skipping non-tweet stream message: {}", e);
            None
        }
    }
}
