//! Chat-completions client for the recon summarization prompt.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol (Groq by default).
//! A call never returns an error: every outcome is folded into a
//! [`CompletionResult`] so the caller's retry policy can decide what to do.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use reconreport_shared::{Domain, ReconReportError, Result};

use crate::credentials::Credential;

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("ReconReport/", env!("CARGO_PKG_VERSION"));

/// Maximum number of error-body bytes echoed into logs.
const MAX_LOGGED_BODY: usize = 500;

const SYSTEM_PROMPT: &str =
    "You write well-structured technical recon reports with professional tone.";

// ---------------------------------------------------------------------------
// Result + trait
// ---------------------------------------------------------------------------

/// Outcome of one (chunk, credential) attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    /// The model's reply text.
    Success(String),
    /// The endpoint answered HTTP 429.
    RateLimited,
    /// Any other failure (non-2xx status, transport error, malformed body).
    Failed(String),
}

/// Something that can turn one chunk into completion text.
pub trait Completer {
    fn complete(
        &self,
        chunk: &str,
        domain: &Domain,
        credential: &Credential,
    ) -> impl Future<Output = CompletionResult> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Settings for [`ChatCompletionClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Full URL of the chat completions endpoint.
    pub endpoint: Url,
    /// Model identifier.
    pub model: String,
    /// Per-call timeout.
    pub timeout: Duration,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: Client,
    endpoint: Url,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(opts: ClientOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(opts.timeout)
            .build()
            .map_err(|e| {
                ReconReportError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            endpoint: opts.endpoint,
            model: opts.model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Completer for ChatCompletionClient {
    #[instrument(skip_all, fields(domain = %domain, chunk_len = chunk.len()))]
    async fn complete(
        &self,
        chunk: &str,
        domain: &Domain,
        credential: &Credential,
    ) -> CompletionResult {
        let prompt = build_prompt(domain, chunk);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = match self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "completion request failed");
                return CompletionResult::Failed(format!("request failed: {e}"));
            }
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            debug!("completion endpoint rate-limited this key");
            return CompletionResult::RateLimited;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %truncate(&body, MAX_LOGGED_BODY),
                "completion endpoint returned an error"
            );
            return CompletionResult::Failed(format!("HTTP {status}"));
        }

        match response.json::<ChatResponse>().await {
            Ok(parsed) => match parsed.choices.into_iter().next() {
                Some(choice) => {
                    debug!(reply_len = choice.message.content.len(), "completion received");
                    CompletionResult::Success(choice.message.content)
                }
                None => {
                    warn!("completion response contained no choices");
                    CompletionResult::Failed("response contained no choices".into())
                }
            },
            Err(e) => {
                warn!(error = %e, "invalid completion response body");
                CompletionResult::Failed(format!("invalid response body: {e}"))
            }
        }
    }
}

/// Build the user prompt for one chunk.
pub fn build_prompt(domain: &Domain, chunk: &str) -> String {
    format!(
        r#"
You are a cybersecurity expert creating a structured red-team recon report.

TASK:
Convert this raw recon data for domain "{domain}" into a single table format with key-value pairs. The table should not contain duplicate keys or repeated values.

Format:
| Key       | Value |
|-----------|-------|
| Target    | {domain} |
| IP        | <ip address> |
... etc.

At the end, add a single line starting with "Tools Used:" listing all the tools used, separated by commas.

INPUT:
{chunk}
"#
    )
}

/// Cut `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ChatCompletionClient {
        let endpoint = Url::parse(&format!("{}/openai/v1/chat/completions", server.uri())).unwrap();
        ChatCompletionClient::new(ClientOptions {
            endpoint,
            model: "llama3-70b-8192".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn domain() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    fn reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[test]
    fn prompt_embeds_domain_and_chunk() {
        let prompt = build_prompt(&domain(), "22/tcp open ssh");
        assert!(prompt.contains(r#"domain "example.com""#));
        assert!(prompt.contains("INPUT:\n22/tcp open ssh"));
        assert!(prompt.contains("should not contain duplicate keys"));
        assert!(prompt.contains("Tools Used:"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ñññ", 3), "ñ");
    }

    #[tokio::test]
    async fn success_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer key-a"))
            .and(body_partial_json(serde_json::json!({ "model": "llama3-70b-8192" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("| IP | 1.2.3.4 |")))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .complete("raw", &domain(), &Credential::new("key-a"))
            .await;

        assert_eq!(result, CompletionResult::Success("| IP | 1.2.3.4 |".into()));
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .complete("raw", &domain(), &Credential::new("key-a"))
            .await;

        assert_eq!(result, CompletionResult::RateLimited);
    }

    #[tokio::test]
    async fn other_status_is_failed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .complete("raw", &domain(), &Credential::new("bad"))
            .await;

        assert!(matches!(result, CompletionResult::Failed(reason) if reason.contains("401")));
    }

    #[tokio::test]
    async fn empty_choices_is_failed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server)
            .complete("raw", &domain(), &Credential::new("key-a"))
            .await;

        assert!(matches!(result, CompletionResult::Failed(_)));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let endpoint = Url::parse(&server.uri()).unwrap();
        let client = ChatCompletionClient::new(ClientOptions {
            endpoint,
            model: "m".into(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();

        let result = client
            .complete("raw", &domain(), &Credential::new("key-a"))
            .await;

        assert!(matches!(result, CompletionResult::Failed(_)));
    }
}
