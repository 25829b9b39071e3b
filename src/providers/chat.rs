use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{Backend, BackendFuture};

const RATE_LIMIT_MAX_RETRIES: usize = 5;
const RATE_LIMIT_BASE_DELAY: Duration = Duration::from_secs(2);
const RATE_LIMIT_MAX_DELAY: Duration = Duration::from_secs(60);

const MAX_TOKENS: u32 = 2048;
const TEMPERATURE: f32 = 0.3;

/// Client for any OpenAI-compatible `/chat/completions` endpoint, which
/// covers Ollama, llama.cpp and the hosted APIs alike.
#[derive(Debug, Clone)]
pub struct ChatBackend {
    base_url: String,
    model: String,
    key: Option<String>,
}

impl ChatBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let key = key
            .filter(|value| !value.trim().is_empty())
            .or_else(|| std::env::var("WORDCARD_API_KEY").ok())
            .filter(|value| !value.trim().is_empty());
        Self {
            base_url,
            model: model.into(),
            key,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(self, prompt: String) -> Result<String> {
        let client = reqwest::Client::new();
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        let mut attempt = 0usize;
        let mut delay = RATE_LIMIT_BASE_DELAY;
        loop {
            attempt += 1;
            let mut request = client.post(&url).json(&body);
            if let Some(key) = &self.key {
                request = request.bearer_auth(key);
            }
            let response = request
                .send()
                .await
                .with_context(|| format!("request to {url} failed"))?;

            let status = response.status();
            let retry_after = retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            if status.is_success() {
                debug!("chat completion ok ({} bytes)", text.len());
                return extract_content(&text);
            }
            if is_rate_limited(status, &text) && attempt < RATE_LIMIT_MAX_RETRIES {
                let mut wait = delay;
                if let Some(retry_after) = retry_after
                    && retry_after > wait
                {
                    wait = retry_after;
                }
                warn!(
                    "backend rate limited; retrying in {:.1}s (attempt {}/{})",
                    wait.as_secs_f32(),
                    attempt,
                    RATE_LIMIT_MAX_RETRIES
                );
                sleep(wait).await;
                delay = next_delay(delay);
                continue;
            }
            return Err(anyhow!("backend error ({status}): {text}"));
        }
    }
}

impl Backend for ChatBackend {
    fn generate(self, prompt: String) -> BackendFuture {
        Box::pin(self.request(prompt))
    }
}

fn is_rate_limited(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    let code = status.as_u16();
    if code == 529 || code == 503 {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("too many requests")
        || lower.contains("overloaded")
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();
    value.parse::<u64>().ok().map(Duration::from_secs)
}

fn next_delay(current: Duration) -> Duration {
    let next_secs = current
        .as_secs()
        .saturating_mul(2)
        .max(RATE_LIMIT_BASE_DELAY.as_secs());
    Duration::from_secs(next_secs).min(RATE_LIMIT_MAX_DELAY)
}

fn extract_content(text: &str) -> Result<String> {
    let payload: ChatResponse =
        serde_json::from_str(text).with_context(|| "failed to parse chat completion JSON")?;
    let content = payload
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .unwrap_or_default();
    if content.is_empty() {
        return Err(anyhow!("backend returned an empty completion"));
    }
    Ok(content.to_string())
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice_content() {
        let payload = r#"{"choices":[{"message":{"role":"assistant","content":"  太阳系  "}}]}"#;
        assert_eq!(extract_content(payload).unwrap(), "太阳系");
    }

    #[test]
    fn empty_completion_is_an_error() {
        let payload = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        assert!(extract_content(payload).is_err());
        assert!(extract_content(r#"{"choices":[]}"#).is_err());
    }

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS, ""));
        assert!(is_rate_limited(StatusCode::SERVICE_UNAVAILABLE, ""));
        assert!(is_rate_limited(StatusCode::BAD_REQUEST, "Rate limit reached"));
        assert!(!is_rate_limited(StatusCode::BAD_REQUEST, "malformed body"));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let mut delay = RATE_LIMIT_BASE_DELAY;
        for _ in 0..10 {
            delay = next_delay(delay);
        }
        assert_eq!(delay, RATE_LIMIT_MAX_DELAY);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = ChatBackend::new("http://127.0.0.1:11434/v1/", "m", None);
        assert_eq!(backend.base_url, "http://127.0.0.1:11434/v1");
    }

    #[test]
    fn model_accessor_reports_configured_model() {
        let backend = ChatBackend::new("http://127.0.0.1:11434/v1", "qwen2.5-7b-instruct", None);
        assert_eq!(backend.model(), "qwen2.5-7b-instruct");
    }
}
