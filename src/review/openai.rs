use super::{ReviewOutcome, REVIEW_PROMPT};
use crate::{ArticleText, MonitorError, Reviewer};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Grammar reviewer backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiReviewer {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiReviewer {
    pub fn new(api_key: &str, model: &str) -> Self {
        OpenAiReviewer {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: OPENAI_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap, MonitorError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| MonitorError::ConfigError("API key is not a valid header".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn complete(&self, text: &ArticleText) -> Result<String, MonitorError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: format!("{}\n\nContent to check: {}", REVIEW_PROMPT, text.as_str()),
            }],
            temperature: 0.0,
        };

        debug!(model = %self.model, "Grammar review request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MonitorError::Rejected {
                service: "OpenAI",
                status,
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MonitorError::UnexpectedResponse("No content in model reply".into()))
    }
}

#[async_trait::async_trait]
impl Reviewer for OpenAiReviewer {
    async fn review(&self, text: &ArticleText) -> ReviewOutcome {
        match self.complete(text).await {
            Ok(reply) => ReviewOutcome::Verdict(reply.trim().to_string()),
            Err(e) => {
                error!(error = %e, "Grammar review failed");
                ReviewOutcome::Failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape() {
        let request = ChatRequest {
            model: "gpt-4.1",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello".to_string(),
            }],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4.1");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn response_parsing() {
        let chat: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"OK"}}]}"#,
        )
        .unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_failure() {
        let reviewer = OpenAiReviewer::new("key", "gpt-4.1").with_base_url("http://127.0.0.1:9");
        let outcome = reviewer.review(&ArticleText::new("Headline")).await;
        assert!(matches!(outcome, ReviewOutcome::Failure(_)));
    }
}
