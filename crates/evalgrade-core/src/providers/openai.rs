use super::{ChatMessage, LlmClient, LlmResponse};
use crate::config::ResolvedJudge;
use crate::errors::EvalError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (OpenAI, Groq, LM Studio).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(judge: &ResolvedJudge) -> Result<Self, EvalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(judge.timeout_secs))
            .build()
            .map_err(|e| EvalError::Client {
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            base_url: judge.base_url.trim_end_matches('/').to_string(),
            model: judge.model.clone(),
            api_key: judge.api_key.clone(),
            max_tokens: judge.max_tokens,
            client,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> anyhow::Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_else(|_| String::new());
            anyhow::bail!("chat API error (status {}): {}", status.as_u16(), error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("chat API response missing content"))?
            .to_string();
        // servers may answer with a dated snapshot of the requested model
        let model = json
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.model)
            .to_string();

        Ok(LlmResponse {
            text,
            provider: "openai".to_string(),
            model,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
