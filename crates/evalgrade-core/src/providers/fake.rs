use super::{ChatMessage, LlmClient, LlmResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted client: replays queued replies in order, then the default reply.
/// Used by tests and by `--judge fake` dry runs.
#[derive(Debug, Default)]
pub struct FakeLlmClient {
    script: Mutex<VecDeque<Result<String, String>>>,
    default_reply: Option<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a transport failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    fn push(&self, entry: Result<String, String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }

    /// Every message list received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
    ) -> anyhow::Result<LlmResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        let next = self
            .script
            .lock()
            .map_err(|_| anyhow::anyhow!("fake client script lock poisoned"))?
            .pop_front();
        let text = match next {
            Some(Ok(text)) => text,
            Some(Err(message)) => anyhow::bail!(message),
            None => match &self.default_reply {
                Some(text) => text.clone(),
                None => anyhow::bail!("no more scripted replies"),
            },
        };
        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: "fake".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
