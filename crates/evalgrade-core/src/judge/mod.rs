//! Judge gateway: runs one rubric prompt sequence against the configured
//! chat-completion backend.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::providers::{ChatMessage, LlmClient};
use crate::rubric::PromptSequence;

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// The judge could not produce a reply. Recorded per (item, aspect); never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeUnavailable {
    #[error("judge call {turn} failed: {message}")]
    Transport { turn: usize, message: String },

    #[error("judge call {turn} returned an empty reply")]
    EmptyReply { turn: usize },
}

#[derive(Clone)]
pub struct JudgeGateway {
    client: Arc<dyn LlmClient>,
    temperature: f32,
}

impl std::fmt::Debug for JudgeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeGateway")
            .field("provider", &self.client.provider_name())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl JudgeGateway {
    pub fn new(client: Arc<dyn LlmClient>, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Sends system + first user turn. With a follow-up block, the first reply is
    /// appended as an assistant turn and the follow-up reply is returned instead.
    /// No retries.
    pub async fn grade(&self, prompts: &PromptSequence) -> Result<String, JudgeUnavailable> {
        let mut history = vec![
            ChatMessage::system(prompts.system.as_str()),
            ChatMessage::user(prompts.user.as_str()),
        ];
        let mut reply = self.call(&history, 1).await?;

        if let Some(follow_up) = &prompts.follow_up {
            history.push(ChatMessage::assistant(reply));
            history.push(ChatMessage::user(follow_up.as_str()));
            reply = self.call(&history, 2).await?;
        }

        Ok(reply)
    }

    async fn call(&self, history: &[ChatMessage], turn: usize) -> Result<String, JudgeUnavailable> {
        match self.client.complete(history, self.temperature).await {
            Ok(resp) if resp.text.trim().is_empty() => {
                let err = JudgeUnavailable::EmptyReply { turn };
                warn!(provider = self.client.provider_name(), "{}", err);
                Err(err)
            }
            Ok(resp) => {
                debug!(provider = %resp.provider, model = %resp.model, turn, "judge replied");
                Ok(resp.text)
            }
            Err(e) => {
                let err = JudgeUnavailable::Transport {
                    turn,
                    message: format!("{:#}", e),
                };
                warn!(provider = self.client.provider_name(), "{}", err);
                Err(err)
            }
        }
    }
}
