//! Run configuration: YAML file, environment and CLI overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ConfigError;
use crate::judge::DEFAULT_TEMPERATURE;
use crate::model::Aspect;
use crate::verdict::reconcile::DEFAULT_EMPTY_LENGTH;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_MODEL: &str = "llama3-8b-8192";
pub const LOCAL_BASE_URL: &str = "http://localhost:1234/v1";
pub const LOCAL_API_KEY: &str = "lm-studio";
pub const LOCAL_MODEL: &str = "local-model";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub version: u32,
    pub judge: JudgeConfig,
    pub reconcile: ReconcileConfig,
    /// Aspects graded per item, in order.
    pub aspects: Vec<Aspect>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            judge: JudgeConfig::default(),
            reconcile: ReconcileConfig::default(),
            aspects: Aspect::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub provider: JudgeProvider,
    pub model: Option<String>,
    pub base_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            provider: JudgeProvider::OpenAi,
            model: None,
            base_url: None,
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

/// Row-count fallback when neither human nor judge labels exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub empty_length: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            empty_length: DEFAULT_EMPTY_LENGTH,
        }
    }
}

/// Fully resolved judge endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJudge {
    pub provider: JudgeProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    /// Groq and local servers serve one fixed model; CLI overrides are ignored.
    pub model_forced: bool,
}

fn serves_fixed_model(base_url: &str) -> bool {
    base_url.contains("groq.com") || base_url.contains("localhost") || base_url.contains("127.0.0.1")
}

impl JudgeConfig {
    /// Endpoint from the environment.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `GROQ_API_KEY` | use Groq with its default model |
    /// | `EVALGRADE_JUDGE_BASE_URL` | endpoint override |
    /// | `EVALGRADE_JUDGE_MODEL` | model override |
    /// | `EVALGRADE_JUDGE_API_KEY` | key override |
    ///
    /// Without any of these the local LM Studio server is used.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let (base_url, model, api_key) = match lookup("GROQ_API_KEY").filter(|k| !k.is_empty()) {
            Some(key) => (GROQ_BASE_URL.to_string(), GROQ_MODEL.to_string(), key),
            None => (
                LOCAL_BASE_URL.to_string(),
                LOCAL_MODEL.to_string(),
                LOCAL_API_KEY.to_string(),
            ),
        };
        Self {
            base_url: Some(lookup("EVALGRADE_JUDGE_BASE_URL").unwrap_or(base_url)),
            model: Some(lookup("EVALGRADE_JUDGE_MODEL").unwrap_or(model)),
            api_key: Some(lookup("EVALGRADE_JUDGE_API_KEY").unwrap_or(api_key)),
            ..Self::default()
        }
    }

    pub fn resolve(&self, cli_model: Option<&str>) -> ResolvedJudge {
        self.resolve_with(cli_model, |key| std::env::var(key).ok())
    }

    /// CLI flag > config file > environment > defaults.
    pub fn resolve_with(
        &self,
        cli_model: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ResolvedJudge {
        let env = Self::from_env_with(lookup);
        let base_url = self
            .base_url
            .clone()
            .or(env.base_url)
            .unwrap_or_else(|| LOCAL_BASE_URL.to_string());
        let configured_model = self
            .model
            .clone()
            .or(env.model)
            .unwrap_or_else(|| LOCAL_MODEL.to_string());
        let api_key = self
            .api_key
            .clone()
            .or(env.api_key)
            .unwrap_or_else(|| LOCAL_API_KEY.to_string());

        let model_forced = serves_fixed_model(&base_url);
        let model = match cli_model {
            Some(requested) if model_forced => {
                if requested != configured_model {
                    warn!(
                        requested,
                        model = %configured_model,
                        "endpoint serves a fixed model; ignoring --model"
                    );
                }
                configured_model
            }
            Some(requested) => requested.to_string(),
            None => configured_model,
        };

        ResolvedJudge {
            provider: self.provider,
            base_url,
            model,
            api_key,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            model_forced,
        }
    }
}

impl EvalConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: EvalConfig = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: SUPPORTED_CONFIG_VERSION,
            });
        }
        if !(0.0..=2.0).contains(&self.judge.temperature) {
            return Err(ConfigError::invalid(format!(
                "judge.temperature must be within [0, 2], got {}",
                self.judge.temperature
            )));
        }
        if self.aspects.is_empty() {
            return Err(ConfigError::invalid("aspects must not be empty"));
        }
        if self.reconcile.empty_length == 0 {
            return Err(ConfigError::invalid("reconcile.empty_length must be at least 1"));
        }
        if self.judge.timeout_secs == 0 {
            return Err(ConfigError::invalid("judge.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    EvalConfig::from_yaml(&raw)
}
