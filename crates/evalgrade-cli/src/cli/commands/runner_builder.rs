use super::super::args::{JudgeArgs, JudgeKind};
use anyhow::Context;
use evalgrade_core::config::{load_config, EvalConfig, JudgeProvider};
use evalgrade_core::judge::JudgeGateway;
use evalgrade_core::providers::fake::FakeLlmClient;
use evalgrade_core::providers::openai::OpenAiClient;
use evalgrade_core::providers::LlmClient;
use std::sync::Arc;

/// Config file (or defaults) with CLI overrides applied and re-validated.
pub(crate) fn load_effective_config(args: &JudgeArgs) -> anyhow::Result<EvalConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EvalConfig::default(),
    };
    if let Some(kind) = args.judge {
        cfg.judge.provider = match kind {
            JudgeKind::Openai => JudgeProvider::OpenAi,
            JudgeKind::Fake => JudgeProvider::Fake,
        };
    }
    if let Some(t) = args.temperature {
        cfg.judge.temperature = t;
    }
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

pub(crate) fn build_gateway(cfg: &EvalConfig, args: &JudgeArgs) -> anyhow::Result<JudgeGateway> {
    let client: Arc<dyn LlmClient> = match cfg.judge.provider {
        JudgeProvider::Fake => {
            tracing::info!("using fake judge");
            Arc::new(FakeLlmClient::new().with_default_reply(args.fake_reply.clone()))
        }
        JudgeProvider::OpenAi => {
            let resolved = cfg.judge.resolve(args.model.as_deref());
            tracing::info!(
                base_url = %resolved.base_url,
                model = %resolved.model,
                "using chat completions judge"
            );
            Arc::new(OpenAiClient::new(&resolved).context("failed to build judge client")?)
        }
    };
    Ok(JudgeGateway::new(client, cfg.judge.temperature))
}
