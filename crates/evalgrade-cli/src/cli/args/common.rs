//! Shared argument types used across multiple commands.

use clap::ValueEnum;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum JudgeKind {
    /// OpenAI-compatible endpoint (OpenAI, Groq, LM Studio)
    Openai,
    /// Scripted judge that always returns --fake-reply (dry runs, tests)
    Fake,
}

#[derive(clap::Args, Clone, Debug)]
pub struct JudgeArgs {
    /// YAML config file
    #[arg(long, env = "EVALGRADE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Judge model (ignored for Groq and local servers, which serve a fixed model)
    #[arg(long)]
    pub model: Option<String>,

    /// Judge backend; overrides judge.provider from the config file
    #[arg(long, value_enum)]
    pub judge: Option<JudgeKind>,

    /// Reply used by the fake judge for every call
    #[arg(long, default_value = "['Yes'] Score: 0/0")]
    pub fake_reply: String,

    /// Overrides judge.temperature from the config file
    #[arg(long)]
    pub temperature: Option<f32>,
}
