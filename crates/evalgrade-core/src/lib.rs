//! Offline grading pipeline for consultation transcripts.
//!
//! The pipeline turns one case folder into graded report rows:
//!
//! - [`pairing`] cuts the tool log into (tool output, response) blocks
//! - [`linking`] ties each block back to the transcript turn that produced it
//! - [`rubric`] builds the aspect prompts, [`judge`] sends them to the judge model
//! - [`verdict`] recovers a structured verdict from whatever the judge wrote
//! - [`agreement`] tallies human-vs-judge agreement across cases
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use evalgrade_core::config::EvalConfig;
//! use evalgrade_core::judge::JudgeGateway;
//! use evalgrade_core::pipeline::{CaseEvaluator, CaseInputs};
//! use evalgrade_core::providers::fake::FakeLlmClient;
//! use evalgrade_core::rubric::RubricRegistry;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = EvalConfig::default();
//! let client = Arc::new(FakeLlmClient::new().with_default_reply("[Yes]"));
//! let gateway = JudgeGateway::new(client, config.judge.temperature);
//! let evaluator = CaseEvaluator::new(&gateway, RubricRegistry::standard(), &config)?;
//!
//! let inputs = CaseInputs::load("cases/case_1".as_ref())?;
//! let outcome = evaluator.evaluate(&inputs).await;
//! outcome.write_to("cases/case_1".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod agreement;
pub mod annotation;
pub mod config;
pub mod errors;
pub mod expert;
pub mod judge;
pub mod linking;
pub mod model;
pub mod normalize;
pub mod pairing;
pub mod pipeline;
pub mod profile;
pub mod providers;
pub mod report;
pub mod rubric;
pub mod transcript;
pub mod verdict;

pub use errors::{ConfigError, EvalError, Result};
pub use model::{Aspect, EvaluationItem, ItemType, Label, PreviousQuery};
