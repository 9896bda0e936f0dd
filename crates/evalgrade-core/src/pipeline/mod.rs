//! Grades one case folder end to end.
//!
//! Loading and writing are the only fallible steps. Grading itself never
//! fails: judge outages and unparseable replies become marked report rows.

pub mod batch;

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::annotation::human_scores;
use crate::config::EvalConfig;
use crate::errors::{ConfigError, EvalError, Result};
use crate::judge::JudgeGateway;
use crate::linking::link_blocks;
use crate::model::{Aspect, EvaluationItem};
use crate::pairing::pair_blocks;
use crate::profile::UserProfile;
use crate::report::summary::CaseSummary;
use crate::report::table::write_rows;
use crate::report::{ReportRow, RowOutcome};
use crate::rubric::{RubricContext, RubricRegistry};
use crate::transcript::Transcript;
use crate::verdict::reconcile::{reconcile, unavailable, Reconciled};
use crate::verdict::{parse_correctness, parse_verdict, CorrectnessScore};

pub const TRANSCRIPT_FILE: &str = "interaction.jsonl";
pub const TOOL_LOG_FILE: &str = "tools.txt";
pub const PROFILE_FILE: &str = "user_profile.txt";
pub const REPORT_FILE: &str = "evaluation.csv";
pub const DATA_DICT_FILE: &str = "data_dict.json";
pub const SUMMARY_FILE: &str = "evaluation_summary.json";

/// Entity counts in `data_dict.json` (`auto_score` from the judge,
/// `manual_score` seeded with the same values for later hand correction).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityScore {
    pub total_score: u32,
    pub total_count: u32,
}

impl From<CorrectnessScore> for EntityScore {
    fn from(s: CorrectnessScore) -> Self {
        Self {
            total_score: s.matches,
            total_count: s.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDictEntry {
    #[serde(flatten)]
    pub item: EvaluationItem,
    pub auto_score: EntityScore,
    pub manual_score: EntityScore,
}

/// The three input files of one case.
#[derive(Debug, Clone, Default)]
pub struct CaseInputs {
    pub case: String,
    pub transcript: Transcript,
    pub tool_log: String,
    pub profile: UserProfile,
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EvalError::io(path, e)),
    }
}

impl CaseInputs {
    /// Missing transcript or tool log is warned about and treated as empty;
    /// a missing profile is silently empty.
    pub fn load(dir: &Path) -> Result<Self> {
        let transcript = match read_optional(&dir.join(TRANSCRIPT_FILE))? {
            Some(text) => Transcript::parse_jsonl(&text)?,
            None => {
                warn!(case = %dir.display(), "no {} found", TRANSCRIPT_FILE);
                Transcript::default()
            }
        };
        let tool_log = read_optional(&dir.join(TOOL_LOG_FILE))?.unwrap_or_else(|| {
            warn!(case = %dir.display(), "no {} found", TOOL_LOG_FILE);
            String::new()
        });
        let profile = read_optional(&dir.join(PROFILE_FILE))?
            .map(|text| UserProfile::parse(&text))
            .unwrap_or_default();

        Ok(Self::from_parts(dir.display().to_string(), transcript, tool_log, profile))
    }

    pub fn from_parts(
        case: impl Into<String>,
        transcript: Transcript,
        tool_log: impl Into<String>,
        profile: UserProfile,
    ) -> Self {
        Self {
            case: case.into(),
            transcript,
            tool_log: tool_log.into(),
            profile,
        }
    }
}

/// Everything produced for one case.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub rows: Vec<ReportRow>,
    pub entries: Vec<DataDictEntry>,
    pub summary: CaseSummary,
}

impl CaseOutcome {
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        write_rows(&dir.join(REPORT_FILE), &self.rows)?;

        let data_dict = dir.join(DATA_DICT_FILE);
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            EvalError::io(&data_dict, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        std::fs::write(&data_dict, json).map_err(|e| EvalError::io(&data_dict, e))?;

        self.summary.write(&dir.join(SUMMARY_FILE))?;
        info!(case = %self.summary.case, rows = self.rows.len(), "wrote report to {}", dir.display());
        Ok(())
    }
}

/// Grades cases against one judge. Shared read-only between concurrent cases.
#[derive(Debug)]
pub struct CaseEvaluator<'a> {
    gateway: &'a JudgeGateway,
    registry: RubricRegistry,
    aspects: Vec<Aspect>,
    empty_length: usize,
}

impl<'a> CaseEvaluator<'a> {
    /// Fails when the registry lacks a rubric for a configured aspect.
    pub fn new(
        gateway: &'a JudgeGateway,
        registry: RubricRegistry,
        config: &EvalConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        registry.validate(&config.aspects)?;
        Ok(Self {
            gateway,
            registry,
            aspects: config.aspects.clone(),
            empty_length: config.reconcile.empty_length,
        })
    }

    /// Categorical aspects for every item in order, then correctness.
    pub async fn evaluate(&self, inputs: &CaseInputs) -> CaseOutcome {
        let started_at = Utc::now();
        let items = link_blocks(pair_blocks(&inputs.tool_log), &inputs.transcript);
        info!(case = %inputs.case, items = items.len(), "grading case");

        let mut summary = CaseSummary::new(&inputs.case, self.gateway.provider_name(), started_at);
        summary.items = items.len();
        let mut rows = Vec::new();
        let mut entries = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let ctx = RubricContext {
                item: &item,
                profile: &inputs.profile,
                query: &item.previous_query,
            };

            for &aspect in self.aspects.iter().filter(|a| a.is_categorical()) {
                let graded = self.grade_categorical(aspect, &ctx, inputs).await;
                let item_rows = to_rows(&inputs.case, aspect, index, graded);
                summary.count_rows(&item_rows);
                rows.extend(item_rows);
            }

            let score = if self.aspects.contains(&Aspect::Correctness) {
                match self.grade_correctness(&ctx).await {
                    Some(score) => score,
                    None => {
                        summary.correctness_unavailable += 1;
                        CorrectnessScore::default()
                    }
                }
            } else {
                CorrectnessScore::default()
            };
            summary.add_correctness(score);
            entries.push(DataDictEntry {
                item,
                auto_score: score.into(),
                manual_score: score.into(),
            });
        }

        summary.finished_at = Utc::now();
        CaseOutcome {
            rows,
            entries,
            summary,
        }
    }

    async fn grade_categorical(
        &self,
        aspect: Aspect,
        ctx: &RubricContext<'_>,
        inputs: &CaseInputs,
    ) -> (Reconciled, RowOutcome) {
        let human = inputs
            .transcript
            .turn(ctx.item.current_entry)
            .map(|turn| human_scores(turn, aspect))
            .unwrap_or_default();

        let prompts = match self.registry.build(aspect, ctx) {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!(%aspect, "{}", e);
                return (unavailable(human, self.empty_length), RowOutcome::Unavailable);
            }
        };

        match self.gateway.grade(&prompts).await {
            Ok(raw) => {
                let outcome = parse_verdict(&raw, aspect);
                let kind = outcome.kind();
                if let crate::verdict::ParseOutcome::Degraded { note, .. } = &outcome {
                    debug!(%aspect, entry = ctx.item.current_entry, "{}", note);
                }
                let verdict = outcome.into_verdict();
                (
                    reconcile(human, verdict.scores, verdict.reasoning, self.empty_length),
                    kind,
                )
            }
            Err(_) => (unavailable(human, self.empty_length), RowOutcome::Unavailable),
        }
    }

    async fn grade_correctness(&self, ctx: &RubricContext<'_>) -> Option<CorrectnessScore> {
        let prompts = match self.registry.build(Aspect::Correctness, ctx) {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };
        let raw = self.gateway.grade(&prompts).await.ok()?;
        Some(parse_correctness(&raw))
    }
}

fn to_rows(case: &str, aspect: Aspect, item: usize, graded: (Reconciled, RowOutcome)) -> Vec<ReportRow> {
    let (r, outcome) = graded;
    r.human
        .into_iter()
        .zip(r.model)
        .zip(r.reasoning)
        .enumerate()
        .map(|(sub_index, ((human_score, input_score), reasoning))| ReportRow {
            case: case.to_string(),
            aspect,
            human_score,
            input_score,
            reasoning,
            item: Some(item),
            sub_index: Some(sub_index),
            outcome: Some(outcome),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;
    use crate::providers::fake::FakeLlmClient;
    use crate::transcript::{Role, Turn};
    use std::sync::Arc;

    const LOG: &str = "**Tool Outputs**\nFWI in Chico: 32 (high)\n----------\nUse the FWI.\n\
                       **LLM Response**\nThe fire weather index near Chico is 32.\nPlan for July.\n";

    fn inputs() -> CaseInputs {
        let transcript = Transcript::new(vec![
            Turn::new(Role::User, "How risky is July?"),
            Turn::new(Role::Assistant, "The fire weather index\nnear Chico is 32. Plan for July.")
                .with_annotation("relevance_feedback_q1", "Yes")
                .with_annotation("entailment_feedback_q1", "No")
                .with_annotation("accessibility_feedback_q1", "No"),
        ]);
        CaseInputs::from_parts("case_1", transcript, LOG, UserProfile::parse("Profession: Farmer"))
    }

    fn config(aspects: Vec<Aspect>) -> EvalConfig {
        EvalConfig {
            aspects,
            ..EvalConfig::default()
        }
    }

    #[tokio::test]
    async fn grades_every_aspect_of_a_linked_item() {
        let fake = Arc::new(
            FakeLlmClient::new()
                .with_reply("['Yes', 'No', 'Yes', 'Yes', 'Yes', 'Not Applicable']")
                .with_reply("(1) Supported.\n\n['Yes']")
                .with_reply("['No', 'Yes', 'No']")
                .with_reply("Entities: FWI, Chico")
                .with_reply("Score: 2/2"),
        );
        let gateway = JudgeGateway::new(fake, 0.1);
        let evaluator = CaseEvaluator::new(&gateway, RubricRegistry::standard(), &EvalConfig::default()).unwrap();
        let out = evaluator.evaluate(&inputs()).await;

        assert_eq!(out.summary.items, 1);
        assert_eq!(out.rows.len(), 6 + 1 + 3);
        assert!(out.rows.iter().all(|r| r.outcome == Some(RowOutcome::Clean)));

        let entailment: Vec<_> = out.rows.iter().filter(|r| r.aspect == Aspect::Entailment).collect();
        assert_eq!(entailment[0].human_score, Label::No);
        assert_eq!(entailment[0].input_score, Label::Yes);
        assert_eq!(entailment[0].reasoning, "Supported.");

        // human "uses jargon: No" and judge "No" both flip to Yes
        let access: Vec<_> = out.rows.iter().filter(|r| r.aspect == Aspect::Accessibility).collect();
        assert_eq!(access[0].human_score, Label::Yes);
        assert_eq!(access[0].input_score, Label::Yes);
        assert_eq!(access[2].sub_index, Some(2));

        assert_eq!(out.entries[0].auto_score, EntityScore { total_score: 2, total_count: 2 });
        assert_eq!(out.summary.correctness, CorrectnessScore { matches: 2, total: 2 });
    }

    #[tokio::test]
    async fn judge_outage_yields_unavailable_rows() {
        let fake = Arc::new(FakeLlmClient::new().with_failure("connection refused"));
        let gateway = JudgeGateway::new(fake, 0.1);
        let evaluator =
            CaseEvaluator::new(&gateway, RubricRegistry::standard(), &config(vec![Aspect::Relevance])).unwrap();
        let out = evaluator.evaluate(&inputs()).await;

        assert_eq!(out.rows.len(), 6);
        assert!(out.rows.iter().all(|r| r.input_score == Label::Error && r.reasoning == "No Response"));
        assert_eq!(out.summary.outcome_count(RowOutcome::Unavailable), 6);
        assert_eq!(out.entries[0].auto_score, EntityScore::default());
    }

    #[tokio::test]
    async fn unparseable_reply_is_failed_not_fatal() {
        let fake = Arc::new(FakeLlmClient::new().with_default_reply("I cannot grade this [Yes"));
        let gateway = JudgeGateway::new(fake, 0.1);
        let evaluator =
            CaseEvaluator::new(&gateway, RubricRegistry::standard(), &config(vec![Aspect::Entailment])).unwrap();
        let out = evaluator.evaluate(&inputs()).await;

        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].input_score, Label::ErrorParsing);
        assert_eq!(out.rows[0].reasoning, "I cannot grade this [Yes");
        assert_eq!(out.rows[0].outcome, Some(RowOutcome::Failed));
    }

    #[tokio::test]
    async fn correctness_outage_is_counted() {
        let fake = Arc::new(FakeLlmClient::new().with_reply("entities").with_failure("timeout"));
        let gateway = JudgeGateway::new(fake, 0.1);
        let evaluator =
            CaseEvaluator::new(&gateway, RubricRegistry::standard(), &config(vec![Aspect::Correctness])).unwrap();
        let out = evaluator.evaluate(&inputs()).await;
        assert!(out.rows.is_empty());
        assert_eq!(out.summary.correctness_unavailable, 1);
    }

    #[test]
    fn incomplete_registry_is_rejected() {
        let fake = Arc::new(FakeLlmClient::new());
        let gateway = JudgeGateway::new(fake, 0.1);
        let err = CaseEvaluator::new(&gateway, RubricRegistry::empty(), &EvalConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRubric { .. }));
    }

    #[test]
    fn load_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = CaseInputs::load(dir.path()).unwrap();
        assert!(inputs.transcript.is_empty());
        assert!(inputs.tool_log.is_empty());
        assert!(inputs.profile.is_empty());
    }

    #[test]
    fn data_dict_entry_flattens_item() {
        let entry = DataDictEntry {
            item: inputs_item(),
            auto_score: EntityScore { total_score: 1, total_count: 2 },
            manual_score: EntityScore { total_score: 1, total_count: 2 },
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["type"], "values_and_recommendations");
        assert_eq!(v["manual_score"]["total_count"], 2);
        let back: DataDictEntry = serde_json::from_value(v).unwrap();
        assert_eq!(back, entry);
    }

    fn inputs_item() -> EvaluationItem {
        EvaluationItem {
            tool_outputs: "**Tool Outputs**\nFWI 32".into(),
            llm_response: "**LLM Response**\nFWI is 32.".into(),
            item_type: crate::model::ItemType::ValuesAndRecommendations,
            previous_query: crate::model::PreviousQuery::Query("q".into()),
            current_entry: 1,
        }
    }
}
