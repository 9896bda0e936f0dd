use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod common;
pub use common::*;

#[derive(Parser)]
#[command(
    name = "evalgrade",
    version,
    about = "Offline LLM-as-judge grading of consultation transcripts against expert annotations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grade one case folder
    Evaluate(EvaluateArgs),
    /// Grade every case folder under a directory
    EvaluateAll(EvaluateAllArgs),
    /// Human-vs-judge agreement over all evaluation.csv reports
    Agreement(AgreementArgs),
    /// Expert scores from annotated transcripts, plus correctness totals
    ExpertScores(ExpertScoresArgs),
    Version,
}

#[derive(clap::Args, Clone)]
pub struct EvaluateArgs {
    /// Case folder containing interaction.jsonl, tools.txt and user_profile.txt
    #[arg(long)]
    pub case_folder: PathBuf,

    #[command(flatten)]
    pub judge: JudgeArgs,
}

#[derive(clap::Args, Clone)]
pub struct EvaluateAllArgs {
    #[arg(long, default_value = "cases")]
    pub cases_dir: PathBuf,

    /// Cases graded concurrently
    #[arg(long, default_value_t = 1, env = "EVALGRADE_JOBS")]
    pub jobs: usize,

    #[command(flatten)]
    pub judge: JudgeArgs,
}

#[derive(clap::Args, Clone)]
pub struct AgreementArgs {
    /// Searched recursively for evaluation.csv
    #[arg(long, default_value = "case_studies")]
    pub base_folder: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also print one summary per report (text format)
    #[arg(long)]
    pub per_case: bool,
}

#[derive(clap::Args, Clone)]
pub struct ExpertScoresArgs {
    #[arg(long, default_value = "case_studies")]
    pub cases_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_evaluate_with_judge_flags() {
        let cli = Cli::try_parse_from([
            "evalgrade",
            "evaluate",
            "--case-folder",
            "cases/c1",
            "--judge",
            "fake",
            "--model",
            "gpt-4o",
        ])
        .unwrap();
        match cli.cmd {
            Command::Evaluate(args) => {
                assert_eq!(args.case_folder, PathBuf::from("cases/c1"));
                assert_eq!(args.judge.judge, Some(JudgeKind::Fake));
                assert_eq!(args.judge.model.as_deref(), Some("gpt-4o"));
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn evaluate_all_defaults() {
        let cli = Cli::try_parse_from(["evalgrade", "evaluate-all"]).unwrap();
        match cli.cmd {
            Command::EvaluateAll(args) => {
                assert_eq!(args.cases_dir, PathBuf::from("cases"));
                assert!(args.judge.config.is_none());
            }
            _ => panic!("expected evaluate-all"),
        }
    }

    #[test]
    fn agreement_json_format() {
        let cli =
            Cli::try_parse_from(["evalgrade", "agreement", "--base-folder", "x", "--format", "json"])
                .unwrap();
        assert!(matches!(
            cli.cmd,
            Command::Agreement(AgreementArgs { format: OutputFormat::Json, .. })
        ));
    }
}
