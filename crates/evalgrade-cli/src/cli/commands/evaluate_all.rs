use super::super::args::EvaluateAllArgs;
use super::evaluate::summary_line;
use super::runner_builder::{build_gateway, load_effective_config};
use crate::exit_codes;
use anyhow::Context;
use evalgrade_core::pipeline::batch::{discover_cases, evaluate_cases, BatchTally};
use evalgrade_core::pipeline::CaseEvaluator;
use evalgrade_core::rubric::RubricRegistry;

pub async fn run(args: EvaluateAllArgs) -> anyhow::Result<i32> {
    let cfg = load_effective_config(&args.judge)?;
    let gateway = build_gateway(&cfg, &args.judge)?;
    let evaluator = CaseEvaluator::new(&gateway, RubricRegistry::standard(), &cfg)?;

    let dirs = discover_cases(&args.cases_dir)
        .with_context(|| format!("failed to list cases in {}", args.cases_dir.display()))?;
    let mut runs = evaluate_cases(&evaluator, dirs, args.jobs).await;
    runs.sort_by(|a, b| a.dir.cmp(&b.dir));

    for run in &runs {
        match &run.result {
            Ok(summary) => println!("{}", summary_line(summary)),
            Err(e) => println!("{}: FAILED: {}", run.dir.display(), e),
        }
    }
    let tally = BatchTally::from_runs(&runs);
    println!("{} succeeded, {} failed", tally.succeeded, tally.failed);

    Ok(if tally.failed > 0 {
        exit_codes::CASE_FAILED
    } else {
        exit_codes::SUCCESS
    })
}
