use super::super::args::EvaluateArgs;
use super::runner_builder::{build_gateway, load_effective_config};
use crate::exit_codes;
use evalgrade_core::pipeline::{CaseEvaluator, CaseInputs};
use evalgrade_core::report::summary::CaseSummary;
use evalgrade_core::report::RowOutcome;
use evalgrade_core::rubric::RubricRegistry;

pub async fn run(args: EvaluateArgs) -> anyhow::Result<i32> {
    let cfg = load_effective_config(&args.judge)?;
    let gateway = build_gateway(&cfg, &args.judge)?;
    let evaluator = CaseEvaluator::new(&gateway, RubricRegistry::standard(), &cfg)?;

    let inputs = match CaseInputs::load(&args.case_folder) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(exit_codes::CASE_FAILED);
        }
    };
    let outcome = evaluator.evaluate(&inputs).await;
    if let Err(e) = outcome.write_to(&args.case_folder) {
        eprintln!("error: {e}");
        return Ok(exit_codes::CASE_FAILED);
    }

    println!("{}", summary_line(&outcome.summary));
    Ok(exit_codes::SUCCESS)
}

pub(crate) fn summary_line(s: &CaseSummary) -> String {
    let counts: Vec<String> = RowOutcome::ALL
        .iter()
        .map(|o| format!("{} {}", o.as_str(), s.outcome_count(*o)))
        .collect();
    format!(
        "{}: {} items, {} rows ({}), correctness {}/{}",
        s.case,
        s.items,
        s.rows,
        counts.join(", "),
        s.correctness.matches,
        s.correctness.total
    )
}
