//! Many case folders, graded concurrently with a bounded number in flight.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use super::{CaseEvaluator, CaseInputs, TRANSCRIPT_FILE};
use crate::errors::{EvalError, Result};
use crate::report::summary::CaseSummary;

#[derive(Debug)]
pub struct CaseRun {
    pub dir: PathBuf,
    pub result: Result<CaseSummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchTally {
    pub fn from_runs(runs: &[CaseRun]) -> Self {
        let succeeded = runs.iter().filter(|r| r.result.is_ok()).count();
        Self {
            succeeded,
            failed: runs.len() - succeeded,
        }
    }
}

/// Sub-folders of `cases_dir` holding a transcript, sorted by path.
/// Folders without one are skipped with a warning.
pub fn discover_cases(cases_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(cases_dir).map_err(|e| EvalError::io(cases_dir, e))?;
    let mut cases = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EvalError::io(cases_dir, e))?.path();
        if !path.is_dir() {
            continue;
        }
        if path.join(TRANSCRIPT_FILE).is_file() {
            cases.push(path);
        } else {
            warn!(case = %path.display(), "skipping: {} missing", TRANSCRIPT_FILE);
        }
    }
    cases.sort();
    Ok(cases)
}

async fn run_case(evaluator: &CaseEvaluator<'_>, dir: &Path) -> Result<CaseSummary> {
    let inputs = CaseInputs::load(dir)?;
    let outcome = evaluator.evaluate(&inputs).await;
    outcome.write_to(dir)?;
    Ok(outcome.summary)
}

/// At most `jobs` cases in flight. A failing case never stops the others.
/// Results come back in completion order.
pub async fn evaluate_cases(
    evaluator: &CaseEvaluator<'_>,
    dirs: Vec<PathBuf>,
    jobs: usize,
) -> Vec<CaseRun> {
    info!(cases = dirs.len(), jobs, "starting batch");
    stream::iter(dirs)
        .map(|dir| async move {
            let result = run_case(evaluator, &dir).await;
            match &result {
                Ok(summary) => info!(case = %dir.display(), rows = summary.rows, "case complete"),
                Err(e) => error!(case = %dir.display(), "case failed: {}", e),
            }
            CaseRun { dir, result }
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await
}
