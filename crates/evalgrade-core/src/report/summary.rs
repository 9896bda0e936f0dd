//! `evaluation_summary.json`: machine-readable digest of one case run.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ReportRow, RowOutcome};
use crate::errors::{EvalError, Result};
use crate::verdict::CorrectnessScore;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub schema_version: u32,
    pub case: String,
    pub judge_provider: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Linked items graded.
    pub items: usize,
    pub rows: usize,
    /// Row counts keyed by outcome, every outcome present.
    pub outcomes: BTreeMap<RowOutcome, usize>,
    /// Correctness judge calls that never got a reply.
    pub correctness_unavailable: usize,
    pub correctness: CorrectnessScore,
}

impl CaseSummary {
    pub fn new(case: impl Into<String>, judge_provider: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            case: case.into(),
            judge_provider: judge_provider.into(),
            started_at,
            finished_at: started_at,
            items: 0,
            rows: 0,
            outcomes: RowOutcome::ALL.iter().map(|o| (*o, 0)).collect(),
            correctness_unavailable: 0,
            correctness: CorrectnessScore::default(),
        }
    }

    pub fn count_rows(&mut self, rows: &[ReportRow]) {
        self.rows += rows.len();
        for row in rows {
            if let Some(outcome) = row.outcome {
                *self.outcomes.entry(outcome).or_insert(0) += 1;
            }
        }
    }

    pub fn add_correctness(&mut self, score: CorrectnessScore) {
        self.correctness.add(score);
    }

    pub fn outcome_count(&self, outcome: RowOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            EvalError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        std::fs::write(path, json).map_err(|e| EvalError::io(path, e))
    }
}
