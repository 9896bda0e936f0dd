//! Human-vs-judge agreement across graded reports.

pub mod render;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::annotation::question_count;
use crate::errors::{EvalError, Result};
use crate::model::{Aspect, Label};
use crate::report::table::read_rows;
use crate::report::ReportRow;

pub const REPORT_FILE: &str = "evaluation.csv";

/// Agreement is tracked per rubric question, not per aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubCategory {
    #[serde(rename = "Last Question")]
    LastQuestion,
    Profession,
    Concern,
    Location,
    Time,
    Scope,
    #[serde(rename = "No Jargon")]
    NoJargon,
    #[serde(rename = "Enough Explanation")]
    EnoughExplanation,
    #[serde(rename = "No Redundancy")]
    NoRedundancy,
    Entailment,
}

const RELEVANCE: [SubCategory; 6] = [
    SubCategory::LastQuestion,
    SubCategory::Profession,
    SubCategory::Concern,
    SubCategory::Location,
    SubCategory::Time,
    SubCategory::Scope,
];

const ACCESSIBILITY: [SubCategory; 3] = [
    SubCategory::NoJargon,
    SubCategory::EnoughExplanation,
    SubCategory::NoRedundancy,
];

impl SubCategory {
    pub const ALL: [SubCategory; 10] = [
        SubCategory::LastQuestion,
        SubCategory::Profession,
        SubCategory::Concern,
        SubCategory::Location,
        SubCategory::Time,
        SubCategory::Scope,
        SubCategory::NoJargon,
        SubCategory::EnoughExplanation,
        SubCategory::NoRedundancy,
        SubCategory::Entailment,
    ];

    /// Sub-category of question `index` (0-based) of `aspect`. Correctness has none.
    pub fn for_position(aspect: Aspect, index: usize) -> Option<SubCategory> {
        match aspect {
            Aspect::Relevance => RELEVANCE.get(index).copied(),
            Aspect::Accessibility => ACCESSIBILITY.get(index).copied(),
            Aspect::Entailment => (index == 0).then_some(SubCategory::Entailment),
            Aspect::Correctness => None,
        }
    }

    pub fn aspect(self) -> Aspect {
        match self {
            SubCategory::Entailment => Aspect::Entailment,
            SubCategory::NoJargon | SubCategory::EnoughExplanation | SubCategory::NoRedundancy => {
                Aspect::Accessibility
            }
            _ => Aspect::Relevance,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubCategory::LastQuestion => "Last Question",
            SubCategory::Profession => "Profession",
            SubCategory::Concern => "Concern",
            SubCategory::Location => "Location",
            SubCategory::Time => "Time",
            SubCategory::Scope => "Scope",
            SubCategory::NoJargon => "No Jargon",
            SubCategory::EnoughExplanation => "Enough Explanation",
            SubCategory::NoRedundancy => "No Redundancy",
            SubCategory::Entailment => "Entailment",
        }
    }
}

impl std::fmt::Display for SubCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disagreements with one (human, judge) label pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionBucket {
    pub count: usize,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategorySummary {
    pub agree: usize,
    pub disagree: usize,
    /// Keyed `"<human> vs <judge>"`.
    pub buckets: BTreeMap<String, ConfusionBucket>,
}

impl SubCategorySummary {
    pub fn total(&self) -> usize {
        self.agree + self.disagree
    }

    fn merge(&mut self, other: &SubCategorySummary) {
        self.agree += other.agree;
        self.disagree += other.disagree;
        for (key, bucket) in &other.buckets {
            let mine = self.buckets.entry(key.clone()).or_default();
            mine.count += bucket.count;
            mine.reasoning.extend(bucket.reasoning.iter().cloned());
        }
    }
}

pub fn bucket_key(human: &Label, model: &Label) -> String {
    format!("{} vs {}", human, model)
}

/// Running agree/disagree tallies for every sub-category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregator {
    summaries: BTreeMap<SubCategory, SubCategorySummary>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            summaries: SubCategory::ALL
                .iter()
                .map(|s| (*s, SubCategorySummary::default()))
                .collect(),
        }
    }

    /// Human `Not Applicable` rows are skipped. Any other mismatch, including
    /// `Error` and `Error Parsing` judge labels, is a disagreement.
    pub fn accumulate(&mut self, sub: SubCategory, human: &Label, model: &Label, reasoning: &str) {
        if *human == Label::NotApplicable {
            return;
        }
        let summary = self.summaries.entry(sub).or_default();
        if human == model {
            summary.agree += 1;
            return;
        }
        summary.disagree += 1;
        let bucket = summary.buckets.entry(bucket_key(human, model)).or_default();
        bucket.count += 1;
        if !reasoning.trim().is_empty() && reasoning != "nan" {
            bucket.reasoning.push(reasoning.to_string());
        }
    }

    /// Assigns each row its sub-category from `sub_index`, falling back to the
    /// row's position among same-aspect rows for reports without that column.
    pub fn accumulate_rows(&mut self, rows: &[ReportRow]) {
        let mut seen: BTreeMap<Aspect, usize> = BTreeMap::new();
        for row in rows {
            let ordinal = seen.entry(row.aspect).or_insert(0);
            let stride = question_count(row.aspect).max(1);
            let index = row.sub_index.unwrap_or(*ordinal % stride);
            *ordinal += 1;

            if let Some(sub) = SubCategory::for_position(row.aspect, index) {
                self.accumulate(sub, &row.human_score, &row.input_score, &row.reasoning);
            }
        }
    }

    pub fn merge(&mut self, other: &Aggregator) {
        for (sub, summary) in &other.summaries {
            self.summaries.entry(*sub).or_default().merge(summary);
        }
    }

    pub fn get(&self, sub: SubCategory) -> Option<&SubCategorySummary> {
        self.summaries.get(&sub)
    }

    pub fn summaries(&self) -> impl Iterator<Item = (SubCategory, &SubCategorySummary)> {
        self.summaries.iter().map(|(k, v)| (*k, v))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseAgreement {
    pub report: PathBuf,
    pub summary: Aggregator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementReport {
    pub cases: Vec<CaseAgreement>,
    pub overall: Aggregator,
}

/// Every `evaluation.csv` under `base`, sorted.
pub fn discover_reports(base: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![base.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| EvalError::io(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| EvalError::io(&dir, e))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.file_name().is_some_and(|n| n == REPORT_FILE) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Per-report and overall agreement for every report under `base`.
/// Unreadable reports are skipped with a warning.
pub fn analyze(base: &Path) -> Result<AgreementReport> {
    let mut cases = Vec::new();
    let mut overall = Aggregator::new();
    for report in discover_reports(base)? {
        let rows = match read_rows(&report) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(report = %report.display(), "skipping report: {}", e);
                continue;
            }
        };
        let mut summary = Aggregator::new();
        summary.accumulate_rows(&rows);
        overall.merge(&summary);
        cases.push(CaseAgreement { report, summary });
    }
    Ok(AgreementReport { cases, overall })
}
