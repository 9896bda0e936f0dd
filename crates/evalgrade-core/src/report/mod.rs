pub mod summary;
pub mod table;

use serde::{Deserialize, Serialize};

use crate::model::{Aspect, Label};

/// How the judge label in a row was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOutcome {
    Clean,
    Degraded,
    /// Judge replied but nothing could be parsed.
    Failed,
    /// Judge never replied.
    Unavailable,
}

impl RowOutcome {
    pub const ALL: [RowOutcome; 4] = [
        RowOutcome::Clean,
        RowOutcome::Degraded,
        RowOutcome::Failed,
        RowOutcome::Unavailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RowOutcome::Clean => "clean",
            RowOutcome::Degraded => "degraded",
            RowOutcome::Failed => "failed",
            RowOutcome::Unavailable => "unavailable",
        }
    }
}

/// One line of `evaluation.csv`. The last three columns are absent from
/// reports written by older tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub case: String,
    pub aspect: Aspect,
    pub human_score: Label,
    pub input_score: Label,
    pub reasoning: String,
    #[serde(default)]
    pub item: Option<usize>,
    #[serde(default)]
    pub sub_index: Option<usize>,
    #[serde(default)]
    pub outcome: Option<RowOutcome>,
}
