//! Expert (human) scores per sub-category, and correctness totals from a
//! graded case's `data_dict.json`.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use crate::agreement::SubCategory;
use crate::annotation::human_scores;
use crate::errors::{EvalError, Result};
use crate::model::{Aspect, ItemType, Label};
use crate::pipeline::DataDictEntry;
use crate::transcript::Transcript;
use crate::verdict::CorrectnessScore;

/// Yes = 1, No = 0, Could be better = 0.5. Everything else is not scored.
pub fn score_value(label: &Label) -> Option<f64> {
    match label {
        Label::Yes => Some(1.0),
        Label::No => Some(0.0),
        Label::CouldBeBetter => Some(0.5),
        _ => None,
    }
}

/// `mean(sum/count)` e.g. `0.5000(1/2)`; `n/a(0/0)` when nothing was scored.
pub fn format_score(sum: f64, count: usize) -> String {
    if count == 0 {
        return "n/a(0/0)".to_string();
    }
    let sum_text = if sum.fract() == 0.0 {
        format!("{}", sum as i64)
    } else {
        format!("{}", sum)
    };
    format!("{:.4}({}/{})", sum / count as f64, sum_text, count)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpertScores {
    values: BTreeMap<SubCategory, Vec<f64>>,
}

impl ExpertScores {
    /// Scores every annotated turn of the transcript.
    pub fn from_transcript(transcript: &Transcript) -> Self {
        let mut values: BTreeMap<SubCategory, Vec<f64>> = BTreeMap::new();
        for turn in transcript.turns() {
            for aspect in [Aspect::Relevance, Aspect::Entailment, Aspect::Accessibility] {
                for (idx, label) in human_scores(turn, aspect).iter().enumerate() {
                    let (Some(sub), Some(v)) =
                        (SubCategory::for_position(aspect, idx), score_value(label))
                    else {
                        continue;
                    };
                    values.entry(sub).or_default().push(v);
                }
            }
        }
        Self { values }
    }

    pub fn values(&self, sub: SubCategory) -> &[f64] {
        self.values.get(&sub).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn formatted(&self, sub: SubCategory) -> String {
        let v = self.values(sub);
        format_score(v.iter().sum(), v.len())
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Expert scores:\n");
        let mut current: Option<Aspect> = None;
        for sub in SubCategory::ALL {
            let aspect = sub.aspect();
            if current != Some(aspect) && aspect != Aspect::Entailment {
                let _ = writeln!(out, "{}:", capitalize(aspect.as_str()));
            }
            current = Some(aspect);
            let _ = writeln!(out, "{}: {}", sub, self.formatted(sub));
        }
        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Manual entity scores summed per item family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectnessTotals {
    pub data_analysis: CorrectnessScore,
    pub literature_review: CorrectnessScore,
}

impl CorrectnessTotals {
    /// Literature items always count; data-analysis items only when they
    /// name at least one entity.
    pub fn from_entries(entries: &[DataDictEntry]) -> Self {
        let mut totals = Self::default();
        for entry in entries {
            let score = entry.manual_score;
            let target = match entry.item.item_type {
                ItemType::Literature => &mut totals.literature_review,
                _ if score.total_count == 0 => continue,
                _ => &mut totals.data_analysis,
            };
            target.add(CorrectnessScore {
                matches: score.total_score,
                total: score.total_count,
            });
        }
        totals
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        let entries: Vec<DataDictEntry> = serde_json::from_str(&text).map_err(|e| {
            EvalError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        Ok(Self::from_entries(&entries))
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Correctness scores:");
        for (name, score) in [
            ("Data analysis", self.data_analysis),
            ("Literature review", self.literature_review),
        ] {
            if score.total > 0 {
                let _ = write!(
                    out,
                    "\n{}: {}",
                    name,
                    format_score(f64::from(score.matches), score.total as usize)
                );
            }
        }
        out.push('\n');
        out
    }
}
