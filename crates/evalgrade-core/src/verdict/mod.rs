//! Recovering a structured verdict from free-form judge text.
//!
//! Parsing is staged and never fails outright: every reply ends up as
//! [`ParseOutcome::Clean`], [`ParseOutcome::Degraded`] (recovered through a
//! repair or fallback, with a note saying which) or [`ParseOutcome::Failed`].

pub mod literal;
pub mod reconcile;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::annotation::apply_accessibility_polarity;
use crate::model::{Aspect, Label};
use crate::report::RowOutcome;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```[A-Za-z0-9_+-]*").unwrap();
    static ref REASONING_BLOCK: Regex = Regex::new(r"(?s)\(\d+\)\s+(.*?)\n\n").unwrap();
    static ref TUPLE_GROUP: Regex = Regex::new(r"\([^()]*,[^()]*\)").unwrap();
    static ref NUMBERED_MARK: Regex = Regex::new(r"\(\d+\)").unwrap();
    static ref PROSE_ANSWER: Regex =
        Regex::new(r"(?i)\b(could be better|not applicable|yes|no)\b").unwrap();
    static ref ANSWER_MARKER: Regex = Regex::new(r"(?i)\banswer\s*:").unwrap();
    static ref FRACTION: Regex = Regex::new(r"(\d+)/(\d+)").unwrap();
}

/// Per-question labels plus the judge's reasoning blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdict {
    pub scores: Vec<Label>,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Clean(Verdict),
    Degraded { verdict: Verdict, note: String },
    Failed { raw: String },
}

impl ParseOutcome {
    pub fn kind(&self) -> RowOutcome {
        match self {
            ParseOutcome::Clean(_) => RowOutcome::Clean,
            ParseOutcome::Degraded { .. } => RowOutcome::Degraded,
            ParseOutcome::Failed { .. } => RowOutcome::Failed,
        }
    }

    /// `Failed` becomes a single `Error Parsing` label with the raw text as reasoning.
    pub fn into_verdict(self) -> Verdict {
        match self {
            ParseOutcome::Clean(verdict) | ParseOutcome::Degraded { verdict, .. } => verdict,
            ParseOutcome::Failed { raw } => Verdict {
                scores: vec![Label::ErrorParsing],
                reasoning: vec![raw],
            },
        }
    }
}

/// Entity score from the correctness rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorrectnessScore {
    pub matches: u32,
    pub total: u32,
}

impl CorrectnessScore {
    /// Running total; saturates instead of overflowing on absurd judge counts.
    pub fn add(&mut self, other: CorrectnessScore) {
        self.matches = self.matches.saturating_add(other.matches);
        self.total = self.total.saturating_add(other.total);
    }
}

/// First `<int>/<int>` anywhere in the reply, else `0/0`. Parts too large
/// for `u32` saturate.
pub fn parse_correctness(raw: &str) -> CorrectnessScore {
    let Some(cap) = FRACTION.captures(raw) else {
        return CorrectnessScore::default();
    };
    let part = |s: &str| s.parse().unwrap_or(u32::MAX);
    CorrectnessScore {
        matches: part(&cap[1]),
        total: part(&cap[2]),
    }
}

/// Removes code-fence markers and normalizes line endings.
pub fn strip_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(&raw.replace("\r\n", "\n"), "").into_owned()
}

fn extract_reasoning(text: &str, raw: &str) -> Vec<String> {
    let blocks: Vec<String> = REASONING_BLOCK
        .captures_iter(text)
        .map(|cap| cap[1].trim().to_string())
        .collect();
    if blocks.is_empty() {
        vec![raw.to_string()]
    } else {
        blocks
    }
}

fn labels(items: Vec<String>) -> Vec<Label> {
    items.iter().map(|s| Label::parse(s)).collect()
}

enum ListStage {
    Strict(Vec<Label>),
    Recovered(Vec<Label>, &'static str),
    Unrecoverable,
}

/// Strict literal read, then quoting repair. A repaired list must contain
/// at least one answer label to count as recovered.
fn read_group(group: &str) -> ListStage {
    if let Ok(items) = literal::parse_sequence(group) {
        return ListStage::Strict(labels(items));
    }
    let Some(fixed) = literal::repair(group) else {
        return ListStage::Unrecoverable;
    };
    match literal::parse_sequence(&fixed) {
        Ok(items) => {
            let scores = labels(items);
            if scores.iter().any(Label::is_answer) {
                ListStage::Recovered(scores, "quoted bare tokens in verdict list")
            } else {
                ListStage::Unrecoverable
            }
        }
        Err(_) => ListStage::Unrecoverable,
    }
}

/// Last parenthesized comma group whose items are all answer labels.
fn scan_tuple(text: &str) -> Option<Vec<Label>> {
    let group = TUPLE_GROUP.find_iter(text).last()?.as_str();
    let scores = match read_group(group) {
        ListStage::Strict(s) | ListStage::Recovered(s, _) => s,
        ListStage::Unrecoverable => return None,
    };
    scores.iter().all(Label::is_answer).then_some(scores)
}

/// The answer word after an `Answer:` marker, else the last answer word.
fn segment_answer(segment: &str) -> Label {
    let hit = match ANSWER_MARKER.find(segment) {
        Some(marker) => PROSE_ANSWER.find(&segment[marker.end()..]),
        None => PROSE_ANSWER.find_iter(segment).last(),
    };
    hit.map_or(Label::ErrorParsing, |hit| Label::parse(hit.as_str()))
}

/// One label per `(N)` answer.
fn derive_from_prose(text: &str) -> Option<Vec<Label>> {
    let marks: Vec<_> = NUMBERED_MARK.find_iter(text).collect();
    if marks.is_empty() {
        return None;
    }
    let mut scores = Vec::with_capacity(marks.len());
    for (i, m) in marks.iter().enumerate() {
        let end = marks.get(i + 1).map_or(text.len(), |next| next.start());
        let segment = &text[m.end()..end];
        scores.push(segment_answer(segment));
    }
    scores.iter().any(Label::is_answer).then_some(scores)
}

/// Parses a judge reply for a categorical aspect.
pub fn parse_verdict(raw: &str, aspect: Aspect) -> ParseOutcome {
    let text = strip_fences(raw);
    let reasoning = extract_reasoning(&text, raw);

    let first_open = text.find('[');
    let last_close = text.rfind(']');
    let has_brackets = first_open.is_some() || last_close.is_some();

    let (mut scores, note) = match (first_open, last_close) {
        (Some(open), Some(close)) if open < close => match read_group(&text[open..=close]) {
            ListStage::Strict(s) => (s, None),
            ListStage::Recovered(s, note) => (s, Some(note.to_string())),
            ListStage::Unrecoverable => return ParseOutcome::Failed { raw: raw.to_string() },
        },
        _ => {
            if let Some(s) = scan_tuple(&text) {
                (s, None)
            } else if has_brackets {
                return ParseOutcome::Failed { raw: raw.to_string() };
            } else if let Some(s) = derive_from_prose(&text) {
                (s, Some("labels derived from numbered answers".to_string()))
            } else {
                return ParseOutcome::Failed { raw: raw.to_string() };
            }
        }
    };

    if aspect == Aspect::Accessibility {
        apply_accessibility_polarity(&mut scores);
    }

    let verdict = Verdict { scores, reasoning };
    match note {
        None => ParseOutcome::Clean(verdict),
        Some(note) => ParseOutcome::Degraded { verdict, note },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(outcome: ParseOutcome) -> Vec<Label> {
        outcome.into_verdict().scores
    }

    #[test]
    fn clean_list() {
        let out = parse_verdict("(1) Yes, it does.\n\nFinal: ['Yes']", Aspect::Entailment);
        assert_eq!(out.kind(), RowOutcome::Clean);
        let v = out.into_verdict();
        assert_eq!(v.scores, vec![Label::Yes]);
        assert_eq!(v.reasoning, vec!["Yes, it does."]);
    }

    #[test]
    fn bare_tokens_are_repaired() {
        let out = parse_verdict("Here you go: [Yes, No, Could be better]", Aspect::Relevance);
        assert!(matches!(out, ParseOutcome::Degraded { .. }));
        assert_eq!(
            scores(out),
            vec![Label::Yes, Label::No, Label::CouldBeBetter]
        );
    }

    #[test]
    fn accessibility_flips_first_and_third() {
        let out = parse_verdict("['Yes', 'No', 'Yes']", Aspect::Accessibility);
        assert_eq!(scores(out), vec![Label::No, Label::No, Label::No]);
    }

    #[test]
    fn accessibility_flip_keeps_other_labels() {
        let out = parse_verdict("['Could be better', 'Yes', 'Not Applicable']", Aspect::Accessibility);
        assert_eq!(
            scores(out),
            vec![Label::CouldBeBetter, Label::Yes, Label::NotApplicable]
        );
    }

    #[test]
    fn code_fences_are_ignored() {
        let raw = "```python\n['No', 'Yes']\n```";
        assert_eq!(scores(parse_verdict(raw, Aspect::Relevance)), vec![Label::No, Label::Yes]);
    }

    #[test]
    fn tuple_is_read_as_list() {
        let raw = "(1) The answer matches.\n\nSo: ('Yes', 'Could be better')";
        let out = parse_verdict(raw, Aspect::Relevance);
        assert_eq!(out.kind(), RowOutcome::Clean);
        assert_eq!(scores(out), vec![Label::Yes, Label::CouldBeBetter]);
    }

    #[test]
    fn tuple_scan_ignores_non_label_groups() {
        let raw = "(1) Yes, the location (Chico, CA) is used.\n\n(2) No, timeline missing.\n\n";
        let out = parse_verdict(raw, Aspect::Relevance);
        assert!(matches!(out, ParseOutcome::Degraded { .. }));
        assert_eq!(scores(out), vec![Label::Yes, Label::No]);
    }

    #[test]
    fn prose_answers_without_list() {
        let raw = "(1) Could be better: the answer is vague.\n\n(2) Not applicable here.\n\n";
        let out = parse_verdict(raw, Aspect::Relevance);
        assert_eq!(out.kind(), RowOutcome::Degraded);
        assert_eq!(scores(out), vec![Label::CouldBeBetter, Label::NotApplicable]);
    }

    #[test]
    fn unbalanced_brackets_fail() {
        let raw = "Verdict: [Yes, No";
        let out = parse_verdict(raw, Aspect::Relevance);
        assert_eq!(out.kind(), RowOutcome::Failed);
        let v = out.into_verdict();
        assert_eq!(v.scores, vec![Label::ErrorParsing]);
        assert_eq!(v.reasoning, vec![raw.to_string()]);
    }

    #[test]
    fn group_without_answers_fails() {
        let out = parse_verdict("See [the notes above]", Aspect::Entailment);
        assert_eq!(out.kind(), RowOutcome::Failed);
    }

    #[test]
    fn reasoning_falls_back_to_raw() {
        let raw = "['Yes']";
        assert_eq!(parse_verdict(raw, Aspect::Entailment).into_verdict().reasoning, vec![raw]);
    }

    #[test]
    fn correctness_fraction() {
        assert_eq!(
            parse_correctness("matches 3 out of 4. Score: 3/4"),
            CorrectnessScore { matches: 3, total: 4 }
        );
        assert_eq!(parse_correctness("no fraction here"), CorrectnessScore::default());
        assert_eq!(
            parse_correctness("Score: 2/5, earlier 1/2"),
            CorrectnessScore { matches: 2, total: 5 }
        );
    }

    #[test]
    fn oversized_fraction_saturates_instead_of_skipping() {
        assert_eq!(
            parse_correctness("Score: 5000000000/6000000000. Earlier draft said 1/2"),
            CorrectnessScore { matches: u32::MAX, total: u32::MAX }
        );
    }

    #[test]
    fn correctness_totals_saturate() {
        let mut sum = CorrectnessScore::default();
        sum.add(parse_correctness("3000000000/4000000000"));
        sum.add(parse_correctness("3000000000/4000000000"));
        assert_eq!(sum, CorrectnessScore { matches: u32::MAX, total: u32::MAX });
    }

    #[test]
    fn prose_prefers_closing_answer_word() {
        let raw = "(1) There is no jargon, so Yes.\n\n(2) Answer: No, although yes in part.\n\n";
        let out = parse_verdict(raw, Aspect::Relevance);
        assert_eq!(out.kind(), RowOutcome::Degraded);
        assert_eq!(scores(out), vec![Label::Yes, Label::No]);
    }
}
