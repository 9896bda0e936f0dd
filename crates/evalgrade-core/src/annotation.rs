//! Human reference labels stored on annotated assistant turns.

use crate::model::{Aspect, Label};
use crate::transcript::Turn;

/// Positions whose rubric question is phrased negatively for accessibility
/// ("uses jargon", "is redundant"). Both human and judge labels are flipped
/// there so that `Yes` always means "good".
pub const ACCESSIBILITY_FLIPPED_POSITIONS: [usize; 2] = [0, 2];

/// Number of annotated questions per aspect.
pub fn question_count(aspect: Aspect) -> usize {
    match aspect {
        Aspect::Relevance => 6,
        Aspect::Accessibility => 3,
        Aspect::Entailment => 1,
        Aspect::Correctness => 0,
    }
}

pub fn feedback_key(aspect: Aspect, question: usize) -> String {
    format!("{}_feedback_q{}", aspect.as_str(), question)
}

/// Human reference list for `aspect`; unanswered questions are `Not Applicable`.
pub fn human_scores(turn: &Turn, aspect: Aspect) -> Vec<Label> {
    let mut scores: Vec<Label> = (1..=question_count(aspect))
        .map(|q| {
            turn.feedback(&feedback_key(aspect, q))
                .unwrap_or(Label::NotApplicable)
        })
        .collect();
    if aspect == Aspect::Accessibility {
        apply_accessibility_polarity(&mut scores);
    }
    scores
}

pub(crate) fn apply_accessibility_polarity(labels: &mut [Label]) {
    for &pos in &ACCESSIBILITY_FLIPPED_POSITIONS {
        if let Some(label) = labels.get_mut(pos) {
            *label = label.flipped();
        }
    }
}
