//! Aligns human labels, judge labels and reasoning to one row count.

use crate::model::Label;

pub const DEFAULT_EMPTY_LENGTH: usize = 1;
pub const NO_RESPONSE: &str = "No Response";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub human: Vec<Label>,
    pub model: Vec<Label>,
    pub reasoning: Vec<String>,
}

impl Reconciled {
    pub fn len(&self) -> usize {
        self.human.len()
    }

    pub fn is_empty(&self) -> bool {
        self.human.is_empty()
    }
}

fn fit<T: Clone>(mut values: Vec<T>, len: usize, pad: T) -> Vec<T> {
    values.resize(len, pad);
    values
}

/// Target length is the human length, else the judge length, else `empty_length`.
/// A single judge label is broadcast over a longer human list; otherwise the
/// judge side is padded with `Error`, reasoning with empty text and the human
/// side with `N/A`. Longer lists are truncated.
pub fn reconcile(
    human: Vec<Label>,
    model: Vec<Label>,
    reasoning: Vec<String>,
    empty_length: usize,
) -> Reconciled {
    let target = if !human.is_empty() {
        human.len()
    } else if !model.is_empty() {
        model.len()
    } else {
        empty_length
    };

    let model = match model.as_slice() {
        [single] if target > 1 => vec![single.clone(); target],
        _ => fit(model, target, Label::Error),
    };

    Reconciled {
        human: fit(human, target, Label::Missing),
        model,
        reasoning: fit(reasoning, target, String::new()),
    }
}

/// Rows for an (item, aspect) whose judge call failed.
pub fn unavailable(human: Vec<Label>, empty_length: usize) -> Reconciled {
    let target = if human.is_empty() {
        empty_length
    } else {
        human.len()
    };
    Reconciled {
        human: fit(human, target, Label::Missing),
        model: vec![Label::Error; target],
        reasoning: vec![NO_RESPONSE.to_string(); target],
    }
}
