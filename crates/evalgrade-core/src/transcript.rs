//! Chat transcript as stored by the consultation app (`interaction.jsonl`).

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{EvalError, Result};
use crate::model::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(other)]
    Other,
}

/// One transcript entry. Annotation fields (`<aspect>_feedback_q<N>`) and any
/// other extra keys are kept verbatim in `annotations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(flatten)]
    pub annotations: BTreeMap<String, serde_json::Value>,
}

fn null_as_empty<'de, D>(d: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(d)?;
    Ok(opt.unwrap_or_default())
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            annotations: BTreeMap::new(),
        }
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations
            .insert(key.to_string(), serde_json::Value::String(value.to_string()));
        self
    }

    /// Annotation value as a label; non-string scalars are read by their JSON text.
    pub fn feedback(&self, key: &str) -> Option<Label> {
        match self.annotations.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(Label::parse(s)),
            other => Some(Label::parse(&other.to_string())),
        }
    }
}

/// Ordered turns; position is chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Parse JSONL; blank lines are skipped, line numbers in errors are 1-based.
    pub fn parse_jsonl(text: &str) -> Result<Self> {
        let mut turns = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let turn: Turn = serde_json::from_str(line).map_err(|source| EvalError::Transcript {
                line: idx + 1,
                source,
            })?;
            turns.push(turn);
        }
        Ok(Self { turns })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Self::parse_jsonl(&text)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roles_content_and_feedback() {
        let text = r#"{"role": "system", "content": "You are a helper."}
{"role": "user", "content": "Is my area at risk?"}

{"role": "assistant", "content": "Yes.", "relevance_feedback_q1": "Yes", "accessibility_feedback_q2": "Could be better"}
"#;
        let t = Transcript::parse_jsonl(text).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.turns()[1].role, Role::User);
        let assistant = t.turn(2).unwrap();
        assert_eq!(assistant.feedback("relevance_feedback_q1"), Some(Label::Yes));
        assert_eq!(
            assistant.feedback("accessibility_feedback_q2"),
            Some(Label::CouldBeBetter)
        );
        assert_eq!(assistant.feedback("relevance_feedback_q2"), None);
    }

    #[test]
    fn null_content_and_unknown_role_are_tolerated() {
        let t = Transcript::parse_jsonl(r#"{"role": "tool", "content": null}"#).unwrap();
        assert_eq!(t.turns()[0].role, Role::Other);
        assert_eq!(t.turns()[0].content, "");
    }

    #[test]
    fn reports_offending_line() {
        let err = Transcript::parse_jsonl("{\"role\": \"user\", \"content\": \"a\"}\nnot json")
            .unwrap_err();
        assert!(matches!(err, EvalError::Transcript { line: 2, .. }));
    }
}
