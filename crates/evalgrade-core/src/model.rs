use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// One grading dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Relevance,
    Entailment,
    Accessibility,
    Correctness,
}

impl Aspect {
    pub const ALL: [Aspect; 4] = [
        Aspect::Relevance,
        Aspect::Entailment,
        Aspect::Accessibility,
        Aspect::Correctness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Aspect::Relevance => "relevance",
            Aspect::Entailment => "entailment",
            Aspect::Accessibility => "accessibility",
            Aspect::Correctness => "correctness",
        }
    }

    /// Aspects graded with a categorical list and compared to human labels.
    pub fn is_categorical(self) -> bool {
        !matches!(self, Aspect::Correctness)
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(Aspect::Relevance),
            "entailment" => Ok(Aspect::Entailment),
            "accessibility" => Ok(Aspect::Accessibility),
            "correctness" => Ok(Aspect::Correctness),
            other => Err(ConfigError::UnknownAspect {
                name: other.to_string(),
            }),
        }
    }
}

/// Kind of tool output behind a response; selects the rubric variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Literature,
    ValuesAndRecommendations,
    General,
}

impl ItemType {
    pub const ALL: [ItemType; 3] = [
        ItemType::Literature,
        ItemType::ValuesAndRecommendations,
        ItemType::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Literature => "literature",
            ItemType::ValuesAndRecommendations => "values_and_recommendations",
            ItemType::General => "general",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorical grading value, as written by annotators or recovered from a judge.
///
/// Judge output is free text, so anything outside the known vocabulary is kept
/// verbatim in [`Label::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Yes,
    No,
    CouldBeBetter,
    NotApplicable,
    /// Model side missing (padding or judge failure).
    Error,
    /// Judge replied but no verdict list could be recovered.
    ErrorParsing,
    /// Human side missing.
    Missing,
    Other(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Yes => "Yes",
            Label::No => "No",
            Label::CouldBeBetter => "Could be better",
            Label::NotApplicable => "Not Applicable",
            Label::Error => "Error",
            Label::ErrorParsing => "Error Parsing",
            Label::Missing => "N/A",
            Label::Other(s) => s,
        }
    }

    /// Lenient parse: case, surrounding quotes and a trailing period are ignored.
    pub fn parse(raw: &str) -> Label {
        let cleaned = raw
            .trim()
            .trim_matches(|c| c == '\'' || c == '"' || c == '`')
            .trim()
            .trim_end_matches('.')
            .trim();
        match cleaned.to_ascii_lowercase().as_str() {
            "yes" => Label::Yes,
            "no" => Label::No,
            "could be better" => Label::CouldBeBetter,
            "not applicable" => Label::NotApplicable,
            "error" => Label::Error,
            "error parsing" => Label::ErrorParsing,
            "n/a" | "" => Label::Missing,
            _ => Label::Other(cleaned.to_string()),
        }
    }

    /// True for the four answers a rubric question admits.
    pub fn is_answer(&self) -> bool {
        matches!(
            self,
            Label::Yes | Label::No | Label::CouldBeBetter | Label::NotApplicable
        )
    }

    /// Yes and No swap; every other value is returned unchanged.
    pub fn flipped(&self) -> Label {
        match self {
            Label::Yes => Label::No,
            Label::No => Label::Yes,
            other => other.clone(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Label::parse(s))
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Label::parse(&raw))
    }
}

/// The user query that triggered a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousQuery {
    Query(String),
    /// The response was produced before any user turn.
    ConversationStart,
}

impl PreviousQuery {
    pub fn as_prompt_text(&self) -> &str {
        match self {
            PreviousQuery::Query(q) => q,
            PreviousQuery::ConversationStart => "(start of conversation)",
        }
    }

    pub fn is_conversation_start(&self) -> bool {
        matches!(self, PreviousQuery::ConversationStart)
    }
}

/// One gradeable (tool output, response) pair linked to its transcript turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub tool_outputs: String,
    pub llm_response: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub previous_query: PreviousQuery,
    /// Index of the annotated assistant turn in the case transcript.
    pub current_entry: usize,
}
