//! Aspect rubrics and the registry that selects one per (aspect, item type).

mod templates;

use std::collections::HashMap;

use crate::errors::ConfigError;
use crate::model::{Aspect, EvaluationItem, ItemType, PreviousQuery};
use crate::profile::UserProfile;

/// Prompt blocks for one grading conversation: system, first user turn and
/// an optional second user turn sent after the judge's first reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSequence {
    pub system: String,
    pub user: String,
    pub follow_up: Option<String>,
}

impl PromptSequence {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            follow_up: None,
        }
    }

    pub fn with_follow_up(mut self, follow_up: impl Into<String>) -> Self {
        self.follow_up = Some(follow_up.into());
        self
    }

    /// 2 or 3.
    pub fn block_count(&self) -> usize {
        2 + usize::from(self.follow_up.is_some())
    }

    pub fn blocks(&self) -> Vec<&str> {
        let mut out = vec![self.system.as_str(), self.user.as_str()];
        if let Some(f) = &self.follow_up {
            out.push(f);
        }
        out
    }
}

/// Everything a rubric may embed in its prompts.
#[derive(Debug, Clone, Copy)]
pub struct RubricContext<'a> {
    pub item: &'a EvaluationItem,
    pub profile: &'a UserProfile,
    pub query: &'a PreviousQuery,
}

pub type RubricFn = fn(&RubricContext<'_>) -> PromptSequence;

/// Explicit (aspect, item type) → rubric builder table.
#[derive(Clone, Default)]
pub struct RubricRegistry {
    entries: HashMap<(Aspect, ItemType), RubricFn>,
}

impl std::fmt::Debug for RubricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .map(|(a, t)| format!("{a}/{t}"))
            .collect();
        keys.sort();
        f.debug_struct("RubricRegistry").field("entries", &keys).finish()
    }
}

impl RubricRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in rubrics. `general` items share the values-and-recommendations variant.
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        let table: [(Aspect, RubricFn, RubricFn); 4] = [
            (
                Aspect::Relevance,
                templates::relevance_in_reference,
                templates::relevance_in_values_and_recommendations,
            ),
            (
                Aspect::Entailment,
                templates::entailment_in_reference,
                templates::entailment_in_values_and_recommendations,
            ),
            (
                Aspect::Accessibility,
                templates::accessibility_in_reference,
                templates::accessibility_in_values_and_recommendations,
            ),
            (
                Aspect::Correctness,
                templates::correctness_in_reference,
                templates::correctness_in_values_and_recommendations,
            ),
        ];
        for (aspect, in_reference, in_values) in table {
            reg.register(aspect, ItemType::Literature, in_reference);
            reg.register(aspect, ItemType::ValuesAndRecommendations, in_values);
            reg.register(aspect, ItemType::General, in_values);
        }
        reg
    }

    pub fn register(&mut self, aspect: Aspect, item_type: ItemType, rubric: RubricFn) {
        self.entries.insert((aspect, item_type), rubric);
    }

    pub fn resolve(&self, aspect: Aspect, item_type: ItemType) -> Result<RubricFn, ConfigError> {
        self.entries
            .get(&(aspect, item_type))
            .copied()
            .ok_or_else(|| ConfigError::MissingRubric {
                aspect: aspect.to_string(),
                item_type: item_type.to_string(),
            })
    }

    /// Every listed aspect must have a rubric for every item type.
    pub fn validate(&self, aspects: &[Aspect]) -> Result<(), ConfigError> {
        for &aspect in aspects {
            for item_type in ItemType::ALL {
                self.resolve(aspect, item_type)?;
            }
        }
        Ok(())
    }

    pub fn build(&self, aspect: Aspect, ctx: &RubricContext<'_>) -> Result<PromptSequence, ConfigError> {
        let rubric = self.resolve(aspect, ctx.item.item_type)?;
        Ok(rubric(ctx))
    }
}
