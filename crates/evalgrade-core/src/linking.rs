//! Ties a response back to the transcript turn that produced it.
//!
//! Matching is a substring test on whitespace-free text, not an index lookup:
//! the app may re-wrap or re-format a response between logging and storage,
//! which changes line breaks but not the characters.

use tracing::debug;

use crate::model::{EvaluationItem, PreviousQuery};
use crate::normalize::normalize;
use crate::pairing::PairedBlock;
use crate::transcript::{Role, Transcript};

/// Fragments shorter than this (after normalization) match too much to be trusted.
pub const MIN_FRAGMENT_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub previous_query: PreviousQuery,
    pub current_entry: usize,
}

/// Earliest assistant turn containing `fragment`, with the last user turn before it.
pub fn find_link(transcript: &Transcript, fragment: &str) -> Option<Link> {
    let needle = normalize(fragment);
    if needle.chars().count() < MIN_FRAGMENT_LEN {
        return None;
    }

    let mut last_user: Option<&str> = None;
    for (idx, turn) in transcript.turns().iter().enumerate() {
        match turn.role {
            Role::User => last_user = Some(turn.content.as_str()),
            Role::Assistant if normalize(&turn.content).contains(&needle) => {
                let previous_query = match last_user {
                    Some(q) => PreviousQuery::Query(q.to_string()),
                    None => PreviousQuery::ConversationStart,
                };
                return Some(Link {
                    previous_query,
                    current_entry: idx,
                });
            }
            _ => {}
        }
    }
    None
}

/// Link every block; blocks without a match are dropped.
pub fn link_blocks(blocks: Vec<PairedBlock>, transcript: &Transcript) -> Vec<EvaluationItem> {
    blocks
        .into_iter()
        .filter_map(|block| {
            let Some(link) = find_link(transcript, &block.link_fragment) else {
                debug!(fragment = %block.link_fragment, "dropping block with no matching assistant turn");
                return None;
            };
            Some(EvaluationItem {
                tool_outputs: block.tool_outputs,
                llm_response: block.llm_response,
                item_type: block.item_type,
                previous_query: link.previous_query,
                current_entry: link.current_entry,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemType;
    use crate::transcript::Turn;

    fn transcript() -> Transcript {
        Transcript::new(vec![
            Turn::new(Role::System, "Be helpful."),
            Turn::new(Role::Assistant, "Welcome! Tell me about your project."),
            Turn::new(Role::User, "What is the fire risk in Boulder?"),
            Turn::new(
                Role::Assistant,
                "The fire weather index in Boulder\nis projected to rise by mid-century.",
            ),
            Turn::new(Role::User, "And smoke?"),
            Turn::new(Role::Assistant, "The fire weather index is high. Smoke too."),
        ])
    }

    #[test]
    fn links_across_line_wrapping() {
        let link = find_link(
            &transcript(),
            "The fire weather index in Boulder is projected to rise",
        )
        .unwrap();
        assert_eq!(link.current_entry, 3);
        assert_eq!(
            link.previous_query,
            PreviousQuery::Query("What is the fire risk in Boulder?".to_string())
        );
    }

    #[test]
    fn first_match_wins() {
        let link = find_link(&transcript(), "The fire weather index").unwrap();
        assert_eq!(link.current_entry, 3);
    }

    #[test]
    fn assistant_before_any_user_is_conversation_start() {
        let link = find_link(&transcript(), "Welcome! Tell me").unwrap();
        assert!(link.previous_query.is_conversation_start());
        assert_eq!(link.current_entry, 1);
    }

    #[test]
    fn short_fragment_is_rejected() {
        assert!(find_link(&transcript(), "T h e").is_none());
        assert!(find_link(&transcript(), "").is_none());
    }

    #[test]
    fn user_turns_never_match() {
        assert!(find_link(&transcript(), "What is the fire risk").is_none());
    }

    #[test]
    fn unmatched_blocks_are_dropped() {
        let blocks = vec![
            PairedBlock {
                tool_outputs: "t".into(),
                llm_response: "r".into(),
                item_type: ItemType::Literature,
                link_fragment: "Smoke too.".into(),
            },
            PairedBlock {
                tool_outputs: "t".into(),
                llm_response: "r".into(),
                item_type: ItemType::Literature,
                link_fragment: "Nothing like this exists".into(),
            },
        ];
        let items = link_blocks(blocks, &transcript());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].current_entry, 5);
    }
}
