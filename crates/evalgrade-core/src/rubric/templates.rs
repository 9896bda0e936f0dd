//! Default rubric wording. The `in_reference` and `in_values_and_recommendations`
//! entry points are kept separate so either can diverge without touching the registry.

use super::{PromptSequence, RubricContext};

const ANSWER_SET: &str = "'Yes', 'No', 'Could be better', or 'Not Applicable'";

fn list_instruction(count: usize) -> String {
    let marks: Vec<String> = (1..=count).map(|i| format!("({i})")).collect();
    format!(
        "Please answer these questions one by one with your reasoning, each answer followed by a blank line. \
         You MUST mark the answer to each question in the format {}.\n\
         Lastly, output a Python list of your {} responses, e.g. ['Yes', 'No'].",
        marks.join(", "),
        count
    )
}

pub(super) fn relevance_in_reference(ctx: &RubricContext<'_>) -> PromptSequence {
    let p = ctx.profile;
    let system = format!(
        "You are a strict QA auditor. Critically analyze how relevant the model's response is to the user. \
         For each question, answer {ANSWER_SET}. \
         If the response is vague, generic, or slightly off-topic, mark it 'Could be better' or 'No'. \
         Do not give the model the benefit of the doubt."
    );
    let user = format!(
        "Given this model's response:\n{response}\n\n\
         (1) Does the response directly answer the user's last question? The question is '{query}'.\n\
         (2) Is the response tailored to the user's profession? The profession is '{profession}'.\n\
         (3) Does the response address the user's concern? The concern is '{concern}'.\n\
         (4) Is the response accurate to the user's location? The location is '{location}'.\n\
         (5) Does the response respect the user's timeline? The timeline is '{timeline}'.\n\
         (6) Does the response stay within the user's scope? The scope is '{scope}'.\n\
         {instruction}",
        response = ctx.item.llm_response,
        query = ctx.query.as_prompt_text(),
        profession = p.get_or_unknown("profession"),
        concern = p.get_or_unknown("concern"),
        location = p.get_or_unknown("location"),
        timeline = p.get_or_unknown("timeline"),
        scope = p.get_or_unknown("scope"),
        instruction = list_instruction(6),
    );
    PromptSequence::new(system, user)
}

pub(super) fn relevance_in_values_and_recommendations(ctx: &RubricContext<'_>) -> PromptSequence {
    relevance_in_reference(ctx)
}

pub(super) fn entailment_in_reference(ctx: &RubricContext<'_>) -> PromptSequence {
    let system = format!(
        "You are a fact-checker. Verify whether the model's response is supported by the tool outputs. \
         Anything the response claims that is absent from the tool outputs is a hallucination. \
         Answer {ANSWER_SET}."
    );
    let user = format!(
        "Tool outputs (facts):\n{tools}\n\n\
         Model response:\n{response}\n\n\
         (1) Is every claim in the response entailed by the tool outputs, with no contradiction and no invented facts?\n\
         {instruction}",
        tools = ctx.item.tool_outputs,
        response = ctx.item.llm_response,
        instruction = list_instruction(1),
    );
    PromptSequence::new(system, user)
}

pub(super) fn entailment_in_values_and_recommendations(ctx: &RubricContext<'_>) -> PromptSequence {
    entailment_in_reference(ctx)
}

/// Questions (1) and (3) are phrased negatively; their answers are flipped when parsed.
pub(super) fn accessibility_in_reference(ctx: &RubricContext<'_>) -> PromptSequence {
    let system = format!(
        "You are a demanding editor. Judge whether a non-expert reader could follow the model's response. \
         For each question, answer {ANSWER_SET}."
    );
    let user = format!(
        "Given this model's response:\n{response}\n\n\
         (1) Does the response use technical jargon without explaining it?\n\
         (2) Does the response give enough explanation for the reader to act on it?\n\
         (3) Does the response contain redundant or repeated content, including filler compliments?\n\
         {instruction}",
        response = ctx.item.llm_response,
        instruction = list_instruction(3),
    );
    PromptSequence::new(system, user)
}

pub(super) fn accessibility_in_values_and_recommendations(ctx: &RubricContext<'_>) -> PromptSequence {
    accessibility_in_reference(ctx)
}

pub(super) fn correctness_in_reference(ctx: &RubricContext<'_>) -> PromptSequence {
    let system = "You are a strict grader. Compare the model's response to the tool outputs. \
                  Identify key entities (locations, numbers, dates, specific names) in the tool outputs \
                  and check whether they appear correctly in the response.";
    let user = format!(
        "Tool outputs:\n{tools}\n\n\
         Model response:\n{response}\n\n\
         Step 1: List the specific entities found in the tool outputs.\n\
         Step 2: Check whether each one is preserved correctly in the model response.",
        tools = ctx.item.tool_outputs,
        response = ctx.item.llm_response,
    );
    let follow_up = "Output the final score as a fraction: [Matches]/[Total Entities].\n\
                     Example output: 'The response correctly identifies 3 out of 4 entities. Score: 3/4'";
    PromptSequence::new(system, user).with_follow_up(follow_up)
}

pub(super) fn correctness_in_values_and_recommendations(ctx: &RubricContext<'_>) -> PromptSequence {
    correctness_in_reference(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EvaluationItem, ItemType, PreviousQuery};
    use crate::profile::UserProfile;

    #[test]
    fn relevance_embeds_profile_and_query() {
        let item = EvaluationItem {
            tool_outputs: "t".into(),
            llm_response: "**LLM Response**\nPlant fire-resistant shrubs.".into(),
            item_type: ItemType::ValuesAndRecommendations,
            previous_query: PreviousQuery::Query("What should I plant?".into()),
            current_entry: 0,
        };
        let profile = UserProfile::parse("Profession: Landscaper\nTimeline: 10 years");
        let seq = relevance_in_reference(&RubricContext {
            item: &item,
            profile: &profile,
            query: &item.previous_query,
        });
        assert!(seq.user.contains("'What should I plant?'"));
        assert!(seq.user.contains("'Landscaper'"));
        assert!(seq.user.contains("'10 years'"));
        assert!(seq.user.contains("The concern is 'Unknown'"));
        assert!(seq.user.contains("(6)"));
    }

    #[test]
    fn conversation_start_is_rendered_explicitly() {
        let item = EvaluationItem {
            tool_outputs: "t".into(),
            llm_response: "r".into(),
            item_type: ItemType::Literature,
            previous_query: PreviousQuery::ConversationStart,
            current_entry: 0,
        };
        let profile = UserProfile::default();
        let seq = relevance_in_reference(&RubricContext {
            item: &item,
            profile: &profile,
            query: &item.previous_query,
        });
        assert!(seq.user.contains("(start of conversation)"));
    }
}
