//! Splits the raw tool log (`tools.txt`) into (tool output, response) blocks.

use tracing::debug;

use crate::model::ItemType;

pub const TOOL_OUTPUTS_HEADER: &str = "**Tool Outputs**";
pub const LLM_RESPONSE_HEADER: &str = "**LLM Response**";
/// Divides the tool output from the trailing instruction text in a tool body.
pub const INSTRUCTION_SEPARATOR: &str = "----------";

/// A block that passed structural checks but is not yet linked to the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedBlock {
    pub tool_outputs: String,
    pub llm_response: String,
    pub item_type: ItemType,
    /// First non-empty line of the response body.
    pub link_fragment: String,
}

/// Extract every well-formed block, in log order.
///
/// A block spans from a Tool Outputs header to the next one (or end of text);
/// its response body starts at the first LLM Response header inside it.
/// Blocks without a response header or without the separator are dropped.
pub fn pair_blocks(log: &str) -> Vec<PairedBlock> {
    let mut blocks = Vec::new();
    for (idx, chunk) in log.split(TOOL_OUTPUTS_HEADER).enumerate().skip(1) {
        let Some((tool_body, response_body)) = chunk.split_once(LLM_RESPONSE_HEADER) else {
            debug!(block = idx, "dropping block without response header");
            continue;
        };
        let Some((kept, _instructions)) = tool_body.split_once(INSTRUCTION_SEPARATOR) else {
            debug!(block = idx, "dropping block without instruction separator");
            continue;
        };

        let tool_outputs = format!("{}\n{}", TOOL_OUTPUTS_HEADER, kept.trim())
            .trim()
            .to_string();
        let response_body = response_body.trim();
        let llm_response = format!("{}\n{}", LLM_RESPONSE_HEADER, response_body)
            .trim()
            .to_string();

        let item_type = if tool_outputs.to_lowercase().contains("title:") {
            ItemType::Literature
        } else {
            ItemType::ValuesAndRecommendations
        };

        let link_fragment = response_body
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();

        blocks.push(PairedBlock {
            tool_outputs,
            llm_response,
            item_type,
            link_fragment,
        });
    }
    blocks
}
