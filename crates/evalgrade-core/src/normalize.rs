/// Whitespace-free comparison key for `text`.
///
/// Only used to compare text that may have been re-wrapped between logging and
/// storage; callers keep the original text as the stored value.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
