use serde::Serialize;
use std::collections::BTreeMap;

/// User profile derived from `Key: Value` lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserProfile {
    fields: BTreeMap<String, String>,
}

impl UserProfile {
    /// Keys are lower-cased with markdown emphasis and list markers stripped.
    /// Lines without a colon are ignored; a repeated key keeps its last value.
    pub fn parse(text: &str) -> Self {
        let mut fields = BTreeMap::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key
                .trim()
                .trim_matches(|c| c == '*' || c == '-' || c == ' ')
                .replace("**", "")
                .to_lowercase();
            let value = value.replace("**", "").trim().to_string();
            fields.insert(key, value);
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn get_or_unknown(&self, key: &str) -> &str {
        self.get(key).unwrap_or("Unknown")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
