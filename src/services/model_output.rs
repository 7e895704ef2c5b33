use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json|JSON)?").expect("fence pattern is valid"))
}

/// Removes markdown code fences the model adds despite being told not to.
pub fn strip_fences(text: &str) -> String {
    fence_pattern().replace_all(text, "").trim().to_string()
}

/// Fence-strips and parses a model reply. No schema validation beyond serde.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(&strip_fences(text))
}

/// True when the model answered with a bare `null`.
pub fn is_null_reply(text: &str) -> bool {
    strip_fences(text) == "null"
}
