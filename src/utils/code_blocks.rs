//! Code extraction utilities for LLM replies.
//!
//! Models frequently wrap generated sources in markdown fences even when told
//! not to. These helpers pull the payload out so it can be written to disk or
//! uploaded verbatim.
//!
//! # Example
//!
//! ```
//! use problem_forge::utils::code_blocks::{extract_code_block, strip_code_fence};
//!
//! let reply = "Here you go:\n```cpp\nint main() {}\n```\nGood luck!";
//! assert_eq!(extract_code_block(reply), "int main() {}");
//!
//! assert_eq!(strip_code_fence("```latex\n\\section{A}\n```", "latex"), "\\section{A}");
//! ```

use regex::Regex;
use std::sync::OnceLock;

fn any_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:\w+)?\n(.*?)```").expect("valid code block regex"))
}

fn python_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(python3?|py)?\n?(.*?)```").expect("valid python block regex")
    })
}

/// Returns the trimmed body of the first fenced block with any language tag,
/// or the whole reply when there is no fenced block.
pub fn extract_code_block(content: &str) -> String {
    match any_block_re().captures(content).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim().to_string(),
        None => content.to_string(),
    }
}

/// Like [`extract_code_block`] but only accepts `python`, `python3`, `py` or
/// untagged fences.
pub fn extract_python_block(content: &str) -> String {
    match python_block_re().captures(content).and_then(|c| c.get(2)) {
        Some(body) => body.as_str().trim().to_string(),
        None => content.to_string(),
    }
}

/// Removes a leading ```` ```lang ```` (or bare ```` ``` ````) and a trailing
/// ```` ``` ```` from a reply that is expected to be entirely code.
pub fn strip_code_fence(content: &str, lang: &str) -> String {
    let mut body = content.trim();
    let tagged = format!("```{}", lang);

    if !lang.is_empty() && body.starts_with(&tagged) {
        body = &body[tagged.len()..];
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    body.trim().to_string()
}
