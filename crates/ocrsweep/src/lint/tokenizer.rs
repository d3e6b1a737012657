use std::sync::LazyLock;

use regex::Regex;

/// Letters and digits, with hyphens and apostrophes allowed between them.
static RE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*").unwrap());

const MIN_TOKEN_CHARS: usize = 2;

/// Candidate tokens in order of appearance.
/// Single characters and purely numeric tokens are dropped.
pub fn tokenize(text: &str) -> Vec<&str> {
    RE_TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !token.chars().all(|c| c.is_numeric()))
        .collect()
}
