//! Intent extraction: free text to a registry key plus optional argument.
//!
//! This is bounded-vocabulary matching over the registry's phrase table,
//! not general parsing. Phrases are matched longest-first as contiguous
//! token windows, so "uninstall git" can never be swallowed by
//! "install git", and "check github connection" beats the bare "github"
//! website entry.

use crate::registry::Registry;

/// A recognized command: the registry lookup key and any trailing
/// argument ("open youtube for lofi beats" → `youtube` + `lofi beats`).
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub key: String,
    pub argument: Option<String>,
}

/// Lowercase and collapse whitespace.
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a normalized-or-raw utterance against the registry vocabulary.
pub fn parse(input: &str, registry: &Registry) -> Option<Intent> {
    let normalized = normalize(input);
    if normalized.is_empty() {
        return None;
    }
    let tokens: Vec<&str> = normalized.split(' ').collect();

    let mut phrases: Vec<&str> = registry.phrases().collect();
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    for phrase in phrases {
        let phrase_tokens: Vec<&str> = phrase.split(' ').collect();
        if let Some(start) = find_window(&tokens, &phrase_tokens) {
            let mut rest = &tokens[start + phrase_tokens.len()..];
            if rest.first() == Some(&"for") {
                rest = &rest[1..];
            }
            let argument = if rest.is_empty() {
                None
            } else {
                Some(rest.join(" "))
            };
            return Some(Intent {
                key: phrase.to_string(),
                argument,
            });
        }
    }
    None
}

/// First index where `phrase` occurs in `tokens` as a contiguous window.
fn find_window(tokens: &[&str], phrase: &[&str]) -> Option<usize> {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return None;
    }
    (0..=tokens.len() - phrase.len()).find(|&i| &tokens[i..i + phrase.len()] == phrase)
}
