use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use crate::lint::dictionary::{CustomWords, SpellBackend};
use crate::lint::tokenizer::tokenize;

pub const REPORT_HEADER: &str = "Suspicious words and suggestions (automated):";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenClass {
    Known,
    ChemicalLike,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintEntry {
    pub token: String,
    pub class: TokenClass,
    pub suggestions: Vec<String>,
}

/// Every unknown token once, sorted alphabetically (case-insensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub entries: Vec<LintEntry>,
    /// Distinct candidate tokens checked, known ones included.
    pub distinct_tokens: usize,
}

impl LintReport {
    pub fn unknown_count(&self) -> usize {
        self.entries.len()
    }

    pub fn chemical_like_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.class == TokenClass::ChemicalLike)
            .count()
    }

    pub fn entry(&self, token: &str) -> Option<&LintEntry> {
        let key = token.to_lowercase();
        self.entries.iter().find(|e| e.token.to_lowercase() == key)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(REPORT_HEADER);
        out.push_str("\n\n");
        for entry in &self.entries {
            match entry.class {
                TokenClass::ChemicalLike => {
                    let _ = writeln!(out, "{}  (chemical-like token - review manually)", entry.token);
                }
                _ if entry.suggestions.is_empty() => {
                    let _ = writeln!(out, "{} -> no suggestions", entry.token);
                }
                _ => {
                    let _ = writeln!(
                        out,
                        "{} -> suggestions: {}",
                        entry.token,
                        entry.suggestions.join(", ")
                    );
                }
            }
        }
        out
    }
}

/// A token mixing digits and letters, e.g. `H2O` or `CH3COOH`.
pub fn looks_chemical(token: &str) -> bool {
    token.chars().any(|c| c.is_numeric()) && token.chars().any(|c| c.is_alphabetic())
}

pub fn classify_token(token: &str, custom: &CustomWords, backend: &dyn SpellBackend) -> TokenClass {
    let candidate: BTreeSet<String> = std::iter::once(token.to_lowercase()).collect();
    if backend.unknown(&candidate, custom).is_empty() {
        TokenClass::Known
    } else if looks_chemical(token) {
        TokenClass::ChemicalLike
    } else {
        TokenClass::Unknown
    }
}

/// Tokenizes `text` and lists the tokens a reviewer should look at.
pub fn classify(
    text: &str,
    custom: &CustomWords,
    backend: &dyn SpellBackend,
    max_suggestions: usize,
) -> LintReport {
    // Lowercase key -> first spelling seen in the text.
    let mut surface: BTreeMap<String, &str> = BTreeMap::new();
    for token in tokenize(text) {
        surface.entry(token.to_lowercase()).or_insert(token);
    }

    let candidates: BTreeSet<String> = surface.keys().cloned().collect();
    let unknown = backend.unknown(&candidates, custom);

    let entries = unknown
        .iter()
        .filter_map(|key| surface.get(key).map(|token| (key, *token)))
        .map(|(key, token)| {
            if looks_chemical(token) {
                LintEntry {
                    token: token.to_string(),
                    class: TokenClass::ChemicalLike,
                    suggestions: Vec::new(),
                }
            } else {
                LintEntry {
                    token: token.to_string(),
                    class: TokenClass::Unknown,
                    suggestions: backend.suggestions(key, custom, max_suggestions),
                }
            }
        })
        .collect();

    LintReport {
        entries,
        distinct_tokens: candidates.len(),
    }
}

/// Classifier bound to a backend and custom word list, shared across workers.
#[derive(Clone)]
pub struct TokenClassifier {
    backend: Arc<dyn SpellBackend>,
    custom: Arc<CustomWords>,
    max_suggestions: usize,
}

impl TokenClassifier {
    pub fn new(backend: Arc<dyn SpellBackend>, custom: Arc<CustomWords>, max_suggestions: usize) -> Self {
        Self {
            backend,
            custom,
            max_suggestions,
        }
    }

    pub fn classify(&self, text: &str) -> LintReport {
        classify(text, &self.custom, self.backend.as_ref(), self.max_suggestions)
    }

    pub fn classify_token(&self, token: &str) -> TokenClass {
        classify_token(token, &self.custom, self.backend.as_ref())
    }
}
