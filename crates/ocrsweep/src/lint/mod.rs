//! Spell-check triage for extracted text.
//!
//! Tokens absent from both the general word list and the caller's custom
//! words are reported for review. Tokens mixing digits and letters are
//! assumed to be notation (formulas, identifiers) rather than misspellings.

pub mod classifier;
pub mod dictionary;
pub mod tokenizer;

pub use classifier::{classify, classify_token, LintEntry, LintReport, TokenClass, TokenClassifier};
pub use dictionary::{CustomWords, Dictionary, SpellBackend};
pub use tokenizer::tokenize;
