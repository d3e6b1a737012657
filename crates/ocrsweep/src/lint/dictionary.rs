use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use strsim::damerau_levenshtein;

use crate::error::StartupError;

const EMBEDDED_WORDS: &str = include_str!("../../data/words.txt");

/// Largest edit distance still offered as a suggestion.
const MAX_EDIT_DISTANCE: usize = 2;

/// Spelling backend used by the lint stage. Implementations are read-only.
pub trait SpellBackend: Send + Sync {
    /// The candidates found neither in the backend's word list nor in `custom`.
    fn unknown(&self, candidates: &BTreeSet<String>, custom: &CustomWords) -> BTreeSet<String>;

    /// Up to `limit` corrections for `word`, best first.
    fn suggestions(&self, word: &str, custom: &CustomWords, limit: usize) -> Vec<String>;
}

/// Caller-supplied domain terms and proper nouns. Loaded once, shared read-only.
#[derive(Debug, Clone, Default)]
pub struct CustomWords {
    words: BTreeSet<String>,
}

impl CustomWords {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// One word per line; blank lines and `#` comments are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StartupError::Dictionary {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_words(word_lines(&content)))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// General-language dictionary. Word position doubles as a frequency rank.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    ranks: HashMap<String, usize>,
}

impl Dictionary {
    /// The embedded English word list.
    pub fn builtin() -> Self {
        Self::from_words(word_lines(EMBEDDED_WORDS))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::default();
        dictionary.extend(words);
        dictionary
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            let next_rank = self.ranks.len();
            self.ranks.entry(word).or_insert(next_rank);
        }
    }

    /// Merges a word list file (e.g. `/usr/share/dict/words`) after the existing words.
    pub fn extend_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, StartupError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StartupError::Dictionary {
            path: path.to_path_buf(),
            source: e,
        })?;
        let before = self.ranks.len();
        self.extend(word_lines(&content));
        Ok(self.ranks.len() - before)
    }

    /// Case-insensitive. Possessives of known words and hyphenated compounds
    /// whose parts are all known (or single characters or numbers) count as known.
    pub fn contains(&self, word: &str) -> bool {
        self.knows(&word.to_lowercase().replace('’', "'"))
    }

    fn knows(&self, word: &str) -> bool {
        if self.ranks.contains_key(word) {
            return true;
        }
        let stem = word
            .strip_suffix("'s")
            .or_else(|| word.strip_suffix("s'").map(|_| &word[..word.len() - 1]));
        if let Some(stem) = stem {
            return self.knows(stem);
        }
        word.contains('-')
            && word.split('-').all(|part| {
                part.chars().count() == 1
                    || (!part.is_empty() && part.chars().all(char::is_numeric))
                    || self.knows(part)
            })
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl SpellBackend for Dictionary {
    fn unknown(&self, candidates: &BTreeSet<String>, custom: &CustomWords) -> BTreeSet<String> {
        candidates
            .iter()
            .filter(|c| !self.contains(c) && !custom.contains(c))
            .cloned()
            .collect()
    }

    fn suggestions(&self, word: &str, custom: &CustomWords, limit: usize) -> Vec<String> {
        let target = word.to_lowercase();
        let target_len = target.chars().count();

        // Custom words rank after every dictionary word.
        let custom_base = self.ranks.len();
        let pool = self
            .ranks
            .iter()
            .map(|(w, rank)| (w.as_str(), *rank))
            .chain(custom.iter().enumerate().map(|(i, w)| (w, custom_base + i)));

        let mut scored: Vec<(usize, usize, &str)> = pool
            .filter(|(candidate, _)| candidate.chars().count().abs_diff(target_len) <= MAX_EDIT_DISTANCE)
            .filter_map(|(candidate, rank)| {
                let distance = damerau_levenshtein(&target, candidate);
                (distance > 0 && distance <= MAX_EDIT_DISTANCE).then_some((distance, rank, candidate))
            })
            .collect();

        scored.sort();

        let mut suggestions: Vec<String> = Vec::with_capacity(limit);
        for (_, _, candidate) in scored {
            if suggestions.len() == limit {
                break;
            }
            if !suggestions.iter().any(|s| s == candidate) {
                suggestions.push(candidate.to_string());
            }
        }
        suggestions
    }
}

fn word_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_builtin_has_common_words() {
        let dictionary = Dictionary::builtin();
        assert!(dictionary.len() > 30_000);
        assert!(dictionary.contains("the"));
        assert!(dictionary.contains("The"));
        assert!(dictionary.contains("receive"));
        assert!(!dictionary.contains("recieve"));
        assert!(!dictionary.contains("# General-language word list, most frequent first."));
    }

    #[test]
    fn test_builtin_has_inflected_forms() {
        let dictionary = Dictionary::builtin();
        for word in [
            "increase", "increases", "decreases", "atoms", "molecules", "measured", "students",
            "calculate", "calculated", "carefully", "shows",
        ] {
            assert!(dictionary.contains(word), "{word} should be known");
        }
    }

    #[test]
    fn test_possessives_of_known_words() {
        let dictionary = Dictionary::from_words(["student", "students", "it"]);
        assert!(dictionary.contains("student's"));
        assert!(dictionary.contains("Student’s"));
        assert!(dictionary.contains("students'"));
        assert!(dictionary.contains("it's"));
        assert!(!dictionary.contains("stuent's"));
        assert!(!dictionary.contains("'s"));
    }

    #[test]
    fn test_hyphenated_compounds() {
        let dictionary = Dictionary::from_words(["well", "known", "sided", "shaped"]);
        assert!(dictionary.contains("well-known"));
        assert!(dictionary.contains("U-shaped"));
        assert!(dictionary.contains("6-sided"));
        assert!(!dictionary.contains("well-knwon"));
        assert!(!dictionary.contains("well-"));
    }

    #[test]
    fn test_unknown_respects_custom_words() {
        let dictionary = Dictionary::from_words(["water", "salt"]);
        let custom = CustomWords::from_words(["Avogadro"]);

        let unknown = dictionary.unknown(&set(&["water", "avogadro", "titrant"]), &custom);
        assert_eq!(unknown, set(&["titrant"]));
    }

    #[test]
    fn test_suggestions_ranked_by_distance_then_frequency() {
        let dictionary = Dictionary::from_words(["receive", "relieve", "recipe", "deceive"]);
        let custom = CustomWords::default();

        let suggestions = dictionary.suggestions("recieve", &custom, 5);
        assert_eq!(suggestions[0], "receive");
        assert!(suggestions.contains(&"relieve".to_string()));
        assert!(!suggestions.contains(&"recieve".to_string()));
    }

    #[test]
    fn test_suggestions_limit() {
        let dictionary = Dictionary::from_words(["cat", "bat", "hat", "mat", "rat", "sat", "vat"]);
        let suggestions = dictionary.suggestions("zat", &CustomWords::default(), 5);
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions, vec!["cat", "bat", "hat", "mat", "rat"]);
    }

    #[test]
    fn test_suggestions_include_custom_words() {
        let dictionary = Dictionary::from_words(["water"]);
        let custom = CustomWords::from_words(["titration"]);

        let suggestions = dictionary.suggestions("titraton", &custom, 5);
        assert_eq!(suggestions, vec!["titration"]);
    }

    #[test]
    fn test_no_suggestions_for_distant_words() {
        let dictionary = Dictionary::from_words(["water"]);
        assert!(dictionary
            .suggestions("zzxqv", &CustomWords::default(), 5)
            .is_empty());
    }

    #[test]
    fn test_load_custom_words_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# chemistry terms").unwrap();
        writeln!(file, "Stoichiometry").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  titrant  ").unwrap();

        let custom = CustomWords::load(file.path()).unwrap();
        assert_eq!(custom.len(), 2);
        assert!(custom.contains("stoichiometry"));
        assert!(custom.contains("TITRANT"));
    }

    #[test]
    fn test_load_missing_custom_words_file() {
        let result = CustomWords::load("/nonexistent/custom_words.txt");
        assert!(matches!(result, Err(StartupError::Dictionary { .. })));
    }

    #[test]
    fn test_extend_from_file_keeps_existing_ranks() {
        let mut dictionary = Dictionary::from_words(["alpha"]);
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nbeta\ngamma").unwrap();

        let added = dictionary.extend_from_file(file.path()).unwrap();
        assert_eq!(added, 2);
        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.ranks["alpha"], 0);
    }
}
