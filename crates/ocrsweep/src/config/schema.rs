use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input_directory: String,
    #[serde(default)]
    pub output_directory: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// File extensions treated as source documents, compared case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Upper bound on any single external tool invocation.
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub lint: LintConfig,
    #[serde(default)]
    pub stages: StagesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_directory: String::new(),
            output_directory: String::new(),
            workers: default_workers(),
            extensions: default_extensions(),
            stage_timeout_secs: default_stage_timeout_secs(),
            ocr: OcrConfig::default(),
            extraction: ExtractionConfig::default(),
            lint: LintConfig::default(),
            stages: StagesConfig::default(),
        }
    }
}

// External OCR runs are CPU-heavy, so a couple of workers saturate most machines.
fn default_workers() -> usize {
    2
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

fn default_stage_timeout_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_program")]
    pub program: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Appended verbatim after the fixed option set.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ocr_program() -> String {
    "ocrmypdf".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

fn default_dpi() -> u32 {
    400
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: default_ocr_program(),
            languages: default_languages(),
            dpi: default_dpi(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionBackend {
    #[default]
    Lopdf,
    Pdftotext,
}

impl ExtractionBackend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "lopdf" => Some(Self::Lopdf),
            "pdftotext" => Some(Self::Pdftotext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub backend: ExtractionBackend,
    /// Passes `-layout` to pdftotext. Ignored by the lopdf backend.
    #[serde(default = "default_true")]
    pub layout: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            backend: ExtractionBackend::default(),
            layout: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Domain terms and proper nouns, one per line.
    #[serde(default)]
    pub custom_dictionary: Option<String>,
    /// Additional general-language word list merged into the embedded one.
    #[serde(default)]
    pub wordlist: Option<String>,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            custom_dictionary: None,
            wordlist: None,
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Toggles for the optional stages. Required stages always run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagesConfig {
    #[serde(default = "default_true")]
    pub export: bool,
    #[serde(default = "default_true")]
    pub lint: bool,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            export: true,
            lint: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.workers, 2);
        assert_eq!(config.extensions, vec!["pdf"]);
        assert_eq!(config.ocr.dpi, 400);
        assert_eq!(config.ocr.languages, vec!["eng"]);
        assert_eq!(config.extraction.backend, ExtractionBackend::Lopdf);
        assert_eq!(config.lint.max_suggestions, 5);
        assert!(config.stages.export);
        assert!(config.stages.lint);
    }

    #[test]
    fn test_backend_from_name() {
        assert_eq!(
            ExtractionBackend::from_name("PdfToText"),
            Some(ExtractionBackend::Pdftotext)
        );
        assert_eq!(
            ExtractionBackend::from_name("lopdf"),
            Some(ExtractionBackend::Lopdf)
        );
        assert_eq!(ExtractionBackend::from_name("mupdf"), None);
    }
}
