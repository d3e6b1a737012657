pub mod command;
pub mod docx;
pub mod lint;
pub mod ocr;
pub mod text;

use std::fmt;

use serde::Serialize;

use crate::storage::ArtifactPaths;

pub use command::{run_command, CommandOutput};
pub use docx::{DocumentExporter, DocumentWriter, DocxWriter};
pub use lint::LintStage;
pub use ocr::{OcrEngine, OcrMyPdf, OcrNormalizer, OcrOptions};
pub use text::{LopdfReader, PdfToTextReader, TextExtractor, TextLayerReader};

/// Where a document's processing stopped or warned.
///
/// The four adapter stages run in declaration order. `OutputPath` and
/// `Worker` only appear in failures raised outside the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StageKind {
    OutputPath,
    Normalizer,
    Extractor,
    Exporter,
    Classifier,
    Worker,
}

impl StageKind {
    /// A failed required stage ends the document's pipeline.
    pub fn is_required(self) -> bool {
        !matches!(self, StageKind::Exporter | StageKind::Classifier)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::OutputPath => "OutputPath",
            StageKind::Normalizer => "Normalizer",
            StageKind::Extractor => "Extractor",
            StageKind::Exporter => "Exporter",
            StageKind::Classifier => "Classifier",
            StageKind::Worker => "Worker",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage adapter. Diagnostics are for operators, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
    pub ok: bool,
    pub diagnostic: String,
}

impl StageResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            diagnostic: String::new(),
        }
    }

    pub fn success_with(diagnostic: impl Into<String>) -> Self {
        Self {
            ok: true,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        let diagnostic = diagnostic.into();
        let diagnostic = if diagnostic.trim().is_empty() {
            "stage failed without output".to_string()
        } else {
            diagnostic
        };
        Self {
            ok: false,
            diagnostic,
        }
    }
}

impl<E: std::error::Error> From<Result<(), E>> for StageResult {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => StageResult::success(),
            Err(e) => StageResult::failure(e.to_string()),
        }
    }
}

/// One step of the per-document pipeline, wrapping an external collaborator.
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;
    fn run(&self, artifacts: &ArtifactPaths) -> StageResult;
}
