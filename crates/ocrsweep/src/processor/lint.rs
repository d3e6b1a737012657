use std::path::Path;

use tracing::info_span;

use crate::error::ProcessError;
use crate::lint::{LintReport, TokenClassifier};
use crate::processor::{Stage, StageKind, StageResult};
use crate::storage::{write_replacing, ArtifactPaths};

/// Optional stage: `<stem>.txt` to `<stem>_issues.txt`.
///
/// Succeeds regardless of how many unknown tokens turn up; only I/O fails it.
pub struct LintStage {
    classifier: TokenClassifier,
}

impl LintStage {
    pub fn new(classifier: TokenClassifier) -> Self {
        Self { classifier }
    }

    fn lint(&self, artifacts: &ArtifactPaths) -> Result<LintReport, ProcessError> {
        let text = read_lossy(&artifacts.text)?;
        let report = self.classifier.classify(&text);
        write_replacing(&artifacts.issues, report.render().as_bytes()).map_err(|e| {
            ProcessError::WriteArtifact {
                path: artifacts.issues.clone(),
                source: e,
            }
        })?;
        Ok(report)
    }
}

fn read_lossy(path: &Path) -> Result<String, ProcessError> {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })
}

impl Stage for LintStage {
    fn kind(&self) -> StageKind {
        StageKind::Classifier
    }

    fn run(&self, artifacts: &ArtifactPaths) -> StageResult {
        let _span = info_span!("processor.lint").entered();
        match self.lint(artifacts) {
            Ok(report) => StageResult::success_with(format!(
                "{} unknown token(s), {} chemical-like",
                report.unknown_count(),
                report.chemical_like_count()
            )),
            Err(e) => StageResult::failure(e.to_string()),
        }
    }
}
