use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::OcrsweepError;
use crate::pipeline::PipelineOutcome;
use crate::worker::job::Document;

/// Terminal outcome of one document, plus where its artifacts went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub document: Document,
    /// `None` when the output directory could not be resolved.
    pub output_dir: Option<PathBuf>,
    pub outcome: PipelineOutcome,
}

impl DocumentReport {
    pub fn new(document: Document, output_dir: Option<PathBuf>, outcome: PipelineOutcome) -> Self {
        Self {
            document,
            output_dir,
            outcome,
        }
    }

    pub fn display_name(&self) -> String {
        self.document.relative.display().to_string()
    }
}

/// Aggregate result of one run. Documents are listed in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub output_root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn new(
        documents: Vec<DocumentReport>,
        output_root: PathBuf,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let succeeded = documents.iter().filter(|d| d.outcome.is_success()).count();
        let failed = documents.len() - succeeded;
        Self {
            succeeded,
            failed,
            output_root,
            started_at,
            finished_at,
            documents,
        }
    }

    pub fn total(&self) -> usize {
        self.documents.len()
    }

    /// Documents that ended in a hard failure.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| !d.outcome.is_success())
    }

    /// Documents that succeeded but recorded at least one warning.
    pub fn warned(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents
            .iter()
            .filter(|d| !d.outcome.warnings().is_empty())
    }

    pub fn write_json(&self, path: &Path) -> Result<(), OcrsweepError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| OcrsweepError::Report {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        std::fs::write(path, json).map_err(|e| OcrsweepError::Report {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
