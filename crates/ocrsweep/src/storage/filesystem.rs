use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::OutputPathError;
use crate::processor::StageKind;
use crate::worker::job::Document;

pub const SEARCHABLE_SUFFIX: &str = "_searchable.pdf";
pub const TEXT_SUFFIX: &str = ".txt";
pub const DOCX_SUFFIX: &str = ".docx";
pub const ISSUES_SUFFIX: &str = "_issues.txt";

/// Mirrors the input tree under an output root.
#[derive(Debug, Clone)]
pub struct OutputMapper {
    output_directory: PathBuf,
}

impl OutputMapper {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Output directory for `document`, created if absent.
    ///
    /// Safe to call from several workers for documents sharing a parent:
    /// `create_dir_all` treats a directory that appeared concurrently as success.
    pub fn resolve(&self, document: &Document) -> Result<PathBuf, OutputPathError> {
        let dir = self.output_directory.join(document.relative_parent());
        std::fs::create_dir_all(&dir).map_err(|e| OutputPathError::CreateDirectory {
            path: dir.clone(),
            source: e,
        })?;
        Ok(dir)
    }
}

/// Deterministic artifact locations for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub source: PathBuf,
    pub searchable: PathBuf,
    pub text: PathBuf,
    pub docx: PathBuf,
    pub issues: PathBuf,
}

impl ArtifactPaths {
    pub fn new(source: &Path, output_dir: &Path, stem: &str) -> Self {
        let named = |suffix: &str| output_dir.join(format!("{}{}", stem, suffix));
        Self {
            source: source.to_path_buf(),
            searchable: named(SEARCHABLE_SUFFIX),
            text: named(TEXT_SUFFIX),
            docx: named(DOCX_SUFFIX),
            issues: named(ISSUES_SUFFIX),
        }
    }

    pub fn for_document(document: &Document, output_dir: &Path) -> Self {
        Self::new(&document.path, output_dir, &document.stem())
    }

    /// The artifact `stage` writes, if it writes one.
    pub fn target(&self, stage: StageKind) -> Option<&Path> {
        match stage {
            StageKind::Normalizer => Some(&self.searchable),
            StageKind::Extractor => Some(&self.text),
            StageKind::Exporter => Some(&self.docx),
            StageKind::Classifier => Some(&self.issues),
            StageKind::OutputPath | StageKind::Worker => None,
        }
    }

    /// Removes the artifacts of `stage` and of every stage after it, so a
    /// rerun never leaves output from an earlier run next to fresh output.
    pub fn clear_from(&self, stage: StageKind) -> std::io::Result<()> {
        const ORDER: [StageKind; 4] = [
            StageKind::Normalizer,
            StageKind::Extractor,
            StageKind::Exporter,
            StageKind::Classifier,
        ];

        let later = ORDER.iter().skip_while(|kind| **kind != stage);
        for path in later.filter_map(|kind| self.target(*kind)) {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Writes `content` next to `path` and renames it into place, replacing any
/// earlier artifact. Readers never observe a half-written file.
pub fn write_replacing(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let result = (|| {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}
