use std::path::{Path, PathBuf};

use serde::Serialize;

/// A source document found during discovery. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Path relative to the input root, used to mirror the output tree.
    pub relative: PathBuf,
}

impl Document {
    pub fn new(path: PathBuf, relative: PathBuf) -> Self {
        Self { path, relative }
    }

    /// Builds a document from a path under `input_root`.
    /// Returns `None` when `path` is not inside `input_root`.
    pub fn under_root(input_root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(input_root).ok()?.to_path_buf();
        Some(Self::new(path.to_path_buf(), relative))
    }

    /// Base name without extension; every generated artifact is named from it.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Directory of the document relative to the input root.
    pub fn relative_parent(&self) -> &Path {
        self.relative.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// One scheduling unit. Consumed by exactly one worker and never retried.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    /// Position in the discovery order.
    pub index: usize,
    pub document: Document,
}

impl Job {
    pub fn new(index: usize, document: Document) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            index,
            document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_under_root() {
        let doc = Document::under_root(
            Path::new("/scans"),
            Path::new("/scans/chem/week1/lecture.pdf"),
        )
        .unwrap();
        assert_eq!(doc.relative, PathBuf::from("chem/week1/lecture.pdf"));
        assert_eq!(doc.relative_parent(), Path::new("chem/week1"));
        assert_eq!(doc.stem(), "lecture");
        assert_eq!(doc.file_name(), "lecture.pdf");
    }

    #[test]
    fn test_document_outside_root() {
        assert!(Document::under_root(Path::new("/scans"), Path::new("/other/a.pdf")).is_none());
    }

    #[test]
    fn test_top_level_document_has_empty_parent() {
        let doc = Document::under_root(Path::new("/scans"), Path::new("/scans/a.pdf")).unwrap();
        assert_eq!(doc.relative_parent(), Path::new(""));
    }

    #[test]
    fn test_stem_keeps_inner_dots() {
        let doc = Document::new(PathBuf::from("/in/v1.2.final.pdf"), PathBuf::from("v1.2.final.pdf"));
        assert_eq!(doc.stem(), "v1.2.final");
    }

    #[test]
    fn test_job_ids_are_unique() {
        let doc = Document::new(PathBuf::from("/in/a.pdf"), PathBuf::from("a.pdf"));
        let a = Job::new(0, doc.clone());
        let b = Job::new(1, doc);
        assert_ne!(a.id, b.id);
        assert_eq!(b.index, 1);
    }
}
