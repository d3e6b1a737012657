use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::WorkerError;
use crate::worker::job::Document;

pub struct DocumentScanner {
    input_directory: PathBuf,
    extensions: Vec<String>,
}

impl DocumentScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
            extensions: vec!["pdf".to_string()],
        }
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    /// Recursively finds every source document, sorted by full path.
    pub fn scan(&self) -> Result<Vec<Document>, WorkerError> {
        if !self.input_directory.is_dir() {
            return Err(WorkerError::InputNotFound(self.input_directory.clone()));
        }

        let root = self
            .input_directory
            .canonicalize()
            .map_err(|_| WorkerError::InputNotFound(self.input_directory.clone()))?;

        let mut documents = Vec::new();

        for entry in WalkDir::new(&root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.is_source_document(path) {
                continue;
            }

            if let Some(document) = Document::under_root(&root, path) {
                debug!("Found document: {}", path.display());
                documents.push(document);
            }
        }

        documents.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));

        for group in find_collisions(&documents) {
            let names: Vec<String> = group.iter().map(|d| d.relative.display().to_string()).collect();
            warn!(
                "Documents share output artifact names, the last one processed wins: {}",
                names.join(", ")
            );
        }

        info!(
            "Discovered {} documents under {}",
            documents.len(),
            root.display()
        );
        Ok(documents)
    }

    fn is_source_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

/// Discovers source documents under `root` with the given extensions.
pub fn discover<P: AsRef<Path>>(root: P, extensions: &[String]) -> Result<Vec<Document>, WorkerError> {
    DocumentScanner::new(root).with_extensions(extensions).scan()
}

/// Groups of documents whose artifacts would land on the same paths.
/// Stems are compared case-insensitively so case-folding filesystems are covered.
pub fn find_collisions(documents: &[Document]) -> Vec<Vec<&Document>> {
    let mut by_target: BTreeMap<(PathBuf, String), Vec<&Document>> = BTreeMap::new();
    for doc in documents {
        let key = (
            doc.relative_parent().to_path_buf(),
            doc.stem().to_lowercase(),
        );
        by_target.entry(key).or_default().push(doc);
    }

    by_target
        .into_values()
        .filter(|group| group.len() > 1)
        .collect()
}
