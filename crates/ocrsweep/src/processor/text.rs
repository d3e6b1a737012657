use std::fmt::Write as _;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info_span, warn};

use crate::error::ProcessError;
use crate::processor::command::run_command;
use crate::processor::{Stage, StageKind, StageResult};
use crate::sanitize;
use crate::storage::{write_replacing, ArtifactPaths};

pub const NO_TEXT_SENTINEL: &str = "[NO TEXT ON PAGE]";

/// Reads the text layer of a text-bearing document, one entry per page.
pub trait TextLayerReader: Send + Sync {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ProcessError>;
}

/// In-process reader backed by lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfReader;

impl TextLayerReader for LopdfReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ProcessError> {
        let doc = lopdf::Document::load(path).map_err(|e| {
            ProcessError::PdfProcessing(format!("Failed to load {}: {}", path.display(), e))
        })?;

        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => text,
                Err(e) => {
                    debug!(page = page_num, "text extraction failed, treating page as blank: {}", e);
                    String::new()
                }
            })
            .collect();

        Ok(pages)
    }
}

/// Poppler-based reader: `pdfinfo` for the page count, `pdftotext` per page.
#[derive(Debug, Clone)]
pub struct PdfToTextReader {
    layout: bool,
    timeout: Duration,
}

impl PdfToTextReader {
    pub fn new(layout: bool, timeout: Duration) -> Self {
        Self { layout, timeout }
    }

    fn page_count(&self, path: &Path) -> Result<usize, ProcessError> {
        let output = run_command(Command::new("pdfinfo").arg(path), self.timeout)?;
        if !output.success {
            return Err(ProcessError::PdfProcessing(format!(
                "pdfinfo failed: {}",
                output.combined().trim()
            )));
        }
        parse_page_count(&output.stdout).ok_or_else(|| {
            ProcessError::PdfProcessing("pdfinfo reported no page count".to_string())
        })
    }
}

impl TextLayerReader for PdfToTextReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ProcessError> {
        let count = self.page_count(path)?;
        let mut pages = Vec::with_capacity(count);

        for page_num in 1..=count {
            let page = page_num.to_string();
            let mut command = Command::new("pdftotext");
            if self.layout {
                command.arg("-layout");
            }
            command.args(["-f", &page, "-l", &page]).arg(path).arg("-");

            let output = run_command(&mut command, self.timeout)?;
            if !output.success {
                return Err(ProcessError::PdfProcessing(format!(
                    "pdftotext failed on page {}: {}",
                    page_num,
                    output.stderr.trim()
                )));
            }
            // pdftotext terminates every page with a form feed.
            pages.push(output.stdout.trim_end_matches('\u{c}').to_string());
        }

        Ok(pages)
    }
}

fn parse_page_count(pdfinfo_stdout: &str) -> Option<usize> {
    pdfinfo_stdout
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|count| count.trim().parse().ok())
}

/// Renders pages with 1-based `--- PAGE N ---` delimiters.
/// Blank pages get the sentinel so they stay distinguishable from missing ones.
pub fn render_pages(pages: &[String]) -> String {
    let mut out = String::new();
    for (i, text) in pages.iter().enumerate() {
        let _ = writeln!(out, "--- PAGE {} ---", i + 1);
        if text.trim().is_empty() {
            out.push_str(NO_TEXT_SENTINEL);
            out.push('\n');
        } else {
            out.push_str(text);
        }
        out.push_str("\n\n");
    }
    out
}

/// Required stage: `<stem>_searchable.pdf` to `<stem>.txt`.
pub struct TextExtractor {
    reader: Arc<dyn TextLayerReader>,
}

impl TextExtractor {
    pub fn new(reader: Arc<dyn TextLayerReader>) -> Self {
        Self { reader }
    }

    fn extract(&self, artifacts: &ArtifactPaths) -> Result<(), ProcessError> {
        let pages = self.reader.read_pages(&artifacts.searchable)?;

        if pages.iter().all(|p| p.trim().is_empty()) {
            warn!(
                "{} has no selectable text on any of its {} page(s)",
                sanitize::redact_path(&artifacts.searchable),
                pages.len()
            );
        }

        let rendered = render_pages(&pages);
        write_replacing(&artifacts.text, rendered.as_bytes()).map_err(|e| {
            ProcessError::WriteArtifact {
                path: artifacts.text.clone(),
                source: e,
            }
        })
    }
}

impl Stage for TextExtractor {
    fn kind(&self) -> StageKind {
        StageKind::Extractor
    }

    fn run(&self, artifacts: &ArtifactPaths) -> StageResult {
        let _span = info_span!("processor.extract").entered();
        self.extract(artifacts).into()
    }
}
