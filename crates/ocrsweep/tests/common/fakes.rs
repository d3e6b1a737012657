//! In-process stand-ins for the external tools.
//!
//! Fixture "PDFs" are plain text files; form feeds separate pages.

#![allow(dead_code)]

use std::path::Path;

use ocrsweep::error::ProcessError;
use ocrsweep::processor::{DocumentWriter, OcrEngine, OcrOptions, TextLayerReader};

/// File names containing this marker make the OCR engine fail.
pub const CORRUPT_MARKER: &str = "corrupt";
/// File names containing this marker make the OCR engine panic.
pub const PANIC_MARKER: &str = "explode";

/// Copies the source to the searchable path, like OCR on an already
/// text-bearing document.
pub struct CopyOcr;

impl OcrEngine for CopyOcr {
    fn normalize(&self, input: &Path, output: &Path, _options: &OcrOptions) -> Result<(), String> {
        let name = input.to_string_lossy();
        if name.contains(PANIC_MARKER) {
            panic!("engine crashed on {}", name);
        }
        if name.contains(CORRUPT_MARKER) {
            return Err("ocrmypdf exited with 2: PriorOcrFoundError: input file is corrupt".to_string());
        }
        std::fs::copy(input, output)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Reads the searchable file as text, one page per form-feed separated chunk.
pub struct FormFeedReader;

impl TextLayerReader for FormFeedReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, ProcessError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(content.split('\x0c').map(str::to_string).collect())
    }
}

/// A writer whose every export fails.
pub struct FullDiskWriter;

impl DocumentWriter for FullDiskWriter {
    fn write_paragraphs(&self, _lines: &[String], _output: &Path) -> Result<(), ProcessError> {
        Err(ProcessError::DocxProcessing("No space left on device".to_string()))
    }
}
