use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use tracing::info_span;

use crate::processor::command::run_command;
use crate::processor::{Stage, StageKind, StageResult};
use crate::storage::ArtifactPaths;

/// Fixed option set handed to the OCR engine for every document.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    pub force_ocr: bool,
    pub deskew: bool,
    pub remove_background: bool,
    pub clean: bool,
    pub clean_final: bool,
    pub rotate_pages: bool,
    pub dpi: u32,
    pub languages: Vec<String>,
    pub extra_args: Vec<String>,
    pub timeout: Duration,
}

impl OcrOptions {
    pub fn new(languages: &[String], dpi: u32, timeout: Duration) -> Self {
        Self {
            force_ocr: true,
            deskew: true,
            remove_background: true,
            clean: true,
            clean_final: true,
            rotate_pages: true,
            dpi,
            languages: languages.to_vec(),
            extra_args: Vec::new(),
            timeout,
        }
    }

    /// Tesseract language list, e.g. `eng+spa`.
    pub fn language_spec(&self) -> String {
        if self.languages.is_empty() {
            "eng".to_string()
        } else {
            self.languages.join("+")
        }
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self::new(&["eng".to_string()], 400, Duration::from_secs(3600))
    }
}

/// Produces a text-bearing copy of a scanned document.
pub trait OcrEngine: Send + Sync {
    /// On failure the returned `Err` carries the engine's diagnostic output.
    fn normalize(&self, input: &Path, output: &Path, options: &OcrOptions) -> Result<(), String>;
}

/// Runs the `ocrmypdf` command line tool.
pub struct OcrMyPdf {
    program: String,
}

impl OcrMyPdf {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn build_args(input: &Path, output: &Path, options: &OcrOptions) -> Vec<String> {
        let mut args = Vec::new();
        let flags = [
            (options.force_ocr, "--force-ocr"),
            (options.deskew, "--deskew"),
            (options.remove_background, "--remove-background"),
            (options.clean, "--clean"),
            (options.clean_final, "--clean-final"),
            (options.rotate_pages, "--rotate-pages"),
        ];
        for (enabled, flag) in flags {
            if enabled {
                args.push(flag.to_string());
            }
        }
        args.push("--image-dpi".to_string());
        args.push(options.dpi.to_string());
        args.push("-l".to_string());
        args.push(options.language_spec());
        args.extend(options.extra_args.iter().cloned());
        args.push(input.to_string_lossy().to_string());
        args.push(output.to_string_lossy().to_string());
        args
    }
}

impl Default for OcrMyPdf {
    fn default() -> Self {
        Self::new("ocrmypdf")
    }
}

impl OcrEngine for OcrMyPdf {
    fn normalize(&self, input: &Path, output: &Path, options: &OcrOptions) -> Result<(), String> {
        let args = Self::build_args(input, output, options);
        let result = run_command(Command::new(&self.program).args(&args), options.timeout)
            .map_err(|e| e.to_string())?;

        if result.success {
            Ok(())
        } else {
            let code = result
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            Err(format!(
                "{} exited with {}: {}",
                self.program,
                code,
                result.combined().trim()
            ))
        }
    }
}

/// Required stage: source document to `<stem>_searchable.pdf`.
pub struct OcrNormalizer {
    engine: Arc<dyn OcrEngine>,
    options: OcrOptions,
}

impl OcrNormalizer {
    pub fn new(engine: Arc<dyn OcrEngine>, options: OcrOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &OcrOptions {
        &self.options
    }
}

impl Stage for OcrNormalizer {
    fn kind(&self) -> StageKind {
        StageKind::Normalizer
    }

    fn run(&self, artifacts: &ArtifactPaths) -> StageResult {
        let _span = info_span!("processor.ocr", dpi = self.options.dpi).entered();
        match self
            .engine
            .normalize(&artifacts.source, &artifacts.searchable, &self.options)
        {
            Ok(()) if artifacts.searchable.is_file() => StageResult::success(),
            Ok(()) => StageResult::failure(format!(
                "OCR engine reported success but wrote no output at {}",
                artifacts.searchable.display()
            )),
            Err(diagnostic) => StageResult::failure(diagnostic),
        }
    }
}
