use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::config::{Config, ExtractionBackend};
use crate::error::StartupError;
use crate::lint::{CustomWords, Dictionary, SpellBackend};
use crate::processor::{
    DocumentWriter, DocxWriter, LopdfReader, OcrEngine, OcrMyPdf, OcrOptions, PdfToTextReader,
    TextLayerReader,
};

/// Immutable run configuration handed to the scheduler and shared by workers.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub workers: usize,
    pub extensions: Vec<String>,
    pub ocr_program: String,
    pub ocr_options: OcrOptions,
    pub extraction_backend: ExtractionBackend,
    pub layout: bool,
    pub stage_timeout: Duration,
    pub export_enabled: bool,
    pub lint_enabled: bool,
    pub custom_dictionary: Option<PathBuf>,
    pub wordlist: Option<PathBuf>,
    pub max_suggestions: usize,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        let stage_timeout = Duration::from_secs(config.stage_timeout_secs);
        let mut ocr_options = OcrOptions::new(&config.ocr.languages, config.ocr.dpi, stage_timeout);
        ocr_options.extra_args = config.ocr.extra_args.clone();

        Self {
            input_directory: PathBuf::from(&config.input_directory),
            output_directory: PathBuf::from(&config.output_directory),
            workers: config.workers,
            extensions: config.extensions.clone(),
            ocr_program: config.ocr.program.clone(),
            ocr_options,
            extraction_backend: config.extraction.backend,
            layout: config.extraction.layout,
            stage_timeout,
            export_enabled: config.stages.export,
            lint_enabled: config.stages.lint,
            custom_dictionary: config.lint.custom_dictionary.as_ref().map(PathBuf::from),
            wordlist: config.lint.wordlist.as_ref().map(PathBuf::from),
            max_suggestions: config.lint.max_suggestions,
        }
    }
}

/// The external collaborators behind the stage adapters.
///
/// Production code builds these with [`Collaborators::from_config`]; tests
/// swap in fakes for the OCR engine, reader or writer.
#[derive(Clone)]
pub struct Collaborators {
    pub ocr: Arc<dyn OcrEngine>,
    pub reader: Arc<dyn TextLayerReader>,
    pub writer: Arc<dyn DocumentWriter>,
    pub spell: Arc<dyn SpellBackend>,
    pub custom: Arc<CustomWords>,
}

impl Collaborators {
    /// Loads word lists up front so an unreadable dictionary fails the run
    /// before any document is touched.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, StartupError> {
        let reader: Arc<dyn TextLayerReader> = match config.extraction_backend {
            ExtractionBackend::Lopdf => Arc::new(LopdfReader),
            ExtractionBackend::Pdftotext => {
                Arc::new(PdfToTextReader::new(config.layout, config.stage_timeout))
            }
        };

        let mut dictionary = Dictionary::builtin();
        if let Some(path) = &config.wordlist {
            let added = dictionary.extend_from_file(path)?;
            info!("Loaded {} words from {}", added, path.display());
        }

        let custom = match &config.custom_dictionary {
            Some(path) => {
                let words = CustomWords::load(path)?;
                info!("Loaded {} custom words from {}", words.len(), path.display());
                words
            }
            None => CustomWords::default(),
        };

        Ok(Self {
            ocr: Arc::new(OcrMyPdf::new(config.ocr_program.clone())),
            reader,
            writer: Arc::new(DocxWriter),
            spell: Arc::new(dictionary),
            custom: Arc::new(custom),
        })
    }
}
