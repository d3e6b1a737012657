//! Test harness for isolated batch runs.
//!
//! The `TestHarness` struct provides:
//! - Temporary input and output trees (via `assert_fs`)
//! - A `PipelineConfig` pointing at them
//! - Collaborators wired to the fakes in `fakes.rs`, with the real word list

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use assert_fs::prelude::*;
use assert_fs::TempDir;

use ocrsweep::config::Config;
use ocrsweep::lint::{CustomWords, Dictionary};
use ocrsweep::pipeline::{Collaborators, Pipeline, PipelineConfig};
use ocrsweep::processor::{DocumentWriter, DocxWriter};
use ocrsweep::worker::{BatchReport, Document, Scheduler};

use super::fakes::{CopyOcr, FormFeedReader};

pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config: PipelineConfig,
    writer: Arc<dyn DocumentWriter>,
    custom: CustomWords,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("input")
            .create_dir_all()
            .expect("Failed to create input dir");

        let input_dir = temp_dir.child("input").path().to_path_buf();
        let output_dir = temp_dir.child("output").path().to_path_buf();

        let mut config = Config::default();
        config.input_directory = input_dir.to_string_lossy().to_string();
        config.output_directory = output_dir.to_string_lossy().to_string();

        Self {
            temp_dir,
            input_dir,
            output_dir,
            config: PipelineConfig::from_config(&config),
            writer: Arc::new(DocxWriter),
            custom: CustomWords::default(),
        }
    }

    pub fn with_writer(mut self, writer: Arc<dyn DocumentWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_custom_words(mut self, words: &[&str]) -> Self {
        self.custom = CustomWords::from_words(words);
        self
    }

    /// Writes a fixture document. Pages are separated by form feeds.
    pub fn write_document(&self, relative: &str, pages: &[&str]) -> PathBuf {
        let child = self.temp_dir.child("input").child(relative);
        child
            .write_str(&pages.join("\x0c"))
            .expect("Failed to write input file");
        child.path().to_path_buf()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            ocr: Arc::new(CopyOcr),
            reader: Arc::new(FormFeedReader),
            writer: Arc::clone(&self.writer),
            spell: Arc::new(Dictionary::builtin()),
            custom: Arc::new(self.custom.clone()),
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from_config(&self.config, &self.collaborators())
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.config.clone(), &self.collaborators())
    }

    pub fn discover(&self) -> Vec<Document> {
        ocrsweep::worker::discover(&self.input_dir, &self.config.extensions)
            .expect("Failed to discover documents")
    }

    /// Discovers and runs everything under the input tree.
    pub fn run(&self, parallelism: usize) -> BatchReport {
        self.scheduler()
            .run(self.discover(), parallelism)
            .expect("Batch run failed")
    }

    pub fn output(&self, relative: &str) -> PathBuf {
        self.output_dir.join(relative)
    }

    pub fn read_output(&self, relative: &str) -> String {
        std::fs::read_to_string(self.output(relative)).expect("Failed to read output file")
    }

    /// Every file under the output tree, relative to it, sorted.
    pub fn list_outputs(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&self.output_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(&self.output_dir)
                    .ok()
                    .map(|p| p.to_path_buf())
            })
            .collect();
        files.sort();
        files
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
