use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrsweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Startup precondition failed: {0}")]
    Startup(#[from] StartupError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Failed to write batch report '{path}': {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Required tool not found on PATH: {tool}")]
    MissingTool { tool: String },

    #[error("Failed to load word list '{path}': {source}")]
    Dictionary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum OutputPathError {
    #[error("Failed to create output directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Failed to write artifact '{path}': {source}")]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {secs}s and was killed")]
    Timeout { program: String, secs: u64 },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, OcrsweepError>;
