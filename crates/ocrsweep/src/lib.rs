pub mod config;
pub mod error;
pub mod lint;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod startup;
pub mod storage;
pub mod worker;

pub use config::{load_config, Config, ExtractionBackend};
pub use error::{
    CommandError, ConfigError, OcrsweepError, OutputPathError, ProcessError, Result, StartupError,
    WorkerError,
};
pub use pipeline::{Collaborators, Pipeline, PipelineConfig, PipelineOutcome, StageWarning};
pub use processor::{Stage, StageKind, StageResult};
pub use storage::{ArtifactPaths, OutputMapper};
pub use worker::{BatchReport, Document, DocumentReport, Job, Scheduler};
